//! Error type shared by every stage of the engine.

/// Error type for key derivation and key encoding operations.
///
/// None of these are retried by the engine. A call either returns a complete
/// result or one of these variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DerivationError {
    /// The derivation path does not follow `m/<n>['|h]/...`.
    #[error("malformed derivation path {path:?}: {reason}")]
    MalformedPath {
        /// The offending path.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An algorithm tag that names no supported algorithm.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A seed post-processing tag that names no supported scheme.
    #[error("unsupported secret type: {0}")]
    UnsupportedSecretType(String),

    /// An encoding tag that names no supported node format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The leading version bytes of an extended key are not the expected ones.
    #[error("version mismatch: expected {expected:#010x}, found {found:#010x}")]
    VersionMismatch {
        /// Version the decoder was configured with.
        expected: u32,
        /// Version found in the payload.
        found: u32,
    },

    /// The encoded node has the wrong length or shape.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// The secret and public halves of an encoded node describe different nodes.
    #[error("secret and public key metadata do not match")]
    DerivationKeyMismatch,

    /// The sr25519 primitive has not completed (or has failed) its initialization.
    #[error("sr25519 binding not ready: {0}")]
    NativeBindingNotReady(String),

    /// The requested branch has no agreed-upon definition.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// The mnemonic failed word-list or checksum validation.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// The seed produced a master secret outside the curve order.
    #[error("seed produced an invalid master key")]
    InvalidMasterKey,

    /// A node carries key bytes the curve primitive rejects.
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    /// Index substitution ran past the last non-hardened or hardened index.
    #[error("no valid child key left in the index space after {0:#010x}")]
    IndexSpaceExhausted(u32),
}

impl DerivationError {
    pub(crate) fn malformed_path(path: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPath {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }

    /// Replaces the path a [`DerivationError::MalformedPath`] reports with the
    /// caller's full path. Other variants are returned unchanged.
    pub(crate) fn at_path(self, full_path: &str) -> Self {
        match self {
            Self::MalformedPath { reason, .. } => Self::malformed_path(full_path, reason),
            other => other,
        }
    }
}
