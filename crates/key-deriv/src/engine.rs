//! The [`KeyEngine`] dispatcher: picks a deriver or codec by tag.

use std::sync::Arc;

use tracing::debug;
use zeroize::Zeroizing;

use crate::{
    binding::Sr25519Binding,
    codec::{self, DerivativeFormat, EncodedDerivative},
    config::{CryptoConfiguration, EngineConfig},
    deriver::{Ed25519Deriver, NodeDeriver, SaplingDeriver, Secp256k1Deriver, Sr25519Deriver},
    node::CryptoDerivative,
    paths, seed, DerivationError, DerivationNode,
};

/// Entry point for deriving, encoding and decoding keys.
///
/// Every operation is synchronous and takes `&self`, so one engine can serve
/// concurrent callers. sr25519 operations additionally require
/// [`KeyEngine::ensure_ready`] to have completed.
#[derive(Debug, Default)]
pub struct KeyEngine {
    config: EngineConfig,
    binding: Arc<Sr25519Binding>,
}

impl KeyEngine {
    /// Creates an engine with its own, not yet initialized, sr25519 binding.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_binding(config, Arc::new(Sr25519Binding::new()))
    }

    /// Creates an engine sharing an existing sr25519 binding.
    pub const fn with_binding(config: EngineConfig, binding: Arc<Sr25519Binding>) -> Self {
        Self { config, binding }
    }

    /// Initializes the sr25519 binding. Idempotent.
    pub async fn ensure_ready(&self) -> Result<(), DerivationError> {
        self.binding.ensure_ready().await
    }

    /// Turns a mnemonic into the seed [`Self::derive`] expects for `config`.
    ///
    /// # Errors
    ///
    /// - [`DerivationError::InvalidMnemonic`] if the mnemonic fails validation.
    /// - [`DerivationError::NativeBindingNotReady`] for Substrate sr25519 before
    ///   [`Self::ensure_ready`] has succeeded.
    /// - [`DerivationError::NotImplemented`] for sr25519 `standard`.
    pub fn seed_from_mnemonic(
        &self,
        config: &CryptoConfiguration,
        mnemonic: &str,
        password: Option<&str>,
    ) -> Result<Zeroizing<Vec<u8>>, DerivationError> {
        seed::seed_from_mnemonic(config, &self.binding, mnemonic, password)
    }

    /// Derives the node at `path` (the master node if `None`).
    pub(crate) fn derive_node(
        &self,
        config: &CryptoConfiguration,
        seed: &[u8],
        path: Option<&str>,
    ) -> Result<DerivationNode, DerivationError> {
        let path = path.unwrap_or_default();
        let indices = paths::parse(path)?;

        let node = match config {
            CryptoConfiguration::Secp256k1 { key, .. } => {
                Secp256k1Deriver::new(key).derive_path(seed, &indices)
            }
            CryptoConfiguration::Ed25519 { key, .. } => {
                Ed25519Deriver::new(key).derive_path(seed, &indices)
            }
            CryptoConfiguration::Sr25519 { compatibility } => {
                Sr25519Deriver::new(&self.binding, *compatibility).derive_path(seed, &indices)
            }
            CryptoConfiguration::Sapling { .. } => SaplingDeriver.derive_path(seed, &indices),
        }
        .map_err(|err| err.at_path(path))?;

        debug!(
            algorithm = %config.algorithm(),
            depth = node.depth,
            index = node.index,
            "derived node"
        );

        Ok(node)
    }

    /// Derives the node at `path` and returns it in its external form.
    pub fn derive(
        &self,
        config: &CryptoConfiguration,
        seed: &[u8],
        path: Option<&str>,
    ) -> Result<CryptoDerivative, DerivationError> {
        self.derive_node(config, seed, path)
            .map(|node| CryptoDerivative::from(&node))
    }

    /// Serializes `derivative` in `format`.
    pub fn encode_derivative(
        &self,
        format: DerivativeFormat,
        derivative: &CryptoDerivative,
    ) -> Result<EncodedDerivative, DerivationError> {
        let node = DerivationNode::try_from(derivative)?;

        let encoded = match format {
            DerivativeFormat::Bip32 => {
                EncodedDerivative::Bip32(codec::bip32::encode(&node, &self.config.bip32))
            }
            DerivativeFormat::Hex => EncodedDerivative::Hex(codec::hex::encode(&node)),
            DerivativeFormat::Bytes => EncodedDerivative::Bytes(codec::bytes::encode(&node)),
            DerivativeFormat::Zip32 => EncodedDerivative::Zip32(codec::zip32::encode(&node)),
        };

        debug!(%format, depth = node.depth, "encoded derivative");
        Ok(encoded)
    }

    /// Parses an encoded node back into its external form.
    ///
    /// # Errors
    ///
    /// - [`DerivationError::VersionMismatch`] if a bip32 key does not carry the
    ///   configured version bytes.
    /// - [`DerivationError::MalformedEncoding`] on length or format problems.
    /// - [`DerivationError::DerivationKeyMismatch`] if the two halves describe
    ///   different nodes.
    pub fn decode_derivative(
        &self,
        encoded: &EncodedDerivative,
    ) -> Result<CryptoDerivative, DerivationError> {
        let node = match encoded {
            EncodedDerivative::Bip32(keys) => codec::bip32::decode(keys, &self.config.bip32),
            EncodedDerivative::Hex(keys) => codec::hex::decode(keys),
            EncodedDerivative::Bytes(keys) => codec::bytes::decode(keys),
            EncodedDerivative::Zip32(keys) => codec::zip32::decode(keys),
            EncodedDerivative::Zip32Bytes(keys) => codec::zip32::decode_bytes(keys),
        }?;

        debug!(format = encoded.type_tag(), depth = node.depth, "decoded derivative");
        Ok(CryptoDerivative::from(&node))
    }
}
