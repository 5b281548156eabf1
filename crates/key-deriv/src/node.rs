//! The in-memory node shared by every deriver and codec, and its external DTO.

use std::fmt;

use bitcoin::hashes::{hash160, Hash};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{paths::DerivationIndex, DerivationError};

/// Length of every chain code.
pub const CHAIN_CODE_LEN: usize = 32;

/// One node of a derivation tree.
///
/// Nodes are values: a derivation step never mutates its parent, it builds a new
/// node. The master node has depth 0, a zero parent fingerprint and index 0.
/// Nodes never leave the crate; callers see [`CryptoDerivative`] instead.
///
/// # Security
///
/// The secret key and chain code are wiped when the node is dropped, and the
/// [`Debug`] representation never prints the secret key.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub(crate) struct DerivationNode {
    /// Number of derivation steps from the master node.
    pub(crate) depth: u8,
    /// Fingerprint of the parent's public key (0 for the master node).
    pub(crate) parent_fingerprint: u32,
    /// Masked child index this node was derived at (0 for the master node).
    pub(crate) index: u32,
    /// Chain code used for the next derivation step.
    pub(crate) chain_code: [u8; CHAIN_CODE_LEN],
    /// Secret key bytes; length is fixed by the algorithm.
    pub(crate) secret_key: Vec<u8>,
    /// Public key bytes; length is fixed by the algorithm.
    pub(crate) public_key: Vec<u8>,
}

impl DerivationNode {
    /// Builds a master node (depth 0, no parent, index 0).
    pub(crate) fn master(
        chain_code: [u8; CHAIN_CODE_LEN],
        secret_key: Vec<u8>,
        public_key: Vec<u8>,
    ) -> Self {
        Self {
            depth: 0,
            parent_fingerprint: 0,
            index: 0,
            chain_code,
            secret_key,
            public_key,
        }
    }

    /// Builds the child of `self` at the masked `index`.
    ///
    /// The fingerprint is taken from `self`'s public key. Fails with
    /// [`DerivationError::MalformedPath`] if `self` is already at the deepest
    /// depth a byte can hold.
    pub(crate) fn child(
        &self,
        index: u32,
        chain_code: [u8; CHAIN_CODE_LEN],
        secret_key: Vec<u8>,
        public_key: Vec<u8>,
    ) -> Result<Self, DerivationError> {
        let depth = self.depth.checked_add(1).ok_or_else(|| {
            DerivationError::malformed_path(
                &DerivationIndex::from_masked(index).to_string(),
                format!("path deeper than {}", u8::MAX),
            )
        })?;

        Ok(Self {
            depth,
            parent_fingerprint: self.fingerprint(),
            index,
            chain_code,
            secret_key,
            public_key,
        })
    }

    /// `be32(first 4 bytes of ripemd160(sha256(public_key)))`.
    pub(crate) fn fingerprint(&self) -> u32 {
        fingerprint(&self.public_key)
    }
}

impl fmt::Debug for DerivationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivationNode")
            .field("depth", &self.depth)
            .field("parent_fingerprint", &format_args!("{:08x}", self.parent_fingerprint))
            .field("index", &format_args!("{:#010x}", self.index))
            .field("chain_code", &"<redacted>")
            .field("secret_key", &format_args!("<{} bytes>", self.secret_key.len()))
            .field("public_key", &hex::encode(&self.public_key))
            .finish()
    }
}

/// Key fingerprint: the first four bytes of `hash160(public_key)` read big-endian.
pub(crate) fn fingerprint(public_key: &[u8]) -> u32 {
    let digest = hash160::Hash::hash(public_key).to_byte_array();
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Externally visible form of a [`DerivationNode`], with byte fields as lowercase hex.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct CryptoDerivative {
    /// Number of derivation steps from the master node.
    pub depth: u8,
    /// Fingerprint of the parent's public key.
    pub parent_fingerprint: u32,
    /// Masked child index.
    pub index: u32,
    /// 32-byte chain code, hex.
    pub chain_code: String,
    /// Secret key, hex.
    pub secret_key: String,
    /// Public key, hex.
    pub public_key: String,
}

impl fmt::Debug for CryptoDerivative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoDerivative")
            .field("depth", &self.depth)
            .field("parent_fingerprint", &self.parent_fingerprint)
            .field("index", &self.index)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl From<&DerivationNode> for CryptoDerivative {
    fn from(node: &DerivationNode) -> Self {
        Self {
            depth: node.depth,
            parent_fingerprint: node.parent_fingerprint,
            index: node.index,
            chain_code: hex::encode(node.chain_code),
            secret_key: hex::encode(&node.secret_key),
            public_key: hex::encode(&node.public_key),
        }
    }
}

impl TryFrom<&CryptoDerivative> for DerivationNode {
    type Error = DerivationError;

    fn try_from(derivative: &CryptoDerivative) -> Result<Self, Self::Error> {
        let mut chain_code = [0u8; CHAIN_CODE_LEN];
        hex::decode_to_slice(&derivative.chain_code, &mut chain_code).map_err(|e| {
            DerivationError::MalformedEncoding(format!("chain code must be 32 hex bytes: {e}"))
        })?;

        let secret_key = hex::decode(&derivative.secret_key)
            .map_err(|e| DerivationError::MalformedEncoding(format!("secret key: {e}")))?;
        let public_key = hex::decode(&derivative.public_key)
            .map_err(|e| DerivationError::MalformedEncoding(format!("public key: {e}")))?;

        Ok(Self {
            depth: derivative.depth,
            parent_fingerprint: derivative.parent_fingerprint,
            index: derivative.index,
            chain_code,
            secret_key,
            public_key,
        })
    }
}
