//! Per-algorithm derivers.
//!
//! ```text
//!                  seed
//!                   │
//!     ┌───────────┬─┴─────────┬────────────┐
//!     ▼           ▼           ▼            ▼
//! secp256k1    ed25519     sr25519      sapling
//!  (BIP32)   (SLIP-0010)  (Substrate)   (ZIP32)
//! ```
//!
//! Every deriver builds a master node from a seed and a child node from a parent
//! node and an index. Walking a path is a plain fold over the indices, producing
//! a fresh node per step.

mod ed25519;
mod sapling;
mod secp256k1;
mod sr25519;

use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroizing;

pub(crate) use self::{
    ed25519::Ed25519Deriver, sapling::SaplingDeriver, secp256k1::Secp256k1Deriver,
    sr25519::Sr25519Deriver,
};
use crate::{node::CHAIN_CODE_LEN, paths::DerivationIndex, DerivationError, DerivationNode};

type HmacSha512 = Hmac<Sha512>;

/// Master and child key derivation for one algorithm.
pub(crate) trait NodeDeriver {
    /// Builds the master node from a seed.
    fn master(&self, seed: &[u8]) -> Result<DerivationNode, DerivationError>;

    /// Builds the child of `parent` at `index`.
    fn child(
        &self,
        parent: &DerivationNode,
        index: DerivationIndex,
    ) -> Result<DerivationNode, DerivationError>;

    /// Walks `indices` from the master node. An empty path yields the master node.
    fn derive_path(
        &self,
        seed: &[u8],
        indices: &[DerivationIndex],
    ) -> Result<DerivationNode, DerivationError> {
        let master = self.master(seed)?;
        indices
            .iter()
            .try_fold(master, |node, index| self.child(&node, *index))
    }
}

/// `I = HMAC-SHA512(key, data_0 || data_1 || ...)`, split into `(I_L, I_R)`.
pub(crate) fn hmac_sha512_split(
    key: &[u8],
    data: &[&[u8]],
) -> Result<(Zeroizing<[u8; 32]>, [u8; CHAIN_CODE_LEN]), DerivationError> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| DerivationError::InvalidKey(format!("HMAC init failed: {e}")))?;
    for part in data {
        mac.update(part);
    }
    let mut output = Zeroizing::new([0u8; 64]);
    output.copy_from_slice(&mac.finalize().into_bytes());

    let mut il = Zeroizing::new([0u8; 32]);
    let mut ir = [0u8; CHAIN_CODE_LEN];
    il.copy_from_slice(&output[..32]);
    ir.copy_from_slice(&output[32..]);

    Ok((il, ir))
}

/// Copies a node's secret key into a fixed-size buffer, rejecting other lengths.
pub(crate) fn secret_array<const N: usize>(
    node: &DerivationNode,
) -> Result<Zeroizing<[u8; N]>, DerivationError> {
    let mut secret = Zeroizing::new([0u8; N]);
    if node.secret_key.len() != N {
        return Err(DerivationError::InvalidKey(format!(
            "expected a {N}-byte secret key, got {} bytes",
            node.secret_key.len()
        )));
    }
    secret.copy_from_slice(&node.secret_key);
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_split_matches_slip10_master() {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let (il, ir) = hmac_sha512_split(b"ed25519 seed", &[&seed]).unwrap();
        assert_eq!(
            hex::encode(*il),
            "2b4be7f19ee27bbf30c667b642d5f4aa69fd169872f8fc3059c08ebae2eb19e7"
        );
        assert_eq!(
            hex::encode(ir),
            "90046a93de5380a72b5e45010748567d5ea02bbf6522f979e05c0d8d8ca9fffb"
        );
    }

    #[test]
    fn secret_array_rejects_wrong_length() {
        let node = DerivationNode::master([0u8; 32], vec![1u8; 31], vec![2u8; 32]);
        assert!(matches!(
            secret_array::<32>(&node),
            Err(DerivationError::InvalidKey(_))
        ));
    }
}
