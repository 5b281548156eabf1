//! Sapling key derivation — ZIP32.
//!
//! Derivation itself is done by `sapling-crypto`; this module only moves its
//! 169-byte extended keys in and out of [`DerivationNode`]s. The node's parent
//! fingerprint is the ZIP32 FVK tag rather than a hash160 fingerprint.

use sapling_crypto::zip32::ExtendedSpendingKey;

use super::NodeDeriver;
use crate::{codec::zip32, paths::DerivationIndex, DerivationError, DerivationNode};

/// Length of a serialized extended spending or full viewing key.
const EXTENDED_KEY_LEN: usize = 169;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SaplingDeriver;

fn node_from_spending_key(xsk: &ExtendedSpendingKey) -> Result<DerivationNode, DerivationError> {
    #[allow(deprecated)]
    let xfvk = xsk.to_extended_full_viewing_key();

    let mut xfvk_bytes = Vec::with_capacity(EXTENDED_KEY_LEN);
    xfvk.write(&mut xfvk_bytes)
        .map_err(|e| DerivationError::InvalidKey(format!("sapling full viewing key: {e}")))?;

    zip32::node_from_extended_keys(&xsk.to_bytes(), &xfvk_bytes)
}

impl NodeDeriver for SaplingDeriver {
    fn master(&self, seed: &[u8]) -> Result<DerivationNode, DerivationError> {
        node_from_spending_key(&ExtendedSpendingKey::master(seed))
    }

    fn child(
        &self,
        parent: &DerivationNode,
        index: DerivationIndex,
    ) -> Result<DerivationNode, DerivationError> {
        let child_index = ::zip32::ChildIndex::from_index(index.masked()).ok_or_else(|| {
            DerivationError::malformed_path(
                &index.to_string(),
                format!("segment {index} is not hardened, sapling only derives hardened children"),
            )
        })?;

        let xsk_bytes = zip32::secret_bytes(parent);
        if xsk_bytes.len() != EXTENDED_KEY_LEN {
            return Err(DerivationError::InvalidKey(format!(
                "sapling spending key is {} bytes, expected {EXTENDED_KEY_LEN}",
                xsk_bytes.len()
            )));
        }

        let xsk = ExtendedSpendingKey::from_bytes(&xsk_bytes)
            .map_err(|_| DerivationError::InvalidKey("sapling spending key".to_owned()))?;

        node_from_spending_key(&xsk.derive_child(child_index))
    }
}
