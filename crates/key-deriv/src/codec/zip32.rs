//! ZIP32 layout: the raw layout with a little-endian index.
//!
//! For a Sapling node the secret half is exactly a ZIP32 extended spending key
//! and the public half an extended full viewing key.
//!
//! The output is the same length as the `hex` format but not byte-identical:
//! the index is written little-endian here and big-endian there.

use zeroize::Zeroizing;

use super::{bytes, hex, read_layout, write_layout, EncodedKeyBytes, EncodedKeys, IndexOrder};
use crate::{DerivationError, DerivationNode};

pub(crate) fn encode(node: &DerivationNode) -> EncodedKeys {
    hex::encode_with(node, IndexOrder::LittleEndian)
}

pub(crate) fn decode(keys: &EncodedKeys) -> Result<DerivationNode, DerivationError> {
    hex::decode_with(keys, IndexOrder::LittleEndian)
}

/// Decodes the `zip32bytes` form.
pub(crate) fn decode_bytes(keys: &EncodedKeyBytes) -> Result<DerivationNode, DerivationError> {
    bytes::decode_with(keys, IndexOrder::LittleEndian)
}

/// The secret half as raw bytes, i.e. the node's extended spending key.
pub(crate) fn secret_bytes(node: &DerivationNode) -> Zeroizing<Vec<u8>> {
    let mut out = Zeroizing::new(Vec::new());
    write_layout(node, &node.secret_key, IndexOrder::LittleEndian, &mut out);
    out
}

/// Builds a node from an extended spending key and its extended full viewing key.
pub(crate) fn node_from_extended_keys(
    xsk: &[u8],
    xfvk: &[u8],
) -> Result<DerivationNode, DerivationError> {
    super::join(
        read_layout(xsk, IndexOrder::LittleEndian, "secret")?,
        read_layout(xfvk, IndexOrder::LittleEndian, "public")?,
    )
}
