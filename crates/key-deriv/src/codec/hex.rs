//! Lowercase hex of the raw layout.

use super::{bytes, EncodedKeyBytes, EncodedKeys, IndexOrder};
use crate::{DerivationError, DerivationNode};

pub(crate) fn encode(node: &DerivationNode) -> EncodedKeys {
    encode_with(node, IndexOrder::BigEndian)
}

pub(crate) fn decode(keys: &EncodedKeys) -> Result<DerivationNode, DerivationError> {
    decode_with(keys, IndexOrder::BigEndian)
}

pub(super) fn encode_with(node: &DerivationNode, order: IndexOrder) -> EncodedKeys {
    let raw = bytes::encode_with(node, order);
    EncodedKeys {
        secret_key: hex::encode(&raw.secret_key),
        public_key: hex::encode(&raw.public_key),
    }
}

pub(super) fn decode_with(
    keys: &EncodedKeys,
    order: IndexOrder,
) -> Result<DerivationNode, DerivationError> {
    let unhex = |s: &str, side: &str| {
        hex::decode(s)
            .map_err(|e| DerivationError::MalformedEncoding(format!("{side} key is not hex: {e}")))
    };

    let raw = EncodedKeyBytes {
        secret_key: unhex(&keys.secret_key, "secret")?,
        public_key: unhex(&keys.public_key, "public")?,
    };
    bytes::decode_with(&raw, order)
}
