//! Raw layout bytes, index big-endian.

use super::{join, read_layout, write_layout, EncodedKeyBytes, IndexOrder};
use crate::{DerivationError, DerivationNode};

pub(crate) fn encode(node: &DerivationNode) -> EncodedKeyBytes {
    encode_with(node, IndexOrder::BigEndian)
}

pub(crate) fn decode(keys: &EncodedKeyBytes) -> Result<DerivationNode, DerivationError> {
    decode_with(keys, IndexOrder::BigEndian)
}

pub(super) fn encode_with(node: &DerivationNode, order: IndexOrder) -> EncodedKeyBytes {
    let mut secret_key = Vec::new();
    let mut public_key = Vec::new();
    write_layout(node, &node.secret_key, order, &mut secret_key);
    write_layout(node, &node.public_key, order, &mut public_key);

    EncodedKeyBytes {
        secret_key,
        public_key,
    }
}

pub(super) fn decode_with(
    keys: &EncodedKeyBytes,
    order: IndexOrder,
) -> Result<DerivationNode, DerivationError> {
    join(
        read_layout(&keys.secret_key, order, "secret")?,
        read_layout(&keys.public_key, order, "public")?,
    )
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::codec::{tests::sample_node, HEADER_LEN};

    #[test]
    fn layout_of_bip32_child() {
        let encoded = encode(&sample_node());
        assert_eq!(encoded.secret_key.len(), HEADER_LEN + 32);
        assert_eq!(encoded.public_key.len(), HEADER_LEN + 33);
        assert_eq!(
            hex::encode(&encoded.public_key[..9]),
            "013442193e80000000"
        );
        assert_eq!(decode(&encoded).unwrap(), sample_node());
    }

    #[test]
    fn mismatched_halves_are_rejected() {
        let mut encoded = encode(&sample_node());
        encoded.public_key[0] = 2;
        assert_eq!(decode(&encoded), Err(DerivationError::DerivationKeyMismatch));
    }

    #[test]
    fn truncated_half_is_malformed() {
        let mut encoded = encode(&sample_node());
        encoded.secret_key.truncate(HEADER_LEN);
        assert!(matches!(
            decode(&encoded),
            Err(DerivationError::MalformedEncoding(_))
        ));
    }

    proptest! {
        #[test]
        fn round_trip(
            depth in any::<u8>(),
            parent_fingerprint in any::<u32>(),
            index in any::<u32>(),
            chain_code in any::<[u8; 32]>(),
            secret_key in prop::collection::vec(any::<u8>(), 1..=128),
            public_key in prop::collection::vec(any::<u8>(), 1..=128),
        ) {
            let node = DerivationNode {
                depth,
                parent_fingerprint,
                index,
                chain_code,
                secret_key,
                public_key,
            };
            prop_assert_eq!(decode(&encode(&node)).unwrap(), node);
        }
    }
}
