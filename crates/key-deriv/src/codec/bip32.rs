//! Base58-check extended keys (`xprv` / `xpub`).
//!
//! ```text
//! version (4) ‖ depth (1) ‖ parent fingerprint (4) ‖ index (4) ‖ chain code (32) ‖ 0x00 ‖ secret key
//! version (4) ‖ depth (1) ‖ parent fingerprint (4) ‖ index (4) ‖ chain code (32) ‖ public key
//! ```
//!
//! All integers are big-endian. The `0x00` pad only precedes the secret key.

use bitcoin::base58;
use zeroize::Zeroizing;

use super::{join, read_layout, write_layout, Bip32Versions, EncodedKeys, IndexOrder};
use crate::{DerivationError, DerivationNode};

const VERSION_LEN: usize = 4;

pub(crate) fn encode(node: &DerivationNode, versions: &Bip32Versions) -> EncodedKeys {
    let mut secret = Zeroizing::new(versions.secret.to_be_bytes().to_vec());
    let mut padded = Zeroizing::new(Vec::with_capacity(node.secret_key.len() + 1));
    padded.push(0x00);
    padded.extend_from_slice(&node.secret_key);
    write_layout(node, &padded, IndexOrder::BigEndian, &mut secret);

    let mut public = versions.public.to_be_bytes().to_vec();
    write_layout(node, &node.public_key, IndexOrder::BigEndian, &mut public);

    EncodedKeys {
        secret_key: base58::encode_check(&secret),
        public_key: base58::encode_check(&public),
    }
}

pub(crate) fn decode(
    keys: &EncodedKeys,
    versions: &Bip32Versions,
) -> Result<DerivationNode, DerivationError> {
    let secret = Zeroizing::new(unwrap_base58(&keys.secret_key, "secret")?);
    let public = unwrap_base58(&keys.public_key, "public")?;

    let secret = strip_version(&secret, versions.secret, "secret")?;
    let public = strip_version(&public, versions.public, "public")?;

    let (header, padded) = read_layout(secret, IndexOrder::BigEndian, "secret")?;
    let secret_key = match padded.split_first() {
        Some((0x00, key)) if !key.is_empty() => key,
        _ => {
            return Err(DerivationError::MalformedEncoding(
                "secret key must be a 0x00 pad followed by the key".to_owned(),
            ))
        }
    };

    join(
        (header, secret_key),
        read_layout(public, IndexOrder::BigEndian, "public")?,
    )
}

fn unwrap_base58(encoded: &str, side: &str) -> Result<Vec<u8>, DerivationError> {
    base58::decode_check(encoded)
        .map_err(|e| DerivationError::MalformedEncoding(format!("{side} key: {e}")))
}

fn strip_version<'a>(
    payload: &'a [u8],
    expected: u32,
    side: &str,
) -> Result<&'a [u8], DerivationError> {
    if payload.len() < VERSION_LEN {
        return Err(DerivationError::MalformedEncoding(format!(
            "{side} key is missing its version bytes"
        )));
    }

    let (version, rest) = payload.split_at(VERSION_LEN);
    let found = u32::from_be_bytes([version[0], version[1], version[2], version[3]]);
    if found != expected {
        return Err(DerivationError::VersionMismatch { expected, found });
    }

    Ok(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tests::sample_node;

    const XPRV: &str = "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7";
    const XPUB: &str = "xpub68Gmy5EdvgibQVfPdqkBBCHxA5htiqg55crXYuXoQRKfDBFA1WEjWgP6LHhwBZeNK1VTsfTFUHCdrfp1bgwQ9xv5ski8PX9rL2dZXvgGDnw";

    #[test]
    fn bip32_vector_1_first_child() {
        let encoded = encode(&sample_node(), &Bip32Versions::MAINNET);
        assert_eq!(encoded.secret_key, XPRV);
        assert_eq!(encoded.public_key, XPUB);

        let decoded = decode(&encoded, &Bip32Versions::MAINNET).unwrap();
        assert_eq!(decoded, sample_node());
    }

    #[test]
    fn unexpected_version_is_rejected() {
        let encoded = encode(&sample_node(), &Bip32Versions::MAINNET);
        assert_eq!(
            decode(&encoded, &Bip32Versions::TESTNET),
            Err(DerivationError::VersionMismatch {
                expected: 0x0435_8394,
                found: 0x0488_ade4,
            })
        );
    }

    #[test]
    fn testnet_versions_round_trip() {
        let encoded = encode(&sample_node(), &Bip32Versions::TESTNET);
        assert!(encoded.secret_key.starts_with("tprv"));
        assert!(encoded.public_key.starts_with("tpub"));
        assert_eq!(
            decode(&encoded, &Bip32Versions::TESTNET).unwrap(),
            sample_node()
        );
    }

    #[test]
    fn bad_checksum_is_malformed() {
        let mut encoded = encode(&sample_node(), &Bip32Versions::MAINNET);
        encoded.public_key.pop();
        encoded.public_key.push('1');
        assert!(matches!(
            decode(&encoded, &Bip32Versions::MAINNET),
            Err(DerivationError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn keys_from_different_nodes_are_rejected() {
        let mut other = sample_node();
        other.index = 0x8000_0001;
        let mut encoded = encode(&sample_node(), &Bip32Versions::MAINNET);
        encoded.public_key = encode(&other, &Bip32Versions::MAINNET).public_key.clone();
        assert_eq!(
            decode(&encoded, &Bip32Versions::MAINNET),
            Err(DerivationError::DerivationKeyMismatch)
        );
    }
}
