//! secp256k1 key derivation — BIP32.
//!
//! Reference: <https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki>

use secp256k1::{PublicKey, Scalar, SecretKey, SECP256K1};
use tracing::warn;

use super::{hmac_sha512_split, secret_array, NodeDeriver};
use crate::{paths::DerivationIndex, DerivationError, DerivationNode};

/// BIP32 deriver over secp256k1.
///
/// Secret keys are 32 bytes, public keys 33 bytes (compressed SEC1).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Secp256k1Deriver<'a> {
    /// HMAC key of the master node, `"Bitcoin seed"` unless configured otherwise.
    key: &'a str,
}

impl<'a> Secp256k1Deriver<'a> {
    pub(crate) const fn new(key: &'a str) -> Self {
        Self { key }
    }

    /// One CKDpriv attempt. `Ok(None)` means `index` yields no valid key.
    fn try_child(
        &self,
        parent: &DerivationNode,
        parent_secret: &SecretKey,
        index: DerivationIndex,
    ) -> Result<Option<DerivationNode>, DerivationError> {
        let ser_index = index.masked().to_be_bytes();

        // Data = 0x00 || ser256(k_par) || ser32(i)   hardened
        //      = serP(K_par) || ser32(i)             normal
        let (il, ir) = if index.is_hardened() {
            let secret = parent_secret.secret_bytes();
            hmac_sha512_split(&parent.chain_code, &[&[0x00], &secret, &ser_index])?
        } else {
            hmac_sha512_split(&parent.chain_code, &[&parent.public_key, &ser_index])?
        };

        let Ok(tweak) = Scalar::from_be_bytes(*il) else {
            return Ok(None);
        };
        let Ok(child_secret) = parent_secret.add_tweak(&tweak) else {
            return Ok(None);
        };

        let public_key = PublicKey::from_secret_key(SECP256K1, &child_secret);
        parent
            .child(
                index.masked(),
                ir,
                child_secret.secret_bytes().to_vec(),
                public_key.serialize().to_vec(),
            )
            .map(Some)
    }
}

impl NodeDeriver for Secp256k1Deriver<'_> {
    fn master(&self, seed: &[u8]) -> Result<DerivationNode, DerivationError> {
        // I = HMAC-SHA512(Key = "Bitcoin seed", Data = seed)
        let (il, ir) = hmac_sha512_split(self.key.as_bytes(), &[seed])?;
        let secret =
            SecretKey::from_slice(il.as_slice()).map_err(|_| DerivationError::InvalidMasterKey)?;
        let public_key = PublicKey::from_secret_key(SECP256K1, &secret);

        Ok(DerivationNode::master(
            ir,
            secret.secret_bytes().to_vec(),
            public_key.serialize().to_vec(),
        ))
    }

    /// Derives the child at `index`.
    ///
    /// # Notes
    ///
    /// If `index` produces an invalid key (`I_L >= n` or a zero sum) the next index
    /// of the same kind is tried instead, until one is valid. The returned node
    /// carries the index that was actually used.
    fn child(
        &self,
        parent: &DerivationNode,
        index: DerivationIndex,
    ) -> Result<DerivationNode, DerivationError> {
        let secret = secret_array::<32>(parent)?;
        let parent_secret = SecretKey::from_slice(secret.as_slice())
            .map_err(|e| DerivationError::InvalidKey(format!("secp256k1 parent secret: {e}")))?;

        let mut index = index;
        loop {
            if let Some(node) = self.try_child(parent, &parent_secret, index)? {
                return Ok(node);
            }

            let next = index
                .successor()
                .ok_or(DerivationError::IndexSpaceExhausted(index.masked()))?;
            warn!(
                skipped = %index,
                substituted = %next,
                depth = u16::from(parent.depth) + 1,
                "index yields an invalid secp256k1 key, substituting the next index"
            );
            index = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SECP256K1_DEFAULT_KEY, node::fingerprint, paths};

    const SEED: &str = "000102030405060708090a0b0c0d0e0f";

    fn derive(path: &str) -> DerivationNode {
        let seed = hex::decode(SEED).unwrap();
        Secp256k1Deriver::new(SECP256K1_DEFAULT_KEY)
            .derive_path(&seed, &paths::parse(path).unwrap())
            .unwrap()
    }

    #[test]
    fn bip32_vector_1_master() {
        let node = derive("m/");
        assert_eq!(node.depth, 0);
        assert_eq!(node.parent_fingerprint, 0);
        assert_eq!(node.index, 0);
        assert_eq!(
            hex::encode(node.chain_code),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
        assert_eq!(
            hex::encode(&node.secret_key),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            hex::encode(&node.public_key),
            "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2"
        );
    }

    #[test]
    fn bip32_vector_1_hardened_child() {
        let node = derive("m/0'");
        assert_eq!(node.depth, 1);
        assert_eq!(node.parent_fingerprint, 0x3442_193e);
        assert_eq!(node.index, 0x8000_0000);
        assert_eq!(
            hex::encode(node.chain_code),
            "47fdacbd0f1097043b78c63c20c34ef4ed9a111d980047ad16282c7ae6236141"
        );
        assert_eq!(
            hex::encode(&node.secret_key),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
        assert_eq!(
            hex::encode(&node.public_key),
            "035a784662a4a20a65bf6aab9ae98a6c068a81c52e4b032c0fb5400c706cfccc56"
        );
    }

    #[test]
    fn bip32_vector_1_normal_child() {
        let node = derive("m/0h/1");
        assert_eq!(node.depth, 2);
        assert_eq!(node.index, 1);
        assert_eq!(
            hex::encode(node.chain_code),
            "2a7857631386ba23dacac34180dd1983734e444fdbf774041578e9b6adb37c19"
        );
        assert_eq!(
            hex::encode(&node.secret_key),
            "3c6cb8d0f6a264c91ea8b5030fadaa8e538b020f0a387421a12de9319dc93368"
        );
        assert_eq!(
            hex::encode(&node.public_key),
            "03501e454bf00751f24b1b489aa925215d66af2234e3891c3b21a52bedb3cd711c"
        );
    }

    #[test]
    fn fingerprint_law_holds() {
        let parent = derive("m/0'");
        let child = derive("m/0'/1");
        assert_eq!(child.parent_fingerprint, fingerprint(&parent.public_key));
        assert_eq!(child.parent_fingerprint, 0x5c1b_d648);
    }

    #[test]
    fn invalid_parent_secret_is_rejected() {
        let parent = DerivationNode::master([1u8; 32], vec![0u8; 32], vec![2u8; 33]);
        let index = DerivationIndex::hardened(0).unwrap();
        assert!(matches!(
            Secp256k1Deriver::new(SECP256K1_DEFAULT_KEY).child(&parent, index),
            Err(DerivationError::InvalidKey(_))
        ));
    }
}
