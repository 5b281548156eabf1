//! ed25519 key derivation — SLIP-0010.
//!
//! ed25519 has no public-key derivation, so every child index is treated as
//! hardened whatever the path says.

use ed25519_dalek::SigningKey;

use super::{hmac_sha512_split, secret_array, NodeDeriver};
use crate::{paths::DerivationIndex, DerivationError, DerivationNode};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Ed25519Deriver<'a> {
    key: &'a str,
}

impl<'a> Ed25519Deriver<'a> {
    pub(crate) const fn new(key: &'a str) -> Self {
        Self { key }
    }
}

fn public_key(secret: &[u8; 32]) -> Vec<u8> {
    SigningKey::from_bytes(secret)
        .verifying_key()
        .to_bytes()
        .to_vec()
}

impl NodeDeriver for Ed25519Deriver<'_> {
    fn master(&self, seed: &[u8]) -> Result<DerivationNode, DerivationError> {
        let (il, ir) = hmac_sha512_split(self.key.as_bytes(), &[seed])?;
        Ok(DerivationNode::master(ir, il.to_vec(), public_key(&il)))
    }

    fn child(
        &self,
        parent: &DerivationNode,
        index: DerivationIndex,
    ) -> Result<DerivationNode, DerivationError> {
        let index = index.to_hardened();
        let secret = secret_array::<32>(parent)?;

        let (il, ir) = hmac_sha512_split(
            &parent.chain_code,
            &[&[0x00], secret.as_slice(), &index.masked().to_be_bytes()],
        )?;

        parent.child(index.masked(), ir, il.to_vec(), public_key(&il))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ED25519_DEFAULT_KEY, paths};

    fn derive(path: &str) -> DerivationNode {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        Ed25519Deriver::new(ED25519_DEFAULT_KEY)
            .derive_path(&seed, &paths::parse(path).unwrap())
            .unwrap()
    }

    #[test]
    fn slip10_vector_1_master() {
        let node = derive("");
        assert_eq!(
            hex::encode(&node.secret_key),
            "2b4be7f19ee27bbf30c667b642d5f4aa69fd169872f8fc3059c08ebae2eb19e7"
        );
        assert_eq!(
            hex::encode(node.chain_code),
            "90046a93de5380a72b5e45010748567d5ea02bbf6522f979e05c0d8d8ca9fffb"
        );
        assert_eq!(
            hex::encode(&node.public_key),
            "a4b2856bfec510abab89753fac1ac0e1112364e7d250545963f135f2a33188ed"
        );
    }

    #[test]
    fn slip10_vector_1_first_child() {
        let node = derive("m/0'");
        assert_eq!(node.depth, 1);
        assert_eq!(
            node.parent_fingerprint,
            crate::node::fingerprint(&derive("").public_key)
        );
        assert_eq!(node.index, 0x8000_0000);
        assert_eq!(
            hex::encode(&node.secret_key),
            "68e0fe46dfb67e368c75379acec591dad19df3cde26e63b93a8e704f1dade7a3"
        );
        assert_eq!(
            hex::encode(node.chain_code),
            "8b59aa11380b624e81507a27fedda59fea6d0b779a778918a2fd3590e16e9c69"
        );
        assert_eq!(
            hex::encode(&node.public_key),
            "8c8a13df77a28f3445213a0f432fde644acaa215fc72dcdf300d5efaa85d350c"
        );
    }

    #[test]
    fn every_child_is_hardened() {
        assert_eq!(derive("m/0"), derive("m/0'"));
        assert_eq!(derive("m/5/7h"), derive("m/5'/7'"));
    }
}
