//! sr25519 key derivation, Substrate flavour.
//!
//! Junction chain codes are the unmasked index encoded little-endian into 32
//! bytes. Hardened indices use schnorrkel hard derivation (a new mini-secret),
//! normal indices use soft derivation.

use rand_chacha::{rand_core::SeedableRng, ChaCha20Rng};
use schnorrkel::{
    derive::{ChainCode, Derivation},
    ExpansionMode, MiniSecretKey, SecretKey,
};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::{secret_array, NodeDeriver};
use crate::{
    binding::Sr25519Binding, config::Sr25519Compatibility, node::CHAIN_CODE_LEN,
    paths::DerivationIndex, DerivationError, DerivationNode,
};

/// Length of a mini-secret, the master seed consumed by [`Sr25519Deriver`].
const MINI_SECRET_LEN: usize = 32;

/// Domain separator for the soft-derivation nonce stream.
const SOFT_NONCE_DOMAIN: &[u8] = b"hd-key-deriv/sr25519/soft-nonce";

#[derive(Debug, Clone, Copy)]
pub(crate) struct Sr25519Deriver<'a> {
    binding: &'a Sr25519Binding,
    compatibility: Sr25519Compatibility,
}

impl<'a> Sr25519Deriver<'a> {
    pub(crate) const fn new(
        binding: &'a Sr25519Binding,
        compatibility: Sr25519Compatibility,
    ) -> Self {
        Self {
            binding,
            compatibility,
        }
    }

    fn check(&self) -> Result<(), DerivationError> {
        self.binding.check_ready()?;
        match self.compatibility {
            Sr25519Compatibility::Substrate => Ok(()),
            Sr25519Compatibility::Standard => {
                Err(DerivationError::NotImplemented("sr25519 standard derivation"))
            }
        }
    }
}

/// Chain code of a Substrate junction for a numeric index.
fn junction_chain_code(index: DerivationIndex) -> [u8; CHAIN_CODE_LEN] {
    let mut chain_code = [0u8; CHAIN_CODE_LEN];
    chain_code[..4].copy_from_slice(&index.value().to_le_bytes());
    chain_code
}

fn node_keys(secret: &SecretKey) -> (Vec<u8>, Vec<u8>) {
    (
        secret.to_ed25519_bytes().to_vec(),
        secret.to_public().to_bytes().to_vec(),
    )
}

impl NodeDeriver for Sr25519Deriver<'_> {
    fn master(&self, seed: &[u8]) -> Result<DerivationNode, DerivationError> {
        self.check()?;

        let mini = seed
            .get(..MINI_SECRET_LEN)
            .ok_or_else(|| {
                DerivationError::InvalidKey(format!(
                    "sr25519 needs a {MINI_SECRET_LEN}-byte mini-secret, got {} bytes",
                    seed.len()
                ))
            })
            .and_then(|bytes| {
                MiniSecretKey::from_bytes(bytes)
                    .map_err(|e| DerivationError::InvalidKey(format!("sr25519 mini-secret: {e}")))
            })?;

        let (secret_key, public_key) = node_keys(&mini.expand(ExpansionMode::Ed25519));
        Ok(DerivationNode::master(
            [0u8; CHAIN_CODE_LEN],
            secret_key,
            public_key,
        ))
    }

    fn child(
        &self,
        parent: &DerivationNode,
        index: DerivationIndex,
    ) -> Result<DerivationNode, DerivationError> {
        self.check()?;

        let parent_bytes = secret_array::<64>(parent)?;
        let parent_secret = SecretKey::from_ed25519_bytes(parent_bytes.as_slice())
            .map_err(|e| DerivationError::InvalidKey(format!("sr25519 parent secret: {e}")))?;
        let chain_code = junction_chain_code(index);

        let child_secret = if index.is_hardened() {
            let (mini, _) =
                parent_secret.hard_derive_mini_secret_key(Some(ChainCode(chain_code)), b"");
            mini.expand(ExpansionMode::Ed25519)
        } else {
            // Seed the nonce stream from the parent secret so soft children are
            // reproducible.
            let digest = Sha256::new()
                .chain_update(SOFT_NONCE_DOMAIN)
                .chain_update(parent_bytes.as_slice())
                .chain_update(chain_code)
                .finalize();
            let mut nonce_seed = Zeroizing::new([0u8; 32]);
            nonce_seed.copy_from_slice(&digest);

            let rng = ChaCha20Rng::from_seed(*nonce_seed);
            let (secret, _) =
                parent_secret.derived_key_simple_rng(ChainCode(chain_code), b"", rng);
            secret
        };

        let (secret_key, public_key) = node_keys(&child_secret);
        parent.child(index.masked(), chain_code, secret_key, public_key)
    }
}

#[cfg(test)]
mod tests {
    use schnorrkel::PublicKey;

    use super::*;
    use crate::paths;

    const MINI_SECRET: &str = "55a1417bbfacd64e069b4d07e47fb34ce9ff53b15556698038604f002524aec0";

    async fn ready_binding() -> Sr25519Binding {
        let binding = Sr25519Binding::new();
        binding.ensure_ready().await.unwrap();
        binding
    }

    fn derive(binding: &Sr25519Binding, path: &str) -> DerivationNode {
        let seed = hex::decode(MINI_SECRET).unwrap();
        Sr25519Deriver::new(binding, Sr25519Compatibility::Substrate)
            .derive_path(&seed, &paths::parse(path).unwrap())
            .unwrap()
    }

    #[tokio::test]
    async fn substrate_master_public_key() {
        let binding = ready_binding().await;
        let node = derive(&binding, "m/");
        assert_eq!(node.secret_key.len(), 64);
        assert_eq!(node.chain_code, [0u8; 32]);
        assert_eq!(
            hex::encode(&node.public_key),
            "52e1d70619678f95a0806fa5eb818fc938cd5f885a19c3fb242d0b0d0620ee10"
        );
    }

    #[tokio::test]
    async fn junction_chain_code_uses_unmasked_index() {
        let binding = ready_binding().await;
        let node = derive(&binding, "m/2'/7");
        assert_eq!(node.depth, 2);
        assert_eq!(node.index, 7);
        assert_eq!(&node.chain_code[..4], &7u32.to_le_bytes());
        assert!(node.chain_code[4..].iter().all(|b| *b == 0));

        let hardened = derive(&binding, "m/2'");
        assert_eq!(hardened.index, 0x8000_0002);
        assert_eq!(&hardened.chain_code[..4], &2u32.to_le_bytes());
    }

    #[tokio::test]
    async fn soft_derivation_is_deterministic_and_public() {
        let binding = ready_binding().await;
        let first = derive(&binding, "m/1/2");
        let second = derive(&binding, "m/1/2");
        assert_eq!(first, second);

        // Soft children are reachable from the parent public key alone.
        let parent = derive(&binding, "m/1");
        let parent_public = PublicKey::from_bytes(&parent.public_key).unwrap();
        let chain_code = junction_chain_code(DerivationIndex::normal(2).unwrap());
        let (child_public, _) = parent_public.derived_key_simple(ChainCode(chain_code), b"");
        assert_eq!(child_public.to_bytes().to_vec(), first.public_key);
    }

    #[tokio::test]
    async fn hard_and_soft_children_differ() {
        let binding = ready_binding().await;
        assert_ne!(
            derive(&binding, "m/1").public_key,
            derive(&binding, "m/1'").public_key
        );
    }

    #[test]
    fn refuses_to_run_before_ready() {
        let binding = Sr25519Binding::new();
        let seed = hex::decode(MINI_SECRET).unwrap();
        assert!(matches!(
            Sr25519Deriver::new(&binding, Sr25519Compatibility::Substrate).master(&seed),
            Err(DerivationError::NativeBindingNotReady(_))
        ));
    }

    #[tokio::test]
    async fn standard_is_not_implemented() {
        let binding = ready_binding().await;
        let seed = hex::decode(MINI_SECRET).unwrap();
        assert!(matches!(
            Sr25519Deriver::new(&binding, Sr25519Compatibility::Standard).master(&seed),
            Err(DerivationError::NotImplemented(_))
        ));
    }

    #[tokio::test]
    async fn short_seed_is_rejected() {
        let binding = ready_binding().await;
        assert!(matches!(
            Sr25519Deriver::new(&binding, Sr25519Compatibility::Substrate).master(&[0u8; 16]),
            Err(DerivationError::InvalidKey(_))
        ));
    }
}
