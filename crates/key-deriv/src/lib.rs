//! Multi-curve hierarchical deterministic key derivation and key encoding.
//!
//! Given a seed and a derivation path, this crate deterministically derives a
//! chain of secret/public key pairs for one of four algorithms, and serializes
//! the resulting nodes into standard external formats.
//!
//! | Algorithm   | Rule       | Secret | Public |
//! |-------------|------------|--------|--------|
//! | `secp256k1` | BIP32      | 32     | 33     |
//! | `ed25519`   | SLIP-0010  | 32     | 32     |
//! | `sr25519`   | Substrate  | 64     | 32     |
//! | `sapling`   | ZIP32      | 128    | 128    |
//!
//! # Usage
//!
//! ```rust,ignore
//! use hd_key_deriv::{Algorithm, CryptoConfiguration, DerivativeFormat, EngineConfig, KeyEngine};
//!
//! let engine = KeyEngine::new(EngineConfig::default());
//! engine.ensure_ready().await?; // only needed for sr25519
//!
//! let config = CryptoConfiguration::from(Algorithm::Secp256k1);
//! let seed = engine.seed_from_mnemonic(&config, mnemonic, None)?;
//! let derivative = engine.derive(&config, &seed, Some("m/44'/0'/0'/0/0"))?;
//!
//! let xkeys = engine.encode_derivative(DerivativeFormat::Bip32, &derivative)?;
//! assert_eq!(engine.decode_derivative(&xkeys)?, derivative);
//! ```
//!
//! # Security
//!
//! Seeds are returned in [`zeroize::Zeroizing`] buffers, nodes wipe their keys on
//! drop, and no secret ever reaches a log line or a `Debug` rendering.

mod binding;
mod codec;
mod config;
mod deriver;
mod engine;
mod error;
mod node;
pub mod paths;
mod seed;

pub use binding::Sr25519Binding;
pub use codec::{Bip32Versions, DerivativeFormat, EncodedDerivative, EncodedKeyBytes, EncodedKeys};
pub use config::{
    Algorithm, CryptoConfiguration, EngineConfig, SecretType, Sr25519Compatibility,
    ED25519_DEFAULT_KEY, SECP256K1_DEFAULT_KEY,
};
pub use engine::KeyEngine;
pub use error::DerivationError;
pub use node::{CryptoDerivative, CHAIN_CODE_LEN};
pub use paths::DerivationIndex;

pub(crate) use node::DerivationNode;
