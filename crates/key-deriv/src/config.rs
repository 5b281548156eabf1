//! Caller-supplied configuration: which algorithm to derive for, and engine settings.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{codec::Bip32Versions, DerivationError};

/// Default HMAC key for the secp256k1 master node.
pub const SECP256K1_DEFAULT_KEY: &str = "Bitcoin seed";

/// Default HMAC key for the ed25519 master node.
pub const ED25519_DEFAULT_KEY: &str = "ed25519 seed";

/// Algorithm tag, as found in external input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// BIP32 over secp256k1.
    Secp256k1,
    /// SLIP-0010 over ed25519.
    Ed25519,
    /// Substrate HDKD over sr25519.
    Sr25519,
    /// ZIP32 over Sapling.
    Sapling,
}

impl Algorithm {
    /// The tag used on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Secp256k1 => "secp256k1",
            Self::Ed25519 => "ed25519",
            Self::Sr25519 => "sr25519",
            Self::Sapling => "sapling",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = DerivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "secp256k1" => Ok(Self::Secp256k1),
            "ed25519" => Ok(Self::Ed25519),
            "sr25519" => Ok(Self::Sr25519),
            "sapling" => Ok(Self::Sapling),
            other => Err(DerivationError::UnsupportedAlgorithm(other.to_owned())),
        }
    }
}

/// Post-processing applied to a BIP-39 seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SecretType {
    /// The 64-byte seed, unchanged.
    #[default]
    Secret,
    /// The two 32-byte halves of the seed XORed together.
    MiniSecretXor,
}

impl SecretType {
    /// The tag used on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Secret => "secret",
            Self::MiniSecretXor => "miniSecretXor",
        }
    }
}

impl FromStr for SecretType {
    type Err = DerivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "secret" => Ok(Self::Secret),
            "miniSecretXor" => Ok(Self::MiniSecretXor),
            other => Err(DerivationError::UnsupportedSecretType(other.to_owned())),
        }
    }
}

impl TryFrom<String> for SecretType {
    type Error = DerivationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SecretType> for String {
    fn from(secret_type: SecretType) -> Self {
        secret_type.as_str().to_owned()
    }
}

/// Which sr25519 derivation flavour to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sr25519Compatibility {
    /// Non-Substrate derivation. Has no agreed-upon definition yet.
    Standard,
    /// Substrate mini-secret seeds with schnorrkel hard/soft junctions.
    Substrate,
}

/// Selects the algorithm and its parameters for one protocol.
///
/// Built once per protocol and only ever read. It holds no secret state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum CryptoConfiguration {
    /// SLIP-0010 ed25519.
    Ed25519 {
        /// Domain-separation key for the master HMAC.
        #[serde(default = "default_ed25519_key")]
        key: String,
        /// BIP-39 seed post-processing.
        #[serde(default, rename = "secretType")]
        secret_type: SecretType,
    },
    /// BIP32 secp256k1.
    Secp256k1 {
        /// Domain-separation key for the master HMAC.
        #[serde(default = "default_secp256k1_key")]
        key: String,
        /// BIP-39 seed post-processing.
        #[serde(default, rename = "secretType")]
        secret_type: SecretType,
    },
    /// Substrate sr25519.
    Sr25519 {
        /// Derivation flavour.
        compatibility: Sr25519Compatibility,
    },
    /// ZIP32 Sapling.
    Sapling {
        /// BIP-39 seed post-processing.
        #[serde(default, rename = "secretType")]
        secret_type: SecretType,
    },
}

fn default_ed25519_key() -> String {
    ED25519_DEFAULT_KEY.to_owned()
}

fn default_secp256k1_key() -> String {
    SECP256K1_DEFAULT_KEY.to_owned()
}

impl CryptoConfiguration {
    /// The algorithm this configuration selects.
    pub const fn algorithm(&self) -> Algorithm {
        match self {
            Self::Ed25519 { .. } => Algorithm::Ed25519,
            Self::Secp256k1 { .. } => Algorithm::Secp256k1,
            Self::Sr25519 { .. } => Algorithm::Sr25519,
            Self::Sapling { .. } => Algorithm::Sapling,
        }
    }
}

impl From<Algorithm> for CryptoConfiguration {
    /// The usual configuration for each algorithm; sr25519 defaults to Substrate.
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Secp256k1 => Self::Secp256k1 {
                key: default_secp256k1_key(),
                secret_type: SecretType::Secret,
            },
            Algorithm::Ed25519 => Self::Ed25519 {
                key: default_ed25519_key(),
                secret_type: SecretType::Secret,
            },
            Algorithm::Sr25519 => Self::Sr25519 {
                compatibility: Sr25519Compatibility::Substrate,
            },
            Algorithm::Sapling => Self::Sapling {
                secret_type: SecretType::Secret,
            },
        }
    }
}

/// Engine-wide settings.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Version bytes used by the bip32 codec.
    #[serde(default)]
    pub bip32: Bip32Versions,
}
