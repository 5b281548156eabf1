//! Node codecs.
//!
//! Every codec serializes a [`DerivationNode`] twice, once with its secret key
//! and once with its public key, over the same header:
//!
//! ```text
//! depth (1) ‖ parent fingerprint (4, BE) ‖ index (4) ‖ chain code (32) ‖ key
//! ```
//!
//! The index is big-endian except in the ZIP32 forms, where it is little-endian.
//! Decoding requires both halves to carry the same header.

pub(crate) mod bip32;
pub(crate) mod bytes;
pub(crate) mod hex;
pub(crate) mod zip32;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{node::CHAIN_CODE_LEN, DerivationError, DerivationNode};

/// Length of the shared header that precedes the key.
pub(crate) const HEADER_LEN: usize = 1 + 4 + 4 + CHAIN_CODE_LEN;

/// Output format selected by the caller of an encode operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DerivativeFormat {
    /// Base58-check extended keys.
    Bip32,
    /// Hex of the raw layout.
    Hex,
    /// Raw layout bytes.
    Bytes,
    /// Hex of the ZIP32 layout (little-endian index).
    Zip32,
}

impl DerivativeFormat {
    /// The tag used on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bip32 => "bip32",
            Self::Hex => "hex",
            Self::Bytes => "bytes",
            Self::Zip32 => "zip32",
        }
    }
}

impl fmt::Display for DerivativeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DerivativeFormat {
    type Err = DerivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bip32" => Ok(Self::Bip32),
            "hex" => Ok(Self::Hex),
            "bytes" => Ok(Self::Bytes),
            "zip32" => Ok(Self::Zip32),
            other => Err(DerivationError::UnsupportedFormat(other.to_owned())),
        }
    }
}

/// Version bytes prefixed to bip32 extended keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bip32Versions {
    /// Version of the extended secret key (`xprv` on mainnet).
    pub secret: u32,
    /// Version of the extended public key (`xpub` on mainnet).
    pub public: u32,
}

impl Bip32Versions {
    /// `xprv` / `xpub`.
    pub const MAINNET: Self = Self {
        secret: 0x0488_ade4,
        public: 0x0488_b21e,
    };

    /// `tprv` / `tpub`.
    pub const TESTNET: Self = Self {
        secret: 0x0435_8394,
        public: 0x0435_87cf,
    };
}

impl Default for Bip32Versions {
    fn default() -> Self {
        Self::MAINNET
    }
}

/// A secret/public pair of textual encodings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct EncodedKeys {
    /// Encoding of the node with its secret key.
    pub secret_key: String,
    /// Encoding of the node with its public key.
    pub public_key: String,
}

/// A secret/public pair of raw byte encodings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct EncodedKeyBytes {
    /// Encoding of the node with its secret key.
    pub secret_key: Vec<u8>,
    /// Encoding of the node with its public key.
    pub public_key: Vec<u8>,
}

impl fmt::Debug for EncodedKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedKeys")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for EncodedKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedKeyBytes")
            .field("public_key", &::hex::encode(&self.public_key))
            .finish_non_exhaustive()
    }
}

/// An encoded node, tagged with its format.
///
/// `zip32bytes` is only produced by callers holding raw ZIP32 buffers; the
/// engine accepts it on decode but never emits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EncodedDerivative {
    /// Base58-check extended keys.
    Bip32(EncodedKeys),
    /// Hex of the raw layout.
    Hex(EncodedKeys),
    /// Raw layout bytes.
    Bytes(EncodedKeyBytes),
    /// Hex of the ZIP32 layout.
    Zip32(EncodedKeys),
    /// Raw ZIP32 layout bytes.
    Zip32Bytes(EncodedKeyBytes),
}

impl EncodedDerivative {
    /// The `type` tag of this encoding.
    pub const fn type_tag(&self) -> &'static str {
        match self {
            Self::Bip32(_) => "bip32",
            Self::Hex(_) => "hex",
            Self::Bytes(_) => "bytes",
            Self::Zip32(_) => "zip32",
            Self::Zip32Bytes(_) => "zip32bytes",
        }
    }
}

/// Byte order of the index field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IndexOrder {
    /// BIP32 and the raw forms.
    BigEndian,
    /// ZIP32.
    LittleEndian,
}

/// The header fields of one encoded half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
    pub(crate) depth: u8,
    pub(crate) parent_fingerprint: u32,
    pub(crate) index: u32,
    pub(crate) chain_code: [u8; CHAIN_CODE_LEN],
}

/// Appends `header ‖ key` for `node` to `out`.
pub(crate) fn write_layout(
    node: &DerivationNode,
    key: &[u8],
    order: IndexOrder,
    out: &mut Vec<u8>,
) {
    let index = match order {
        IndexOrder::BigEndian => node.index.to_be_bytes(),
        IndexOrder::LittleEndian => node.index.to_le_bytes(),
    };

    out.reserve(HEADER_LEN + key.len());
    out.push(node.depth);
    out.extend_from_slice(&node.parent_fingerprint.to_be_bytes());
    out.extend_from_slice(&index);
    out.extend_from_slice(&node.chain_code);
    out.extend_from_slice(key);
}

/// Splits `bytes` into its header and key. The key must not be empty.
pub(crate) fn read_layout<'a>(
    bytes: &'a [u8],
    order: IndexOrder,
    side: &str,
) -> Result<(Header, &'a [u8]), DerivationError> {
    if bytes.len() <= HEADER_LEN {
        return Err(DerivationError::MalformedEncoding(format!(
            "{side} key payload is {} bytes, expected more than {HEADER_LEN}",
            bytes.len()
        )));
    }

    let (header, key) = bytes.split_at(HEADER_LEN);
    let word = |at: usize| [header[at], header[at + 1], header[at + 2], header[at + 3]];

    let mut chain_code = [0u8; CHAIN_CODE_LEN];
    chain_code.copy_from_slice(&header[9..]);

    let header = Header {
        depth: header[0],
        parent_fingerprint: u32::from_be_bytes(word(1)),
        index: match order {
            IndexOrder::BigEndian => u32::from_be_bytes(word(5)),
            IndexOrder::LittleEndian => u32::from_le_bytes(word(5)),
        },
        chain_code,
    };

    Ok((header, key))
}

/// Joins two decoded halves into a node, requiring identical headers.
pub(crate) fn join(
    (secret_header, secret_key): (Header, &[u8]),
    (public_header, public_key): (Header, &[u8]),
) -> Result<DerivationNode, DerivationError> {
    if secret_header != public_header {
        return Err(DerivationError::DerivationKeyMismatch);
    }

    Ok(DerivationNode {
        depth: secret_header.depth,
        parent_fingerprint: secret_header.parent_fingerprint,
        index: secret_header.index,
        chain_code: secret_header.chain_code,
        secret_key: secret_key.to_vec(),
        public_key: public_key.to_vec(),
    })
}
