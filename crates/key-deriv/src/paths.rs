//! Derivation path parsing.
//!
//! # Grammar
//!
//! ```text
//! path    := "" | "m/" | "m/" segment ("/" segment)*
//! segment := digit+ ("'" | "h")?
//! ```
//!
//! Every segment becomes a [`DerivationIndex`]. The empty path and `m/` both
//! address the master node. Node depth is a single byte, so a path has at most
//! [`MAX_DEPTH`] segments.

use std::{fmt, str::FromStr};

use crate::DerivationError;

/// Bit set on a child index to mark it as hardened.
pub const HARDENED_BIT: u32 = 0x8000_0000;

/// Deepest node a path may address.
pub const MAX_DEPTH: usize = u8::MAX as usize;

/// One step of a derivation path.
///
/// # Invariants
///
/// `value < 2^31`, and `masked == value | HARDENED_BIT` exactly when the index is
/// hardened (otherwise `masked == value`). The fields are private so the only
/// way to build one is through the checked constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerivationIndex {
    value: u32,
    masked: u32,
    is_hardened: bool,
}

impl DerivationIndex {
    /// Creates a non-hardened index. Returns `None` if `value` has the top bit set.
    pub const fn normal(value: u32) -> Option<Self> {
        if value & HARDENED_BIT != 0 {
            return None;
        }
        Some(Self {
            value,
            masked: value,
            is_hardened: false,
        })
    }

    /// Creates a hardened index. Returns `None` if `value` has the top bit set.
    pub const fn hardened(value: u32) -> Option<Self> {
        if value & HARDENED_BIT != 0 {
            return None;
        }
        Some(Self {
            value,
            masked: value | HARDENED_BIT,
            is_hardened: true,
        })
    }

    /// Rebuilds an index from its masked wire form.
    pub const fn from_masked(masked: u32) -> Self {
        Self {
            value: masked & !HARDENED_BIT,
            masked,
            is_hardened: masked & HARDENED_BIT != 0,
        }
    }

    /// The 31-bit magnitude of the index.
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// The index with the hardened bit applied if hardened.
    pub const fn masked(&self) -> u32 {
        self.masked
    }

    /// Whether the index is hardened.
    pub const fn is_hardened(&self) -> bool {
        self.is_hardened
    }

    /// The same magnitude with the hardened bit forced on.
    pub const fn to_hardened(self) -> Self {
        Self {
            value: self.value,
            masked: self.value | HARDENED_BIT,
            is_hardened: true,
        }
    }

    /// The next index of the same kind, or `None` once the 31-bit space is used up.
    pub const fn successor(self) -> Option<Self> {
        let next = self.value + 1;
        if self.is_hardened {
            Self::hardened(next)
        } else {
            Self::normal(next)
        }
    }
}

impl fmt::Display for DerivationIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_hardened {
            write!(f, "{}'", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

impl FromStr for DerivationIndex {
    type Err = DerivationError;

    /// Parses a single path segment such as `44'`, `0h` or `7`.
    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        let (digits, hardened) = match segment.strip_suffix(['\'', 'h']) {
            Some(digits) => (digits, true),
            None => (segment, false),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DerivationError::malformed_path(
                segment,
                format!("segment {segment:?} is not a decimal index"),
            ));
        }

        let too_large = || {
            DerivationError::malformed_path(segment, format!("index {digits} does not fit in 31 bits"))
        };
        let value: u32 = digits.parse().map_err(|_| too_large())?;

        let index = if hardened {
            Self::hardened(value)
        } else {
            Self::normal(value)
        };

        index.ok_or_else(too_large)
    }
}

/// Parses a derivation path into its ordered list of indices.
///
/// `""` and `"m/"` yield an empty list, which addresses the master node.
pub fn parse(path: &str) -> Result<Vec<DerivationIndex>, DerivationError> {
    if path.is_empty() || path == "m/" {
        return Ok(Vec::new());
    }

    let Some(segments) = path.strip_prefix("m/") else {
        return Err(DerivationError::malformed_path(path, "path must start with \"m/\""));
    };

    let indices = segments
        .split('/')
        .map(|segment| segment.parse::<DerivationIndex>().map_err(|err| err.at_path(path)))
        .collect::<Result<Vec<_>, _>>()?;

    if indices.len() > MAX_DEPTH {
        return Err(DerivationError::malformed_path(
            path,
            format!("path is {} levels deep, at most {MAX_DEPTH} are allowed", indices.len()),
        ));
    }

    Ok(indices)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn master_paths_are_empty() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("m/").unwrap().is_empty());
    }

    #[test]
    fn parses_mixed_path() {
        let indices = parse("m/44'/60h/0'/0/7").unwrap();
        let masked: Vec<u32> = indices.iter().map(DerivationIndex::masked).collect();
        assert_eq!(
            masked,
            vec![0x8000_002c, 0x8000_003c, 0x8000_0000, 0, 7]
        );
        assert_eq!(indices[3].value(), 0);
        assert!(!indices[4].is_hardened());
    }

    #[test]
    fn rejects_malformed_paths() {
        for path in [
            "m",
            "44'/0'",
            "m//0",
            "m/0/",
            "m/-1",
            "m/+1",
            "m/ 1",
            "m/1''",
            "m/0x10",
            "m/2147483648",
            "m/4294967296'",
            "n/0",
        ] {
            assert!(
                matches!(parse(path), Err(DerivationError::MalformedPath { .. })),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn largest_index_is_accepted() {
        let indices = parse("m/2147483647'").unwrap();
        assert_eq!(indices[0].masked(), u32::MAX);
        assert_eq!(indices[0].successor(), None);
    }

    #[test]
    fn from_masked_recovers_hardened_flag() {
        let index = DerivationIndex::from_masked(0x8000_0005);
        assert!(index.is_hardened());
        assert_eq!(index.value(), 5);
        assert_eq!(index, DerivationIndex::hardened(5).unwrap());
    }

    #[test]
    fn depth_is_capped_at_one_byte() {
        let path_of = |depth: usize| format!("m/{}", vec!["0'"; depth].join("/"));

        assert_eq!(parse(&path_of(MAX_DEPTH)).unwrap().len(), 255);
        assert!(matches!(
            parse(&path_of(MAX_DEPTH + 1)),
            Err(DerivationError::MalformedPath { path, .. }) if path == path_of(256)
        ));
    }

    #[test]
    fn segment_errors_carry_the_whole_path() {
        let Err(DerivationError::MalformedPath { path, reason }) = parse("m/44'/x/0") else {
            panic!("malformed path expected");
        };
        assert_eq!(path, "m/44'/x/0");
        assert!(reason.contains("\"x\""));
    }

    proptest! {
        #[test]
        fn hardened_bit_law(
            values in prop::collection::vec((0u32..HARDENED_BIT, any::<bool>()), 0..8)
        ) {
            let path = std::iter::once("m".to_owned())
                .chain(values.iter().map(|(v, h)| if *h { format!("{v}'") } else { v.to_string() }))
                .collect::<Vec<_>>()
                .join("/");
            let path = if values.is_empty() { "m/".to_owned() } else { path };

            let indices = parse(&path).unwrap();
            prop_assert_eq!(indices.len(), values.len());
            for (index, (value, hardened)) in indices.iter().zip(values.iter()) {
                prop_assert_eq!(index.value(), *value);
                prop_assert_eq!(index.is_hardened(), *hardened);
                prop_assert_eq!(index.masked() & HARDENED_BIT != 0, *hardened);
            }
        }
    }
}
