//! Unit-aware addressing.
//!
//! Every offset, size or boundary handed to a [`Blob`](crate::Blob) carries
//! its unit explicitly. [`Locator`] extends that with separator searches, and
//! `Blob::absolute_bit_index` turns any of them into one absolute bit index.

use crate::error::{BlobError, Result};
use std::fmt;

/// A position or width expressed in bytes or in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    Byte(i64),
    Bit(i64),
}

impl Address {
    /// The raw value, in this address's own unit.
    pub fn value(self) -> i64 {
        match self {
            Address::Byte(n) | Address::Bit(n) => n,
        }
    }

    /// The value converted to bits.
    pub fn to_bits(self) -> i64 {
        match self {
            Address::Byte(n) => n.saturating_mul(8),
            Address::Bit(n) => n,
        }
    }

    pub fn is_bit(self) -> bool {
        matches!(self, Address::Bit(_))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Byte(n) => write!(f, "{} bytes", n),
            Address::Bit(n) => write!(f, "{} bits", n),
        }
    }
}

/// Parses `12`, `12byte(s)` or `12B` as bytes and `12bit(s)` or `12b` as bits.
impl std::str::FromStr for Address {
    type Err = BlobError;
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '-' || c == '+'))
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(split);
        let value: i64 = number
            .parse()
            .map_err(|_| BlobError::InvalidAddressUnit(format!("not a number: {:?}", s)))?;

        match unit.trim() {
            "" | "B" | "byte" | "bytes" => Ok(Address::Byte(value)),
            "b" | "bit" | "bits" => Ok(Address::Bit(value)),
            other => Err(BlobError::InvalidAddressUnit(format!(
                "unknown unit {:?} in {:?}",
                other, s
            ))),
        }
    }
}

/// Anything that can be resolved to an absolute bit index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Byte(i64),
    Bit(i64),
    /// First (or last) occurrence of a byte pattern.
    ByteSep(Vec<u8>),
    /// First (or last) occurrence of a bit pattern of `'0'`/`'1'` characters.
    BitSep(String),
}

impl Locator {
    pub fn sep(pattern: impl AsRef<[u8]>) -> Self {
        Locator::ByteSep(pattern.as_ref().to_vec())
    }

    pub fn sep_bits(pattern: impl Into<String>) -> Self {
        Locator::BitSep(pattern.into())
    }
}

impl From<Address> for Locator {
    fn from(address: Address) -> Self {
        match address {
            Address::Byte(n) => Locator::Byte(n),
            Address::Bit(n) => Locator::Bit(n),
        }
    }
}

/// Resolve a possibly negative bit index against a total length.
/// Negative indices count from the end and clamp at zero.
pub(crate) fn resolve_signed(index: i64, total_bits: usize) -> usize {
    if index >= 0 {
        index as usize
    } else {
        (total_bits as i64).saturating_add(index).max(0) as usize
    }
}

/// Find the first (or last) occurrence of `needle` in `haystack`.
pub(crate) fn find_subslice<T: PartialEq>(haystack: &[T], needle: &[T], from_end: bool) -> Option<usize> {
    if needle.is_empty() {
        return Some(if from_end { haystack.len() } else { 0 });
    }
    if needle.len() > haystack.len() {
        return None;
    }
    let mut windows = haystack.windows(needle.len());
    if from_end {
        windows.rposition(|w| w == needle)
    } else {
        windows.position(|w| w == needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_to_bits() {
        assert_eq!(Address::Byte(3).to_bits(), 24);
        assert_eq!(Address::Byte(-1).to_bits(), -8);
        assert_eq!(Address::Bit(5).to_bits(), 5);
    }

    #[test]
    fn test_address_from_str() {
        assert_eq!("12".parse::<Address>().unwrap(), Address::Byte(12));
        assert_eq!("-3bytes".parse::<Address>().unwrap(), Address::Byte(-3));
        assert_eq!("16bits".parse::<Address>().unwrap(), Address::Bit(16));
        assert_eq!("7b".parse::<Address>().unwrap(), Address::Bit(7));
        assert!(matches!(
            "7 nibbles".parse::<Address>(),
            Err(BlobError::InvalidAddressUnit(_))
        ));
        assert!(matches!(
            "bits".parse::<Address>(),
            Err(BlobError::InvalidAddressUnit(_))
        ));
    }

    #[test]
    fn test_resolve_signed() {
        assert_eq!(resolve_signed(5, 32), 5);
        assert_eq!(resolve_signed(-8, 32), 24);
        assert_eq!(resolve_signed(-100, 32), 0);
        assert_eq!(resolve_signed(0, 32), 0);
    }

    #[test]
    fn test_find_subslice() {
        assert_eq!(find_subslice(b"ABCABC", b"BC", false), Some(1));
        assert_eq!(find_subslice(b"ABCABC", b"BC", true), Some(4));
        assert_eq!(find_subslice(b"ABC", b"X", false), None);
        assert_eq!(find_subslice(b"AB", b"ABC", false), None);
    }
}
