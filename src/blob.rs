//! The [`Blob`] value type.
//!
//! A blob holds binary content either as bytes or as a bit string and fills in
//! the other encoding the first time it is asked for. Both caches only ever go
//! from empty to filled, so a shared reference is enough to read either view.

use crate::address::{find_subslice, resolve_signed, Locator};
use crate::bits;
use crate::error::{BlobError, Result};
use std::cell::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

#[derive(Clone)]
pub struct Blob {
    bytes: OnceCell<Vec<u8>>,
    bits: OnceCell<String>,
    filename: Option<String>,
    blocksize_bits: Option<usize>,
}

impl Blob {
    /// Create a blob from raw bytes.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: OnceCell::from(data.into()),
            bits: OnceCell::new(),
            filename: None,
            blocksize_bits: None,
        }
    }

    /// Create a blob from a string of `'0'` and `'1'` characters.
    /// Any bit length is accepted.
    pub fn from_bits(bits: impl Into<String>) -> Result<Self> {
        let bits = bits.into();
        bits::validate_bitstr(&bits)?;
        Ok(Self::from_bits_unchecked(bits))
    }

    /// Read a whole file into a blob. `dirname` defaults to the current
    /// directory.
    pub fn from_file(dirname: Option<&Path>, filename: &str) -> Result<Self> {
        let path = dirname.unwrap_or_else(|| Path::new(".")).join(filename);
        let data = std::fs::read(&path)?;
        let mut blob = Self::from_bytes(data);
        blob.filename = Some(filename.to_string());
        Ok(blob)
    }

    pub fn empty() -> Self {
        Self::from_bytes(Vec::new())
    }

    pub(crate) fn from_bits_unchecked(bits: String) -> Self {
        Self {
            bytes: OnceCell::new(),
            bits: OnceCell::from(bits),
            filename: None,
            blocksize_bits: None,
        }
    }

    //
    // Views
    //

    /// The content as bytes, converting from the bit string on first use.
    /// Fails with [`BlobError::PartialByte`] if the blob is not byte-aligned.
    pub fn bytes(&self) -> Result<&[u8]> {
        if let Some(bytes) = self.bytes.get() {
            return Ok(bytes);
        }
        let converted = bits::from_bitstr(self.bits())?;
        Ok(self.bytes.get_or_init(|| converted))
    }

    /// The content as a bit string, converting from bytes on first use.
    pub fn bits(&self) -> &str {
        self.bits.get_or_init(|| {
            bits::to_bitstr(self.bytes.get().map(Vec::as_slice).unwrap_or_default())
        })
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(self.bytes()?.to_vec())
    }

    pub fn bytes_materialized(&self) -> bool {
        self.bytes.get().is_some()
    }

    pub fn bits_materialized(&self) -> bool {
        self.bits.get().is_some()
    }

    /// Replace the content of this blob, keeping its filename and block size.
    pub(crate) fn replace_content(&mut self, other: Blob) {
        self.bytes = other.bytes;
        self.bits = other.bits;
    }

    //
    // Size
    //

    /// The number of bits in the blob.
    pub fn size_bits(&self) -> usize {
        match (self.bits.get(), self.bytes.get()) {
            (Some(bits), _) => bits.len(),
            (None, Some(bytes)) => bytes.len() * 8,
            (None, None) => 0,
        }
    }

    /// The number of whole bytes in the blob.
    pub fn size(&self) -> usize {
        self.size_bits() / 8
    }

    pub fn is_empty(&self) -> bool {
        self.size_bits() == 0
    }

    /// True if the number of bits is divisible by 8.
    pub fn byte_aligned(&self) -> bool {
        self.size_bits() % 8 == 0
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    //
    // Configured block size
    //

    pub fn blocksize_bits(&self) -> Option<usize> {
        self.blocksize_bits
    }

    pub fn set_blocksize_bits(&mut self, bits: usize) -> Result<()> {
        if bits == 0 {
            return Err(BlobError::InvalidArgument("block size must be positive".into()));
        }
        self.blocksize_bits = Some(bits);
        Ok(())
    }

    pub fn set_blocksize_bytes(&mut self, bytes: usize) -> Result<()> {
        self.set_blocksize_bits(bytes * 8)
    }

    /// The configured block size in bytes, rounded up.
    pub fn blocksize_bytes(&self) -> Result<usize> {
        self.blocksize_bits
            .map(|bits| bits.div_ceil(8))
            .ok_or(BlobError::MissingBlockSize("Blob::blocksize_bytes()"))
    }

    /// The number of whole blocks of the configured size.
    pub fn size_blocks(&self) -> Result<usize> {
        let blocksize = self
            .blocksize_bits
            .ok_or(BlobError::MissingBlockSize("Blob::size_blocks()"))?;
        Ok(self.size_bits() / blocksize)
    }

    /// True if the configured block size evenly divides the blob.
    pub fn even_blocks(&self) -> Result<bool> {
        let blocksize = self
            .blocksize_bits
            .ok_or(BlobError::MissingBlockSize("Blob::even_blocks()"))?;
        Ok(self.size_bits() % blocksize == 0)
    }

    //
    // Addressing
    //

    /// Translate a locator into an absolute bit index.
    ///
    /// Negative byte and bit offsets count from the end. Separators resolve to
    /// the start of their first occurrence, or of their last one if
    /// `from_end` is set.
    pub fn absolute_bit_index(&self, locator: &Locator, from_end: bool) -> Result<usize> {
        let total = self.size_bits();
        match locator {
            Locator::Bit(n) => Ok(resolve_signed(*n, total)),
            Locator::Byte(n) => Ok(resolve_signed(n.saturating_mul(8), total)),
            Locator::ByteSep(sep) => {
                if sep.is_empty() {
                    return Err(BlobError::InvalidArgument("empty separator".into()));
                }
                find_subslice(self.bytes()?, sep, from_end)
                    .map(|pos| pos * 8)
                    .ok_or(BlobError::SeparatorNotFound)
            }
            Locator::BitSep(sep) => {
                bits::validate_bitstr(sep)?;
                if sep.is_empty() {
                    return Err(BlobError::InvalidArgument("empty separator".into()));
                }
                find_subslice(self.bits().as_bytes(), sep.as_bytes(), from_end)
                    .ok_or(BlobError::SeparatorNotFound)
            }
        }
    }

    /// Chop off the beginning of the blob. A separator is kept at the start
    /// of the result. Positions past the end clamp, and an unaligned
    /// position yields a bit-level blob rather than an error.
    pub fn offset(&self, locator: impl Into<Locator>) -> Result<Blob> {
        let start = self.absolute_bit_index(&locator.into(), false)?;
        Ok(self.bit_range(start, self.size_bits()))
    }

    /// Chop off the end of the blob. A separator is searched from the end and
    /// removed along with everything after it. Positions past the end clamp,
    /// and an unaligned position yields a bit-level blob rather than an error.
    pub fn truncate(&self, locator: impl Into<Locator>) -> Result<Blob> {
        let stop = self.absolute_bit_index(&locator.into(), true)?;
        Ok(self.bit_range(0, stop))
    }

    //
    // Composition
    //

    /// Concatenate two blobs. Stays in bytes when both sides already are.
    pub fn concat(&self, other: &Blob) -> Blob {
        match (self.bytes.get(), other.bytes.get()) {
            (Some(a), Some(b)) => {
                let mut data = Vec::with_capacity(a.len() + b.len());
                data.extend_from_slice(a);
                data.extend_from_slice(b);
                Blob::from_bytes(data)
            }
            _ => Blob::from_bits_unchecked(format!("{}{}", self.bits(), other.bits())),
        }
    }

    /// Pad on the right up to `width`.
    ///
    /// A byte width pads with `fill` (default `b' '`); a bit width pads with
    /// `b'0'` or `b'1'` (default `b'0'`).
    pub fn ljust(&self, width: crate::Address, fill: Option<u8>) -> Result<Blob> {
        self.justify(width, fill, false)
    }

    /// Pad on the left up to `width`. See [`Blob::ljust`].
    pub fn rjust(&self, width: crate::Address, fill: Option<u8>) -> Result<Blob> {
        self.justify(width, fill, true)
    }

    fn justify(&self, width: crate::Address, fill: Option<u8>, right: bool) -> Result<Blob> {
        let target = width.value().max(0) as usize;
        match width {
            crate::Address::Byte(_) => {
                let data = self.bytes()?;
                let padding = vec![fill.unwrap_or(b' '); target.saturating_sub(data.len())];
                let out = if right {
                    [padding.as_slice(), data].concat()
                } else {
                    [data, padding.as_slice()].concat()
                };
                Ok(Blob::from_bytes(out))
            }
            crate::Address::Bit(_) => {
                let fill = fill.unwrap_or(b'0');
                if fill != b'0' && fill != b'1' {
                    return Err(BlobError::TypeMismatch(format!(
                        "bit fill must be '0' or '1', got {:?}",
                        fill as char
                    )));
                }
                let data = self.bits();
                let padding = (fill as char)
                    .to_string()
                    .repeat(target.saturating_sub(data.len()));
                let out = if right {
                    format!("{}{}", padding, data)
                } else {
                    format!("{}{}", data, padding)
                };
                Ok(Blob::from_bits_unchecked(out))
            }
        }
    }

    /// Count non-overlapping occurrences of each needle and return the total.
    /// Byte-aligned needles are matched on byte boundaries, others anywhere
    /// in the bit string.
    pub fn count_elements(&self, needles: &[Blob]) -> usize {
        needles
            .iter()
            .map(|needle| match (self.bytes(), needle.bytes()) {
                (Ok(hay), Ok(pattern)) => count_non_overlapping(hay, pattern),
                _ => count_non_overlapping(self.bits().as_bytes(), needle.bits().as_bytes()),
            })
            .sum()
    }
}

fn count_non_overlapping(hay: &[u8], needle: &[u8]) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut pos = 0;
    while let Some(found) = find_subslice(&hay[pos..], needle, false) {
        count += 1;
        pos += found + needle.len();
    }
    count
}

impl Default for Blob {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        if self.size_bits() != other.size_bits() {
            return false;
        }
        match (self.bytes(), other.bytes()) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.bits() == other.bits(),
        }
    }
}

impl Eq for Blob {}

impl Hash for Blob {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.bytes() {
            Ok(bytes) => bytes.hash(state),
            Err(_) => self.bits().hash(state),
        }
    }
}

macro_rules! impl_eq_bytes {
    ($($ty:ty),*) => {
        $(
            impl PartialEq<$ty> for Blob {
                fn eq(&self, other: &$ty) -> bool {
                    let other: &[u8] = other.as_ref();
                    self.bytes().map(|b| b == other).unwrap_or(false)
                }
            }
        )*
    };
}

impl_eq_bytes!([u8], &[u8], Vec<u8>, str, &str);

impl<const N: usize> PartialEq<[u8; N]> for Blob {
    fn eq(&self, other: &[u8; N]) -> bool {
        self == &other[..]
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for Blob {
    fn eq(&self, other: &&[u8; N]) -> bool {
        self == &other[..]
    }
}

impl From<Vec<u8>> for Blob {
    fn from(data: Vec<u8>) -> Self {
        Blob::from_bytes(data)
    }
}

impl From<&[u8]> for Blob {
    fn from(data: &[u8]) -> Self {
        Blob::from_bytes(data)
    }
}

impl<const N: usize> From<&[u8; N]> for Blob {
    fn from(data: &[u8; N]) -> Self {
        Blob::from_bytes(&data[..])
    }
}

impl From<&str> for Blob {
    fn from(data: &str) -> Self {
        Blob::from_bytes(data.as_bytes())
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bytes() {
            Ok(bytes) => write!(f, "B(\"{}\")", bytes.escape_ascii()),
            Err(_) => write!(f, "B(b\"{}\")", self.bits()),
        }
    }
}

/// Hex for byte-aligned blobs, the raw bit string otherwise.
impl fmt::Display for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bytes() {
            Ok(bytes) => f.write_str(&hex::encode(bytes)),
            Err(_) => f.write_str(self.bits()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Address;
    use std::collections::HashSet;
    use tempfile::tempdir;

    #[test]
    fn test_size() {
        let b = Blob::from_bytes("AAAABBBBCCCCDDDD");
        assert_eq!(b.size(), 16);
        assert_eq!(b.size_bits(), 16 * 8);

        let b = Blob::from_bits(bits::to_bitstr(b"AAAABBBBCCCCDDDD")).unwrap();
        assert_eq!(b.size(), 16);
        assert_eq!(b.size_bits(), 16 * 8);
    }

    #[test]
    fn test_bitbyte_lazy_conversion() {
        let a = Blob::from_bytes("ABCD");
        assert!(a.bytes_materialized());
        assert!(!a.bits_materialized());
        assert_eq!(a.bits(), bits::to_bitstr(b"ABCD"));
        assert!(a.bits_materialized());
        assert_eq!(a.bytes().unwrap(), b"ABCD");

        let a = Blob::from_bits(bits::to_bitstr(b"ABCD")).unwrap();
        assert!(!a.bytes_materialized());
        assert_eq!(a.bytes().unwrap(), b"ABCD");
        assert!(a.bytes_materialized());
        assert_eq!(a.size(), 4);
        assert_eq!(a.size_bits(), 32);
    }

    #[test]
    fn test_partial_byte_rejected_for_bytes_view() {
        let o = Blob::from_bits("111").unwrap();
        assert!(!o.byte_aligned());
        assert_eq!(o.size_bits(), 3);
        assert!(matches!(o.bytes(), Err(BlobError::PartialByte(3))));
        assert_eq!(o.bits(), "111");
    }

    #[test]
    fn test_from_bits_rejects_non_binary() {
        assert!(matches!(
            Blob::from_bits("0102"),
            Err(BlobError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_eq_across_representations() {
        let a = Blob::from_bytes("AAAABBBBCCCCDDDD");
        let b = Blob::from_bits(bits::to_bitstr(b"AAAABBBBCCCCDDDD")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, "AAAABBBBCCCCDDDD");
        assert_ne!(a, Blob::from_bytes("AAAA"));

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_eq_unaligned() {
        let a = Blob::from_bits("101").unwrap();
        let b = Blob::from_bits("101").unwrap();
        let c = Blob::from_bits("100").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Blob::from_bits("10100000").unwrap());
    }

    #[test]
    fn test_add() {
        let a = Blob::from_bytes("A");
        let b = Blob::from_bytes("b");
        assert_eq!(a.concat(&b), "Ab");
        assert_eq!(b.concat(&a), "bA");
        assert_eq!(b.concat(&a).concat(&a).concat(&b), "bAAb");

        let bits = Blob::from_bits("0100").unwrap();
        let tail = Blob::from_bits("0001").unwrap();
        assert_eq!(bits.concat(&tail), "A");
    }

    #[test]
    fn test_just() {
        let a = Blob::from_bytes("A");
        let o = Blob::from_bits("111").unwrap();

        assert_eq!(a.ljust(Address::Byte(4), None).unwrap(), "A   ");
        assert_eq!(a.ljust(Address::Byte(4), Some(b'B')).unwrap(), "ABBB");
        assert_eq!(o.ljust(Address::Bit(4), None).unwrap().bits(), "1110");
        assert_eq!(o.ljust(Address::Bit(4), Some(b'1')).unwrap().bits(), "1111");

        assert_eq!(a.rjust(Address::Byte(4), None).unwrap(), "   A");
        assert_eq!(a.rjust(Address::Byte(4), Some(b'B')).unwrap(), "BBBA");
        assert_eq!(o.rjust(Address::Bit(4), None).unwrap().bits(), "0111");
        assert_eq!(o.rjust(Address::Bit(4), Some(b'1')).unwrap().bits(), "1111");

        assert_eq!(a.ljust(Address::Byte(0), None).unwrap(), "A");
        assert!(matches!(
            o.ljust(Address::Bit(8), Some(b'x')),
            Err(BlobError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_absolute_bit_index() {
        let b = Blob::from_bytes("AAAABBBBCCCC");
        assert_eq!(b.absolute_bit_index(&Locator::Bit(5), false).unwrap(), 5);
        assert_eq!(b.absolute_bit_index(&Locator::Bit(-5), false).unwrap(), 91);
        assert_eq!(b.absolute_bit_index(&Locator::Byte(2), false).unwrap(), 16);
        assert_eq!(b.absolute_bit_index(&Locator::Byte(-1), false).unwrap(), 88);
        assert_eq!(b.absolute_bit_index(&Locator::sep("B"), false).unwrap(), 32);
        assert_eq!(b.absolute_bit_index(&Locator::sep("B"), true).unwrap(), 56);
        assert_eq!(
            b.absolute_bit_index(&Locator::sep_bits("01000010"), false).unwrap(),
            32
        );
        assert!(matches!(
            b.absolute_bit_index(&Locator::sep("Z"), false),
            Err(BlobError::SeparatorNotFound)
        ));
    }

    #[test]
    fn test_offset() {
        let b = Blob::from_bytes("AAAABBBBCCCC");
        assert_eq!(b.offset(Locator::Byte(2)).unwrap(), "AABBBBCCCC");
        assert_eq!(b.offset(Locator::Bit(32)).unwrap(), "BBBBCCCC");
        assert_eq!(b.offset(Locator::sep("C")).unwrap(), "CCCC");
        assert_eq!(b.offset(Locator::sep_bits("01000010")).unwrap(), "BBBBCCCC");
        assert_eq!(b.offset(Locator::Byte(100)).unwrap(), "");

        let unaligned = b.offset(Locator::Bit(3)).unwrap();
        assert_eq!(unaligned.size_bits(), 93);
    }

    #[test]
    fn test_truncate() {
        let a = Blob::from_bytes("ABCD");
        assert_eq!(a.truncate(Locator::Byte(-1)).unwrap(), "ABC");
        assert_eq!(a.truncate(Locator::Byte(1)).unwrap(), "A");
        assert_eq!(a.truncate(Locator::Bit(16)).unwrap(), "AB");
        assert_eq!(a.truncate(Locator::sep("C")).unwrap(), "AB");
        assert_eq!(a.truncate(Locator::sep_bits("01000010")).unwrap(), "A");
        assert_eq!(a.truncate(Locator::Byte(100)).unwrap(), "ABCD");
        assert_eq!(a.truncate(Locator::Byte(-100)).unwrap(), "");

        let unaligned = a.truncate(Locator::Bit(3)).unwrap();
        assert_eq!(unaligned.bits(), "010");
        assert!(!unaligned.byte_aligned());
    }

    #[test]
    fn test_count_elements() {
        let a = Blob::from_bytes("AABCDDDD");
        assert_eq!(a.count_elements(&[Blob::from("A")]), 2);
        assert_eq!(a.count_elements(&[Blob::from("D")]), 4);
        assert_eq!(a.count_elements(&[Blob::from("A"), Blob::from("D")]), 6);
        assert_eq!(a.count_elements(&[Blob::from("C"), Blob::from("D")]), 5);
        assert_eq!(
            a.count_elements(&[Blob::from_bits(bits::to_bitstr(b"A")).unwrap()]),
            2
        );
        assert_eq!(a.count_elements(&[Blob::from("DD")]), 2);
    }

    #[test]
    fn test_blocksize_helpers() {
        let mut b = Blob::from_bytes("AAAABBBBCCCC");
        assert!(matches!(
            b.size_blocks(),
            Err(BlobError::MissingBlockSize(_))
        ));
        assert!(b.even_blocks().is_err());

        b.set_blocksize_bytes(4).unwrap();
        assert_eq!(b.blocksize_bits(), Some(32));
        assert_eq!(b.blocksize_bytes().unwrap(), 4);
        assert_eq!(b.size_blocks().unwrap(), 3);
        assert!(b.even_blocks().unwrap());

        b.set_blocksize_bits(5).unwrap();
        assert_eq!(b.blocksize_bytes().unwrap(), 1);
        assert!(!b.even_blocks().unwrap());
        assert!(b.set_blocksize_bits(0).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("data.bin"), b"file contents").unwrap();

        let b = Blob::from_file(Some(dir.path()), "data.bin").unwrap();
        assert_eq!(b, "file contents");
        assert_eq!(b.filename(), Some("data.bin"));

        assert!(matches!(
            Blob::from_file(Some(dir.path()), "missing.bin"),
            Err(BlobError::Io(_))
        ));
    }

    #[test]
    fn test_debug_and_display() {
        let a = Blob::from_bytes(b"AB\x00".to_vec());
        assert_eq!(format!("{:?}", a), "B(\"AB\\x00\")");
        assert_eq!(a.to_string(), "414200");

        let o = Blob::from_bits("101").unwrap();
        assert_eq!(format!("{:?}", o), "B(b\"101\")");
        assert_eq!(o.to_string(), "101");
    }
}
