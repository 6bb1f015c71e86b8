//! Decomposing a blob into ordered fragments.

use crate::address::{find_subslice, Address, Locator};
use crate::bits;
use crate::blob::Blob;
use crate::error::{BlobError, Result};

/// What to split on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitBy {
    /// Every non-overlapping occurrence of a byte pattern.
    Sep(Vec<u8>),
    /// Every non-overlapping occurrence of a bit pattern.
    SepBits(String),
    /// Consecutive fragments of a fixed width.
    Size(Address),
    /// A number of fragments of `size_bits / n` bits each.
    Count(usize),
}

/// A split request: the criterion plus the `max_splits` / `allow_empty`
/// policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub by: SplitBy,
    pub max_splits: Option<usize>,
    pub allow_empty: bool,
}

impl Split {
    pub fn new(by: SplitBy) -> Self {
        Self {
            by,
            max_splits: None,
            allow_empty: false,
        }
    }

    pub fn sep(pattern: impl AsRef<[u8]>) -> Self {
        Self::new(SplitBy::Sep(pattern.as_ref().to_vec()))
    }

    pub fn sep_bits(pattern: impl Into<String>) -> Self {
        Self::new(SplitBy::SepBits(pattern.into()))
    }

    /// Fixed-size fragments of `bytes` bytes.
    pub fn size(bytes: usize) -> Self {
        Self::new(SplitBy::Size(Address::Byte(bytes as i64)))
    }

    /// Fixed-size fragments of `bits` bits.
    pub fn size_bits(bits: usize) -> Self {
        Self::new(SplitBy::Size(Address::Bit(bits as i64)))
    }

    pub fn count(n: usize) -> Self {
        Self::new(SplitBy::Count(n))
    }

    pub fn max_splits(mut self, max_splits: usize) -> Self {
        self.max_splits = Some(max_splits);
        self
    }

    pub fn allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }
}

impl From<Address> for Split {
    fn from(size: Address) -> Self {
        Split::new(SplitBy::Size(size))
    }
}

/// Fragment boundaries for a separator split. `max_splits` limits the number
/// of cuts; whatever is left after the last cut is one final fragment.
fn separator_ranges<T: PartialEq>(
    hay: &[T],
    sep: &[T],
    max_splits: Option<usize>,
) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = 0;

    while max_splits.map_or(true, |max| ranges.len() < max) {
        match find_subslice(&hay[start..], sep, false) {
            Some(found) => {
                ranges.push((start, start + found));
                start += found + sep.len();
            }
            None => break,
        }
    }

    ranges.push((start, hay.len()));
    ranges
}

impl Blob {
    /// Split the blob into an ordered list of fragments.
    ///
    /// Separator splits drop empty fragments unless `allow_empty` is set.
    /// Fixed-size and count splits leave a short final fragment when the
    /// width does not divide the blob; nothing is padded. With `max_splits`
    /// the rest of the blob always follows as the last fragment, even empty.
    pub fn split(&self, split: &Split) -> Result<Vec<Blob>> {
        let fragments = match &split.by {
            SplitBy::Sep(sep) => {
                if sep.is_empty() {
                    return Err(BlobError::InvalidArgument("empty separator".into()));
                }
                let data = self.bytes()?;
                separator_ranges(data, sep, split.max_splits)
                    .into_iter()
                    .map(|(start, end)| Blob::from_bytes(&data[start..end]))
                    .collect()
            }
            SplitBy::SepBits(sep) => {
                bits::validate_bitstr(sep)?;
                if sep.is_empty() {
                    return Err(BlobError::InvalidArgument("empty separator".into()));
                }
                let data = self.bits();
                separator_ranges(data.as_bytes(), sep.as_bytes(), split.max_splits)
                    .into_iter()
                    .map(|(start, end)| Blob::from_bits_unchecked(data[start..end].to_string()))
                    .collect()
            }
            SplitBy::Size(size) => return self.split_fixed(width_bits(self, *size)?, split),
            SplitBy::Count(n) => {
                let total = self.size_bits();
                if *n == 0 || *n > total {
                    return Err(BlobError::InvalidArgument(format!(
                        "cannot split {} bits into {} blocks",
                        total, n
                    )));
                }
                return self.split_fixed(total / n, split);
            }
        };

        Ok(drop_empty(fragments, split.allow_empty))
    }

    fn split_fixed(&self, width: usize, split: &Split) -> Result<Vec<Blob>> {
        if width == 0 {
            return Err(BlobError::InvalidArgument("split size must be positive".into()));
        }

        let total = self.size_bits();
        let mut blocks = Vec::with_capacity(total.div_ceil(width));
        let mut pos = 0;

        while pos < total {
            if split.max_splits.is_some_and(|max| blocks.len() >= max) {
                break;
            }
            let end = pos.saturating_add(width).min(total);
            blocks.push(self.bit_range(pos, end));
            pos = end;
        }

        if pos < total || split.max_splits.is_some() {
            blocks.push(self.bit_range(pos, total));
        }

        Ok(blocks)
    }
}

/// Width of a fixed-size split in bits.
pub(crate) fn width_bits(blob: &Blob, size: Address) -> Result<usize> {
    if size.to_bits() <= 0 {
        return Err(BlobError::InvalidArgument(format!(
            "split size must be positive, got {}",
            size
        )));
    }
    blob.absolute_bit_index(&Locator::from(size), false)
}

fn drop_empty(fragments: Vec<Blob>, allow_empty: bool) -> Vec<Blob> {
    if allow_empty {
        fragments
    } else {
        fragments.into_iter().filter(|b| !b.is_empty()).collect()
    }
}
