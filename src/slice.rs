//! Unit-aware indexing and slicing.
//!
//! Boundaries given as [`Address::Byte`] select whole bytes; as soon as one
//! boundary is an [`Address::Bit`] the slice is taken in bit space. The byte
//! view is only used when the result is known to be byte-aligned and the bytes
//! are already materialized; the bit view is the fallback that always works.

use crate::address::Address;
use crate::blob::Blob;
use crate::error::{BlobError, Result};
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

/// A slice request with optional boundaries and step.
///
/// The step counts bits if any boundary is a bit address, bytes otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slice {
    pub start: Option<Address>,
    pub stop: Option<Address>,
    pub step: Option<i64>,
}

impl Slice {
    pub fn new(start: Option<Address>, stop: Option<Address>) -> Self {
        Self {
            start,
            stop,
            step: None,
        }
    }

    pub fn full() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }

    fn bit_mode(&self) -> bool {
        self.start.is_some_and(Address::is_bit) || self.stop.is_some_and(Address::is_bit)
    }
}

impl From<Range<Address>> for Slice {
    fn from(range: Range<Address>) -> Self {
        Slice::new(Some(range.start), Some(range.end))
    }
}

impl From<RangeFrom<Address>> for Slice {
    fn from(range: RangeFrom<Address>) -> Self {
        Slice::new(Some(range.start), None)
    }
}

impl From<RangeTo<Address>> for Slice {
    fn from(range: RangeTo<Address>) -> Self {
        Slice::new(None, Some(range.end))
    }
}

impl From<RangeFull> for Slice {
    fn from(_: RangeFull) -> Self {
        Slice::full()
    }
}

/// Normalize slice boundaries the way sequence slicing does: negative values
/// count from the end and everything is clamped to the valid range.
fn slice_indices(start: Option<i64>, stop: Option<i64>, step: i64, len: usize) -> (i64, i64) {
    let len = len as i64;
    let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
    let clamp = |value: i64| {
        if value < 0 {
            (value.saturating_add(len)).max(lower)
        } else {
            value.min(upper)
        }
    };
    let start = start.map(clamp).unwrap_or(if step < 0 { upper } else { lower });
    let stop = stop.map(clamp).unwrap_or(if step < 0 { lower } else { upper });
    (start, stop)
}

fn positions(start: i64, stop: i64, step: i64) -> impl Iterator<Item = usize> {
    let mut current = start;
    std::iter::from_fn(move || {
        let inside = if step > 0 { current < stop } else { current > stop };
        if !inside {
            return None;
        }
        let out = current as usize;
        current += step;
        Some(out)
    })
}

impl Blob {
    /// Single-element access: one byte for [`Address::Byte`], one bit for
    /// [`Address::Bit`]. Negative indices count from the end.
    pub fn get(&self, index: Address) -> Result<Blob> {
        match index {
            Address::Byte(i) => {
                let units = self.size_bits().div_ceil(8);
                let pos = checked_index(i, units)?;
                if self.bytes_materialized() {
                    if let Ok(bytes) = self.bytes() {
                        return Ok(Blob::from_bytes(vec![bytes[pos]]));
                    }
                }
                Ok(self.bit_range(pos * 8, pos * 8 + 8))
            }
            Address::Bit(i) => {
                let pos = checked_index(i, self.size_bits())?;
                Ok(Blob::from_bits_unchecked(self.bits()[pos..pos + 1].to_string()))
            }
        }
    }

    /// Range access. Accepts a [`Slice`] or a range of [`Address`] values.
    pub fn slice(&self, slice: impl Into<Slice>) -> Result<Blob> {
        let slice = slice.into();
        if slice.step == Some(0) {
            return Err(BlobError::InvalidArgument("slice step cannot be zero".into()));
        }

        if slice.bit_mode() {
            self.slice_bits(&slice)
        } else {
            self.slice_bytes(&slice)
        }
    }

    fn slice_bits(&self, slice: &Slice) -> Result<Blob> {
        let start = slice.start.map(Address::to_bits);
        let stop = slice.stop.map(Address::to_bits);
        let step = slice.step.unwrap_or(1);

        let aligned_bounds = start.map_or(true, |s| s % 8 == 0)
            && stop.map_or(true, |s| s % 8 == 0)
            && slice.step.is_none();
        if aligned_bounds && self.byte_aligned() && self.bytes_materialized() {
            let (start, stop) = slice_indices(start.map(|s| s / 8), stop.map(|s| s / 8), 1, self.size());
            return Ok(self.bit_range(start.max(0) as usize * 8, stop.max(0) as usize * 8));
        }

        let (start, stop) = slice_indices(start, stop, step, self.size_bits());
        if step == 1 {
            return Ok(self.bit_range(start.max(0) as usize, stop.max(0) as usize));
        }
        let bits = self.bits().as_bytes();
        let out: String = positions(start, stop, step).map(|i| bits[i] as char).collect();
        Ok(Blob::from_bits_unchecked(out))
    }

    fn slice_bytes(&self, slice: &Slice) -> Result<Blob> {
        let step = slice.step.unwrap_or(1);
        let start = slice.start.map(Address::value);
        let stop = slice.stop.map(Address::value);

        if self.byte_aligned() && self.bytes_materialized() {
            let bytes = self.bytes()?;
            let (start, stop) = slice_indices(start, stop, step, bytes.len());
            let out: Vec<u8> = positions(start, stop, step).map(|i| bytes[i]).collect();
            return Ok(Blob::from_bytes(out));
        }

        // Whole byte units over the bit string; a trailing partial byte is
        // its own (short) unit.
        let units = self.size_bits().div_ceil(8);
        let (start, stop) = slice_indices(start, stop, step, units);
        if step == 1 {
            return Ok(self.bit_range(start.max(0) as usize * 8, stop.max(0) as usize * 8));
        }
        let bits = self.bits();
        let out: String = positions(start, stop, step)
            .map(|unit| {
                let begin = unit * 8;
                let end = (begin + 8).min(bits.len());
                &bits[begin..end]
            })
            .collect();
        Ok(Blob::from_bits_unchecked(out))
    }

    /// Contiguous bit range `[start, stop)`, clamped to the blob.
    pub(crate) fn bit_range(&self, start: usize, stop: usize) -> Blob {
        let total = self.size_bits();
        let stop = stop.min(total);
        let start = start.min(stop);

        if start % 8 == 0 && stop % 8 == 0 && self.bytes_materialized() {
            if let Ok(bytes) = self.bytes() {
                return Blob::from_bytes(&bytes[start / 8..stop / 8]);
            }
        }
        Blob::from_bits_unchecked(self.bits()[start..stop].to_string())
    }
}

fn checked_index(index: i64, len: usize) -> Result<usize> {
    let resolved = if index < 0 {
        index.checked_add(len as i64)
    } else {
        Some(index)
    };
    match resolved {
        Some(pos) if pos >= 0 && (pos as usize) < len => Ok(pos as usize),
        _ => Err(BlobError::IndexOutOfRange { index, len }),
    }
}
