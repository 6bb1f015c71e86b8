//! Structured unpacking with struct-style format strings.
//!
//! A format is an optional byte-order prefix followed by type codes, each
//! with an optional repeat count:
//!
//! | prefix | order |
//! |--------|-------|
//! | `<` | little endian |
//! | `>` `!` | big endian |
//! | `=` `@` | native (no alignment padding) |
//!
//! Codes: `x` pad byte, `c` char, `b`/`B` 8-bit, `?` bool, `h`/`H` 16-bit,
//! `i`/`I` `l`/`L` 32-bit, `q`/`Q` 64-bit, `f` float, `d` double,
//! `s` byte string (the count is its length). Lowercase integer codes are
//! signed.

use crate::blob::Blob;
use crate::error::{BlobError, Result};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Char(u8),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn native() -> Self {
        if cfg!(target_endian = "little") {
            Self::Little
        } else {
            Self::Big
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Item {
    code: char,
    count: usize,
}

impl Item {
    fn width(code: char) -> Option<usize> {
        match code {
            'x' | 'c' | 'b' | 'B' | '?' | 's' => Some(1),
            'h' | 'H' => Some(2),
            'i' | 'I' | 'l' | 'L' | 'f' => Some(4),
            'q' | 'Q' | 'd' => Some(8),
            _ => None,
        }
    }

    fn size(&self) -> Option<usize> {
        Self::width(self.code)?.checked_mul(self.count)
    }
}

/// A parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    order: ByteOrder,
    items: Vec<Item>,
    size: usize,
}

impl Format {
    pub fn parse(fmt: &str) -> Result<Self> {
        let mut chars = fmt.chars().peekable();
        let order = match chars.peek() {
            Some('<') => ByteOrder::Little,
            Some('>' | '!') => ByteOrder::Big,
            _ => ByteOrder::native(),
        };
        if matches!(chars.peek(), Some('<' | '>' | '!' | '=' | '@')) {
            chars.next();
        }

        let mut items = Vec::new();
        let mut size = 0usize;
        while let Some(c) = chars.next() {
            if c.is_whitespace() {
                continue;
            }
            let (code, count) = if let Some(mut n) = c.to_digit(10).map(|d| d as usize) {
                while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                    n = n
                        .checked_mul(10)
                        .and_then(|n| n.checked_add(d as usize))
                        .ok_or_else(|| BlobError::InvalidFormat(format!("repeat count too large in {:?}", fmt)))?;
                    chars.next();
                }
                match chars.next() {
                    Some(code) => (code, n),
                    None => {
                        return Err(BlobError::InvalidFormat(format!(
                            "repeat count without type code in {:?}",
                            fmt
                        )))
                    }
                }
            } else {
                (c, 1)
            };

            if Item::width(code).is_none() {
                return Err(BlobError::InvalidFormat(format!(
                    "bad type code {:?} in {:?}",
                    code, fmt
                )));
            }
            let item = Item { code, count };
            size = item
                .size()
                .and_then(|n| size.checked_add(n))
                .ok_or_else(|| BlobError::InvalidFormat(format!("{:?} is too large", fmt)))?;
            items.push(item);
        }

        Ok(Self { order, items, size })
    }

    /// Number of bytes one application of the format consumes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Unpack exactly `self.size()` bytes.
    pub fn unpack(&self, data: &[u8]) -> Result<Vec<Value>> {
        if data.len() != self.size() {
            return Err(BlobError::SizeNotDivisible {
                size: self.size(),
                total: data.len(),
            });
        }

        let mut values = Vec::new();
        let mut pos = 0;
        for item in &self.items {
            if item.code == 's' {
                values.push(Value::Bytes(data[pos..pos + item.count].to_vec()));
                pos += item.count;
                continue;
            }
            let width = Item::width(item.code).unwrap_or(0);
            for _ in 0..item.count {
                let field = &data[pos..pos + width];
                pos += width;
                if let Some(value) = self.decode(item.code, field) {
                    values.push(value);
                }
            }
        }
        Ok(values)
    }

    fn decode(&self, code: char, field: &[u8]) -> Option<Value> {
        let raw = self.read_uint(field);
        let bits = field.len() * 8;
        let value = match code {
            'x' => return None,
            'c' => Value::Char(field[0]),
            '?' => Value::Bool(field[0] != 0),
            'B' | 'H' | 'I' | 'L' | 'Q' => Value::UInt(raw),
            'b' | 'h' | 'i' | 'l' | 'q' => {
                let shift = 64 - bits;
                Value::Int(((raw << shift) as i64) >> shift)
            }
            'f' => Value::Float(f32::from_bits(raw as u32) as f64),
            'd' => Value::Float(f64::from_bits(raw)),
            _ => return None,
        };
        Some(value)
    }

    fn read_uint(&self, field: &[u8]) -> u64 {
        let fold = |acc: u64, b: &u8| (acc << 8) | *b as u64;
        match self.order {
            ByteOrder::Big => field.iter().fold(0, fold),
            ByteOrder::Little => field.iter().rev().fold(0, fold),
        }
    }
}

impl FromStr for Format {
    type Err = BlobError;
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Blob {
    /// Unpack the whole blob by applying `fmt` repeatedly.
    pub fn unpack(&self, fmt: &str) -> Result<Vec<Value>> {
        let format = Format::parse(fmt)?;
        let size = format.size();
        if size == 0 {
            return Err(BlobError::InvalidFormat(format!("{:?} has zero size", fmt)));
        }
        let data = self.bytes()?;
        if data.len() % size != 0 {
            return Err(BlobError::SizeNotDivisible {
                size,
                total: data.len(),
            });
        }

        let mut values = Vec::new();
        for chunk in data.chunks(size) {
            values.extend(format.unpack(chunk)?);
        }
        Ok(values)
    }

    /// Unpack the blob with a single application of `fmt`; the format must
    /// cover the blob exactly.
    pub fn unpack_once(&self, fmt: &str) -> Result<Vec<Value>> {
        Format::parse(fmt)?.unpack(self.bytes()?)
    }
}
