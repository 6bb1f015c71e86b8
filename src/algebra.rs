//! Elementwise boolean algebra and rotation.
//!
//! Operands of different lengths are combined by cycling the shorter one
//! (XOR with a short repeating key). [`Extension::Strict`] refuses mismatched
//! lengths instead.

use crate::address::Address;
use crate::bits;
use crate::blob::Blob;
use crate::error::{BlobError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Add, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

/// How operands of different lengths are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Extension {
    #[default]
    Cyclic,
    Strict,
}

impl std::str::FromStr for Extension {
    type Err = BlobError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cyclic" => Ok(Self::Cyclic),
            "strict" => Ok(Self::Strict),
            _ => Err(BlobError::InvalidArgument(format!("extension: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOp {
    Xor,
    And,
    Or,
}

impl Blob {
    /// Combine two blobs elementwise.
    ///
    /// Byte-aligned operands are combined byte by byte; otherwise the bit
    /// strings are combined, so a 3-bit key cycles every 3 bits.
    pub fn combine(&self, other: &Blob, op: BitOp, extension: Extension) -> Result<Blob> {
        if extension == Extension::Strict && self.size_bits() != other.size_bits() {
            return Err(BlobError::LengthMismatch {
                left: self.size_bits(),
                right: other.size_bits(),
            });
        }
        Ok(self.combine_cyclic(other, op))
    }

    fn combine_cyclic(&self, other: &Blob, op: BitOp) -> Blob {
        if let (Ok(a), Ok(b)) = (self.bytes(), other.bytes()) {
            let out = match op {
                BitOp::Xor => bits::xor_bytes(a, b),
                BitOp::And => bits::and_bytes(a, b),
                BitOp::Or => bits::or_bytes(a, b),
            };
            return Blob::from_bytes(out);
        }

        let (a, b) = (self.bits(), other.bits());
        let out = match op {
            BitOp::Xor => bits::xor_bitstr(a, b),
            BitOp::And => bits::and_bitstr(a, b),
            BitOp::Or => bits::or_bitstr(a, b),
        };
        Blob::from_bits_unchecked(out)
    }

    pub fn xor(&self, other: &Blob) -> Blob {
        self.combine_cyclic(other, BitOp::Xor)
    }

    pub fn and(&self, other: &Blob) -> Blob {
        self.combine_cyclic(other, BitOp::And)
    }

    pub fn or(&self, other: &Blob) -> Blob {
        self.combine_cyclic(other, BitOp::Or)
    }

    /// Bitwise NOT: XOR against all-ones of the same length.
    pub fn invert(&self) -> Blob {
        match self.bytes() {
            Ok(bytes) => Blob::from_bytes(bits::not_bytes(bytes)),
            Err(_) => Blob::from_bits_unchecked(bits::not_bitstr(self.bits())),
        }
    }

    /// Rotate left. A byte amount rotates whole bytes, a bit amount rotates
    /// bits; both wrap around and negative amounts rotate right.
    pub fn rol(&self, amount: Address) -> Blob {
        let total = self.size_bits();
        if total == 0 {
            return self.clone();
        }

        let shift = match amount {
            Address::Byte(n) if self.byte_aligned() => {
                n.rem_euclid(self.size() as i64) as usize * 8
            }
            Address::Byte(n) => {
                (n.rem_euclid(total as i64) as usize * 8) % total
            }
            Address::Bit(n) => n.rem_euclid(total as i64) as usize,
        };

        self.bit_range(shift, total).concat(&self.bit_range(0, shift))
    }

    /// XOR this blob with `other` (default: itself) rotated left by
    /// successive multiples of `step`.
    ///
    /// The i-th item is `self ^ other.rol(i * step)` for i in
    /// `0..other.size_bits() / step`. The sequence is lazy; iterating it again
    /// recomputes every item.
    pub fn rotating_xors<'a>(
        &'a self,
        other: Option<&'a Blob>,
        step: Address,
    ) -> Result<RotatingXors<'a>> {
        let step_bits = step.to_bits();
        if step_bits <= 0 {
            return Err(BlobError::InvalidArgument(format!(
                "rotation step must be positive, got {}",
                step
            )));
        }
        let other = other.unwrap_or(self);
        Ok(RotatingXors {
            base: self,
            other,
            step_bits: step_bits as usize,
            index: 0,
            count: other.size_bits() / step_bits as usize,
        })
    }
}

/// Iterator returned by [`Blob::rotating_xors`].
pub struct RotatingXors<'a> {
    base: &'a Blob,
    other: &'a Blob,
    step_bits: usize,
    index: usize,
    count: usize,
}

impl Iterator for RotatingXors<'_> {
    type Item = Blob;

    fn next(&mut self) -> Option<Blob> {
        if self.index >= self.count {
            return None;
        }
        let shift = (self.index * self.step_bits) as i64;
        self.index += 1;
        Some(self.base.xor(&self.other.rol(Address::Bit(shift))))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RotatingXors<'_> {}

impl BitXor for &Blob {
    type Output = Blob;
    fn bitxor(self, rhs: &Blob) -> Blob {
        self.xor(rhs)
    }
}

impl BitAnd for &Blob {
    type Output = Blob;
    fn bitand(self, rhs: &Blob) -> Blob {
        self.and(rhs)
    }
}

impl BitOr for &Blob {
    type Output = Blob;
    fn bitor(self, rhs: &Blob) -> Blob {
        self.or(rhs)
    }
}

impl Not for &Blob {
    type Output = Blob;
    fn not(self) -> Blob {
        self.invert()
    }
}

impl Add for &Blob {
    type Output = Blob;
    fn add(self, rhs: &Blob) -> Blob {
        self.concat(rhs)
    }
}

impl BitXorAssign<&Blob> for Blob {
    fn bitxor_assign(&mut self, rhs: &Blob) {
        let out = self.xor(rhs);
        self.replace_content(out);
    }
}

impl BitAndAssign<&Blob> for Blob {
    fn bitand_assign(&mut self, rhs: &Blob) {
        let out = self.and(rhs);
        self.replace_content(out);
    }
}

impl BitOrAssign<&Blob> for Blob {
    fn bitor_assign(&mut self, rhs: &Blob) {
        let out = self.or(rhs);
        self.replace_content(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Address::{Bit, Byte};

    #[test]
    fn test_bitops() {
        let a = Blob::from("ABCD");
        let b = Blob::from("    ");
        let c = Blob::from_bytes(vec![0x21, 0xff, 0xee, 0x11]);

        assert_eq!(&a ^ &b, "abcd");
        assert_eq!(&a | &b, "abcd");
        assert_eq!(&a & &b, [0u8; 4]);
        assert_eq!(!&c, [0xdeu8, 0x00, 0x11, 0xee]);
    }

    #[test]
    fn test_bitops_in_place() {
        let mut a = Blob::from("ABCD");
        let b = Blob::from("    ");
        a |= &b;
        assert_eq!(a, "abcd");
        a ^= &b;
        assert_eq!(a, "ABCD");
        a &= &b;
        assert_eq!(a, [0u8; 4]);
    }

    #[test]
    fn test_cyclic_key() {
        let a = Blob::from("AAAABBBBCCCC");
        assert_eq!(a.or(&Blob::from(" ")), "aaaabbbbcccc");
        assert_eq!(Blob::from(" ").xor(&Blob::from("secret")), "SECRET");
    }

    #[test]
    fn test_strict_extension() {
        let a = Blob::from("ABCD");
        let key = Blob::from(" ");
        assert!(matches!(
            a.combine(&key, BitOp::Xor, Extension::Strict),
            Err(BlobError::LengthMismatch { left: 32, right: 8 })
        ));
        assert_eq!(
            a.combine(&Blob::from("    "), BitOp::Xor, Extension::Strict).unwrap(),
            "abcd"
        );
        assert_eq!(a.combine(&key, BitOp::Xor, Extension::Cyclic).unwrap(), "abcd");
    }

    #[test]
    fn test_unaligned_algebra() {
        let a = Blob::from_bits("1110001100").unwrap();
        let k = Blob::from_bits("1").unwrap();
        assert_eq!(a.xor(&k).bits(), "0001110011");
        assert_eq!(a.invert().bits(), "0001110011");
        assert_eq!(a.invert().invert(), a);
    }

    #[test]
    fn test_rol() {
        let a = Blob::from("ABCD");
        let expected = ["ABCD", "BCDA", "CDAB", "DABC"];
        for n in -4i64..=8 {
            let want = expected[n.rem_euclid(4) as usize];
            assert_eq!(a.rol(Byte(n)), want, "byte rotation {}", n);
            assert_eq!(a.rol(Bit(n * 8)), want, "bit rotation {}", n * 8);
        }
    }

    #[test]
    fn test_rol_bits() {
        let a = Blob::from_bits("11000101").unwrap();
        assert_eq!(a.rol(Bit(3)).bits(), "00101110");
        assert_eq!(a.rol(Bit(-3)).bits(), "10111000");
        assert_eq!(Blob::empty().rol(Bit(3)), Blob::empty());
    }

    #[test]
    fn test_rotation_xors() {
        let a = Blob::from_bytes(vec![0x01, 0x02, 0x04, 0x08]);
        let xors: Vec<Blob> = a.rotating_xors(None, Bit(8)).unwrap().collect();
        assert_eq!(
            xors,
            vec![
                Blob::from_bytes(vec![0x00, 0x00, 0x00, 0x00]),
                Blob::from_bytes(vec![0x03, 0x06, 0x0c, 0x09]),
                Blob::from_bytes(vec![0x05, 0x0a, 0x05, 0x0a]),
                Blob::from_bytes(vec![0x09, 0x03, 0x06, 0x0c]),
            ]
        );
    }

    #[test]
    fn test_rotation_xors_step() {
        let a = Blob::from("ABCD");
        let other = Blob::from("AB");
        let xors = a.rotating_xors(Some(&other), Bit(4)).unwrap();
        assert_eq!(xors.len(), 4);
        let items: Vec<Blob> = xors.collect();
        assert_eq!(items[0], a.xor(&other));
        assert_eq!(items[2], a.xor(&other.rol(Bit(8))));
        assert!(a.rotating_xors(None, Bit(0)).is_err());
    }

    #[test]
    fn test_extension_from_str() {
        assert_eq!("strict".parse::<Extension>().unwrap(), Extension::Strict);
        assert_eq!("Cyclic".parse::<Extension>().unwrap(), Extension::Cyclic);
        assert!("wrap".parse::<Extension>().is_err());
    }
}
