//! Block-size candidates from the prime factorization of a blob's size.

use crate::blob::Blob;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Constraints on block-size candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateOptions {
    /// The blob must hold at least this many blocks.
    pub min_blocks: usize,
    /// Smallest block size to report, in the unit being asked for.
    pub min_blocksize: usize,
}

impl Default for CandidateOptions {
    fn default() -> Self {
        Self {
            min_blocks: 2,
            min_blocksize: 1,
        }
    }
}

/// Prime factors of `n` in ascending order, with multiplicity.
///
/// `factor(0)` is `[0]` and `factor(1)` is empty.
pub fn factor(n: usize) -> Vec<usize> {
    if n == 0 {
        return vec![0];
    }

    let mut factors = Vec::new();
    let mut n = n;
    while n % 2 == 0 {
        factors.push(2);
        n /= 2;
    }
    let mut p = 3;
    while p <= n / p {
        while n % p == 0 {
            factors.push(p);
            n /= p;
        }
        p += 2;
    }
    if n > 1 {
        factors.push(n);
    }
    factors
}

/// Every product of a non-empty sub-multiset of `factors`, deduplicated.
/// For the factors of `n` this is every divisor of `n` except 1.
pub fn subset_products(factors: &[usize]) -> BTreeSet<usize> {
    // Group into (prime, exponent) so each distinct product is built once.
    let mut grouped: Vec<(usize, usize)> = Vec::new();
    for &f in factors {
        match grouped.last_mut() {
            Some((p, e)) if *p == f => *e += 1,
            _ => grouped.push((f, 1)),
        }
    }

    let mut products = vec![1usize];
    for (prime, exponent) in grouped {
        let mut next = Vec::with_capacity(products.len() * (exponent + 1));
        for &base in &products {
            let mut value = base;
            next.push(value);
            for _ in 0..exponent {
                value = value.saturating_mul(prime);
                next.push(value);
            }
        }
        products = next;
    }

    products.into_iter().skip(1).collect()
}

/// Candidate block sizes in bits for a blob of `total_bits` bits.
///
/// `min_blocksize` is always considered, even if it does not divide
/// `total_bits`.
pub fn bit_candidates(total_bits: usize, options: &CandidateOptions) -> Vec<usize> {
    let mut candidates = subset_products(&factor(total_bits));
    candidates.insert(options.min_blocksize);

    candidates
        .into_iter()
        .filter(|&f| f > 0 && f >= options.min_blocksize && total_bits / f >= options.min_blocks)
        .collect()
}

/// Candidate block sizes in bytes. `options.min_blocksize` is in bytes.
pub fn byte_candidates(total_bits: usize, options: &CandidateOptions) -> Vec<usize> {
    let bit_options = CandidateOptions {
        min_blocks: options.min_blocks,
        min_blocksize: options.min_blocksize.max(1) * 8,
    };
    bit_candidates(total_bits, &bit_options)
        .into_iter()
        .filter(|f| f % 8 == 0)
        .map(|f| f / 8)
        .collect()
}

impl Blob {
    /// Block sizes, in bits, that evenly divide the blob. These include sizes
    /// that divide the bits but not the bytes.
    pub fn blocksize_bits_candidates(&self, options: &CandidateOptions) -> Vec<usize> {
        bit_candidates(self.size_bits(), options)
    }

    /// Block sizes, in bytes, that evenly divide the blob.
    pub fn blocksize_candidates(&self, options: &CandidateOptions) -> Vec<usize> {
        byte_candidates(self.size_bits(), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_special_cases() {
        assert_eq!(factor(3), vec![3]);
        assert_eq!(factor(17), vec![17]);
        assert_eq!(factor(0), vec![0]);
        assert!(factor(1).is_empty());
        assert_eq!(factor(96), vec![2, 2, 2, 2, 2, 3]);
    }

    #[test]
    fn test_factor_product() {
        let terms = [12usize, 35, 63, 2, 49];
        let product: usize = terms.iter().product();
        let mut expected: Vec<usize> = terms.iter().flat_map(|&t| factor(t)).collect();
        expected.sort_unstable();
        assert_eq!(factor(product), expected);
        assert_eq!(factor(product).iter().product::<usize>(), product);
    }

    #[test]
    fn test_factor_large() {
        // 2^23 * 5 bits, tens of megabits
        let n = (1usize << 23) * 5;
        let f = factor(n);
        assert_eq!(f.len(), 24);
        assert_eq!(f.iter().product::<usize>(), n);
    }

    #[test]
    fn test_subset_products() {
        let products: Vec<usize> = subset_products(&[2, 2, 3]).into_iter().collect();
        assert_eq!(products, vec![2, 3, 4, 6, 12]);
        assert!(subset_products(&[]).is_empty());
    }

    #[test]
    fn test_blocks() {
        let b = Blob::from_bytes("AAAABBBBCCCC");
        let options = CandidateOptions::default();
        assert_eq!(
            b.blocksize_bits_candidates(&options),
            vec![1, 2, 3, 4, 6, 8, 12, 16, 24, 32, 48]
        );
        assert_eq!(b.blocksize_candidates(&options), vec![1, 2, 3, 4, 6]);
    }

    #[test]
    fn test_candidate_constraints() {
        let options = CandidateOptions {
            min_blocks: 4,
            min_blocksize: 8,
        };
        assert_eq!(bit_candidates(96, &options), vec![8, 12, 16, 24]);
        assert_eq!(
            byte_candidates(96, &CandidateOptions { min_blocks: 1, min_blocksize: 2 }),
            vec![2, 3, 4, 6, 12]
        );
    }

    #[test]
    fn test_candidates_degenerate_sizes() {
        let options = CandidateOptions::default();
        assert!(bit_candidates(0, &options).is_empty());
        assert_eq!(bit_candidates(17, &options), vec![1]);
        assert!(byte_candidates(8, &options).is_empty());
    }
}
