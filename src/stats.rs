//! Frequency statistics over a blob's blocks.
//!
//! The blob only builds the multiset of block frequencies; the numbers are
//! computed by a [`StatisticsProvider`]. The built-in provider lives behind
//! the `stats` feature. Without it, [`default_provider`] returns
//! [`Unavailable`], which fails every request with
//! [`BlobError::UnavailableDependency`].

use crate::address::Address;
use crate::blob::Blob;
use crate::error::{BlobError, Result};
use crate::split::{width_bits, Split, SplitBy};
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// Result of a chi-square goodness-of-fit test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChiSquare {
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
}

pub trait StatisticsProvider {
    fn name(&self) -> &str;

    /// Shannon entropy of the distribution given by `counts`, in `base`.
    fn entropy(&self, counts: &[usize], base: f64) -> Result<f64>;

    /// Chi-square test of `counts` against `expected` frequencies, or against
    /// a uniform distribution over the observed categories.
    fn chisquare(&self, counts: &[usize], expected: Option<&[f64]>) -> Result<ChiSquare>;
}

/// Stand-in provider used when no statistics back-end is compiled in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl StatisticsProvider for Unavailable {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn entropy(&self, _counts: &[usize], _base: f64) -> Result<f64> {
        Err(BlobError::UnavailableDependency(
            "statistics support is not compiled in (enable the `stats` feature)".into(),
        ))
    }

    fn chisquare(&self, _counts: &[usize], _expected: Option<&[f64]>) -> Result<ChiSquare> {
        Err(BlobError::UnavailableDependency(
            "statistics support is not compiled in (enable the `stats` feature)".into(),
        ))
    }
}

#[cfg(feature = "stats")]
pub use frequency::FrequencyStatistics;

#[cfg(feature = "stats")]
static DEFAULT_PROVIDER: FrequencyStatistics = FrequencyStatistics;

#[cfg(not(feature = "stats"))]
static DEFAULT_PROVIDER: Unavailable = Unavailable;

pub fn default_provider() -> &'static dyn StatisticsProvider {
    &DEFAULT_PROVIDER
}

#[cfg(feature = "stats")]
mod frequency {
    use super::{ChiSquare, StatisticsProvider};
    use crate::error::{BlobError, Result};

    const EPSILON: f64 = 1e-15;
    const TINY: f64 = 1e-300;
    const MAX_ITERATIONS: usize = 1000;

    /// Entropy and chi-square computed directly from the counts.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct FrequencyStatistics;

    impl StatisticsProvider for FrequencyStatistics {
        fn name(&self) -> &str {
            "frequency"
        }

        fn entropy(&self, counts: &[usize], base: f64) -> Result<f64> {
            if base.is_nan() || base <= 0.0 || base == 1.0 || base.is_infinite() {
                return Err(BlobError::InvalidArgument(format!(
                    "entropy base must be positive and not 1, got {}",
                    base
                )));
            }
            let total: usize = counts.iter().sum();
            if total == 0 {
                return Ok(0.0);
            }

            let total = total as f64;
            let mut entropy = 0.0;
            for &count in counts.iter().filter(|&&c| c > 0) {
                let p = count as f64 / total;
                entropy -= p * p.log2();
            }

            if base == 2.0 {
                Ok(entropy)
            } else {
                Ok(entropy / base.log2())
            }
        }

        fn chisquare(&self, counts: &[usize], expected: Option<&[f64]>) -> Result<ChiSquare> {
            if counts.is_empty() {
                return Err(BlobError::InvalidArgument(
                    "chi-square needs at least one category".into(),
                ));
            }

            let total: usize = counts.iter().sum();
            let uniform = vec![total as f64 / counts.len() as f64; counts.len()];
            let expected = expected.unwrap_or(&uniform);
            if expected.len() != counts.len() {
                return Err(BlobError::InvalidArgument(format!(
                    "{} expected frequencies for {} categories",
                    expected.len(),
                    counts.len()
                )));
            }
            if expected.iter().any(|&e| e.is_nan() || e <= 0.0) {
                return Err(BlobError::InvalidArgument(
                    "expected frequencies must be positive".into(),
                ));
            }

            let statistic = counts
                .iter()
                .zip(expected)
                .map(|(&observed, &expected)| {
                    let diff = observed as f64 - expected;
                    diff * diff / expected
                })
                .sum();
            let degrees_of_freedom = counts.len() - 1;

            Ok(ChiSquare {
                statistic,
                p_value: chi_square_p_value(statistic, degrees_of_freedom),
                degrees_of_freedom,
            })
        }
    }

    /// Upper tail probability of the chi-square distribution.
    pub(super) fn chi_square_p_value(chi_square: f64, df: usize) -> f64 {
        if df == 0 {
            return 1.0;
        }
        gamma_q(df as f64 / 2.0, chi_square / 2.0)
    }

    /// Regularized upper incomplete gamma function Q(a, x).
    fn gamma_q(a: f64, x: f64) -> f64 {
        if x <= 0.0 {
            1.0
        } else if x < a + 1.0 {
            1.0 - gamma_p_series(a, x)
        } else {
            gamma_q_continued_fraction(a, x)
        }
    }

    fn gamma_p_series(a: f64, x: f64) -> f64 {
        let mut ap = a;
        let mut term = 1.0 / a;
        let mut sum = term;
        for _ in 0..MAX_ITERATIONS {
            ap += 1.0;
            term *= x / ap;
            sum += term;
            if term.abs() < sum.abs() * EPSILON {
                break;
            }
        }
        sum * (-x + a * x.ln() - ln_gamma(a)).exp()
    }

    // Modified Lentz evaluation.
    fn gamma_q_continued_fraction(a: f64, x: f64) -> f64 {
        let mut b = x + 1.0 - a;
        let mut c = 1.0 / TINY;
        let mut d = 1.0 / b;
        let mut h = d;
        for i in 1..MAX_ITERATIONS {
            let an = -(i as f64) * (i as f64 - a);
            b += 2.0;
            d = an * d + b;
            if d.abs() < TINY {
                d = TINY;
            }
            c = b + an / c;
            if c.abs() < TINY {
                c = TINY;
            }
            d = 1.0 / d;
            let delta = d * c;
            h *= delta;
            if (delta - 1.0).abs() < EPSILON {
                break;
            }
        }
        (-x + a * x.ln() - ln_gamma(a)).exp() * h
    }

    /// Lanczos approximation (g = 7).
    pub(super) fn ln_gamma(x: f64) -> f64 {
        const COEFFICIENTS: [f64; 9] = [
            0.999_999_999_999_809_9,
            676.520_368_121_885_1,
            -1_259.139_216_722_402_8,
            771.323_428_777_653_1,
            -176.615_029_162_140_6,
            12.507_343_278_686_905,
            -0.138_571_095_265_720_12,
            9.984_369_578_019_572e-6,
            1.505_632_735_149_311_6e-7,
        ];

        if x < 0.5 {
            let pi = std::f64::consts::PI;
            return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
        }

        let x = x - 1.0;
        let t = x + 7.5;
        let series = COEFFICIENTS
            .iter()
            .enumerate()
            .skip(1)
            .fold(COEFFICIENTS[0], |acc, (i, c)| acc + c / (x + i as f64));
        0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
    }
}

/// Count occurrences, returning counts in order of first appearance.
fn counts_in_order<K: Hash + Eq>(items: impl IntoIterator<Item = K>) -> Vec<usize> {
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts = Vec::new();
    for item in items {
        let slot = *index.entry(item).or_insert_with(|| {
            counts.push(0);
            counts.len() - 1
        });
        counts[slot] += 1;
    }
    counts
}

impl Blob {
    /// Frequencies of the distinct blocks produced by `split`, in order of
    /// first appearance.
    pub fn frequencies(&self, split: &Split) -> Result<Vec<usize>> {
        if let (SplitBy::Size(size), None) = (&split.by, split.max_splits) {
            let width = width_bits(self, *size)?;
            if width % 8 == 0 {
                if let Ok(bytes) = self.bytes() {
                    return Ok(counts_in_order(bytes.chunks(width / 8)));
                }
            }
            return Ok(counts_in_order(self.bits().as_bytes().chunks(width)));
        }

        let blocks = self.split(split)?;
        Ok(counts_in_order(blocks.iter().map(|b| b.bits().to_owned())))
    }

    /// Shannon entropy of the blob's blocks of width `blocksize`.
    pub fn entropy(&self, blocksize: Address, base: f64) -> Result<f64> {
        self.entropy_with(default_provider(), &Split::from(blocksize), base)
    }

    pub fn entropy_with(
        &self,
        provider: &dyn StatisticsProvider,
        split: &Split,
        base: f64,
    ) -> Result<f64> {
        let counts = self.frequencies(split)?;
        provider.entropy(&counts, base)
    }

    /// Chi-square test of the blob's block frequencies. `expected` lists one
    /// expected frequency per distinct block, in order of first appearance;
    /// `None` tests against a uniform distribution.
    pub fn chisquare(&self, blocksize: Address, expected: Option<&[f64]>) -> Result<ChiSquare> {
        self.chisquare_with(default_provider(), &Split::from(blocksize), expected)
    }

    pub fn chisquare_with(
        &self,
        provider: &dyn StatisticsProvider,
        split: &Split,
        expected: Option<&[f64]>,
    ) -> Result<ChiSquare> {
        let counts = self.frequencies(split)?;
        provider.chisquare(&counts, expected)
    }
}
