//! A validated, normalized probability mass function.

use super::error::PmfError;
use crate::rng::Pcg32;
use serde::Serialize;
use std::collections::HashSet;

/// Sums within this distance of 1.0 are stored as given. Tighter than a
/// 1e-6 tolerance so stored probabilities always sum to 1.0 within 1e-9.
pub const NORMALIZED_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pmf {
    values: Vec<f64>,
    probabilities: Vec<f64>,
    expected_value: f64,
}

impl Pmf {
    /// Builds a distribution from parallel value/probability slices.
    ///
    /// Entry order is preserved; sampling walks the cumulative mass in this order.
    pub fn new(values: &[f64], probabilities: &[f64]) -> Result<Self, PmfError> {
        if values.len() != probabilities.len() {
            return Err(PmfError::LengthMismatch {
                values: values.len(),
                probabilities: probabilities.len(),
            });
        }
        Self::from_entries(values.iter().copied().zip(probabilities.iter().copied()))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (f64, f64)>) -> Result<Self, PmfError> {
        let mut values = Vec::new();
        let mut probabilities = Vec::new();
        let mut seen = HashSet::new();

        for (value, probability) in entries {
            if !value.is_finite() || !probability.is_finite() {
                return Err(PmfError::NonFinite { value, probability });
            }
            if probability < 0.0 {
                return Err(PmfError::NegativeProbability { value, probability });
            }
            // `+ 0.0` folds -0.0 into 0.0 so both count as one key.
            if !seen.insert((value + 0.0).to_bits()) {
                return Err(PmfError::DuplicateValue(value));
            }
            values.push(value);
            probabilities.push(probability);
        }

        if values.is_empty() {
            return Err(PmfError::Empty);
        }

        let sum: f64 = probabilities.iter().sum();
        if sum <= 0.0 {
            return Err(PmfError::NonPositiveSum(sum));
        }
        if (sum - 1.0).abs() > NORMALIZED_EPSILON {
            for p in probabilities.iter_mut() {
                *p /= sum;
            }
        }

        let expected_value = values.iter().zip(&probabilities).map(|(v, p)| v * p).sum();

        Ok(Self { values, probabilities, expected_value })
    }

    pub fn values(&self) -> &[f64] { &self.values }
    pub fn probabilities(&self) -> &[f64] { &self.probabilities }
    pub fn expected_value(&self) -> f64 { self.expected_value }
    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    pub fn entries(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.values.iter().copied().zip(self.probabilities.iter().copied())
    }

    /// Running sum of probabilities in entry order.
    pub fn cumulative(&self) -> Vec<f64> {
        self.probabilities
            .iter()
            .scan(0.0, |acc, p| {
                *acc += p;
                Some(*acc)
            })
            .collect()
    }

    /// Inverse-transform sample: the first entry whose cumulative mass reaches `u`.
    pub fn sample(&self, rng: &mut Pcg32) -> f64 {
        let u = rng.next_f64();
        let mut acc = 0.0;
        for (value, probability) in self.entries() {
            acc += probability;
            if acc >= u {
                return value;
            }
        }
        // Rounding can leave the final cumulative sum just under `u`.
        self.values[self.values.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_normalized_kept() {
        let pmf = Pmf::new(&[1.0, 2.0, 3.0], &[0.2, 0.5, 0.3]).unwrap();
        assert_eq!(pmf.probabilities(), &[0.2, 0.5, 0.3]);
        assert!((pmf.expected_value() - 2.1).abs() < 1e-12);
    }

    #[test]
    fn test_small_excess_is_still_renormalized() {
        let pmf = Pmf::new(&[0.0, 1.0], &[0.5, 0.500_000_5]).unwrap();
        let sum: f64 = pmf.probabilities().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(pmf.probabilities()[1] < 0.500_000_5);

        let exact = Pmf::new(&[0.0, 1.0], &[0.25, 0.75]).unwrap();
        assert_eq!(exact.probabilities(), &[0.25, 0.75]);
    }

    #[test]
    fn test_renormalizes_and_recomputes_expectation() {
        let pmf = Pmf::new(&[0.0, 10.0], &[1.0, 3.0]).unwrap();
        let sum: f64 = pmf.probabilities().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(pmf.probabilities(), &[0.25, 0.75]);
        assert!((pmf.expected_value() - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_normalization_property_over_many_inputs() {
        let mut rng = Pcg32::new(5);
        for n in 1..20 {
            let values: Vec<f64> = (0..n).map(|i| i as f64 * 1.5).collect();
            let probs: Vec<f64> = (0..n).map(|_| rng.next_f64() + 0.01).collect();
            let pmf = Pmf::new(&values, &probs).unwrap();
            let sum: f64 = pmf.probabilities().iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
            let ev: f64 = pmf.entries().map(|(v, p)| v * p).sum();
            assert_eq!(pmf.expected_value(), ev);
        }
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert_eq!(Pmf::new(&[], &[]).unwrap_err(), PmfError::Empty);
        assert!(matches!(Pmf::new(&[1.0], &[0.5, 0.5]), Err(PmfError::LengthMismatch { .. })));
        assert!(matches!(Pmf::new(&[1.0, 2.0], &[1.5, -0.5]), Err(PmfError::NegativeProbability { .. })));
        assert!(matches!(Pmf::new(&[1.0, 2.0], &[0.0, 0.0]), Err(PmfError::NonPositiveSum(_))));
        assert!(matches!(Pmf::new(&[f64::NAN], &[1.0]), Err(PmfError::NonFinite { .. })));
        assert!(matches!(Pmf::new(&[1.0], &[f64::INFINITY]), Err(PmfError::NonFinite { .. })));
        assert_eq!(Pmf::new(&[1.0, 1.0], &[0.5, 0.5]).unwrap_err(), PmfError::DuplicateValue(1.0));
    }

    #[test]
    fn test_signed_zero_is_a_duplicate() {
        assert!(matches!(Pmf::new(&[0.0, -0.0], &[0.5, 0.5]), Err(PmfError::DuplicateValue(_))));
    }

    #[test]
    fn test_cumulative_ends_at_one() {
        let pmf = Pmf::new(&[1.0, 2.0, 3.0], &[0.1, 0.2, 0.7]).unwrap();
        let cdf = pmf.cumulative();
        assert_eq!(cdf.len(), 3);
        assert!((cdf[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_single_entry_is_constant() {
        let pmf = Pmf::new(&[4.0], &[1.0]).unwrap();
        let mut rng = Pcg32::new(1);
        for _ in 0..50 {
            assert_eq!(pmf.sample(&mut rng), 4.0);
        }
    }

    #[test]
    fn test_sample_skips_zero_mass_entries() {
        let pmf = Pmf::new(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.0]).unwrap();
        let mut rng = Pcg32::new(8);
        for _ in 0..200 {
            assert_eq!(pmf.sample(&mut rng), 2.0);
        }
    }
}
