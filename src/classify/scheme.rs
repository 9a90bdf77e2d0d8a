//! Classification result object and the scheme trait.

use crate::utils::{abs_deviation_about_median, median};
use thiserror::Error;

/// Errors from classifying a value array.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("cannot classify an empty array")]
    EmptyData,

    #[error("value at index {0} is not finite")]
    NonFiniteValue(usize),

    #[error("k must satisfy 1 <= k <= n, got k={k} for n={n}")]
    InvalidK { k: usize, n: usize },

    #[error("percentiles must be increasing values in [0, 100]")]
    InvalidPercentiles,

    #[error("user-defined bins must be strictly increasing")]
    UnsortedBins,

    #[error("found only {distinct} distinct values for k={k} classes")]
    TooFewDistinctValues { distinct: usize, k: usize },
}

/// A classification scheme that partitions a value array into classes.
pub trait Scheme {
    /// Partition `y` into classes.
    fn classify(&self, y: &[f64]) -> Result<Classification, ClassifyError>;

    /// Short scheme name for reporting.
    fn name(&self) -> &'static str;
}

/// Result of applying a classification scheme.
///
/// Classes are contiguous half-open value ranges: class 0 holds values
/// `v <= bins[0]`, and class j > 0 holds values with
/// `bins[j-1] < v <= bins[j]`. The last bin always equals the data maximum.
#[derive(Debug, Clone)]
pub struct Classification {
    scheme: &'static str,
    /// Upper class bounds, non-decreasing, length k.
    bins: Vec<f64>,
    /// Lower bound of class 0 (the data minimum).
    lower: f64,
    /// Class index per observation, in input order.
    assignments: Vec<usize>,
    /// Observations per class.
    counts: Vec<usize>,
    /// Input values, in input order.
    values: Vec<f64>,
}

impl Classification {
    /// Build a classification from upper bounds.
    ///
    /// Bins must be non-decreasing; the final bin is extended to the data
    /// maximum when it falls short, so every value is covered.
    pub(crate) fn from_bins(
        scheme: &'static str,
        y: &[f64],
        mut bins: Vec<f64>,
    ) -> Result<Self, ClassifyError> {
        if y.is_empty() {
            return Err(ClassifyError::EmptyData);
        }
        if let Some(i) = y.iter().position(|v| !v.is_finite()) {
            return Err(ClassifyError::NonFiniteValue(i));
        }
        if bins.is_empty() {
            return Err(ClassifyError::InvalidK { k: 0, n: y.len() });
        }
        if bins.windows(2).any(|w| w[1] < w[0]) {
            return Err(ClassifyError::UnsortedBins);
        }

        let max = y.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = y.iter().cloned().fold(f64::INFINITY, f64::min);
        let last = bins.len() - 1;
        if bins[last] < max {
            bins[last] = max;
        }

        let k = bins.len();
        let mut counts = vec![0usize; k];
        let mut assignments = Vec::with_capacity(y.len());
        for &v in y {
            let class = find_bin_index(&bins, v);
            counts[class] += 1;
            assignments.push(class);
        }

        Ok(Self {
            scheme,
            bins,
            lower: min,
            assignments,
            counts,
            values: y.to_vec(),
        })
    }

    /// Scheme name.
    pub fn scheme(&self) -> &'static str {
        self.scheme
    }

    /// Number of classes.
    pub fn k(&self) -> usize {
        self.bins.len()
    }

    /// Upper class bounds.
    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    /// Lower bound of the first class (the data minimum).
    pub fn lower_bound(&self) -> f64 {
        self.lower
    }

    /// Class index per observation, in input order.
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Observation count per class. Classes may be empty when a scheme
    /// produces duplicate bounds (heavily tied data under quantiles).
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Class index for an arbitrary value. Values beyond the last bound map
    /// to the final class.
    pub fn find_bin(&self, value: f64) -> usize {
        find_bin_index(&self.bins, value)
    }

    /// Values belonging to class `j`, in input order.
    pub fn class_values(&self, j: usize) -> Vec<f64> {
        self.values
            .iter()
            .zip(self.assignments.iter())
            .filter(|(_, &c)| c == j)
            .map(|(&v, _)| v)
            .collect()
    }

    /// Absolute deviation around class medians.
    pub fn adcm(&self) -> f64 {
        (0..self.k())
            .map(|j| {
                let members = self.class_values(j);
                if members.is_empty() {
                    0.0
                } else {
                    let med = median(&members);
                    members.iter().map(|&v| (v - med).abs()).sum::<f64>()
                }
            })
            .sum()
    }

    /// Within-class sum of squared deviations from class means.
    pub fn tss(&self) -> f64 {
        (0..self.k())
            .map(|j| {
                let members = self.class_values(j);
                if members.is_empty() {
                    0.0
                } else {
                    let mean = members.iter().sum::<f64>() / members.len() as f64;
                    members.iter().map(|&v| (v - mean).powi(2)).sum::<f64>()
                }
            })
            .sum()
    }

    /// Goodness of absolute deviation fit: 1 - ADCM / ADAM, where ADAM is
    /// the absolute deviation around the global median.
    pub fn gadf(&self) -> f64 {
        let adam = abs_deviation_about_median(&self.values);
        if adam == 0.0 {
            1.0
        } else {
            1.0 - self.adcm() / adam
        }
    }
}

/// First class whose upper bound covers `value`; the final class when the
/// value exceeds every bound.
fn find_bin_index(bins: &[f64], value: f64) -> usize {
    let mut lo = 0;
    let mut hi = bins.len();
    while lo < hi {
        let mid = (lo + hi) / 2;
        if value <= bins[mid] {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo.min(bins.len() - 1)
}

/// Validate values and return a sorted copy.
pub(crate) fn validated_sorted(y: &[f64]) -> Result<Vec<f64>, ClassifyError> {
    if y.is_empty() {
        return Err(ClassifyError::EmptyData);
    }
    if let Some(i) = y.iter().position(|v| !v.is_finite()) {
        return Err(ClassifyError::NonFiniteValue(i));
    }
    let mut sorted = y.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(sorted)
}

/// Validate a class count against the data size.
pub(crate) fn validate_k(k: usize, n: usize) -> Result<(), ClassifyError> {
    if k < 1 || k > n {
        Err(ClassifyError::InvalidK { k, n })
    } else {
        Ok(())
    }
}
