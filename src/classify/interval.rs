//! Interval-based classification schemes.
//!
//! These schemes derive class bounds directly from order statistics or
//! summary moments, without an optimization step.

use super::scheme::{validate_k, validated_sorted, Classification, ClassifyError, Scheme};
use crate::utils::{mean, quantile_sorted, std_dev};

/// Equal-width intervals over the data range.
#[derive(Debug, Clone)]
pub struct EqualInterval {
    k: usize,
}

impl EqualInterval {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl Scheme for EqualInterval {
    fn classify(&self, y: &[f64]) -> Result<Classification, ClassifyError> {
        let sorted = validated_sorted(y)?;
        validate_k(self.k, sorted.len())?;

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let width = (max - min) / self.k as f64;
        let mut bins: Vec<f64> = (1..=self.k).map(|i| min + width * i as f64).collect();
        bins[self.k - 1] = max;
        Classification::from_bins(self.name(), y, bins)
    }

    fn name(&self) -> &'static str {
        "EqualInterval"
    }
}

/// Quantile classes with linear-interpolation quantiles.
///
/// Heavily tied data can produce duplicate bounds; the duplicated classes
/// then come out empty, which is visible through `counts()`.
#[derive(Debug, Clone)]
pub struct Quantiles {
    k: usize,
}

impl Quantiles {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl Scheme for Quantiles {
    fn classify(&self, y: &[f64]) -> Result<Classification, ClassifyError> {
        let sorted = validated_sorted(y)?;
        validate_k(self.k, sorted.len())?;

        let bins: Vec<f64> = (1..=self.k)
            .map(|i| quantile_sorted(&sorted, i as f64 / self.k as f64))
            .collect();
        Classification::from_bins(self.name(), y, bins)
    }

    fn name(&self) -> &'static str {
        "Quantiles"
    }
}

/// Classes bounded at a fixed list of percentiles.
#[derive(Debug, Clone)]
pub struct Percentiles {
    pcts: Vec<f64>,
}

impl Percentiles {
    pub fn new(pcts: Vec<f64>) -> Self {
        Self { pcts }
    }
}

impl Default for Percentiles {
    fn default() -> Self {
        Self::new(vec![1.0, 10.0, 50.0, 90.0, 99.0, 100.0])
    }
}

impl Scheme for Percentiles {
    fn classify(&self, y: &[f64]) -> Result<Classification, ClassifyError> {
        if self.pcts.is_empty()
            || self.pcts.iter().any(|&p| !(0.0..=100.0).contains(&p))
            || self.pcts.windows(2).any(|w| w[1] <= w[0])
        {
            return Err(ClassifyError::InvalidPercentiles);
        }
        let sorted = validated_sorted(y)?;
        let bins: Vec<f64> = self
            .pcts
            .iter()
            .map(|&p| quantile_sorted(&sorted, p / 100.0))
            .collect();
        Classification::from_bins(self.name(), y, bins)
    }

    fn name(&self) -> &'static str {
        "Percentiles"
    }
}

/// Classes bounded at the mean plus/minus one and two standard deviations.
#[derive(Debug, Clone, Default)]
pub struct StdMean;

impl Scheme for StdMean {
    fn classify(&self, y: &[f64]) -> Result<Classification, ClassifyError> {
        let sorted = validated_sorted(y)?;
        let m = mean(&sorted);
        let s = std_dev(&sorted);
        let max = sorted[sorted.len() - 1];

        let cuts = [m - 2.0 * s, m - s, m + s, m + 2.0 * s];
        let mut bins: Vec<f64> = cuts.iter().cloned().filter(|&c| c < max).collect();
        bins.push(max);
        Classification::from_bins(self.name(), y, bins)
    }

    fn name(&self) -> &'static str {
        "StdMean"
    }
}

/// Box-and-whisker classes: fences at `hinge` IQR multiples beyond the
/// quartiles. The fence classes are empty when the data has no outliers.
#[derive(Debug, Clone)]
pub struct BoxPlot {
    hinge: f64,
}

impl BoxPlot {
    pub fn new(hinge: f64) -> Self {
        Self { hinge }
    }
}

impl Default for BoxPlot {
    fn default() -> Self {
        Self::new(1.5)
    }
}

impl Scheme for BoxPlot {
    fn classify(&self, y: &[f64]) -> Result<Classification, ClassifyError> {
        let sorted = validated_sorted(y)?;
        let q1 = quantile_sorted(&sorted, 0.25);
        let q2 = quantile_sorted(&sorted, 0.50);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let max = sorted[sorted.len() - 1];

        let mut bins = vec![q1 - self.hinge * iqr, q1, q2, q3, q3 + self.hinge * iqr];
        if max > bins[4] {
            bins.push(max);
        }
        Classification::from_bins(self.name(), y, bins)
    }

    fn name(&self) -> &'static str {
        "BoxPlot"
    }
}

/// User-supplied upper bounds. An extra class is appended when the data
/// maximum exceeds the last bound.
#[derive(Debug, Clone)]
pub struct UserDefined {
    bins: Vec<f64>,
}

impl UserDefined {
    pub fn new(bins: Vec<f64>) -> Self {
        Self { bins }
    }
}

impl Scheme for UserDefined {
    fn classify(&self, y: &[f64]) -> Result<Classification, ClassifyError> {
        if self.bins.is_empty() || self.bins.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ClassifyError::UnsortedBins);
        }
        let sorted = validated_sorted(y)?;
        let max = sorted[sorted.len() - 1];

        let mut bins = self.bins.clone();
        if max > bins[bins.len() - 1] {
            bins.push(max);
        }
        Classification::from_bins(self.name(), y, bins)
    }

    fn name(&self) -> &'static str {
        "UserDefined"
    }
}

/// Breaks at the k-1 widest gaps between consecutive sorted values.
#[derive(Debug, Clone)]
pub struct MaximumBreaks {
    k: usize,
    mindiff: f64,
}

impl MaximumBreaks {
    pub fn new(k: usize, mindiff: f64) -> Self {
        Self { k, mindiff }
    }
}

impl Scheme for MaximumBreaks {
    fn classify(&self, y: &[f64]) -> Result<Classification, ClassifyError> {
        let sorted = validated_sorted(y)?;
        validate_k(self.k, sorted.len())?;

        // Gaps above mindiff, widest first
        let mut gaps: Vec<(f64, usize)> = sorted
            .windows(2)
            .enumerate()
            .filter(|(_, w)| w[1] - w[0] > self.mindiff)
            .map(|(i, w)| (w[1] - w[0], i))
            .collect();
        if gaps.len() < self.k - 1 {
            return Err(ClassifyError::TooFewDistinctValues {
                distinct: gaps.len() + 1,
                k: self.k,
            });
        }
        gaps.sort_by(|a, b| b.0.total_cmp(&a.0).then(b.1.cmp(&a.1)));

        let mut bins: Vec<f64> = gaps
            .iter()
            .take(self.k - 1)
            .map(|&(_, i)| (sorted[i] + sorted[i + 1]) / 2.0)
            .collect();
        bins.push(sorted[sorted.len() - 1]);
        bins.sort_by(|a, b| a.total_cmp(b));
        Classification::from_bins(self.name(), y, bins)
    }

    fn name(&self) -> &'static str {
        "MaximumBreaks"
    }
}

/// Head/tail breaks for heavy-tailed data: split at the mean while the head
/// stays under 40 percent of the current partition.
#[derive(Debug, Clone, Default)]
pub struct HeadTailBreaks;

impl Scheme for HeadTailBreaks {
    fn classify(&self, y: &[f64]) -> Result<Classification, ClassifyError> {
        let sorted = validated_sorted(y)?;
        let max = sorted[sorted.len() - 1];

        let mut bins = Vec::new();
        let mut start = 0;
        loop {
            let part = &sorted[start..];
            if part.len() <= 1 {
                break;
            }
            let m = mean(part);
            if m >= max {
                break;
            }
            bins.push(m);
            // Head of the partition: values above the mean
            let head_start = part.partition_point(|&v| v <= m);
            let head_len = part.len() - head_start;
            if head_len == 0 || (head_len as f64 / part.len() as f64) >= 0.40 {
                break;
            }
            start += head_start;
        }
        if bins.last().map_or(true, |&b| b < max) {
            bins.push(max);
        }
        Classification::from_bins(self.name(), y, bins)
    }

    fn name(&self) -> &'static str {
        "HeadTailBreaks"
    }
}
