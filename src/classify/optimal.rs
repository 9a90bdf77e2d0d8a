//! Optimization-based classification schemes.
//!
//! Fisher-Jenks is the exact dynamic program for minimal within-class
//! squared deviation; the rest are the classic iterative heuristics.

use super::scheme::{validate_k, validated_sorted, Classification, ClassifyError, Scheme};
use crate::utils::median_sorted;

/// Deterministic LCG used for seeding the restart-based heuristics.
struct Lcg(u64);

impl Lcg {
    fn next_usize(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.0 >> 33) as usize) % bound.max(1)
    }
}

/// Count distinct values in sorted data.
fn distinct_count(sorted: &[f64]) -> usize {
    1 + sorted.windows(2).filter(|w| w[1] > w[0]).count()
}

/// Upper bounds from class-start indices into the sorted data.
fn bins_from_starts(sorted: &[f64], starts: &[usize]) -> Vec<f64> {
    let k = starts.len() + 1;
    let mut bins = Vec::with_capacity(k);
    for j in 0..k {
        let end = if j + 1 < k {
            starts[j] - 1
        } else {
            sorted.len() - 1
        };
        bins.push(sorted[end]);
    }
    bins
}

/// ADCM of a partition given by class-start indices.
fn adcm_from_starts(sorted: &[f64], starts: &[usize]) -> f64 {
    let k = starts.len() + 1;
    let mut total = 0.0;
    let mut begin = 0;
    for j in 0..k {
        let end = if j < starts.len() {
            starts[j]
        } else {
            sorted.len()
        };
        let slice = &sorted[begin..end];
        if !slice.is_empty() {
            let med = median_sorted(slice);
            total += slice.iter().map(|&v| (v - med).abs()).sum::<f64>();
        }
        begin = end;
    }
    total
}

/// Class-start indices of a quantile seed partition.
fn quantile_starts(sorted: &[f64], k: usize) -> Vec<usize> {
    let n = sorted.len();
    let mut starts: Vec<usize> = (1..k).map(|j| (j * n) / k).collect();
    // Enforce strictly increasing non-empty classes
    for j in 0..starts.len() {
        let floor = j + 1;
        if starts[j] < floor {
            starts[j] = floor;
        }
        let ceil = n - (starts.len() - j);
        if starts[j] > ceil {
            starts[j] = ceil;
        }
    }
    starts
}

/// Exact optimal classification by dynamic programming (Fisher 1958,
/// popularized by Jenks). Minimizes within-class sum of squared deviations
/// in O(k n²) with prefix sums.
#[derive(Debug, Clone)]
pub struct FisherJenks {
    k: usize,
}

impl FisherJenks {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl Scheme for FisherJenks {
    fn classify(&self, y: &[f64]) -> Result<Classification, ClassifyError> {
        let sorted = validated_sorted(y)?;
        let n = sorted.len();
        validate_k(self.k, n)?;
        let k = self.k;

        // Prefix sums of values and squares
        let mut s = vec![0.0; n + 1];
        let mut s2 = vec![0.0; n + 1];
        for i in 0..n {
            s[i + 1] = s[i] + sorted[i];
            s2[i + 1] = s2[i] + sorted[i] * sorted[i];
        }
        // Within-class sum of squared deviations for sorted[i..=j]
        let ssd = |i: usize, j: usize| -> f64 {
            let len = (j - i + 1) as f64;
            let sum = s[j + 1] - s[i];
            let sumsq = s2[j + 1] - s2[i];
            (sumsq - sum * sum / len).max(0.0)
        };

        // dp[c][j]: minimal error for sorted[0..=j] in c+1 classes
        let mut dp = vec![vec![f64::INFINITY; n]; k];
        let mut split = vec![vec![0usize; n]; k];
        for j in 0..n {
            dp[0][j] = ssd(0, j);
        }
        for c in 1..k {
            for j in c..n {
                for m in (c - 1)..j {
                    let err = dp[c - 1][m] + ssd(m + 1, j);
                    if err < dp[c][j] {
                        dp[c][j] = err;
                        split[c][j] = m + 1;
                    }
                }
            }
        }

        // Recover class-start indices
        let mut starts = vec![0usize; k - 1];
        let mut j = n - 1;
        for c in (1..k).rev() {
            let start = split[c][j];
            starts[c - 1] = start;
            j = start - 1;
        }

        Classification::from_bins(self.name(), y, bins_from_starts(&sorted, &starts))
    }

    fn name(&self) -> &'static str {
        "FisherJenks"
    }
}

/// One-dimensional k-means with deterministic restarts; the best partition
/// by within-class squared deviation wins.
#[derive(Debug, Clone)]
pub struct NaturalBreaks {
    k: usize,
    restarts: usize,
}

impl NaturalBreaks {
    pub fn new(k: usize) -> Self {
        Self { k, restarts: 10 }
    }

    pub fn with_restarts(k: usize, restarts: usize) -> Self {
        Self { k, restarts }
    }
}

impl Scheme for NaturalBreaks {
    fn classify(&self, y: &[f64]) -> Result<Classification, ClassifyError> {
        let sorted = validated_sorted(y)?;
        let n = sorted.len();
        validate_k(self.k, n)?;
        let k = self.k;

        let distinct = distinct_count(&sorted);
        if distinct < k {
            return Err(ClassifyError::TooFewDistinctValues { distinct, k });
        }

        let mut uniques: Vec<f64> = Vec::with_capacity(distinct);
        for &v in &sorted {
            if uniques.last().map_or(true, |&u| v > u) {
                uniques.push(v);
            }
        }

        let mut best_bins: Option<Vec<f64>> = None;
        let mut best_tss = f64::INFINITY;
        let mut rng = Lcg(0x9E3779B97F4A7C15);

        for restart in 0..self.restarts.max(1) {
            // Seed centroids: spread for the first restart, sampled after
            let mut centroids: Vec<f64> = if restart == 0 {
                (0..k)
                    .map(|j| uniques[j * (uniques.len() - 1) / k.max(1)])
                    .collect()
            } else {
                let mut picks = std::collections::BTreeSet::new();
                while picks.len() < k {
                    picks.insert(rng.next_usize(uniques.len()));
                }
                picks.iter().map(|&i| uniques[i]).collect()
            };
            centroids.sort_by(|a, b| a.total_cmp(b));
            centroids.dedup();
            if centroids.len() < k {
                continue;
            }

            // Lloyd iterations over the sorted data
            let mut starts = vec![0usize; k - 1];
            for _ in 0..300 {
                // Assignment: boundary between classes at centroid midpoints
                let mut new_starts = Vec::with_capacity(k - 1);
                for j in 0..(k - 1) {
                    let boundary = (centroids[j] + centroids[j + 1]) / 2.0;
                    new_starts.push(sorted.partition_point(|&v| v <= boundary));
                }
                // Keep classes non-empty
                for j in 0..new_starts.len() {
                    let floor = if j == 0 { 1 } else { new_starts[j - 1] + 1 };
                    if new_starts[j] < floor {
                        new_starts[j] = floor;
                    }
                    let ceil = n - (new_starts.len() - j);
                    if new_starts[j] > ceil {
                        new_starts[j] = ceil;
                    }
                }

                // Update centroids
                let mut changed = false;
                let mut begin = 0;
                for j in 0..k {
                    let end = if j < k - 1 { new_starts[j] } else { n };
                    let slice = &sorted[begin..end];
                    let m = slice.iter().sum::<f64>() / slice.len() as f64;
                    if (m - centroids[j]).abs() > 1e-12 {
                        changed = true;
                    }
                    centroids[j] = m;
                    begin = end;
                }

                let stable = new_starts == starts;
                starts = new_starts;
                if stable && !changed {
                    break;
                }
            }

            // Score by within-class squared deviation
            let mut tss = 0.0;
            let mut begin = 0;
            for j in 0..k {
                let end = if j < k - 1 { starts[j] } else { n };
                let slice = &sorted[begin..end];
                let m = slice.iter().sum::<f64>() / slice.len() as f64;
                tss += slice.iter().map(|&v| (v - m).powi(2)).sum::<f64>();
                begin = end;
            }
            if tss < best_tss {
                best_tss = tss;
                best_bins = Some(bins_from_starts(&sorted, &starts));
            }
        }

        let bins = best_bins.ok_or(ClassifyError::TooFewDistinctValues { distinct, k })?;
        Classification::from_bins(self.name(), y, bins)
    }

    fn name(&self) -> &'static str {
        "NaturalBreaks"
    }
}

/// Jenks-Caspall reassignment: quantile seed, then move values to the class
/// with the nearest mean until stable.
#[derive(Debug, Clone)]
pub struct JenksCaspall {
    k: usize,
}

impl JenksCaspall {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl Scheme for JenksCaspall {
    fn classify(&self, y: &[f64]) -> Result<Classification, ClassifyError> {
        let sorted = validated_sorted(y)?;
        let n = sorted.len();
        validate_k(self.k, n)?;
        let k = self.k;

        let mut starts = quantile_starts(&sorted, k);

        for _ in 0..100 {
            // Class means of the current partition
            let mut means = Vec::with_capacity(k);
            let mut begin = 0;
            for j in 0..k {
                let end = if j < k - 1 { starts[j] } else { n };
                let slice = &sorted[begin..end];
                means.push(slice.iter().sum::<f64>() / slice.len() as f64);
                begin = end;
            }

            // Reassign: boundary moves to the midpoint between adjacent means
            let mut new_starts = Vec::with_capacity(k - 1);
            for j in 0..(k - 1) {
                let boundary = (means[j] + means[j + 1]) / 2.0;
                new_starts.push(sorted.partition_point(|&v| v <= boundary));
            }
            for j in 0..new_starts.len() {
                let floor = if j == 0 { 1 } else { new_starts[j - 1] + 1 };
                if new_starts[j] < floor {
                    new_starts[j] = floor;
                }
                let ceil = n - (new_starts.len() - j);
                if new_starts[j] > ceil {
                    new_starts[j] = ceil;
                }
            }

            if new_starts == starts {
                break;
            }
            starts = new_starts;
        }

        Classification::from_bins(self.name(), y, bins_from_starts(&sorted, &starts))
    }

    fn name(&self) -> &'static str {
        "JenksCaspall"
    }
}

/// Greedy ADCM reduction from jittered quantile seeds: each restart moves
/// class boundaries one position at a time while the fit improves, and the
/// best local optimum wins.
#[derive(Debug, Clone)]
pub struct MaxP {
    k: usize,
    restarts: usize,
}

impl MaxP {
    pub fn new(k: usize) -> Self {
        Self { k, restarts: 10 }
    }

    pub fn with_restarts(k: usize, restarts: usize) -> Self {
        Self { k, restarts }
    }
}

impl Scheme for MaxP {
    fn classify(&self, y: &[f64]) -> Result<Classification, ClassifyError> {
        let sorted = validated_sorted(y)?;
        let n = sorted.len();
        validate_k(self.k, n)?;
        let k = self.k;
        if k == 1 {
            return Classification::from_bins(self.name(), y, vec![sorted[n - 1]]);
        }

        let seed = quantile_starts(&sorted, k);
        let jitter_span = (n / (4 * k)).max(1);
        let mut rng = Lcg(0xD1B54A32D192ED03);

        let mut best_starts = seed.clone();
        let mut best_adcm = adcm_from_starts(&sorted, &seed);

        for restart in 0..self.restarts.max(1) {
            let mut starts = seed.clone();
            if restart > 0 {
                for j in 0..starts.len() {
                    let offset = rng.next_usize(2 * jitter_span + 1) as i64 - jitter_span as i64;
                    let moved = starts[j] as i64 + offset;
                    let floor = (j + 1) as i64;
                    let ceil = (n - (starts.len() - j)) as i64;
                    starts[j] = moved.clamp(floor, ceil) as usize;
                }
                // Jitter can reorder boundaries; restore monotonicity
                for j in 1..starts.len() {
                    if starts[j] <= starts[j - 1] {
                        starts[j] = starts[j - 1] + 1;
                    }
                }
            }

            let mut current = adcm_from_starts(&sorted, &starts);
            let mut improved = true;
            let mut moves = 0;
            while improved && moves < 1000 {
                improved = false;
                for j in 0..starts.len() {
                    let floor = if j == 0 { 1 } else { starts[j - 1] + 1 };
                    let ceil = if j + 1 < starts.len() {
                        starts[j + 1] - 1
                    } else {
                        n - 1
                    };
                    for candidate in [starts[j].wrapping_sub(1), starts[j] + 1] {
                        if candidate < floor || candidate > ceil || candidate == starts[j] {
                            continue;
                        }
                        let mut trial = starts.clone();
                        trial[j] = candidate;
                        let score = adcm_from_starts(&sorted, &trial);
                        if score < current {
                            starts = trial;
                            current = score;
                            improved = true;
                            moves += 1;
                            break;
                        }
                    }
                }
            }

            if current < best_adcm {
                best_adcm = current;
                best_starts = starts;
            }
        }

        Classification::from_bins(self.name(), y, bins_from_starts(&sorted, &best_starts))
    }

    fn name(&self) -> &'static str {
        "MaxP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fisher_jenks_clustered_data() {
        // Three obvious clusters
        let y = [1.0, 1.1, 1.2, 10.0, 10.1, 10.2, 50.0, 50.1, 50.2];
        let c = FisherJenks::new(3).classify(&y).expect("valid");
        assert_eq!(c.bins(), &[1.2, 10.2, 50.2]);
        assert_eq!(c.counts(), &[3, 3, 3]);
    }

    #[test]
    fn test_fisher_jenks_optimality_beats_equal_interval() {
        let y = [0.0, 0.1, 0.2, 0.3, 9.0, 9.1, 9.2, 100.0];
        let fj = FisherJenks::new(3).classify(&y).expect("valid");
        let ei = super::super::interval::EqualInterval::new(3)
            .classify(&y)
            .expect("valid");
        assert!(fj.tss() <= ei.tss() + 1e-12);
    }

    #[test]
    fn test_fisher_jenks_k_equals_n() {
        let y = [3.0, 1.0, 2.0];
        let c = FisherJenks::new(3).classify(&y).expect("valid");
        assert_eq!(c.counts(), &[1, 1, 1]);
        assert!((c.tss()).abs() < 1e-12);
    }

    #[test]
    fn test_natural_breaks_finds_clusters() {
        let y = [1.0, 1.2, 1.1, 20.0, 20.5, 19.5, 100.0, 101.0, 99.0];
        let c = NaturalBreaks::new(3).classify(&y).expect("valid");
        assert_eq!(c.counts(), &[3, 3, 3]);
    }

    #[test]
    fn test_natural_breaks_too_few_distinct() {
        let y = [1.0, 1.0, 2.0];
        assert!(matches!(
            NaturalBreaks::new(3).classify(&y),
            Err(ClassifyError::TooFewDistinctValues { distinct: 2, k: 3 })
        ));
    }

    #[test]
    fn test_jenks_caspall_converges() {
        let y: Vec<f64> = (0..30).map(|i| (i * i) as f64).collect();
        let c = JenksCaspall::new(4).classify(&y).expect("valid");
        assert_eq!(c.k(), 4);
        assert_eq!(c.counts().iter().sum::<usize>(), 30);
        for &count in c.counts() {
            assert!(count > 0);
        }
    }

    #[test]
    fn test_max_p_no_worse_than_quantile_seed() {
        let y: Vec<f64> = (0..40).map(|i| (i as f64).exp2().min(1e6)).collect();
        let mp = MaxP::new(4).classify(&y).expect("valid");
        let q = super::super::interval::Quantiles::new(4)
            .classify(&y)
            .expect("valid");
        assert!(mp.adcm() <= q.adcm() + 1e-9);
    }

    #[test]
    fn test_max_p_single_class() {
        let y = [1.0, 2.0, 3.0];
        let c = MaxP::new(1).classify(&y).expect("valid");
        assert_eq!(c.k(), 1);
        assert_eq!(c.counts(), &[3]);
    }
}
