//! Scheme selection by goodness of absolute deviation fit.

use super::interval::{EqualInterval, Quantiles};
use super::optimal::{FisherJenks, JenksCaspall, NaturalBreaks};
use super::scheme::{Classification, ClassifyError, Scheme};

/// Goodness of absolute deviation fit of a classification.
pub fn gadf(classification: &Classification) -> f64 {
    classification.gadf()
}

/// Result of a best-k search for one scheme family.
#[derive(Debug, Clone)]
pub struct KClassifierResult {
    /// Scheme family name.
    pub scheme: &'static str,
    /// The smallest-k classification whose GADF clears the threshold.
    pub classification: Classification,
    /// Its GADF.
    pub gadf: f64,
}

/// Best-k search across scheme families.
///
/// For each family, k is increased from 2 until the GADF clears `pct`; the
/// overall best is the family needing the fewest classes, ties broken by
/// higher GADF.
#[derive(Debug, Clone)]
pub struct KClassifiers {
    /// Per-family winners.
    pub results: Vec<KClassifierResult>,
    /// Index into `results` of the overall best.
    best: usize,
}

impl KClassifiers {
    /// Run the search with the given GADF threshold (0.8 is the customary
    /// default).
    pub fn search(y: &[f64], pct: f64) -> Result<Self, ClassifyError> {
        let n = y.len();
        if n == 0 {
            return Err(ClassifyError::EmptyData);
        }

        type Family<'a> = Box<dyn Fn(usize) -> Result<Classification, ClassifyError> + 'a>;
        let families: Vec<(&'static str, Family)> = vec![
            ("Quantiles", Box::new(|k| Quantiles::new(k).classify(y))),
            (
                "EqualInterval",
                Box::new(|k| EqualInterval::new(k).classify(y)),
            ),
            ("FisherJenks", Box::new(|k| FisherJenks::new(k).classify(y))),
            (
                "NaturalBreaks",
                Box::new(|k| NaturalBreaks::new(k).classify(y)),
            ),
            (
                "JenksCaspall",
                Box::new(|k| JenksCaspall::new(k).classify(y)),
            ),
        ];

        let mut results = Vec::new();
        for (name, build) in &families {
            let mut chosen: Option<(Classification, f64)> = None;
            for k in 2..=n {
                let classification = match build(k) {
                    Ok(c) => c,
                    // Distinct-value exhaustion ends the family's search
                    Err(ClassifyError::TooFewDistinctValues { .. }) => break,
                    Err(e) => return Err(e),
                };
                let fit = classification.gadf();
                if fit > pct {
                    chosen = Some((classification, fit));
                    break;
                }
                // Keep the last attempt in case no k clears the threshold
                chosen = Some((classification, fit));
            }
            if let Some((classification, fit)) = chosen {
                results.push(KClassifierResult {
                    scheme: name,
                    classification,
                    gadf: fit,
                });
            }
        }

        if results.is_empty() {
            return Err(ClassifyError::InvalidK { k: 2, n });
        }

        let mut best = 0;
        for (i, r) in results.iter().enumerate().skip(1) {
            let (bk, bg) = (results[best].classification.k(), results[best].gadf);
            let (ck, cg) = (r.classification.k(), r.gadf);
            if ck < bk || (ck == bk && cg > bg) {
                best = i;
            }
        }

        Ok(Self { results, best })
    }

    /// The overall winner.
    pub fn best(&self) -> &KClassifierResult {
        &self.results[self.best]
    }
}
