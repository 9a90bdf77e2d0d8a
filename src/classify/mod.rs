//! Choropleth map classification.
//!
//! Partitions a numeric array into k contiguous, non-overlapping value
//! ranges for thematic-map shading. Every scheme produces a
//! [`Classification`] upholding the same contract: a value v in class j > 0
//! satisfies `bins[j-1] < v <= bins[j]`, and class 0 is `v <= bins[0]`.
//!
//! # Example
//!
//! ```rust,ignore
//! use spatialstats::classify::{FisherJenks, Scheme};
//!
//! let c = FisherJenks::new(5).classify(&incomes)?;
//! println!("breaks: {:?}", c.bins());
//! println!("fit: {:.3}", c.gadf());
//! ```

mod interval;
mod optimal;
mod scheme;
mod selection;

pub use interval::{
    BoxPlot, EqualInterval, HeadTailBreaks, MaximumBreaks, Percentiles, Quantiles, StdMean,
    UserDefined,
};
pub use optimal::{FisherJenks, JenksCaspall, MaxP, NaturalBreaks};
pub use scheme::{Classification, ClassifyError, Scheme};
pub use selection::{gadf, KClassifierResult, KClassifiers};
