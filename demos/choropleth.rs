//! Compare classification schemes on a skewed variable and pick the best
//! one automatically.
//!
//! Run with: cargo run --example choropleth

use spatialstats::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A heavy-tailed variable, the usual shape of rates and counts
    let values: Vec<f64> = (1..=300).map(|i| 1000.0 / (i as f64)).collect();

    let schemes: Vec<Box<dyn Scheme>> = vec![
        Box::new(Quantiles::new(5)),
        Box::new(EqualInterval::new(5)),
        Box::new(FisherJenks::new(5)),
        Box::new(NaturalBreaks::new(5)),
        Box::new(JenksCaspall::new(5)),
        Box::new(HeadTailBreaks),
    ];

    println!("{:<16} {:>8} {:>10}  counts", "scheme", "k", "GADF");
    for scheme in &schemes {
        let classes = scheme.classify(&values)?;
        println!(
            "{:<16} {:>8} {:>10.4}  {:?}",
            classes.scheme(),
            classes.k(),
            classes.gadf(),
            classes.counts(),
        );
    }

    // Let the search pick the smallest k that explains 80% of the
    // absolute deviation
    let search = KClassifiers::search(&values, 0.8)?;
    let best = search.best();
    println!(
        "\nbest: {} with k = {} (GADF = {:.4})",
        best.scheme,
        best.classification.k(),
        best.gadf,
    );
    println!("bins: {:?}", best.classification.bins());

    Ok(())
}
