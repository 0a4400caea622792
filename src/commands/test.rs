//! Test command implementation.
//!
//! Runs collection passes against the configured targets and displays results.

use anyhow::Context;

use crate::classifier::MetricCategory;
use crate::collector::{Collector, MetricCollection};
use crate::config::Config;
use crate::metrics::encode_collection;
use crate::reader::{IpmitoolReader, SensorReader};

/// Tests metrics collection with the real ipmitool reader.
pub async fn command_test(iterations: usize, verbose: bool, config: &Config) -> anyhow::Result<()> {
    let collector = Collector::new(IpmitoolReader::from_config(config), config);
    run_test(&collector, iterations, verbose).await
}

/// Runs `iterations` passes with `collector` and prints a summary of each.
pub async fn run_test<R: SensorReader>(
    collector: &Collector<R>,
    iterations: usize,
    verbose: bool,
) -> anyhow::Result<()> {
    println!("🧪 Herakles IPMI Exporter - Test Mode");
    println!("=====================================");
    println!("Targets: {}", collector.targets().join(", "));

    let mut last = MetricCollection::default();
    for iteration in 1..=iterations.max(1) {
        println!("\n🔄 Iteration {}/{}:", iteration, iterations.max(1));

        let collection = collector.collect().await;
        print_collection(&collection, verbose);
        last = collection;
    }

    if verbose {
        let mut buffer = Vec::new();
        encode_collection(&last, &mut buffer).context("failed to encode metrics")?;
        let text = String::from_utf8(buffer).context("encoded metrics are not UTF-8")?;
        println!("\n📄 Exposition of last pass:\n{}", text);
    }

    let failed = last.failed_targets().count();
    if failed == last.targets.len() && !last.targets.is_empty() {
        anyhow::bail!("all {} target(s) failed", failed);
    }

    println!("\n✅ Test completed");
    Ok(())
}

fn print_collection(collection: &MetricCollection, verbose: bool) {
    for category in MetricCategory::ALL {
        let samples: Vec<_> = collection.category(category).collect();
        println!("   📊 {} ({} samples)", category.metric_name(), samples.len());
        for sample in samples {
            println!("   │  ├─ {} {} = {}", sample.target, sample.sensor, sample.value);
        }
    }

    if verbose {
        for report in &collection.targets {
            match &report.error {
                None => println!(
                    "   ✅ {}: {} samples in {:.0}ms",
                    report.target,
                    report.samples,
                    report.duration.as_secs_f64() * 1000.0
                ),
                Some(e) => println!("   ❌ {}: {}", report.target, e),
            }
        }
    }

    println!(
        "   ⏱️  Pass took {:.2}ms ({} skipped, {} unparsed, {} undefined)",
        collection.duration.as_secs_f64() * 1000.0,
        collection.stats.skipped,
        collection.stats.unparsed,
        collection.stats.undefined
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ReadError;
    use std::future::Future;

    /// Answers every target with the same output, or fails all of them.
    struct FixedReader(Option<&'static str>);

    impl SensorReader for FixedReader {
        fn read(&self, target: &str) -> impl Future<Output = Result<String, ReadError>> + Send {
            let result = self
                .0
                .map(str::to_string)
                .ok_or_else(|| ReadError::InvalidTarget(target.to_string()));
            async move { result }
        }
    }

    fn config() -> Config {
        Config {
            targets: vec!["10.0.0.1".into(), "10.0.0.2".into()],
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_all_targets_failing_is_an_error() {
        let collector = Collector::new(FixedReader(None), &config());
        let err = run_test(&collector, 2, false).await.unwrap_err();
        assert!(err.to_string().contains("all 2 target(s) failed"));
    }

    #[tokio::test]
    async fn test_successful_run() {
        let reader = FixedReader(Some("CPU1 Temp | 41.00 degrees C | ok\n"));
        let collector = Collector::new(reader, &config());
        assert!(run_test(&collector, 1, true).await.is_ok());
    }
}
