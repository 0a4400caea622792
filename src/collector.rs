//! Collection pass over all configured BMC targets.
//!
//! Each target is read in its own task. Tasks return private result buffers
//! which are merged, in configured target order, once every task has finished.
//! Nothing is kept between passes.

use ahash::AHashMap as HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn, Level};

use crate::classifier::{classify, Classification, MetricCategory};
use crate::config::Config;
use crate::reader::{ReadError, SensorReader};
use crate::sdr::{extract_value, pair_readings, SensorValue};

/// One exported reading.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub target: String,
    pub sensor: String,
    pub category: MetricCategory,
    pub value: f64,
}

impl MetricSample {
    /// Label value: target address immediately followed by the sensor name.
    pub fn label(&self) -> String {
        format!("{}{}", self.target, self.sensor)
    }
}

/// Per-record outcome counters for one target or one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub ignored: u64,
    pub skipped: u64,
    pub unparsed: u64,
    pub undefined: u64,
}

impl ParseStats {
    fn merge(&mut self, other: &ParseStats) {
        self.ignored += other.ignored;
        self.skipped += other.skipped;
        self.unparsed += other.unparsed;
        self.undefined += other.undefined;
    }
}

/// Outcome of reading one target.
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub target: String,
    pub success: bool,
    pub samples: usize,
    pub duration: Duration,
    pub error: Option<String>,
}

/// Private result buffer of one target task.
#[derive(Debug)]
struct TargetResult {
    report: TargetReport,
    samples: Vec<MetricSample>,
    stats: ParseStats,
}

impl TargetResult {
    fn failed(target: &str, duration: Duration, error: String) -> Self {
        Self {
            report: TargetReport {
                target: target.to_string(),
                success: false,
                samples: 0,
                duration,
                error: Some(error),
            },
            samples: Vec::new(),
            stats: ParseStats::default(),
        }
    }
}

/// All samples of one collection pass.
#[derive(Debug, Clone, Default)]
pub struct MetricCollection {
    pub samples: Vec<MetricSample>,
    pub targets: Vec<TargetReport>,
    pub stats: ParseStats,
    pub duration: Duration,
}

impl MetricCollection {
    /// Samples of one category.
    pub fn category(&self, category: MetricCategory) -> impl Iterator<Item = &MetricSample> {
        self.samples.iter().filter(move |s| s.category == category)
    }

    /// Number of samples per category; every category is present.
    pub fn category_counts(&self) -> [(MetricCategory, usize); 4] {
        MetricCategory::ALL.map(|c| (c, self.category(c).count()))
    }

    pub fn failed_targets(&self) -> impl Iterator<Item = &TargetReport> {
        self.targets.iter().filter(|t| !t.success)
    }
}

/// Log level for a value that could not be parsed.
///
/// Power supply status sensors report hex state bytes such as `0x01` on every
/// pass, so they are logged at debug level.
pub fn unparsed_log_level(classification: Classification) -> Level {
    match classification {
        Classification::Category(MetricCategory::Power) => Level::DEBUG,
        _ => Level::WARN,
    }
}

/// Turns one target's raw SDR output into samples.
///
/// Repeated sensor names keep their last reading, in first-seen position.
pub fn parse_target_output<S: AsRef<str>>(
    target: &str,
    raw: &str,
    skip_values: &[S],
) -> (Vec<MetricSample>, ParseStats) {
    let mut samples: Vec<MetricSample> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut stats = ParseStats::default();

    for reading in pair_readings(raw) {
        let classification = classify(reading.name);
        if classification == Classification::Ignored {
            debug!("Ignoring sensor {} on {}", reading.name, target);
            stats.ignored += 1;
            continue;
        }

        let value = match extract_value(reading.value, skip_values) {
            SensorValue::Value(v) => v,
            SensorValue::Skipped => {
                debug!("Skipping sensor {} on {}: no reading", reading.name, target);
                stats.skipped += 1;
                continue;
            }
            SensorValue::Invalid => {
                if unparsed_log_level(classification) == Level::DEBUG {
                    debug!(
                        "Unparsed value for sensor {} on {}: {:?}",
                        reading.name,
                        target,
                        reading.value.trim()
                    );
                } else {
                    warn!(
                        "Unparsed value for sensor {} on {}: {:?}",
                        reading.name,
                        target,
                        reading.value.trim()
                    );
                }
                stats.unparsed += 1;
                continue;
            }
        };

        let category = match classification {
            Classification::Category(category) => category,
            _ => {
                error!("Undefined metric: {}", reading.name);
                stats.undefined += 1;
                continue;
            }
        };

        let sample = MetricSample {
            target: target.to_string(),
            sensor: reading.name.to_string(),
            category,
            value,
        };
        match index.get(reading.name) {
            Some(&pos) => samples[pos] = sample,
            None => {
                index.insert(reading.name.to_string(), samples.len());
                samples.push(sample);
            }
        }
    }

    (samples, stats)
}

/// Runs collection passes with a given reader.
pub struct Collector<R: SensorReader> {
    reader: Arc<R>,
    targets: Arc<[String]>,
    skip_values: Arc<[String]>,
    timeout: Duration,
    parallelism: usize,
}

impl<R: SensorReader> Collector<R> {
    pub fn new(reader: R, config: &Config) -> Self {
        Self {
            reader: Arc::new(reader),
            targets: config.targets.clone().into(),
            skip_values: config.skip_values.clone().into(),
            timeout: Duration::from_secs(config.timeout_secs),
            parallelism: config.parallelism.max(1),
        }
    }

    /// Overrides the per-target timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Performs one full collection pass.
    ///
    /// Dropping the returned future aborts all in-flight target tasks.
    pub async fn collect(&self) -> MetricCollection {
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        let mut tasks = JoinSet::new();

        info!("Start collecting the metrics from {} targets", self.targets.len());

        for (idx, target) in self.targets.iter().enumerate() {
            let reader = Arc::clone(&self.reader);
            let semaphore = Arc::clone(&semaphore);
            let skip_values = Arc::clone(&self.skip_values);
            let target = target.clone();
            let timeout = self.timeout;

            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        collect_target(reader.as_ref(), &target, timeout, &skip_values).await
                    }
                    Err(e) => TargetResult::failed(&target, Duration::ZERO, e.to_string()),
                };
                (idx, result)
            });
        }

        let mut results: Vec<Option<TargetResult>> = Vec::with_capacity(self.targets.len());
        results.resize_with(self.targets.len(), || None);

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, result)) => results[idx] = Some(result),
                Err(e) => error!("Target collection task failed: {}", e),
            }
        }

        let mut collection = MetricCollection::default();
        for (target, result) in self.targets.iter().zip(results) {
            let result = result.unwrap_or_else(|| {
                TargetResult::failed(target, Duration::ZERO, "collection task failed".into())
            });
            collection.stats.merge(&result.stats);
            collection.samples.extend(result.samples);
            collection.targets.push(result.report);
        }
        collection.duration = start.elapsed();

        info!(
            "Collection pass completed: {} samples from {}/{} targets in {:.2}ms",
            collection.samples.len(),
            collection.targets.iter().filter(|t| t.success).count(),
            collection.targets.len(),
            collection.duration.as_secs_f64() * 1000.0
        );

        collection
    }
}

#[instrument(skip(reader, timeout, skip_values))]
async fn collect_target<R: SensorReader>(
    reader: &R,
    target: &str,
    timeout: Duration,
    skip_values: &[String],
) -> TargetResult {
    let start = Instant::now();

    let raw = match tokio::time::timeout(timeout, reader.read(target)).await {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => {
            warn!("Failed to read sensors from {}: {}", target, e);
            return TargetResult::failed(target, start.elapsed(), e.to_string());
        }
        Err(_) => {
            let e = ReadError::Timeout(timeout);
            warn!("Failed to read sensors from {}: {}", target, e);
            return TargetResult::failed(target, start.elapsed(), e.to_string());
        }
    };

    let (samples, stats) = parse_target_output(target, &raw, skip_values);
    debug!(
        "Target {}: {} samples, {} skipped, {} unparsed, {} undefined",
        target,
        samples.len(),
        stats.skipped,
        stats.unparsed,
        stats.undefined
    );

    TargetResult {
        report: TargetReport {
            target: target.to_string(),
            success: true,
            samples: samples.len(),
            duration: start.elapsed(),
            error: None,
        },
        samples,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;
    use std::future::Future;

    const SDR: &str = "CPU1 Temp        | 41.00 degrees C   | ok\n\
                       System Temp      | 30 degrees C      | ok\n\
                       FAN1             | 4560 RPM          | ok\n\
                       FAN2             | no reading        | ns\n\
                       PS1 Status       | 0x01 1            | ok\n\
                       MB 12V           | 12 Volts          | ok\n\
                       Vcore            | 0.98 Volts        | ok\n";

    /// Reader returning canned output per target; unknown targets fail.
    struct ScriptedReader {
        outputs: StdHashMap<String, String>,
    }

    impl SensorReader for ScriptedReader {
        fn read(&self, target: &str) -> impl Future<Output = Result<String, ReadError>> + Send {
            let out = self.outputs.get(target).cloned();
            let target = target.to_string();
            async move {
                out.ok_or_else(|| ReadError::InvalidTarget(target))
            }
        }
    }

    fn config(targets: &[&str]) -> Config {
        Config {
            targets: targets.iter().map(|t| t.to_string()).collect(),
            ..Config::default()
        }
    }

    #[test]
    fn test_parse_target_output() {
        let (samples, stats) = parse_target_output("10.0.0.1", SDR, &["no reading"]);

        let got: Vec<_> = samples
            .iter()
            .map(|s| (s.category, s.sensor.as_str(), s.value))
            .collect();
        assert_eq!(
            got,
            vec![
                (MetricCategory::CpuTemp, "CPU1 Temp", 41.0),
                (MetricCategory::SystemTemp, "System Temp", 30.0),
                (MetricCategory::FanSpeed, "FAN1", 4560.0),
                (MetricCategory::Power, "PS1 Status", 1.0),
            ]
        );
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.undefined, 1);
        assert_eq!(stats.ignored, 1);
        assert_eq!(stats.unparsed, 0);
    }

    #[test]
    fn test_label_is_target_plus_sensor() {
        let (samples, _) = parse_target_output("10.0.0.1", SDR, &["no reading"]);
        assert_eq!(samples[0].label(), "10.0.0.1CPU1 Temp");
    }

    #[test]
    fn test_unparsed_value_is_dropped() {
        let raw = "FAN1 | spinning | ok\nFAN2 | 3000 RPM | ok\n";
        let (samples, stats) = parse_target_output("bmc", raw, &["no reading"]);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].sensor, "FAN2");
        assert_eq!(stats.unparsed, 1);
    }

    #[test]
    fn test_power_status_bytes_are_unparsed_quietly() {
        let raw = "PS1 Status | 0x01 | ok\nFAN1 | spinning | ok\n";
        let (samples, stats) = parse_target_output("bmc", raw, &["no reading"]);
        assert!(samples.is_empty());
        assert_eq!(stats.unparsed, 2);

        assert_eq!(unparsed_log_level(classify("PS1 Status")), Level::DEBUG);
        assert_eq!(unparsed_log_level(classify("FAN1")), Level::WARN);
        assert_eq!(unparsed_log_level(classify("MB 12V")), Level::WARN);
    }

    #[test]
    fn test_duplicate_sensor_keeps_last_value() {
        let raw = "FAN1 | 1000 RPM | ok\nFAN1 | 2000 RPM | ok\n";
        let (samples, _) = parse_target_output("bmc", raw, &["no reading"]);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, 2000.0);
    }

    #[tokio::test]
    async fn test_failed_target_does_not_block_others() {
        let reader = ScriptedReader {
            outputs: [("10.0.0.2".to_string(), SDR.to_string())].into_iter().collect(),
        };
        let collector = Collector::new(reader, &config(&["10.0.0.1", "10.0.0.2"]));

        let collection = collector.collect().await;

        assert_eq!(collection.targets.len(), 2);
        assert!(!collection.targets[0].success);
        assert!(collection.targets[0].error.is_some());
        assert!(collection.targets[1].success);
        assert_eq!(collection.samples.len(), 4);
        assert!(collection.samples.iter().all(|s| s.target == "10.0.0.2"));
    }

    #[tokio::test]
    async fn test_all_categories_reported_even_if_empty() {
        let reader = ScriptedReader {
            outputs: StdHashMap::new(),
        };
        let collector = Collector::new(reader, &config(&["10.0.0.1"]));
        let collection = collector.collect().await;

        let counts = collection.category_counts();
        assert_eq!(counts.len(), 4);
        assert!(counts.iter().all(|(_, n)| *n == 0));
        assert_eq!(collection.failed_targets().count(), 1);
    }
}
