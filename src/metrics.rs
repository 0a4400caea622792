//! Prometheus metrics definitions for herakles-ipmi-exporter.
//!
//! Sensor families are rebuilt into a fresh [`Registry`] on every scrape, so a
//! pass never sees samples of another pass. The exporter's own telemetry lives
//! in a long-lived registry owned by the application state.

use prometheus::{
    Counter, Encoder, GaugeVec, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};
use std::fmt::Write as FmtWrite;

use crate::classifier::MetricCategory;
use crate::collector::MetricCollection;

/// Label carrying target address + sensor name.
pub const SENSOR_LABEL: &str = "ip";

/// Exporter self-monitoring metrics, registered once at startup.
#[derive(Clone)]
pub struct ExporterMetrics {
    pub request_processing_seconds: Histogram,
    pub scrapes_total: Counter,
    pub target_failures_total: Counter,
    pub unparsed_values_total: Counter,
    pub undefined_metrics_total: Counter,
}

impl ExporterMetrics {
    /// Creates and registers the exporter metrics with the registry.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let request_processing_seconds = Histogram::with_opts(HistogramOpts::new(
            "ipmi_request_processing_seconds",
            "Time spent processing request",
        ))?;
        let scrapes_total = Counter::new(
            "ipmi_scrapes_total",
            "Number of collection passes performed",
        )?;
        let target_failures_total = Counter::new(
            "ipmi_target_failures_total",
            "Number of failed ipmitool invocations (spawn error, non-zero exit, timeout)",
        )?;
        let unparsed_values_total = Counter::new(
            "ipmi_unparsed_values_total",
            "Number of sensor values that could not be parsed",
        )?;
        let undefined_metrics_total = Counter::new(
            "ipmi_undefined_metrics_total",
            "Number of interesting sensors that matched no metric category",
        )?;

        registry.register(Box::new(request_processing_seconds.clone()))?;
        registry.register(Box::new(scrapes_total.clone()))?;
        registry.register(Box::new(target_failures_total.clone()))?;
        registry.register(Box::new(unparsed_values_total.clone()))?;
        registry.register(Box::new(undefined_metrics_total.clone()))?;

        Ok(Self {
            request_processing_seconds,
            scrapes_total,
            target_failures_total,
            unparsed_values_total,
            undefined_metrics_total,
        })
    }

    /// Accounts one finished collection pass.
    pub fn observe(&self, collection: &MetricCollection) {
        self.scrapes_total.inc();
        self.request_processing_seconds
            .observe(collection.duration.as_secs_f64());
        self.target_failures_total
            .inc_by(collection.failed_targets().count() as f64);
        self.unparsed_values_total
            .inc_by(collection.stats.unparsed as f64);
        self.undefined_metrics_total
            .inc_by(collection.stats.undefined as f64);
    }
}

/// Gauge families of one collection pass.
pub struct SensorMetrics {
    pub cpu_temp: GaugeVec,
    pub system_temp: GaugeVec,
    pub fan_speed: GaugeVec,
    pub power: GaugeVec,
    pub target_up: GaugeVec,
    pub target_collect_duration_seconds: GaugeVec,
}

impl SensorMetrics {
    /// Creates and registers the per-pass families with `registry`.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let family = |category: MetricCategory| -> Result<GaugeVec, prometheus::Error> {
            let gauge = GaugeVec::new(
                Opts::new(category.metric_name(), category.help()),
                &[SENSOR_LABEL],
            )?;
            registry.register(Box::new(gauge.clone()))?;
            Ok(gauge)
        };

        let cpu_temp = family(MetricCategory::CpuTemp)?;
        let system_temp = family(MetricCategory::SystemTemp)?;
        let fan_speed = family(MetricCategory::FanSpeed)?;
        let power = family(MetricCategory::Power)?;

        let target_up = GaugeVec::new(
            Opts::new(
                "ipmi_target_up",
                "Whether the last ipmitool run against the target succeeded (1) or failed (0)",
            ),
            &["target"],
        )?;
        let target_collect_duration_seconds = GaugeVec::new(
            Opts::new(
                "ipmi_target_collect_duration_seconds",
                "Time spent reading and parsing one target",
            ),
            &["target"],
        )?;
        registry.register(Box::new(target_up.clone()))?;
        registry.register(Box::new(target_collect_duration_seconds.clone()))?;

        Ok(Self {
            cpu_temp,
            system_temp,
            fan_speed,
            power,
            target_up,
            target_collect_duration_seconds,
        })
    }

    pub fn family(&self, category: MetricCategory) -> &GaugeVec {
        match category {
            MetricCategory::CpuTemp => &self.cpu_temp,
            MetricCategory::SystemTemp => &self.system_temp,
            MetricCategory::FanSpeed => &self.fan_speed,
            MetricCategory::Power => &self.power,
        }
    }

    /// Populates all families from a collection.
    pub fn record(&self, collection: &MetricCollection) {
        for sample in &collection.samples {
            self.family(sample.category)
                .with_label_values(&[sample.label().as_str()])
                .set(sample.value);
        }

        for report in &collection.targets {
            self.target_up
                .with_label_values(&[report.target.as_str()])
                .set(if report.success { 1.0 } else { 0.0 });
            self.target_collect_duration_seconds
                .with_label_values(&[report.target.as_str()])
                .set(report.duration.as_secs_f64());
        }
    }
}

/// Encodes a collection as Prometheus text.
///
/// The text encoder drops families without samples, so empty sensor families
/// are written as bare HELP/TYPE headers to keep all four visible.
pub fn encode_collection(
    collection: &MetricCollection,
    out: &mut Vec<u8>,
) -> Result<(), prometheus::Error> {
    let registry = Registry::new();
    let metrics = SensorMetrics::new(&registry)?;
    metrics.record(collection);

    TextEncoder::new().encode(&registry.gather(), out)?;

    let mut headers = String::new();
    for (category, count) in collection.category_counts() {
        if count == 0 {
            writeln!(headers, "# HELP {} {}", category.metric_name(), category.help()).ok();
            writeln!(headers, "# TYPE {} gauge", category.metric_name()).ok();
        }
    }
    out.extend_from_slice(headers.as_bytes());
    Ok(())
}

/// Encodes every family of `registry` as Prometheus text.
pub fn encode_registry(registry: &Registry, out: &mut Vec<u8>) -> Result<(), prometheus::Error> {
    TextEncoder::new().encode(&registry.gather(), out)
}
