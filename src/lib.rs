//! Herakles IPMI Exporter Library
//!
//! This library turns `ipmitool sdr` output from one or more BMCs into
//! Prometheus gauges. It is used by the `herakles-ipmi-exporter` binary and
//! can be embedded elsewhere by supplying a custom [`SensorReader`].
//!
//! # Features
//!
//! - **SDR Parsing**: Pipe-delimited sensor listings are paired into name/value readings
//! - **Classification**: Interesting sensors are sorted into four metric families
//! - **Concurrent Collection**: Targets are queried in parallel with a per-target timeout
//! - **Fresh Exposition**: Every scrape reflects only the current pass
//!
//! # Usage
//!
//! ```rust
//! use herakles_ipmi_exporter::{parse_target_output, MetricCategory};
//!
//! let raw = "CPU1 Temp | 41.00 degrees C | ok\nFAN1 | 4560 RPM | ok\n";
//! let (samples, _stats) = parse_target_output("10.0.0.1", raw, &["no reading"]);
//!
//! assert_eq!(samples.len(), 2);
//! assert_eq!(samples[0].category, MetricCategory::CpuTemp);
//! assert_eq!(samples[1].value, 4560.0);
//! ```

pub mod classifier;
pub mod cli;
pub mod collector;
pub mod commands;
pub mod config;
pub mod handlers;
pub mod health_stats;
pub mod metrics;
pub mod reader;
pub mod sdr;
pub mod startup_checks;
pub mod state;

// Re-export main types for convenience
pub use classifier::{classify, Classification, MetricCategory};
pub use collector::{parse_target_output, Collector, MetricCollection, MetricSample, ParseStats};
pub use config::Config;
pub use reader::{IpmitoolReader, ReadError, SensorReader};
pub use sdr::{extract_value, pair_readings, RawReading, SensorValue};
pub use state::{AppState, SharedState};
