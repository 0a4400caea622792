//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers. It holds no sensor data: every scrape collects anew.

use prometheus::Registry;
use std::sync::Arc;
use std::time::Instant;

use crate::collector::Collector;
use crate::config::Config;
use crate::health_stats::HealthStats;
use crate::metrics::ExporterMetrics;
use crate::reader::{IpmitoolReader, SensorReader};

/// Type alias for shared application state.
pub type SharedState<R = IpmitoolReader> = Arc<AppState<R>>;

/// Global application state shared across requests.
pub struct AppState<R: SensorReader = IpmitoolReader> {
    /// Registry for the exporter's own telemetry.
    pub registry: Registry,
    pub metrics: ExporterMetrics,
    pub collector: Collector<R>,
    pub config: Arc<Config>,
    pub health_stats: Arc<HealthStats>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl<R: SensorReader> AppState<R> {
    /// Builds the state around `reader`, registering exporter telemetry.
    pub fn new(config: Config, reader: R) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let metrics = ExporterMetrics::new(&registry)?;
        let collector = Collector::new(reader, &config);

        Ok(Self {
            registry,
            metrics,
            collector,
            config: Arc::new(config),
            health_stats: Arc::new(HealthStats::new()),
            start_time: Instant::now(),
        })
    }
}
