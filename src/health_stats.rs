//! Health statistics and monitoring for the exporter.
//!
//! This module provides types and functionality for tracking exporter health,
//! including collection pass performance, per-target failures, and HTTP request counts.

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock as StdRwLock};
use std::time::Instant;

use crate::collector::MetricCollection;

/// Running statistics for a single metric.
#[derive(Clone, Copy, Default)]
pub struct RunningStat {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl RunningStat {
    pub fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
            self.last = value;
            self.sum = value;
            self.count = 1;
            return;
        }
        self.count += 1;
        self.sum += value;
        self.last = value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / (self.count as f64)
        }
    }
}

/// Thread-safe wrapper for running statistics.
#[derive(Default)]
pub struct Stat {
    inner: Mutex<RunningStat>,
}

impl Stat {
    pub fn add_sample(&self, value: f64) {
        if let Ok(mut s) = self.inner.lock() {
            s.add(value);
        }
    }

    /// Returns (last, avg, max, min, count).
    pub fn snapshot(&self) -> (f64, f64, f64, f64, u64) {
        if let Ok(s) = self.inner.lock() {
            (s.last, s.avg(), s.max, s.min, s.count)
        } else {
            (0.0, 0.0, 0.0, 0.0, 0)
        }
    }
}

/// Thread-safe circular buffer for tracking HTTP request timestamps.
pub struct RequestTimestamps {
    inner: Mutex<VecDeque<Instant>>,
}

impl Default for RequestTimestamps {
    fn default() -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(256)),
        }
    }
}

impl RequestTimestamps {
    pub fn record(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            let now = Instant::now();
            guard.push_back(now);
            // Keep only the last 10 minutes
            while guard
                .front()
                .is_some_and(|&t| now.duration_since(t).as_secs() > 600)
            {
                guard.pop_front();
            }
        }
    }

    pub fn count_last_minute(&self) -> u64 {
        if let Ok(guard) = self.inner.lock() {
            let now = Instant::now();
            guard
                .iter()
                .filter(|&&t| now.duration_since(t).as_secs() < 60)
                .count() as u64
        } else {
            0
        }
    }
}

/// Health statistics of the exporter.
pub struct HealthStats {
    // Collection passes
    pub pass_duration_seconds: Stat,
    pub samples_per_pass: Stat,
    pub total_passes: AtomicU64,

    // Error tracking
    pub target_failures: AtomicU64,
    pub unparsed_values: AtomicU64,
    pub undefined_metrics: AtomicU64,
    pub skipped_readings: AtomicU64,

    // HTTP server stats
    pub http_request_timestamps: RequestTimestamps,
    pub metrics_endpoint_calls: AtomicU64,

    // Timing
    pub start_time: Instant,
    pub last_pass: StdRwLock<Option<DateTime<Local>>>,
    /// Targets that failed in the most recent pass, with their error text.
    pub last_failed_targets: StdRwLock<Vec<(String, String)>>,
}

impl Default for HealthStats {
    fn default() -> Self {
        Self {
            pass_duration_seconds: Stat::default(),
            samples_per_pass: Stat::default(),
            total_passes: AtomicU64::new(0),
            target_failures: AtomicU64::new(0),
            unparsed_values: AtomicU64::new(0),
            undefined_metrics: AtomicU64::new(0),
            skipped_readings: AtomicU64::new(0),
            http_request_timestamps: RequestTimestamps::default(),
            metrics_endpoint_calls: AtomicU64::new(0),
            start_time: Instant::now(),
            last_pass: StdRwLock::new(None),
            last_failed_targets: StdRwLock::new(Vec::new()),
        }
    }
}

impl HealthStats {
    pub fn new() -> Self {
        Default::default()
    }

    /// Records the outcome of one collection pass.
    pub fn record_pass(&self, collection: &MetricCollection) {
        self.pass_duration_seconds
            .add_sample(collection.duration.as_secs_f64());
        self.samples_per_pass
            .add_sample(collection.samples.len() as f64);
        self.total_passes.fetch_add(1, Ordering::Relaxed);

        let failed: Vec<(String, String)> = collection
            .failed_targets()
            .map(|t| (t.target.clone(), t.error.clone().unwrap_or_default()))
            .collect();
        self.target_failures
            .fetch_add(failed.len() as u64, Ordering::Relaxed);
        self.unparsed_values
            .fetch_add(collection.stats.unparsed, Ordering::Relaxed);
        self.undefined_metrics
            .fetch_add(collection.stats.undefined, Ordering::Relaxed);
        self.skipped_readings
            .fetch_add(collection.stats.skipped, Ordering::Relaxed);

        if let Ok(mut guard) = self.last_failed_targets.write() {
            *guard = failed;
        }
        if let Ok(mut guard) = self.last_pass.write() {
            *guard = Some(Local::now());
        }
    }

    pub fn record_http_request(&self) {
        self.http_request_timestamps.record();
    }

    pub fn record_metrics_endpoint_call(&self) {
        self.metrics_endpoint_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// True once a pass ran and at least one target answered in it.
    pub fn last_pass_had_data(&self, target_count: usize) -> bool {
        let ran = self.last_pass.read().map(|g| g.is_some()).unwrap_or(false);
        let failed = self
            .last_failed_targets
            .read()
            .map(|g| g.len())
            .unwrap_or(0);
        ran && failed < target_count
    }

    fn get_last_pass_str(&self) -> String {
        match self.last_pass.read() {
            Ok(guard) => guard
                .as_ref()
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "never".to_string()),
            Err(_) => "unknown".to_string(),
        }
    }

    /// Renders the statistics as a plain-text table.
    pub fn render_table(&self) -> String {
        let (pd_cur, pd_avg, pd_max, pd_min, _) = self.pass_duration_seconds.snapshot();
        let (sp_cur, sp_avg, sp_max, sp_min, _) = self.samples_per_pass.snapshot();

        let left_col = 26usize;
        let col_w = 12usize;

        let mut out = String::new();

        writeln!(out, "HEALTH ENDPOINT - EXPORTER INTERNAL STATS").ok();
        writeln!(out, "==========================================").ok();
        writeln!(out).ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "",
            "current",
            "average",
            "max",
            "min",
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(out).ok();
        writeln!(out, "COLLECTION PASSES").ok();
        writeln!(out, "-----------------").ok();
        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "pass_duration_seconds",
            format!("{:.3}", pd_cur),
            format!("{:.3}", pd_avg),
            format!("{:.3}", pd_max),
            format!("{:.3}", pd_min),
            left = left_col,
            col = col_w
        )
        .ok();
        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "samples_per_pass",
            format!("{:.0}", sp_cur),
            format!("{:.1}", sp_avg),
            format!("{:.0}", sp_max),
            format!("{:.0}", sp_min),
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(out).ok();
        writeln!(out, "COUNTERS").ok();
        writeln!(out, "--------").ok();
        let counters = [
            ("total_passes", self.total_passes.load(Ordering::Relaxed)),
            ("target_failures", self.target_failures.load(Ordering::Relaxed)),
            ("unparsed_values", self.unparsed_values.load(Ordering::Relaxed)),
            ("undefined_metrics", self.undefined_metrics.load(Ordering::Relaxed)),
            ("skipped_readings", self.skipped_readings.load(Ordering::Relaxed)),
            (
                "metrics_endpoint_calls",
                self.metrics_endpoint_calls.load(Ordering::Relaxed),
            ),
            (
                "http_requests_last_minute",
                self.http_request_timestamps.count_last_minute(),
            ),
        ];
        for (name, value) in counters {
            writeln!(out, "{:left$} | {:>col$}", name, value, left = left_col, col = col_w).ok();
        }

        writeln!(out).ok();
        writeln!(out, "Last pass: {}", self.get_last_pass_str()).ok();

        if let Ok(failed) = self.last_failed_targets.read() {
            if !failed.is_empty() {
                writeln!(out).ok();
                writeln!(out, "FAILED TARGETS (last pass)").ok();
                writeln!(out, "--------------------------").ok();
                for (target, error) in failed.iter() {
                    writeln!(out, "{:left$} | {}", target, error, left = left_col).ok();
                }
            }
        }

        out
    }
}
