//! Health check endpoint handler.
//!
//! This module provides the `/health` endpoint handler that returns
//! exporter health statistics as plain text.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::{debug, instrument};

use crate::reader::SensorReader;
use crate::state::SharedState;

// Time conversion constants
const SECONDS_PER_HOUR: f64 = 3600.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Footer text for human-readable HTTP endpoints.
pub const FOOTER_TEXT: &str = "Project: https://github.com/cansp-dev/herakles-ipmi-exporter — More info: https://www.herakles.now — Support: exporter@herakles.now";

/// Handler for the /health endpoint.
///
/// Answers 503 only when the most recent pass got no data from any target.
#[instrument(skip(state))]
pub async fn health_handler<R: SensorReader>(
    State(state): State<SharedState<R>>,
) -> impl IntoResponse {
    debug!("Processing /health request");
    state.health_stats.record_http_request();

    let passes = state
        .health_stats
        .total_passes
        .load(std::sync::atomic::Ordering::Relaxed);
    let target_count = state.collector.targets().len();

    let (status, message) = if passes == 0 {
        (StatusCode::OK, "OK - No scrape yet")
    } else if state.health_stats.last_pass_had_data(target_count) {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "All targets failed in last scrape")
    };

    let uptime_seconds = state.health_stats.get_uptime_seconds();
    let uptime_str = format_uptime(uptime_seconds);
    let table = state.health_stats.render_table();

    debug!("Health check: {} - {}", status, message);
    (
        status,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!(
            "{message}\n\nUptime: {uptime_str}\nTargets: {target_count}\n\n{table}\n{FOOTER_TEXT}"
        ),
    )
}

fn format_uptime(uptime_seconds: u64) -> String {
    let uptime_hours = uptime_seconds as f64 / SECONDS_PER_HOUR;
    if uptime_hours < 1.0 {
        format!("{:.1} minutes", uptime_hours * MINUTES_PER_HOUR)
    } else if uptime_hours < HOURS_PER_DAY {
        format!("{:.1} hours", uptime_hours)
    } else {
        format!("{:.1} days", uptime_hours / HOURS_PER_DAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(90), "1.5 minutes");
        assert_eq!(format_uptime(7200), "2.0 hours");
        assert_eq!(format_uptime(3 * 86400), "3.0 days");
    }
}
