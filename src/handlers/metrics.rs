//! Metrics endpoint handler for Prometheus scraping.
//!
//! Every request runs a full collection pass over all targets and encodes the
//! result together with the exporter's own telemetry. If the client goes away
//! the handler future is dropped, which aborts the pass and its ipmitool runs.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::metrics::{encode_collection, encode_registry};
use crate::reader::SensorReader;
use crate::state::SharedState;

/// Buffer capacity for metrics encoding.
const BUFFER_CAP: usize = 64 * 1024;

/// Error type for metrics endpoint failures.
#[derive(Debug)]
pub enum MetricsError {
    EncodingFailed,
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to encode metrics",
        )
            .into_response()
    }
}

/// Handler for the /metrics endpoint.
#[instrument(skip(state))]
pub async fn metrics_handler<R: SensorReader>(
    State(state): State<SharedState<R>>,
) -> Result<String, MetricsError> {
    let start = Instant::now();
    debug!("Processing /metrics request");
    state.health_stats.record_http_request();

    let collection = state.collector.collect().await;

    state.metrics.observe(&collection);
    state.health_stats.record_pass(&collection);

    let mut buffer = Vec::with_capacity(BUFFER_CAP);
    if let Err(e) = encode_collection(&collection, &mut buffer) {
        error!("Failed to encode sensor metrics: {}", e);
        return Err(MetricsError::EncodingFailed);
    }
    if let Err(e) = encode_registry(&state.registry, &mut buffer) {
        error!("Failed to encode exporter metrics: {}", e);
        return Err(MetricsError::EncodingFailed);
    }

    state.health_stats.record_metrics_endpoint_call();

    debug!(
        "Metrics request completed: {} samples, {} bytes, {:.3}ms",
        collection.samples.len(),
        buffer.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    String::from_utf8(buffer).map_err(|_| MetricsError::EncodingFailed)
}
