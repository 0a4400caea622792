//! Root endpoint handler for the landing page.
//!
//! This module provides the `/` endpoint handler that displays
//! a landing page with all available endpoints and descriptions.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use tracing::{debug, instrument};

use crate::handlers::health::FOOTER_TEXT;
use crate::reader::SensorReader;
use crate::state::SharedState;

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler<R: SensorReader>(
    State(state): State<SharedState<R>>,
) -> impl IntoResponse {
    debug!("Processing / request");
    state.health_stats.record_http_request();

    let version = env!("CARGO_PKG_VERSION");

    // Calculate actual uptime from service start time
    let uptime_secs = state.start_time.elapsed().as_secs();
    let hours = uptime_secs / 3600;
    let minutes = (uptime_secs % 3600) / 60;
    let seconds = uptime_secs % 60;
    let uptime_str = format!("{}h {}m {}s", hours, minutes, seconds);
    let target_count = state.collector.targets().len();
    let health_item = if state.config.enable_health {
        r#"<li>
            <a href="/health">/health</a>
            <div class="endpoint-desc">Exporter health: collection passes, failed targets, parse errors (text)</div>
        </li>"#
    } else {
        ""
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Herakles IPMI Exporter</title>
    <style>
        body {{ font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f2f4f3; }}
        .container {{ max-width: 820px; margin: 0 auto; background: #fff; padding: 32px; border-radius: 6px; }}
        h1 {{ color: #2d3436; border-bottom: 3px solid #d35400; padding-bottom: 12px; }}
        .subtitle {{ color: #636e72; margin-bottom: 24px; }}
        .info {{ display: flex; gap: 32px; background: #ecf0f1; padding: 12px 18px; border-radius: 4px; }}
        .info-label {{ display: block; font-size: 0.85em; font-weight: 600; color: #636e72; }}
        .info-value {{ font-size: 1.15em; color: #d35400; }}
        .endpoint-list {{ list-style: none; padding: 0; }}
        .endpoint-list li {{ margin: 14px 0; padding: 12px; background: #fafafa; border-left: 4px solid #d35400; }}
        .endpoint-list a {{ color: #d35400; font-weight: 600; text-decoration: none; }}
        .endpoint-desc {{ color: #636e72; margin-top: 4px; }}
        .footer {{ margin-top: 32px; border-top: 1px solid #ddd; padding-top: 16px; color: #636e72; font-size: 0.85em; text-align: center; }}
    </style>
</head>
<body>
<div class="container">
    <h1>Herakles IPMI Exporter</h1>
    <p class="subtitle">BMC temperature, fan and power supply sensors collected via ipmitool</p>

    <div class="info">
        <div class="info-item">
            <span class="info-label">Version</span>
            <span class="info-value">{version}</span>
        </div>
        <div class="info-item">
            <span class="info-label">Uptime</span>
            <span class="info-value">{uptime}</span>
        </div>
        <div class="info-item">
            <span class="info-label">Targets</span>
            <span class="info-value">{targets}</span>
        </div>
    </div>

    <h2>Available Endpoints</h2>
    <ul class="endpoint-list">
        <li>
            <a href="/metrics">/metrics</a>
            <div class="endpoint-desc">Prometheus metrics; every request queries all BMC targets</div>
        </li>
        {health_item}
        <li>
            <a href="/config">/config</a>
            <div class="endpoint-desc">Active runtime configuration, password redacted (text)</div>
        </li>
    </ul>

    <div class="footer">
        <p>{footer}</p>
    </div>
</div>
</body>
</html>"#,
        version = version,
        uptime = uptime_str,
        targets = target_count,
        health_item = health_item,
        footer = FOOTER_TEXT
    );

    Html(html)
}
