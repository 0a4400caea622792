//! Configuration display endpoint handler.
//!
//! This module provides the `/config` endpoint handler that displays
//! the current exporter configuration. The BMC password is never shown.

use axum::{extract::State, response::IntoResponse};
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::config::{Config, REDACTED};
use crate::handlers::health::FOOTER_TEXT;
use crate::reader::SensorReader;
use crate::state::SharedState;

/// Handler for the /config endpoint.
#[instrument(skip(state))]
pub async fn config_handler<R: SensorReader>(
    State(state): State<SharedState<R>>,
) -> impl IntoResponse {
    debug!("Processing /config request");
    state.health_stats.record_http_request();

    (
        [("Content-Type", "text/plain; charset=utf-8")],
        render_config_text(&state.config),
    )
}

/// Renders the configuration as a plain-text report.
pub fn render_config_text(cfg: &Config) -> String {
    let mut out = String::new();

    writeln!(out, "HERAKLES IPMI EXPORTER - CONFIGURATION").ok();
    writeln!(out, "======================================").ok();
    writeln!(out).ok();

    writeln!(out, "SERVER CONFIGURATION").ok();
    writeln!(out, "--------------------").ok();
    writeln!(out, "bind:                       {}", cfg.bind).ok();
    writeln!(out, "port:                       {}", cfg.port).ok();
    writeln!(out, "enable_health:              {}", cfg.enable_health).ok();
    writeln!(out).ok();

    writeln!(out, "TARGETS").ok();
    writeln!(out, "-------").ok();
    for target in &cfg.targets {
        writeln!(out, "  - {}", target).ok();
    }
    writeln!(out).ok();

    writeln!(out, "IPMITOOL").ok();
    writeln!(out, "--------").ok();
    writeln!(out, "ipmitool_path:              {}", cfg.ipmitool_path).ok();
    writeln!(out, "ipmi_user:                  {}", cfg.ipmi_user).ok();
    writeln!(out, "ipmi_password:              {}", REDACTED).ok();
    writeln!(out, "ipmi_privilege:             {}", cfg.ipmi_privilege).ok();
    writeln!(out, "timeout_secs:               {}", cfg.timeout_secs).ok();
    writeln!(out, "parallelism:                {}", cfg.parallelism).ok();
    writeln!(out, "skip_values:                {:?}", cfg.skip_values).ok();
    writeln!(out).ok();

    writeln!(out, "TLS/SSL CONFIGURATION").ok();
    writeln!(out, "---------------------").ok();
    writeln!(out, "enable_tls:                 {}", cfg.enable_tls).ok();
    writeln!(
        out,
        "tls_cert_path:              {}",
        cfg.tls_cert_path.as_deref().unwrap_or("-")
    )
    .ok();
    writeln!(
        out,
        "tls_key_path:               {}",
        cfg.tls_key_path.as_deref().unwrap_or("-")
    )
    .ok();
    writeln!(out).ok();

    writeln!(out, "{}", FOOTER_TEXT).ok();
    out
}
