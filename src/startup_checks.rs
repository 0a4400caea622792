//! Startup requirement validation for herakles-ipmi-exporter.
//!
//! This module validates that the ipmitool binary can be executed and that
//! the target list looks sane before the server starts answering scrapes.

use std::collections::HashSet;
use std::process::{Command, Stdio};
use tracing::{error, info, warn};

use crate::config::Config;

/// Validate all runtime requirements
pub fn validate_requirements(config: &Config) -> Result<(), ValidationError> {
    info!("🔍 Validating runtime requirements...");

    check_ipmitool(&config.ipmitool_path)?;
    check_targets(&config.targets);

    info!("✅ All runtime requirements validated");
    Ok(())
}

/// Runs `<program> -V` and returns the reported version line.
pub fn check_ipmitool(program: &str) -> Result<String, ValidationError> {
    let output = Command::new(program)
        .arg("-V")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            error!("❌ Cannot execute {}: {}", program, e);
            error!("   Install ipmitool (e.g. apt install ipmitool) or set ipmitool_path");
            ValidationError::IpmitoolNotExecutable {
                program: program.to_string(),
                reason: e.to_string(),
            }
        })?;

    if !output.status.success() {
        error!("❌ {} -V exited with {}", program, output.status);
        return Err(ValidationError::IpmitoolNotExecutable {
            program: program.to_string(),
            reason: format!("exited with {}", output.status),
        });
    }

    // Older releases print the version on stderr.
    let text = if output.stdout.is_empty() {
        String::from_utf8_lossy(&output.stderr)
    } else {
        String::from_utf8_lossy(&output.stdout)
    };
    let version = text.lines().next().unwrap_or("unknown").trim().to_string();
    info!("✅ ipmitool available: {}", version);
    Ok(version)
}

/// Warns about duplicated targets; they are queried once per occurrence.
fn check_targets(targets: &[String]) {
    let mut seen = HashSet::new();
    for target in targets {
        if !seen.insert(target.as_str()) {
            warn!("⚠️  Target {} is listed more than once", target);
        }
    }
    info!("✅ {} target(s) configured", targets.len());
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("ipmitool not executable ({program}): {reason}")]
    IpmitoolNotExecutable { program: String, reason: String },
}
