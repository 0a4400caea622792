//! Sensor reader invoking `ipmitool sdr` against one BMC.
//!
//! The [`SensorReader`] trait is the seam between collection logic and the
//! external tool; tests plug in scripted readers instead of spawning processes.

use std::future::Future;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::Config;

/// Sub-command requesting the sensor data repository listing.
pub const SDR_SUBCOMMAND: &str = "sdr";

/// Errors from a single reader invocation.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("invalid target address: {0:?}")]
    InvalidTarget(String),

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    ExitStatus {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Source of raw SDR text for a target.
pub trait SensorReader: Send + Sync + 'static {
    /// Returns the complete stdout of one SDR query against `target`.
    fn read(&self, target: &str) -> impl Future<Output = Result<String, ReadError>> + Send;
}

/// Credentials and tool location used by [`IpmitoolReader`].
#[derive(Debug, Clone)]
pub struct IpmitoolReader {
    pub program: String,
    pub user: String,
    pub password: String,
    pub privilege: String,
}

impl IpmitoolReader {
    pub fn from_config(config: &Config) -> Self {
        Self {
            program: config.ipmitool_path.clone(),
            user: config.ipmi_user.clone(),
            password: config.ipmi_password.clone(),
            privilege: config.ipmi_privilege.to_ascii_uppercase(),
        }
    }

    /// Arguments passed to the tool for `target`.
    pub fn args<'a>(&'a self, target: &'a str) -> [&'a str; 9] {
        [
            "-H",
            target,
            "-U",
            self.user.as_str(),
            "-P",
            self.password.as_str(),
            "-L",
            self.privilege.as_str(),
            SDR_SUBCOMMAND,
        ]
    }
}

impl SensorReader for IpmitoolReader {
    async fn read(&self, target: &str) -> Result<String, ReadError> {
        if target.trim().is_empty() {
            return Err(ReadError::InvalidTarget(target.to_string()));
        }

        info!("Collecting from target {}", target);

        // kill_on_drop: an abandoned scrape must not leave ipmitool running.
        let output = Command::new(&self.program)
            .args(self.args(target))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ReadError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ReadError::ExitStatus {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(
            "Read {} bytes of SDR output from {}",
            output.stdout.len(),
            target
        );
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
