//! Configuration management for herakles-ipmi-exporter.
//!
//! This module handles loading, merging, and validating configuration from files,
//! environment variables and CLI arguments. Files may be YAML, JSON, or TOML.
//!
//! Precedence: CLI > environment > config file > defaults.

use crate::cli::{Args, ConfigFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8001;
pub const DEFAULT_IPMI_USER: &str = "ADMIN";
pub const DEFAULT_IPMI_PASSWORD: &str = "ADMIN";
pub const DEFAULT_IPMI_PRIVILEGE: &str = "USER";
pub const DEFAULT_IPMITOOL_PATH: &str = "ipmitool";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PARALLELISM: usize = 4;

/// Environment variables understood by the exporter.
pub const ENV_TARGET_IPS: &str = "TARGET_IPS";
pub const ENV_IPMI_USER: &str = "IPMI_USER";
pub const ENV_IPMI_PASSWD: &str = "IPMI_PASSWD";
pub const ENV_IPMI_PRIV: &str = "IPMI_PRIV";

/// Privilege levels accepted by `ipmitool -L`.
pub const PRIVILEGE_LEVELS: &[&str] = &["CALLBACK", "USER", "OPERATOR", "ADMINISTRATOR"];

/// Placeholder shown instead of the BMC password.
pub const REDACTED: &str = "<redacted>";

fn default_bind() -> String {
    DEFAULT_BIND_ADDR.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_ipmi_user() -> String {
    DEFAULT_IPMI_USER.to_string()
}
fn default_ipmi_password() -> String {
    DEFAULT_IPMI_PASSWORD.to_string()
}
fn default_ipmi_privilege() -> String {
    DEFAULT_IPMI_PRIVILEGE.to_string()
}
fn default_ipmitool_path() -> String {
    DEFAULT_IPMITOOL_PATH.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_parallelism() -> usize {
    DEFAULT_PARALLELISM
}
fn default_skip_values() -> Vec<String> {
    crate::sdr::DEFAULT_SKIP_VALUES
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_true() -> bool {
    true
}

/// Effective exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,

    // Targets and credentials
    /// BMC addresses to poll, in collection order.
    #[serde(default, alias = "target-ips")]
    pub targets: Vec<String>,
    #[serde(default = "default_ipmi_user", alias = "ipmi-user")]
    pub ipmi_user: String,
    #[serde(default = "default_ipmi_password", alias = "ipmi-password")]
    pub ipmi_password: String,
    #[serde(default = "default_ipmi_privilege", alias = "ipmi-privilege")]
    pub ipmi_privilege: String,
    #[serde(default = "default_ipmitool_path", alias = "ipmitool-path")]
    pub ipmitool_path: String,

    // Collection
    /// Upper bound for one target's ipmitool run.
    #[serde(default = "default_timeout_secs", alias = "timeout-secs")]
    pub timeout_secs: u64,
    /// Maximum number of concurrent ipmitool processes per scrape.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Value tokens treated as "no reading".
    #[serde(default = "default_skip_values", alias = "skip-values")]
    pub skip_values: Vec<String>,

    // Feature flags
    #[serde(default = "default_true", alias = "enable-health")]
    pub enable_health: bool,

    // TLS/SSL Configuration
    #[serde(default, alias = "enable-tls")]
    pub enable_tls: bool,
    #[serde(default, alias = "tls-cert-path")]
    pub tls_cert_path: Option<String>,
    #[serde(default, alias = "tls-key-path")]
    pub tls_key_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: default_bind(),
            targets: Vec::new(),
            ipmi_user: default_ipmi_user(),
            ipmi_password: default_ipmi_password(),
            ipmi_privilege: default_ipmi_privilege(),
            ipmitool_path: default_ipmitool_path(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            parallelism: DEFAULT_PARALLELISM,
            skip_values: default_skip_values(),
            enable_health: true,
            enable_tls: false,
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Config {
    /// Copy of the configuration that is safe to print or serve.
    pub fn redacted(&self) -> Config {
        Config {
            ipmi_password: REDACTED.to_string(),
            ..self.clone()
        }
    }
}

/// Splits a comma-separated target list, trimming entries and dropping empties.
pub fn parse_target_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if cfg.targets.is_empty() {
        return Err(format!(
            "No targets configured: set {} (comma-separated), --targets or `targets` in the config file",
            ENV_TARGET_IPS
        )
        .into());
    }

    if let Some(pos) = cfg.targets.iter().position(|t| t.trim().is_empty()) {
        return Err(format!("Target #{} is empty", pos + 1).into());
    }

    if !PRIVILEGE_LEVELS
        .iter()
        .any(|p| p.eq_ignore_ascii_case(&cfg.ipmi_privilege))
    {
        return Err(format!(
            "Invalid ipmi_privilege '{}', expected one of {}",
            cfg.ipmi_privilege,
            PRIVILEGE_LEVELS.join(", ")
        )
        .into());
    }

    if cfg.bind.parse::<std::net::IpAddr>().is_err() {
        return Err(format!("Invalid bind address '{}'", cfg.bind).into());
    }

    if cfg.ipmitool_path.trim().is_empty() {
        return Err("ipmitool_path must not be empty".into());
    }
    if cfg.timeout_secs == 0 {
        return Err("timeout_secs must be greater than 0".into());
    }
    if cfg.parallelism == 0 {
        return Err("parallelism must be greater than 0".into());
    }

    // TLS validation
    if cfg.enable_tls {
        let cert_path = cfg.tls_cert_path.as_deref();
        let key_path = cfg.tls_key_path.as_deref();

        match (cert_path, key_path) {
            (None, None) => {
                return Err(
                    "TLS is enabled but neither tls_cert_path nor tls_key_path are set".into(),
                );
            }
            (Some(_), None) => {
                return Err("TLS is enabled but tls_key_path is not set".into());
            }
            (None, Some(_)) => {
                return Err("TLS is enabled but tls_cert_path is not set".into());
            }
            (Some(cert), Some(key)) => {
                check_pem_file(cert, "certificate")?;
                check_pem_file(key, "private key")?;
            }
        }
    }

    Ok(())
}

fn check_pem_file(path: &str, what: &str) -> Result<(), Box<dyn std::error::Error>> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(format!("TLS {} file not found: {}", what, path).into());
    }
    match fs::metadata(p) {
        Ok(meta) if meta.len() == 0 => Err(format!("TLS {} file is empty: {}", what, path).into()),
        Err(e) => Err(format!("TLS {} file is not readable: {} ({})", what, path, e).into()),
        Ok(_) => Ok(()),
    }
}

/// Overlays the `TARGET_IPS` and `IPMI_*` environment variables onto `config`.
///
/// `lookup` abstracts `std::env::var` so the overlay can be exercised in tests.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(ips) = lookup(ENV_TARGET_IPS) {
        config.targets = parse_target_list(&ips);
    }
    if let Some(user) = lookup(ENV_IPMI_USER) {
        config.ipmi_user = user;
    }
    if let Some(passwd) = lookup(ENV_IPMI_PASSWD) {
        config.ipmi_password = passwd;
    }
    if let Some(privilege) = lookup(ENV_IPMI_PRIV) {
        config.ipmi_privilege = privilege;
    }
}

/// Overlays CLI arguments onto `config`. Only flags the user supplied win.
pub fn apply_cli_overrides(config: &mut Config, args: &Args) {
    if let Some(bind_ip) = args.bind {
        config.bind = bind_ip.to_string();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(targets) = &args.targets {
        config.targets = parse_target_list(targets);
    }
    if let Some(user) = &args.ipmi_user {
        config.ipmi_user = user.clone();
    }
    if let Some(password) = &args.ipmi_password {
        config.ipmi_password = password.clone();
    }
    if let Some(privilege) = &args.ipmi_privilege {
        config.ipmi_privilege = privilege.clone();
    }
    if let Some(path) = &args.ipmitool_path {
        config.ipmitool_path = path.clone();
    }
    if let Some(timeout) = args.timeout_secs {
        config.timeout_secs = timeout;
    }
    if let Some(parallelism) = args.parallelism {
        config.parallelism = parallelism;
    }

    // Feature flags
    if args.disable_health {
        config.enable_health = false;
    }

    // TLS configuration: CLI wins if provided
    if args.enable_tls {
        config.enable_tls = true;
    }
    if let Some(cert_path) = &args.tls_cert {
        config.tls_cert_path = Some(cert_path.to_string_lossy().to_string());
    }
    if let Some(key_path) = &args.tls_key {
        config.tls_key_path = Some(key_path.to_string_lossy().to_string());
    }
}

/// Resolves configuration from CLI args, environment, config file, and defaults.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref().and_then(|p| p.to_str()))?
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    apply_cli_overrides(&mut config, args);

    Ok(config)
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&str>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = if let Some(p) = path {
        PathBuf::from(p)
    } else {
        // Try default locations
        let defaults = [
            "/etc/herakles/ipmi-exporter.yaml",
            "/etc/herakles/ipmi-exporter.yml",
            "/etc/herakles/ipmi-exporter.json",
            "./herakles-ipmi-exporter.yaml",
            "./herakles-ipmi-exporter.yml",
            "./herakles-ipmi-exporter.json",
        ];

        defaults
            .iter()
            .find(|p| Path::new(p).exists())
            .map(PathBuf::from)
            .unwrap_or_default()
    };

    if path.as_os_str().is_empty() || !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Renders configuration in the requested format.
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows the effective configuration (password redacted).
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    let output = render_config(&config.redacted(), &format)?;
    println!("{output}");
    Ok(())
}
