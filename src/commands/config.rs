//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = output.unwrap_or_else(|| PathBuf::from("herakles-ipmi-exporter.yaml"));

    let mut content = render_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
pub fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Herakles IPMI Exporter Configuration
# ====================================
#
# Server Configuration
# --------------------
# bind: "0.0.0.0"              # Bind IP (0.0.0.0 = all interfaces)
# port: 8001                   # HTTP port
# enable_health: true          # Enable /health endpoint
#
# Targets
# -------
# targets:                     # BMC addresses queried on every scrape
#   - "10.0.0.10"              # (env: TARGET_IPS, comma separated)
#   - "10.0.0.11"
#
# ipmitool
# --------
# ipmitool_path: "ipmitool"    # Binary name or absolute path
# ipmi_user: "ADMIN"           # env: IPMI_USER
# ipmi_password: "ADMIN"       # env: IPMI_PASSWD
# ipmi_privilege: "USER"       # CALLBACK, USER, OPERATOR, ADMINISTRATOR (env: IPMI_PRIV)
# timeout_secs: 10             # Per-target deadline for one sdr query
# parallelism: 4               # Targets queried concurrently
# skip_values:                 # Readings treated as "sensor has no value"
#   - "no reading"
#
# TLS/SSL Configuration
# ---------------------
# enable_tls: false            # Enable HTTPS (default: false)
# tls_cert_path: null          # Path to TLS certificate (PEM format)
# tls_key_path: null           # Path to TLS private key (PEM format)
"#;

    format!("{comments}\n{yaml}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commented_config_is_still_valid_yaml() {
        let yaml = render_config(&Config::default(), &ConfigFormat::Yaml).unwrap();
        let commented = add_config_comments(yaml);
        let parsed: Config = serde_yaml::from_str(&commented).unwrap();
        assert_eq!(parsed.port, 8001);
        assert!(commented.starts_with("# Herakles IPMI Exporter"));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        command_config(Some(path.clone()), ConfigFormat::Json, false).unwrap();
        let parsed: Config = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed.ipmi_privilege, "USER");
    }
}
