//! CLI arguments and subcommands for herakles-ipmi-exporter.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Default, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, Default, ValueEnum)]
pub enum ConfigFormat {
    #[default]
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug, Default)]
#[command(
    name = "herakles-ipmi-exporter",
    about = "Prometheus exporter for BMC hardware sensors via ipmitool",
    long_about = "Prometheus exporter for BMC hardware sensors via ipmitool.\n\n\
                  Polls CPU/system temperatures, fan speeds and power supply states \
                  from one or more BMCs with `ipmitool sdr` on every scrape and exposes \
                  them as Prometheus gauges.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version = "0.1.0",
    propagate_version = true,
    after_help = "Environment: TARGET_IPS, IPMI_USER, IPMI_PASSWD, IPMI_PRIV"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// BMC addresses to poll (comma-separated, overrides TARGET_IPS)
    #[arg(short = 't', long)]
    pub targets: Option<String>,

    /// BMC user name (overrides IPMI_USER)
    #[arg(long)]
    pub ipmi_user: Option<String>,

    /// BMC password (overrides IPMI_PASSWD)
    #[arg(long)]
    pub ipmi_password: Option<String>,

    /// Session privilege level: CALLBACK, USER, OPERATOR, ADMINISTRATOR (overrides IPMI_PRIV)
    #[arg(long)]
    pub ipmi_privilege: Option<String>,

    /// Path to the ipmitool binary
    #[arg(long)]
    pub ipmitool_path: Option<String>,

    /// Per-target timeout for one ipmitool run, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Maximum concurrent ipmitool processes per scrape
    #[arg(long)]
    pub parallelism: Option<usize>,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,

    /// Enable TLS/SSL for HTTPS
    #[arg(long)]
    pub enable_tls: bool,

    /// Path to TLS certificate file (PEM format)
    #[arg(long)]
    pub tls_cert: Option<PathBuf>,

    /// Path to TLS private key file (PEM format)
    #[arg(long)]
    pub tls_key: Option<PathBuf>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration and check that ipmitool can be executed
    Check,

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Run collection passes against the configured targets and print the samples
    Test {
        /// Number of test iterations
        #[arg(short = 'n', long, default_value_t = 1)]
        iterations: usize,

        /// Also list per-target status and timing
        #[arg(long)]
        verbose: bool,
    },
}
