//! CLI command implementations for herakles-ipmi-exporter.
//!
//! This module provides implementations for all CLI subcommands:
//! - `check`: Configuration and ipmitool validation
//! - `config`: Configuration file generation
//! - `test`: One-shot collection against the configured targets

pub mod check;
pub mod config;
pub mod test;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use test::command_test;
