//! Check command implementation.
//!
//! Validates configuration and the ipmitool installation.

use crate::config::{validate_effective_config, Config};
use crate::startup_checks::check_ipmitool;

/// Validates configuration and runtime requirements.
///
/// Exits the process with code 1 if any check fails.
pub fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Herakles IPMI Exporter - System Check");
    println!("========================================");

    let mut all_ok = true;

    println!("\n🔧 Checking ipmitool...");
    match check_ipmitool(&config.ipmitool_path) {
        Ok(version) => println!("   ✅ {} ({})", config.ipmitool_path, version),
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    println!("\n🎯 Checking targets...");
    if config.targets.is_empty() {
        println!("   ❌ No targets configured");
        all_ok = false;
    } else {
        for target in &config.targets {
            println!("   • {}", target);
        }
        println!(
            "   ✅ {} target(s), timeout {}s, parallelism {}",
            config.targets.len(),
            config.timeout_secs,
            config.parallelism
        );
    }

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration error: {}", e);
            all_ok = false;
        }
    }

    println!();
    if all_ok {
        println!("✅ All checks passed");
        Ok(())
    } else {
        println!("❌ Some checks failed");
        std::process::exit(1);
    }
}
