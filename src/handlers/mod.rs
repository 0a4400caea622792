//! HTTP endpoint handlers for the exporter.
//!
//! - `/`: landing page
//! - `/metrics`: Prometheus metrics endpoint
//! - `/health`: Health check endpoint
//! - `/config`: Configuration display endpoint
//!
//! Handlers are generic over the [`SensorReader`](crate::reader::SensorReader)
//! so the router can be driven by a scripted reader in tests.

pub mod config;
pub mod health;
pub mod metrics;
pub mod root;

// Re-export handlers
pub use config::config_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use root::root_handler;
