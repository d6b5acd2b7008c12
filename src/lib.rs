// Fleetmon Library - Public API

// Re-export error types
pub mod error;
pub use error::{FleetError, Result};

// Module declarations
pub mod core;
pub mod ui;

// Re-export commonly used types
pub use crate::core::telemetry::TelemetryStore;

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
