// Core business logic module

pub mod chart;
pub mod feed;
pub mod telemetry;

// Re-export commonly used items
pub use feed::FeedRuntime;
pub use telemetry::{Snapshot, Subscription, TelemetryStore};
