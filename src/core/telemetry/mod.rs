//! Telemetry distribution core.
//!
//! This module ingests snapshot messages from the feed and fans them out
//! to the UI via indexed, O(1)-lookup maps.

pub mod key;
mod message;
mod store;

pub use message::{ContainerStats, Envelope, HostMetrics, RawSnapshot, Snapshot, Sparklines};
pub use store::{ContainerCounts, Subscription, TelemetryStore};
