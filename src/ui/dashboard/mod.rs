//! Terminal dashboard for the telemetry fleet.
//!
//! Real-time host and container views over the telemetry store, using
//! ratatui.

mod app;
mod event_handler;
mod render;
mod widgets;

pub use app::{run_dashboard, DashboardApp};
pub use event_handler::DashboardEvent;
