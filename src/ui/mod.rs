// UI and formatting module

pub mod chart_view;
pub mod dashboard;
pub mod formatters;

// Re-export commonly used items for cleaner imports
pub use chart_view::{ChartSpec, ChartView, MetricKind};
pub use dashboard::run_dashboard;
pub use formatters::{format_age, format_bytes, format_percent, format_rate};
