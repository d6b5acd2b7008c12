use humansize::{format_size as human_format_size, DECIMAL};

/// Format a byte count in human-readable form
pub fn format_bytes(bytes: u64) -> String {
    human_format_size(bytes, DECIMAL)
}

/// Format a byte rate for network display
pub fn format_rate(bytes_per_sec: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let v = if bytes_per_sec.is_finite() {
        bytes_per_sec.max(0.0)
    } else {
        0.0
    };

    if v >= GB {
        format!("{:.2} GB/s", v / GB)
    } else if v >= MB {
        format!("{:.2} MB/s", v / MB)
    } else if v >= KB {
        format!("{:.2} KB/s", v / KB)
    } else {
        format!("{:.0} B/s", v)
    }
}

/// Format a percentage value
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Format an age in seconds for the staleness indicator
pub fn format_age(secs: i64) -> String {
    if secs < 0 {
        "0s".to_string()
    } else if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
