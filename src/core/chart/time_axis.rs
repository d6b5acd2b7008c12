//! Time (X) axis tick layout.
//!
//! Ticks are offsets in "seconds before now": the rightmost tick is pinned
//! to the most recent sample, and the candidate offsets come from a table
//! indexed by both the elapsed window and the available width, so narrow
//! charts carry fewer labels.

/// Implicit spacing between consecutive sparkline samples.
pub const SAMPLE_INTERVAL_SECS: u64 = 3;

/// Below this many columns a chart only gets its endpoint labels.
pub const NARROW_WIDTH_COLS: u16 = 38;

/// One rendered X-axis tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeTick {
    /// Seconds before the newest sample.
    pub offset_secs: u64,
    /// Horizontal position, 0.0 = oldest sample, 1.0 = now.
    pub position: f64,
    pub label: String,
}

/// Render an offset as a relative-time label.
pub fn format_offset(offset_secs: u64) -> String {
    if offset_secs == 0 {
        "now".to_string()
    } else if offset_secs < 60 {
        format!("{}s", offset_secs)
    } else {
        // Round to the nearest minute; collisions are collapsed by the caller.
        format!("{}m", (offset_secs + 30) / 60)
    }
}

fn target_offsets(elapsed: u64, width_cols: u16) -> Vec<u64> {
    let narrow = width_cols < NARROW_WIDTH_COLS;
    if elapsed <= 30 {
        if narrow {
            vec![elapsed, 0]
        } else {
            vec![elapsed, 20, 10, 0]
        }
    } else if elapsed <= 60 {
        if narrow {
            vec![elapsed, 30, 0]
        } else {
            vec![elapsed, 45, 30, 15, 0]
        }
    } else if elapsed <= 120 {
        if narrow {
            vec![elapsed, 60, 0]
        } else {
            vec![elapsed, 90, 60, 30, 0]
        }
    } else {
        // Longer windows: quarter points rounded to 30s boundaries.
        let quarter = |f: f64| ((elapsed as f64 * f / 30.0).round() * 30.0) as u64;
        if narrow {
            vec![elapsed, quarter(0.5), 0]
        } else {
            vec![elapsed, quarter(0.75), quarter(0.5), quarter(0.25), 0]
        }
    }
}

/// Tick layout for a series of `sample_count` points spaced
/// `interval_secs` apart on a chart `width_cols` wide.
///
/// Zero samples yield no ticks; a single sample collapses to one "now"
/// tick. Rendered labels are unique: offsets that round to the same label
/// keep only their first (leftmost) occurrence.
pub fn time_ticks(sample_count: usize, interval_secs: u64, width_cols: u16) -> Vec<TimeTick> {
    if sample_count == 0 {
        return Vec::new();
    }
    let elapsed = (sample_count as u64 - 1) * interval_secs;
    if elapsed == 0 {
        return vec![TimeTick {
            offset_secs: 0,
            position: 1.0,
            label: format_offset(0),
        }];
    }

    let mut offsets = target_offsets(elapsed, width_cols);
    offsets.retain(|&o| o <= elapsed);
    offsets.sort_unstable_by(|a, b| b.cmp(a));
    offsets.dedup();

    let mut ticks: Vec<TimeTick> = Vec::with_capacity(offsets.len());
    for offset in offsets {
        let label = format_offset(offset);
        if ticks.iter().any(|t| t.label == label) {
            continue;
        }
        ticks.push(TimeTick {
            offset_secs: offset,
            position: 1.0 - offset as f64 / elapsed as f64,
            label,
        });
    }
    ticks
}
