//! "Nice number" Y-axis selection.
//!
//! Percentage metrics snap to a small fixed ladder so a 0.4% CPU series does
//! not render as a full-looking chart; byte/rate metrics snap to human
//! multiples of B/s..GB/s so the gridlines stay put between frames.

use once_cell::sync::Lazy;

/// Upper-bound ladder for percentage series, low end always anchored at 0.
pub const PERCENT_LADDER: [f64; 6] = [1.0, 5.0, 15.0, 40.0, 60.0, 100.0];

/// Multipliers applied to each unit step (B/s, KB/s, MB/s, GB/s).
const UNIT_MULTIPLIERS: [f64; 7] = [1.0, 2.0, 5.0, 10.0, 50.0, 100.0, 500.0];

const EPSILON: f64 = 1e-9;

/// Sorted ladder of nice byte-rate values, 1 B/s up to 500 GB/s.
static BYTE_LADDER: Lazy<Vec<f64>> = Lazy::new(|| {
    let mut ladder = Vec::with_capacity(UNIT_MULTIPLIERS.len() * 4);
    for exp in 0..4 {
        let unit = 1024f64.powi(exp);
        for m in UNIT_MULTIPLIERS {
            ladder.push(m * unit);
        }
    }
    ladder.sort_by(|a, b| a.partial_cmp(b).unwrap());
    ladder
});

/// A selected axis range with its tick positions, both in data units.
#[derive(Debug, Clone, PartialEq)]
pub struct YAxis {
    pub max: f64,
    pub ticks: Vec<f64>,
}

/// Snap a raw byte-rate maximum up to the ladder, with 10% headroom.
///
/// A degenerate maximum (below epsilon) is treated as 1 B/s before snapping
/// so the axis never collapses to zero height. Monotonic: a larger input
/// never snaps below a smaller one.
pub fn snap_byte_ceiling(raw_max: f64) -> f64 {
    let floored = if raw_max.is_finite() && raw_max > EPSILON {
        raw_max
    } else {
        1.0
    };
    let target = floored * 1.1;
    for &step in BYTE_LADDER.iter() {
        if step >= target {
            return step;
        }
    }
    // Beyond the ladder top; keep the headroom so the curve stays inside.
    target
}

/// Axis for a byte/rate series.
///
/// Ticks start at 0 and step by a ladder-snapped increment (a quarter of the
/// range, snapped the same way as the ceiling) until they would exceed the
/// axis maximum.
pub fn byte_axis(raw_max: f64) -> YAxis {
    let max = snap_byte_ceiling(raw_max);
    let step = BYTE_LADDER
        .iter()
        .copied()
        .find(|&s| s >= max / 4.0)
        .unwrap_or(max / 4.0);

    let mut ticks = Vec::new();
    let mut tick = 0.0;
    while tick <= max + EPSILON {
        ticks.push(tick);
        tick += step;
    }
    YAxis { max, ticks }
}

/// Axis for a percentage series: the smallest ladder entry covering the
/// observed maximum, with a fixed human-friendly tick set per range.
pub fn percent_axis(raw_max: f64) -> YAxis {
    let observed = if raw_max.is_finite() { raw_max } else { 0.0 };
    let max = PERCENT_LADDER
        .iter()
        .copied()
        .find(|&top| top >= observed)
        // Values above 100% happen on multi-core CPU readings; round up to
        // the next multiple of 50 instead of clipping the curve.
        .unwrap_or_else(|| (observed / 50.0).ceil() * 50.0);

    let ticks = match max {
        m if m <= 1.0 => vec![0.0, 1.0],
        m if m <= 5.0 => vec![0.0, 5.0],
        m if m <= 15.0 => vec![0.0, 5.0, 10.0, 15.0],
        m if m <= 40.0 => vec![0.0, 10.0, 20.0, 30.0, 40.0],
        m if m <= 60.0 => vec![0.0, 20.0, 40.0, 60.0],
        m if m <= 100.0 => vec![0.0, 25.0, 50.0, 75.0, 100.0],
        m => vec![0.0, m / 2.0, m],
    };
    YAxis { max, ticks }
}

/// Select the axis for a series, branching on the metric family.
///
/// Accepts an empty series and returns the degenerate minimal range.
pub fn y_axis(values: &[f64], is_percentage: bool) -> YAxis {
    let raw_max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);
    if is_percentage {
        percent_axis(raw_max)
    } else {
        byte_axis(raw_max)
    }
}
