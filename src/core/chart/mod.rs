//! Pure chart math: smoothing, axis scale selection and tick layout.

mod scale;
mod smoothing;
mod time_axis;

pub use scale::{byte_axis, percent_axis, snap_byte_ceiling, y_axis, YAxis, PERCENT_LADDER};
pub use smoothing::{ema, DEFAULT_ALPHA};
pub use time_axis::{
    format_offset, time_ticks, TimeTick, NARROW_WIDTH_COLS, SAMPLE_INTERVAL_SECS,
};
