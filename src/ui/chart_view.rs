//! Retained chart renderer.
//!
//! A `ChartView` owns the plot state for one chart surface through a
//! mount / update / resize / destroy lifecycle. Many instances can exist at
//! once (one per visible host or container row); they share nothing.

use ratatui::{
    prelude::*,
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Sparkline},
};
use unicode_width::UnicodeWidthStr;

use crate::core::chart::{
    ema, format_offset, time_ticks, y_axis, TimeTick, YAxis, DEFAULT_ALPHA, SAMPLE_INTERVAL_SECS,
};
use crate::ui::formatters::{format_percent, format_rate};
use crate::{FleetError, Result};

/// Metric family a chart displays; drives color and the axis-scale branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Cpu,
    Memory,
    Network,
}

impl MetricKind {
    pub const fn color(self) -> Color {
        match self {
            MetricKind::Cpu => Color::Cyan,
            MetricKind::Memory => Color::LightMagenta,
            MetricKind::Network => Color::LightGreen,
        }
    }

    /// Percentage metrics use the fixed percent ladder; everything else is
    /// scaled as a byte rate.
    pub const fn is_percentage(self) -> bool {
        matches!(self, MetricKind::Cpu | MetricKind::Memory)
    }

    pub const fn title(self) -> &'static str {
        match self {
            MetricKind::Cpu => "CPU",
            MetricKind::Memory => "Memory",
            MetricKind::Network => "Network",
        }
    }

    pub fn format_value(self, value: f64) -> String {
        if self.is_percentage() {
            format_percent(value)
        } else {
            format_rate(value)
        }
    }
}

/// Constructor contract for a chart surface.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub data: Vec<f64>,
    pub kind: MetricKind,
    pub width: u16,
    pub height: u16,
    pub label: Option<String>,
    /// Enhanced: axes, gridlines, tooltip, raw values.
    /// Compact: sparkline only, smoothed values, minimal padding.
    pub enhanced: bool,
    /// Smoothing mode; defaults to the inverse of `enhanced`.
    pub smoothed: bool,
}

impl ChartSpec {
    pub fn new(data: Vec<f64>, kind: MetricKind, width: u16, height: u16) -> Self {
        Self {
            data,
            kind,
            width,
            height,
            label: None,
            enhanced: false,
            smoothed: true,
        }
    }

    pub fn label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn enhanced(mut self, enhanced: bool) -> Self {
        self.enhanced = enhanced;
        self.smoothed = !enhanced;
        self
    }

    pub fn smoothed(mut self, smoothed: bool) -> Self {
        self.smoothed = smoothed;
        self
    }
}

/// Prepared plot state, rebuilt on data or size changes.
#[derive(Debug, Clone)]
struct PlotState {
    /// The series as displayed (raw, or EMA-smoothed).
    display: Vec<f64>,
    /// (seconds since window start, value) pairs for the line dataset.
    points: Vec<(f64, f64)>,
    y: YAxis,
    x_ticks: Vec<TimeTick>,
    elapsed_secs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Mounted,
    Destroyed,
}

pub struct ChartView {
    spec: Option<ChartSpec>,
    plot: Option<PlotState>,
    cursor: Option<(u16, u16)>,
    lifecycle: Lifecycle,
}

impl ChartView {
    pub fn new() -> Self {
        Self {
            spec: None,
            plot: None,
            cursor: None,
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle == Lifecycle::Mounted
    }

    /// Bind the view to its surface and build the initial plot.
    ///
    /// A build failure is logged and leaves an empty surface; the view still
    /// counts as mounted so later updates can recover it.
    pub fn mount(&mut self, spec: ChartSpec) {
        if self.lifecycle == Lifecycle::Destroyed {
            log::warn!("Ignoring mount on a destroyed chart view");
            return;
        }
        self.plot = match build_plot(&spec) {
            Ok(plot) => Some(plot),
            Err(e) => {
                log::error!("Chart mount failed: {}", e);
                None
            }
        };
        self.spec = Some(spec);
        self.lifecycle = Lifecycle::Mounted;
    }

    /// In-place data update; the previous frame survives a failed rebuild.
    pub fn set_data(&mut self, data: Vec<f64>) {
        if self.lifecycle != Lifecycle::Mounted {
            return;
        }
        let Some(spec) = self.spec.as_mut() else {
            return;
        };
        spec.data = data;
        match build_plot(spec) {
            Ok(plot) => self.plot = Some(plot),
            Err(e) => log::warn!("Chart data update failed: {}", e),
        }
    }

    /// In-place resize; tick density depends on width so the plot rebuilds.
    pub fn resize(&mut self, width: u16, height: u16) {
        if self.lifecycle != Lifecycle::Mounted {
            return;
        }
        let Some(spec) = self.spec.as_mut() else {
            return;
        };
        if spec.width == width && spec.height == height {
            return;
        }
        spec.width = width;
        spec.height = height;
        match build_plot(spec) {
            Ok(plot) => self.plot = Some(plot),
            Err(e) => log::warn!("Chart resize failed: {}", e),
        }
    }

    /// Pointer position in terminal cells, for tooltip mapping.
    pub fn set_cursor(&mut self, column: u16, row: u16) {
        self.cursor = Some((column, row));
    }

    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }

    /// Release the plot unconditionally. The handle is taken first, so
    /// nothing that happens afterwards can leak the old instance.
    pub fn destroy(&mut self) {
        let _plot = self.plot.take();
        self.spec = None;
        self.cursor = None;
        self.lifecycle = Lifecycle::Destroyed;
    }

    /// Draw into `area`. Never panics: an unmounted or failed view renders
    /// an empty surface.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (Some(spec), Some(plot)) = (self.spec.as_ref(), self.plot.as_ref()) else {
            frame.render_widget(Block::default().borders(Borders::NONE), area);
            return;
        };
        if spec.enhanced {
            self.render_enhanced(frame, area, spec, plot);
        } else {
            render_compact(frame, area, spec, plot);
        }
    }

    fn render_enhanced(&self, frame: &mut Frame, area: Rect, spec: &ChartSpec, plot: &PlotState) {
        let color = spec.kind.color();
        let title = match &spec.label {
            Some(label) => format!(" {} · {} ", label, spec.kind.title()),
            None => format!(" {} ", spec.kind.title()),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);

        let x_labels: Vec<Span> = plot
            .x_ticks
            .iter()
            .map(|t| Span::raw(t.label.clone()))
            .collect();
        let y_labels: Vec<Span> = plot
            .y
            .ticks
            .iter()
            .map(|&v| Span::raw(spec.kind.format_value(v)))
            .collect();

        let dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(color))
            .data(&plot.points);

        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .bounds([0.0, plot.elapsed_secs.max(1.0)])
                    .labels(x_labels)
                    .style(Style::default().fg(Color::DarkGray)),
            )
            .y_axis(
                Axis::default()
                    .bounds([0.0, plot.y.max])
                    .labels(y_labels)
                    .style(Style::default().fg(Color::DarkGray)),
            );
        frame.render_widget(chart, area);

        if let Some((text, anchor)) = self.tooltip(inner, spec, plot) {
            frame.render_widget(
                Paragraph::new(text).style(Style::default().fg(Color::Black).bg(color)),
                anchor,
            );
        }
    }

    /// Map the cursor to the nearest sample and anchor a label near that
    /// data point (not at the raw cursor position).
    fn tooltip(&self, inner: Rect, spec: &ChartSpec, plot: &PlotState) -> Option<(String, Rect)> {
        let (col, row) = self.cursor?;
        if inner.width == 0
            || inner.height == 0
            || !inner.contains(ratatui::layout::Position::new(col, row))
        {
            return None;
        }
        let n = plot.display.len();
        if n == 0 {
            return None;
        }

        let index = (if n == 1 {
            0
        } else {
            let fraction =
                f64::from(col - inner.x) / f64::from(inner.width.saturating_sub(1).max(1));
            (fraction * (n - 1) as f64).round() as usize
        })
        .min(n - 1);

        let value = plot.display[index];
        let offset = (n - 1 - index) as u64 * SAMPLE_INTERVAL_SECS;
        let text = if offset == 0 {
            format!(" {} · now ", spec.kind.format_value(value))
        } else {
            format!(
                " {} · {} ago ",
                spec.kind.format_value(value),
                format_offset(offset)
            )
        };

        let anchor_x = if n == 1 {
            inner.right().saturating_sub(1)
        } else {
            inner.x + ((index as f64 / (n - 1) as f64) * f64::from(inner.width - 1)).round() as u16
        };
        let value_fraction = if plot.y.max > 0.0 {
            (value / plot.y.max).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let anchor_y = inner.y
            + ((1.0 - value_fraction) * f64::from(inner.height.saturating_sub(1))).round() as u16;

        let width = text.width() as u16;
        let x = anchor_x.min(inner.right().saturating_sub(width).max(inner.x));
        // One row above the point when possible, on it otherwise.
        let y = if anchor_y > inner.y { anchor_y - 1 } else { anchor_y };
        Some((
            text,
            Rect::new(x, y, width.min(inner.width), 1),
        ))
    }
}

impl Default for ChartView {
    fn default() -> Self {
        Self::new()
    }
}

/// Compact mode: a plain sparkline, no axes, no padding.
fn render_compact(frame: &mut Frame, area: Rect, spec: &ChartSpec, plot: &PlotState) {
    // Scale by 100 to keep two decimals of precision in the u64 bars.
    let scaled: Vec<u64> = plot
        .display
        .iter()
        .map(|&v| (v.max(0.0) * 100.0) as u64)
        .collect();
    let sparkline = Sparkline::default()
        .data(scaled.iter().copied())
        .max((plot.y.max * 100.0) as u64)
        .style(Style::default().fg(spec.kind.color()));
    frame.render_widget(sparkline, area);
}

fn build_plot(spec: &ChartSpec) -> Result<PlotState> {
    if spec.width == 0 || spec.height == 0 {
        return Err(FleetError::chart("zero-sized chart surface"));
    }
    let display = if spec.smoothed {
        ema(&spec.data, DEFAULT_ALPHA)
    } else {
        spec.data.clone()
    };
    let y = y_axis(&display, spec.kind.is_percentage());
    let elapsed_secs = display.len().saturating_sub(1) as f64 * SAMPLE_INTERVAL_SECS as f64;
    let points: Vec<(f64, f64)> = display
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64 * SAMPLE_INTERVAL_SECS as f64, v))
        .collect();
    let x_ticks = time_ticks(display.len(), SAMPLE_INTERVAL_SECS, spec.width);
    Ok(PlotState {
        display,
        points,
        y,
        x_ticks,
        elapsed_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_with_empty_series() {
        let mut view = ChartView::new();
        view.mount(ChartSpec::new(Vec::new(), MetricKind::Cpu, 40, 10));
        assert!(view.is_mounted());
        assert!(view.plot.as_ref().unwrap().display.is_empty());
    }

    #[test]
    fn test_mount_zero_size_leaves_empty_surface() {
        let mut view = ChartView::new();
        view.mount(ChartSpec::new(vec![1.0, 2.0], MetricKind::Cpu, 0, 0));
        // Mounted, but no plot: renders empty instead of crashing the parent.
        assert!(view.is_mounted());
        assert!(view.plot.is_none());
    }

    #[test]
    fn test_failed_update_keeps_previous_plot() {
        let mut view = ChartView::new();
        view.mount(ChartSpec::new(vec![1.0, 2.0], MetricKind::Cpu, 40, 10));
        assert!(view.plot.is_some());
        view.resize(0, 0);
        // Previous frame must survive the failed rebuild
        assert!(view.plot.is_some());
        assert_eq!(view.plot.as_ref().unwrap().display.len(), 2);
    }

    #[test]
    fn test_set_data_updates_in_place() {
        let mut view = ChartView::new();
        let spec = ChartSpec::new(vec![1.0], MetricKind::Network, 60, 12).enhanced(true);
        view.mount(spec);
        view.set_data(vec![10.0, 20.0, 30.0]);
        let plot = view.plot.as_ref().unwrap();
        // Enhanced mode plots raw values
        assert_eq!(plot.display, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_compact_mode_smooths() {
        let mut view = ChartView::new();
        view.mount(ChartSpec::new(vec![10.0, 12.0, 11.0], MetricKind::Cpu, 40, 4));
        let plot = view.plot.as_ref().unwrap();
        assert!((plot.display[1] - 10.6).abs() < 1e-9);
    }

    #[test]
    fn test_destroy_releases_plot() {
        let mut view = ChartView::new();
        view.mount(ChartSpec::new(vec![1.0], MetricKind::Memory, 10, 4));
        view.destroy();
        assert!(view.plot.is_none());
        assert!(!view.is_mounted());
        // Updates after destroy are no-ops
        view.set_data(vec![5.0]);
        assert!(view.plot.is_none());
    }

    #[test]
    fn test_tooltip_single_sample() {
        let mut view = ChartView::new();
        view.mount(ChartSpec::new(vec![42.0], MetricKind::Cpu, 40, 10).enhanced(true));
        view.set_cursor(5, 5);
        let inner = Rect::new(1, 1, 38, 8);
        let spec = view.spec.as_ref().unwrap();
        let plot = view.plot.as_ref().unwrap();
        let (text, _) = view.tooltip(inner, spec, plot).unwrap();
        assert!(text.contains("42.0%"));
        assert!(text.contains("now"));
    }

    #[test]
    fn test_tooltip_empty_series_is_none() {
        let mut view = ChartView::new();
        view.mount(ChartSpec::new(Vec::new(), MetricKind::Cpu, 40, 10).enhanced(true));
        view.set_cursor(5, 5);
        let inner = Rect::new(1, 1, 38, 8);
        let spec = view.spec.as_ref().unwrap();
        let plot = view.plot.as_ref().unwrap();
        assert!(view.tooltip(inner, spec, plot).is_none());
    }
}
