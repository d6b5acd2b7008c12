use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};

use crate::core::telemetry::{ContainerStats, TelemetryStore};
use crate::ui::chart_view::{ChartSpec, ChartView, MetricKind};

use super::event_handler::DashboardEvent;
use super::render::render_ui;

/// How many containers the per-host table shows.
const TOP_CONTAINERS: usize = 10;

/// Dashboard application state
pub struct DashboardApp {
    pub store: Arc<TelemetryStore>,
    pub hosts: Vec<String>,
    pub selected_host: usize,
    pub selected_container: usize,
    pub metric: MetricKind,
    pub enhanced: bool,
    pub show_help: bool,
    pub should_quit: bool,
    pub detail_chart: ChartView,
    /// Area of the detail chart from the last draw, for cursor mapping.
    pub detail_area: Option<Rect>,
    /// Identity of what the detail chart currently shows; a change here
    /// means a fresh mount instead of an in-place data update.
    detail_identity: Option<(String, MetricKind, bool)>,
}

impl DashboardApp {
    pub fn new(store: Arc<TelemetryStore>) -> Self {
        Self {
            store,
            hosts: Vec::new(),
            selected_host: 0,
            selected_container: 0,
            metric: MetricKind::Cpu,
            enhanced: true,
            show_help: false,
            should_quit: false,
            detail_chart: ChartView::new(),
            detail_area: None,
            detail_identity: None,
        }
    }

    pub fn selected_host_id(&self) -> Option<&str> {
        self.hosts.get(self.selected_host).map(String::as_str)
    }

    /// Containers shown in the table: top-N by CPU on the selected host.
    pub fn visible_containers(&self) -> Vec<ContainerStats> {
        match self.selected_host_id() {
            Some(host) => self.store.top_containers(host, TOP_CONTAINERS),
            None => Vec::new(),
        }
    }

    fn selected_container_stats(&self) -> Option<ContainerStats> {
        self.visible_containers()
            .into_iter()
            .nth(self.selected_container)
    }

    /// Series for the detail chart: the selected container's sparkline for
    /// the active metric, falling back to the host series when no container
    /// is selected.
    fn selected_series(&self) -> (String, Vec<f64>) {
        if let Some(stats) = self.selected_container_stats() {
            if let Some(sparklines) = self.store.container_sparklines(&stats.id) {
                let series = match self.metric {
                    MetricKind::Cpu => sparklines.cpu,
                    MetricKind::Memory => sparklines.mem,
                    MetricKind::Network => sparklines.net,
                };
                return (stats.name, series);
            }
            return (stats.name, Vec::new());
        }
        match self.selected_host_id() {
            Some(host) => {
                let series = self
                    .store
                    .host_sparklines(host)
                    .map(|s| match self.metric {
                        MetricKind::Cpu => s.cpu,
                        MetricKind::Memory => s.mem,
                        MetricKind::Network => s.net,
                    })
                    .unwrap_or_default();
                (host.to_string(), series)
            }
            None => (String::new(), Vec::new()),
        }
    }

    /// Pull fresh state out of the store and update the detail chart.
    pub fn refresh(&mut self) {
        self.hosts = self.store.host_ids();
        if self.selected_host >= self.hosts.len() {
            self.selected_host = self.hosts.len().saturating_sub(1);
        }
        let visible = self.visible_containers();
        if self.selected_container >= visible.len() {
            self.selected_container = visible.len().saturating_sub(1);
        }

        let (label, series) = self.selected_series();
        let identity = Some((label.clone(), self.metric, self.enhanced));
        if identity != self.detail_identity || !self.detail_chart.is_mounted() {
            // New target: tear the old plot down and mount a fresh view.
            self.detail_chart.destroy();
            self.detail_chart = ChartView::new();
            let area = self.detail_area.unwrap_or(Rect::new(0, 0, 80, 12));
            self.detail_chart.mount(
                ChartSpec::new(series, self.metric, area.width, area.height)
                    .label(label)
                    .enhanced(self.enhanced),
            );
            self.detail_identity = identity;
        } else {
            self.detail_chart.set_data(series);
        }
    }

    /// Handle keyboard/mouse events
    pub fn handle_event(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::Quit => self.should_quit = true,
            DashboardEvent::ToggleHelp => self.show_help = !self.show_help,
            DashboardEvent::NextHost => {
                if !self.hosts.is_empty() {
                    self.selected_host = (self.selected_host + 1) % self.hosts.len();
                    self.selected_container = 0;
                }
            }
            DashboardEvent::PrevHost => {
                if !self.hosts.is_empty() {
                    self.selected_host = if self.selected_host == 0 {
                        self.hosts.len() - 1
                    } else {
                        self.selected_host - 1
                    };
                    self.selected_container = 0;
                }
            }
            DashboardEvent::ContainerUp => {
                if self.selected_container > 0 {
                    self.selected_container -= 1;
                }
            }
            DashboardEvent::ContainerDown => {
                let max_index = self.visible_containers().len().saturating_sub(1);
                if self.selected_container < max_index {
                    self.selected_container += 1;
                }
            }
            DashboardEvent::CycleMetric => {
                self.metric = match self.metric {
                    MetricKind::Cpu => MetricKind::Memory,
                    MetricKind::Memory => MetricKind::Network,
                    MetricKind::Network => MetricKind::Cpu,
                };
            }
            DashboardEvent::ToggleEnhanced => self.enhanced = !self.enhanced,
            DashboardEvent::PointerMoved(column, row) => {
                let inside = self
                    .detail_area
                    .is_some_and(|a| a.contains(ratatui::layout::Position::new(column, row)));
                if inside {
                    self.detail_chart.set_cursor(column, row);
                } else {
                    self.detail_chart.clear_cursor();
                }
            }
            DashboardEvent::None => {}
        }
    }
}

/// Run the dashboard TUI application
pub fn run_dashboard(store: Arc<TelemetryStore>, tick_rate: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = DashboardApp::new(Arc::clone(&store));

    // Wake the draw loop as soon as a snapshot lands instead of waiting for
    // the next tick.
    let dirty = Arc::new(AtomicBool::new(false));
    let dirty_flag = Arc::clone(&dirty);
    let subscription = store.subscribe(move || {
        dirty_flag.store(true, Ordering::SeqCst);
    });

    app.refresh();
    let mut last_tick = Instant::now();

    // Main loop
    loop {
        terminal.draw(|frame| render_ui(frame, &mut app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("Event poll failed")? {
            let dashboard_event = match event::read().context("Event read failed")? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => DashboardEvent::Quit,
                    KeyCode::Char('?') | KeyCode::Char('h') => DashboardEvent::ToggleHelp,
                    KeyCode::Tab => DashboardEvent::NextHost,
                    KeyCode::BackTab => DashboardEvent::PrevHost,
                    KeyCode::Up | KeyCode::Char('k') => DashboardEvent::ContainerUp,
                    KeyCode::Down | KeyCode::Char('j') => DashboardEvent::ContainerDown,
                    KeyCode::Char('m') => DashboardEvent::CycleMetric,
                    KeyCode::Char('e') => DashboardEvent::ToggleEnhanced,
                    _ => DashboardEvent::None,
                },
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Moved => {
                    DashboardEvent::PointerMoved(mouse.column, mouse.row)
                }
                Event::Resize(_, _) => {
                    // The next draw picks the new size up; force a refresh
                    // so tick density follows the width.
                    dirty.store(true, Ordering::SeqCst);
                    DashboardEvent::None
                }
                _ => DashboardEvent::None,
            };
            app.handle_event(dashboard_event);
        }

        if app.should_quit {
            break;
        }

        if dirty.swap(false, Ordering::SeqCst) || last_tick.elapsed() >= tick_rate {
            app.refresh();
            last_tick = Instant::now();
        }
    }

    subscription.cancel();
    app.detail_chart.destroy();

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    Ok(())
}
