use chrono::Utc;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
};

use crate::ui::chart_view::{ChartSpec, ChartView, MetricKind};
use crate::ui::formatters::{format_age, format_bytes, format_percent, format_rate};

use super::app::DashboardApp;
use super::widgets::{colored_gauge, state_color};

/// Feed older than this many seconds is flagged as stalled in the header.
const STALE_AFTER_SECS: i64 = 10;

/// Main render function
pub fn render_ui(frame: &mut Frame, app: &mut DashboardApp) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),      // Header with feed status
            Constraint::Length(7),      // Host overview row
            Constraint::Percentage(35), // Container table
            Constraint::Min(8),         // Detail chart
            Constraint::Length(1),      // Footer
        ])
        .split(area);

    render_header(frame, chunks[0], app);
    render_host_overview(frame, chunks[1], app);
    render_containers(frame, chunks[2], app);
    render_detail_chart(frame, chunks[3], app);
    render_footer(frame, chunks[4]);

    if app.show_help {
        render_help_overlay(frame, area);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &DashboardApp) {
    let (status, color) = match app.store.last_update() {
        Some(ts) => {
            let age = (Utc::now() - ts).num_seconds();
            if age > STALE_AFTER_SECS {
                (format!("STALLED {} ago", format_age(age)), Color::Red)
            } else {
                (format!("updated {} ago", format_age(age)), Color::Cyan)
            }
        }
        None => ("waiting for feed".to_string(), Color::DarkGray),
    };

    let title = format!(" fleetmon │ {} hosts │ {} ", app.hosts.len(), status);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    frame.render_widget(block, area);
}

fn render_host_overview(frame: &mut Frame, area: Rect, app: &DashboardApp) {
    if app.hosts.is_empty() {
        let block = Block::default().title(" Hosts ").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new("No hosts reporting yet").style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    // Up to four host panels side by side, keeping the selected one visible.
    let visible = app.hosts.len().min(4);
    let first = app.selected_host.saturating_sub(visible - 1);
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, visible as u32); visible])
        .split(area);

    for (slot, host_index) in (first..first + visible).enumerate() {
        let Some(host) = app.hosts.get(host_index) else {
            break;
        };
        render_host_panel(frame, slots[slot], app, host, host_index == app.selected_host);
    }
}

fn render_host_panel(frame: &mut Frame, area: Rect, app: &DashboardApp, host: &str, selected: bool) {
    let counts = app.store.container_counts(host);
    let border_style = if selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(format!(" {} │ {}/{} up ", host, counts.running, counts.total))
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 5 || inner.width < 8 {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(1), // CPU gauge
            Constraint::Length(1), // Memory gauge
            Constraint::Length(2), // CPU sparkline
            Constraint::Length(1), // Network line
        ])
        .split(inner);

    let metrics = app.store.host_metrics(host).unwrap_or_default();
    frame.render_widget(
        colored_gauge(
            metrics.cpu_percent,
            &format!("CPU {}", format_percent(metrics.cpu_percent)),
        ),
        rows[0],
    );
    frame.render_widget(
        colored_gauge(
            metrics.mem_percent,
            &format!(
                "MEM {} / {}",
                format_bytes(metrics.mem_used_bytes),
                format_bytes(metrics.mem_total_bytes)
            ),
        ),
        rows[1],
    );

    // Compact sparkline of the host CPU series; one short-lived view per
    // panel, nothing shared between panels.
    let series = app
        .store
        .host_sparklines(host)
        .map(|s| s.cpu)
        .unwrap_or_default();
    let mut sparkline = ChartView::new();
    sparkline.mount(ChartSpec::new(
        series,
        MetricKind::Cpu,
        rows[2].width,
        rows[2].height,
    ));
    sparkline.render(frame, rows[2]);
    sparkline.destroy();

    frame.render_widget(
        Paragraph::new(format!(
            "↓ {} ↑ {}",
            format_rate(metrics.net_rx_bytes_per_sec),
            format_rate(metrics.net_tx_bytes_per_sec)
        ))
        .style(Style::default().fg(Color::LightGreen)),
        rows[3],
    );
}

fn render_containers(frame: &mut Frame, area: Rect, app: &DashboardApp) {
    let (title, containers) = match app.selected_host_id() {
        Some(host) => {
            let counts = app.store.container_counts(host);
            (
                format!(
                    " Containers on {} │ {} running · {} stopped · {} total ",
                    host, counts.running, counts.stopped, counts.total
                ),
                app.visible_containers(),
            )
        }
        None => (" Containers ".to_string(), Vec::new()),
    };

    let header = Row::new(vec!["NAME", "STATE", "CPU", "MEM%", "MEM"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = containers
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let style = if i == app.selected_container {
                Style::default()
                    .add_modifier(Modifier::REVERSED)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(c.name.clone()),
                Cell::from(c.state.clone()).style(Style::default().fg(state_color(&c.state))),
                Cell::from(format_percent(c.cpu_percent)),
                Cell::from(format_percent(c.memory_percent)),
                Cell::from(format_bytes(c.memory_usage_bytes)),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(34),
            Constraint::Percentage(14),
            Constraint::Percentage(14),
            Constraint::Percentage(14),
            Constraint::Percentage(24),
        ],
    )
    .header(header)
    .block(Block::default().title(title).borders(Borders::ALL));

    frame.render_widget(table, area);
}

fn render_detail_chart(frame: &mut Frame, area: Rect, app: &mut DashboardApp) {
    app.detail_area = Some(area);
    app.detail_chart.resize(area.width, area.height);
    app.detail_chart.render(frame, area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(" q quit │ tab host │ ↑/↓ container │ m metric │ e axes │ ? help ")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = area.width.min(44);
    let height = area.height.min(12);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let text = vec![
        Line::from(""),
        Line::from("  q / Esc      quit"),
        Line::from("  Tab / S-Tab  next / previous host"),
        Line::from("  ↑ ↓ / k j    select container"),
        Line::from("  m            cycle metric (cpu/mem/net)"),
        Line::from("  e            toggle enhanced axes"),
        Line::from("  mouse move   inspect a data point"),
        Line::from("  ? / h        toggle this help"),
    ];

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        popup,
    );
}
