//! Terminal rendering for the dashboard.
//!
//! The UI is a pull-only consumer: on every tick it reads the metric
//! snapshot, the stream health, and the live toast sequence from the
//! [`App`](crate::app::App) and redraws. Nothing here mutates core state.

mod format;
mod theme;

pub use format::{format_bytes, format_plain, meta_for, MetricMeta, METRIC_META, UNKNOWN};
pub use theme::Theme;

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;
use crate::store::MetricsSnapshot;
use crate::toast::{Toast, Visibility};

/// Width of a toast box, matching the fixed-width stack of the original
/// dashboard.
const TOAST_WIDTH: u16 = 36;

/// Render one full frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Min(5),    // Metric tiles
        Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_metrics(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Toasts float over everything else.
    render_toasts(frame, app, frame.area());
}

/// Render the header with the connection state indicator.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let health = app.health();
    let state_style = app.theme.state_style(health.state);

    let mut spans = vec![
        Span::styled(" ● ", state_style),
        Span::styled("LOADWATCH ", app.theme.header),
        Span::raw("│ "),
        Span::styled(health.state.label(), state_style),
    ];
    if app.connection_stale() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            "(stale)",
            Style::default().fg(app.theme.warning).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the metric tile grid.
///
/// Known keys render with their label and formatter; extra keys the stream
/// delivered render beneath them with the raw key; never-observed keys
/// show the unknown placeholder, never a zero.
fn render_metrics(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = app.metrics();

    let mut tiles: Vec<(String, String, bool)> = METRIC_META
        .iter()
        .map(|meta| {
            let value = snapshot.get(meta.key);
            (
                meta.label.to_string(),
                value.map_or_else(|| UNKNOWN.to_string(), |v| (meta.format)(v)),
                value.is_none(),
            )
        })
        .collect();
    tiles.extend(extra_keys(&snapshot));

    let columns = 4usize;
    let rows = tiles.len().div_ceil(columns);
    let row_areas = Layout::vertical(vec![Constraint::Length(4); rows]).split(area);

    for (row, tile_row) in tiles.chunks(columns).enumerate() {
        if row >= row_areas.len() {
            break;
        }
        let cells =
            Layout::horizontal(vec![Constraint::Ratio(1, columns as u32); columns])
                .split(row_areas[row]);
        for (cell, (label, value, unknown)) in cells.iter().zip(tile_row) {
            render_tile(frame, app, *cell, label, value, *unknown);
        }
    }
}

fn render_tile(frame: &mut Frame, app: &App, area: Rect, label: &str, value: &str, unknown: bool) {
    let value_style = if unknown {
        app.theme.unknown
    } else {
        Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
        .title(Span::styled(format!(" {} ", label), app.theme.label));
    let body = Paragraph::new(Span::styled(value.to_string(), value_style))
        .alignment(Alignment::Center)
        .block(block);

    frame.render_widget(body, area);
}

/// Values for keys outside the known lookup table, in snapshot order.
fn extra_keys(snapshot: &MetricsSnapshot) -> Vec<(String, String, bool)> {
    snapshot
        .iter()
        .filter(|(key, _)| meta_for(key).is_none())
        .map(|(key, value)| (key.clone(), format_plain(value), false))
        .collect()
}

/// Render the key hints and source description.
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" r ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("reset │ "),
        Span::styled("q ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("quit │ "),
        Span::styled(app.source_description(), Style::default().add_modifier(Modifier::DIM)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the toast stack in the top-right corner.
///
/// Fading toasts are dimmed, the terminal equivalent of the opacity
/// transition the original applies.
fn render_toasts(frame: &mut Frame, app: &App, area: Rect) {
    let toasts = app.toasts();
    if toasts.is_empty() {
        return;
    }

    let width = TOAST_WIDTH.min(area.width);
    let x = area.right().saturating_sub(width + 1);
    let mut y = area.top() + 1;

    for toast in &toasts {
        let height = 3;
        if y + height > area.bottom() {
            break;
        }
        let rect = Rect::new(x, y, width, height);
        render_toast(frame, app, rect, toast);
        y += height;
    }
}

fn render_toast(frame: &mut Frame, app: &App, area: Rect, toast: &Toast) {
    let mut style = app.theme.severity_style(toast.severity);
    if toast.visibility == Visibility::FadingOut {
        style = style.add_modifier(Modifier::DIM);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(style)
        .title(Span::styled(format!(" {} ", toast.title), style));
    let body = Paragraph::new(Span::styled(toast.message.clone(), style))
        .wrap(Wrap { trim: true })
        .block(block);

    frame.render_widget(Clear, area);
    frame.render_widget(body, area);
}
