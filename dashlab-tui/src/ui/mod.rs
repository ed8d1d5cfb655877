//! Top-level UI layout: page tabs, sidebar inputs, dashboard body, status bar.

pub mod grid;
pub mod sidebar;
pub mod status_bar;
pub mod value_boxes;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use crate::app::{App, Page};
use crate::panels::{CandleChartPanel, HistogramPanel, ScatterPanel};
use crate::theme::{self, Theme};

/// Sidebar width in columns.
const SIDEBAR_WIDTH: u16 = 30;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &App) {
    // Split: tabs + main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_tabs(f, chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(chunks[1]);

    sidebar::render(f, body[0], app);
    match app.page {
        Page::Stocks => draw_stocks(f, body[1], app),
        Page::Tips => draw_tips(f, body[1], app),
    }

    status_bar::render(f, chunks[2], app);

    if let Some(input) = &app.symbol_input {
        render_symbol_input(f, chunks[1], input);
    }
}

fn render_tabs(f: &mut Frame, area: Rect, app: &App) {
    let titles = [Page::Stocks, Page::Tips]
        .iter()
        .map(|p| format!(" {} {} ", p.index() + 1, p.label()));
    let tabs = Tabs::new(titles)
        .select(app.page.index())
        .style(theme::muted())
        .highlight_style(theme::accent().add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .divider("|");
    f.render_widget(tabs, area);
}

/// Three value boxes, charts (primary 70% / histogram 30%), data grid.
fn body_layout(area: Rect) -> (Rect, Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Percentage(35),
        ])
        .split(area);
    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(rows[1]);
    (rows[0], charts[0], charts[1], rows[2])
}

fn draw_stocks(f: &mut Frame, area: Rect, app: &App) {
    let s = &app.stocks;
    let theme = Theme::default();
    let (boxes_area, primary_area, side_area, grid_area) = body_layout(area);

    value_boxes::render_price(f, boxes_area, &s.boxes, s.delta);

    if let Some(err) = &s.error {
        render_error(f, primary_area.union(side_area), err);
    } else {
        if let Some(chart) = &s.chart {
            f.render_widget(CandleChartPanel::new(chart, &theme), primary_area);
        }
        if let Some(histogram) = &s.histogram {
            f.render_widget(HistogramPanel::new(histogram, &theme), side_area);
        }
    }

    let symbol = s.selector.symbol().unwrap_or_default();
    grid::render(f, grid_area, &format!("{symbol} prices"), &s.grid, s.grid_scroll);
}

fn draw_tips(f: &mut Frame, area: Rect, app: &App) {
    let t = &app.tips;
    let theme = Theme::default();
    let (boxes_area, primary_area, side_area, grid_area) = body_layout(area);

    value_boxes::render_summary(f, boxes_area, &t.boxes, &t.range_field);

    if let Some(err) = &t.error {
        render_error(f, primary_area.union(side_area), err);
    } else {
        if let Some(scatter) = &t.scatter {
            f.render_widget(ScatterPanel::new(scatter, &theme), primary_area);
        }
        if let Some(histogram) = &t.histogram {
            f.render_widget(HistogramPanel::new(histogram, &theme), side_area);
        }
    }

    let name = app.engine.table().map(|table| table.name()).unwrap_or("table");
    grid::render(f, grid_area, name, &t.grid, t.grid_scroll);
}

/// Upstream failure shown in place of the charts.
fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::negative())
        .title(" Data unavailable ")
        .title_style(theme::negative().add_modifier(Modifier::BOLD));
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, theme::negative())),
        Line::from(""),
        Line::from(Span::styled(
            "Pick another ticker or press r to retry.",
            theme::muted(),
        )),
    ];
    f.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

/// Symbol entry overlay.
fn render_symbol_input(f: &mut Frame, area: Rect, input: &str) {
    let popup = centered_rect(50, 30, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Ticker [Enter]select [Esc]cancel ")
        .title_style(theme::panel_title(true));

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Enter ticker symbol:", theme::muted())),
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", theme::accent()),
            Span::styled(input, theme::accent().add_modifier(Modifier::BOLD)),
            Span::styled("_", theme::accent()),
        ]),
    ];
    f.render_widget(Paragraph::new(text), inner);
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
