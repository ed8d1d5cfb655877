//! Bottom status bar: page hints, last status message, cache counters.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let stats = app.engine.cache_stats();
    let counters = format!(
        "cache {}/{} | hit {} miss {} evict {} ",
        app.engine.cached_entries(),
        app.engine.config().cache_capacity,
        stats.hits,
        stats.misses,
        stats.evictions
    );

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(counters.len() as u16)])
        .split(area);

    let mut spans: Vec<Span> = Vec::new();

    // Page hints
    spans.push(Span::styled(" 1:Stocks 2:Tips Tab:switch q:quit", theme::muted()));

    // Separator
    spans.push(Span::raw(" | "));

    // Status message
    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);
    f.render_widget(
        Paragraph::new(Span::styled(counters, theme::muted())).alignment(Alignment::Right),
        chunks[1],
    );
}
