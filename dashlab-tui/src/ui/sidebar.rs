//! Sidebar: the selector inputs of the visible page.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{App, Page, StockInput, TipsInput};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(" Inputs ")
        .title_style(theme::panel_title(true));

    let lines = match app.page {
        Page::Stocks => stock_lines(app),
        Page::Tips => tips_lines(app),
    };
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn input_line<'a>(label: &str, value: String, focused: bool) -> Line<'a> {
    let marker = if focused { "> " } else { "  " };
    let value_style = if focused {
        theme::accent().add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        theme::text()
    };
    Line::from(vec![
        Span::styled(marker, theme::accent()),
        Span::styled(format!("{label:<8}"), theme::muted()),
        Span::styled(format!(" {value} "), value_style),
    ])
}

fn hint(text: &str) -> Line<'_> {
    Line::from(Span::styled(text, theme::muted()))
}

fn stock_lines(app: &App) -> Vec<Line<'_>> {
    let s = &app.stocks;
    let symbol = s.selector.symbol().unwrap_or_default();
    let range = s.range();
    let mut lines = Vec::new();

    for input in StockInput::ALL {
        let value = match input {
            StockInput::Ticker => symbol.to_string(),
            StockInput::Start => range.map(|r| r.start.to_string()).unwrap_or_default(),
            StockInput::End => range.map(|r| r.end.to_string()).unwrap_or_default(),
            StockInput::Bins => s.selector.bins.to_string(),
        };
        lines.push(input_line(input.label(), value, s.focused() == input));
        if input == StockInput::Ticker {
            if let Some(name) = app.universe.name_of(symbol) {
                lines.push(Line::from(Span::styled(
                    format!("            {name}"),
                    theme::muted().add_modifier(Modifier::ITALIC),
                )));
            }
        }
    }

    lines.push(Line::from(""));
    lines.push(hint(" j/k  select input"));
    lines.push(hint(" h/l  change (H/L x4)"));
    lines.push(hint(" /    type a ticker"));
    lines.push(hint(" r    refetch"));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" source: {}", app.engine.provider_name()),
        Style::default().fg(theme::Theme::default().text_secondary),
    )));
    lines
}

fn tips_lines(app: &App) -> Vec<Line<'_>> {
    let t = &app.tips;
    let focused = t.focused();
    let mut lines = Vec::new();

    for input in t.inputs() {
        let (label, value) = match &input {
            TipsInput::Category(column) => (column.clone(), t.selected(column).to_string()),
            TipsInput::RangeMin => (
                format!("{} >=", t.range_field),
                t.effective_range()
                    .map(|r| format!("{:.2}", r.min))
                    .unwrap_or_default(),
            ),
            TipsInput::RangeMax => (
                format!("{} <=", t.range_field),
                t.effective_range()
                    .map(|r| format!("{:.2}", r.max))
                    .unwrap_or_default(),
            ),
            TipsInput::Bins => ("Bins".to_string(), t.bins.to_string()),
        };
        lines.push(input_line(&label, value, focused == input));
    }

    lines.push(Line::from(""));
    lines.push(hint(" j/k  select input"));
    lines.push(hint(" h/l  change (H/L x4)"));
    lines.push(hint(" x    clear filters"));
    lines
}
