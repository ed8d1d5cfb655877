//! Value boxes: headline numbers above the charts.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use dashlab_core::view::{SummaryBoxes, ValueBoxes};

use crate::theme::{self, Theme};

/// Current price, change (with arrow) and percent change.
pub fn render_price(f: &mut Frame, area: Rect, boxes: &ValueBoxes, delta: Option<f64>) {
    let theme = Theme::default();
    let change_style = match delta {
        Some(d) => Style::default()
            .fg(theme.change_color(d))
            .add_modifier(Modifier::BOLD),
        None => theme::muted(),
    };
    let arrow = boxes.direction.map(|d| d.arrow()).unwrap_or(" ");

    let cells = split(area, 3);
    render_box(
        f,
        cells[0],
        "Current Price",
        vec![Span::styled(
            boxes.price.as_str(),
            theme::text().add_modifier(Modifier::BOLD),
        )],
    );
    render_box(
        f,
        cells[1],
        "Change",
        vec![
            Span::styled(arrow, change_style),
            Span::raw(" "),
            Span::styled(boxes.change.as_str(), change_style),
        ],
    );
    render_box(
        f,
        cells[2],
        "Percent Change",
        vec![Span::styled(boxes.percent.as_str(), change_style)],
    );
}

/// Row count, total, mean and mean ratio of the filtered table.
pub fn render_summary(f: &mut Frame, area: Rect, boxes: &SummaryBoxes, value_field: &str) {
    let value_style = theme::text().add_modifier(Modifier::BOLD);
    let cells = split(area, 4);
    render_box(f, cells[0], "Rows", vec![Span::styled(boxes.rows.as_str(), value_style)]);
    render_box(
        f,
        cells[1],
        &format!("Total {value_field}"),
        vec![Span::styled(boxes.total.as_str(), value_style)],
    );
    render_box(
        f,
        cells[2],
        &format!("Average {value_field}"),
        vec![Span::styled(boxes.mean.as_str(), value_style)],
    );
    render_box(
        f,
        cells[3],
        "Average ratio",
        vec![Span::styled(boxes.mean_ratio.as_str(), value_style)],
    );
}

fn split(area: Rect, n: u32) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints((0..n).map(|_| Constraint::Ratio(1, n)))
        .split(area)
        .to_vec()
}

fn render_box(f: &mut Frame, area: Rect, title: &str, value: Vec<Span>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(false))
        .title(format!(" {title} "))
        .title_style(theme::muted());
    let para = Paragraph::new(Line::from(value))
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(para, area);
}
