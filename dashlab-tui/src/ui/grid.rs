//! Data grid: the selected dataset as a scrollable table.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use dashlab_core::view::GridView;

use crate::theme::{self, Theme};

/// Widest a column grows before cells are clipped.
const MAX_COLUMN_WIDTH: usize = 14;

/// Rows sampled when sizing columns.
const WIDTH_SAMPLE: usize = 200;

pub fn render(f: &mut Frame, area: Rect, title: &str, grid: &GridView, scroll: usize) {
    let theme = Theme::default();
    let shown = if grid.is_empty() {
        "empty".to_string()
    } else {
        format!(
            "{}-{} of {}",
            scroll.min(grid.len() - 1) + 1,
            (scroll + visible_rows(area)).min(grid.len()),
            grid.len()
        )
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(false))
        .title(format!(" {title} | {shown} "))
        .title_style(theme::panel_title(false));

    let header_cells = grid.headers.iter().map(|h| {
        Cell::from(h.as_str()).style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells).height(1);

    let rows = grid
        .rows
        .iter()
        .skip(scroll)
        .take(visible_rows(area))
        .map(|row| {
            Row::new(row.iter().map(|c| Cell::from(c.as_str())))
                .style(Style::default().fg(theme.text_primary))
                .height(1)
        });

    let table = Table::new(rows, column_widths(grid))
        .header(header)
        .block(block)
        .column_spacing(1);
    f.render_widget(table, area);
}

/// Data rows that fit under the header inside the border.
fn visible_rows(area: Rect) -> usize {
    area.height.saturating_sub(3) as usize
}

fn column_widths(grid: &GridView) -> Vec<Constraint> {
    grid.headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let widest = grid
                .rows
                .iter()
                .take(WIDTH_SAMPLE)
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0);
            Constraint::Length(widest.min(MAX_COLUMN_WIDTH) as u16)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn grid(n: usize) -> GridView {
        GridView {
            headers: vec!["Date".into(), "Close".into()],
            rows: (0..n)
                .map(|i| vec![format!("2024-01-{:02}", i + 1), format!("{:.2}", 100.0 + i as f64)])
                .collect(),
        }
    }

    fn rows_of(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buf = terminal.backend().buffer();
        (0..buf.area.height)
            .map(|y| {
                (0..buf.area.width)
                    .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn header_and_first_rows() {
        let g = grid(20);
        let mut terminal = Terminal::new(TestBackend::new(50, 8)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                render(f, area, "AAPL prices", &g, 0)
            })
            .unwrap();
        let rows = rows_of(&terminal);
        assert!(rows[0].contains("AAPL prices | 1-5 of 20"));
        assert!(rows[1].contains("Date"));
        assert!(rows[1].contains("Close"));
        assert!(rows[2].contains("2024-01-01"));
        assert!(rows[6].contains("2024-01-05"));
    }

    #[test]
    fn scrolled_grid_starts_later() {
        let g = grid(20);
        let mut terminal = Terminal::new(TestBackend::new(50, 8)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                render(f, area, "prices", &g, 18)
            })
            .unwrap();
        let rows = rows_of(&terminal);
        assert!(rows[0].contains("19-20 of 20"));
        assert!(rows[2].contains("2024-01-19"));
    }

    #[test]
    fn widths_follow_content() {
        let g = GridView {
            headers: vec!["sex".into(), "a_very_long_column_name".into()],
            rows: vec![vec!["Female".into(), "1".into()]],
        };
        assert_eq!(
            column_widths(&g),
            vec![Constraint::Length(6), Constraint::Length(14)]
        );
    }

    #[test]
    fn empty_grid_title() {
        let g = GridView::default();
        let mut terminal = Terminal::new(TestBackend::new(40, 5)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                render(f, area, "tips", &g, 0)
            })
            .unwrap();
        assert!(rows_of(&terminal)[0].contains("tips | empty"));
    }
}
