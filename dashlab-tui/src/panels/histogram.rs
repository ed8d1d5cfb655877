//! Histogram panel - vertical bars drawn straight into the buffer.
//!
//! Bars share the plot width evenly; heights are scaled to the fullest bin
//! with eighth-block precision. The bottom row carries the outer bin edges.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Widget},
};

use dashlab_core::view::HistogramView;

use crate::theme::Theme;

const BLOCKS: [&str; 9] = [" ", "▁", "▂", "▃", "▄", "▅", "▆", "▇", "█"];

pub struct HistogramPanel<'a> {
    view: &'a HistogramView,
    theme: &'a Theme,
}

impl<'a> HistogramPanel<'a> {
    pub fn new(view: &'a HistogramView, theme: &'a Theme) -> Self {
        Self { view, theme }
    }
}

impl<'a> Widget for HistogramPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let h = &self.view.histogram;
        let title = format!(
            " {} | {} bins | n={} ",
            self.view.field,
            h.bins(),
            h.total()
        );
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background));
        let inner = block.inner(area);
        block.render(area, buf);

        let max_count = h.max_count();
        if max_count == 0 {
            buf.set_string(
                inner.x,
                inner.y,
                "No Data",
                Style::default().fg(self.theme.muted),
            );
            return;
        }

        // Top row: peak count, bottom row: edges
        let plot_top = inner.y + 1;
        let plot_height = inner.height.saturating_sub(2);
        if plot_height == 0 || inner.width == 0 || h.bins() == 0 {
            return;
        }
        buf.set_string(
            inner.x,
            inner.y,
            format!("max {max_count}"),
            Style::default().fg(self.theme.muted),
        );

        let col_width = (inner.width as usize / h.bins()).max(1) as u16;
        let bar_width = if col_width >= 3 { col_width - 1 } else { col_width };
        let bar_style = Style::default().fg(self.theme.neutral);
        let bottom = plot_top + plot_height - 1;

        for (i, &count) in h.counts.iter().enumerate() {
            let x0 = inner.x + i as u16 * col_width;
            if x0 >= inner.right() {
                break;
            }
            let eighths =
                (count as f64 / max_count as f64 * (plot_height * 8) as f64).round() as u16;
            // A non-empty bin always shows at least a sliver.
            let eighths = if count > 0 { eighths.max(1) } else { 0 };
            for row in 0..plot_height {
                let fill = eighths.saturating_sub(row * 8).min(8);
                if fill == 0 {
                    break;
                }
                for dx in 0..bar_width {
                    let x = x0 + dx;
                    if x < inner.right() {
                        buf.set_string(x, bottom - row, BLOCKS[fill as usize], bar_style);
                    }
                }
            }
        }

        let axis_y = plot_top + plot_height;
        if let (Some(lo), Some(hi)) = (h.edges.first(), h.edges.last()) {
            let style = Style::default().fg(self.theme.muted);
            let lo_label = format!("{lo:.1}");
            let hi_label = format!("{hi:.1}");
            buf.set_string(inner.x, axis_y, &lo_label, style);
            let right_x = inner.right().saturating_sub(hi_label.len() as u16);
            if right_x > inner.x + lo_label.len() as u16 {
                buf.set_string(right_x, axis_y, &hi_label, style);
            }
        }
    }
}
