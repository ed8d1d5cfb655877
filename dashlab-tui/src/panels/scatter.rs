//! Scatter panel - two numeric columns plotted against each other with a
//! least-squares trend line.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
};

use dashlab_core::view::ScatterView;

use crate::theme::Theme;

pub struct ScatterPanel<'a> {
    scatter: &'a ScatterView,
    theme: &'a Theme,
}

impl<'a> ScatterPanel<'a> {
    pub fn new(scatter: &'a ScatterView, theme: &'a Theme) -> Self {
        Self { scatter, theme }
    }
}

/// Bounds padded by 5% so edge points stay inside the plot.
fn padded(bounds: (f64, f64)) -> (f64, f64) {
    let (lo, hi) = bounds;
    let range = hi - lo;
    let pad = if range > 0.0 { range * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}

impl<'a> Widget for ScatterPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let s = self.scatter;
        let (Some(x_bounds), Some(y_bounds)) = (s.x_bounds(), s.y_bounds()) else {
            Block::default()
                .title(format!(" {} vs {} [No Data] ", s.y_field, s.x_field))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.muted))
                .style(Style::default().bg(self.theme.background))
                .render(area, buf);
            return;
        };
        let (x_lower, x_upper) = padded(x_bounds);
        let (y_lower, y_upper) = padded(y_bounds);

        let title = match &s.trend {
            Some(t) => format!(
                " {} vs {} | {} points | y = {:.3}x {:+.3} ",
                s.y_field,
                s.x_field,
                s.points.len(),
                t.slope,
                t.intercept
            ),
            None => format!(" {} vs {} | {} points ", s.y_field, s.x_field, s.points.len()),
        };

        let trend_data: Vec<(f64, f64)> = s
            .trend
            .map(|t| vec![(x_bounds.0, t.at(x_bounds.0)), (x_bounds.1, t.at(x_bounds.1))])
            .unwrap_or_default();

        let mut datasets = vec![Dataset::default()
            .name(s.y_field.as_str())
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(self.theme.accent))
            .data(&s.points)];
        if !trend_data.is_empty() {
            datasets.push(
                Dataset::default()
                    .name("trend")
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.theme.neutral))
                    .data(&trend_data),
            );
        }

        let x_labels = vec![
            Span::raw(format!("{:.1}", x_lower)),
            Span::raw(format!("{:.1}", (x_lower + x_upper) / 2.0)),
            Span::raw(format!("{:.1}", x_upper)),
        ];
        let y_labels = vec![
            Span::raw(format!("{:.1}", y_lower)),
            Span::raw(format!("{:.1}", (y_lower + y_upper) / 2.0)),
            Span::raw(format!("{:.1}", y_upper)),
        ];

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.accent))
                    .style(Style::default().bg(self.theme.background)),
            )
            .x_axis(
                Axis::default()
                    .title(Span::styled(
                        s.x_field.as_str(),
                        Style::default().fg(self.theme.text_secondary),
                    ))
                    .style(Style::default().fg(self.theme.muted))
                    .bounds([x_lower, x_upper])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled(
                        s.y_field.as_str(),
                        Style::default().fg(self.theme.text_secondary),
                    ))
                    .style(Style::default().fg(self.theme.muted))
                    .bounds([y_lower, y_upper])
                    .labels(y_labels),
            );

        chart.render(area, buf);
    }
}
