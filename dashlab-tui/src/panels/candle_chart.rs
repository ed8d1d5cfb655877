//! Candle chart panel - OHLC candles with moving-average overlays and volume
//!
//! Renders the price history using direct buffer writes:
//! - Each candle = 1 terminal column
//! - Body: block char, green if close >= open, pink otherwise
//! - Wicks: vertical line chars to high/low
//! - SMA overlays: dots in empty cells along each moving average
//! - Volume: bottom strip of eighth-block bars, coloured like the candle

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use dashlab_core::view::PriceChartView;

use crate::theme::Theme;

/// Eighth-block glyphs, empty to full.
const BLOCKS: [&str; 9] = [" ", "▁", "▂", "▃", "▄", "▅", "▆", "▇", "█"];

/// Rows given to the volume strip when the plot is tall enough.
const VOLUME_ROWS: u16 = 3;

/// Candle chart widget
pub struct CandleChartPanel<'a> {
    chart: &'a PriceChartView,
    theme: &'a Theme,
}

impl<'a> CandleChartPanel<'a> {
    pub fn new(chart: &'a PriceChartView, theme: &'a Theme) -> Self {
        Self { chart, theme }
    }
}

/// Map a price to a Y position in the plot area (0 = top)
pub fn price_to_y(price: f64, y_min: f64, y_max: f64, plot_height: u16) -> u16 {
    if (y_max - y_min).abs() < 1e-9 || plot_height == 0 || !price.is_finite() {
        return 0;
    }
    let frac = (price - y_min) / (y_max - y_min);
    let y = plot_height.saturating_sub(1) as f64 * (1.0 - frac);
    y.round().max(0.0).min(plot_height.saturating_sub(1) as f64) as u16
}

impl<'a> Widget for CandleChartPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let symbol = self.chart.symbol.as_str();
        let Some((y_min, y_max)) = self.chart.price_range() else {
            let block = Block::default()
                .title(format!(" Price history: {symbol} [No Data] "))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.muted))
                .style(Style::default().bg(self.theme.background));
            block.render(area, buf);
            return;
        };
        let candles = &self.chart.candles;

        // Add padding
        let range = y_max - y_min;
        let pad = if range > 0.0 { range * 0.05 } else { 1.0 };
        let y_lower = y_min - pad;
        let y_upper = y_max + pad;

        let up_count = candles.iter().filter(|b| b.is_up()).count();
        let down_count = candles.len() - up_count;
        let overlays: Vec<&str> = self.chart.sma.iter().map(|l| l.label.as_str()).collect();

        let mut title = format!(
            " {} | {} bars | {} up {} down ",
            symbol,
            candles.len(),
            up_count,
            down_count,
        );
        if !overlays.is_empty() {
            title.push_str(&format!("| {} ", overlays.join(", ")));
        }

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background));

        let inner = block.inner(area);
        block.render(area, buf);

        // Reserve left margin for Y-axis labels (8 chars) and bottom for the date axis (1 row)
        let label_width: u16 = 8;
        let plot_left = inner.x + label_width;
        let plot_top = inner.y;
        let plot_width = inner.width.saturating_sub(label_width);
        let total_height = inner.height.saturating_sub(1);
        let volume_rows = if total_height >= 10 { VOLUME_ROWS } else { 0 };
        let plot_height = total_height.saturating_sub(volume_rows);

        if plot_width == 0 || plot_height == 0 {
            return;
        }

        // Y-axis labels
        let y_labels = [y_upper, (y_upper + y_lower) / 2.0, y_lower];
        let y_positions = [0u16, plot_height / 2, plot_height.saturating_sub(1)];
        for (label_val, y_pos) in y_labels.iter().zip(y_positions.iter()) {
            let label = format!("{:>7.1}", label_val);
            buf.set_string(
                inner.x,
                plot_top + y_pos,
                &label,
                Style::default().fg(self.theme.muted),
            );
        }

        // Most recent candles win when they do not all fit.
        let bars_to_draw = candles.len().min(plot_width as usize);
        let start_bar = candles.len() - bars_to_draw;

        for (i, bar) in candles[start_bar..].iter().enumerate() {
            let x = plot_left + i as u16;
            if x >= inner.right() {
                break;
            }

            let style = Style::default().fg(self.theme.candle_color(bar.is_up()));

            let high_y = price_to_y(bar.high, y_lower, y_upper, plot_height);
            let low_y = price_to_y(bar.low, y_lower, y_upper, plot_height);
            let body_top_y = price_to_y(bar.open.max(bar.close), y_lower, y_upper, plot_height);
            let body_bot_y = price_to_y(bar.open.min(bar.close), y_lower, y_upper, plot_height);

            // Upper wick
            for y in high_y..body_top_y {
                buf.set_string(x, plot_top + y, "|", style);
            }

            // Body
            let body_char = if bar.is_up() { "\u{2588}" } else { "\u{2593}" };
            for y in body_top_y..=body_bot_y {
                buf.set_string(x, plot_top + y, body_char, style);
            }

            // Lower wick
            for y in (body_bot_y + 1)..=low_y {
                buf.set_string(x, plot_top + y, "|", style);
            }
        }

        // Moving averages, drawn only into empty cells so candles stay readable
        let sma_style = Style::default()
            .fg(self.theme.warning)
            .add_modifier(Modifier::BOLD);
        for line in &self.chart.sma {
            for (i, value) in line.values[start_bar..].iter().enumerate() {
                if !value.is_finite() {
                    continue;
                }
                let x = plot_left + i as u16;
                if x >= inner.right() {
                    break;
                }
                let py = plot_top + price_to_y(*value, y_lower, y_upper, plot_height);
                if buf.cell((x, py)).is_some_and(|c| c.symbol() == " ") {
                    buf.set_string(x, py, "•", sma_style);
                }
            }
        }

        // Volume strip
        let max_volume = self.chart.max_volume();
        if volume_rows > 0 && max_volume > 0 {
            let strip_bottom = plot_top + plot_height + volume_rows - 1;
            buf.set_string(
                inner.x,
                strip_bottom,
                format!("{:>7}", "vol"),
                Style::default().fg(self.theme.muted),
            );
            for (i, bar) in candles[start_bar..].iter().enumerate() {
                let x = plot_left + i as u16;
                if x >= inner.right() {
                    break;
                }
                let style = Style::default().fg(self.theme.candle_color(bar.is_up()));
                let eighths = (bar.volume as f64 / max_volume as f64 * (volume_rows * 8) as f64)
                    .round() as u16;
                for row in 0..volume_rows {
                    let fill = eighths.saturating_sub(row * 8).min(8);
                    if fill == 0 {
                        break;
                    }
                    buf.set_string(x, strip_bottom - row, BLOCKS[fill as usize], style);
                }
            }
        }

        // Date axis
        let axis_y = plot_top + total_height;
        if axis_y < inner.bottom() {
            if let (Some(first), Some(last)) = (candles.get(start_bar), candles.last()) {
                let style = Style::default().fg(self.theme.muted);
                buf.set_string(plot_left, axis_y, first.date.to_string(), style);
                let last_label = last.date.to_string();
                let right_x = inner.right().saturating_sub(last_label.len() as u16);
                if right_x > plot_left + 10 {
                    buf.set_string(right_x, axis_y, last_label, style);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashlab_core::domain::{Bar, Dataset};
    use proptest::prelude::*;

    fn make_chart(ohlc: &[(f64, f64, f64, f64)], periods: &[usize]) -> PriceChartView {
        let base = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let bars: Vec<Bar> = ohlc
            .iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| Bar {
                date: base + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume: 1_000 * (i as u64 + 1),
                adj_close: close,
            })
            .collect();
        PriceChartView::from_dataset(&Dataset::from_bars(&bars), "SPY", periods).unwrap()
    }

    fn make_test_chart() -> PriceChartView {
        make_chart(
            &[
                (100.0, 102.0, 99.0, 101.0),  // up
                (101.0, 103.0, 100.0, 100.5), // down
                (100.5, 104.0, 99.5, 103.0),  // up
                (103.0, 105.0, 101.0, 102.0), // down
                (102.0, 106.0, 101.5, 105.5), // up
            ],
            &[2],
        )
    }

    fn buffer_text(buf: &Buffer, area: Rect) -> String {
        let mut content = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                content.push_str(buf.cell((x, y)).unwrap().symbol());
            }
        }
        content
    }

    #[test]
    fn test_candle_chart_renders_title_and_overlay_label() {
        let theme = Theme::default();
        let chart = make_test_chart();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        CandleChartPanel::new(&chart, &theme).render(area, &mut buf);

        let content = buffer_text(&buf, area);
        assert!(content.contains("SPY | 5 bars | 3 up 2 down"));
        assert!(content.contains("SMA 2"));
        assert!(content.contains("2024-03-01"));
        assert!(content.contains("2024-03-05"));
    }

    #[test]
    fn test_candle_chart_empty_bars() {
        let theme = Theme::default();
        let chart = make_chart(&[], &[20]);
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        CandleChartPanel::new(&chart, &theme).render(area, &mut buf);
        assert!(buffer_text(&buf, area).contains("No Data"));
    }

    #[test]
    fn test_up_candle_uses_positive_color() {
        let theme = Theme::default();
        let chart = make_chart(&[(100.0, 102.0, 99.0, 101.0)], &[]);
        let area = Rect::new(0, 0, 40, 20);
        let mut buf = Buffer::empty(area);
        CandleChartPanel::new(&chart, &theme).render(area, &mut buf);

        assert!(buffer_text(&buf, area).contains("1 up 0 down"));
        // Inner area starts at (1,1); candle column sits after the 8-char label margin.
        let x = 1 + 8;
        let body = (1..area.height - 1)
            .map(|y| buf.cell((x, y)).unwrap())
            .find(|c| c.symbol() == "\u{2588}")
            .expect("candle body drawn");
        assert_eq!(body.fg, theme.positive);
    }

    #[test]
    fn test_volume_strip_drawn_for_tall_area() {
        let theme = Theme::default();
        let chart = make_test_chart();
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        CandleChartPanel::new(&chart, &theme).render(area, &mut buf);

        let content = buffer_text(&buf, area);
        assert!(content.contains("vol"));
        // The largest volume fills its column of the strip completely.
        let last_x = 1 + 8 + 4;
        // inner height 18: 14 plot rows, 3 volume rows, 1 date row
        let strip_bottom = 1 + 14 + 3 - 1;
        assert_eq!(buf.cell((last_x, strip_bottom)).unwrap().symbol(), "█");
    }

    #[test]
    fn test_only_latest_candles_fit() {
        let theme = Theme::default();
        let ohlc: Vec<(f64, f64, f64, f64)> = (0..50)
            .map(|i| {
                let p = 100.0 + i as f64;
                (p, p + 1.0, p - 1.0, p + 0.5)
            })
            .collect();
        let chart = make_chart(&ohlc, &[5]);
        let area = Rect::new(0, 0, 30, 16);
        let mut buf = Buffer::empty(area);
        CandleChartPanel::new(&chart, &theme).render(area, &mut buf);
        // 30 wide - 2 border - 8 labels = 20 columns -> first visible is day 31
        assert!(buffer_text(&buf, area).contains("2024-03-31"));
    }

    proptest! {
        #[test]
        fn price_to_y_stays_in_plot(
            price in -1e4..1e4_f64,
            lo in -1e4..0.0_f64,
            span in 0.0..1e4_f64,
            height in 0u16..200,
        ) {
            let y = price_to_y(price, lo, lo + span, height);
            prop_assert!(y <= height.saturating_sub(1));
        }
    }
}
