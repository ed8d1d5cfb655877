//! Buffer-level chart widgets
//!
//! - CandleChart: OHLC candles with moving averages and volume
//! - Scatter: two numeric columns with a trend line
//! - Histogram: binned distribution of one column

pub mod candle_chart;
pub mod histogram;
pub mod scatter;

pub use candle_chart::CandleChartPanel;
pub use histogram::HistogramPanel;
pub use scatter::ScatterPanel;
