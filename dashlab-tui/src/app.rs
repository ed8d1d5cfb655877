//! Application state: single-owner, main-thread only.
//!
//! Each page keeps its selector inputs and the view models last computed from
//! them. Any input change re-runs the engine synchronously; unchanged inputs
//! are answered from the engine's session cache.

use chrono::NaiveDate;
use log::{debug, warn};

use dashlab_core::data::StockUniverse;
use dashlab_core::domain::{CategoryQuery, DateRange, Query, SelectorState, ValueRange};
use dashlab_core::engine::MetricError;
use dashlab_core::view::{
    GridView, HistogramView, PriceChartView, ScatterView, SummaryBoxes, ValueBoxes,
};
use dashlab_core::DerivedValueEngine;

/// Shown in a category selector when the column is unconstrained.
pub const ALL: &str = "All";

/// Days moved per date-bound step.
const DATE_STEP_DAYS: i64 = 7;

/// Which dashboard is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Stocks,
    Tips,
}

impl Page {
    pub fn index(self) -> usize {
        match self {
            Page::Stocks => 0,
            Page::Tips => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Page::Stocks => "Stocks",
            Page::Tips => "Tips",
        }
    }

    pub fn next(self) -> Page {
        match self {
            Page::Stocks => Page::Tips,
            Page::Tips => Page::Stocks,
        }
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Sidebar inputs of the stock page, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockInput {
    Ticker,
    Start,
    End,
    Bins,
}

impl StockInput {
    pub const ALL: [StockInput; 4] = [
        StockInput::Ticker,
        StockInput::Start,
        StockInput::End,
        StockInput::Bins,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StockInput::Ticker => "Ticker",
            StockInput::Start => "From",
            StockInput::End => "To",
            StockInput::Bins => "Bins",
        }
    }
}

/// Stock page: ticker + date range inputs and the views derived from them.
#[derive(Debug)]
pub struct StocksState {
    pub selector: SelectorState,
    pub focus: usize,
    pub boxes: ValueBoxes,
    /// Signed change, for colouring the change box.
    pub delta: Option<f64>,
    pub chart: Option<PriceChartView>,
    pub histogram: Option<HistogramView>,
    pub grid: GridView,
    pub grid_scroll: usize,
    /// Upstream failure shown in place of the charts.
    pub error: Option<String>,
}

impl StocksState {
    fn new(selector: SelectorState) -> Self {
        Self {
            selector,
            focus: 0,
            boxes: ValueBoxes::placeholder(),
            delta: None,
            chart: None,
            histogram: None,
            grid: GridView::default(),
            grid_scroll: 0,
            error: None,
        }
    }

    pub fn focused(&self) -> StockInput {
        StockInput::ALL[self.focus.min(StockInput::ALL.len() - 1)]
    }

    pub fn range(&self) -> Option<DateRange> {
        match &self.selector.query {
            Query::Ticker { range, .. } => Some(*range),
            Query::Category(_) => None,
        }
    }

    fn clear_views(&mut self) {
        self.boxes = ValueBoxes::placeholder();
        self.delta = None;
        self.chart = None;
        self.histogram = None;
        self.grid = GridView::default();
        self.grid_scroll = 0;
    }
}

/// Sidebar inputs of the tips page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TipsInput {
    Category(String),
    RangeMin,
    RangeMax,
    Bins,
}

/// Tips page: categorical filters + value range and the views derived from them.
#[derive(Debug)]
pub struct TipsState {
    pub query: CategoryQuery,
    /// Category column -> its distinct values.
    pub choices: Vec<(String, Vec<String>)>,
    pub range_field: String,
    pub bounds: Option<(f64, f64)>,
    /// `None` until the range is first narrowed.
    pub range: Option<ValueRange>,
    pub bins: usize,
    pub focus: usize,
    pub boxes: SummaryBoxes,
    pub scatter: Option<ScatterView>,
    pub histogram: Option<HistogramView>,
    pub grid: GridView,
    pub grid_scroll: usize,
    pub error: Option<String>,
}

impl TipsState {
    pub fn inputs(&self) -> Vec<TipsInput> {
        let mut inputs: Vec<TipsInput> = self
            .choices
            .iter()
            .map(|(c, _)| TipsInput::Category(c.clone()))
            .collect();
        if self.bounds.is_some() {
            inputs.push(TipsInput::RangeMin);
            inputs.push(TipsInput::RangeMax);
        }
        inputs.push(TipsInput::Bins);
        inputs
    }

    pub fn focused(&self) -> TipsInput {
        let inputs = self.inputs();
        inputs
            .get(self.focus)
            .cloned()
            .unwrap_or(TipsInput::Bins)
    }

    /// Current value of a category filter, or `ALL`.
    pub fn selected(&self, column: &str) -> &str {
        self.query
            .equals
            .get(column)
            .map(|s| s.as_str())
            .unwrap_or(ALL)
    }

    /// The range shown in the sidebar: the narrowed range or the full bounds.
    pub fn effective_range(&self) -> Option<ValueRange> {
        self.range
            .or_else(|| self.bounds.map(|(lo, hi)| ValueRange::new(lo, hi)))
    }

    pub fn selector(&self) -> SelectorState {
        let mut query = self.query.clone();
        if let Some(r) = self.range {
            query = query.with_range(self.range_field.clone(), r);
        }
        SelectorState::category(query).with_bins(self.bins)
    }

    fn clear_views(&mut self) {
        self.boxes = SummaryBoxes::placeholder();
        self.scatter = None;
        self.histogram = None;
        self.grid = GridView::default();
        self.grid_scroll = 0;
    }
}

/// Complete TUI state.
pub struct App {
    pub running: bool,
    pub page: Page,
    pub engine: DerivedValueEngine,
    pub universe: StockUniverse,
    pub today: NaiveDate,
    pub stocks: StocksState,
    pub tips: TipsState,
    /// Text typed into the symbol entry overlay, when open.
    pub symbol_input: Option<String>,
    pub status_message: Option<(String, StatusLevel)>,
}

impl App {
    /// Build the state and compute both pages once.
    pub fn new(engine: DerivedValueEngine, mut universe: StockUniverse, today: NaiveDate) -> Self {
        let stock_selector = engine.default_selector(today);
        if let Some(symbol) = stock_selector.symbol() {
            universe.insert(symbol);
        }

        let config = engine.config();
        let table_config = &config.table;
        let (choices, bounds) = match engine.table() {
            Some(table) => (
                table_config
                    .category_fields
                    .iter()
                    .map(|c| (c.clone(), table.choices(c)))
                    .filter(|(_, values)| !values.is_empty())
                    .collect(),
                table.bounds(&table_config.value_field),
            ),
            None => (Vec::new(), None),
        };
        let tips = TipsState {
            query: CategoryQuery::new(),
            choices,
            range_field: table_config.value_field.clone(),
            bounds,
            range: None,
            bins: config.histogram_bins,
            focus: 0,
            boxes: SummaryBoxes::placeholder(),
            scatter: None,
            histogram: None,
            grid: GridView::default(),
            grid_scroll: 0,
            error: None,
        };

        let mut app = Self {
            running: true,
            page: Page::Stocks,
            engine,
            universe,
            today,
            stocks: StocksState::new(stock_selector),
            tips,
            symbol_input: None,
            status_message: None,
        };
        app.refresh_tips();
        app.refresh_stocks();
        app
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }

    /// Recompute the visible page.
    pub fn refresh(&mut self) {
        match self.page {
            Page::Stocks => self.refresh_stocks(),
            Page::Tips => self.refresh_tips(),
        }
    }

    /// Drop every cached dataset and recompute the visible page.
    pub fn reload(&mut self) {
        self.engine.invalidate();
        self.refresh();
    }

    pub fn refresh_stocks(&mut self) {
        let selector = self.stocks.selector.clone();
        let symbol = selector.symbol().unwrap_or_default().to_string();
        let periods = self.engine.config().sma_periods.clone();

        match self.engine.compute(&selector) {
            Ok(derived) => {
                let s = &mut self.stocks;
                s.boxes = ValueBoxes::from_result(&derived.change);
                s.delta = derived.delta();
                s.chart = PriceChartView::from_dataset(&derived.dataset, &symbol, &periods).ok();
                s.histogram =
                    HistogramView::from_dataset(&derived.dataset, &derived.field, selector.bins)
                        .ok();
                s.grid = GridView::from_dataset(&derived.dataset).newest_first();
                s.grid_scroll = 0;
                s.error = None;

                match &derived.change {
                    Ok(_) => self.set_status(format!(
                        "{symbol}: {} rows",
                        derived.dataset.len()
                    )),
                    Err(e @ MetricError::InsufficientData { .. }) => {
                        self.set_warning(format!("{symbol}: {e}; widen the date range"))
                    }
                    Err(e) => self.set_warning(format!("{symbol}: {e}")),
                }
            }
            Err(e) => {
                warn!("{symbol}: {e}");
                self.stocks.clear_views();
                self.stocks.error = Some(e.to_string());
                self.set_error(format!("{symbol}: {e}"));
            }
        }
    }

    pub fn refresh_tips(&mut self) {
        let selector = self.tips.selector();
        let (x_field, y_field, value_field) = {
            let t = &self.engine.config().table;
            (t.x_field.clone(), t.y_field.clone(), t.value_field.clone())
        };

        match self.engine.dataset(&selector) {
            Ok(dataset) => {
                let summary = self.engine.summary(&selector);
                let t = &mut self.tips;
                t.boxes = SummaryBoxes::from_result(&summary);
                t.scatter = ScatterView::from_dataset(&dataset, &x_field, &y_field).ok();
                t.histogram =
                    HistogramView::from_dataset(&dataset, &value_field, selector.bins).ok();
                t.grid = GridView::from_dataset(&dataset);
                t.grid_scroll = 0;
                t.error = None;
                if dataset.is_empty() {
                    self.set_warning("no rows match the current filters");
                } else {
                    self.set_status(format!("{} rows match", dataset.len()));
                }
            }
            Err(e) => {
                warn!("table filter failed: {e}");
                self.tips.clear_views();
                self.tips.error = Some(e.to_string());
                self.set_error(e.to_string());
            }
        }
    }

    // ── Stock inputs ─────────────────────────────────────────────────

    /// Select the ticker `steps` positions away in the universe.
    pub fn cycle_symbol(&mut self, steps: i64) {
        let symbols = self.universe.symbols();
        if symbols.is_empty() {
            return;
        }
        let current = self.stocks.selector.symbol().unwrap_or_default();
        let len = symbols.len() as i64;
        let pos = symbols.iter().position(|s| *s == current).unwrap_or(0) as i64;
        let next = symbols[(pos + steps).rem_euclid(len) as usize].to_string();
        self.select_symbol(&next);
    }

    /// Switch the stock page to `symbol`, keeping range and bins.
    pub fn select_symbol(&mut self, symbol: &str) {
        let Some(range) = self.stocks.range() else {
            return;
        };
        self.universe.insert(symbol);
        let bins = self.stocks.selector.bins;
        self.stocks.selector = SelectorState::ticker(symbol, range).with_bins(bins);
        debug!("ticker -> {}", symbol.trim().to_uppercase());
        self.refresh_stocks();
    }

    pub fn set_range(&mut self, range: DateRange) {
        let Some(symbol) = self.stocks.selector.symbol().map(str::to_string) else {
            return;
        };
        let bins = self.stocks.selector.bins;
        self.stocks.selector = SelectorState::ticker(&symbol, range).with_bins(bins);
        self.refresh_stocks();
    }

    /// Adjust the focused stock input by `steps` (left/right).
    pub fn adjust_stock_input(&mut self, steps: i64) {
        let Some(range) = self.stocks.range() else {
            return;
        };
        match self.stocks.focused() {
            StockInput::Ticker => self.cycle_symbol(steps),
            StockInput::Start => self.set_range(range.shift_start(steps * DATE_STEP_DAYS)),
            StockInput::End => {
                let shifted = range.shift_end(steps * DATE_STEP_DAYS);
                let end = shifted.end.min(self.today);
                self.set_range(DateRange::new(shifted.start, end.max(shifted.start)));
            }
            StockInput::Bins => {
                let bins = step_bins(self.stocks.selector.bins, steps);
                self.stocks.selector = self.stocks.selector.clone().with_bins(bins);
                self.refresh_stocks();
            }
        }
    }

    // ── Tips inputs ──────────────────────────────────────────────────

    /// Adjust the focused tips input by `steps` (left/right).
    pub fn adjust_tips_input(&mut self, steps: i64) {
        match self.tips.focused() {
            TipsInput::Category(column) => {
                let Some(values) = self
                    .tips
                    .choices
                    .iter()
                    .find(|(c, _)| *c == column)
                    .map(|(_, v)| v.clone())
                else {
                    return;
                };
                // Option 0 is "All", then each distinct value.
                let current = self.tips.query.equals.get(&column);
                let pos = current
                    .and_then(|v| values.iter().position(|x| x == v))
                    .map(|p| p as i64 + 1)
                    .unwrap_or(0);
                let next = (pos + steps).rem_euclid(values.len() as i64 + 1);
                let value = (next > 0).then(|| values[(next - 1) as usize].clone());
                self.tips.query.set_equal(&column, value);
            }
            TipsInput::RangeMin | TipsInput::RangeMax => {
                let (Some((lo, hi)), Some(r)) = (self.tips.bounds, self.tips.effective_range())
                else {
                    return;
                };
                let step = ((hi - lo) / 20.0).max(0.01) * steps as f64;
                let range = if self.tips.focused() == TipsInput::RangeMin {
                    ValueRange::new((r.min + step).clamp(lo, r.max), r.max)
                } else {
                    ValueRange::new(r.min, (r.max + step).clamp(r.min, hi))
                };
                self.tips.range = Some(range);
            }
            TipsInput::Bins => {
                self.tips.bins = step_bins(self.tips.bins, steps);
            }
        }
        self.refresh_tips();
    }

    /// Clear every tips filter.
    pub fn reset_tips_filters(&mut self) {
        self.tips.query = CategoryQuery::new();
        self.tips.range = None;
        self.refresh_tips();
    }

    // ── Navigation ───────────────────────────────────────────────────

    pub fn switch_page(&mut self, page: Page) {
        if self.page != page {
            self.page = page;
            self.refresh();
        }
    }

    pub fn move_focus(&mut self, steps: i64) {
        let (focus, len) = match self.page {
            Page::Stocks => (&mut self.stocks.focus, StockInput::ALL.len()),
            Page::Tips => {
                let len = self.tips.inputs().len();
                (&mut self.tips.focus, len)
            }
        };
        if len > 0 {
            *focus = (*focus as i64 + steps).rem_euclid(len as i64) as usize;
        }
    }

    pub fn scroll_grid(&mut self, rows: i64) {
        let (scroll, len) = match self.page {
            Page::Stocks => (&mut self.stocks.grid_scroll, self.stocks.grid.len()),
            Page::Tips => (&mut self.tips.grid_scroll, self.tips.grid.len()),
        };
        let max = len.saturating_sub(1) as i64;
        *scroll = (*scroll as i64 + rows).clamp(0, max) as usize;
    }
}

fn step_bins(bins: usize, steps: i64) -> usize {
    (bins as i64 + steps).clamp(1, 100) as usize
}
