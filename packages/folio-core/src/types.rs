//! Core data types for the folio analytics engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A holding in the portfolio snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    /// Ticker symbol (uppercase)
    pub symbol: String,
    /// Number of shares held
    pub quantity: u64,
    /// Last known price per share
    pub price: f64,
    /// One-day return percentage reported with the quote
    #[serde(default)]
    pub day_return: f64,
    /// One-year return percentage reported with the quote
    #[serde(default)]
    pub year_return: f64,
}

impl Holding {
    /// Create a new holding with the given symbol, quantity, and price.
    pub fn new(symbol: &str, quantity: u64, price: f64) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            quantity,
            price,
            day_return: 0.0,
            year_return: 0.0,
        }
    }

    /// Attach the quote's day and year return percentages.
    pub fn with_returns(mut self, day_return: f64, year_return: f64) -> Self {
        self.day_return = day_return;
        self.year_return = year_return;
        self
    }

    /// Market value of the holding (price * quantity), never negative.
    pub fn value(&self) -> f64 {
        (self.price * self.quantity as f64).max(0.0)
    }
}

/// Total market value of a list of holdings.
pub fn total_value(holdings: &[Holding]) -> f64 {
    holdings.iter().map(Holding::value).sum()
}

/// Static portfolio weights (value / total value), in holdings order.
///
/// Returns all zeros when the total value is zero.
pub fn holding_weights(holdings: &[Holding]) -> Vec<f64> {
    let total = total_value(holdings);
    if total <= 0.0 {
        return vec![0.0; holdings.len()];
    }
    holdings.iter().map(|h| h.value() / total).collect()
}

/// A daily OHLCV observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl PriceBar {
    /// A bar whose open, high and low all equal the close.
    pub fn flat(date: NaiveDate, close: f64, volume: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }
}

/// A daily price series ordered by strictly increasing date.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, sorting bars by date and dropping duplicate dates (first one wins).
    pub fn new(symbol: &str, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self {
            symbol: symbol.to_uppercase(),
            bars,
        }
    }

    /// An empty series for a symbol.
    pub fn empty(symbol: &str) -> Self {
        Self::new(symbol, Vec::new())
    }

    /// Build a series of flat bars from (date, close) pairs.
    pub fn from_closes(symbol: &str, closes: &[(NaiveDate, f64)]) -> Self {
        Self::new(
            symbol,
            closes
                .iter()
                .map(|&(date, close)| PriceBar::flat(date, close, 0.0))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Trading dates of the series.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Close prices of the series.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Look up the bar for a date.
    pub fn get(&self, date: NaiveDate) -> Option<&PriceBar> {
        self.bars
            .binary_search_by_key(&date, |b| b.date)
            .ok()
            .map(|idx| &self.bars[idx])
    }

    /// Restrict the series to the inclusive date range.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: self.symbol.clone(),
            bars: self
                .bars
                .iter()
                .filter(|b| b.date >= start && b.date <= end)
                .copied()
                .collect(),
        }
    }
}

/// A single point of a value series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A value series aligned 1:1 with the master calendar.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ValueSeries {
    pub points: Vec<ValuePoint>,
}

impl ValueSeries {
    /// Zip a calendar with values. Extra entries on either side are ignored.
    pub fn from_parts(dates: &[NaiveDate], values: &[f64]) -> Self {
        Self {
            points: dates
                .iter()
                .zip(values)
                .map(|(&date, &value)| ValuePoint { date, value })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Most recent value, if any.
    pub fn last_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }
}

/// Risk/return statistics for one portfolio against its benchmark.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricsResult {
    /// One-year (or annualized whole-sample) return percentage
    pub one_year_return: f64,
    /// Annualized volatility percentage
    pub volatility: f64,
    /// Annualized Sharpe ratio
    pub sharpe_ratio: f64,
    /// Maximum drawdown percentage (non-positive)
    pub max_drawdown: f64,
    /// Beta against the benchmark
    pub beta: f64,
    /// Value at Risk as a return percentage
    pub var_percent: f64,
    /// Value at Risk in currency units
    pub var_value: f64,
    /// Pearson correlation with the benchmark
    pub correlation: f64,
}

impl MetricsResult {
    /// Economically neutral metrics for an empty or degenerate portfolio.
    pub fn neutral() -> Self {
        Self {
            one_year_return: 0.0,
            volatility: 0.0,
            sharpe_ratio: 0.0,
            max_drawdown: 0.0,
            beta: 1.0,
            var_percent: 0.0,
            var_value: 0.0,
            correlation: 0.0,
        }
    }
}

impl Default for MetricsResult {
    fn default() -> Self {
        Self::neutral()
    }
}

/// API response wrapper for success cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
