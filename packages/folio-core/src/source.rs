//! Historical price sources.
//!
//! The engine never talks to a market-data vendor directly; it is handed a
//! [`PriceSource`]. Implementations should return an empty or partial series
//! when data is missing and reserve `Err` for genuine failures.

use crate::types::{PriceBar, PriceSeries};
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Supplier of daily OHLCV history.
pub trait PriceSource: Send + Sync {
    /// History for one symbol over the inclusive date range.
    fn fetch_history(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<PriceSeries>;

    /// History of the configured benchmark index over the inclusive date range.
    fn fetch_benchmark_history(&self, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries>;
}

/// Price source backed by bars held in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryPriceSource {
    /// Benchmark symbol, looked up in `series`
    pub benchmark: String,
    /// Bars keyed by symbol
    #[serde(default)]
    pub series: HashMap<String, Vec<PriceBar>>,
}

impl InMemoryPriceSource {
    /// Create an empty source for the given benchmark symbol.
    pub fn new(benchmark: &str) -> Self {
        Self {
            benchmark: benchmark.to_uppercase(),
            series: HashMap::new(),
        }
    }

    /// Add (or replace) a symbol's bars.
    pub fn with_series(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.insert(symbol, bars);
        self
    }

    /// Add (or replace) a symbol's bars.
    pub fn insert(&mut self, symbol: &str, bars: Vec<PriceBar>) {
        self.series.insert(symbol.to_uppercase(), bars);
    }

    fn lookup(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> PriceSeries {
        let symbol = symbol.to_uppercase();
        match self.series.get(&symbol) {
            Some(bars) => PriceSeries::new(&symbol, bars.clone()).between(start, end),
            None => PriceSeries::empty(&symbol),
        }
    }
}

impl PriceSource for InMemoryPriceSource {
    fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        Ok(self.lookup(symbol, start, end))
    }

    fn fetch_benchmark_history(&self, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        Ok(self.lookup(&self.benchmark, start, end))
    }
}

/// Price source loaded from a JSON snapshot file.
///
/// Format: `{"benchmark": "^NSEI", "series": {"SYM": [{"date": "2024-01-02", "open": .., "high": .., "low": .., "close": .., "volume": ..}]}}`
#[derive(Debug, Clone)]
pub struct JsonPriceSource {
    inner: InMemoryPriceSource,
}

impl JsonPriceSource {
    /// Load a snapshot from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: InMemoryPriceSource = serde_json::from_str(content)?;
        // Normalize keys so lookups are case-insensitive.
        let mut inner = InMemoryPriceSource::new(&raw.benchmark);
        for (symbol, bars) in raw.series {
            inner.insert(&symbol, bars);
        }
        Ok(Self { inner })
    }

    /// Benchmark symbol declared by the snapshot.
    pub fn benchmark(&self) -> &str {
        &self.inner.benchmark
    }
}

impl PriceSource for JsonPriceSource {
    fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        self.inner.fetch_history(symbol, start, end)
    }

    fn fetch_benchmark_history(&self, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        self.inner.fetch_benchmark_history(start, end)
    }
}
