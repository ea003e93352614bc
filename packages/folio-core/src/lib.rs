//! Folio Core - Portfolio performance analytics library.
//!
//! This crate reconstructs a portfolio's value history against a market benchmark
//! and derives its risk/return profile:
//!
//! - **Series preparation**: benchmark-calendar alignment, imputation, synthetic proxies
//! - **Performance engine**: portfolio and benchmark value series from weighted holdings
//! - **Risk metrics**: return, volatility, Sharpe ratio, drawdown, beta, VaR, correlation
//! - **Allocation**: concentration risk and diversification of a holdings snapshot
//! - **Leverage**: levered long/short and long-only two-asset analysis
//!
//! # Example
//!
//! ```rust,no_run
//! use folio_core::{Holding, JsonPriceSource, PerformanceEngine};
//! use std::path::Path;
//!
//! let source = JsonPriceSource::from_path(Path::new("prices.json"))?;
//! let engine = PerformanceEngine::new(source);
//!
//! let holdings = vec![Holding::new("TCS.NS", 10, 3500.0), Holding::new("INFY.NS", 20, 1500.0)];
//! let outcome = engine.compute_performance(&holdings)?;
//!
//! println!("Sharpe: {:.2}", outcome.report().metrics.sharpe_ratio);
//! for warning in outcome.warnings() {
//!     println!("warning: {:?}", warning);
//! }
//! # Ok::<(), folio_core::Error>(())
//! ```

pub mod config;
pub mod leverage;
pub mod portfolio;
pub mod series;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use config::AnalyticsConfig;
pub use types::{
    holding_weights, total_value, ApiResponse, Holding, MetricsResult, PriceBar, PriceSeries,
    ValuePoint, ValueSeries,
};

// Re-export main functionality
pub use leverage::{
    simulate_sample, FrontierPoint, LeverageCharacteristics, LeveragedPortfolio, SampleParams,
    TwoAssetSummary,
};
pub use portfolio::{
    compute_metrics, AllocationSummary, ConcentrationRisk, PerformanceEngine, PerformanceOutcome,
    PerformanceReport, Warning,
};
pub use series::{align_to_calendar, reconstruct_values, synthetic_series, AlignedSeries};
pub use source::{InMemoryPriceSource, JsonPriceSource, PriceSource};

/// Error types for folio-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Benchmark unavailable: {0}")]
    BenchmarkUnavailable(String),

    #[error("Price source error: {0}")]
    PriceSource(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for folio-core operations.
pub type Result<T> = std::result::Result<T, Error>;
