//! Portfolio analytics module.
//!
//! Provides the performance engine, risk metrics, and snapshot allocation analytics.

mod allocation;
mod performance;
mod risk;

pub use allocation::{
    remove_holding, upsert_holding, weighted_returns, Allocation, AllocationSummary,
    ConcentrationRisk,
};
pub use performance::{PerformanceEngine, PerformanceOutcome, PerformanceReport, Warning};
pub use risk::{
    beta, compute_metrics, correlation, daily_returns, max_drawdown, one_year_return,
    sharpe_ratio, value_at_risk, volatility, window_returns,
};
