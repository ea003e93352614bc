//! Portfolio performance analytics.

use super::risk::compute_metrics;
use crate::config::AnalyticsConfig;
use crate::series::{align_to_calendar, reconstruct_values, synthetic_series, WeightedSeries};
use crate::source::PriceSource;
use crate::types::{holding_weights, total_value, Holding, MetricsResult, PriceSeries, ValueSeries};
use crate::{Error, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A data-quality condition absorbed during a computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The price source returned an error for the symbol
    FetchFailed { symbol: String, reason: String },
    /// No data at all; a seeded synthetic proxy was substituted
    SyntheticSubstitution { symbol: String },
    /// No data at all; the benchmark closes were used directly
    BenchmarkProxy { symbol: String },
    /// Some calendar dates were filled by imputation
    Imputed { symbol: String, dates: usize },
    /// Holdings have zero total value, so every weight is zero
    ZeroTotalValue,
}

/// Value series and metrics of one computation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PerformanceReport {
    pub portfolio_series: ValueSeries,
    pub benchmark_series: ValueSeries,
    pub metrics: MetricsResult,
}

impl PerformanceReport {
    /// Report for an empty portfolio: no series, neutral metrics.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Result of a computation, tagged by whether any data was substituted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PerformanceOutcome {
    /// Every holding was computed from its own complete history
    Complete { report: PerformanceReport },
    /// Computed, but with imputed or substituted data
    Degraded {
        report: PerformanceReport,
        warnings: Vec<Warning>,
    },
}

impl PerformanceOutcome {
    fn from_parts(report: PerformanceReport, warnings: Vec<Warning>) -> Self {
        if warnings.is_empty() {
            Self::Complete { report }
        } else {
            Self::Degraded { report, warnings }
        }
    }

    pub fn report(&self) -> &PerformanceReport {
        match self {
            Self::Complete { report } | Self::Degraded { report, .. } => report,
        }
    }

    pub fn into_report(self) -> PerformanceReport {
        match self {
            Self::Complete { report } | Self::Degraded { report, .. } => report,
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        match self {
            Self::Complete { .. } => &[],
            Self::Degraded { warnings, .. } => warnings,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Performance analytics over an injected price source.
#[derive(Debug)]
pub struct PerformanceEngine<S> {
    source: S,
    config: AnalyticsConfig,
}

impl<S: PriceSource> PerformanceEngine<S> {
    /// Create an engine with the default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, AnalyticsConfig::default())
    }

    /// Create an engine with a custom configuration.
    pub fn with_config(source: S, config: AnalyticsConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Compute performance over the configured lookback ending today.
    ///
    /// Fails with [`Error::InvalidOperation`] when `lookback_days` is out of range.
    pub fn compute_performance(&self, holdings: &[Holding]) -> Result<PerformanceOutcome> {
        let end = Utc::now().date_naive();
        let start = self.config.lookback_start(end)?;
        self.compute_performance_between(holdings, start, end)
    }

    /// Compute performance over an explicit inclusive date range.
    ///
    /// Fails only when the benchmark history is unavailable. Per-symbol failures and
    /// gaps are recovered locally and reported as warnings on a degraded outcome.
    pub fn compute_performance_between(
        &self,
        holdings: &[Holding],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PerformanceOutcome> {
        if holdings.is_empty() {
            return Ok(PerformanceOutcome::Complete {
                report: PerformanceReport::empty(),
            });
        }

        tracing::info!(
            "Computing performance for {} holdings from {} to {}",
            holdings.len(),
            start,
            end
        );

        let calendar = self
            .source
            .fetch_benchmark_history(start, end)
            .map_err(|e| {
                Error::BenchmarkUnavailable(format!("{}: {}", self.config.benchmark, e))
            })?;
        if calendar.is_empty() {
            return Err(Error::BenchmarkUnavailable(format!(
                "{}: no history between {} and {}",
                self.config.benchmark, start, end
            )));
        }

        let mut warnings = Vec::new();
        if total_value(holdings) <= 0.0 {
            tracing::warn!("Holdings have zero total value");
            warnings.push(Warning::ZeroTotalValue);
        }

        let weights = holding_weights(holdings);
        let prepared = self.prepare_holdings(holdings, &weights, &calendar, start, end);

        let mut weighted = Vec::with_capacity(prepared.len());
        for (series, holding_warnings) in prepared {
            weighted.push(series);
            warnings.extend(holding_warnings);
        }

        let values = reconstruct_values(&calendar, &weighted, self.config.initial_value);
        let metrics = compute_metrics(&values.portfolio, &values.benchmark, &self.config);

        tracing::info!(
            "Computed {} sessions with {} warnings",
            calendar.len(),
            warnings.len()
        );

        Ok(PerformanceOutcome::from_parts(
            PerformanceReport {
                portfolio_series: values.portfolio,
                benchmark_series: values.benchmark,
                metrics,
            },
            warnings,
        ))
    }

    #[cfg(not(feature = "parallel"))]
    fn prepare_holdings(
        &self,
        holdings: &[Holding],
        weights: &[f64],
        calendar: &PriceSeries,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<(WeightedSeries, Vec<Warning>)> {
        holdings
            .iter()
            .zip(weights)
            .map(|(holding, &weight)| self.prepare_holding(holding, weight, calendar, start, end))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn prepare_holdings(
        &self,
        holdings: &[Holding],
        weights: &[f64],
        calendar: &PriceSeries,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<(WeightedSeries, Vec<Warning>)> {
        use rayon::prelude::*;

        holdings
            .par_iter()
            .zip(weights.par_iter())
            .map(|(holding, &weight)| self.prepare_holding(holding, weight, calendar, start, end))
            .collect()
    }

    /// Fetch, substitute if needed, and align one holding onto the calendar.
    fn prepare_holding(
        &self,
        holding: &Holding,
        weight: f64,
        calendar: &PriceSeries,
        start: NaiveDate,
        end: NaiveDate,
    ) -> (WeightedSeries, Vec<Warning>) {
        let symbol = holding.symbol.as_str();
        let mut warnings = Vec::new();

        let raw = match self.source.fetch_history(symbol, start, end) {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!("Failed to fetch history for {}: {}", symbol, e);
                warnings.push(Warning::FetchFailed {
                    symbol: symbol.to_string(),
                    reason: e.to_string(),
                });
                PriceSeries::empty(symbol)
            }
        };

        let raw = if !raw.is_empty() {
            raw
        } else if self.config.synthetic_fallback {
            tracing::warn!("No history for {}, substituting synthetic proxy", symbol);
            warnings.push(Warning::SyntheticSubstitution {
                symbol: symbol.to_string(),
            });
            synthetic_series(symbol, calendar)
        } else {
            tracing::warn!("No history for {}, using benchmark as proxy", symbol);
            warnings.push(Warning::BenchmarkProxy {
                symbol: symbol.to_string(),
            });
            raw
        };

        let aligned = align_to_calendar(&raw, calendar, self.config.ffill_limit);
        if !raw.is_empty() && !aligned.is_complete() {
            warnings.push(Warning::Imputed {
                symbol: symbol.to_string(),
                dates: aligned.imputed,
            });
        }

        (WeightedSeries::new(aligned.series, weight), warnings)
    }
}
