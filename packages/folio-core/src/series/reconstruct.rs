//! Portfolio and benchmark value series reconstruction.

use crate::types::{PriceSeries, ValueSeries};
use serde::{Deserialize, Serialize};

/// Weight sums this close to 1 are treated as full coverage.
const WEIGHT_TOLERANCE: f64 = 1e-9;

/// A symbol's price series with its static portfolio weight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightedSeries {
    pub series: PriceSeries,
    pub weight: f64,
}

impl WeightedSeries {
    pub fn new(series: PriceSeries, weight: f64) -> Self {
        Self { series, weight }
    }

    /// First strictly positive close, the base for cumulative returns.
    fn base_close(&self) -> Option<f64> {
        self.series.bars.iter().map(|b| b.close).find(|c| *c > 0.0)
    }
}

/// Portfolio and benchmark value series on the same calendar.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReconstructedValues {
    pub portfolio: ValueSeries,
    pub benchmark: ValueSeries,
}

/// Benchmark value: `initial_value * close(t) / close(t0)`.
pub fn benchmark_values(calendar: &PriceSeries, initial_value: f64) -> ValueSeries {
    let closes = calendar.closes();
    let base = closes.first().copied().unwrap_or(0.0);

    let values: Vec<f64> = closes
        .iter()
        .map(|&close| {
            if base > 0.0 {
                (initial_value * close / base).max(0.0)
            } else {
                initial_value
            }
        })
        .collect();

    ValueSeries::from_parts(&calendar.dates(), &values)
}

/// Rebuild portfolio and benchmark values from aligned holdings.
///
/// On each calendar date every holding with a bar contributes
/// `weight * initial_value * cumulative_return`, where the cumulative return runs
/// from the holding's own first positive close. When the contributing weights do
/// not sum to 1 the excess over `initial_value` is divided by their sum; when
/// nothing contributes the date falls back to `initial_value`.
///
/// The rescaling is an approximation for uneven coverage, not an exact
/// attribution: it assumes the missing holdings would have performed like the
/// covered ones on that date.
pub fn reconstruct_values(
    calendar: &PriceSeries,
    holdings: &[WeightedSeries],
    initial_value: f64,
) -> ReconstructedValues {
    let bases: Vec<Option<f64>> = holdings.iter().map(WeightedSeries::base_close).collect();

    let values: Vec<f64> = calendar
        .bars
        .iter()
        .map(|bench| {
            let (excess, total_weight) = holdings.iter().zip(&bases).fold(
                (0.0, 0.0),
                |(excess, total_weight), (holding, base)| match (base, holding.series.get(bench.date)) {
                    (Some(base), Some(bar)) => (
                        excess + holding.weight * initial_value * (bar.close / base - 1.0),
                        total_weight + holding.weight,
                    ),
                    _ => (excess, total_weight),
                },
            );

            let value = if total_weight == 0.0 {
                initial_value
            } else if (total_weight - 1.0).abs() > WEIGHT_TOLERANCE {
                initial_value + excess / total_weight
            } else {
                initial_value + excess
            };
            value.max(0.0)
        })
        .collect();

    ReconstructedValues {
        portfolio: ValueSeries::from_parts(&calendar.dates(), &values),
        benchmark: benchmark_values(calendar, initial_value),
    }
}
