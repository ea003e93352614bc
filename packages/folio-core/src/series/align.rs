//! Alignment of raw symbol history onto the benchmark calendar.

use crate::types::{PriceBar, PriceSeries};
use serde::{Deserialize, Serialize};

/// A symbol's series reindexed onto the master calendar with no missing closes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlignedSeries {
    /// Price series with exactly one bar per calendar date
    pub series: PriceSeries,
    /// Number of calendar dates that had no raw observation
    pub imputed: usize,
}

impl AlignedSeries {
    /// Whether every close was taken from the raw history.
    pub fn is_complete(&self) -> bool {
        self.imputed == 0
    }
}

/// Daily benchmark percentage returns over the calendar; the first day is 0.
pub fn benchmark_returns(calendar: &PriceSeries) -> Vec<f64> {
    let closes = calendar.closes();
    let mut returns = vec![0.0; closes.len()];
    for i in 1..closes.len() {
        if closes[i - 1] != 0.0 {
            returns[i] = closes[i] / closes[i - 1] - 1.0;
        }
    }
    returns
}

/// Median of the values, 0.0 when there are none.
pub(crate) fn median(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Running state of the imputation fold.
#[derive(Debug, Clone, Copy, Default)]
struct Carry {
    /// Last observed or imputed close
    last_close: Option<f64>,
    /// Consecutive missing sessions since the last real observation
    since_observed: Option<usize>,
}

/// Reindex `raw` onto the benchmark calendar and fill every missing close.
///
/// Walks the calendar in order:
/// - a raw bar on the date is kept as-is;
/// - the first `ffill_limit` missing sessions after a real observation carry that close forward;
/// - later missing sessions move the prior close by the benchmark's return for the date;
/// - missing sessions before any observation take the benchmark close itself.
///
/// Imputed bars have open/high/low equal to the close and the median observed volume.
/// An empty raw series degenerates to an exact benchmark proxy.
pub fn align_to_calendar(
    raw: &PriceSeries,
    calendar: &PriceSeries,
    ffill_limit: usize,
) -> AlignedSeries {
    if raw.is_empty() {
        return AlignedSeries {
            series: PriceSeries {
                symbol: raw.symbol.clone(),
                bars: calendar
                    .bars
                    .iter()
                    .map(|b| PriceBar::flat(b.date, b.close, 0.0))
                    .collect(),
            },
            imputed: calendar.len(),
        };
    }

    let observed: Vec<Option<PriceBar>> = calendar
        .bars
        .iter()
        .map(|b| raw.get(b.date).copied())
        .collect();
    let fill_volume = median(observed.iter().flatten().map(|b| b.volume));
    let bench_returns = benchmark_returns(calendar);

    let (bars, _) = calendar
        .bars
        .iter()
        .zip(&observed)
        .zip(&bench_returns)
        .fold(
            (Vec::with_capacity(calendar.len()), Carry::default()),
            |(mut bars, carry), ((bench, obs), &bench_return)| {
                let next = match obs {
                    Some(bar) => {
                        bars.push(*bar);
                        Carry {
                            last_close: Some(bar.close),
                            since_observed: Some(0),
                        }
                    }
                    None => {
                        let close = match (carry.last_close, carry.since_observed) {
                            (Some(prev), Some(gap)) if gap < ffill_limit => prev,
                            (Some(prev), _) => prev * (1.0 + bench_return),
                            (None, _) => bench.close,
                        };
                        bars.push(PriceBar::flat(bench.date, close, fill_volume));
                        Carry {
                            last_close: Some(close),
                            since_observed: carry.since_observed.map(|gap| gap + 1),
                        }
                    }
                };
                (bars, next)
            },
        );

    let imputed = observed.iter().filter(|o| o.is_none()).count();
    if imputed > 0 {
        tracing::debug!(
            "Imputed {} of {} sessions for {}",
            imputed,
            calendar.len(),
            raw.symbol
        );
    }

    AlignedSeries {
        series: PriceSeries {
            symbol: raw.symbol.clone(),
            bars,
        },
        imputed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn calendar() -> PriceSeries {
        PriceSeries::new(
            "^NSEI",
            vec![
                PriceBar::flat(day(1), 100.0, 1000.0),
                PriceBar::flat(day(2), 102.0, 1000.0),
                PriceBar::flat(day(3), 101.0, 1000.0),
                PriceBar::flat(day(4), 105.0, 1000.0),
                PriceBar::flat(day(5), 110.0, 1000.0),
            ],
        )
    }

    fn bar(d: u32, close: f64, volume: f64) -> PriceBar {
        PriceBar {
            date: day(d),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume,
        }
    }

    #[test]
    fn test_benchmark_returns() {
        let returns = benchmark_returns(&calendar());
        assert_eq!(returns[0], 0.0);
        assert_relative_eq!(returns[1], 0.02, epsilon = 1e-12);
        assert_relative_eq!(returns[2], 101.0 / 102.0 - 1.0, epsilon = 1e-12);
        assert_eq!(returns.len(), 5);
    }

    #[test]
    fn test_complete_series_untouched() {
        let raw = PriceSeries::new("TCS", (1..=5).map(|d| bar(d, 50.0 + d as f64, 10.0)).collect());
        let aligned = align_to_calendar(&raw, &calendar(), 1);

        assert!(aligned.is_complete());
        assert_eq!(aligned.series.bars, raw.bars);
    }

    #[test]
    fn test_empty_raw_is_exact_benchmark_proxy() {
        let cal = calendar();
        let aligned = align_to_calendar(&PriceSeries::empty("GHOST"), &cal, 1);

        assert_eq!(aligned.imputed, 5);
        assert_eq!(aligned.series.symbol, "GHOST");
        assert_eq!(aligned.series.dates(), cal.dates());
        assert_eq!(aligned.series.closes(), cal.closes());
        for b in &aligned.series.bars {
            assert_eq!(b.open, b.close);
            assert_eq!(b.high, b.close);
            assert_eq!(b.low, b.close);
        }
    }

    #[test]
    fn test_leading_gap_uses_benchmark_then_returns() {
        let raw = PriceSeries::new("TCS", vec![bar(4, 53.0, 10.0), bar(5, 55.0, 20.0)]);
        let aligned = align_to_calendar(&raw, &calendar(), 1);

        let closes = aligned.series.closes();
        assert_eq!(closes[0], 100.0);
        // Later leading dates follow the benchmark from the proxy start
        assert_relative_eq!(closes[1], 100.0 * 1.02, epsilon = 1e-9);
        assert_relative_eq!(closes[2], 102.0 * (101.0 / 102.0), epsilon = 1e-9);
        assert_eq!(closes[3], 53.0);
        assert_eq!(closes[4], 55.0);
        assert_eq!(aligned.imputed, 3);
    }

    #[test]
    fn test_interior_gap_carries_then_imputes() {
        let raw = PriceSeries::new(
            "TCS",
            vec![bar(1, 50.0, 10.0), bar(4, 53.0, 30.0), bar(5, 54.0, 20.0)],
        );
        let aligned = align_to_calendar(&raw, &calendar(), 1);
        let closes = aligned.series.closes();

        assert_eq!(closes[0], 50.0);
        // First missing session is forward-filled
        assert_eq!(closes[1], 50.0);
        // Second is moved by the benchmark's return for that day
        assert_relative_eq!(closes[2], 50.0 * (101.0 / 102.0), epsilon = 1e-12);
        assert_eq!(closes[3], 53.0);
        assert_eq!(aligned.imputed, 2);
    }

    #[test]
    fn test_zero_ffill_limit_imputes_immediately() {
        let raw = PriceSeries::new("TCS", vec![bar(1, 50.0, 10.0)]);
        let aligned = align_to_calendar(&raw, &calendar(), 0);
        assert_relative_eq!(aligned.series.bars[1].close, 51.0, epsilon = 1e-12);
    }

    #[test]
    fn test_imputed_bars_flat_with_median_volume() {
        let raw = PriceSeries::new(
            "TCS",
            vec![bar(1, 50.0, 10.0), bar(4, 53.0, 30.0), bar(5, 54.0, 20.0)],
        );
        let aligned = align_to_calendar(&raw, &calendar(), 1);

        let filled = aligned.series.bars[2];
        assert_eq!(filled.open, filled.close);
        assert_eq!(filled.high, filled.close);
        assert_eq!(filled.low, filled.close);
        assert_eq!(filled.volume, 20.0);
        // Observed bars keep their own intraday range
        assert_eq!(aligned.series.bars[3].high, 54.0);
    }

    #[test]
    fn test_dates_outside_calendar_dropped() {
        let raw = PriceSeries::new("TCS", (1..=7).map(|d| bar(d, 50.0, 10.0)).collect());
        let aligned = align_to_calendar(&raw, &calendar(), 1);
        assert_eq!(aligned.series.len(), 5);
        assert!(aligned.is_complete());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(median(Vec::new()), 0.0);
    }
}
