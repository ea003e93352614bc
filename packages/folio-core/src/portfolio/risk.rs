//! Portfolio risk and return metrics.
//!
//! Provides annualized return, volatility, Sharpe ratio, max drawdown, beta,
//! historical VaR and benchmark correlation over value series.

use crate::config::AnalyticsConfig;
use crate::types::{MetricsResult, ValueSeries};

/// Standard deviations below this are treated as zero.
const ZERO_STD: f64 = 1e-12;

/// Simple period-over-period returns, `V(t) / V(t-1) - 1` for `t >= 1`.
///
/// A zero prior value yields a 0.0 return for that period.
pub fn daily_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| if w[0] > 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Returns inside the metric window: the trailing `trading_days` returns when the
/// series holds more than `trading_days` points, otherwise all of them.
pub fn window_returns(values: &[f64], trading_days: usize) -> Vec<f64> {
    let returns = daily_returns(values);
    if values.len() > trading_days {
        returns[returns.len() - trading_days..].to_vec()
    } else {
        returns
    }
}

/// One-year return percentage.
///
/// With more than `trading_days` points this is the trailing one-year return;
/// otherwise the whole-sample return annualized as
/// `(V_last / V_first)^(trading_days / n) - 1` with `n` the number of points.
pub fn one_year_return(values: &[f64], trading_days: usize) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let last = values[n - 1];
    if n > trading_days {
        let anchor = values[n - 1 - trading_days];
        if anchor <= 0.0 {
            return 0.0;
        }
        return (last / anchor - 1.0) * 100.0;
    }

    let first = values[0];
    if first <= 0.0 {
        return 0.0;
    }
    ((last / first).powf(trading_days as f64 / n as f64) - 1.0) * 100.0
}

/// Annualized volatility percentage of daily returns.
pub fn volatility(returns: &[f64], trading_days: usize) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    std_dev(returns) * (trading_days as f64).sqrt() * 100.0
}

/// Annualized Sharpe ratio of daily returns against an annual risk-free rate.
///
/// Returns 0.0 when the excess returns have no dispersion.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64, trading_days: usize) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }

    let daily_rf = risk_free_rate / trading_days as f64;
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();
    let std = std_dev(&excess);

    if std <= ZERO_STD {
        return 0.0;
    }

    mean(&excess) / std * (trading_days as f64).sqrt()
}

/// Maximum drawdown percentage of a value series.
///
/// The most negative `(V(t) - peak(t)) / peak(t)`, so always <= 0.
///
/// ```rust
/// use folio_core::portfolio::max_drawdown;
///
/// let values = vec![100.0, 120.0, 90.0, 130.0];
/// // Trough 90 against the 120 peak
/// assert!((max_drawdown(&values) + 25.0).abs() < 1e-9);
/// ```
pub fn max_drawdown(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let mut running_max = values[0];
    let mut worst = 0.0_f64;

    for &value in values {
        if value > running_max {
            running_max = value;
        }
        if running_max > 0.0 {
            worst = worst.min((value - running_max) / running_max);
        }
    }

    worst * 100.0
}

/// Pearson correlation of two equal-length return series.
///
/// 0.0 on length mismatch, fewer than two points, or a flat series.
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.len() < 2 {
        return 0.0;
    }

    let (mean_a, mean_b) = (mean(a), mean(b));
    let (std_a, std_b) = (std_dev(a), std_dev(b));
    if std_a <= ZERO_STD || std_b <= ZERO_STD {
        return 0.0;
    }

    let covariance = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>()
        / a.len() as f64;

    covariance / (std_a * std_b)
}

/// Beta of portfolio returns against benchmark returns.
///
/// 1.0 on length mismatch, fewer than two points, or a flat benchmark.
pub fn beta(portfolio: &[f64], benchmark: &[f64]) -> f64 {
    if portfolio.len() != benchmark.len() || portfolio.len() < 2 {
        return 1.0;
    }

    let std_benchmark = std_dev(benchmark);
    if std_benchmark <= ZERO_STD {
        return 1.0;
    }

    correlation(portfolio, benchmark) * std_dev(portfolio) / std_benchmark
}

/// Historical Value at Risk.
///
/// Sorts the returns ascending and picks index `floor((1 - confidence) * n)`.
/// Returns `(return_percent, currency_value)` where the currency value is that
/// return applied to `portfolio_value`; both are negative for a loss.
pub fn value_at_risk(returns: &[f64], confidence: f64, portfolio_value: f64) -> (f64, f64) {
    if returns.is_empty() {
        return (0.0, 0.0);
    }

    let mut sorted = returns.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let idx = (((1.0 - confidence) * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    let var_return = sorted[idx];

    (var_return * 100.0, var_return * portfolio_value)
}

/// Compute the full metric set for a portfolio against its benchmark.
///
/// Series with fewer than two points produce [`MetricsResult::neutral`].
pub fn compute_metrics(
    portfolio: &ValueSeries,
    benchmark: &ValueSeries,
    config: &AnalyticsConfig,
) -> MetricsResult {
    if portfolio.len() < 2 {
        return MetricsResult::neutral();
    }

    let values = portfolio.values();
    let days = config.trading_days;
    let window = window_returns(&values, days);

    let portfolio_returns = daily_returns(&values);
    let benchmark_returns = daily_returns(&benchmark.values());

    let current_value = portfolio.last_value().unwrap_or(0.0);
    let (var_percent, var_value) = value_at_risk(&window, config.var_confidence, current_value);

    MetricsResult {
        one_year_return: one_year_return(&values, days),
        volatility: volatility(&window, days),
        sharpe_ratio: sharpe_ratio(&window, config.risk_free_rate, days),
        max_drawdown: max_drawdown(&values),
        beta: beta(&portfolio_returns, &benchmark_returns),
        var_percent,
        var_value,
        correlation: correlation(&portfolio_returns, &benchmark_returns),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn value_series(values: &[f64]) -> ValueSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let dates: Vec<NaiveDate> = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        ValueSeries::from_parts(&dates, values)
    }

    /// Compounds a repeating pattern of daily returns from 100.
    fn compounded(pattern: &[f64], n: usize) -> Vec<f64> {
        let mut values = vec![100.0];
        for i in 0..n - 1 {
            let prev = values[values.len() - 1];
            values.push(prev * (1.0 + pattern[i % pattern.len()]));
        }
        values
    }

    #[test]
    fn test_daily_returns() {
        let returns = daily_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert_relative_eq!(returns[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(returns[1], -0.1, epsilon = 1e-12);
        assert_eq!(daily_returns(&[0.0, 5.0]), vec![0.0]);
        assert!(daily_returns(&[1.0]).is_empty());
    }

    #[test]
    fn test_one_year_return_trailing_window() {
        let mut values = vec![50.0; 10];
        values.extend(vec![100.0; 252]);
        values.push(110.0);
        // 263 points: anchor sits 252 sessions before the last
        assert_relative_eq!(one_year_return(&values, 252), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_one_year_return_annualized_short_sample() {
        let values = compounded(&[0.001], 126);
        let expected = ((values[125] / values[0]).powf(252.0 / 126.0) - 1.0) * 100.0;
        assert_relative_eq!(one_year_return(&values, 252), expected, epsilon = 1e-9);
        assert!(one_year_return(&values, 252) > 0.0);
    }

    #[test]
    fn test_window_returns_trailing() {
        let values = compounded(&[0.01, -0.01], 300);
        assert_eq!(window_returns(&values, 252).len(), 252);
        assert_eq!(window_returns(&values[..100], 252).len(), 99);
    }

    #[test]
    fn test_volatility() {
        let returns = vec![0.01, -0.01, 0.02, -0.02, 0.01, -0.01, 0.015, -0.015, 0.005, -0.005];
        let vol = volatility(&returns, 252);
        // For these returns, annualized vol should be roughly 15-25%
        assert!(vol > 10.0);
        assert!(vol < 50.0);
        assert_eq!(volatility(&[], 252), 0.0);
    }

    #[test]
    fn test_sharpe_zero_when_constant_returns() {
        let constant = vec![0.001; 100];
        assert_eq!(sharpe_ratio(&constant, 0.0725, 252), 0.0);
        assert!(!sharpe_ratio(&constant, 0.0725, 252).is_nan());
    }

    #[test]
    fn test_sharpe_sign() {
        let good: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 0.004 } else { 0.002 }).collect();
        assert!(sharpe_ratio(&good, 0.04, 252) > 0.0);

        let bad: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { -0.004 } else { -0.002 }).collect();
        assert!(sharpe_ratio(&bad, 0.04, 252) < 0.0);
    }

    #[test]
    fn test_sharpe_value() {
        let returns = vec![0.01, -0.01];
        // Excess mean -0.0001 with std 0.01
        let sharpe = sharpe_ratio(&returns, 0.0252, 252);
        assert_relative_eq!(sharpe, -0.01 * 252.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_max_drawdown() {
        let values = vec![100.0, 110.0, 115.5, 98.175, 88.3575, 92.775375];
        let mdd = max_drawdown(&values);
        // (88.3575 - 115.5) / 115.5
        assert_relative_eq!(mdd, (88.3575 / 115.5 - 1.0) * 100.0, epsilon = 1e-9);
        assert!(mdd < 0.0);
    }

    #[test]
    fn test_max_drawdown_non_decreasing_is_zero() {
        assert_eq!(max_drawdown(&[100.0, 100.0, 101.0, 105.0, 105.0]), 0.0);
        assert_eq!(max_drawdown(&[100.0]), 0.0);
    }

    #[test]
    fn test_max_drawdown_never_positive() {
        let values = compounded(&[0.03, -0.02, 0.01, -0.04], 200);
        assert!(max_drawdown(&values) <= 0.0);
    }

    #[test]
    fn test_correlation() {
        let a = vec![0.01, -0.02, 0.03, 0.0];
        let b: Vec<f64> = a.iter().map(|x| 2.0 * x + 0.001).collect();
        let c: Vec<f64> = a.iter().map(|x| -x).collect();

        assert_relative_eq!(correlation(&a, &b), 1.0, epsilon = 1e-9);
        assert_relative_eq!(correlation(&a, &c), -1.0, epsilon = 1e-9);
        assert_eq!(correlation(&a, &b[..3]), 0.0);
        assert_eq!(correlation(&a[..1], &b[..1]), 0.0);
    }

    #[test]
    fn test_beta() {
        let bench = vec![0.01, -0.02, 0.03, 0.0];
        let levered: Vec<f64> = bench.iter().map(|x| 1.5 * x).collect();

        assert_relative_eq!(beta(&levered, &bench), 1.5, epsilon = 1e-9);
        assert_eq!(beta(&levered, &[0.01, 0.01, 0.01, 0.01]), 1.0);
        assert_eq!(beta(&levered, &bench[..2]), 1.0);
        assert_eq!(beta(&[0.01], &[0.02]), 1.0);
    }

    #[test]
    fn test_value_at_risk_picks_first_percentile() {
        // -0.050, -0.049, ..., 0.049 in scrambled order
        let returns: Vec<f64> = (0..100)
            .map(|i| ((i * 37) % 100) as f64 / 1000.0 - 0.05)
            .collect();

        let mut sorted = returns.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_relative_eq!(sorted[0], -0.050, epsilon = 1e-12);
        assert_relative_eq!(sorted[1], -0.049, epsilon = 1e-12);

        let (pct, value) = value_at_risk(&returns, 0.99, 200_000.0);
        assert_relative_eq!(pct, sorted[1] * 100.0, epsilon = 1e-12);
        assert_relative_eq!(value, sorted[1] * 200_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_value_at_risk_small_sample_and_empty() {
        let (pct, _) = value_at_risk(&[0.02, -0.03, 0.01], 0.99, 1000.0);
        assert_relative_eq!(pct, -3.0, epsilon = 1e-12);
        assert_eq!(value_at_risk(&[], 0.99, 1000.0), (0.0, 0.0));
    }

    #[test]
    fn test_compute_metrics_neutral_for_short_series() {
        let config = AnalyticsConfig::default();
        let single = value_series(&[100_000.0]);
        assert_eq!(
            compute_metrics(&single, &single, &config),
            MetricsResult::neutral()
        );
        assert_eq!(
            compute_metrics(&ValueSeries::default(), &ValueSeries::default(), &config),
            MetricsResult::neutral()
        );
    }

    #[test]
    fn test_compute_metrics_identical_series() {
        let config = AnalyticsConfig::default();
        let values = compounded(&[0.01, -0.005, 0.007, -0.012], 60);
        let series = value_series(&values);

        let metrics = compute_metrics(&series, &series, &config);

        assert_relative_eq!(metrics.beta, 1.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.correlation, 1.0, epsilon = 1e-9);
        assert!(metrics.volatility > 0.0);
        assert!(metrics.max_drawdown < 0.0);
        assert!(metrics.var_percent < 0.0);
        assert_relative_eq!(
            metrics.var_value,
            metrics.var_percent / 100.0 * values[59],
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_compute_metrics_length_mismatch_defaults() {
        let config = AnalyticsConfig::default();
        let portfolio = value_series(&compounded(&[0.01, -0.02], 10));
        let benchmark = value_series(&compounded(&[0.01, -0.02], 8));

        let metrics = compute_metrics(&portfolio, &benchmark, &config);
        assert_eq!(metrics.beta, 1.0);
        assert_eq!(metrics.correlation, 0.0);
    }
}
