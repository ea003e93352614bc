//! Snapshot allocation analytics.

use crate::types::{holding_weights, total_value, Holding};
use serde::{Deserialize, Serialize};

/// Concentration risk derived from the largest single allocation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationRisk {
    High,
    Medium,
    Low,
    NotApplicable,
}

impl ConcentrationRisk {
    /// Classify the largest allocation percentage: above 30% is high, above 20% medium.
    pub fn from_max_allocation(max_allocation_pct: f64) -> Self {
        if max_allocation_pct > 30.0 {
            Self::High
        } else if max_allocation_pct > 20.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Per-symbol share of portfolio value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Allocation {
    pub symbol: String,
    pub value: f64,
    /// Percentage of total value (0-100)
    pub percent: f64,
}

/// Allocation summary of a holdings snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationSummary {
    pub total_value: f64,
    pub asset_count: usize,
    pub allocations: Vec<Allocation>,
    pub risk_level: ConcentrationRisk,
    /// 0-100, higher is closer to equal weighting
    pub diversification_score: f64,
    pub largest_holding: Option<String>,
    pub largest_holding_pct: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl AllocationSummary {
    /// Summarize allocation and concentration of the holdings.
    pub fn from_holdings(holdings: &[Holding]) -> Self {
        if holdings.is_empty() {
            return Self {
                total_value: 0.0,
                asset_count: 0,
                allocations: Vec::new(),
                risk_level: ConcentrationRisk::NotApplicable,
                diversification_score: 0.0,
                largest_holding: None,
                largest_holding_pct: 0.0,
            };
        }

        let total = total_value(holdings);
        let allocations: Vec<Allocation> = holdings
            .iter()
            .zip(holding_weights(holdings))
            .map(|(h, w)| Allocation {
                symbol: h.symbol.clone(),
                value: h.value(),
                percent: w * 100.0,
            })
            .collect();

        let ideal = 100.0 / allocations.len() as f64;
        let mean_deviation = allocations
            .iter()
            .map(|a| (a.percent - ideal).abs())
            .sum::<f64>()
            / allocations.len() as f64;

        // First maximum wins on ties.
        let largest = allocations
            .iter()
            .fold(None::<&Allocation>, |best, a| match best {
                Some(b) if b.percent >= a.percent => Some(b),
                _ => Some(a),
            });
        let max_pct = largest.map(|a| a.percent).unwrap_or(0.0);

        Self {
            total_value: total,
            asset_count: allocations.len(),
            risk_level: ConcentrationRisk::from_max_allocation(max_pct),
            diversification_score: round2((100.0 - mean_deviation).max(0.0)),
            largest_holding: largest.map(|a| a.symbol.clone()),
            largest_holding_pct: round2(max_pct),
            allocations,
        }
    }
}

/// Value-weighted day and year return percentages of the snapshot.
///
/// Returns `(0.0, 0.0)` when the total value is zero.
pub fn weighted_returns(holdings: &[Holding]) -> (f64, f64) {
    if total_value(holdings) <= 0.0 {
        return (0.0, 0.0);
    }

    holdings
        .iter()
        .zip(holding_weights(holdings))
        .fold((0.0, 0.0), |(day, year), (h, w)| {
            (day + w * h.day_return, year + w * h.year_return)
        })
}

/// Insert a holding, replacing any existing one with the same symbol.
///
/// Returns true if an existing holding was replaced.
pub fn upsert_holding(holdings: &mut Vec<Holding>, holding: Holding) -> bool {
    let holding = Holding {
        symbol: holding.symbol.to_uppercase(),
        ..holding
    };

    if let Some(existing) = holdings.iter_mut().find(|h| h.symbol == holding.symbol) {
        *existing = holding;
        true
    } else {
        holdings.push(holding);
        false
    }
}

/// Remove the holding for a symbol, returning it if present.
pub fn remove_holding(holdings: &mut Vec<Holding>, symbol: &str) -> Option<Holding> {
    let symbol_upper = symbol.to_uppercase();
    holdings
        .iter()
        .position(|h| h.symbol == symbol_upper)
        .map(|idx| holdings.remove(idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_portfolio() {
        let summary = AllocationSummary::from_holdings(&[]);
        assert_eq!(summary.asset_count, 0);
        assert_eq!(summary.risk_level, ConcentrationRisk::NotApplicable);
        assert!(summary.largest_holding.is_none());
    }

    #[test]
    fn test_concentrated_portfolio() {
        let holdings = vec![
            Holding::new("A", 60, 100.0),
            Holding::new("B", 20, 100.0),
            Holding::new("C", 20, 100.0),
        ];
        let summary = AllocationSummary::from_holdings(&holdings);

        assert_eq!(summary.total_value, 10_000.0);
        assert_eq!(summary.risk_level, ConcentrationRisk::High);
        assert_eq!(summary.largest_holding.as_deref(), Some("A"));
        assert_eq!(summary.largest_holding_pct, 60.0);
        // Deviations from 33.33: 26.67, 13.33, 13.33 -> mean 17.78
        assert_relative_eq!(summary.diversification_score, 82.22, epsilon = 1e-9);
    }

    #[test]
    fn test_equal_weights_low_risk() {
        let holdings: Vec<Holding> = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"]
            .iter()
            .map(|s| Holding::new(s, 10, 50.0))
            .collect();
        let summary = AllocationSummary::from_holdings(&holdings);

        assert_eq!(summary.risk_level, ConcentrationRisk::Low);
        assert_eq!(summary.diversification_score, 100.0);
        assert_eq!(summary.largest_holding.as_deref(), Some("A"));
    }

    #[test]
    fn test_risk_thresholds() {
        assert_eq!(ConcentrationRisk::from_max_allocation(30.0), ConcentrationRisk::Medium);
        assert_eq!(ConcentrationRisk::from_max_allocation(30.01), ConcentrationRisk::High);
        assert_eq!(ConcentrationRisk::from_max_allocation(20.0), ConcentrationRisk::Low);
    }

    #[test]
    fn test_weighted_returns() {
        let holdings = vec![
            Holding::new("A", 30, 100.0).with_returns(1.0, 10.0),
            Holding::new("B", 10, 100.0).with_returns(-2.0, 20.0),
        ];
        let (day, year) = weighted_returns(&holdings);
        assert_relative_eq!(day, 0.25, epsilon = 1e-12);
        assert_relative_eq!(year, 12.5, epsilon = 1e-12);

        assert_eq!(weighted_returns(&[Holding::new("A", 0, 10.0)]), (0.0, 0.0));
    }

    #[test]
    fn test_upsert_and_remove() {
        let mut holdings = Vec::new();
        assert!(!upsert_holding(&mut holdings, Holding::new("tcs", 5, 3500.0)));

        let mut updated = Holding::new("TCS", 8, 3600.0);
        updated.symbol = "tcs".to_string();
        assert!(upsert_holding(&mut holdings, updated));
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].quantity, 8);
        assert_eq!(holdings[0].symbol, "TCS");

        assert!(remove_holding(&mut holdings, "Tcs").is_some());
        assert!(remove_holding(&mut holdings, "TCS").is_none());
        assert!(holdings.is_empty());
    }
}
