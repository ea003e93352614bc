//! Leveraged two-asset portfolio analysis.
//!
//! Works purely from summary statistics of two return streams: means, standard
//! deviations and their correlation.

use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

/// Descriptive statistics of a two-asset return sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TwoAssetSummary {
    pub mean1: f64,
    pub mean2: f64,
    pub sigma1: f64,
    pub sigma2: f64,
    pub rho: f64,
}

impl TwoAssetSummary {
    /// Summarize a sample of paired returns.
    ///
    /// Uses the sample (n - 1) standard deviation and Pearson correlation.
    pub fn from_sample(sample: &[(f64, f64)]) -> Result<Self> {
        if sample.len() < 2 {
            return Err(Error::InsufficientData(
                "Need at least 2 paired returns".to_string(),
            ));
        }

        let n = sample.len() as f64;
        let mean1 = sample.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean2 = sample.iter().map(|(_, y)| y).sum::<f64>() / n;

        let (ss1, ss2, cross) = sample.iter().fold((0.0, 0.0, 0.0), |(s1, s2, c), (x, y)| {
            let (dx, dy) = (x - mean1, y - mean2);
            (s1 + dx * dx, s2 + dy * dy, c + dx * dy)
        });

        let sigma1 = (ss1 / (n - 1.0)).sqrt();
        let sigma2 = (ss2 / (n - 1.0)).sqrt();
        let rho = if ss1 > 0.0 && ss2 > 0.0 {
            cross / (ss1 * ss2).sqrt()
        } else {
            0.0
        };

        Ok(Self {
            mean1,
            mean2,
            sigma1,
            sigma2,
            rho,
        })
    }
}

/// Return, risk and structure of a levered long/short position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LeverageCharacteristics {
    pub ret: f64,
    pub volatility: f64,
    pub sharpe: f64,
    /// Gross over net capital; `f64::INFINITY` when net capital is zero
    pub leverage: f64,
    pub w1: f64,
    pub w2: f64,
}

impl LeverageCharacteristics {
    /// Whether net capital was zero and leverage is the unbounded sentinel.
    ///
    /// Check this before doing arithmetic with `leverage`.
    pub fn is_unbounded(&self) -> bool {
        self.leverage.is_infinite()
    }
}

/// A point on the long-only two-asset frontier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FrontierPoint {
    pub ret: f64,
    pub volatility: f64,
    pub sharpe: f64,
}

/// Analyzer for levered long/short and blended two-asset portfolios.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LeveragedPortfolio {
    pub summary: TwoAssetSummary,
    pub risk_free_rate: f64,
}

fn sharpe(ret: f64, volatility: f64, risk_free_rate: f64) -> f64 {
    if volatility > 0.0 {
        (ret - risk_free_rate) / volatility
    } else {
        0.0
    }
}

impl LeveragedPortfolio {
    pub fn new(summary: TwoAssetSummary, risk_free_rate: f64) -> Self {
        Self {
            summary,
            risk_free_rate,
        }
    }

    /// Build from a paired return sample.
    pub fn from_sample(sample: &[(f64, f64)], risk_free_rate: f64) -> Result<Self> {
        Ok(Self::new(TwoAssetSummary::from_sample(sample)?, risk_free_rate))
    }

    /// Long asset 1 with `equity + borrow`, short asset 2 with `borrow`.
    ///
    /// Weights are relative to net capital. The short leg enters the variance with
    /// a negative cross term. Zero net capital yields infinite leverage and
    /// `w1 = w2 = 1`.
    pub fn characteristics(&self, equity: f64, borrow: f64) -> LeverageCharacteristics {
        let s = &self.summary;
        let long = equity + borrow;
        let short = borrow;
        let net = long - short;
        let gross = long + short;

        let (leverage, w1, w2) = if long != short {
            (gross / net, long / net, short / net)
        } else {
            (f64::INFINITY, 1.0, 1.0)
        };

        let ret = w1 * s.mean1 - w2 * s.mean2;
        let variance = w1.powi(2) * s.sigma1.powi(2) + w2.powi(2) * s.sigma2.powi(2)
            - 2.0 * w1 * w2 * s.rho * s.sigma1 * s.sigma2;
        let volatility = variance.max(0.0).sqrt();

        LeverageCharacteristics {
            ret,
            volatility,
            sharpe: sharpe(ret, volatility, self.risk_free_rate),
            leverage,
            w1,
            w2,
        }
    }

    /// Long-only blend with `w` in asset 1 and `1 - w` in asset 2.
    ///
    /// Both legs are long, so the cross term is positive.
    pub fn efficiency(&self, w: f64) -> FrontierPoint {
        let s = &self.summary;
        let (w1, w2) = (w, 1.0 - w);

        let ret = w1 * s.mean1 + w2 * s.mean2;
        let variance = w1.powi(2) * s.sigma1.powi(2)
            + w2.powi(2) * s.sigma2.powi(2)
            + 2.0 * w1 * w2 * s.rho * s.sigma1 * s.sigma2;
        let volatility = variance.max(0.0).sqrt();

        FrontierPoint {
            ret,
            volatility,
            sharpe: sharpe(ret, volatility, self.risk_free_rate),
        }
    }
}

/// Parameters of a simulated bivariate normal return sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SampleParams {
    pub mean1: f64,
    pub mean2: f64,
    pub sd1: f64,
    pub sd2: f64,
    pub rho: f64,
    pub n_samples: usize,
}

impl Default for SampleParams {
    fn default() -> Self {
        Self {
            mean1: 0.12,
            mean2: 0.04,
            sd1: 0.12,
            sd2: 0.12,
            rho: 0.9,
            n_samples: 1000,
        }
    }
}

/// Draw correlated normal return pairs from a seeded generator.
pub fn simulate_sample(params: &SampleParams, seed: u64) -> Result<Vec<(f64, f64)>> {
    if !(-1.0..=1.0).contains(&params.rho) {
        return Err(Error::InvalidOperation(format!(
            "Correlation must be within [-1, 1], got {}",
            params.rho
        )));
    }
    if params.sd1 < 0.0 || params.sd2 < 0.0 {
        return Err(Error::InvalidOperation(
            "Standard deviations must be non-negative".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let residual = (1.0 - params.rho * params.rho).sqrt();

    Ok((0..params.n_samples)
        .map(|_| {
            let z1: f64 = StandardNormal.sample(&mut rng);
            let z2: f64 = StandardNormal.sample(&mut rng);
            let x1 = params.mean1 + params.sd1 * z1;
            let x2 = params.mean2 + params.sd2 * (params.rho * z1 + residual * z2);
            (x1, x2)
        })
        .collect())
}
