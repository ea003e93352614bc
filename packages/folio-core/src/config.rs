//! Analytics configuration loaded from TOML.

use crate::{Error, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Tunable constants of a performance computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Benchmark index symbol. The price source supplies the calendar itself;
    /// this names it in logs and errors.
    pub benchmark: String,
    /// Annual risk-free rate (0.0725 for 7.25%)
    pub risk_free_rate: f64,
    /// Trading sessions per year
    pub trading_days: usize,
    /// Notional both value series start from
    pub initial_value: f64,
    /// Calendar days of history requested by `compute_performance`
    pub lookback_days: i64,
    /// Confidence level for historical VaR
    pub var_confidence: f64,
    /// Sessions a missing close is carried forward before benchmark imputation
    pub ffill_limit: usize,
    /// Substitute a synthetic proxy when a symbol has no data at all
    pub synthetic_fallback: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            benchmark: "^NSEI".to_string(),
            risk_free_rate: 0.0725,
            trading_days: 252,
            initial_value: 100_000.0,
            lookback_days: 5 * 365,
            var_confidence: 0.99,
            ffill_limit: 1,
            synthetic_fallback: true,
        }
    }
}

impl AnalyticsConfig {
    /// Load from the default location, falling back to defaults if no file exists.
    ///
    /// Default path: `~/.folio/config.toml`
    /// Can be overridden with `FOLIO_CONFIG_FILE` environment variable.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("FOLIO_CONFIG_FILE") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".folio/config.toml"))
            .unwrap_or_else(|| PathBuf::from("folio.toml"))
    }

    /// Load from a specific path. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Take the benchmark a price source actually serves.
    ///
    /// Returns `true` (and logs a warning) when it differs from the configured one.
    pub fn adopt_benchmark(&mut self, symbol: &str) -> bool {
        if self.benchmark == symbol {
            return false;
        }
        tracing::warn!(
            "Configured benchmark {} differs from source benchmark {}, using the source's",
            self.benchmark,
            symbol
        );
        self.benchmark = symbol.to_string();
        true
    }

    /// First date of the lookback window ending at `end`.
    ///
    /// Fails instead of overflowing when `lookback_days` reaches past the
    /// representable calendar.
    pub fn lookback_start(&self, end: NaiveDate) -> Result<NaiveDate> {
        Duration::try_days(self.lookback_days)
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(|| {
                Error::InvalidOperation(format!(
                    "lookback_days {} is out of range",
                    self.lookback_days
                ))
            })
    }
}
