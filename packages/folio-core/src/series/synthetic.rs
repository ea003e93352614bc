//! Synthetic proxy series for symbols with no history at all.

use crate::types::{PriceBar, PriceSeries};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Standard deviation of the per-date price factor (mean 1).
pub const PRICE_NOISE: f64 = 0.1;
/// Standard deviation of the per-date volume factor (mean 1).
pub const VOLUME_NOISE: f64 = 0.3;

/// Deterministic seed derived from the uppercased symbol.
pub fn symbol_seed(symbol: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    symbol.to_uppercase().hash(&mut hasher);
    hasher.finish()
}

/// Clone the benchmark bars under `symbol`, perturbing each date multiplicatively.
///
/// Open/high/low/close share one factor drawn from N(1, 0.1); volume is scaled by
/// |N(1, 0.3)|. The generator is seeded from the symbol, so the same symbol and
/// benchmark always produce the same path.
pub fn synthetic_series(symbol: &str, benchmark: &PriceSeries) -> PriceSeries {
    let mut rng = StdRng::seed_from_u64(symbol_seed(symbol));

    let bars = benchmark
        .bars
        .iter()
        .map(|b| {
            let z_price: f64 = StandardNormal.sample(&mut rng);
            let z_volume: f64 = StandardNormal.sample(&mut rng);
            let price_factor = 1.0 + PRICE_NOISE * z_price;
            let volume_factor = (1.0 + VOLUME_NOISE * z_volume).abs();

            PriceBar {
                date: b.date,
                open: b.open * price_factor,
                high: b.high * price_factor,
                low: b.low * price_factor,
                close: b.close * price_factor,
                volume: b.volume * volume_factor,
            }
        })
        .collect();

    PriceSeries {
        symbol: symbol.to_uppercase(),
        bars,
    }
}
