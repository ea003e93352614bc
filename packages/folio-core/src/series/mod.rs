//! Price series preparation.
//!
//! Aligns symbol histories onto the benchmark calendar, fabricates proxies for
//! symbols with no data, and rebuilds portfolio/benchmark value series.

mod align;
mod reconstruct;
mod synthetic;

pub use align::{align_to_calendar, benchmark_returns, AlignedSeries};
pub use reconstruct::{benchmark_values, reconstruct_values, ReconstructedValues, WeightedSeries};
pub use synthetic::{symbol_seed, synthetic_series, PRICE_NOISE, VOLUME_NOISE};
