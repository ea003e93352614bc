//! Folio CLI - Command line interface for portfolio performance analytics.
//!
//! Every command prints a JSON `ApiResponse` on stdout; logs go to stderr.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use folio_core::{
    simulate_sample, AllocationSummary, AnalyticsConfig, ApiResponse, Holding, JsonPriceSource,
    LeveragedPortfolio, PerformanceEngine, SampleParams,
};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio CLI - portfolio performance and risk analytics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct portfolio value against the benchmark and compute metrics
    Performance {
        /// Holdings JSON file (array of {symbol, quantity, price})
        #[arg(long)]
        holdings: PathBuf,
        /// Price snapshot JSON file
        #[arg(long)]
        prices: PathBuf,
        /// Config TOML file (defaults to ~/.folio/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// First date of the range (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last date of the range (YYYY-MM-DD), defaults to today
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Summarize allocation and concentration of holdings
    Allocation {
        /// Holdings JSON file
        #[arg(long)]
        holdings: PathBuf,
    },
    /// Analyze a levered long/short two-asset position
    Leverage {
        /// Equity capital
        #[arg(long)]
        equity: f64,
        /// Borrowed capital
        #[arg(long)]
        borrow: f64,
        #[command(flatten)]
        sample: SampleArgs,
    },
    /// Evaluate a long-only two-asset blend
    Frontier {
        /// Weight of the first asset
        #[arg(long)]
        weight: f64,
        #[command(flatten)]
        sample: SampleArgs,
    },
}

#[derive(clap::Args)]
struct SampleArgs {
    /// Paired return sample JSON file ([[x1, x2], ...]); simulated if omitted
    #[arg(long)]
    sample: Option<PathBuf>,
    /// Risk-free rate
    #[arg(long, default_value = "0.04")]
    rate: f64,
    /// Seed for the simulated sample
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Performance {
            holdings,
            prices,
            config,
            start,
            end,
        } => handle_performance(&holdings, &prices, config.as_deref(), start, end)?,
        Commands::Allocation { holdings } => handle_allocation(&holdings)?,
        Commands::Leverage {
            equity,
            borrow,
            sample,
        } => handle_leverage(equity, borrow, &sample)?,
        Commands::Frontier { weight, sample } => handle_frontier(weight, &sample)?,
    };

    println!("{}", output);
    Ok(())
}

fn render<T: Serialize>(response: &ApiResponse<T>) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(response)?)
}

fn render_err(error: impl ToString) -> anyhow::Result<String> {
    render(&ApiResponse::<()>::err(error.to_string()))
}

fn load_holdings(path: &Path) -> folio_core::Result<Vec<Holding>> {
    let content = fs::read_to_string(path)?;
    let holdings: Vec<Holding> = serde_json::from_str(&content)?;
    Ok(holdings
        .into_iter()
        .map(|h| Holding {
            symbol: h.symbol.to_uppercase(),
            ..h
        })
        .collect())
}

fn load_sample(args: &SampleArgs) -> folio_core::Result<Vec<(f64, f64)>> {
    match &args.sample {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        None => simulate_sample(&SampleParams::default(), args.seed),
    }
}

fn handle_performance(
    holdings_path: &Path,
    prices_path: &Path,
    config_path: Option<&Path>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> anyhow::Result<String> {
    let holdings = match load_holdings(holdings_path) {
        Ok(h) => h,
        Err(e) => return render_err(e),
    };
    let source = match JsonPriceSource::from_path(prices_path) {
        Ok(s) => s,
        Err(e) => return render_err(e),
    };
    let config = match config_path {
        Some(path) => AnalyticsConfig::load_from_path(path),
        None => AnalyticsConfig::load(),
    };
    let mut config = match config {
        Ok(c) => c,
        Err(e) => return render_err(e),
    };
    config.adopt_benchmark(source.benchmark());

    let engine = PerformanceEngine::with_config(source, config);
    let result = match (start, end) {
        (None, None) => engine.compute_performance(&holdings),
        (start, end) => {
            let end = end.unwrap_or_else(|| chrono::Utc::now().date_naive());
            start
                .map_or_else(|| engine.config().lookback_start(end), Ok)
                .and_then(|start| engine.compute_performance_between(&holdings, start, end))
        }
    };

    match result {
        Ok(outcome) => render(&ApiResponse::ok(outcome)),
        Err(e) => render_err(e),
    }
}

fn handle_allocation(holdings_path: &Path) -> anyhow::Result<String> {
    match load_holdings(holdings_path) {
        Ok(holdings) => {
            let (day_return, year_return) = folio_core::portfolio::weighted_returns(&holdings);
            render(&ApiResponse::ok(json!({
                "summary": AllocationSummary::from_holdings(&holdings),
                "day_return": day_return,
                "year_return": year_return,
            })))
        }
        Err(e) => render_err(e),
    }
}

fn handle_leverage(equity: f64, borrow: f64, args: &SampleArgs) -> anyhow::Result<String> {
    let portfolio = match load_sample(args)
        .and_then(|sample| LeveragedPortfolio::from_sample(&sample, args.rate))
    {
        Ok(p) => p,
        Err(e) => return render_err(e),
    };

    let c = portfolio.characteristics(equity, borrow);
    // JSON has no infinity; report unbounded leverage as null.
    render(&ApiResponse::ok(json!({
        "summary": portfolio.summary,
        "return": c.ret,
        "volatility": c.volatility,
        "sharpe": c.sharpe,
        "leverage": if c.is_unbounded() { None } else { Some(c.leverage) },
        "unbounded_leverage": c.is_unbounded(),
        "w1": c.w1,
        "w2": c.w2,
    })))
}

fn handle_frontier(weight: f64, args: &SampleArgs) -> anyhow::Result<String> {
    match load_sample(args).and_then(|sample| LeveragedPortfolio::from_sample(&sample, args.rate)) {
        Ok(portfolio) => render(&ApiResponse::ok(json!({
            "summary": portfolio.summary,
            "weight": weight,
            "point": portfolio.efficiency(weight),
        }))),
        Err(e) => render_err(e),
    }
}
