//! Command-line front end: load closes from a wide CSV, run the frontier
//! analysis and print or export the result.

use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use pi2_trading::config::EngineConfig;
use pi2_trading::export::save_analysis_json;
use pi2_trading::export::save_performance_csv;
use pi2_trading::export::save_population_csv;
use pi2_trading::portfolio::load_price_csv;
use pi2_trading::portfolio::FrontierAnalysis;
use pi2_trading::portfolio::OptimizerMethod;
use pi2_trading::portfolio::PortfolioEngine;
use pi2_trading::portfolio::PricePanel;
use pi2_trading::portfolio::SamplingMethod;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// π²Trading - efficient frontier and portfolio comparison.
#[derive(Parser)]
#[command(name = "pi2")]
#[command(version)]
#[command(about = "Monte-Carlo efficient frontier for a portfolio of daily closes")]
struct Cli {
  /// Wide CSV of closes: `date,<TICKER>,...`
  #[arg(short, long)]
  prices: PathBuf,

  /// TOML configuration file
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Tickers, comma separated (overrides the config file)
  #[arg(short, long, value_delimiter = ',')]
  tickers: Vec<String>,

  /// Weights in ticker order, any positive scale
  #[arg(short, long, value_delimiter = ',')]
  weights: Vec<f64>,

  /// Number of simulated portfolios
  #[arg(short = 'n', long)]
  portfolios: Option<usize>,

  /// Seed for reproducible draws
  #[arg(long)]
  seed: Option<u64>,

  /// Weight sampling: uniform or dirichlet
  #[arg(long)]
  sampling: Option<String>,

  /// Extremum search: monte-carlo or nelder-mead
  #[arg(long)]
  optimizer: Option<String>,

  /// Annual risk-free rate in decimal form
  #[arg(long)]
  risk_free: Option<f64>,

  /// Trailing years of history, 0 for everything
  #[arg(long)]
  years: Option<u32>,

  /// Write the full analysis as JSON
  #[arg(long)]
  json: Option<PathBuf>,

  /// Write the simulated population as CSV
  #[arg(long)]
  population_csv: Option<PathBuf>,

  /// Write the performance series as CSV
  #[arg(long)]
  performance_csv: Option<PathBuf>,

  /// Verbosity level
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

impl Cli {
  fn init_logging(&self) {
    let level = match self.verbose {
      0 => "warn",
      1 => "info",
      2 => "debug",
      _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_target(false)
      .init();
  }

  fn engine_config(&self) -> Result<EngineConfig> {
    let mut config = match &self.config {
      Some(path) => EngineConfig::from_file(path)
        .with_context(|| format!("failed to load config {}", path.display()))?,
      None => EngineConfig::default(),
    };

    if !self.tickers.is_empty() {
      config.portfolio.tickers = self.tickers.clone();
      config.portfolio.weights = if self.weights.is_empty() {
        vec![1.0; self.tickers.len()]
      } else {
        self.weights.clone()
      };
    } else if !self.weights.is_empty() {
      config.portfolio.weights = self.weights.clone();
    }
    if let Some(n) = self.portfolios {
      config.simulation.num_portfolios = n;
    }
    if self.seed.is_some() {
      config.simulation.seed = self.seed;
    }
    if let Some(sampling) = &self.sampling {
      config.simulation.sampling = sampling_arg(sampling);
    }
    if let Some(method) = &self.optimizer {
      config.optimizer.method = optimizer_arg(method);
    }
    if self.risk_free.is_some() {
      config.market.risk_free_rate = self.risk_free;
    }
    if let Some(years) = self.years {
      config.history.window_years = years;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
  }
}

fn sampling_arg(name: &str) -> SamplingMethod {
  SamplingMethod::parse(name).unwrap_or_else(|| {
    let fallback = SamplingMethod::default();
    warn!(sampling = name, ?fallback, "unknown sampling method, using the default");
    fallback
  })
}

fn optimizer_arg(name: &str) -> OptimizerMethod {
  OptimizerMethod::parse(name).unwrap_or_else(|| {
    let fallback = OptimizerMethod::default();
    warn!(optimizer = name, ?fallback, "unknown optimizer, using the default");
    fallback
  })
}

fn print_summary(analysis: &FrontierAnalysis) {
  println!(
    "Window {} .. {} ({} daily returns), risk-free {:.2}%",
    analysis.window_start,
    analysis.window_end,
    analysis.observations,
    analysis.risk_free_rate * 100.0
  );
  println!();
  println!("{:<10} {:>10} {:>10}", "Asset", "Return", "Volatility");
  for asset in &analysis.assets {
    println!(
      "{:<10} {:>9.2}% {:>9.2}%",
      asset.ticker,
      asset.expected_return * 100.0,
      asset.volatility * 100.0
    );
  }

  let selection = &analysis.selection;
  for p in [&selection.current, &selection.min_volatility, &selection.max_sharpe] {
    println!();
    println!("{}", p.role);
    println!(
      "  return {:.2}%  volatility {:.2}%  sharpe {:.3}",
      p.portfolio.expected_return * 100.0,
      p.portfolio.volatility * 100.0,
      p.portfolio.sharpe_ratio
    );
    let weights: Vec<String> = analysis
      .tickers
      .iter()
      .zip(&p.portfolio.weights)
      .map(|(t, w)| format!("{t} {:.1}%", w * 100.0))
      .collect();
    println!("  {}", weights.join(", "));
  }

  println!();
  for series in &analysis.performance {
    println!("{:<20} growth {:>8.2}%", series.label, series.total_return() * 100.0);
  }
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  cli.init_logging();

  let config = cli.engine_config()?;
  if config.portfolio.tickers.is_empty() {
    bail!("no tickers given; pass --tickers or a [portfolio] section");
  }

  info!(path = %cli.prices.display(), "loading prices");
  let series = load_price_csv(&cli.prices)
    .with_context(|| format!("failed to read prices {}", cli.prices.display()))?;
  let panel = PricePanel::align(series).context("failed to align price series")?;

  let engine = PortfolioEngine::new(config.engine_config());
  let analysis = engine
    .analyze(&panel, &config.request())
    .context("frontier analysis failed")?;

  print_summary(&analysis);

  if let Some(path) = &cli.json {
    save_analysis_json(&analysis, path).with_context(|| format!("failed to write {}", path.display()))?;
  }
  if let Some(path) = &cli.population_csv {
    save_population_csv(&analysis.tickers, &analysis.population, path)
      .with_context(|| format!("failed to write {}", path.display()))?;
  }
  if let Some(path) = &cli.performance_csv {
    save_performance_csv(&analysis.performance, path)
      .with_context(|| format!("failed to write {}", path.display()))?;
  }

  Ok(())
}
