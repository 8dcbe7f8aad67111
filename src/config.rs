//! Configuration file support.
//!
//! Analysis settings and the portfolio itself can be loaded from a TOML file:
//!
//! ```toml
//! [simulation]
//! num_portfolios = 10000
//! seed = 42
//! sampling = "uniform"
//!
//! [market]
//! risk_free_rate = 0.0425
//!
//! [history]
//! window_years = 10
//! realized_years = 1
//!
//! [optimizer]
//! method = "monte-carlo"
//!
//! [portfolio]
//! tickers = ["AAPL", "MSFT", "TLT"]
//! weights = [40, 40, 20]
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use tracing::info;

use crate::error::EngineError;
use crate::error::Result;
use crate::portfolio::OptimizerMethod;
use crate::portfolio::PortfolioEngineConfig;
use crate::portfolio::PortfolioRequest;
use crate::portfolio::SamplingMethod;
use crate::portfolio::SimulationConfig;
use crate::portfolio::SolverConfig;

/// Complete configuration loaded from a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
  #[serde(default)]
  pub simulation: SimulationSettings,
  #[serde(default)]
  pub market: MarketSettings,
  #[serde(default)]
  pub history: HistorySettings,
  #[serde(default)]
  pub optimizer: OptimizerSettings,
  #[serde(default)]
  pub portfolio: PortfolioSettings,
}

/// Monte-Carlo settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
  #[serde(default = "default_portfolios")]
  pub num_portfolios: usize,
  #[serde(default)]
  pub seed: Option<u64>,
  #[serde(default)]
  pub sampling: SamplingMethod,
  #[serde(default = "default_true")]
  pub parallel: bool,
}

fn default_portfolios() -> usize { 10_000 }
fn default_true() -> bool { true }

impl Default for SimulationSettings {
  fn default() -> Self {
    Self {
      num_portfolios: default_portfolios(),
      seed: None,
      sampling: SamplingMethod::default(),
      parallel: true,
    }
  }
}

/// Market inputs supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSettings {
  /// Annual risk-free rate in decimal form (0.02 for 2%).
  #[serde(default)]
  pub risk_free_rate: Option<f64>,
}

/// History window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySettings {
  /// Trailing years of history; `0` uses everything available.
  #[serde(default = "default_window_years")]
  pub window_years: u32,
  /// Trailing years behind the realized statistics; `0` uses the whole window.
  #[serde(default = "default_realized_years")]
  pub realized_years: u32,
}

fn default_window_years() -> u32 { 10 }
fn default_realized_years() -> u32 { 1 }

impl Default for HistorySettings {
  fn default() -> Self {
    Self {
      window_years: default_window_years(),
      realized_years: default_realized_years(),
    }
  }
}

/// Optimizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSettings {
  #[serde(default)]
  pub method: OptimizerMethod,
  #[serde(default = "default_max_iters")]
  pub max_iters: u64,
  #[serde(default = "default_sd_tolerance")]
  pub sd_tolerance: f64,
}

fn default_max_iters() -> u64 { 5000 }
fn default_sd_tolerance() -> f64 { 1e-10 }

impl Default for OptimizerSettings {
  fn default() -> Self {
    Self {
      method: OptimizerMethod::default(),
      max_iters: default_max_iters(),
      sd_tolerance: default_sd_tolerance(),
    }
  }
}

/// The portfolio to analyze.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSettings {
  #[serde(default)]
  pub tickers: Vec<String>,
  /// Raw weights, any positive scale (fractions or percentages).
  #[serde(default)]
  pub weights: Vec<f64>,
}

impl EngineConfig {
  /// Parse and validate a TOML document.
  pub fn from_toml_str(content: &str) -> Result<Self> {
    let config: Self = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Load configuration from a TOML file.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let config = Self::from_toml_str(&content)?;
    info!(path = %path.display(), "loaded configuration");
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    if self.simulation.num_portfolios == 0 {
      return Err(EngineError::Config(
        "simulation.num_portfolios must be at least 1".to_string(),
      ));
    }
    if let Some(rf) = self.market.risk_free_rate {
      if !rf.is_finite() {
        return Err(EngineError::Config(
          "market.risk_free_rate must be finite".to_string(),
        ));
      }
    }
    if self.optimizer.max_iters == 0 {
      return Err(EngineError::Config(
        "optimizer.max_iters must be at least 1".to_string(),
      ));
    }
    if !self.optimizer.sd_tolerance.is_finite() || self.optimizer.sd_tolerance < 0.0 {
      return Err(EngineError::Config(
        "optimizer.sd_tolerance must be finite and non-negative".to_string(),
      ));
    }
    if self.portfolio.tickers.len() != self.portfolio.weights.len() {
      return Err(EngineError::Config(format!(
        "portfolio has {} tickers but {} weights",
        self.portfolio.tickers.len(),
        self.portfolio.weights.len()
      )));
    }
    Ok(())
  }

  /// Engine configuration derived from the file.
  pub fn engine_config(&self) -> PortfolioEngineConfig {
    PortfolioEngineConfig {
      simulation: SimulationConfig {
        num_portfolios: self.simulation.num_portfolios,
        seed: self.simulation.seed,
        sampling: self.simulation.sampling,
        parallel: self.simulation.parallel,
      },
      optimizer: self.optimizer.method,
      solver: SolverConfig {
        max_iters: self.optimizer.max_iters,
        sd_tolerance: self.optimizer.sd_tolerance,
      },
      risk_free: self.market.risk_free_rate,
      window_years: match self.history.window_years {
        0 => None,
        years => Some(years),
      },
      realized_years: match self.history.realized_years {
        0 => None,
        years => Some(years),
      },
    }
  }

  /// Portfolio request described by the `[portfolio]` section.
  pub fn request(&self) -> PortfolioRequest {
    PortfolioRequest::new(self.portfolio.tickers.clone(), self.portfolio.weights.clone())
  }
}
