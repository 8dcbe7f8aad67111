//! # Portfolio Types
//!
//! $$
//! S=\frac{\mathbb E[R_p]-r_f}{\sigma_p}
//! $$
//!
//! Shared enums, constants and result records for the frontier engine.

use serde::Deserialize;
use serde::Serialize;

/// Trading days per year used to annualize daily statistics.
pub const TRADING_DAYS: f64 = 252.0;

/// Risk-free rate used when the caller supplies none.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// How random weight vectors are drawn by the frontier simulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingMethod {
  /// Independent `U[0,1)` draws divided by their sum.
  ///
  /// Not uniform over the simplex: mass concentrates around the equal-weight
  /// portfolio.
  #[default]
  #[serde(alias = "uniform")]
  IndependentUniform,
  /// Unit exponential draws divided by their sum, i.e. a flat Dirichlet.
  /// Uniform over the simplex; changes the shape of the cloud.
  #[serde(alias = "dirichlet")]
  FlatDirichlet,
}

impl SamplingMethod {
  /// Parse a known sampling name, `None` otherwise.
  pub fn parse(s: &str) -> Option<Self> {
    match s.to_lowercase().as_str() {
      "uniform" | "independent-uniform" => Some(Self::IndependentUniform),
      "dirichlet" | "flat-dirichlet" | "exponential" | "simplex" => Some(Self::FlatDirichlet),
      _ => None,
    }
  }

  /// Parse a string into a [`SamplingMethod`], unknown names give the default.
  pub fn from_str(s: &str) -> Self {
    Self::parse(s).unwrap_or_default()
  }
}

/// Strategy used to pick the optimal portfolios.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizerMethod {
  /// Extrema of the simulated cloud.
  #[default]
  MonteCarlo,
  /// Nelder-Mead search on the long-only simplex.
  NelderMead,
}

impl OptimizerMethod {
  /// Parse a known optimizer name, `None` otherwise.
  pub fn parse(s: &str) -> Option<Self> {
    match s.to_lowercase().as_str() {
      "monte-carlo" | "montecarlo" | "mc" | "cloud" => Some(Self::MonteCarlo),
      "nelder-mead" | "neldermead" | "nm" | "solver" => Some(Self::NelderMead),
      _ => None,
    }
  }

  /// Parse a string into an [`OptimizerMethod`], unknown names give the default.
  pub fn from_str(s: &str) -> Self {
    Self::parse(s).unwrap_or_default()
  }
}

/// Expected return, volatility and Sharpe ratio of one weighting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
  /// Model expected portfolio return (annualized if inputs are annualized).
  pub expected_return: f64,
  /// Model portfolio volatility.
  pub volatility: f64,
  /// `(expected_return - risk_free) / volatility`, or `0` when volatility is zero.
  pub sharpe_ratio: f64,
}

/// A weighting together with its metrics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulatedPortfolio {
  /// Portfolio weights, index-aligned with the asset list.
  pub weights: Vec<f64>,
  /// Model expected portfolio return.
  pub expected_return: f64,
  /// Model portfolio volatility.
  pub volatility: f64,
  /// Sharpe ratio.
  pub sharpe_ratio: f64,
}

impl SimulatedPortfolio {
  pub fn new(weights: Vec<f64>, metrics: PortfolioMetrics) -> Self {
    Self {
      weights,
      expected_return: metrics.expected_return,
      volatility: metrics.volatility,
      sharpe_ratio: metrics.sharpe_ratio,
    }
  }

  pub fn metrics(&self) -> PortfolioMetrics {
    PortfolioMetrics {
      expected_return: self.expected_return,
      volatility: self.volatility,
      sharpe_ratio: self.sharpe_ratio,
    }
  }
}

/// Role of a portfolio in the frontier output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortfolioRole {
  MinVolatility,
  MaxSharpe,
  Current,
}

impl std::fmt::Display for PortfolioRole {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      PortfolioRole::MinVolatility => write!(f, "Minimum volatility"),
      PortfolioRole::MaxSharpe => write!(f, "Maximum Sharpe"),
      PortfolioRole::Current => write!(f, "Current"),
    }
  }
}

/// A portfolio selected as an extremum, flagged by role.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimalPortfolio {
  pub role: PortfolioRole,
  /// Index in the simulated population, `None` when produced by a solver.
  pub index: Option<usize>,
  #[serde(flatten)]
  pub portfolio: SimulatedPortfolio,
}

/// Annualized risk/return point of a single asset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetPoint {
  pub ticker: String,
  pub expected_return: f64,
  pub volatility: f64,
}
