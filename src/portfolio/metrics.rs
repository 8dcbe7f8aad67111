//! # Portfolio Metrics
//!
//! $$
//! \mu_p=\mathbf w^\top\mu,\qquad \sigma_p=\sqrt{\max(\mathbf w^\top\Sigma\mathbf w,0)}
//! $$
//!
//! Model metrics of a weighting, realized statistics of a daily return
//! series, and the weight normalization policy.

use ndarray::Array1;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use serde::Deserialize;
use serde::Serialize;

use super::types::PortfolioMetrics;
use super::types::TRADING_DAYS;
use crate::error::EngineError;
use crate::error::Result;

/// Sharpe ratio with the zero-volatility convention.
///
/// A riskless (or degenerate) portfolio has a Sharpe ratio of `0`.
pub fn sharpe_ratio(expected_return: f64, volatility: f64, risk_free: f64) -> f64 {
  if volatility > 0.0 {
    (expected_return - risk_free) / volatility
  } else {
    0.0
  }
}

/// `wᵀΣw` clamped at zero.
pub fn portfolio_variance(weights: ArrayView1<f64>, cov: ArrayView2<f64>) -> f64 {
  weights.dot(&cov.dot(&weights)).max(0.0)
}

/// Expected return, volatility and Sharpe ratio of `weights`.
///
/// Weights are used as given; see [`normalize_weights`] for the input policy.
pub fn portfolio_metrics(
  weights: ArrayView1<f64>,
  mean_returns: ArrayView1<f64>,
  cov: ArrayView2<f64>,
  risk_free: f64,
) -> PortfolioMetrics {
  let expected_return = weights.dot(&mean_returns);
  let volatility = portfolio_variance(weights, cov).sqrt();

  PortfolioMetrics {
    expected_return,
    volatility,
    sharpe_ratio: sharpe_ratio(expected_return, volatility, risk_free),
  }
}

/// Check and rescale raw weights so they sum to one.
///
/// Accepts any non-negative finite values with a positive sum (percentages
/// included). Negative, non-finite or all-zero input is rejected.
pub fn normalize_weights(raw: &[f64], n_assets: usize) -> Result<Array1<f64>> {
  if n_assets == 0 {
    return Err(EngineError::EmptyPortfolio);
  }
  if raw.len() != n_assets {
    return Err(EngineError::DimensionMismatch {
      expected: n_assets,
      found: raw.len(),
    });
  }
  if let Some(bad) = raw.iter().find(|w| !w.is_finite() || **w < 0.0) {
    return Err(EngineError::InvalidWeights(format!(
      "weights must be finite and non-negative, got {bad}"
    )));
  }

  let total: f64 = raw.iter().sum();
  if total <= 0.0 {
    return Err(EngineError::InvalidWeights("weights sum to zero".to_string()));
  }

  Ok(raw.iter().map(|w| w / total).collect())
}

/// Weighted daily portfolio returns, one value per row of `returns`.
pub fn weighted_returns(returns: ArrayView2<f64>, weights: ArrayView1<f64>) -> Result<Array1<f64>> {
  if returns.ncols() != weights.len() {
    return Err(EngineError::DimensionMismatch {
      expected: returns.ncols(),
      found: weights.len(),
    });
  }
  Ok(returns.dot(&weights))
}

/// Annualized statistics of a realized daily return series.
pub fn realized_metrics(daily_returns: ArrayView1<f64>, risk_free: f64) -> PortfolioMetrics {
  let n = daily_returns.len();
  if n == 0 {
    return PortfolioMetrics::default();
  }

  let mean = daily_returns.sum() / n as f64;
  let std = if n < 2 {
    0.0
  } else {
    daily_returns.std(1.0)
  };

  let expected_return = mean * TRADING_DAYS;
  let volatility = std * TRADING_DAYS.sqrt();

  PortfolioMetrics {
    expected_return,
    volatility,
    sharpe_ratio: sharpe_ratio(expected_return, volatility, risk_free),
  }
}

/// Summary of a weight vector as entered by the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightSummary {
  pub total: f64,
  pub mean: f64,
  pub max: f64,
  pub min: f64,
}

impl WeightSummary {
  pub fn from_weights(weights: &[f64]) -> Self {
    if weights.is_empty() {
      return Self::default();
    }

    let total: f64 = weights.iter().sum();
    Self {
      total,
      mean: total / weights.len() as f64,
      max: weights.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
      min: weights.iter().cloned().fold(f64::INFINITY, f64::min),
    }
  }
}
