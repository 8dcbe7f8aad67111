//! # Portfolio Data Utilities
//!
//! $$
//! \mu = 252\,\bar r,\qquad \Sigma = \frac{252}{T-1}\sum_t (r_t-\bar r)(r_t-\bar r)^\top
//! $$
//!
//! Daily simple returns and the annualized mean/covariance estimator.

use ndarray::s;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use ndarray::Axis;
use tracing::debug;

use super::panel::PricePanel;
use super::types::AssetPoint;
use super::types::TRADING_DAYS;
use crate::error::EngineError;
use crate::error::Result;

/// Simple returns `p_t / p_{t-1} - 1`, one row per day after the first.
///
/// Columns stay aligned with the price columns, also for a single asset.
pub fn simple_returns(prices: ArrayView2<f64>) -> Array2<f64> {
  let n = prices.nrows();
  if n < 2 {
    return Array2::zeros((0, prices.ncols()));
  }

  let prev = prices.slice(s![..n - 1, ..]);
  let next = prices.slice(s![1.., ..]);
  &next / &prev - 1.0
}

/// Sample covariance (`ddof = 1`) of the columns of `returns`.
///
/// Fewer than two observations give a zero matrix.
pub fn sample_covariance(returns: ArrayView2<f64>) -> Array2<f64> {
  let (t, a) = returns.dim();
  let Some(mean) = returns.mean_axis(Axis(0)) else {
    return Array2::zeros((a, a));
  };
  if t < 2 {
    return Array2::zeros((a, a));
  }

  let centered = &returns - &mean;
  let cov = centered.t().dot(&centered) / (t - 1) as f64;
  // keep exact symmetry regardless of the gemm summation order
  (&cov + &cov.t()) / 2.0
}

/// Pearson correlation derived from a covariance matrix.
pub fn correlation_from_covariance(cov: ArrayView2<f64>) -> Array2<f64> {
  let n = cov.nrows();
  let sigmas: Array1<f64> = cov.diag().mapv(|v| v.max(0.0).sqrt());
  let mut corr = Array2::<f64>::zeros((n, n));

  for i in 0..n {
    for j in 0..n {
      let denom = sigmas[i] * sigmas[j];
      corr[[i, j]] = if i == j {
        1.0
      } else if denom > 1e-15 {
        (cov[[i, j]] / denom).clamp(-1.0, 1.0)
      } else {
        0.0
      };
    }
  }

  corr
}

/// Annualized mean returns and covariance of a set of assets.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnsModel {
  tickers: Vec<String>,
  mean_returns: Array1<f64>,
  covariance: Array2<f64>,
}

impl ReturnsModel {
  /// Estimate the model from every column of the panel.
  pub fn estimate(panel: &PricePanel) -> Result<Self> {
    if panel.n_assets() == 0 {
      return Err(EngineError::EmptyPortfolio);
    }
    if panel.len() < 2 {
      return Err(EngineError::InsufficientData {
        ticker: panel.tickers()[0].clone(),
        points: panel.len(),
        required: 2,
      });
    }

    let returns = simple_returns(panel.prices());
    let mean_returns = returns
      .mean_axis(Axis(0))
      .ok_or(EngineError::EmptyPortfolio)?
      * TRADING_DAYS;
    let covariance = sample_covariance(returns.view()) * TRADING_DAYS;

    debug!(
      assets = panel.n_assets(),
      observations = returns.nrows(),
      "estimated returns model"
    );

    Ok(Self {
      tickers: panel.tickers().to_vec(),
      mean_returns,
      covariance,
    })
  }

  /// Estimate the model for `tickers`, in that order.
  pub fn estimate_for<S: AsRef<str>>(panel: &PricePanel, tickers: &[S]) -> Result<Self> {
    Self::estimate(&panel.select(tickers)?)
  }

  /// Build a model from already annualized inputs.
  pub fn from_parts(tickers: Vec<String>, mean_returns: Array1<f64>, covariance: Array2<f64>) -> Result<Self> {
    let n = mean_returns.len();
    if n == 0 {
      return Err(EngineError::EmptyPortfolio);
    }
    if tickers.len() != n {
      return Err(EngineError::DimensionMismatch {
        expected: n,
        found: tickers.len(),
      });
    }
    if covariance.nrows() != n || covariance.ncols() != n {
      return Err(EngineError::DimensionMismatch {
        expected: n,
        found: covariance.nrows().max(covariance.ncols()),
      });
    }

    Ok(Self {
      tickers,
      mean_returns,
      covariance,
    })
  }

  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  pub fn n_assets(&self) -> usize {
    self.mean_returns.len()
  }

  pub fn mean_returns(&self) -> ArrayView1<'_, f64> {
    self.mean_returns.view()
  }

  pub fn covariance(&self) -> ArrayView2<'_, f64> {
    self.covariance.view()
  }

  /// Annualized volatility of each asset on its own.
  pub fn asset_volatilities(&self) -> Array1<f64> {
    self.covariance.diag().mapv(|v| v.max(0.0).sqrt())
  }

  pub fn asset_points(&self) -> Vec<AssetPoint> {
    let vols = self.asset_volatilities();
    self
      .tickers
      .iter()
      .enumerate()
      .map(|(i, ticker)| AssetPoint {
        ticker: ticker.clone(),
        expected_return: self.mean_returns[i],
        volatility: vols[i],
      })
      .collect()
  }

  pub fn correlation(&self) -> Array2<f64> {
    correlation_from_covariance(self.covariance.view())
  }
}
