//! # Performance Series
//!
//! $$
//! V_0=1,\qquad V_t=V_{t-1}\,(1+\mathbf w^\top r_t)
//! $$
//!
//! Realized cumulative growth of a weighting over a historical window,
//! rebalanced daily to the target weights.

use chrono::NaiveDate;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::data::simple_returns;
use super::metrics::normalize_weights;
use super::metrics::realized_metrics;
use super::metrics::weighted_returns;
use super::panel::PricePanel;
use super::types::PortfolioMetrics;
use crate::error::EngineError;
use crate::error::Result;

/// Running product of `1 + r`, starting from `1.0`.
///
/// The result has one more element than `daily_returns`.
pub fn cumulative_growth(daily_returns: ArrayView1<f64>) -> Array1<f64> {
  let mut out = Array1::<f64>::zeros(daily_returns.len() + 1);
  out[0] = 1.0;
  for (t, r) in daily_returns.iter().enumerate() {
    out[t + 1] = out[t] * (1.0 + r);
  }
  out
}

/// Cumulative value of one weighting, anchored at `1.0` on the first date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSeries {
  pub label: String,
  /// Normalized weights the series was computed with.
  pub weights: Vec<f64>,
  /// Window dates, the first one is the anchor.
  pub dates: Vec<NaiveDate>,
  /// Cumulative value per date, `values[0] == 1.0`.
  pub values: Vec<f64>,
  /// Daily portfolio returns, one per date after the anchor.
  pub daily_returns: Vec<f64>,
}

impl PerformanceSeries {
  /// Cumulative values after the anchor, one per daily return.
  pub fn growth(&self) -> &[f64] {
    self.values.get(1..).unwrap_or(&[])
  }

  pub fn final_value(&self) -> f64 {
    self.values.last().copied().unwrap_or(1.0)
  }

  /// Total return over the window.
  pub fn total_return(&self) -> f64 {
    self.final_value() - 1.0
  }

  /// Values rescaled to start at `base`, e.g. `100.0`.
  pub fn scaled(&self, base: f64) -> Vec<f64> {
    self.values.iter().map(|v| v * base).collect()
  }

  pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
    self.dates.iter().copied().zip(self.values.iter().copied())
  }

  /// Annualized realized return, volatility and Sharpe ratio.
  pub fn realized_metrics(&self, risk_free: f64) -> PortfolioMetrics {
    realized_metrics(ArrayView1::from(&self.daily_returns[..]), risk_free)
  }
}

fn window_panel<S: AsRef<str>>(panel: &PricePanel, tickers: &[S], window_years: Option<u32>) -> Result<PricePanel> {
  let selected = panel.select(tickers)?;
  let windowed = match window_years {
    Some(years) => selected.last_years(years),
    None => selected,
  };

  if windowed.len() < 2 {
    return Err(EngineError::InsufficientData {
      ticker: windowed.tickers()[0].clone(),
      points: windowed.len(),
      required: 2,
    });
  }
  Ok(windowed)
}

fn series_from_returns(
  label: String,
  dates: &[NaiveDate],
  returns: &Array2<f64>,
  raw_weights: &[f64],
) -> Result<PerformanceSeries> {
  let weights = normalize_weights(raw_weights, returns.ncols())?;
  let daily = weighted_returns(returns.view(), weights.view())?;
  let values = cumulative_growth(daily.view());

  debug!(
    label = %label,
    days = daily.len(),
    final_value = values[values.len() - 1],
    "computed performance series"
  );

  Ok(PerformanceSeries {
    label,
    weights: weights.to_vec(),
    dates: dates.to_vec(),
    values: values.to_vec(),
    daily_returns: daily.to_vec(),
  })
}

/// Cumulative performance of `raw_weights` over `tickers`.
///
/// `window_years` keeps only the trailing years of the panel; `None` uses
/// the whole history.
pub fn performance_series<S: AsRef<str>>(
  panel: &PricePanel,
  tickers: &[S],
  raw_weights: &[f64],
  window_years: Option<u32>,
  label: impl Into<String>,
) -> Result<PerformanceSeries> {
  let windowed = window_panel(panel, tickers, window_years)?;
  let returns = simple_returns(windowed.prices());
  series_from_returns(label.into(), windowed.dates(), &returns, raw_weights)
}

/// Performance of several weightings over the same window.
pub fn compare_performance<S: AsRef<str>>(
  panel: &PricePanel,
  tickers: &[S],
  weightings: &[(String, Vec<f64>)],
  window_years: Option<u32>,
) -> Result<Vec<PerformanceSeries>> {
  let windowed = window_panel(panel, tickers, window_years)?;
  let returns = simple_returns(windowed.prices());

  weightings
    .iter()
    .map(|(label, weights)| series_from_returns(label.clone(), windowed.dates(), &returns, weights))
    .collect()
}
