//! # Frontier Extrema
//!
//! $$
//! i_{\min\sigma}=\arg\min_i \sigma_i,\qquad i_{\max S}=\arg\max_i S_i
//! $$
//!
//! Selection of the minimum-volatility and maximum-Sharpe records of the
//! simulated cloud. Ties keep the earliest generated record; `NaN` values
//! never win.

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::data::ReturnsModel;
use super::metrics::normalize_weights;
use super::metrics::portfolio_metrics;
use super::types::OptimalPortfolio;
use super::types::PortfolioRole;
use super::types::SimulatedPortfolio;
use crate::error::EngineError;
use crate::error::Result;

/// Optimal portfolios and the user's portfolio, for side-by-side comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrontierSelection {
  pub min_volatility: OptimalPortfolio,
  pub max_sharpe: OptimalPortfolio,
  pub current: OptimalPortfolio,
}

fn first_best<F>(population: &[SimulatedPortfolio], key: F, better: fn(f64, f64) -> bool) -> Option<usize>
where
  F: Fn(&SimulatedPortfolio) -> f64,
{
  let mut best: Option<(usize, f64)> = None;
  for (i, p) in population.iter().enumerate() {
    let v = key(p);
    if v.is_nan() {
      continue;
    }
    match best {
      Some((_, b)) if !better(v, b) => {}
      _ => best = Some((i, v)),
    }
  }
  best.map(|(i, _)| i)
}

/// Index of the lowest-volatility record.
pub fn min_volatility_index(population: &[SimulatedPortfolio]) -> Option<usize> {
  first_best(population, |p| p.volatility, |v, b| v < b)
}

/// Index of the highest-Sharpe record.
pub fn max_sharpe_index(population: &[SimulatedPortfolio]) -> Option<usize> {
  first_best(population, |p| p.sharpe_ratio, |v, b| v > b)
}

/// Evaluate the user's weights with the same calculator as the cloud.
pub fn evaluate_current(model: &ReturnsModel, raw_weights: &[f64], risk_free: f64) -> Result<SimulatedPortfolio> {
  let weights = normalize_weights(raw_weights, model.n_assets())?;
  let metrics = portfolio_metrics(weights.view(), model.mean_returns(), model.covariance(), risk_free);
  Ok(SimulatedPortfolio::new(weights.to_vec(), metrics))
}

/// Pick the extrema of `population` and attach the current portfolio.
pub fn select_extrema(population: &[SimulatedPortfolio], current: SimulatedPortfolio) -> Result<FrontierSelection> {
  let empty = || EngineError::Config("simulated population has no comparable portfolio".to_string());
  let min_idx = min_volatility_index(population).ok_or_else(empty)?;
  let max_idx = max_sharpe_index(population).ok_or_else(empty)?;

  debug!(
    min_volatility_index = min_idx,
    min_volatility = population[min_idx].volatility,
    max_sharpe_index = max_idx,
    max_sharpe = population[max_idx].sharpe_ratio,
    "selected frontier extrema"
  );

  Ok(FrontierSelection {
    min_volatility: OptimalPortfolio {
      role: PortfolioRole::MinVolatility,
      index: Some(min_idx),
      portfolio: population[min_idx].clone(),
    },
    max_sharpe: OptimalPortfolio {
      role: PortfolioRole::MaxSharpe,
      index: Some(max_idx),
      portfolio: population[max_idx].clone(),
    },
    current: OptimalPortfolio {
      role: PortfolioRole::Current,
      index: None,
      portfolio: current,
    },
  })
}

#[cfg(test)]
mod tests {
  use ndarray::array;

  use super::*;
  use crate::portfolio::types::PortfolioMetrics;

  fn record(vol: f64, sharpe: f64) -> SimulatedPortfolio {
    SimulatedPortfolio::new(
      vec![0.5, 0.5],
      PortfolioMetrics {
        expected_return: 0.0,
        volatility: vol,
        sharpe_ratio: sharpe,
      },
    )
  }

  #[test]
  fn ties_keep_first_record() {
    let population = vec![record(0.3, 0.1), record(0.1, 0.9), record(0.1, 0.9), record(0.2, 0.5)];
    assert_eq!(min_volatility_index(&population), Some(1));
    assert_eq!(max_sharpe_index(&population), Some(1));
  }

  #[test]
  fn nan_never_wins() {
    let population = vec![record(f64::NAN, f64::NAN), record(0.2, 0.3), record(0.25, 0.1)];
    assert_eq!(min_volatility_index(&population), Some(1));
    assert_eq!(max_sharpe_index(&population), Some(1));
    assert_eq!(min_volatility_index(&[]), None);
  }

  #[test]
  fn extrema_bound_the_population() {
    let population = vec![record(0.3, 0.1), record(0.15, 0.4), record(0.2, 0.6), record(0.12, 0.2)];
    let selection = select_extrema(&population, record(0.2, 0.2)).unwrap();

    assert_eq!(selection.min_volatility.index, Some(3));
    assert_eq!(selection.max_sharpe.index, Some(2));
    assert_eq!(selection.current.role, PortfolioRole::Current);
    for p in &population {
      assert!(selection.min_volatility.portfolio.volatility <= p.volatility);
      assert!(selection.max_sharpe.portfolio.sharpe_ratio >= p.sharpe_ratio);
    }
  }

  #[test]
  fn empty_population_is_an_error() {
    assert!(matches!(
      select_extrema(&[], record(0.1, 0.1)),
      Err(EngineError::Config(_))
    ));
  }

  #[test]
  fn current_is_normalized_before_evaluation() {
    let model = ReturnsModel::from_parts(
      vec!["A".into(), "B".into()],
      array![0.1, 0.05],
      array![[0.04, 0.0], [0.0, 0.01]],
    )
    .unwrap();

    let scaled = evaluate_current(&model, &[60.0, 40.0], 0.02).unwrap();
    let unit = evaluate_current(&model, &[0.6, 0.4], 0.02).unwrap();
    assert!((scaled.expected_return - unit.expected_return).abs() < 1e-12);
    assert!((scaled.volatility - unit.volatility).abs() < 1e-12);
    assert_eq!(scaled.weights.len(), 2);

    assert!(matches!(
      evaluate_current(&model, &[1.0], 0.02),
      Err(EngineError::DimensionMismatch { .. })
    ));
  }
}
