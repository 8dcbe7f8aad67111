//! # Frontier Solver
//!
//! $$
//! \min_{\mathbf x}\ \sigma_p(\operatorname{softmax}(\mathbf x))
//! \quad\text{or}\quad
//! \max_{\mathbf x}\ S(\operatorname{softmax}(\mathbf x))
//! $$
//!
//! Direct search for the minimum-volatility and maximum-Sharpe portfolios on
//! the long-only simplex. Reported with the same record shape as the
//! simulated extrema, but not tied to the sampled cloud.

use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::solver::neldermead::NelderMead;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::metrics::portfolio_metrics;
use super::types::SimulatedPortfolio;
use crate::error::EngineError;
use crate::error::Result;

/// Nelder-Mead settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
  pub max_iters: u64,
  pub sd_tolerance: f64,
}

impl Default for SolverConfig {
  fn default() -> Self {
    Self {
      max_iters: 5000,
      sd_tolerance: 1e-10,
    }
  }
}

fn softmax(x: &[f64]) -> Array1<f64> {
  if x.is_empty() {
    return Array1::zeros(0);
  }

  let max_x = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  let exps: Array1<f64> = x.iter().map(|&v| (v - max_x).exp()).collect();
  let sum = exps.sum();

  if sum < 1e-15 {
    Array1::from_elem(x.len(), 1.0 / x.len() as f64)
  } else {
    exps / sum
  }
}

#[derive(Clone, Copy, Debug)]
enum Objective {
  MinVolatility,
  MaxSharpe,
}

struct FrontierCost {
  objective: Objective,
  mean_returns: Array1<f64>,
  cov: Array2<f64>,
  risk_free: f64,
}

impl CostFunction for FrontierCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
    let w = softmax(x);
    let m = portfolio_metrics(w.view(), self.mean_returns.view(), self.cov.view(), self.risk_free);
    Ok(match self.objective {
      Objective::MinVolatility => m.volatility,
      Objective::MaxSharpe => -m.sharpe_ratio,
    })
  }
}

fn check_inputs(mean_returns: ArrayView1<f64>, cov: ArrayView2<f64>) -> Result<usize> {
  let n = mean_returns.len();
  if n == 0 {
    return Err(EngineError::EmptyPortfolio);
  }
  if cov.nrows() != n || cov.ncols() != n {
    return Err(EngineError::DimensionMismatch {
      expected: n,
      found: cov.nrows().max(cov.ncols()),
    });
  }
  Ok(n)
}

fn solve(
  objective: Objective,
  mean_returns: ArrayView1<f64>,
  cov: ArrayView2<f64>,
  risk_free: f64,
  config: SolverConfig,
) -> Result<SimulatedPortfolio> {
  let n = check_inputs(mean_returns, cov)?;

  let w = if n == 1 {
    Array1::from_elem(1, 1.0)
  } else {
    let cost = FrontierCost {
      objective,
      mean_returns: mean_returns.to_owned(),
      cov: cov.to_owned(),
      risk_free,
    };

    let x0 = vec![0.0; n];
    let mut simplex = Vec::with_capacity(n + 1);
    simplex.push(x0.clone());
    for i in 0..n {
      let mut point = x0.clone();
      point[i] = 1.0;
      simplex.push(point);
    }

    let solver = NelderMead::new(simplex)
      .with_sd_tolerance(config.sd_tolerance)
      .map_err(|err| EngineError::Config(format!("nelder-mead: {err}")))?;
    let res = Executor::new(cost, solver)
      .configure(|state| state.max_iters(config.max_iters))
      .run()
      .map_err(|err| EngineError::Config(format!("nelder-mead: {err}")))?;

    debug!(?objective, "nelder-mead finished");
    softmax(&res.state.best_param.unwrap_or(x0))
  };

  let metrics = portfolio_metrics(w.view(), mean_returns, cov, risk_free);
  Ok(SimulatedPortfolio::new(w.to_vec(), metrics))
}

/// Long-only portfolio with the lowest volatility.
pub fn solve_min_volatility(
  mean_returns: ArrayView1<f64>,
  cov: ArrayView2<f64>,
  risk_free: f64,
  config: SolverConfig,
) -> Result<SimulatedPortfolio> {
  solve(Objective::MinVolatility, mean_returns, cov, risk_free, config)
}

/// Long-only portfolio with the highest Sharpe ratio.
pub fn solve_max_sharpe(
  mean_returns: ArrayView1<f64>,
  cov: ArrayView2<f64>,
  risk_free: f64,
  config: SolverConfig,
) -> Result<SimulatedPortfolio> {
  solve(Objective::MaxSharpe, mean_returns, cov, risk_free, config)
}
