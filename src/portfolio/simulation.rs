//! # Frontier Simulation
//!
//! $$
//! u_i\sim\mathcal U[0,1),\qquad \mathbf w=\frac{u}{\sum_i u_i}
//! $$
//!
//! Monte-Carlo cloud of random long-only portfolios. The budget is fixed:
//! `N` draws, no convergence criterion.
//!
//! Draws are taken sequentially from a single generator so that the result
//! index equals the draw index; only the `O(A²)` evaluation is spread over
//! worker threads. With a seed the whole population is reproducible.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::Exp1;
use rand_distr::Uniform;
use rayon::prelude::*;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;

use super::data::ReturnsModel;
use super::metrics::portfolio_metrics;
use super::types::SamplingMethod;
use super::types::SimulatedPortfolio;
use crate::error::EngineError;
use crate::error::Result;

/// Configuration for the frontier simulator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
  /// Number of random portfolios.
  pub num_portfolios: usize,
  /// Random seed for reproducibility (None for entropy).
  pub seed: Option<u64>,
  /// Weight sampling scheme.
  pub sampling: SamplingMethod,
  /// Evaluate samples on the rayon pool.
  pub parallel: bool,
}

impl Default for SimulationConfig {
  fn default() -> Self {
    Self {
      num_portfolios: 10_000,
      seed: None,
      sampling: SamplingMethod::IndependentUniform,
      parallel: true,
    }
  }
}

impl SimulationConfig {
  pub fn with_portfolios(mut self, n: usize) -> Self {
    self.num_portfolios = n;
    self
  }

  pub fn with_seed(mut self, seed: u64) -> Self {
    self.seed = Some(seed);
    self
  }

  pub fn with_sampling(mut self, sampling: SamplingMethod) -> Self {
    self.sampling = sampling;
    self
  }

  pub fn sequential(mut self) -> Self {
    self.parallel = false;
    self
  }
}

/// Draw one weight vector on the simplex.
///
/// A draw whose components are all zero is discarded and repeated.
pub fn sample_weights<R: Rng + ?Sized>(
  n_assets: usize,
  method: SamplingMethod,
  rng: &mut R,
) -> Result<Array1<f64>> {
  if n_assets == 0 {
    return Err(EngineError::EmptyPortfolio);
  }
  loop {
    let raw: Array1<f64> = match method {
      SamplingMethod::IndependentUniform => Array1::random_using(n_assets, Uniform::new(0.0, 1.0), &mut *rng),
      SamplingMethod::FlatDirichlet => Array1::random_using(n_assets, Exp1, &mut *rng),
    };
    let total = raw.sum();
    if total > 0.0 {
      return Ok(raw / total);
    }
  }
}

/// Monte-Carlo generator of the frontier cloud.
#[derive(Clone, Debug, Default)]
pub struct FrontierSimulator {
  config: SimulationConfig,
}

impl FrontierSimulator {
  pub fn new(config: SimulationConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &SimulationConfig {
    &self.config
  }

  fn rng(&self) -> StdRng {
    match self.config.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    }
  }

  /// Draw the `N × A` weight matrix, one portfolio per row.
  pub fn draw_weights(&self, n_assets: usize) -> Result<Array2<f64>> {
    if n_assets == 0 {
      return Err(EngineError::EmptyPortfolio);
    }
    if self.config.num_portfolios == 0 {
      return Err(EngineError::Config(
        "num_portfolios must be at least 1".to_string(),
      ));
    }

    let mut rng = self.rng();
    let mut weights = Array2::<f64>::zeros((self.config.num_portfolios, n_assets));
    for mut row in weights.rows_mut() {
      row.assign(&sample_weights(n_assets, self.config.sampling, &mut rng)?);
    }
    Ok(weights)
  }

  /// Simulate the cloud for an estimated returns model.
  pub fn simulate(&self, model: &ReturnsModel, risk_free: f64) -> Result<Vec<SimulatedPortfolio>> {
    self.simulate_with(model.mean_returns(), model.covariance(), risk_free)
  }

  /// Simulate the cloud for raw annualized inputs.
  pub fn simulate_with(
    &self,
    mean_returns: ArrayView1<f64>,
    cov: ArrayView2<f64>,
    risk_free: f64,
  ) -> Result<Vec<SimulatedPortfolio>> {
    let n_assets = mean_returns.len();
    if n_assets == 0 {
      return Err(EngineError::EmptyPortfolio);
    }
    if cov.nrows() != n_assets || cov.ncols() != n_assets {
      return Err(EngineError::DimensionMismatch {
        expected: n_assets,
        found: cov.nrows().max(cov.ncols()),
      });
    }

    info!(
      portfolios = self.config.num_portfolios,
      assets = n_assets,
      sampling = ?self.config.sampling,
      seed = ?self.config.seed,
      parallel = self.config.parallel,
      "simulating frontier cloud"
    );

    let weights = self.draw_weights(n_assets)?;
    let evaluate = |i: usize| {
      let w = weights.row(i);
      SimulatedPortfolio::new(w.to_vec(), portfolio_metrics(w, mean_returns, cov, risk_free))
    };

    let population: Vec<SimulatedPortfolio> = if self.config.parallel {
      (0..weights.nrows()).into_par_iter().map(evaluate).collect()
    } else {
      (0..weights.nrows()).map(evaluate).collect()
    };

    Ok(population)
  }
}
