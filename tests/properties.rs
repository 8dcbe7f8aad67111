//! Property-based tests for the portfolio invariants.
//!
//! These tests verify that:
//! 1. Metrics of normalized weights do not depend on the weight scale
//! 2. Simulated weights stay on the simplex and volatility is never negative
//! 3. The selected extrema bound the whole population
//! 4. Growth series stay non-negative for returns no worse than -100%

use approx::assert_abs_diff_eq;
use ndarray::Array1;
use ndarray::Array2;
use proptest::prelude::*;

use pi2_trading::portfolio::cumulative_growth;
use pi2_trading::portfolio::evaluate_current;
use pi2_trading::portfolio::normalize_weights;
use pi2_trading::portfolio::portfolio_metrics;
use pi2_trading::portfolio::select_extrema;
use pi2_trading::portfolio::FrontierSimulator;
use pi2_trading::portfolio::ReturnsModel;
use pi2_trading::portfolio::SamplingMethod;
use pi2_trading::portfolio::SimulationConfig;

const ASSETS: usize = 3;

/// Positive semi-definite covariance `A Aᵀ` with a small ridge.
fn covariance_strategy() -> impl Strategy<Value = Array2<f64>> {
  prop::collection::vec(-0.3..0.3f64, ASSETS * ASSETS).prop_map(|entries| {
    let a = Array2::from_shape_vec((ASSETS, ASSETS), entries).unwrap_or_else(|_| Array2::zeros((ASSETS, ASSETS)));
    a.dot(&a.t()) + Array2::<f64>::eye(ASSETS) * 1e-3
  })
}

fn mean_strategy() -> impl Strategy<Value = Array1<f64>> {
  prop::collection::vec(-0.2..0.4f64, ASSETS).prop_map(Array1::from)
}

fn model(mu: Array1<f64>, cov: Array2<f64>) -> ReturnsModel {
  let tickers = (0..ASSETS).map(|i| format!("A{i}")).collect();
  ReturnsModel::from_parts(tickers, mu, cov).unwrap()
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(64))]

  #[test]
  fn metrics_are_scale_invariant(
    raw in prop::collection::vec(0.01..10.0f64, ASSETS),
    scale in 0.1..100.0f64,
    mu in mean_strategy(),
    cov in covariance_strategy(),
  ) {
    let scaled: Vec<f64> = raw.iter().map(|w| w * scale).collect();
    let w1 = normalize_weights(&raw, ASSETS).unwrap();
    let w2 = normalize_weights(&scaled, ASSETS).unwrap();

    let m1 = portfolio_metrics(w1.view(), mu.view(), cov.view(), 0.02);
    let m2 = portfolio_metrics(w2.view(), mu.view(), cov.view(), 0.02);

    assert_abs_diff_eq!(m1.expected_return, m2.expected_return, epsilon = 1e-9);
    assert_abs_diff_eq!(m1.volatility, m2.volatility, epsilon = 1e-9);
    assert_abs_diff_eq!(m1.sharpe_ratio, m2.sharpe_ratio, epsilon = 1e-6);
  }

  #[test]
  fn single_asset_metrics_are_exact(mu in -0.5..0.5f64, var in 0.0..1.0f64) {
    let w = Array1::from(vec![1.0]);
    let m = portfolio_metrics(w.view(), Array1::from(vec![mu]).view(), Array2::from_elem((1, 1), var).view(), 0.0);
    prop_assert_eq!(m.expected_return, mu);
    prop_assert_eq!(m.volatility, var.sqrt());
  }

  #[test]
  fn population_lies_on_the_simplex(
    seed in any::<u64>(),
    dirichlet in any::<bool>(),
    mu in mean_strategy(),
    cov in covariance_strategy(),
  ) {
    let sampling = if dirichlet { SamplingMethod::FlatDirichlet } else { SamplingMethod::IndependentUniform };
    let sim = FrontierSimulator::new(
      SimulationConfig::default().with_portfolios(200).with_seed(seed).with_sampling(sampling),
    );
    let population = sim.simulate_with(mu.view(), cov.view(), 0.02).unwrap();

    prop_assert_eq!(population.len(), 200);
    for p in &population {
      prop_assert!(p.weights.iter().all(|w| *w >= 0.0));
      assert_abs_diff_eq!(p.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
      prop_assert!(p.volatility >= 0.0);
    }
  }

  #[test]
  fn extrema_bound_the_population(
    seed in any::<u64>(),
    mu in mean_strategy(),
    cov in covariance_strategy(),
  ) {
    let model = model(mu, cov);
    let sim = FrontierSimulator::new(SimulationConfig::default().with_portfolios(300).with_seed(seed));
    let population = sim.simulate(&model, 0.02).unwrap();
    let current = evaluate_current(&model, &[1.0, 1.0, 1.0], 0.02).unwrap();
    let selection = select_extrema(&population, current).unwrap();

    for p in &population {
      prop_assert!(selection.min_volatility.portfolio.volatility <= p.volatility);
      prop_assert!(selection.max_sharpe.portfolio.sharpe_ratio >= p.sharpe_ratio);
    }
    let i = selection.max_sharpe.index.unwrap();
    prop_assert_eq!(&population[i], &selection.max_sharpe.portfolio);
  }

  #[test]
  fn growth_is_non_negative(daily in prop::collection::vec(-1.0..1.0f64, 1..100)) {
    let growth = cumulative_growth(Array1::from(daily).view());
    prop_assert_eq!(growth[0], 1.0);
    prop_assert!(growth.iter().all(|v| *v >= 0.0));
  }
}
