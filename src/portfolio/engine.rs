//! # Portfolio Engine
//!
//! $$
//! P \to (\mu,\Sigma) \to \{\mathbf w_k\}_{k=1}^N \to (\mathbf w_{\min\sigma},\mathbf w_{\max S}) \to V_t
//! $$
//!
//! High-level orchestration: estimation, simulation, extremum selection and
//! performance series for one request. Stateless between calls.

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;

use super::data::ReturnsModel;
use super::frontier::evaluate_current;
use super::frontier::select_extrema;
use super::frontier::FrontierSelection;
use super::metrics::WeightSummary;
use super::panel::PricePanel;
use super::performance::compare_performance;
use super::performance::performance_series;
use super::performance::PerformanceSeries;
use super::simulation::FrontierSimulator;
use super::simulation::SimulationConfig;
use super::solver::solve_max_sharpe;
use super::solver::solve_min_volatility;
use super::solver::SolverConfig;
use super::types::AssetPoint;
use super::types::OptimalPortfolio;
use super::types::OptimizerMethod;
use super::types::PortfolioMetrics;
use super::types::PortfolioRole;
use super::types::SimulatedPortfolio;
use super::types::DEFAULT_RISK_FREE_RATE;
use crate::error::EngineError;
use crate::error::Result;

/// Runtime configuration for [`PortfolioEngine`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEngineConfig {
  /// Monte-Carlo settings.
  pub simulation: SimulationConfig,
  /// How the optimal portfolios are picked.
  pub optimizer: OptimizerMethod,
  /// Settings for [`OptimizerMethod::NelderMead`].
  pub solver: SolverConfig,
  /// Annual risk-free rate in decimal form; [`DEFAULT_RISK_FREE_RATE`] when unset.
  pub risk_free: Option<f64>,
  /// Trailing years of history used for estimation and performance.
  pub window_years: Option<u32>,
  /// Trailing years behind the realized statistics of the current portfolio.
  pub realized_years: Option<u32>,
}

impl Default for PortfolioEngineConfig {
  fn default() -> Self {
    Self {
      simulation: SimulationConfig::default(),
      optimizer: OptimizerMethod::MonteCarlo,
      solver: SolverConfig::default(),
      risk_free: None,
      window_years: Some(10),
      realized_years: Some(1),
    }
  }
}

/// The user's portfolio: tickers and raw weights (any positive scale).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRequest {
  pub tickers: Vec<String>,
  pub weights: Vec<f64>,
}

impl PortfolioRequest {
  pub fn new(tickers: Vec<String>, weights: Vec<f64>) -> Self {
    Self { tickers, weights }
  }
}

/// Everything computed for one request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrontierAnalysis {
  pub tickers: Vec<String>,
  pub risk_free_rate: f64,
  pub window_start: NaiveDate,
  pub window_end: NaiveDate,
  /// Number of daily returns behind the estimates.
  pub observations: usize,
  /// Per-asset annualized return and volatility.
  pub assets: Vec<AssetPoint>,
  /// Correlation matrix of the assets, row-major.
  pub correlation: Vec<Vec<f64>>,
  /// Weights as entered, before normalization.
  pub weight_summary: WeightSummary,
  /// The simulated cloud in generation order.
  pub population: Vec<SimulatedPortfolio>,
  pub selection: FrontierSelection,
  /// Realized statistics of the current portfolio over the trailing
  /// `realized_years`.
  pub realized: PortfolioMetrics,
  /// Current, minimum-volatility and maximum-Sharpe growth, in that order.
  pub performance: Vec<PerformanceSeries>,
}

/// Single entry-point engine for frontier analysis.
#[derive(Clone, Debug, Default)]
pub struct PortfolioEngine {
  config: PortfolioEngineConfig,
}

impl PortfolioEngine {
  /// Construct a new engine with explicit configuration.
  pub fn new(config: PortfolioEngineConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &PortfolioEngineConfig {
    &self.config
  }

  /// Risk-free rate in effect.
  pub fn risk_free(&self) -> f64 {
    self.config.risk_free.unwrap_or(DEFAULT_RISK_FREE_RATE)
  }

  fn window(&self, panel: &PricePanel) -> PricePanel {
    match self.config.window_years {
      Some(years) => panel.last_years(years),
      None => panel.clone(),
    }
  }

  /// Estimate the returns model of `tickers` over the configured window.
  pub fn estimate<S: AsRef<str>>(&self, panel: &PricePanel, tickers: &[S]) -> Result<ReturnsModel> {
    let selected = panel.select(tickers)?;
    ReturnsModel::estimate(&self.window(&selected))
  }

  /// Simulate the frontier cloud for `model`.
  pub fn simulate(&self, model: &ReturnsModel) -> Result<Vec<SimulatedPortfolio>> {
    FrontierSimulator::new(self.config.simulation.clone()).simulate(model, self.risk_free())
  }

  /// Pick the optimal portfolios and evaluate the user's weights.
  pub fn select(
    &self,
    model: &ReturnsModel,
    population: &[SimulatedPortfolio],
    raw_weights: &[f64],
  ) -> Result<FrontierSelection> {
    let rf = self.risk_free();
    let current = evaluate_current(model, raw_weights, rf)?;
    let selection = select_extrema(population, current)?;

    match self.config.optimizer {
      OptimizerMethod::MonteCarlo => Ok(selection),
      OptimizerMethod::NelderMead => {
        let mu = model.mean_returns();
        let cov = model.covariance();
        Ok(FrontierSelection {
          min_volatility: OptimalPortfolio {
            role: PortfolioRole::MinVolatility,
            index: None,
            portfolio: solve_min_volatility(mu, cov, rf, self.config.solver)?,
          },
          max_sharpe: OptimalPortfolio {
            role: PortfolioRole::MaxSharpe,
            index: None,
            portfolio: solve_max_sharpe(mu, cov, rf, self.config.solver)?,
          },
          current: selection.current,
        })
      }
    }
  }

  /// Growth of the current and optimal weightings over the window.
  pub fn performance<S: AsRef<str>>(
    &self,
    panel: &PricePanel,
    tickers: &[S],
    selection: &FrontierSelection,
  ) -> Result<Vec<PerformanceSeries>> {
    let weightings: Vec<(String, Vec<f64>)> = [
      &selection.current,
      &selection.min_volatility,
      &selection.max_sharpe,
    ]
    .iter()
    .map(|p| (p.role.to_string(), p.portfolio.weights.clone()))
    .collect();

    compare_performance(panel, tickers, &weightings, self.config.window_years)
  }

  /// Realized return, volatility and Sharpe ratio of `portfolio` over the
  /// trailing `realized_years` of `panel`.
  pub fn realized<S: AsRef<str>>(
    &self,
    panel: &PricePanel,
    tickers: &[S],
    portfolio: &OptimalPortfolio,
  ) -> Result<PortfolioMetrics> {
    let series = performance_series(
      panel,
      tickers,
      &portfolio.portfolio.weights,
      self.config.realized_years,
      portfolio.role.to_string(),
    )?;
    Ok(series.realized_metrics(self.risk_free()))
  }

  /// Run the full analysis for one portfolio.
  pub fn analyze(&self, panel: &PricePanel, request: &PortfolioRequest) -> Result<FrontierAnalysis> {
    info!(tickers = ?request.tickers, "starting frontier analysis");
    if request.tickers.is_empty() {
      return Err(EngineError::EmptyPortfolio);
    }
    if request.weights.len() != request.tickers.len() {
      return Err(EngineError::DimensionMismatch {
        expected: request.tickers.len(),
        found: request.weights.len(),
      });
    }

    let windowed = self.window(&panel.select(&request.tickers)?);
    let model = ReturnsModel::estimate(&windowed)?;
    let population = self.simulate(&model)?;
    let selection = self.select(&model, &population, &request.weights)?;
    let performance = self.performance(&windowed, &request.tickers, &selection)?;
    let realized = self.realized(&windowed, &request.tickers, &selection.current)?;

    info!(
      portfolios = population.len(),
      min_volatility = selection.min_volatility.portfolio.volatility,
      max_sharpe = selection.max_sharpe.portfolio.sharpe_ratio,
      current_sharpe = selection.current.portfolio.sharpe_ratio,
      "frontier analysis complete"
    );

    let dates = windowed.dates();
    Ok(FrontierAnalysis {
      tickers: request.tickers.clone(),
      risk_free_rate: self.risk_free(),
      window_start: dates[0],
      window_end: dates[dates.len() - 1],
      observations: windowed.len() - 1,
      assets: model.asset_points(),
      correlation: model
        .correlation()
        .outer_iter()
        .map(|row| row.to_vec())
        .collect(),
      weight_summary: WeightSummary::from_weights(&request.weights),
      population,
      selection,
      realized,
      performance,
    })
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use tracing_test::traced_test;

  use super::*;

  fn panel() -> PricePanel {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let dates: Vec<NaiveDate> = (0..60).map(|i| start + chrono::Days::new(i)).collect();
    let a: Vec<f64> = (0..60).map(|i| 100.0 * (1.0 + 0.01 * ((i as f64) * 0.7).sin())).collect();
    let b: Vec<f64> = (0..60)
      .map(|i| 50.0 * (1.0 + 0.002 * i as f64 + 0.015 * ((i as f64) * 0.37).sin()))
      .collect();
    let c: Vec<f64> = (0..60).map(|i| 20.0 * (1.0 + 0.03 * ((i as f64) * 1.3).cos())).collect();
    PricePanel::from_columns(dates, vec![("AAA".into(), a), ("BBB".into(), b), ("CCC".into(), c)]).unwrap()
  }

  fn engine() -> PortfolioEngine {
    PortfolioEngine::new(PortfolioEngineConfig {
      simulation: SimulationConfig::default().with_portfolios(2000).with_seed(17),
      risk_free: Some(0.02),
      ..Default::default()
    })
  }

  fn request() -> PortfolioRequest {
    PortfolioRequest::new(
      vec!["AAA".into(), "BBB".into(), "CCC".into()],
      vec![40.0, 30.0, 30.0],
    )
  }

  #[test]
  #[traced_test]
  fn analyze_runs_full_pipeline() {
    let analysis = engine().analyze(&panel(), &request()).unwrap();

    assert_eq!(analysis.population.len(), 2000);
    assert_eq!(analysis.assets.len(), 3);
    assert_eq!(analysis.observations, 59);
    assert_eq!(analysis.performance.len(), 3);
    assert_eq!(analysis.performance[0].label, "Current");
    assert_eq!(analysis.weight_summary.total, 100.0);
    assert_abs_diff_eq!(
      analysis.selection.current.portfolio.weights.iter().sum::<f64>(),
      1.0,
      epsilon = 1e-12
    );

    for p in &analysis.population {
      assert!(analysis.selection.min_volatility.portfolio.volatility <= p.volatility);
      assert!(analysis.selection.max_sharpe.portfolio.sharpe_ratio >= p.sharpe_ratio);
    }
    for s in &analysis.performance {
      assert_eq!(s.values[0], 1.0);
    }

    assert!(logs_contain("simulating frontier cloud"));
    assert!(logs_contain("frontier analysis complete"));
  }

  #[test]
  fn seeded_analysis_is_deterministic() {
    let a = engine().analyze(&panel(), &request()).unwrap();
    let b = engine().analyze(&panel(), &request()).unwrap();
    assert_eq!(a.selection, b.selection);
  }

  #[test]
  fn current_metrics_match_the_cloud_calculator() {
    let engine = engine();
    let model = engine.estimate(&panel(), &request().tickers).unwrap();
    let population = engine.simulate(&model).unwrap();
    let selection = engine.select(&model, &population, &[0.4, 0.3, 0.3]).unwrap();
    let scaled = engine.select(&model, &population, &[4.0, 3.0, 3.0]).unwrap();
    assert_eq!(selection.current, scaled.current);
  }

  #[test]
  fn nelder_mead_is_at_least_as_good_as_the_cloud() {
    let mc = engine();
    let nm = PortfolioEngine::new(PortfolioEngineConfig {
      optimizer: OptimizerMethod::NelderMead,
      ..mc.config().clone()
    });

    let model = mc.estimate(&panel(), &request().tickers).unwrap();
    let population = mc.simulate(&model).unwrap();
    let cloud = mc.select(&model, &population, &request().weights).unwrap();
    let solved = nm.select(&model, &population, &request().weights).unwrap();

    assert_eq!(solved.min_volatility.index, None);
    assert!(solved.min_volatility.portfolio.volatility <= cloud.min_volatility.portfolio.volatility + 1e-6);
    assert!(solved.max_sharpe.portfolio.sharpe_ratio >= cloud.max_sharpe.portfolio.sharpe_ratio - 1e-6);
  }

  #[test]
  fn request_errors_propagate() {
    let engine = engine();
    let missing = PortfolioRequest::new(vec!["AAA".into(), "ZZZ".into()], vec![1.0, 1.0]);
    assert!(matches!(
      engine.analyze(&panel(), &missing),
      Err(EngineError::MissingAsset(ref t)) if t == "ZZZ"
    ));

    let empty = PortfolioRequest::default();
    assert!(matches!(engine.analyze(&panel(), &empty), Err(EngineError::EmptyPortfolio)));

    let short = PortfolioRequest::new(vec!["AAA".into()], vec![]);
    assert!(matches!(
      engine.analyze(&panel(), &short),
      Err(EngineError::DimensionMismatch { .. })
    ));
  }

  #[test]
  fn realized_stats_use_the_trailing_year() {
    let start = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
    let dates: Vec<NaiveDate> = (0..900).map(|i| start + chrono::Days::new(i)).collect();
    let a: Vec<f64> = (0..900).map(|i| 100.0 * (1.0 + 0.0005 * i as f64 + 0.01 * ((i as f64) * 0.7).sin())).collect();
    let b: Vec<f64> = (0..900).map(|i| 50.0 * (1.0 + 0.02 * ((i as f64) * 0.37).sin())).collect();
    let panel = PricePanel::from_columns(dates, vec![("AAA".into(), a), ("BBB".into(), b)]).unwrap();
    let request = PortfolioRequest::new(vec!["AAA".into(), "BBB".into()], vec![1.0, 1.0]);

    let analysis = engine().analyze(&panel, &request).unwrap();
    let last_year = performance_series(&panel, &request.tickers, &[0.5, 0.5], Some(1), "x").unwrap();
    let full = performance_series(&panel, &request.tickers, &[0.5, 0.5], None, "x").unwrap();

    let expected = last_year.realized_metrics(0.02);
    assert_abs_diff_eq!(analysis.realized.expected_return, expected.expected_return, epsilon = 1e-12);
    assert_abs_diff_eq!(analysis.realized.volatility, expected.volatility, epsilon = 1e-12);
    assert!(last_year.daily_returns.len() < full.daily_returns.len());
    assert_eq!(analysis.performance[0].daily_returns.len(), full.daily_returns.len());
  }

  #[test]
  fn default_risk_free_rate() {
    assert_eq!(PortfolioEngine::default().risk_free(), DEFAULT_RISK_FREE_RATE);
  }
}
