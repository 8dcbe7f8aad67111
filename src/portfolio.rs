//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Return/covariance estimation, Monte-Carlo efficient frontier, extremum
//! selection and realized performance series.

pub mod data;
pub mod engine;
pub mod frontier;
pub mod metrics;
pub mod panel;
pub mod performance;
pub mod simulation;
pub mod solver;
pub mod types;

pub use data::ReturnsModel;
pub use data::sample_covariance;
pub use data::simple_returns;
pub use engine::FrontierAnalysis;
pub use engine::PortfolioEngine;
pub use engine::PortfolioEngineConfig;
pub use engine::PortfolioRequest;
pub use frontier::FrontierSelection;
pub use frontier::evaluate_current;
pub use frontier::select_extrema;
pub use metrics::WeightSummary;
pub use metrics::normalize_weights;
pub use metrics::portfolio_metrics;
pub use panel::AssetSeries;
pub use panel::PricePanel;
pub use panel::load_price_csv;
pub use panel::read_price_csv;
pub use performance::PerformanceSeries;
pub use performance::compare_performance;
pub use performance::cumulative_growth;
pub use performance::performance_series;
pub use simulation::FrontierSimulator;
pub use simulation::SimulationConfig;
pub use solver::SolverConfig;
pub use solver::solve_max_sharpe;
pub use solver::solve_min_volatility;
pub use types::AssetPoint;
pub use types::OptimalPortfolio;
pub use types::OptimizerMethod;
pub use types::PortfolioMetrics;
pub use types::PortfolioRole;
pub use types::SamplingMethod;
pub use types::SimulatedPortfolio;
pub use types::DEFAULT_RISK_FREE_RATE;
pub use types::TRADING_DAYS;
