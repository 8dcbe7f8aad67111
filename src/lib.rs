//! # π²Trading
//!
//! $$
//! \mu = 252\,\bar r,\qquad \Sigma = 252\,\widehat{\operatorname{Cov}}(r),\qquad
//! S = \frac{\mathbf w^\top\mu - r_f}{\sqrt{\mathbf w^\top\Sigma\mathbf w}}
//! $$
//!
//! Portfolio optimization engine: annualized return and covariance estimates
//! from daily closes, a Monte-Carlo efficient-frontier cloud, selection of the
//! minimum-volatility and maximum-Sharpe portfolios, and realized growth
//! series for comparing them with the user's own weights.
//!
//! ```no_run
//! use pi2_trading::portfolio::load_price_csv;
//! use pi2_trading::portfolio::PortfolioEngine;
//! use pi2_trading::portfolio::PortfolioRequest;
//! use pi2_trading::portfolio::PricePanel;
//!
//! let panel = PricePanel::align(load_price_csv("prices.csv").unwrap()).unwrap();
//! let request = PortfolioRequest::new(vec!["AAPL".into(), "TLT".into()], vec![60.0, 40.0]);
//! let analysis = PortfolioEngine::default().analyze(&panel, &request).unwrap();
//! println!("max Sharpe: {:.3}", analysis.selection.max_sharpe.portfolio.sharpe_ratio);
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod portfolio;

pub use error::EngineError;
pub use error::Result;
