//! # Errors
//!
//! Error taxonomy for the portfolio engine. Every computational failure aborts
//! the request and propagates to the caller; nothing is retried internally.

use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for the portfolio engine.
#[derive(Error, Debug)]
pub enum EngineError {
  #[error("asset {0} is missing from the price panel")]
  MissingAsset(String),

  #[error("insufficient data for {ticker}: {points} price point(s), at least {required} required")]
  InsufficientData {
    ticker: String,
    points: usize,
    required: usize,
  },

  #[error("portfolio has no assets")]
  EmptyPortfolio,

  #[error("series {ticker} has {found} points, expected {expected}")]
  UnequalLength {
    ticker: String,
    expected: usize,
    found: usize,
  },

  #[error("dates of {ticker} are not strictly increasing at {date}")]
  UnsortedDates { ticker: String, date: NaiveDate },

  #[error("invalid price {price} for {ticker} on {date}")]
  InvalidPrice {
    ticker: String,
    date: NaiveDate,
    price: f64,
  },

  #[error("invalid weights: {0}")]
  InvalidWeights(String),

  #[error("dimension mismatch: expected {expected}, found {found}")]
  DimensionMismatch { expected: usize, found: usize },

  #[error("invalid configuration: {0}")]
  Config(String),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("JSON serialization error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("TOML parsing error: {0}")]
  Toml(#[from] toml::de::Error),

  #[error("date parsing error: {0}")]
  DateParse(#[from] chrono::ParseError),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
