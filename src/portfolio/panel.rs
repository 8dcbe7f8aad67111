//! # Price Panel
//!
//! $$
//! P\in\mathbb R^{T\times A},\quad P_{t,i}=\text{close of asset } i \text{ on day } t
//! $$
//!
//! Per-ticker close series and the date-aligned panel the engine consumes.
//! The panel is always two-dimensional, a single asset is a one-column table.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::Months;
use chrono::NaiveDate;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use ndarray::Axis;
use tracing::debug;

use crate::error::EngineError;
use crate::error::Result;

/// Date format of price CSV files.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ordered close prices of one ticker.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetSeries {
  ticker: String,
  points: Vec<(NaiveDate, f64)>,
}

impl AssetSeries {
  /// Build a series, checking dates are strictly increasing and prices positive.
  pub fn new(ticker: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Result<Self> {
    let ticker = ticker.into();
    for pair in points.windows(2) {
      if pair[1].0 <= pair[0].0 {
        return Err(EngineError::UnsortedDates {
          ticker,
          date: pair[1].0,
        });
      }
    }
    for &(date, price) in &points {
      check_price(&ticker, date, price)?;
    }
    Ok(Self { ticker, points })
  }

  pub fn ticker(&self) -> &str {
    &self.ticker
  }

  pub fn points(&self) -> &[(NaiveDate, f64)] {
    &self.points
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  fn price_on(&self, date: NaiveDate) -> Option<f64> {
    self
      .points
      .binary_search_by_key(&date, |(d, _)| *d)
      .ok()
      .map(|i| self.points[i].1)
  }
}

fn check_price(ticker: &str, date: NaiveDate, price: f64) -> Result<()> {
  if price.is_finite() && price > 0.0 {
    Ok(())
  } else {
    Err(EngineError::InvalidPrice {
      ticker: ticker.to_string(),
      date,
      price,
    })
  }
}

/// Close prices of several assets on a common date index.
#[derive(Clone, Debug, PartialEq)]
pub struct PricePanel {
  dates: Vec<NaiveDate>,
  tickers: Vec<String>,
  /// Rows are dates, columns are assets.
  prices: Array2<f64>,
}

impl PricePanel {
  /// Align series on the intersection of their dates.
  ///
  /// Days on which any asset did not trade are dropped for every asset.
  pub fn align(series: impl IntoIterator<Item = AssetSeries>) -> Result<Self> {
    let series: Vec<AssetSeries> = series.into_iter().collect();
    if series.is_empty() {
      return Err(EngineError::EmptyPortfolio);
    }

    for s in &series {
      if s.len() < 2 {
        return Err(EngineError::InsufficientData {
          ticker: s.ticker.clone(),
          points: s.len(),
          required: 2,
        });
      }
    }

    let mut common: BTreeSet<NaiveDate> = series[0].points.iter().map(|(d, _)| *d).collect();
    for s in &series[1..] {
      let dates: BTreeSet<NaiveDate> = s.points.iter().map(|(d, _)| *d).collect();
      common.retain(|d| dates.contains(d));
    }

    let dates: Vec<NaiveDate> = common.into_iter().collect();
    let mut prices = Array2::<f64>::zeros((dates.len(), series.len()));
    for (j, s) in series.iter().enumerate() {
      for (i, date) in dates.iter().enumerate() {
        // every common date exists in every series
        prices[[i, j]] = s.price_on(*date).unwrap_or(f64::NAN);
      }
    }

    debug!(
      assets = series.len(),
      common_dates = dates.len(),
      "aligned price panel"
    );

    Ok(Self {
      dates,
      tickers: series.into_iter().map(|s| s.ticker).collect(),
      prices,
    })
  }

  /// Build a panel from columns that are already aligned on `dates`.
  pub fn from_columns(dates: Vec<NaiveDate>, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
    if columns.is_empty() {
      return Err(EngineError::EmptyPortfolio);
    }
    for pair in dates.windows(2) {
      if pair[1] <= pair[0] {
        return Err(EngineError::UnsortedDates {
          ticker: columns[0].0.clone(),
          date: pair[1],
        });
      }
    }

    let mut prices = Array2::<f64>::zeros((dates.len(), columns.len()));
    for (j, (ticker, values)) in columns.iter().enumerate() {
      if values.len() != dates.len() {
        return Err(EngineError::UnequalLength {
          ticker: ticker.clone(),
          expected: dates.len(),
          found: values.len(),
        });
      }
      for (i, &price) in values.iter().enumerate() {
        check_price(ticker, dates[i], price)?;
        prices[[i, j]] = price;
      }
    }

    Ok(Self {
      dates,
      tickers: columns.into_iter().map(|(t, _)| t).collect(),
      prices,
    })
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  pub fn prices(&self) -> ArrayView2<'_, f64> {
    self.prices.view()
  }

  /// Close prices of one asset, `None` when the ticker is absent.
  pub fn column(&self, ticker: &str) -> Option<ArrayView1<'_, f64>> {
    self
      .position(ticker)
      .map(|j| self.prices.index_axis(Axis(1), j))
  }

  pub fn n_assets(&self) -> usize {
    self.tickers.len()
  }

  /// Number of dates.
  pub fn len(&self) -> usize {
    self.dates.len()
  }

  pub fn is_empty(&self) -> bool {
    self.dates.is_empty()
  }

  fn position(&self, ticker: &str) -> Option<usize> {
    self.tickers.iter().position(|t| t == ticker)
  }

  /// Sub-panel with columns in the requested order.
  pub fn select<S: AsRef<str>>(&self, tickers: &[S]) -> Result<Self> {
    if tickers.is_empty() {
      return Err(EngineError::EmptyPortfolio);
    }

    let mut indices = Vec::with_capacity(tickers.len());
    for t in tickers {
      let t = t.as_ref();
      let j = self
        .position(t)
        .ok_or_else(|| EngineError::MissingAsset(t.to_string()))?;
      indices.push(j);
    }

    Ok(Self {
      dates: self.dates.clone(),
      tickers: tickers.iter().map(|t| t.as_ref().to_string()).collect(),
      prices: self.prices.select(Axis(1), &indices),
    })
  }

  /// Keep the trailing `years` of history, measured back from the last date.
  pub fn last_years(&self, years: u32) -> Self {
    let Some(&last) = self.dates.last() else {
      return self.clone();
    };
    let start = last
      .checked_sub_months(Months::new(years.saturating_mul(12)))
      .unwrap_or(NaiveDate::MIN);
    let first = self.dates.partition_point(|d| *d < start);

    Self {
      dates: self.dates[first..].to_vec(),
      tickers: self.tickers.clone(),
      prices: self.prices.slice(ndarray::s![first.., ..]).to_owned(),
    }
  }
}

/// Read a wide price CSV: `date,<T1>,<T2>,...` with one row per day.
///
/// An empty cell means the asset did not trade that day.
pub fn read_price_csv<R: Read>(reader: R) -> Result<Vec<AssetSeries>> {
  let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
  let headers = rdr.headers()?.clone();
  let tickers: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
  if tickers.is_empty() {
    return Err(EngineError::EmptyPortfolio);
  }

  let mut columns: Vec<Vec<(NaiveDate, f64)>> = vec![Vec::new(); tickers.len()];
  for record in rdr.records() {
    let record = record?;
    let Some(raw_date) = record.get(0) else {
      continue;
    };
    let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)?;
    for (j, cell) in record.iter().skip(1).enumerate().take(tickers.len()) {
      if cell.is_empty() {
        continue;
      }
      let price: f64 = cell.parse().map_err(|_| EngineError::InvalidPrice {
        ticker: tickers[j].clone(),
        date,
        price: f64::NAN,
      })?;
      columns[j].push((date, price));
    }
  }

  tickers
    .into_iter()
    .zip(columns)
    .map(|(ticker, points)| AssetSeries::new(ticker, points))
    .collect()
}

/// Load a wide price CSV from disk.
pub fn load_price_csv(path: impl AsRef<Path>) -> Result<Vec<AssetSeries>> {
  let file = File::open(path.as_ref())?;
  let series = read_price_csv(file)?;
  debug!(path = %path.as_ref().display(), assets = series.len(), "loaded price csv");
  Ok(series)
}
