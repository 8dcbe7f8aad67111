//! Export of analysis results.
//!
//! - **JSON**: the complete [`FrontierAnalysis`] for a chart layer
//! - **CSV**: the simulated population and the performance series

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::EngineError;
use crate::error::Result;
use crate::portfolio::panel::DATE_FORMAT;
use crate::portfolio::FrontierAnalysis;
use crate::portfolio::PerformanceSeries;
use crate::portfolio::SimulatedPortfolio;

/// Write the analysis as pretty-printed JSON.
pub fn write_analysis_json<W: Write>(analysis: &FrontierAnalysis, writer: W) -> Result<()> {
  serde_json::to_writer_pretty(writer, analysis)?;
  Ok(())
}

pub fn save_analysis_json(analysis: &FrontierAnalysis, path: impl AsRef<Path>) -> Result<()> {
  let file = File::create(path.as_ref())?;
  let mut writer = BufWriter::new(file);
  write_analysis_json(analysis, &mut writer)?;
  writer.flush()?;
  info!(path = %path.as_ref().display(), "exported analysis json");
  Ok(())
}

/// Write the population, one row per portfolio in generation order.
///
/// Columns: `w_<ticker>` per asset, then `return`, `volatility`, `sharpe`.
pub fn write_population_csv<W: Write>(
  tickers: &[String],
  population: &[SimulatedPortfolio],
  writer: W,
) -> Result<()> {
  let mut wtr = csv::Writer::from_writer(writer);

  let mut header: Vec<String> = tickers.iter().map(|t| format!("w_{t}")).collect();
  header.extend(["return", "volatility", "sharpe"].map(String::from));
  wtr.write_record(&header)?;

  for p in population {
    if p.weights.len() != tickers.len() {
      return Err(EngineError::DimensionMismatch {
        expected: tickers.len(),
        found: p.weights.len(),
      });
    }
    let mut row: Vec<String> = p.weights.iter().map(|w| w.to_string()).collect();
    row.push(p.expected_return.to_string());
    row.push(p.volatility.to_string());
    row.push(p.sharpe_ratio.to_string());
    wtr.write_record(&row)?;
  }

  wtr.flush()?;
  Ok(())
}

pub fn save_population_csv(
  tickers: &[String],
  population: &[SimulatedPortfolio],
  path: impl AsRef<Path>,
) -> Result<()> {
  let file = File::create(path.as_ref())?;
  write_population_csv(tickers, population, BufWriter::new(file))?;
  info!(path = %path.as_ref().display(), rows = population.len(), "exported population csv");
  Ok(())
}

/// Write performance series side by side: `date`, then one column per label.
///
/// All series must share the same dates.
pub fn write_performance_csv<W: Write>(series: &[PerformanceSeries], writer: W) -> Result<()> {
  let mut wtr = csv::Writer::from_writer(writer);
  let Some(first) = series.first() else {
    wtr.flush()?;
    return Ok(());
  };

  for s in series {
    if s.dates != first.dates || s.values.len() != s.dates.len() {
      return Err(EngineError::DimensionMismatch {
        expected: first.dates.len(),
        found: s.values.len(),
      });
    }
  }

  let mut header = vec!["date".to_string()];
  header.extend(series.iter().map(|s| s.label.clone()));
  wtr.write_record(&header)?;

  for (t, date) in first.dates.iter().enumerate() {
    let mut row = vec![date.format(DATE_FORMAT).to_string()];
    row.extend(series.iter().map(|s| s.values[t].to_string()));
    wtr.write_record(&row)?;
  }

  wtr.flush()?;
  Ok(())
}

pub fn save_performance_csv(series: &[PerformanceSeries], path: impl AsRef<Path>) -> Result<()> {
  let file = File::create(path.as_ref())?;
  write_performance_csv(series, BufWriter::new(file))?;
  info!(path = %path.as_ref().display(), series = series.len(), "exported performance csv");
  Ok(())
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use tempfile::tempdir;

  use super::*;
  use crate::portfolio::PortfolioMetrics;

  fn population() -> Vec<SimulatedPortfolio> {
    vec![
      SimulatedPortfolio::new(
        vec![0.25, 0.75],
        PortfolioMetrics {
          expected_return: 0.1,
          volatility: 0.2,
          sharpe_ratio: 0.4,
        },
      ),
      SimulatedPortfolio::new(
        vec![0.5, 0.5],
        PortfolioMetrics {
          expected_return: 0.08,
          volatility: 0.1,
          sharpe_ratio: 0.6,
        },
      ),
    ]
  }

  fn series(label: &str, values: Vec<f64>) -> PerformanceSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    PerformanceSeries {
      label: label.to_string(),
      weights: vec![1.0],
      dates: (0..values.len()).map(|i| start + chrono::Days::new(i as u64)).collect(),
      daily_returns: values.windows(2).map(|w| w[1] / w[0] - 1.0).collect(),
      values,
    }
  }

  #[test]
  fn population_csv_layout() {
    let mut buf = Vec::new();
    write_population_csv(&["AAA".into(), "BBB".into()], &population(), &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "w_AAA,w_BBB,return,volatility,sharpe");
    assert_eq!(lines[1], "0.25,0.75,0.1,0.2,0.4");
    assert_eq!(lines.len(), 3);
  }

  #[test]
  fn population_csv_checks_widths() {
    let mut buf = Vec::new();
    let err = write_population_csv(&["AAA".into()], &population(), &mut buf).unwrap_err();
    assert!(matches!(err, EngineError::DimensionMismatch { .. }));
  }

  #[test]
  fn performance_csv_layout() {
    let mut buf = Vec::new();
    write_performance_csv(
      &[series("Current", vec![1.0, 1.015]), series("Maximum Sharpe", vec![1.0, 1.02])],
      &mut buf,
    )
    .unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "date,Current,Maximum Sharpe");
    assert_eq!(lines[1], "2024-01-01,1,1");
    assert_eq!(lines[2], "2024-01-02,1.015,1.02");
  }

  #[test]
  fn performance_csv_rejects_misaligned_series() {
    let mut buf = Vec::new();
    let err = write_performance_csv(
      &[series("a", vec![1.0, 1.1]), series("b", vec![1.0, 1.1, 1.2])],
      &mut buf,
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::DimensionMismatch { .. }));
  }

  #[test]
  fn files_are_written() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("population.csv");
    save_population_csv(&["AAA".into(), "BBB".into()], &population(), &path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("w_AAA"));

    let path = dir.path().join("performance.csv");
    save_performance_csv(&[series("x", vec![1.0, 2.0])], &path).unwrap();
    assert!(std::fs::read_to_string(&path).unwrap().contains("2024-01-02,2"));
  }
}
