//! Dataset loading: CSV file, TOML bank, built-in seeds.
//!
//! CSV columns are looked up by header name, so any optional column may be
//! absent. Rows without a riddle or an answer are skipped.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::domain::RiddleRecord;
use crate::seeds::seed_riddles;

pub const DEFAULT_CSV_PATH: &str = "realistic_spiritual_riddles.csv";

#[derive(Debug, Error)]
pub enum DatasetError {
  #[error("failed to read dataset {path}: {source}")]
  Io { path: String, #[source] source: std::io::Error },
  #[error("malformed dataset {path}: {source}")]
  Csv { path: String, #[source] source: csv::Error },
}

/// Loose CSV row: every column optional, `points` kept as text until validated.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CsvRow {
  riddle: String,
  hint: String,
  answer: String,
  religion: String,
  landmark: String,
  difficulty: String,
  points: String,
}

fn parse_points(raw: &str) -> u32 {
  let raw = raw.trim();
  raw.parse::<u32>()
    .ok()
    .or_else(|| raw.parse::<f64>().ok().filter(|p| p.is_finite() && *p >= 0.0).map(|p| p as u32))
    .unwrap_or(0)
}

/// Parse riddle rows from any CSV reader.
pub fn read_riddles<R: std::io::Read>(reader: R, source: &str) -> Result<Vec<RiddleRecord>, DatasetError> {
  let mut rdr = csv::ReaderBuilder::new()
    .trim(csv::Trim::All)
    .flexible(true)
    .from_reader(reader);

  let mut out = Vec::new();
  for (line, row) in rdr.deserialize::<CsvRow>().enumerate() {
    let row = row.map_err(|e| DatasetError::Csv { path: source.to_string(), source: e })?;
    if row.riddle.is_empty() || row.answer.is_empty() {
      error!(target: "riddle", %source, row = line + 1, "Skipping dataset row: missing riddle or answer.");
      continue;
    }
    out.push(RiddleRecord {
      riddle: row.riddle,
      hint: row.hint,
      answer: row.answer,
      religion: row.religion,
      landmark: row.landmark,
      difficulty: row.difficulty,
      points: parse_points(&row.points),
    });
  }
  Ok(out)
}

/// Read the CSV dataset at `path`.
pub fn load_csv(path: &Path) -> Result<Vec<RiddleRecord>, DatasetError> {
  let shown = path.display().to_string();
  let file = std::fs::File::open(path).map_err(|e| DatasetError::Io { path: shown.clone(), source: e })?;
  read_riddles(file, &shown)
}

/// Drop bank entries that would break the corpus invariants.
fn valid_bank(bank: &[RiddleRecord]) -> Vec<RiddleRecord> {
  bank.iter()
    .filter(|r| {
      let ok = !r.riddle.trim().is_empty() && !r.answer.trim().is_empty();
      if !ok {
        error!(target: "riddle", riddle = %r.riddle, "Skipping bank riddle: missing riddle or answer.");
      }
      ok
    })
    .cloned()
    .collect()
}

/// Assemble the corpus: CSV rows, then bank rows; seeds when both are empty.
///
/// A missing CSV file is not fatal; a malformed one is.
#[instrument(level = "info", skip(bank), fields(csv = %csv_path.display(), bank = bank.len()))]
pub fn assemble_corpus(csv_path: &Path, bank: &[RiddleRecord]) -> Result<Vec<RiddleRecord>, DatasetError> {
  let mut records = match load_csv(csv_path) {
    Ok(rows) => {
      info!(target: "riddle", path = %csv_path.display(), rows = rows.len(), "Loaded riddle dataset (CSV)");
      rows
    }
    Err(DatasetError::Io { path, source }) => {
      warn!(target: "riddle", %path, error = %source, "Riddle dataset not readable; continuing without it");
      Vec::new()
    }
    Err(e) => return Err(e),
  };

  records.extend(valid_bank(bank));

  if records.is_empty() {
    warn!(target: "riddle", "No riddles from CSV or config bank; using built-in seeds");
    records = seed_riddles();
  }
  Ok(records)
}

/// CSV path from RIDDLES_CSV_PATH or the default file name.
pub fn csv_path_from_env() -> std::path::PathBuf {
  std::env::var("RIDDLES_CSV_PATH")
    .unwrap_or_else(|_| DEFAULT_CSV_PATH.into())
    .into()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn reads_rows_and_tolerates_missing_columns() {
    let data = "riddle,answer,points\nWhat shines within?,The Self,15\nWho am I?,Atman,\n";
    let rows = read_riddles(data.as_bytes(), "inline").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].answer, "The Self");
    assert_eq!(rows[0].points, 15);
    assert_eq!(rows[0].religion, "");
    assert_eq!(rows[1].points, 0);
  }

  #[test]
  fn invalid_rows_and_points_are_handled() {
    let data = "riddle,hint,answer,religion,landmark,difficulty,points\n\
                ,h,a,hindu,,Easy,10\n\
                q1,h,,hindu,,Easy,10\n\
                q2,h,a2,sikh,Golden Temple,Hard,-4\n\
                q3,h,a3,jain,,Hard,12.0\n";
    let rows = read_riddles(data.as_bytes(), "inline").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].landmark, "Golden Temple");
    assert_eq!(rows[0].points, 0);
    assert_eq!(rows[1].points, 12);
  }

  #[test]
  fn assemble_merges_csv_and_bank() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "riddle,answer\nWhat is eternal?,Truth").unwrap();
    let bank = vec![
      RiddleRecord { riddle: "What grows when shared?".into(), answer: "Love".into(), ..Default::default() },
      RiddleRecord { riddle: "".into(), answer: "skipped".into(), ..Default::default() },
    ];
    let corpus = assemble_corpus(file.path(), &bank).unwrap();
    let answers: Vec<&str> = corpus.iter().map(|r| r.answer.as_str()).collect();
    assert_eq!(answers, vec!["Truth", "Love"]);
  }

  #[test]
  fn missing_csv_without_bank_uses_seeds() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = assemble_corpus(&dir.path().join("absent.csv"), &[]).unwrap();
    assert_eq!(corpus.len(), seed_riddles().len());
  }
}
