//! Extraction boundary: anything that can produce raw rows for one edition.
//!
//! Pulling cells out of the PDF and XLSX source documents belongs to
//! external tooling; this crate consumes their output. [`CsvRowSource`]
//! covers the common interchange shape, a CSV file of extracted fields.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use tracing::debug;

use crate::domain::{MetricFamily, RawRow};
use crate::error::RankError;

/// Produces the raw rows of one family/edition. A failure here aborts the
/// whole ingestion pass; no partial store is ever published from it.
pub trait RowSource {
    fn rows(&self, family: MetricFamily, version: i32) -> Result<Vec<RawRow>, RankError>;
}

/// Reads extracted rows from a CSV file with a header row.
///
/// Recognized columns: `journal_name` (or `journal`/`name`), `issn`,
/// `eissn`, `category`, `quartile`, `score`, `year`. Missing optional
/// columns are treated as absent fields; the adapter does the validation.
#[derive(Debug, Clone)]
pub struct CsvRowSource {
    path: Utf8PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "journal", alias = "name")]
    journal_name: String,
    #[serde(default)]
    issn: Option<String>,
    #[serde(default)]
    eissn: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    quartile: Option<String>,
    #[serde(default)]
    score: Option<String>,
    #[serde(default)]
    year: Option<i32>,
}

impl CsvRowSource {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl RowSource for CsvRowSource {
    fn rows(&self, family: MetricFamily, version: i32) -> Result<Vec<RawRow>, RankError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(self.path.as_std_path())
            .map_err(|err| RankError::RowSource(format!("{}: {err}", self.path)))?;

        let mut rows = Vec::new();
        for result in reader.deserialize::<CsvRow>() {
            let row = result.map_err(|err| RankError::RowSource(format!("{}: {err}", self.path)))?;
            rows.push(RawRow {
                journal_name: row.journal_name,
                issn: row.issn,
                eissn: row.eissn,
                category: row.category.unwrap_or_default(),
                quartile: row.quartile,
                score: row.score,
                // Editions publish the previous year's data.
                year: row.year.unwrap_or(version - 1),
                family,
                version,
            });
        }

        debug!(path = %self.path, rows = rows.len(), "read extracted rows");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_rows_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "journal_name,issn,eissn,category,quartile,score").unwrap();
        writeln!(
            file,
            "Nano Letters,1530-6984,1530-6992,NANOSCIENCE - SCIE,Q1,1.234"
        )
        .unwrap();
        writeln!(file, "Acta Chimica,,,CHEMISTRY - SCIE,Q3,").unwrap();

        let source = CsvRowSource::new(Utf8PathBuf::from_path_buf(path).unwrap());
        let rows = source.rows(MetricFamily::Ais, 2024).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].journal_name, "Nano Letters");
        assert_eq!(rows[0].issn.as_deref(), Some("1530-6984"));
        assert_eq!(rows[0].year, 2023);
        assert_eq!(rows[1].issn, None);
        assert_eq!(rows[1].score, None);
    }

    #[test]
    fn missing_file_is_a_row_source_error() {
        let source = CsvRowSource::new("does/not/exist.csv");
        let err = source.rows(MetricFamily::Ais, 2024).unwrap_err();
        assert_matches::assert_matches!(err, RankError::RowSource(_));
    }
}
