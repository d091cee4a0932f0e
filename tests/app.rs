use assert_matches::assert_matches;
use camino::{Utf8Path, Utf8PathBuf};

use uefiscdi_rank::app::{App, SearchFilter};
use uefiscdi_rank::domain::{MetricFamily, Quartile, Query, RawRow};
use uefiscdi_rank::error::RankError;
use uefiscdi_rank::fetch::SourceClient;
use uefiscdi_rank::rows::RowSource;
use uefiscdi_rank::store::CacheStore;

#[derive(Clone, Copy)]
struct DummyClient;

impl SourceClient for DummyClient {
    fn download(&self, _url: &str, destination: &Utf8Path) -> Result<u64, RankError> {
        let payload = b"%PDF-1.4 dummy";
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent.as_std_path())
                .map_err(|err| RankError::Filesystem(err.to_string()))?;
        }
        std::fs::write(destination.as_std_path(), payload)
            .map_err(|err| RankError::Filesystem(err.to_string()))?;
        Ok(payload.len() as u64)
    }
}

struct StaticRows(Vec<RawRow>);

impl RowSource for StaticRows {
    fn rows(&self, _family: MetricFamily, _version: i32) -> Result<Vec<RawRow>, RankError> {
        Ok(self.0.clone())
    }
}

struct FailingRows;

impl RowSource for FailingRows {
    fn rows(&self, _family: MetricFamily, _version: i32) -> Result<Vec<RawRow>, RankError> {
        Err(RankError::RowSource("extractor crashed".to_string()))
    }
}

fn raw(name: &str, issn: Option<&str>, category: &str, quartile: &str) -> RawRow {
    RawRow {
        journal_name: name.to_string(),
        issn: issn.map(str::to_string),
        eissn: None,
        category: category.to_string(),
        quartile: Some(quartile.to_string()),
        score: None,
        year: 2023,
        family: MetricFamily::Jif,
        version: 2024,
    }
}

fn app_in(temp: &tempfile::TempDir) -> App<DummyClient> {
    let root = Utf8PathBuf::from_path_buf(temp.path().join("cache")).unwrap();
    App::new(CacheStore::new_with_path(root), DummyClient)
}

#[test]
fn index_then_resolve() {
    let temp = tempfile::tempdir().unwrap();
    let app = app_in(&temp);

    let source = StaticRows(vec![
        raw(
            "Nano Letters",
            Some("1530-6984"),
            "NANOSCIENCE - SCIE",
            "Q1",
        ),
        raw("Acta Chimica", None, "CHEMISTRY - SCIE", "Q3"),
    ]);
    let indexed = app.index(&source, MetricFamily::Jif, 2024).unwrap();
    assert_eq!(indexed.rows, 2);
    assert_eq!(indexed.records, 2);
    assert!(indexed.diagnostics.is_clean());

    let result = app
        .resolve(&Query::by_issn("1530-6984"), MetricFamily::Jif, 2024)
        .unwrap();
    assert_eq!(result.matches.len(), 1);
    assert!(result.matches[0].primary);
    assert_eq!(result.matches[0].record.canonical_name, "Nano Letters");
}

#[test]
fn resolve_against_unindexed_edition_fails() {
    let temp = tempfile::tempdir().unwrap();
    let app = app_in(&temp);

    let err = app
        .resolve(&Query::by_name("Nano Letters"), MetricFamily::Ais, 2024)
        .unwrap_err();
    assert_matches!(err, RankError::NotIndexed { .. });
}

#[test]
fn failed_row_source_keeps_previous_edition() {
    let temp = tempfile::tempdir().unwrap();
    let app = app_in(&temp);

    let source = StaticRows(vec![raw(
        "Nano Letters",
        Some("1530-6984"),
        "NANOSCIENCE - SCIE",
        "Q1",
    )]);
    app.index(&source, MetricFamily::Jif, 2024).unwrap();

    let err = app.index(&FailingRows, MetricFamily::Jif, 2024).unwrap_err();
    assert_matches!(err, RankError::RowSource(_));

    // The previously published edition must still resolve.
    let result = app
        .resolve(&Query::by_issn("1530-6984"), MetricFamily::Jif, 2024)
        .unwrap();
    assert_eq!(result.matches.len(), 1);
}

#[test]
fn search_filters_by_category_and_quartile() {
    let temp = tempfile::tempdir().unwrap();
    let app = app_in(&temp);

    let source = StaticRows(vec![
        raw(
            "Nano Letters",
            Some("1530-6984"),
            "NANOSCIENCE - SCIE",
            "Q1",
        ),
        raw("Acta Chimica", None, "CHEMISTRY - SCIE", "Q3"),
        raw("Chemistry Letters", None, "CHEMISTRY - SCIE", "Q2"),
    ]);
    app.index(&source, MetricFamily::Jif, 2024).unwrap();

    let filter = SearchFilter {
        category: Some("chem".to_string()),
        ..SearchFilter::default()
    };
    let result = app.search(MetricFamily::Jif, 2024, &filter).unwrap();
    assert_eq!(result.records.len(), 2);

    let filter = SearchFilter {
        category: Some("chem".to_string()),
        min_quartile: Some(Quartile::Q2),
        ..SearchFilter::default()
    };
    let result = app.search(MetricFamily::Jif, 2024, &filter).unwrap();
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].canonical_name, "Chemistry Letters");

    let filter = SearchFilter {
        name: Some("letters".to_string()),
        ..SearchFilter::default()
    };
    let result = app.search(MetricFamily::Jif, 2024, &filter).unwrap();
    assert_eq!(result.records.len(), 2);
}

#[test]
fn min_quartile_tolerates_unranked_records() {
    let temp = tempfile::tempdir().unwrap();
    let app = app_in(&temp);

    let mut unranked = raw("Acta Chimica", None, "CHEMISTRY - SCIE", "Q1");
    unranked.quartile = None;
    unranked.score = Some("0.123".to_string());
    let source = StaticRows(vec![
        raw("Nano Letters", None, "NANOSCIENCE - SCIE", "Q1"),
        raw("Chemistry Letters", None, "CHEMISTRY - SCIE", "Q3"),
        unranked,
    ]);
    app.index(&source, MetricFamily::Jif, 2024).unwrap();

    let filter = SearchFilter {
        min_quartile: Some(Quartile::Q2),
        ..SearchFilter::default()
    };
    let result = app.search(MetricFamily::Jif, 2024, &filter).unwrap();

    // Records without a quartile are kept, not silently dropped.
    let names: Vec<_> = result
        .records
        .iter()
        .map(|record| record.canonical_name.as_str())
        .collect();
    assert_eq!(names, vec!["Acta Chimica", "Nano Letters"]);
}

#[test]
fn fetch_lands_the_source_document_in_the_cache() {
    let temp = tempfile::tempdir().unwrap();
    let app = app_in(&temp);

    let result = app.fetch(MetricFamily::Ais, 2024, None).unwrap();
    assert!(result.path.as_std_path().exists());
    assert!(result.url.contains("uefiscdi.gov.ro"));
    assert_eq!(result.bytes, 14);
}

#[test]
fn fetch_unknown_edition_fails() {
    let temp = tempfile::tempdir().unwrap();
    let app = app_in(&temp);

    let err = app.fetch(MetricFamily::Ais, 2005, None).unwrap_err();
    assert_matches!(err, RankError::UnknownEdition { .. });
}

#[test]
fn list_shows_indexed_editions() {
    let temp = tempfile::tempdir().unwrap();
    let app = app_in(&temp);

    let source = StaticRows(vec![raw(
        "Nano Letters",
        Some("1530-6984"),
        "NANOSCIENCE - SCIE",
        "Q1",
    )]);
    app.index(&source, MetricFamily::Jif, 2024).unwrap();

    let result = app.list().unwrap();
    assert_eq!(result.editions.len(), 1);
    assert_eq!(result.editions[0].family, MetricFamily::Jif);
    assert_eq!(result.editions[0].records, 1);
    assert_eq!(
        result.editions[0].url.as_deref(),
        Some("https://uefiscdi.gov.ro/resource-861733-JCR.iunie.2024.pdf")
    );
}
