//! In-memory record store for one metric family and edition.
//!
//! Construction is a single batch pass: raw rows are adapted, grouped by
//! normalized key, merged under the rank-precedence policy and frozen. A
//! published store is immutable; re-indexing builds a fresh store and the
//! host swaps it in wholesale, so readers never observe a half-merged state.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapt::{self, Diagnostics, IssnConflict};
use crate::domain::{CitationIndex, Issn, MetricFamily, Quartile, Query, RawRow};
use crate::error::RankError;
use crate::normalize::normalize;

/// One subject-category listing of a journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub category: String,
    pub index: Option<CitationIndex>,
    pub quartile: Option<Quartile>,
    pub score: Option<f64>,
}

/// The best classification a journal achieved across its categories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestRank {
    pub quartile: Option<Quartile>,
    pub score: Option<f64>,
}

/// The canonical merged entity for one journal within one family's store.
///
/// `categories` is sorted by descending rank, so `best` always mirrors
/// `categories[0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub canonical_name: String,
    pub normalized_key: String,
    pub issns: Vec<Issn>,
    pub categories: Vec<CategoryEntry>,
    pub best: BestRank,
}

impl ScoreRecord {
    /// One-line rendering, e.g. `[AIS 1.234] Nano Letters (Nanoscience)`.
    pub fn stringify(&self, family: MetricFamily) -> String {
        let value = match (self.best.score, self.best.quartile) {
            (Some(score), _) => format!("{score:.3}"),
            (None, Some(quartile)) => quartile.to_string(),
            (None, None) => "N/A".to_string(),
        };
        let category = self
            .categories
            .first()
            .map(|entry| entry.category.as_str())
            .unwrap_or("unknown category");
        format!(
            "[{} {value}] {} ({category})",
            family.as_str().to_uppercase(),
            self.canonical_name
        )
    }
}

/// How a [`Match`] was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Issn,
    Name,
}

/// One candidate returned by [`RecordStore::resolve_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'a> {
    pub record: &'a ScoreRecord,
    pub source: MatchSource,
    pub primary: bool,
}

/// Plain serializable form of a store, used at the persistence boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreExport {
    pub family: MetricFamily,
    pub version: i32,
    pub records: Vec<ScoreRecord>,
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    family: MetricFamily,
    version: i32,
    records: Vec<ScoreRecord>,
    by_key: HashMap<String, usize>,
    by_issn: HashMap<Issn, usize>,
}

impl RecordStore {
    /// Build a store from one ingestion pass over `rows`.
    ///
    /// Per-row problems never abort the build; they are reported in the
    /// returned [`Diagnostics`].
    pub fn build(rows: &[RawRow], family: MetricFamily, version: i32) -> (Self, Diagnostics) {
        let mut diagnostics = Diagnostics::default();
        let adapted = adapt::adapt_rows(rows, &mut diagnostics);

        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Partial> = HashMap::new();
        // First claim wins: an ISSN is never reassigned within one build.
        let mut claims: HashMap<Issn, (String, String)> = HashMap::new();

        for row in adapted {
            if !groups.contains_key(&row.key) {
                order.push(row.key.clone());
            }
            let partial = groups.entry(row.key.clone()).or_insert_with(|| Partial {
                name: row.name.clone(),
                issns: Vec::new(),
                categories: Vec::new(),
            });

            for issn in &row.issns {
                match claims.get(issn) {
                    Some((owner, owner_name)) if *owner != row.key => {
                        debug!(%issn, kept = %owner, rejected = %row.key, "ISSN conflict");
                        diagnostics.issn_conflicts.push(IssnConflict {
                            issn: issn.to_string(),
                            kept: owner_name.clone(),
                            rejected: row.name.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        claims.insert(issn.clone(), (row.key.clone(), row.name.clone()));
                        partial.issns.push(issn.clone());
                    }
                }
            }

            let entry = CategoryEntry {
                category: row.category,
                index: row.index,
                quartile: row.quartile,
                score: row.score,
            };
            match partial
                .categories
                .iter_mut()
                .find(|existing| existing.category == entry.category)
            {
                // Duplicate listing in one category: keep the better rank.
                // Exact ties keep the first encountered.
                Some(existing) => {
                    if rank_cmp(&entry, existing) == Ordering::Less {
                        *existing = entry;
                    }
                }
                None => partial.categories.push(entry),
            }
        }

        let mut records = Vec::with_capacity(order.len());
        for key in order {
            let mut partial = groups.remove(&key).expect("grouped key");
            partial.categories.sort_by(rank_cmp);
            partial.issns.sort();
            let best = partial
                .categories
                .first()
                .map(|entry| BestRank {
                    quartile: entry.quartile,
                    score: entry.score,
                })
                .expect("merged record has at least one category");
            records.push(ScoreRecord {
                canonical_name: partial.name,
                normalized_key: key,
                issns: partial.issns,
                categories: partial.categories,
                best,
            });
        }
        records.sort_by(|a, b| a.normalized_key.cmp(&b.normalized_key));

        let store = Self::from_records(family, version, records);
        info!(
            family = %family,
            version,
            rows = rows.len(),
            records = store.len(),
            "built record store"
        );
        (store, diagnostics)
    }

    fn from_records(family: MetricFamily, version: i32, records: Vec<ScoreRecord>) -> Self {
        let mut by_key = HashMap::with_capacity(records.len());
        let mut by_issn = HashMap::new();
        for (position, record) in records.iter().enumerate() {
            by_key.insert(record.normalized_key.clone(), position);
            for issn in &record.issns {
                by_issn.insert(issn.clone(), position);
            }
        }
        Self {
            family,
            version,
            records,
            by_key,
            by_issn,
        }
    }

    pub fn family(&self) -> MetricFamily {
        self.family
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn get_by_key(&self, key: &str) -> Option<&ScoreRecord> {
        self.by_key.get(key).map(|&position| &self.records[position])
    }

    pub fn get_by_issn(&self, issn: &Issn) -> Option<&ScoreRecord> {
        self.by_issn
            .get(issn)
            .map(|&position| &self.records[position])
    }

    /// Resolve a query to the single best record.
    ///
    /// An ISSN match always wins over a name match. Name matching is exact
    /// on the normalized key; no fuzzy fallback is attempted. A query with
    /// neither identity field is a caller error.
    pub fn resolve(&self, query: &Query) -> Result<Option<&ScoreRecord>, RankError> {
        if query.is_empty() {
            return Err(RankError::InvalidQuery);
        }
        if let Some(record) = self.issn_lookup(query) {
            return Ok(Some(record));
        }
        Ok(self.name_lookup(query))
    }

    /// Resolve a query to all plausible candidates, flagging the primary.
    ///
    /// When the ISSN and the name point at different records (inconsistent
    /// source data), both are returned with the ISSN-derived one primary.
    pub fn resolve_all(&self, query: &Query) -> Result<Vec<Match<'_>>, RankError> {
        if query.is_empty() {
            return Err(RankError::InvalidQuery);
        }
        let by_issn = self.issn_lookup(query);
        let by_name = self.name_lookup(query);

        let matches = match (by_issn, by_name) {
            (Some(issn_record), Some(name_record))
                if !std::ptr::eq(issn_record, name_record) =>
            {
                vec![
                    Match {
                        record: issn_record,
                        source: MatchSource::Issn,
                        primary: true,
                    },
                    Match {
                        record: name_record,
                        source: MatchSource::Name,
                        primary: false,
                    },
                ]
            }
            (Some(record), _) => vec![Match {
                record,
                source: MatchSource::Issn,
                primary: true,
            }],
            (None, Some(record)) => vec![Match {
                record,
                source: MatchSource::Name,
                primary: true,
            }],
            (None, None) => Vec::new(),
        };
        Ok(matches)
    }

    /// Iterate over records matching `predicate`. Restartable: every call
    /// iterates from the start of the store.
    pub fn search<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a ScoreRecord>
    where
        P: Fn(&ScoreRecord) -> bool + 'a,
    {
        self.records.iter().filter(move |record| predicate(record))
    }

    /// Export to the plain record list used at the persistence boundary.
    pub fn export(&self) -> StoreExport {
        StoreExport {
            family: self.family,
            version: self.version,
            records: self.records.clone(),
        }
    }

    /// Rebuild a store (records and indices) from its exported form.
    pub fn from_export(export: StoreExport) -> Self {
        Self::from_records(export.family, export.version, export.records)
    }

    fn issn_lookup(&self, query: &Query) -> Option<&ScoreRecord> {
        for raw in [query.issn.as_deref(), query.eissn.as_deref()] {
            let Some(value) = raw else { continue };
            // A malformed query ISSN simply cannot match anything.
            let Ok(issn) = value.parse::<Issn>() else {
                continue;
            };
            if let Some(record) = self.get_by_issn(&issn) {
                return Some(record);
            }
        }
        None
    }

    fn name_lookup(&self, query: &Query) -> Option<&ScoreRecord> {
        let name = query.name.as_deref()?;
        self.get_by_key(&normalize(name))
    }
}

impl PartialEq for RecordStore {
    fn eq(&self, other: &Self) -> bool {
        self.family == other.family
            && self.version == other.version
            && self.records == other.records
    }
}

struct Partial {
    name: String,
    issns: Vec<Issn>,
    categories: Vec<CategoryEntry>,
}

/// Total order on category entries by rank: quartile ascending (Q1 first,
/// missing quartile last), then score descending (missing score last).
fn rank_cmp(a: &CategoryEntry, b: &CategoryEntry) -> Ordering {
    let qa = a.quartile.map(|q| q.rank()).unwrap_or(u8::MAX);
    let qb = b.quartile.map(|q| q.rank()).unwrap_or(u8::MAX);
    qa.cmp(&qb).then_with(|| {
        let sa = a.score.unwrap_or(f64::NEG_INFINITY);
        let sb = b.score.unwrap_or(f64::NEG_INFINITY);
        sb.total_cmp(&sa)
    })
}
