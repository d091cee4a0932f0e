//! Application layer tying the cache, the source client and the row
//! sources together. The binary and the integration tests drive everything
//! through [`App`].

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::info;

use crate::adapt::Diagnostics;
use crate::domain::{MetricFamily, Quartile, Query};
use crate::error::RankError;
use crate::fetch::SourceClient;
use crate::index::{MatchSource, RecordStore, ScoreRecord};
use crate::normalize::normalize;
use crate::registry;
use crate::rows::RowSource;
use crate::store::{CacheStore, EditionInfo};

#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    pub family: MetricFamily,
    pub version: i32,
    pub url: String,
    pub path: Utf8PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexResult {
    pub family: MetricFamily,
    pub version: i32,
    pub rows: usize,
    pub records: usize,
    pub path: Utf8PathBuf,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedMatch {
    pub primary: bool,
    pub source: MatchSource,
    pub record: ScoreRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveResult {
    pub family: MetricFamily,
    pub version: i32,
    pub matches: Vec<ResolvedMatch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub family: MetricFamily,
    pub version: i32,
    pub records: Vec<ScoreRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    pub editions: Vec<EditionInfo>,
}

/// Record filter for interactive exploration, mirroring the search options
/// of the original UEFISCDI tooling.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Substring match against the normalized journal name.
    pub name: Option<String>,
    /// Case-insensitive substring match against any category.
    pub category: Option<String>,
    /// Keep records ranked at this quartile or better. Records without a
    /// quartile pass the filter.
    pub min_quartile: Option<Quartile>,
}

impl SearchFilter {
    pub fn matches(&self, record: &ScoreRecord) -> bool {
        if let Some(name) = &self.name {
            if !record.normalized_key.contains(&normalize(name)) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            let needle = category.to_lowercase();
            let found = record
                .categories
                .iter()
                .any(|entry| entry.category.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }
        if let Some(min) = self.min_quartile {
            if let Some(quartile) = record.best.quartile {
                if quartile.rank() > min.rank() {
                    return false;
                }
            }
        }
        true
    }
}

#[derive(Clone)]
pub struct App<C: SourceClient> {
    cache: CacheStore,
    client: C,
}

impl<C: SourceClient> App<C> {
    pub fn new(cache: CacheStore, client: C) -> Self {
        Self { cache, client }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Download the registered source document for one family/edition into
    /// the cache (or to an explicit destination).
    pub fn fetch(
        &self,
        family: MetricFamily,
        version: i32,
        destination: Option<Utf8PathBuf>,
    ) -> Result<FetchResult, RankError> {
        let url = registry::source_url(family, version)?;
        let path = match destination {
            Some(path) => path,
            None => {
                let file_name = registry::source_file_name(family, version)?;
                self.cache.download_path(version, &file_name)
            }
        };
        let bytes = self.client.download(url, &path)?;
        Ok(FetchResult {
            family,
            version,
            url: url.to_string(),
            path,
            bytes,
        })
    }

    /// Build the record store for one family/edition from extracted rows
    /// and publish it to the cache.
    ///
    /// Publication replaces any previous edition atomically; a failing row
    /// source leaves the previous edition untouched.
    pub fn index<R: RowSource>(
        &self,
        source: &R,
        family: MetricFamily,
        version: i32,
    ) -> Result<IndexResult, RankError> {
        let rows = source.rows(family, version)?;
        let (store, diagnostics) = RecordStore::build(&rows, family, version);
        let url = registry::source_url(family, version)
            .ok()
            .map(str::to_string);
        let path = self.cache.save(&store, url)?;

        if !diagnostics.is_clean() {
            info!(family = %family, version, "{}", diagnostics.summary());
        }
        Ok(IndexResult {
            family,
            version,
            rows: rows.len(),
            records: store.len(),
            path,
            diagnostics,
        })
    }

    /// Resolve a query against a cached edition, returning every candidate
    /// with the primary flagged.
    pub fn resolve(
        &self,
        query: &Query,
        family: MetricFamily,
        version: i32,
    ) -> Result<ResolveResult, RankError> {
        let store = self.cache.load_store(family, version)?;
        let matches = store
            .resolve_all(query)?
            .into_iter()
            .map(|m| ResolvedMatch {
                primary: m.primary,
                source: m.source,
                record: m.record.clone(),
            })
            .collect();
        Ok(ResolveResult {
            family,
            version,
            matches,
        })
    }

    /// Filter a cached edition's records.
    pub fn search(
        &self,
        family: MetricFamily,
        version: i32,
        filter: &SearchFilter,
    ) -> Result<SearchResult, RankError> {
        let store = self.cache.load_store(family, version)?;
        let records = store
            .search(|record| filter.matches(record))
            .cloned()
            .collect();
        Ok(SearchResult {
            family,
            version,
            records,
        })
    }

    /// List all cached editions.
    pub fn list(&self) -> Result<ListResult, RankError> {
        Ok(ListResult {
            editions: self.cache.list()?,
        })
    }
}
