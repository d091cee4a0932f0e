//! On-disk cache of built record stores.
//!
//! One JSON file per family and edition year under a per-user cache
//! directory. Writes go through a temp file plus rename, so a reader either
//! sees the previous complete edition or the new complete edition, never a
//! partial file. Nothing here mutates a published file in place.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::MetricFamily;
use crate::error::RankError;
use crate::index::{RecordStore, StoreExport};

/// A persisted edition: the exported store plus indexing provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedEdition {
    pub indexed_at: String,
    pub url: Option<String>,
    pub store: StoreExport,
}

/// Summary of one cached edition, for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditionInfo {
    pub family: MetricFamily,
    pub version: i32,
    pub records: usize,
    pub indexed_at: String,
    pub url: Option<String>,
    pub path: Utf8PathBuf,
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    root: Utf8PathBuf,
}

impl CacheStore {
    pub fn new() -> Result<Self, RankError> {
        let root = BaseDirs::new()
            .and_then(|dirs| {
                Utf8PathBuf::from_path_buf(dirs.home_dir().join(".cache").join("uefiscdi-rank"))
                    .ok()
            })
            .ok_or_else(|| RankError::Filesystem("unable to resolve cache directory".to_string()))?;
        Ok(Self { root })
    }

    pub fn new_with_path(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn edition_path(&self, family: MetricFamily, version: i32) -> Utf8PathBuf {
        self.root
            .join(version.to_string())
            .join(format!("{}.json", family.as_str()))
    }

    pub fn download_path(&self, version: i32, file_name: &str) -> Utf8PathBuf {
        self.root
            .join("downloads")
            .join(version.to_string())
            .join(file_name)
    }

    pub fn exists(&self, family: MetricFamily, version: i32) -> bool {
        self.edition_path(family, version).as_std_path().exists()
    }

    /// Persist a built store, replacing any previous edition wholesale.
    pub fn save(&self, store: &RecordStore, url: Option<String>) -> Result<Utf8PathBuf, RankError> {
        let edition = CachedEdition {
            indexed_at: chrono::Utc::now().to_rfc3339(),
            url,
            store: store.export(),
        };
        let path = self.edition_path(store.family(), store.version());
        write_json_atomic(&path, &edition)?;
        info!(%path, records = store.len(), "saved record store");
        Ok(path)
    }

    /// Load a cached edition, including its provenance.
    pub fn load(&self, family: MetricFamily, version: i32) -> Result<CachedEdition, RankError> {
        let path = self.edition_path(family, version);
        if !path.as_std_path().exists() {
            return Err(RankError::NotIndexed { family, version });
        }
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|err| RankError::Filesystem(err.to_string()))?;
        serde_json::from_str(&content).map_err(|_| RankError::CacheParse(path))
    }

    /// Load and rebuild just the record store of a cached edition.
    pub fn load_store(&self, family: MetricFamily, version: i32) -> Result<RecordStore, RankError> {
        let edition = self.load(family, version)?;
        Ok(RecordStore::from_export(edition.store))
    }

    /// All cached editions, newest first.
    pub fn list(&self) -> Result<Vec<EditionInfo>, RankError> {
        let mut editions = Vec::new();
        if !self.root.as_std_path().exists() {
            return Ok(editions);
        }

        let entries = fs::read_dir(self.root.as_std_path())
            .map_err(|err| RankError::Filesystem(err.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|err| RankError::Filesystem(err.to_string()))?;
            let Some(version) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<i32>().ok())
            else {
                continue;
            };
            for family in MetricFamily::all() {
                if !self.exists(family, version) {
                    continue;
                }
                let edition = self.load(family, version)?;
                editions.push(EditionInfo {
                    family,
                    version,
                    records: edition.store.records.len(),
                    indexed_at: edition.indexed_at,
                    url: edition.url,
                    path: self.edition_path(family, version),
                });
            }
        }

        editions.sort_by(|a, b| {
            b.version
                .cmp(&a.version)
                .then_with(|| a.family.as_str().cmp(b.family.as_str()))
        });
        Ok(editions)
    }
}

fn write_json_atomic<T: Serialize>(path: &Utf8Path, value: &T) -> Result<(), RankError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| RankError::Filesystem(err.to_string()))?;
    }
    let content =
        serde_json::to_vec_pretty(value).map_err(|err| RankError::Filesystem(err.to_string()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(tmp_path.as_std_path(), &content)
        .map_err(|err| RankError::Filesystem(err.to_string()))?;
    fs::rename(tmp_path.as_std_path(), path.as_std_path())
        .map_err(|err| RankError::Filesystem(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths() {
        let cache = CacheStore::new_with_path(Utf8PathBuf::from("/tmp/uefiscdi-rank"));
        let path = cache.edition_path(MetricFamily::Ais, 2024);
        assert!(path.ends_with("2024/ais.json"));

        let path = cache.download_path(2024, "ais.xlsx");
        assert!(path.ends_with("downloads/2024/ais.xlsx"));
    }
}
