use std::io::Write;
use std::time::Duration;

use camino::Utf8Path;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::RankError;

/// Retrieval boundary for the published source documents. Decryption and
/// cell extraction are not part of this crate; the client only lands the
/// bytes on disk.
pub trait SourceClient: Send + Sync {
    /// Download `url` to `destination`, returning the number of bytes
    /// written.
    fn download(&self, url: &str, destination: &Utf8Path) -> Result<u64, RankError>;
}

#[derive(Clone)]
pub struct HttpSourceClient {
    client: Client,
}

impl HttpSourceClient {
    pub fn new() -> Result<Self, RankError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("uefiscdi-rank/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| RankError::SourceHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| RankError::SourceHttp(err.to_string()))?;
        Ok(Self { client })
    }
}

impl SourceClient for HttpSourceClient {
    fn download(&self, url: &str, destination: &Utf8Path) -> Result<u64, RankError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| RankError::SourceHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "source request failed".to_string());
            return Err(RankError::SourceStatus { status, message });
        }
        let bytes = response
            .bytes()
            .map_err(|err| RankError::SourceHttp(err.to_string()))?;

        let written = persist_bytes(destination, &bytes)?;
        info!(url, %destination, bytes = written, "downloaded source document");
        Ok(written)
    }
}

/// Land `bytes` at `destination` through a temp file plus rename, so an
/// interrupted download never leaves a truncated document behind.
fn persist_bytes(destination: &Utf8Path, bytes: &[u8]) -> Result<u64, RankError> {
    let parent = destination.parent().unwrap_or(Utf8Path::new("."));
    std::fs::create_dir_all(parent.as_std_path())
        .map_err(|err| RankError::Filesystem(err.to_string()))?;
    let mut file = NamedTempFile::new_in(parent.as_std_path())
        .map_err(|err| RankError::Filesystem(err.to_string()))?;
    file.write_all(bytes)
        .map_err(|err| RankError::Filesystem(err.to_string()))?;
    file.persist(destination.as_std_path())
        .map_err(|err| RankError::Filesystem(err.to_string()))?;
    Ok(bytes.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn persist_bytes_lands_complete_file_without_leftovers() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let destination = root.join("downloads").join("ais.xlsx");

        let written = persist_bytes(&destination, b"workbook bytes").unwrap();
        assert_eq!(written, 14);
        assert_eq!(
            std::fs::read(destination.as_std_path()).unwrap(),
            b"workbook bytes"
        );

        // Only the final document may remain in the directory.
        let entries: Vec<_> = std::fs::read_dir(destination.parent().unwrap().as_std_path())
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn persist_bytes_replaces_previous_download() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let destination = root.join("ais.xlsx");

        persist_bytes(&destination, b"old edition").unwrap();
        persist_bytes(&destination, b"new edition").unwrap();
        assert_eq!(
            std::fs::read(destination.as_std_path()).unwrap(),
            b"new edition"
        );
    }
}
