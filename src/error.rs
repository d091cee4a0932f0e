use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum RankError {
    #[error("invalid metric family: {0}")]
    InvalidMetricFamily(String),

    #[error("invalid quartile: {0}")]
    InvalidQuartile(String),

    #[error("invalid ISSN: {0}")]
    InvalidIssn(String),

    #[error("invalid citation index: {0}")]
    InvalidCitationIndex(String),

    #[error("query must carry a journal name or an ISSN")]
    InvalidQuery,

    #[error("no {family} source registered for edition {version}")]
    UnknownEdition {
        family: crate::domain::MetricFamily,
        version: i32,
    },

    #[error("{family} edition {version} is not indexed (run `uefiscdi-rank index` first)")]
    NotIndexed {
        family: crate::domain::MetricFamily,
        version: i32,
    },

    #[error("row source failed: {0}")]
    RowSource(String),

    #[error("source request failed: {0}")]
    SourceHttp(String),

    #[error("source returned status {status}: {message}")]
    SourceStatus { status: u16, message: String },

    #[error("failed to parse cached store at {0}")]
    CacheParse(Utf8PathBuf),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
