use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RankError;

/// One of the four UEFISCDI scientometric indicator datasets. Each family is
/// published independently per edition year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MetricFamily {
    Jif,
    Ais,
    Ris,
    Rif,
}

impl MetricFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricFamily::Jif => "jif",
            MetricFamily::Ais => "ais",
            MetricFamily::Ris => "ris",
            MetricFamily::Rif => "rif",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MetricFamily::Jif => "Journal Impact Factor",
            MetricFamily::Ais => "Article Influence Score",
            MetricFamily::Ris => "Relative Influence Score",
            MetricFamily::Rif => "Relative Impact Factor",
        }
    }

    pub fn all() -> [MetricFamily; 4] {
        [
            MetricFamily::Jif,
            MetricFamily::Ais,
            MetricFamily::Ris,
            MetricFamily::Rif,
        ]
    }
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MetricFamily {
    type Err = RankError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "jif" => Ok(MetricFamily::Jif),
            "ais" => Ok(MetricFamily::Ais),
            "ris" => Ok(MetricFamily::Ris),
            "rif" => Ok(MetricFamily::Rif),
            _ => Err(RankError::InvalidMetricFamily(value.to_string())),
        }
    }
}

/// Quartile rank within a subject category. `Q1` is the best; the derived
/// `Ord` follows that convention (`Q1 < Q2`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
pub enum Quartile {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quartile {
    /// Numeric rank, 1 (best) to 4 (worst).
    pub fn rank(&self) -> u8 {
        match self {
            Quartile::Q1 => 1,
            Quartile::Q2 => 2,
            Quartile::Q3 => 3,
            Quartile::Q4 => 4,
        }
    }
}

impl fmt::Display for Quartile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.rank())
    }
}

impl FromStr for Quartile {
    type Err = RankError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "Q1" | "1" => Ok(Quartile::Q1),
            "Q2" | "2" => Ok(Quartile::Q2),
            "Q3" | "3" => Ok(Quartile::Q3),
            "Q4" | "4" => Ok(Quartile::Q4),
            _ => Err(RankError::InvalidQuartile(value.to_string())),
        }
    }
}

/// A validated print or electronic serial number in the `NNNN-NNNX` shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Issn(String);

impl Issn {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Issn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn issn_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{3}[\dX]$").unwrap())
}

impl FromStr for Issn {
    type Err = RankError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        if !issn_pattern().is_match(&normalized) {
            return Err(RankError::InvalidIssn(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// Citation index the journal category belongs to, as labelled in the
/// UEFISCDI spreadsheets (`CATEGORY - INDEX`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CitationIndex {
    Ahci,
    Scie,
    Ssci,
    Esci,
}

impl CitationIndex {
    pub fn full_name(&self) -> &'static str {
        match self {
            CitationIndex::Ahci => "Arts Humanities Citation Index",
            CitationIndex::Scie => "Science Citation Index Expanded",
            CitationIndex::Ssci => "Social Sciences Citation Index",
            CitationIndex::Esci => "Emerging Sources Citation Index",
        }
    }
}

impl fmt::Display for CitationIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            CitationIndex::Ahci => "AHCI",
            CitationIndex::Scie => "SCIE",
            CitationIndex::Ssci => "SSCI",
            CitationIndex::Esci => "ESCI",
        };
        write!(f, "{id}")
    }
}

impl FromStr for CitationIndex {
    type Err = RankError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "AHCI" => Ok(CitationIndex::Ahci),
            "SCIE" => Ok(CitationIndex::Scie),
            "SSCI" => Ok(CitationIndex::Ssci),
            "ESCI" => Ok(CitationIndex::Esci),
            _ => Err(RankError::InvalidCitationIndex(value.to_string())),
        }
    }
}

/// One row as extracted from a source document by an external parser.
///
/// Fields are kept in their raw string shape; the adapter in
/// [`crate::adapt`] validates and coerces them. Rows only live for the
/// duration of a single ingestion pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub journal_name: String,
    pub issn: Option<String>,
    pub eissn: Option<String>,
    pub category: String,
    pub quartile: Option<String>,
    pub score: Option<String>,
    pub year: i32,
    pub family: MetricFamily,
    pub version: i32,
}

/// A lookup request against a built store. At least one of the identity
/// fields must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub name: Option<String>,
    pub issn: Option<String>,
    pub eissn: Option<String>,
}

impl Query {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn by_issn(issn: impl Into<String>) -> Self {
        Self {
            issn: Some(issn.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.issn.is_none() && self.eissn.is_none()
    }
}
