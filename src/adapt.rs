//! Raw row validation and coercion.
//!
//! External parsers hand over [`RawRow`] values with string-shaped fields.
//! The adapter validates ISSNs, coerces quartiles and scores, splits
//! `CATEGORY - INDEX` labels and precomputes the normalized matching key.
//! A bad field never aborts a batch: the offending row (or ISSN) is dropped
//! and the reason accumulated in [`Diagnostics`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{CitationIndex, Issn, Quartile, RawRow};
use crate::normalize::{display_name, normalize};

/// A cleaned row, ready for merging. All fields are in canonical types and
/// `key` is the normalized matching key.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptedRow {
    pub key: String,
    pub name: String,
    pub issns: Vec<Issn>,
    pub category: String,
    pub index: Option<CitationIndex>,
    pub quartile: Option<Quartile>,
    pub score: Option<f64>,
}

/// Why a single row was dropped during adaptation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "value")]
pub enum RejectReason {
    /// Neither a usable journal name nor a valid ISSN.
    MissingIdentity,
    /// Quartile field present but not coercible to `Q1..Q4`.
    BadQuartile(String),
    /// Score field present but not coercible to a float.
    BadScore(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub journal_name: String,
    pub reason: RejectReason,
}

/// A malformed ISSN dropped from an otherwise usable row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedIssn {
    pub journal_name: String,
    pub value: String,
}

/// An ISSN claimed by two different normalized keys during one build. The
/// first claimant keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssnConflict {
    pub issn: String,
    pub kept: String,
    pub rejected: String,
}

/// Non-fatal problems found while building a store. Returned alongside the
/// build result, never raised as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub rejected: Vec<RejectedRow>,
    pub malformed_issns: Vec<MalformedIssn>,
    pub issn_conflicts: Vec<IssnConflict>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
            && self.malformed_issns.is_empty()
            && self.issn_conflicts.is_empty()
    }

    /// One-line summary for host CLIs.
    pub fn summary(&self) -> String {
        format!(
            "{} rows skipped, {} malformed ISSNs, {} ISSN conflicts",
            self.rejected.len(),
            self.malformed_issns.len(),
            self.issn_conflicts.len()
        )
    }
}

/// Adapt a batch of raw rows, keeping the original order of survivors.
pub fn adapt_rows(rows: &[RawRow], diagnostics: &mut Diagnostics) -> Vec<AdaptedRow> {
    rows.iter()
        .filter_map(|row| adapt_row(row, diagnostics))
        .collect()
}

/// Adapt one row, or record why it was dropped.
pub fn adapt_row(row: &RawRow, diagnostics: &mut Diagnostics) -> Option<AdaptedRow> {
    let mut issns = Vec::new();
    for raw in [row.issn.as_deref(), row.eissn.as_deref()] {
        let Some(value) = non_empty(raw) else {
            continue;
        };
        match value.parse::<Issn>() {
            Ok(issn) => {
                if !issns.contains(&issn) {
                    issns.push(issn);
                }
            }
            Err(_) => {
                debug!(journal = %row.journal_name, value, "dropping malformed ISSN");
                diagnostics.malformed_issns.push(MalformedIssn {
                    journal_name: row.journal_name.clone(),
                    value: value.to_string(),
                });
            }
        }
    }

    let key = normalize(&row.journal_name);
    if key.is_empty() && issns.is_empty() {
        diagnostics.rejected.push(RejectedRow {
            journal_name: row.journal_name.clone(),
            reason: RejectReason::MissingIdentity,
        });
        return None;
    }

    let quartile = match non_empty(row.quartile.as_deref()) {
        Some(value) => match value.parse::<Quartile>() {
            Ok(quartile) => Some(quartile),
            Err(_) => {
                diagnostics.rejected.push(RejectedRow {
                    journal_name: row.journal_name.clone(),
                    reason: RejectReason::BadQuartile(value.to_string()),
                });
                return None;
            }
        },
        None => None,
    };

    let score = match non_empty(row.score.as_deref()) {
        // Non-finite values would otherwise sort as the best rank.
        Some(value) => match value.parse::<f64>() {
            Ok(score) if score.is_finite() => Some(score),
            _ => {
                diagnostics.rejected.push(RejectedRow {
                    journal_name: row.journal_name.clone(),
                    reason: RejectReason::BadScore(value.to_string()),
                });
                return None;
            }
        },
        None => None,
    };

    let (category, index) = split_category(&row.category);

    // Rows with an ISSN but no usable name are keyed by the ISSN so that
    // unrelated nameless rows never merge with each other.
    let (key, name) = if key.is_empty() {
        let fallback = issns[0].as_str().to_string();
        (fallback.clone(), fallback)
    } else {
        let name = display_name(&key);
        (key, name)
    };

    Some(AdaptedRow {
        key,
        name,
        issns,
        category,
        index,
        quartile,
        score,
    })
}

/// Split a `CATEGORY - INDEX` label as found in the score spreadsheets.
/// Labels without a recognizable index suffix are kept whole.
fn split_category(raw: &str) -> (String, Option<CitationIndex>) {
    if let Some((category, index)) = raw.rsplit_once(" - ") {
        if let Ok(index) = index.parse::<CitationIndex>() {
            return (display_name(&normalize(category)), Some(index));
        }
    }
    (display_name(&normalize(raw)), None)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    let value = value?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("n/a") {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetricFamily;

    fn row(name: &str, issn: Option<&str>, quartile: Option<&str>, score: Option<&str>) -> RawRow {
        RawRow {
            journal_name: name.to_string(),
            issn: issn.map(str::to_string),
            eissn: None,
            category: "NANOSCIENCE & NANOTECHNOLOGY - SCIE".to_string(),
            quartile: quartile.map(str::to_string),
            score: score.map(str::to_string),
            year: 2023,
            family: MetricFamily::Ais,
            version: 2024,
        }
    }

    #[test]
    fn adapts_clean_row() {
        let mut diagnostics = Diagnostics::default();
        let adapted = adapt_row(
            &row("Nano Letters", Some("1530-6984"), Some("Q1"), Some("1.234")),
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(adapted.key, "nano letters");
        assert_eq!(adapted.name, "Nano Letters");
        assert_eq!(adapted.issns.len(), 1);
        assert_eq!(adapted.category, "Nanoscience and Nanotechnology");
        assert_eq!(adapted.index, Some(CitationIndex::Scie));
        assert_eq!(adapted.quartile, Some(Quartile::Q1));
        assert_eq!(adapted.score, Some(1.234));
        assert!(diagnostics.is_clean());
    }

    #[test]
    fn drops_malformed_issn_keeps_row() {
        let mut diagnostics = Diagnostics::default();
        let adapted = adapt_row(
            &row("Nano Letters", Some("15306984"), None, None),
            &mut diagnostics,
        )
        .unwrap();

        assert!(adapted.issns.is_empty());
        assert_eq!(diagnostics.malformed_issns.len(), 1);
        assert_eq!(diagnostics.malformed_issns[0].value, "15306984");
    }

    #[test]
    fn rejects_row_without_identity() {
        let mut diagnostics = Diagnostics::default();
        let adapted = adapt_row(&row("  ", None, None, None), &mut diagnostics);

        assert!(adapted.is_none());
        assert_eq!(
            diagnostics.rejected[0].reason,
            RejectReason::MissingIdentity
        );
    }

    #[test]
    fn rejects_uncoercible_fields() {
        let mut diagnostics = Diagnostics::default();
        assert!(adapt_row(&row("A", None, Some("Quartile One"), None), &mut diagnostics).is_none());
        assert!(adapt_row(&row("B", None, None, Some("high")), &mut diagnostics).is_none());

        assert_matches::assert_matches!(
            diagnostics.rejected[0].reason,
            RejectReason::BadQuartile(_)
        );
        assert_matches::assert_matches!(diagnostics.rejected[1].reason, RejectReason::BadScore(_));
    }

    #[test]
    fn rejects_non_finite_scores() {
        let mut diagnostics = Diagnostics::default();
        assert!(adapt_row(&row("A", None, None, Some("NaN")), &mut diagnostics).is_none());
        assert!(adapt_row(&row("B", None, None, Some("inf")), &mut diagnostics).is_none());
        assert!(adapt_row(&row("C", None, None, Some("-inf")), &mut diagnostics).is_none());

        assert_eq!(diagnostics.rejected.len(), 3);
        for rejected in &diagnostics.rejected {
            assert_matches::assert_matches!(rejected.reason, RejectReason::BadScore(_));
        }
    }

    #[test]
    fn na_fields_coerce_to_none() {
        let mut diagnostics = Diagnostics::default();
        let adapted = adapt_row(
            &row("Nano Letters", None, Some("N/A"), Some("")),
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(adapted.quartile, None);
        assert_eq!(adapted.score, None);
        assert!(diagnostics.is_clean());
    }

    #[test]
    fn issn_only_row_is_keyed_by_issn() {
        let mut diagnostics = Diagnostics::default();
        let adapted = adapt_row(&row("", Some("1530-6984"), None, None), &mut diagnostics).unwrap();

        assert_eq!(adapted.key, "1530-6984");
        assert!(diagnostics.is_clean());
    }

    #[test]
    fn category_without_index_is_kept_whole() {
        let mut diagnostics = Diagnostics::default();
        let mut raw = row("Nano Letters", None, None, None);
        raw.category = "MULTIDISCIPLINARY SCIENCES".to_string();
        let adapted = adapt_row(&raw, &mut diagnostics).unwrap();

        assert_eq!(adapted.category, "Multidisciplinary Sciences");
        assert_eq!(adapted.index, None);
    }
}
