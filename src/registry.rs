//! Registry of published UEFISCDI database editions.
//!
//! One entry per edition year and metric family, pointing at the document
//! published on the official website. Quartile data (JIF) comes as PDF,
//! score data (AIS/RIS/RIF) as XLSX workbooks, some of them password
//! protected with the password published alongside.

use crate::domain::MetricFamily;
use crate::error::RankError;

/// Password for the protected score workbooks, as given on the official
/// website.
pub const WORKBOOK_PASSWORD: &str = "uefiscdi";

/// Latest edition with registered sources.
pub const DEFAULT_VERSION: i32 = 2024;

/// Mostly the last few editions, since those are the ones required for
/// UEFISCDI competitions.
const SOURCES: &[(i32, MetricFamily, &str)] = &[
    (
        2024,
        MetricFamily::Jif,
        "https://uefiscdi.gov.ro/resource-861733-JCR.iunie.2024.pdf",
    ),
    (
        2024,
        MetricFamily::Ais,
        "https://uefiscdi.gov.ro/resource-861731-AIS.JCR2023.iunie2024.xlsx",
    ),
    (
        2024,
        MetricFamily::Ris,
        "https://uefiscdi.gov.ro/resource-861773-RIS.2023iunie2024.xlsx",
    ),
    (
        2024,
        MetricFamily::Rif,
        "https://uefiscdi.gov.ro/resource-861735-FIR.2023iunie2024.xlsx",
    ),
    (
        2023,
        MetricFamily::Jif,
        "https://uefiscdi.gov.ro/resource-866009-zone.iunie.2023.jif.pdf",
    ),
    (
        2023,
        MetricFamily::Ais,
        "https://uefiscdi.gov.ro/resource-863884-ais_2022.xlsx",
    ),
    (
        2023,
        MetricFamily::Ris,
        "https://uefiscdi.gov.ro/resource-863882-ris_2022.xlsx",
    ),
    (
        2023,
        MetricFamily::Rif,
        "https://uefiscdi.gov.ro/resource-863887-rif_2022.xlsx",
    ),
    (
        2022,
        MetricFamily::Jif,
        "https://uefiscdi.gov.ro/resource-862151-zone.2022.if.pdf",
    ),
    (
        2022,
        MetricFamily::Ais,
        "https://uefiscdi.gov.ro/resource-862108-ais.2021.xlsx",
    ),
    (
        2022,
        MetricFamily::Ris,
        "https://uefiscdi.gov.ro/resource-862102-ris.2021.xlsx",
    ),
    (
        2022,
        MetricFamily::Rif,
        "https://uefiscdi.gov.ro/resource-862155-rif.2021.xlsx",
    ),
    (
        2021,
        MetricFamily::Jif,
        "https://uefiscdi.gov.ro/resource-820921-if2021.pdf",
    ),
    (
        2021,
        MetricFamily::Ais,
        "https://uefiscdi.gov.ro/resource-820980-ais.2020.xlsx",
    ),
    (
        2021,
        MetricFamily::Ris,
        "https://uefiscdi.gov.ro/resource-820984-sri.2020.xlsx",
    ),
    (
        2021,
        MetricFamily::Rif,
        "https://uefiscdi.gov.ro/resource-820987-rif.2020.xlsx",
    ),
    (
        2020,
        MetricFamily::Jif,
        "https://uefiscdi.gov.ro/resource-821873-clasament2020.if.pdf",
    ),
    (
        2020,
        MetricFamily::Ais,
        "https://uefiscdi.gov.ro/resource-821312-ais2019-iunie2020-.valori.cuartile.xlsx",
    ),
    (
        2020,
        MetricFamily::Ris,
        "https://uefiscdi.gov.ro/resource-829001-sri.2019.xlsx",
    ),
    (
        2020,
        MetricFamily::Rif,
        "https://uefiscdi.gov.ro/resource-829003-rif.2019.xlsx",
    ),
    (
        2019,
        MetricFamily::Jif,
        "https://uefiscdi.gov.ro/resource-822843",
    ),
    (
        2019,
        MetricFamily::Ais,
        "https://uefiscdi.gov.ro/resource-828068",
    ),
    (
        2019,
        MetricFamily::Ris,
        "https://uefiscdi.gov.ro/resource-828022",
    ),
    (
        2019,
        MetricFamily::Rif,
        "https://uefiscdi.gov.ro/resource-828027",
    ),
];

/// Source URL for the given family and edition year.
pub fn source_url(family: MetricFamily, version: i32) -> Result<&'static str, RankError> {
    SOURCES
        .iter()
        .find(|(v, f, _)| *v == version && *f == family)
        .map(|(_, _, url)| *url)
        .ok_or(RankError::UnknownEdition { family, version })
}

/// Edition years with registered sources, newest first.
pub fn versions() -> Vec<i32> {
    let mut versions: Vec<i32> = SOURCES.iter().map(|(version, _, _)| *version).collect();
    versions.sort_unstable_by(|a, b| b.cmp(a));
    versions.dedup();
    versions
}

/// File name to store a downloaded source under, derived from its URL.
pub fn source_file_name(family: MetricFamily, version: i32) -> Result<String, RankError> {
    let url = source_url(family, version)?;
    let base = url.rsplit('/').next().unwrap_or(url);
    if base.contains('.') {
        Ok(base.to_string())
    } else {
        // Oldest editions have extension-less resource URLs.
        Ok(format!("{base}-{}.bin", family.as_str()))
    }
}
