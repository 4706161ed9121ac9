//! Record projection
//!
//! Turns a [`BibliographicRecord`] into a flat [`ResultRow`] when at least one
//! author's first affiliation is non-academic. Records that are dropped come back
//! with a [`SkipReason`] so callers can report why.

use crate::affiliation::{is_company_affiliation, organization_name};
use crate::record::BibliographicRecord;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Output column order (also the CSV/spreadsheet header)
pub const RESULT_COLUMNS: &[&str] = &[
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Corresponding Author Email",
];

/// Separator used when joining author names and affiliations
const LIST_SEPARATOR: &str = "; ";

/// One output row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    #[serde(rename = "PubmedID")]
    pub pubmed_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Publication Date")]
    pub publication_date: String,
    #[serde(rename = "Non-academic Author(s)")]
    pub non_academic_authors: String,
    #[serde(rename = "Company Affiliation(s)")]
    pub company_affiliations: String,
    #[serde(rename = "Corresponding Author Email")]
    pub corresponding_email: String,
}

impl ResultRow {
    /// Field values in [`RESULT_COLUMNS`] order
    pub fn fields(&self) -> [&str; 6] {
        [
            &self.pubmed_id,
            &self.title,
            &self.publication_date,
            &self.non_academic_authors,
            &self.company_affiliations,
            &self.corresponding_email,
        ]
    }
}

/// Why a record produced no row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `PMID` element
    MissingPmid,
    /// No `ArticleTitle` element
    MissingTitle,
    /// No author has a non-academic first affiliation
    NoNonAcademicAuthors,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::MissingPmid => "record has no PMID",
            SkipReason::MissingTitle => "record has no article title",
            SkipReason::NoNonAcademicAuthors => "no author with a non-academic affiliation",
        };
        f.write_str(text)
    }
}

/// A dropped record and the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// PMID, when the record had one
    pub pmid: Option<String>,
    pub reason: SkipReason,
}

/// Rows kept plus records skipped, both in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    pub rows: Vec<ResultRow>,
    pub skipped: Vec<SkippedRecord>,
}

/// Project a single record.
pub fn project(record: &BibliographicRecord) -> Result<ResultRow, SkipReason> {
    let pmid = record
        .pmid
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(SkipReason::MissingPmid)?;
    let title = record.title.as_deref().ok_or(SkipReason::MissingTitle)?;

    let mut authors = Vec::new();
    let mut organizations = Vec::new();

    for author in &record.authors {
        // Only the first listed affiliation counts
        let Some(first) = author.affiliations.first() else {
            continue;
        };
        if is_company_affiliation(first) {
            authors.push(author.full_name());
            organizations.push(organization_name(first).to_string());
        }
    }

    if authors.is_empty() {
        return Err(SkipReason::NoNonAcademicAuthors);
    }

    Ok(ResultRow {
        pubmed_id: pmid.to_string(),
        title: title.to_string(),
        publication_date: record.pub_date.display(),
        non_academic_authors: authors.join(LIST_SEPARATOR),
        company_affiliations: organizations.join(LIST_SEPARATOR),
        corresponding_email: corresponding_email(record),
    })
}

/// Text of the LAST `ELocationID` flagged `ValidYN="Y"`, or empty.
pub fn corresponding_email(record: &BibliographicRecord) -> String {
    record
        .elocations
        .iter()
        .rev()
        .find(|e| e.valid)
        .map(|e| {
            debug!(
                pmid = record.pmid.as_deref().unwrap_or("?"),
                id_type = e.id_type.as_deref().unwrap_or("unknown"),
                "Using ELocationID as corresponding email"
            );
            e.value.clone()
        })
        .unwrap_or_default()
}

/// Project a whole batch; never fails, skipped records are collected.
pub fn project_all(records: &[BibliographicRecord]) -> Projection {
    let mut projection = Projection::default();

    for record in records {
        match project(record) {
            Ok(row) => projection.rows.push(row),
            Err(reason) => {
                debug!(pmid = record.pmid.as_deref().unwrap_or("?"), reason = %reason, "Skipping record");
                projection.skipped.push(SkippedRecord {
                    pmid: record.pmid.clone(),
                    reason,
                });
            }
        }
    }

    projection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Author, ELocation, PubDate};

    fn author(fore: &str, last: &str, affiliations: &[&str]) -> Author {
        Author {
            fore_name: Some(fore.to_string()),
            last_name: Some(last.to_string()),
            affiliations: affiliations.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn record(authors: Vec<Author>) -> BibliographicRecord {
        BibliographicRecord {
            pmid: Some("12345".to_string()),
            title: Some("A study".to_string()),
            pub_date: PubDate {
                year: Some("2023".to_string()),
                month: None,
                day: None,
            },
            authors,
            elocations: vec![],
        }
    }

    #[test]
    fn test_company_author_kept() {
        let rec = record(vec![
            author("Jane", "Doe", &["Acme Corp, Boston"]),
            author("John", "Roe", &["Dept of Biology, MIT"]),
        ]);

        let row = project(&rec).expect("row");
        assert_eq!(row.pubmed_id, "12345");
        assert_eq!(row.publication_date, "2023-01-01");
        assert_eq!(row.non_academic_authors, "Jane Doe");
        assert_eq!(row.company_affiliations, "Acme Corp");
        assert_eq!(row.corresponding_email, "");
    }

    #[test]
    fn test_lists_follow_author_order() {
        let rec = record(vec![
            author("B", "Second", &["Beta Pharma, Basel"]),
            author("X", "Academic", &["Stanford University"]),
            author("A", "First", &["Alpha Bio"]),
        ]);

        let row = project(&rec).expect("row");
        let names: Vec<&str> = row.non_academic_authors.split("; ").collect();
        let orgs: Vec<&str> = row.company_affiliations.split("; ").collect();
        assert_eq!(names, vec!["B Second", "A First"]);
        assert_eq!(orgs, vec!["Beta Pharma", "Alpha Bio"]);
        assert_eq!(names.len(), orgs.len());
    }

    #[test]
    fn test_only_first_affiliation_consulted() {
        let rec = record(vec![author(
            "Jane",
            "Doe",
            &["Harvard University", "Acme Corp, Boston"],
        )]);
        assert_eq!(project(&rec), Err(SkipReason::NoNonAcademicAuthors));
    }

    #[test]
    fn test_no_affiliations_yields_no_row() {
        let rec = record(vec![author("Jane", "Doe", &[]), author("John", "Roe", &[])]);
        assert_eq!(project(&rec), Err(SkipReason::NoNonAcademicAuthors));
    }

    #[test]
    fn test_missing_identifiers() {
        let mut rec = record(vec![author("Jane", "Doe", &["Acme"])]);
        rec.title = None;
        assert_eq!(project(&rec), Err(SkipReason::MissingTitle));

        rec.pmid = Some("  ".to_string());
        assert_eq!(project(&rec), Err(SkipReason::MissingPmid));
    }

    #[test]
    fn test_last_valid_elocation_wins() {
        let mut rec = record(vec![author("Jane", "Doe", &["Acme"])]);
        rec.elocations = vec![
            ELocation {
                id_type: Some("doi".to_string()),
                valid: true,
                value: "first@acme.com".to_string(),
            },
            ELocation {
                id_type: Some("pii".to_string()),
                valid: true,
                value: "second@acme.com".to_string(),
            },
            ELocation {
                id_type: Some("doi".to_string()),
                valid: false,
                value: "invalid@acme.com".to_string(),
            },
        ];

        let row = project(&rec).expect("row");
        assert_eq!(row.corresponding_email, "second@acme.com");
    }

    #[test]
    fn test_project_all_collects_skip_reasons() {
        let kept = record(vec![author("Jane", "Doe", &["Acme"])]);
        let mut academic = record(vec![author("John", "Roe", &["Oxford University"])]);
        academic.pmid = Some("999".to_string());
        let mut no_pmid = kept.clone();
        no_pmid.pmid = None;

        let projection = project_all(&[kept, academic, no_pmid]);
        assert_eq!(projection.rows.len(), 1);
        assert_eq!(
            projection.skipped,
            vec![
                SkippedRecord {
                    pmid: Some("999".to_string()),
                    reason: SkipReason::NoNonAcademicAuthors,
                },
                SkippedRecord {
                    pmid: None,
                    reason: SkipReason::MissingPmid,
                },
            ]
        );
    }

    #[test]
    fn test_fields_match_columns() {
        let row = project(&record(vec![author("Jane", "Doe", &["Acme"])])).expect("row");
        assert_eq!(row.fields().len(), RESULT_COLUMNS.len());
        assert_eq!(row.fields()[0], "12345");
    }
}
