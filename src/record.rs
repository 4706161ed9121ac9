//! Bibliographic records as read from a PubMed efetch batch.
//!
//! Fields stay optional here; deciding what a usable record is belongs to
//! [`crate::projector`].

/// Opaque PubMed identifier (PMID) returned by esearch
pub type RecordId = String;

/// One `PubmedArticle` entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BibliographicRecord {
    pub pmid: Option<RecordId>,
    pub title: Option<String>,
    pub pub_date: PubDate,
    pub authors: Vec<Author>,
    pub elocations: Vec<ELocation>,
}

/// Journal issue publication date; each part may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PubDate {
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
}

impl PubDate {
    /// `Year-Month-Day`, with month and day defaulting to `01`.
    ///
    /// A missing year has no default and leaves the leading segment empty.
    pub fn display(&self) -> String {
        format!(
            "{}-{}-{}",
            self.year.as_deref().unwrap_or(""),
            self.month.as_deref().unwrap_or("01"),
            self.day.as_deref().unwrap_or("01"),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub fore_name: Option<String>,
    pub last_name: Option<String>,
    /// Affiliation strings in document order
    pub affiliations: Vec<String>,
}

impl Author {
    /// `"Forename Lastname"`, trimmed
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.fore_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

/// An `ELocationID` element: its text plus the `ValidYN` flag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ELocation {
    pub id_type: Option<String>,
    pub valid: bool,
    pub value: String,
}
