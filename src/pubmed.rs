//! PubMed E-utilities client.
//!
//! - esearch: keyword query to a list of PMIDs (capped at [`MAX_RESULTS`])
//! - efetch: PMIDs to `PubmedArticleSet` XML, parsed into [`BibliographicRecord`]s
//!
//! The caller's contact email and tool name from [`Config`] go out with every request.

use crate::config::Config;
use crate::error::{OptionExt, PubmedError, Result};
use crate::record::{Author, BibliographicRecord, ELocation, RecordId};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// Hard cap on esearch results; there is no pagination
pub const MAX_RESULTS: usize = 100;

/// Something that can search a literature index and fetch record details.
pub trait LiteratureSource {
    /// Ids matching `query`. Failures are logged and yield an empty list.
    fn search(&self, query: &str) -> impl Future<Output = Vec<RecordId>>;

    /// Full records for `ids`. Failures are returned, never partial data.
    fn fetch_details(&self, ids: &[RecordId]) -> impl Future<Output = Result<Vec<BibliographicRecord>>>;
}

/// HTTP client for esearch/efetch
pub struct PubmedClient {
    client: reqwest::Client,
    config: Config,
}

impl PubmedClient {
    /// Create a client identified by `config.email` / `config.tool`.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "{}/{} (mailto:{})",
                config.tool,
                env!("CARGO_PKG_VERSION"),
                config.email
            ))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PubmedError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn endpoint(&self, utility: &str) -> Result<Url> {
        Url::parse(&format!("{}/{}", self.config.base_url, utility))
            .map_err(|e| PubmedError::Config(format!("Invalid base URL: {}", e)))
    }

    fn identity(&self) -> [(&'static str, &str); 2] {
        [("tool", self.config.tool.as_str()), ("email", self.config.email.as_str())]
    }

    /// Search PubMed and return up to [`MAX_RESULTS`] PMIDs.
    pub async fn esearch(&self, query: &str) -> Result<Vec<RecordId>> {
        let url = self.endpoint("esearch.fcgi")?;
        let retmax = MAX_RESULTS.to_string();

        debug!(query, url = %url, "Sending esearch request");

        let response = self
            .client
            .get(url)
            .query(&[
                ("db", "pubmed"),
                ("term", query),
                ("retmax", retmax.as_str()),
                ("retmode", "json"),
            ])
            .query(&self.identity())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PubmedError::Api {
                code: status.as_u16(),
                message: format!("esearch failed: {}", status),
            });
        }

        let text = response.text().await?;
        let body: ESearchResponse = serde_json::from_str(&text)?;

        let result = body.esearchresult.ok_or_parse("esearch response has no esearchresult")?;
        if let Some(message) = result.error {
            return Err(PubmedError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let mut ids = result.idlist;
        ids.truncate(MAX_RESULTS);
        Ok(ids)
    }

    /// Fetch and parse the efetch XML for `ids`.
    pub async fn efetch(&self, ids: &[RecordId]) -> Result<Vec<BibliographicRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint("efetch.fcgi")?;
        let id_param = ids.join(",");

        debug!(url = %url, count = ids.len(), "Sending efetch request");

        let response = self
            .client
            .get(url)
            .query(&[("db", "pubmed"), ("id", id_param.as_str()), ("retmode", "xml")])
            .query(&self.identity())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PubmedError::Api {
                code: status.as_u16(),
                message: format!("efetch failed: {}", status),
            });
        }

        // An interrupted body surfaces here as a network error
        let xml = response.text().await?;
        let records = parse_efetch_xml(&xml)?;

        info!(requested = ids.len(), parsed = records.len(), "Fetched record details");
        Ok(records)
    }
}

impl LiteratureSource for PubmedClient {
    async fn search(&self, query: &str) -> Vec<RecordId> {
        match self.esearch(query).await {
            Ok(ids) => {
                debug!(count = ids.len(), "Found papers");
                ids
            }
            Err(e) => {
                error!(error = %e, "Search failed");
                Vec::new()
            }
        }
    }

    async fn fetch_details(&self, ids: &[RecordId]) -> Result<Vec<BibliographicRecord>> {
        self.efetch(ids).await
    }
}

// === esearch JSON ===

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: Option<ESearchResult>,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(rename = "ERROR", default)]
    error: Option<String>,
}

// === efetch XML ===

/// Parse a `PubmedArticleSet` document.
///
/// Only `PubmedArticle` entries are read; book articles are ignored. Missing
/// fields are left as `None` for the projector to judge.
pub fn parse_efetch_xml(xml: &str) -> Result<Vec<BibliographicRecord>> {
    let mut reader = Reader::from_str(xml);
    let mut state = ArticleSetParser::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                state.open(&e);
                state.stack.push(e.name().as_ref().to_vec());
            }
            Ok(Event::Empty(e)) => {
                state.open(&e);
                state.close(e.name().as_ref());
            }
            Ok(Event::End(e)) => {
                state.stack.pop();
                state.close(e.name().as_ref());
            }
            Ok(Event::Text(e)) => {
                let text = match e.unescape() {
                    Ok(t) => t.into_owned(),
                    Err(_) => String::from_utf8_lossy(&e).into_owned(),
                };
                state.text(&text);
            }
            Ok(Event::CData(e)) => {
                state.text(&String::from_utf8_lossy(&e));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(PubmedError::Parse(format!(
                    "Malformed efetch XML at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if !state.seen_root {
        return Err(PubmedError::Parse(
            "efetch response is not a PubmedArticleSet".to_string(),
        ));
    }

    Ok(state.records)
}

#[derive(Default)]
struct ArticleSetParser {
    stack: Vec<Vec<u8>>,
    seen_root: bool,
    records: Vec<BibliographicRecord>,
    current: Option<BibliographicRecord>,
    author: Option<Author>,
    affiliation: Option<String>,
    elocation: Option<ELocation>,
}

impl ArticleSetParser {
    fn parent(&self) -> Option<&[u8]> {
        self.stack.last().map(Vec::as_slice)
    }

    fn parent_is(&self, name: &[u8]) -> bool {
        self.parent() == Some(name)
    }

    fn grandparent(&self) -> Option<&[u8]> {
        self.stack.iter().rev().nth(1).map(Vec::as_slice)
    }

    fn inside(&self, name: &[u8]) -> bool {
        self.stack.iter().any(|n| n.as_slice() == name)
    }

    fn open(&mut self, e: &BytesStart<'_>) {
        let name = e.name();
        match name.as_ref() {
            b"PubmedArticleSet" => self.seen_root = true,
            b"PubmedArticle" => self.current = Some(BibliographicRecord::default()),
            b"ArticleTitle" if self.parent_is(b"Article") => {
                if let Some(record) = self.current.as_mut() {
                    record.title = Some(String::new());
                }
            }
            b"Author" if self.parent_is(b"AuthorList") => self.author = Some(Author::default()),
            // One entry per AffiliationInfo, empty when it carries no Affiliation text
            b"AffiliationInfo" if self.author.is_some() => self.affiliation = Some(String::new()),
            b"ELocationID" if self.current.is_some() => {
                let mut elocation = ELocation::default();
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"ValidYN" => elocation.valid = &*attr.value == b"Y",
                        b"EIdType" => {
                            elocation.id_type = Some(String::from_utf8_lossy(&attr.value).into_owned())
                        }
                        _ => {}
                    }
                }
                self.elocation = Some(elocation);
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"PubmedArticle" => {
                if let Some(mut record) = self.current.take() {
                    record.title = record.title.map(|t| t.trim().to_string());
                    self.records.push(record);
                }
            }
            b"Author" => {
                if let (Some(author), Some(record)) = (self.author.take(), self.current.as_mut()) {
                    record.authors.push(author);
                }
            }
            b"AffiliationInfo" => {
                if let (Some(text), Some(author)) = (self.affiliation.take(), self.author.as_mut()) {
                    author.affiliations.push(text.trim().to_string());
                }
            }
            b"ELocationID" => {
                if let (Some(mut elocation), Some(record)) = (self.elocation.take(), self.current.as_mut()) {
                    elocation.value = elocation.value.trim().to_string();
                    record.elocations.push(elocation);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        let in_title = self.inside(b"ArticleTitle");
        let in_affiliation = self.inside(b"Affiliation");
        let parent = self.parent().map(<[u8]>::to_vec);
        let grandparent = self.grandparent().map(<[u8]>::to_vec);
        let Some(record) = self.current.as_mut() else {
            return;
        };

        if in_title {
            if let Some(title) = record.title.as_mut() {
                title.push_str(text);
            }
            return;
        }
        if let Some(affiliation) = self.affiliation.as_mut() {
            if in_affiliation {
                affiliation.push_str(text);
            }
            return;
        }
        if let Some(elocation) = self.elocation.as_mut() {
            elocation.value.push_str(text);
            return;
        }

        let value = text.trim();
        if value.is_empty() {
            return;
        }

        match (parent.as_deref(), grandparent.as_deref()) {
            (Some(b"PMID"), Some(b"MedlineCitation")) => record.pmid = Some(value.to_string()),
            (Some(b"Year"), Some(b"PubDate")) => record.pub_date.year = Some(value.to_string()),
            (Some(b"Month"), Some(b"PubDate")) => record.pub_date.month = Some(value.to_string()),
            (Some(b"Day"), Some(b"PubDate")) => record.pub_date.day = Some(value.to_string()),
            (Some(b"ForeName"), Some(b"Author")) => {
                if let Some(author) = self.author.as_mut() {
                    author.fore_name = Some(value.to_string());
                }
            }
            (Some(b"LastName"), Some(b"Author")) => {
                if let Some(author) = self.author.as_mut() {
                    author.last_name = Some(value.to_string());
                }
            }
            _ => {}
        }
    }
}
