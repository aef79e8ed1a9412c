// Paper fetcher: arXiv Atom API client and the per-topic dedup filter

use crate::dedup::ProcessedIds;
use crate::error::{Error, Result};
use crate::types::{PaperId, PaperRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";

/// A bibliographic search service.
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Search for `topic`, most recently submitted first, at most `max_results`.
    async fn search(&self, topic: &str, max_results: usize) -> Result<Vec<PaperRecord>>;

    /// Source name for diagnostics
    fn name(&self) -> &str;
}

#[derive(Clone)]
pub struct ArxivClient {
    http: Client,
    base: String,
}

impl ArxivClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Self::with_base(ARXIV_API_URL, timeout_secs)
    }

    pub fn with_base(base: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("papercast/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { http, base: base.trim_end_matches('/').to_string() })
    }

    /// Phrase query, so multi-word topics match as a unit.
    fn build_query(topic: &str) -> String {
        format!("\"{}\"", topic.trim())
    }
}

#[async_trait]
impl PaperSource for ArxivClient {
    async fn search(&self, topic: &str, max_results: usize) -> Result<Vec<PaperRecord>> {
        use reqwest::header::ACCEPT;
        let search_query = Self::build_query(topic);
        let resp = self.http
            .get(&self.base)
            .query(&[("search_query", search_query.as_str())])
            .query(&[("start", 0), ("max_results", max_results)])
            .query(&[("sortBy", "submittedDate"), ("sortOrder", "descending")])
            .header(ACCEPT, "application/atom+xml, application/xml;q=0.9, text/xml;q=0.8")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let mut preview = resp.text().await.unwrap_or_default().trim().to_string();
            if preview.len() > 200 {
                preview = preview.chars().take(200).collect();
                preview.push('…');
            }
            return Err(Error::Source(format!("arXiv API error: HTTP {} {}", status, preview)));
        }

        let text = resp.text().await?;
        parse_atom_feed(&text, topic)
    }

    fn name(&self) -> &str {
        "arxiv"
    }
}

#[derive(Default)]
struct EntryBuilder {
    id: String,
    title: String,
    summary: String,
    published: String,
    authors: Vec<String>,
}

impl EntryBuilder {
    fn build(self, topic: &str) -> Result<Option<PaperRecord>> {
        let url = self.id.trim().to_string();
        if url.contains("/api/errors") {
            return Err(Error::Source(collapse_whitespace(&self.summary)));
        }

        let short_id = match url.split_once("/abs/") {
            Some((_, rest)) => rest.to_string(),
            None => url.rsplit('/').next().unwrap_or(&url).to_string(),
        };
        if short_id.is_empty() {
            warn!("Skipping arXiv entry without an id");
            return Ok(None);
        }

        let date_part: String = self.published.trim().chars().take(10).collect();
        let published_date = match NaiveDate::parse_from_str(&date_part, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                warn!("Skipping arXiv entry {} with bad published date '{}': {}", short_id, self.published, e);
                return Ok(None);
            }
        };

        Ok(Some(PaperRecord {
            query: topic.to_string(),
            id: PaperId::new(short_id),
            url,
            title: collapse_whitespace(&self.title),
            summary: self.summary.trim().to_string(),
            authors: self.authors,
            published_date,
        }))
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Clone, Copy)]
enum Field {
    Id,
    Title,
    Summary,
    Published,
    AuthorName,
}

/// Parse an arXiv Atom feed into paper records, preserving feed order.
pub fn parse_atom_feed(xml: &str, topic: &str) -> Result<Vec<PaperRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut out = Vec::new();

    let mut entry: Option<EntryBuilder> = None;
    let mut in_author = false;
    let mut target: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"entry" => {
                        entry = Some(EntryBuilder::default());
                        in_author = false;
                        target = None;
                    }
                    b"author" if entry.is_some() => in_author = true,
                    b"id" if entry.is_some() => target = Some(Field::Id),
                    b"title" if entry.is_some() => target = Some(Field::Title),
                    b"summary" if entry.is_some() => target = Some(Field::Summary),
                    b"published" if entry.is_some() => target = Some(Field::Published),
                    b"name" if entry.is_some() && in_author => target = Some(Field::AuthorName),
                    _ => target = None,
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(field), Some(cur)) = (target, entry.as_mut()) {
                    let txt = t
                        .unescape()
                        .map_err(|e| Error::Parse(e.to_string()))?
                        .into_owned();
                    match field {
                        Field::Id => cur.id.push_str(&txt),
                        Field::Title => cur.title.push_str(&txt),
                        Field::Summary => cur.summary.push_str(&txt),
                        Field::Published => cur.published.push_str(&txt),
                        Field::AuthorName => cur.authors.push(txt.trim().to_string()),
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"entry" => {
                        if let Some(done) = entry.take() {
                            if let Some(paper) = done.build(topic)? {
                                out.push(paper);
                            }
                        }
                    }
                    b"author" => in_author = false,
                    _ => {}
                }
                target = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Parse(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    debug!("Parsed {} entries for topic '{}'", out.len(), topic);
    Ok(out)
}

/// Result of fetching one topic.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The service answered; these are the unseen papers (possibly none).
    Fetched(Vec<PaperRecord>),
    /// The service failed; the topic contributes nothing this run.
    Failed(String),
}

impl FetchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }

    /// Papers to process. A failed fetch yields none.
    pub fn into_papers(self) -> Vec<PaperRecord> {
        match self {
            FetchOutcome::Fetched(papers) => papers,
            FetchOutcome::Failed(_) => Vec::new(),
        }
    }
}

/// Fetch up to `per_topic_limit` papers for `topic` whose ids are not in
/// `ids`, recording the new ids in `ids`. On failure `ids` is untouched.
pub async fn fetch_new_papers(
    source: &dyn PaperSource,
    topic: &str,
    max_results: usize,
    per_topic_limit: usize,
    ids: &mut ProcessedIds,
) -> FetchOutcome {
    let results = match source.search(topic, max_results).await {
        Ok(results) => results,
        Err(e) => {
            warn!("Fetching '{}' from {} failed: {}", topic, source.name(), e);
            return FetchOutcome::Failed(e.to_string());
        }
    };

    let mut papers = Vec::new();
    for paper in results {
        if papers.len() >= per_topic_limit {
            break;
        }
        if ids.contains(&paper.id) {
            debug!("Skipping already processed paper {}", paper.id);
            continue;
        }
        ids.insert(paper.id.clone());
        papers.push(paper);
    }

    info!("Topic '{}': {} new paper(s)", topic, papers.len());
    FetchOutcome::Fetched(papers)
}
