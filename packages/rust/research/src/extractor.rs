//! Content extraction from competitor pages.
//!
//! Fetches ranked pages concurrently and pulls out the structural signals
//! the researcher cares about: title, heading hierarchy, meta description,
//! and an estimated word count. Individual page failures are logged and
//! skipped; extraction as a whole never fails.

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use keywordforge_shared::{PipelineError, Result};

/// User-Agent string for extraction requests.
const USER_AGENT: &str = concat!("KeywordForge/", env!("CARGO_PKG_VERSION"));

/// Timeout for fetching a single page.
const FETCH_TIMEOUT_SECS: u64 = 10;

/// Maximum redirects to follow per page.
const MAX_REDIRECTS: usize = 5;

/// Headings shorter than this many characters are navigation noise.
const MIN_HEADING_CHARS: usize = 4;

/// Meta descriptions synthesized from body text are cut at this length.
const DESCRIPTION_CHARS: usize = 160;

/// One heading from a fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHeading {
    /// Heading level (1 = H1 ... 6 = H6).
    pub level: u8,
    pub text: String,
}

/// Structural summary of one fetched page.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub url: String,
    pub title: Option<String>,
    pub headings: Vec<PageHeading>,
    pub meta_description: Option<String>,
    /// Rough word count over the page's content elements.
    pub word_count: usize,
}

/// Fetches pages and extracts their content structure.
pub struct ContentExtractor {
    client: Client,
}

impl ContentExtractor {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                PipelineError::research(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { client })
    }

    /// Fetch and extract every URL concurrently, dropping failures.
    pub async fn extract_many(&self, urls: &[String]) -> Vec<PageContent> {
        let mut handles = Vec::new();
        for url in urls {
            let client = self.client.clone();
            let url = url.clone();
            handles.push(tokio::spawn(
                async move { extract_page(&client, &url).await },
            ));
        }

        let mut pages = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Ok(page)) => {
                    debug!(url = %page.url, headings = page.headings.len(), "page extracted");
                    pages.push(page);
                }
                Ok(Err(e)) => warn!(error = %e, "page extraction failed"),
                Err(e) => warn!(error = %e, "extraction task panicked"),
            }
        }
        pages
    }
}

/// Fetch a single page and parse out its structure.
async fn extract_page(client: &Client, url: &str) -> Result<PageContent> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| PipelineError::research(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PipelineError::research(format!("{url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| PipelineError::research(format!("{url}: body read failed: {e}")))?;

    Ok(parse_page(url, &body))
}

/// Pull title, headings, meta description, and word count from raw HTML.
fn parse_page(url: &str, html: &str) -> PageContent {
    let doc = Html::parse_document(html);

    let title_sel = Selector::parse("title").unwrap();
    let h1_sel = Selector::parse("h1").unwrap();
    let title = doc
        .select(&title_sel)
        .next()
        .map(|el| element_text(&el))
        .filter(|t| !t.is_empty())
        .or_else(|| doc.select(&h1_sel).next().map(|el| element_text(&el)))
        .filter(|t| !t.is_empty());

    let heading_sel = Selector::parse("h1, h2, h3, h4, h5, h6").unwrap();
    let headings: Vec<PageHeading> = doc
        .select(&heading_sel)
        .filter_map(|el| {
            let text = element_text(&el);
            if text.chars().count() < MIN_HEADING_CHARS {
                return None;
            }
            let level = el.value().name().strip_prefix('h')?.parse::<u8>().ok()?;
            Some(PageHeading { level, text })
        })
        .collect();

    let meta_description = extract_meta_description(&doc);
    let word_count = estimate_word_count(&doc);

    PageContent {
        url: url.to_string(),
        title,
        headings,
        meta_description,
        word_count,
    }
}

fn element_text(el: &scraper::ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Meta description tag, or the first paragraph truncated as a stand-in.
fn extract_meta_description(doc: &Html) -> Option<String> {
    let meta_sel = Selector::parse(r#"meta[name="description"]"#).unwrap();
    if let Some(content) = doc
        .select(&meta_sel)
        .next()
        .and_then(|el| el.value().attr("content"))
    {
        let content = content.trim();
        if !content.is_empty() {
            return Some(content.to_string());
        }
    }

    let p_sel = Selector::parse("p").unwrap();
    let first_paragraph = doc.select(&p_sel).next().map(|el| element_text(&el))?;
    if first_paragraph.is_empty() {
        return None;
    }
    if first_paragraph.chars().count() > DESCRIPTION_CHARS {
        let truncated: String = first_paragraph.chars().take(DESCRIPTION_CHARS).collect();
        Some(format!("{truncated}..."))
    } else {
        Some(first_paragraph)
    }
}

/// Word count over content elements, which keeps script and style text out.
fn estimate_word_count(doc: &Html) -> usize {
    let content_sel = Selector::parse("p, li, h1, h2, h3, h4, h5, h6").unwrap();
    doc.select(&content_sel)
        .map(|el| el.text().collect::<String>().split_whitespace().count())
        .sum()
}
