//! Web search integration for competitive research.
//!
//! The [`SearchProvider`] trait abstracts over the SERP backend. The HTTP
//! implementation queries a SerpAPI-style JSON endpoint when an API key is
//! configured; without one it serves deterministic offline results so the
//! pipeline keeps working in unconfigured environments.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use keywordforge_shared::{PipelineError, Result};

/// User-Agent string for search requests.
const USER_AGENT: &str = concat!("KeywordForge/", env!("CARGO_PKG_VERSION"));

/// Timeout for a single search request.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Offline mode never fabricates more than this many results.
const MAX_OFFLINE_RESULTS: usize = 5;

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub position: u32,
}

/// Trait for ranked web search over a keyword set.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search for top-ranking content for the given keywords, returning up
    /// to `count` results ordered by position.
    async fn search(&self, keywords: &[String], count: usize) -> Result<Vec<SearchResult>>;
}

// ---------------------------------------------------------------------------
// HttpSearchProvider
// ---------------------------------------------------------------------------

/// SERP-backed search provider with an offline fallback.
#[derive(Debug)]
pub struct HttpSearchProvider {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpSearchProvider {
    /// Create a provider against the given endpoint. `api_key = None`
    /// selects offline mode.
    pub fn new(endpoint: &str, api_key: Option<String>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| PipelineError::config(format!("invalid search endpoint: {e}")))?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                PipelineError::research(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    async fn remote_search(
        &self,
        query: &str,
        count: usize,
        api_key: &str,
    ) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("q", query),
                ("api_key", api_key),
                ("engine", "google"),
                ("num", &count.to_string()),
            ])
            .send()
            .await
            .map_err(|e| PipelineError::research(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "search endpoint returned non-success, treating as no results");
            return Ok(Vec::new());
        }

        let body: SerpResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::research(format!("search response parse failed: {e}")))?;

        Ok(body
            .organic_results
            .into_iter()
            .map(|r| SearchResult {
                title: r.title,
                url: r.link,
                snippet: r.snippet,
                position: r.position,
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for HttpSearchProvider {
    async fn search(&self, keywords: &[String], count: usize) -> Result<Vec<SearchResult>> {
        let query = keywords
            .iter()
            .take(3)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        match &self.api_key {
            Some(api_key) => match self.remote_search(&query, count, api_key).await {
                Ok(results) => {
                    debug!(query = %query, results = results.len(), "search completed");
                    Ok(results)
                }
                Err(e) => {
                    warn!(error = %e, "search failed, serving offline results");
                    Ok(offline_results(keywords, count))
                }
            },
            None => Ok(offline_results(keywords, count)),
        }
    }
}

/// SerpAPI-style response envelope. Fields we do not read are ignored.
#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<SerpResult>,
}

#[derive(Debug, Deserialize)]
struct SerpResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    position: u32,
}

/// Deterministic results for offline mode, derived from the primary keyword.
fn offline_results(keywords: &[String], count: usize) -> Vec<SearchResult> {
    let main = keywords.first().map(String::as_str).unwrap_or("content");
    (0..count.min(MAX_OFFLINE_RESULTS))
        .map(|i| SearchResult {
            title: format!("Complete Guide to {main} - #{}", i + 1),
            url: format!(
                "https://example{}.com/guide-{}",
                i + 1,
                main.replace(' ', "-")
            ),
            snippet: format!("Learn everything about {main} with this comprehensive guide."),
            position: (i + 1) as u32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(samples: &[&str]) -> Vec<String> {
        samples.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn offline_mode_serves_deterministic_results() {
        let provider = HttpSearchProvider::new("https://serpapi.com/search", None).unwrap();
        let results = provider
            .search(&keywords(&["keyword research", "seo tools"]), 10)
            .await
            .unwrap();

        assert_eq!(results.len(), 5);
        assert_eq!(results[0].title, "Complete Guide to keyword research - #1");
        assert_eq!(
            results[0].url,
            "https://example1.com/guide-keyword-research"
        );
        assert_eq!(results[0].position, 1);
        assert_eq!(results[4].position, 5);
    }

    #[tokio::test]
    async fn remote_results_parse_from_serp_json() {
        let server = wiremock::MockServer::start().await;

        let body = serde_json::json!({
            "search_metadata": { "status": "Success" },
            "organic_results": [
                {
                    "position": 1,
                    "title": "Keyword Research: The Definitive Guide",
                    "link": "https://competitor-one.com/keyword-research",
                    "snippet": "Everything you need to know about keyword research."
                },
                {
                    "position": 2,
                    "title": "How to Do Keyword Research",
                    "link": "https://competitor-two.com/how-to",
                    "snippet": "A practical walkthrough."
                }
            ]
        });

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::query_param("engine", "google"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let provider = HttpSearchProvider::new(&server.uri(), Some("test-key".into())).unwrap();
        let results = provider
            .search(&keywords(&["keyword research"]), 5)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Keyword Research: The Definitive Guide");
        assert_eq!(results[0].url, "https://competitor-one.com/keyword-research");
        assert_eq!(results[1].position, 2);
    }

    #[tokio::test]
    async fn non_success_status_yields_empty_results() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = HttpSearchProvider::new(&server.uri(), Some("test-key".into())).unwrap();
        let results = provider.search(&keywords(&["seo audit"]), 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn unreachable_endpoint_falls_back_to_offline_results() {
        let server = wiremock::MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let provider = HttpSearchProvider::new(&uri, Some("test-key".into())).unwrap();
        let results = provider.search(&keywords(&["seo audit"]), 5).await.unwrap();

        assert_eq!(results.len(), 5);
        assert!(results[0].title.starts_with("Complete Guide to seo audit"));
    }

    #[test]
    fn invalid_endpoint_is_a_config_error() {
        let err = HttpSearchProvider::new("not a url", None).unwrap_err();
        assert!(matches!(err, PipelineError::Config { .. }));
    }
}
