//! WikipediaProvider -- encyclopedic fallback.
//!
//! Fetches the REST page summary from the Russian Wikipedia. Sits at the
//! tail of the search chain: free, keyless, and good at "что такое ..."
//! queries that survived the earlier sources.

use std::time::Duration;

use serde::Deserialize;

use govorun_core::provider::Provider;
use govorun_types::error::ProviderError;
use govorun_types::provider::{ProviderKind, RawResult, RequestPayload, SearchFindings, Snippet};

const DEFAULT_BASE_URL: &str = "https://ru.wikipedia.org/api/rest_v1/page/summary";
const USER_AGENT: &str = "govorun/0.1 (chat assistant)";

/// Russian Wikipedia page-summary provider.
pub struct WikipediaProvider {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct PageSummary {
    #[serde(default)]
    title: String,
    #[serde(default)]
    extract: String,
    #[serde(default)]
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentUrls {
    #[serde(default)]
    desktop: Option<DesktopUrls>,
}

#[derive(Debug, Default, Deserialize)]
struct DesktopUrls {
    #[serde(default)]
    page: Option<String>,
}

impl WikipediaProvider {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn summary_url(&self, query: &str) -> Result<reqwest::Url, ProviderError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ProviderError::Invalid(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Invalid("base url cannot carry segments".into()))?
            .push(query);
        Ok(url)
    }

    fn findings_from(summary: PageSummary) -> Result<SearchFindings, ProviderError> {
        if summary.extract.trim().is_empty() {
            return Err(ProviderError::Malformed("page summary had no extract".into()));
        }
        let page_url = summary
            .content_urls
            .and_then(|urls| urls.desktop)
            .and_then(|desktop| desktop.page)
            .unwrap_or_default();

        Ok(SearchFindings {
            answer: None,
            snippets: vec![Snippet {
                title: summary.title,
                url: page_url,
                text: summary.extract.trim().to_string(),
            }],
        })
    }
}

impl Default for WikipediaProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for WikipediaProvider {
    fn id(&self) -> &str {
        "wikipedia"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Search
    }

    async fn send(&self, payload: &RequestPayload) -> Result<RawResult, ProviderError> {
        let RequestPayload::Search { query, .. } = payload else {
            return Err(ProviderError::Invalid(
                "wikipedia handles search payloads only".into(),
            ));
        };

        let url = self.summary_url(query.trim())?;
        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                message: "no article for query".into(),
            });
        }

        let parsed: PageSummary = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(RawResult::Search(Self::findings_from(parsed)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_url_encodes_query() {
        let provider = WikipediaProvider::new();
        let url = provider.summary_url("Квантовый компьютер").unwrap();
        let rendered = url.to_string();
        assert!(rendered.starts_with("https://ru.wikipedia.org/api/rest_v1/page/summary/"));
        assert!(!rendered.contains(' '));
    }

    #[test]
    fn test_findings_carry_extract_and_page_url() {
        let summary: PageSummary = serde_json::from_str(
            r#"{
                "title": "Биткоин",
                "extract": "Биткоин -- криптовалюта.",
                "content_urls": {"desktop": {"page": "https://ru.wikipedia.org/wiki/Биткоин"}}
            }"#,
        )
        .unwrap();

        let findings = WikipediaProvider::findings_from(summary).unwrap();
        assert!(findings.answer.is_none());
        assert_eq!(findings.snippets.len(), 1);
        assert_eq!(findings.snippets[0].title, "Биткоин");
        assert_eq!(
            findings.snippets[0].url,
            "https://ru.wikipedia.org/wiki/Биткоин"
        );
    }

    #[test]
    fn test_empty_extract_is_malformed() {
        let summary: PageSummary = serde_json::from_str(r#"{"title": "Пусто"}"#).unwrap();
        let err = WikipediaProvider::findings_from(summary).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_wrong_payload_kind_rejected() {
        let provider = WikipediaProvider::new().with_base_url("http://127.0.0.1:1".into());
        let payload = RequestPayload::Image {
            prompt: "кот".into(),
        };
        let err = provider.send(&payload).await.unwrap_err();
        assert!(matches!(err, ProviderError::Invalid(_)));
    }
}
