//! DuckDuckGoProvider -- keyless instant-answer source.
//!
//! The Instant Answer API is free and needs no key, which makes this the
//! workhorse of the search chain. Abstract, definition and quick answer
//! map onto the findings answer; related topics become snippets.

use std::time::Duration;

use serde::Deserialize;

use govorun_core::provider::Provider;
use govorun_types::error::ProviderError;
use govorun_types::provider::{ProviderKind, RawResult, RequestPayload, SearchFindings, Snippet};

use super::{non_empty, MAX_SNIPPETS};

const DEFAULT_BASE_URL: &str = "https://api.duckduckgo.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Related-topic texts are trimmed to this many characters.
const TOPIC_TEXT_LIMIT: usize = 100;

/// DuckDuckGo Instant Answer provider.
pub struct DuckDuckGoProvider {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "Heading", default)]
    heading: String,
    #[serde(rename = "Definition", default)]
    definition: String,
    #[serde(rename = "Answer", default)]
    answer: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

/// Topic groups arrive as objects without `Text`; their fields default to
/// empty and the entry is filtered out.
#[derive(Debug, Default, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text", default)]
    text: String,
    #[serde(rename = "FirstURL", default)]
    first_url: String,
}

impl DuckDuckGoProvider {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
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

    fn truncate_chars(text: &str, limit: usize) -> String {
        if text.chars().count() <= limit {
            text.to_string()
        } else {
            let mut truncated: String = text.chars().take(limit).collect();
            truncated.push_str("...");
            truncated
        }
    }

    fn findings_from(answer: InstantAnswer) -> Result<SearchFindings, ProviderError> {
        let synthesized = [&answer.answer, &answer.abstract_text, &answer.definition]
            .into_iter()
            .find(|text| !text.trim().is_empty())
            .map(|text| text.trim().to_string());

        let mut snippets = Vec::new();
        if !answer.abstract_text.trim().is_empty() {
            snippets.push(Snippet {
                title: if answer.heading.trim().is_empty() {
                    "DuckDuckGo".to_string()
                } else {
                    answer.heading.trim().to_string()
                },
                url: answer.abstract_url.clone(),
                text: answer.abstract_text.trim().to_string(),
            });
        }
        for topic in &answer.related_topics {
            if snippets.len() >= MAX_SNIPPETS {
                break;
            }
            if topic.text.trim().is_empty() {
                continue;
            }
            snippets.push(Snippet {
                title: "Связанная тема".to_string(),
                url: topic.first_url.clone(),
                text: Self::truncate_chars(topic.text.trim(), TOPIC_TEXT_LIMIT),
            });
        }

        non_empty(SearchFindings {
            answer: synthesized,
            snippets,
        })
        .ok_or_else(|| ProviderError::Malformed("instant answer was empty".into()))
    }
}

impl Default for DuckDuckGoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for DuckDuckGoProvider {
    fn id(&self) -> &str {
        "duckduckgo"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Search
    }

    async fn send(&self, payload: &RequestPayload) -> Result<RawResult, ProviderError> {
        let RequestPayload::Search { query, .. } = payload else {
            return Err(ProviderError::Invalid(
                "duckduckgo handles search payloads only".into(),
            ));
        };

        let response = self
            .client
            .get(&self.base_url)
            .header("User-Agent", USER_AGENT)
            .query(&[
                ("q", query.as_str()),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                message: "instant answer endpoint unavailable".into(),
            });
        }

        let parsed: InstantAnswer = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(RawResult::Search(Self::findings_from(parsed)?))
    }
}
