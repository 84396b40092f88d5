//! PerplexityProvider -- answer-synthesizing search source.
//!
//! Perplexity's chat-completions endpoint returns a ready answer plus the
//! citation URLs it drew from; both map straight onto [`SearchFindings`].
//!
//! The API key is wrapped in [`secrecy::SecretString`] and never appears
//! in logs or `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use govorun_core::provider::Provider;
use govorun_types::error::ProviderError;
use govorun_types::provider::{ProviderKind, RawResult, RequestPayload, SearchFindings, Snippet};

use super::{non_empty, MAX_SNIPPETS};

const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";
const MODEL: &str = "llama-3.1-sonar-small-128k-online";
const SYSTEM_PROMPT: &str =
    "Ты помощник для поиска актуальной информации. Отвечай кратко и точно на русском языке.";

/// Perplexity online search provider.
pub struct PerplexityProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    model: &'static str,
    messages: [WireMessage<'a>; 2],
    max_tokens: u32,
    temperature: f64,
    search_recency_filter: &'static str,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    citations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl PerplexityProvider {
    pub fn new(api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn findings_from(response: SearchResponse) -> Result<SearchFindings, ProviderError> {
        let answer = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| ProviderError::Malformed("response contained no choices".into()))?;

        let snippets = response
            .citations
            .into_iter()
            .take(MAX_SNIPPETS)
            .enumerate()
            .map(|(i, url)| Snippet {
                title: format!("Источник {}", i + 1),
                url,
                text: String::new(),
            })
            .collect();

        non_empty(SearchFindings {
            answer: Some(answer),
            snippets,
        })
        .ok_or_else(|| ProviderError::Malformed("answer was empty".into()))
    }
}

// No Debug derive: the struct holds the API key.

impl Provider for PerplexityProvider {
    fn id(&self) -> &str {
        "perplexity"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Search
    }

    async fn send(&self, payload: &RequestPayload) -> Result<RawResult, ProviderError> {
        let RequestPayload::Search { query, .. } = payload else {
            return Err(ProviderError::Invalid(
                "perplexity handles search payloads only".into(),
            ));
        };

        let body = SearchRequest {
            model: MODEL,
            messages: [
                WireMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                WireMessage {
                    role: "user",
                    content: query,
                },
            ],
            max_tokens: 500,
            temperature: 0.2,
            search_recency_filter: "month",
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => ProviderError::Auth,
                code => ProviderError::Rejected {
                    status: code,
                    message: body,
                },
            });
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(RawResult::Search(Self::findings_from(parsed)?))
    }
}
