//! PollinationsProvider -- primary image generation adapter.
//!
//! Pollinations serves a generated image directly at
//! `/prompt/{prompt}?width=..&height=..&seed=..&enhance=true`. The adapter
//! probes the URL with a HEAD request and hands the URL back as the
//! artifact; no image bytes travel through the engine.

use std::time::Duration;

use govorun_core::provider::Provider;
use govorun_types::error::ProviderError;
use govorun_types::provider::{ImageArtifact, ProviderKind, RawResult, RequestPayload};

use super::prompt_seed;

const DEFAULT_BASE_URL: &str = "https://image.pollinations.ai";

/// Minimum prompt length accepted for generation.
const MIN_PROMPT_CHARS: usize = 3;

/// Pollinations.ai image generation provider.
pub struct PollinationsProvider {
    client: reqwest::Client,
    base_url: String,
}

impl PollinationsProvider {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
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

    fn image_url(&self, prompt: &str) -> Result<reqwest::Url, ProviderError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ProviderError::Invalid(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Invalid("base url cannot carry segments".into()))?
            .push("prompt")
            .push(prompt);
        url.query_pairs_mut()
            .append_pair("width", "1024")
            .append_pair("height", "1024")
            .append_pair("seed", &prompt_seed(prompt).to_string())
            .append_pair("enhance", "true");
        Ok(url)
    }
}

impl Default for PollinationsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for PollinationsProvider {
    fn id(&self) -> &str {
        "pollinations"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Image
    }

    async fn send(&self, payload: &RequestPayload) -> Result<RawResult, ProviderError> {
        let RequestPayload::Image { prompt } = payload else {
            return Err(ProviderError::Invalid(
                "pollinations handles image payloads only".into(),
            ));
        };
        if prompt.trim().chars().count() < MIN_PROMPT_CHARS {
            return Err(ProviderError::Invalid("image prompt is too short".into()));
        }

        let url = self.image_url(prompt.trim())?;
        tracing::debug!(prompt = %prompt, "probing generated image");

        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                message: "image endpoint unavailable".into(),
            });
        }

        Ok(RawResult::Image(ImageArtifact {
            url: url.to_string(),
            prompt: prompt.trim().to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url_is_deterministic_and_encoded() {
        let provider = PollinationsProvider::new();
        let first = provider.image_url("кот в шляпе").unwrap();
        let second = provider.image_url("кот в шляпе").unwrap();
        assert_eq!(first, second);

        let rendered = first.to_string();
        assert!(rendered.starts_with("https://image.pollinations.ai/prompt/"));
        // The Cyrillic prompt is percent-encoded into the path.
        assert!(!rendered.contains(' '));
        assert!(rendered.contains("width=1024"));
        assert!(rendered.contains("enhance=true"));
    }

    #[tokio::test]
    async fn test_short_prompt_rejected_before_network() {
        let provider = PollinationsProvider::new().with_base_url("http://127.0.0.1:1".into());
        let payload = RequestPayload::Image { prompt: "ко".into() };
        let err = provider.send(&payload).await.unwrap_err();
        assert!(matches!(err, ProviderError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_wrong_payload_kind_rejected() {
        let provider = PollinationsProvider::new().with_base_url("http://127.0.0.1:1".into());
        let payload = RequestPayload::Search {
            query: "кот".into(),
            category: govorun_types::intent::SearchCategory::Generic,
        };
        let err = provider.send(&payload).await.unwrap_err();
        assert!(matches!(err, ProviderError::Invalid(_)));
    }
}
