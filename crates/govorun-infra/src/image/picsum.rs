//! PicsumProvider -- last-resort image fallback.
//!
//! Lorem Picsum cannot honor a prompt; it serves a random photograph. The
//! adapter exists so the image chain still produces something visual when
//! the generative service is down. The prompt only seeds the `random`
//! parameter for cache busting.

use std::time::Duration;

use govorun_core::provider::Provider;
use govorun_types::error::ProviderError;
use govorun_types::provider::{ImageArtifact, ProviderKind, RawResult, RequestPayload};

use super::prompt_seed;

const DEFAULT_BASE_URL: &str = "https://picsum.photos";

/// Lorem Picsum random-image provider.
pub struct PicsumProvider {
    client: reqwest::Client,
    base_url: String,
}

impl PicsumProvider {
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

    fn image_url(&self, prompt: &str) -> String {
        format!(
            "{}/1024/1024?random={}",
            self.base_url,
            prompt_seed(prompt)
        )
    }
}

impl Default for PicsumProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for PicsumProvider {
    fn id(&self) -> &str {
        "picsum"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Image
    }

    async fn send(&self, payload: &RequestPayload) -> Result<RawResult, ProviderError> {
        let RequestPayload::Image { prompt } = payload else {
            return Err(ProviderError::Invalid(
                "picsum handles image payloads only".into(),
            ));
        };

        let url = self.image_url(prompt);
        let response = self
            .client
            .head(&url)
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
            url,
            prompt: prompt.clone(),
        }))
    }
}
