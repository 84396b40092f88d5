//! GigaChatProvider -- concrete conversational [`Provider`] for the
//! GigaChat API.
//!
//! Sends completion requests to `/chat/completions` with the bearer token
//! injected by the orchestration engine. The adapter itself holds no
//! credential; a payload arriving without a token fails as an auth error
//! before any network call.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use govorun_core::provider::Provider;
use govorun_types::chat::ChatTurn;
use govorun_types::error::ProviderError;
use govorun_types::provider::{ChatReply, ProviderKind, RawResult, RequestPayload};

const DEFAULT_BASE_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1";
const MODEL: &str = "GigaChat";
const SYSTEM_PROMPT: &str =
    "Ты полезный AI-ассистент. Отвечай на русском языке кратко и по существу.";

/// GigaChat conversational provider.
pub struct GigaChatProvider {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: &'static str,
    messages: Vec<WireMessage>,
    temperature: f64,
    max_tokens: u32,
    n: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl GigaChatProvider {
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

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// System prompt first, then the history tail and the current turn.
    fn build_messages(turns: &[ChatTurn]) -> Vec<WireMessage> {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(WireMessage {
            role: "system".to_string(),
            content: SYSTEM_PROMPT.to_string(),
        });
        for turn in turns {
            messages.push(WireMessage {
                role: turn.role.to_string(),
                content: turn.content.clone(),
            });
        }
        messages
    }
}

impl Default for GigaChatProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for GigaChatProvider {
    fn id(&self) -> &str {
        "gigachat"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Conversational
    }

    async fn send(&self, payload: &RequestPayload) -> Result<RawResult, ProviderError> {
        let RequestPayload::Chat {
            messages,
            access_token,
        } = payload
        else {
            return Err(ProviderError::Invalid(
                "gigachat handles chat payloads only".into(),
            ));
        };
        let Some(token) = access_token else {
            return Err(ProviderError::Auth);
        };

        let body = CompletionRequest {
            model: MODEL,
            messages: Self::build_messages(messages),
            temperature: 0.7,
            max_tokens: 512,
            n: 1,
            stream: false,
        };

        let response = self
            .client
            .post(self.url("/chat/completions"))
            .bearer_auth(token.expose())
            .header("Accept", "application/json")
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

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| ProviderError::Malformed("response contained no choices".into()))?;

        Ok(RawResult::Chat(ChatReply { content }))
    }
}
