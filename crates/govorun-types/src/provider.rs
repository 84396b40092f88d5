//! Provider descriptors, request payloads and raw results.
//!
//! A provider is statically configured at process start and read-only
//! thereafter. Ordering within a kind is total (priority, then declaration
//! order) and defines the fallback sequence.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chat::ChatTurn;
use crate::intent::SearchCategory;

/// Capability a provider implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Conversational,
    Image,
    Search,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Conversational => write!(f, "conversational"),
            ProviderKind::Image => write!(f, "image"),
            ProviderKind::Search => write!(f, "search"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conversational" => Ok(ProviderKind::Conversational),
            "image" => Ok(ProviderKind::Image),
            "search" => Ok(ProviderKind::Search),
            other => Err(format!("invalid provider kind: '{other}'")),
        }
    }
}

/// An opaque bearer token handed to conversational providers.
///
/// The inner string never appears in `Debug` output, and the type is
/// deliberately not serializable.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Expose the raw token for constructing an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken(****)")
    }
}

/// Endpoint settings for a single provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Override the adapter's default base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key, if the
    /// adapter needs one.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Per-provider override of the per-attempt timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Static descriptor of a configured provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Stable identifier (e.g., "gigachat", "yandex").
    pub id: String,
    /// Capability this provider implements.
    pub kind: ProviderKind,
    /// Fallback ordering within the kind; lower = tried first.
    pub priority: u32,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Uniform request contract carried to every provider adapter.
#[derive(Debug, Clone)]
pub enum RequestPayload {
    /// Conversational completion over the recent history tail plus the
    /// current user turn. The token is injected by the orchestration
    /// engine for conversational-kind providers only.
    Chat {
        messages: Vec<ChatTurn>,
        access_token: Option<BearerToken>,
    },
    /// Image generation from an extracted prompt.
    Image { prompt: String },
    /// Web search for the given query.
    Search {
        query: String,
        category: SearchCategory,
    },
}

impl RequestPayload {
    pub fn kind(&self) -> ProviderKind {
        match self {
            RequestPayload::Chat { .. } => ProviderKind::Conversational,
            RequestPayload::Image { .. } => ProviderKind::Image,
            RequestPayload::Search { .. } => ProviderKind::Search,
        }
    }
}

/// Conversational provider output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub content: String,
}

/// Image provider output: a reference to the generated image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageArtifact {
    pub url: String,
    pub prompt: String,
}

/// One retrieved search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub title: String,
    pub url: String,
    pub text: String,
}

/// Search provider output. `answer` is a synthesized conversational-style
/// answer when the source produces one (Perplexity does, Yandex does not).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFindings {
    pub answer: Option<String>,
    pub snippets: Vec<Snippet>,
}

/// Raw, provider-shaped result before composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawResult {
    Chat(ChatReply),
    Image(ImageArtifact),
    Search(SearchFindings),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_roundtrip() {
        for kind in [
            ProviderKind::Conversational,
            ProviderKind::Image,
            ProviderKind::Search,
        ] {
            let s = kind.to_string();
            let parsed: ProviderKind = s.parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_bearer_token_debug_redacts() {
        let token = BearerToken::new("very-secret-value");
        let debug = format!("{token:?}");
        assert!(!debug.contains("very-secret-value"));
        assert_eq!(token.expose(), "very-secret-value");
    }

    #[test]
    fn test_payload_kind() {
        let payload = RequestPayload::Image {
            prompt: "кот".into(),
        };
        assert_eq!(payload.kind(), ProviderKind::Image);
    }

    #[test]
    fn test_provider_config_toml() {
        let toml = r#"
id = "yandex"
kind = "search"
priority = 1

[endpoint]
api_key_env = "YANDEX_SEARCH_API_KEY"
timeout_secs = 15
"#;
        let config: ProviderConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.id, "yandex");
        assert_eq!(config.kind, ProviderKind::Search);
        assert!(config.enabled);
        assert_eq!(config.endpoint.timeout_secs, Some(15));
        assert!(config.endpoint.base_url.is_none());
    }

    #[test]
    fn test_raw_result_serde_tagged() {
        let result = RawResult::Search(SearchFindings {
            answer: None,
            snippets: vec![Snippet {
                title: "Биткоин".into(),
                url: "https://example.ru/btc".into(),
                text: "Курс вырос".into(),
            }],
        });
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"kind\":\"search\""));
        let parsed: RawResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }
}
