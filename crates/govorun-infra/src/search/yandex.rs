//! YandexSearchProvider -- Yandex XML search.
//!
//! The XML API answers with `<group><doc><title/><url/><passage/>` blocks.
//! There is no synthesized answer; the passages become snippets and the
//! composer cites them inline. Highlight tags (`<hlword>`) and other
//! markup are stripped from titles and passages.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and never appears
//! in logs or `Debug` output.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};

use govorun_core::provider::Provider;
use govorun_types::error::ProviderError;
use govorun_types::provider::{ProviderKind, RawResult, RequestPayload, SearchFindings, Snippet};

use super::MAX_SNIPPETS;

const DEFAULT_BASE_URL: &str = "https://yandex.com/search/xml";

static DOC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<doc[^>]*>(.*?)</doc>").expect("static pattern compiles")
});
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<title>(.*?)</title>").expect("static pattern compiles")
});
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<url>(.*?)</url>").expect("static pattern compiles"));
static PASSAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<passage>(.*?)</passage>").expect("static pattern compiles")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static pattern compiles"));

/// Yandex XML search provider.
pub struct YandexSearchProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    user: String,
}

impl YandexSearchProvider {
    pub fn new(api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            user: "govorun".to_string(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn strip_tags(text: &str) -> String {
        TAG_RE.replace_all(text, "").trim().to_string()
    }

    /// Extract up to [`MAX_SNIPPETS`] title/url/passage triples from the
    /// XML body. Documents without a title or passage are dropped.
    pub(crate) fn parse_snippets(xml: &str) -> Vec<Snippet> {
        DOC_RE
            .captures_iter(xml)
            .filter_map(|doc| {
                let body = doc.get(1)?.as_str();
                let title = TITLE_RE.captures(body)?.get(1)?.as_str();
                let passage = PASSAGE_RE.captures(body)?.get(1)?.as_str();
                let url = URL_RE
                    .captures(body)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default();

                let title = Self::strip_tags(title);
                let text = Self::strip_tags(passage);
                if title.is_empty() || text.is_empty() {
                    return None;
                }
                Some(Snippet { title, url, text })
            })
            .take(MAX_SNIPPETS)
            .collect()
    }
}

// No Debug derive: the struct holds the API key.

impl Provider for YandexSearchProvider {
    fn id(&self) -> &str {
        "yandex"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Search
    }

    async fn send(&self, payload: &RequestPayload) -> Result<RawResult, ProviderError> {
        let RequestPayload::Search { query, .. } = payload else {
            return Err(ProviderError::Invalid(
                "yandex handles search payloads only".into(),
            ));
        };

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("query", query.as_str()),
                ("user", self.user.as_str()),
                ("key", self.api_key.expose_secret()),
                ("lr", "213"),
                ("l10n", "ru"),
                ("sortby", "rlv"),
                ("filter", "none"),
                ("maxpassages", "3"),
                ("groupby", "attr=d.mode=deep.groups-on-page=5.docs-in-group=1"),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }

        let xml = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let snippets = Self::parse_snippets(&xml);
        if snippets.is_empty() {
            return Err(ProviderError::Malformed(
                "search response contained no passages".into(),
            ));
        }

        Ok(RawResult::Search(SearchFindings {
            answer: None,
            snippets,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<yandexsearch version="1.0">
<response>
<results><grouping>
<group>
  <doc id="1">
    <title>Курс <hlword>биткоина</hlword> сегодня</title>
    <url>https://news.example.ru/btc</url>
    <passage><hlword>Биткоин</hlword> обновил исторический максимум.</passage>
  </doc>
</group>
<group>
  <doc id="2">
    <title>Рынки</title>
    <url>https://markets.example.ru</url>
    <passage>Объем торгов вырос вдвое за сутки.</passage>
  </doc>
</group>
<group>
  <doc id="3">
    <title>Без пассажа</title>
    <url>https://empty.example.ru</url>
  </doc>
</group>
</grouping></results>
</response>
</yandexsearch>"#;

    #[test]
    fn test_parse_snippets_strips_markup() {
        let snippets = YandexSearchProvider::parse_snippets(FIXTURE);
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].title, "Курс биткоина сегодня");
        assert_eq!(snippets[0].url, "https://news.example.ru/btc");
        assert_eq!(snippets[0].text, "Биткоин обновил исторический максимум.");
        assert_eq!(snippets[1].title, "Рынки");
    }

    #[test]
    fn test_parse_snippets_caps_at_three() {
        let many: String = (0..5)
            .map(|i| {
                format!(
                    "<doc><title>Заголовок {i}</title><url>https://e.ru/{i}</url><passage>Текст {i}</passage></doc>"
                )
            })
            .collect();
        let snippets = YandexSearchProvider::parse_snippets(&many);
        assert_eq!(snippets.len(), MAX_SNIPPETS);
    }

    #[test]
    fn test_parse_snippets_empty_body() {
        assert!(YandexSearchProvider::parse_snippets("<response></response>").is_empty());
    }

    #[tokio::test]
    async fn test_wrong_payload_kind_rejected() {
        let provider = YandexSearchProvider::new(SecretString::from("test-key-not-real"))
            .with_base_url("http://127.0.0.1:1".into());
        let payload = RequestPayload::Image {
            prompt: "кот".into(),
        };
        let err = provider.send(&payload).await.unwrap_err();
        assert!(matches!(err, ProviderError::Invalid(_)));
    }
}
