//! WttrProvider -- weather lookups via wttr.in.
//!
//! Weather queries deserve real meteorological data rather than generic
//! search passages, so this adapter sits ahead of the generic sources in
//! the chain. The city is recognized from the query by a stem table
//! (declension-tolerant) and defaults to Moscow.

use std::time::Duration;

use serde::Deserialize;

use govorun_core::provider::Provider;
use govorun_types::error::ProviderError;
use govorun_types::provider::{ProviderKind, RawResult, RequestPayload, SearchFindings, Snippet};

const DEFAULT_BASE_URL: &str = "https://wttr.in";

/// (query stem, wttr city name, Russian locative form).
const CITY_TABLE: &[(&str, &str, &str)] = &[
    ("москв", "Moscow", "Москве"),
    ("moscow", "Moscow", "Москве"),
    ("петербург", "Saint Petersburg", "Санкт-Петербурге"),
    ("питер", "Saint Petersburg", "Санкт-Петербурге"),
    ("спб", "Saint Petersburg", "Санкт-Петербурге"),
    ("екатеринбург", "Yekaterinburg", "Екатеринбурге"),
    ("новосибирск", "Novosibirsk", "Новосибирске"),
    ("казан", "Kazan", "Казани"),
    ("владивосток", "Vladivostok", "Владивостоке"),
    ("красноярск", "Krasnoyarsk", "Красноярске"),
    ("сочи", "Sochi", "Сочи"),
    ("мурманск", "Murmansk", "Мурманске"),
    ("самар", "Samara", "Самаре"),
    ("омск", "Omsk", "Омске"),
    ("иркутск", "Irkutsk", "Иркутске"),
];

const DEFAULT_CITY: (&str, &str) = ("Moscow", "Москве");

/// wttr.in weather provider.
pub struct WttrProvider {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct WeatherReport {
    #[serde(rename = "current_condition", default)]
    current_condition: Vec<CurrentCondition>,
}

/// wttr.in serializes every numeric field as a string.
#[derive(Debug, Default, Deserialize)]
struct CurrentCondition {
    #[serde(rename = "temp_C", default)]
    temp_c: String,
    #[serde(rename = "FeelsLikeC", default)]
    feels_like_c: String,
    #[serde(default)]
    humidity: String,
    #[serde(rename = "windspeedKmph", default)]
    windspeed_kmph: String,
    #[serde(rename = "weatherDesc", default)]
    weather_desc: Vec<WeatherDesc>,
}

#[derive(Debug, Default, Deserialize)]
struct WeatherDesc {
    #[serde(default)]
    value: String,
}

impl WttrProvider {
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

    /// Recognize the city from the query, defaulting to Moscow.
    pub(crate) fn resolve_city(query: &str) -> (&'static str, &'static str) {
        let lowered = query.to_lowercase();
        for (stem, city, locative) in CITY_TABLE {
            if lowered.contains(stem) {
                return (city, locative);
            }
        }
        DEFAULT_CITY
    }

    fn findings_from(
        condition: &CurrentCondition,
        city_ru: &str,
        source_url: String,
    ) -> SearchFindings {
        let description = condition
            .weather_desc
            .first()
            .map(|desc| desc.value.trim())
            .unwrap_or_default();

        let mut answer = format!(
            "Сейчас в {city_ru} {}°C, ощущается как {}°C.",
            condition.temp_c, condition.feels_like_c
        );
        if !description.is_empty() {
            answer.push_str(&format!(" {description}."));
        }
        answer.push_str(&format!(
            " Влажность {}%, ветер {} км/ч.",
            condition.humidity, condition.windspeed_kmph
        ));

        SearchFindings {
            answer: Some(answer),
            snippets: vec![Snippet {
                title: "wttr.in".to_string(),
                url: source_url,
                text: "Актуальные метеоданные wttr.in".to_string(),
            }],
        }
    }
}

impl Default for WttrProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for WttrProvider {
    fn id(&self) -> &str {
        "wttr"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Search
    }

    async fn send(&self, payload: &RequestPayload) -> Result<RawResult, ProviderError> {
        let RequestPayload::Search { query, .. } = payload else {
            return Err(ProviderError::Invalid(
                "wttr handles search payloads only".into(),
            ));
        };

        let (city, city_ru) = Self::resolve_city(query);
        let url = format!("{}/{}", self.base_url, city);

        let response = self
            .client
            .get(&url)
            .query(&[("format", "j1")])
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                message: "weather endpoint unavailable".into(),
            });
        }

        let report: WeatherReport = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let Some(condition) = report.current_condition.first() else {
            return Err(ProviderError::Malformed(
                "report carried no current conditions".into(),
            ));
        };

        Ok(RawResult::Search(Self::findings_from(
            condition, city_ru, url,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_city_handles_declensions() {
        assert_eq!(
            WttrProvider::resolve_city("какая погода в Москве завтра").0,
            "Moscow"
        );
        assert_eq!(
            WttrProvider::resolve_city("погода в казани").0,
            "Kazan"
        );
        assert_eq!(
            WttrProvider::resolve_city("прогноз для Санкт-Петербурга"),
            ("Saint Petersburg", "Санкт-Петербурге")
        );
    }

    #[test]
    fn test_resolve_city_defaults_to_moscow() {
        assert_eq!(WttrProvider::resolve_city("какая погода"), DEFAULT_CITY);
    }

    #[test]
    fn test_findings_from_report_fixture() {
        let report: WeatherReport = serde_json::from_str(
            r#"{
                "current_condition": [{
                    "temp_C": "-7",
                    "FeelsLikeC": "-12",
                    "humidity": "84",
                    "windspeedKmph": "14",
                    "weatherDesc": [{"value": "Light snow"}]
                }]
            }"#,
        )
        .unwrap();

        let findings = WttrProvider::findings_from(
            &report.current_condition[0],
            "Москве",
            "https://wttr.in/Moscow".to_string(),
        );
        let answer = findings.answer.unwrap();
        assert!(answer.contains("в Москве -7°C"));
        assert!(answer.contains("ощущается как -12°C"));
        assert!(answer.contains("Light snow"));
        assert!(answer.contains("Влажность 84%"));
        assert_eq!(findings.snippets.len(), 1);
        assert_eq!(findings.snippets[0].url, "https://wttr.in/Moscow");
    }

    #[tokio::test]
    async fn test_wrong_payload_kind_rejected() {
        let provider = WttrProvider::new().with_base_url("http://127.0.0.1:1".into());
        let payload = RequestPayload::Image {
            prompt: "кот".into(),
        };
        let err = provider.send(&payload).await.unwrap_err();
        assert!(matches!(err, ProviderError::Invalid(_)));
    }
}
