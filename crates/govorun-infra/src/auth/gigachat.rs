//! GigaChat OAuth token source.
//!
//! Performs the client-credentials exchange against the Sberbank auth
//! endpoint: Basic authorization with the long-lived key, a fresh `RqUID`
//! per request, and `scope=GIGACHAT_API_PERS` as a form field. The
//! response carries `expires_at` in unix milliseconds; when it is absent
//! the documented 30-minute token lifetime is assumed.
//!
//! The authorization key is wrapped in [`secrecy::SecretString`] and never
//! appears in logs or `Debug` output.

use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use uuid::Uuid;

use govorun_core::auth::{IssuedToken, TokenSource};
use govorun_types::error::AuthError;
use govorun_types::provider::BearerToken;

const DEFAULT_TOKEN_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
const DEFAULT_SCOPE: &str = "GIGACHAT_API_PERS";
const FALLBACK_TTL_MINUTES: i64 = 30;

/// OAuth client-credentials source for the GigaChat API.
pub struct GigaChatTokenSource {
    client: reqwest::Client,
    authorization_key: SecretString,
    token_url: String,
    scope: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Unix milliseconds.
    #[serde(default)]
    expires_at: Option<i64>,
}

impl GigaChatTokenSource {
    pub fn new(authorization_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            authorization_key,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }

    /// Override the token endpoint (useful for testing or proxies).
    pub fn with_token_url(mut self, token_url: String) -> Self {
        self.token_url = token_url;
        self
    }

    fn expiry_from(expires_at_ms: Option<i64>) -> DateTime<Utc> {
        expires_at_ms
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or_else(|| Utc::now() + chrono::Duration::minutes(FALLBACK_TTL_MINUTES))
    }
}

// No Debug derive: the struct holds the authorization key.

impl TokenSource for GigaChatTokenSource {
    async fn refresh(&self) -> Result<IssuedToken, AuthError> {
        let response = self
            .client
            .post(&self.token_url)
            .header(
                "Authorization",
                format!("Basic {}", self.authorization_key.expose_secret()),
            )
            .header("RqUID", Uuid::new_v4().to_string())
            .header("Accept", "application/json")
            .form(&[("scope", self.scope.as_str())])
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Exchange {
                status: status.as_u16(),
                message: body,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Transport(format!("failed to parse token response: {e}")))?;

        let expires_at = Self::expiry_from(token.expires_at);
        tracing::info!(%expires_at, "GigaChat access token obtained");

        Ok(IssuedToken {
            access_token: BearerToken::new(token.access_token),
            expires_at,
        })
    }
}
