//! Credential lifecycle for the conversational provider.
//!
//! [`CredentialManager`] keeps an OAuth access token fresh through a
//! [`TokenSource`]: Unauthenticated -> Authenticating -> Valid ->
//! (Expiring -> Authenticating). Refresh is coalesced behind a single
//! gate, so concurrent callers trigger at most one exchange, and a token
//! entering its safety margin is refreshed in the background while
//! request-path callers keep using the still-valid token.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use govorun_types::error::AuthError;
use govorun_types::provider::BearerToken;

/// One issued access token with its expiry instant.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: BearerToken,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// True once the remaining lifetime drops inside the safety margin.
    pub fn within_margin(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at.signed_duration_since(now).num_milliseconds()
            <= margin.as_millis() as i64
    }
}

/// Performs the OAuth exchange against the provider's auth endpoint.
///
/// The concrete implementation lives in `govorun-infra`.
pub trait TokenSource: Send + Sync {
    fn refresh(&self) -> impl Future<Output = Result<IssuedToken, AuthError>> + Send;
}

struct Inner<S> {
    source: S,
    state: RwLock<Option<IssuedToken>>,
    /// At most one refresh in flight; concurrent callers await the holder.
    refresh_gate: Mutex<()>,
    refresh_margin: Duration,
}

/// Always-valid-token accessor over a [`TokenSource`].
///
/// Cheap to clone; clones share the token state and the refresh gate.
pub struct CredentialManager<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for CredentialManager<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: TokenSource + 'static> CredentialManager<S> {
    pub fn new(source: S, refresh_margin: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                state: RwLock::new(None),
                refresh_gate: Mutex::new(()),
                refresh_margin,
            }),
        }
    }

    /// Current token, refreshing as needed.
    ///
    /// - Valid token outside the margin: returned without locking.
    /// - Token inside the margin but unexpired: a background refresh is
    ///   kicked and the current token is returned immediately.
    /// - Expired or absent token: the caller awaits the coalesced refresh.
    ///
    /// Fails with [`AuthError::Unavailable`] only when the token is
    /// expired (or absent) and the refresh cannot succeed.
    pub async fn get_valid_token(&self) -> Result<BearerToken, AuthError> {
        let now = Utc::now();
        {
            let state = self.inner.state.read().await;
            if let Some(token) = state.as_ref() {
                if !token.within_margin(now, self.inner.refresh_margin) {
                    return Ok(token.access_token.clone());
                }
                if !token.is_expired(now) {
                    let access = token.access_token.clone();
                    drop(state);
                    self.spawn_proactive_refresh();
                    return Ok(access);
                }
            }
        }
        self.refresh_coalesced().await
    }

    /// Kick a background refresh. The `try_lock` keeps it single-flight:
    /// if a refresh is already running, the task exits immediately.
    fn spawn_proactive_refresh(&self) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let Ok(_gate) = inner.refresh_gate.try_lock() else {
                return;
            };
            // The token may have been refreshed while this task was queued.
            let now = Utc::now();
            {
                let state = inner.state.read().await;
                if let Some(token) = state.as_ref() {
                    if !token.within_margin(now, inner.refresh_margin) {
                        return;
                    }
                }
            }
            match inner.source.refresh().await {
                Ok(token) => {
                    tracing::debug!(expires_at = %token.expires_at, "access token refreshed proactively");
                    *inner.state.write().await = Some(token);
                }
                Err(err) => {
                    // The current token is still valid; the next request
                    // inside the margin will retry.
                    tracing::warn!(error = %err, "proactive token refresh failed");
                }
            }
        });
    }

    async fn refresh_coalesced(&self) -> Result<BearerToken, AuthError> {
        let inner = &self.inner;
        let _gate = inner.refresh_gate.lock().await;

        // A concurrent caller may have refreshed while we awaited the gate.
        {
            let state = inner.state.read().await;
            if let Some(token) = state.as_ref() {
                if !token.is_expired(Utc::now()) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        match inner.source.refresh().await {
            Ok(token) => {
                tracing::info!(expires_at = %token.expires_at, "access token refreshed");
                let access = token.access_token.clone();
                *inner.state.write().await = Some(token);
                Ok(access)
            }
            Err(err) => {
                tracing::error!(error = %err, "token refresh failed");
                let state = inner.state.read().await;
                match state.as_ref() {
                    // An unexpired previous token keeps serving requests.
                    Some(token) if !token.is_expired(Utc::now()) => {
                        Ok(token.access_token.clone())
                    }
                    _ => Err(AuthError::Unavailable),
                }
            }
        }
    }

    /// Seed the manager with an already-issued token. Test hook and warm
    /// start after an out-of-band exchange.
    pub async fn install_token(&self, token: IssuedToken) {
        *self.inner.state.write().await = Some(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    struct MockSource {
        calls: Arc<AtomicU32>,
        fail: Arc<AtomicBool>,
        delay: Duration,
        ttl: chrono::Duration,
    }

    impl MockSource {
        fn new(calls: Arc<AtomicU32>) -> Self {
            Self {
                calls,
                fail: Arc::new(AtomicBool::new(false)),
                delay: Duration::from_millis(50),
                ttl: chrono::Duration::minutes(30),
            }
        }
    }

    impl TokenSource for MockSource {
        async fn refresh(&self) -> Result<IssuedToken, AuthError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(self.delay).await;
            if self.fail.load(Ordering::SeqCst) {
                return Err(AuthError::Exchange {
                    status: 500,
                    message: "exchange down".into(),
                });
            }
            Ok(IssuedToken {
                access_token: BearerToken::new(format!("token-{call}")),
                expires_at: Utc::now() + self.ttl,
            })
        }
    }

    fn margin() -> Duration {
        Duration::from_secs(300)
    }

    #[tokio::test]
    async fn test_first_call_refreshes() {
        let calls = Arc::new(AtomicU32::new(0));
        let manager = CredentialManager::new(MockSource::new(Arc::clone(&calls)), margin());

        let token = manager.get_valid_token().await.unwrap();
        assert_eq!(token.expose(), "token-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_valid_token_reused_without_refresh() {
        let calls = Arc::new(AtomicU32::new(0));
        let manager = CredentialManager::new(MockSource::new(Arc::clone(&calls)), margin());

        manager.get_valid_token().await.unwrap();
        manager.get_valid_token().await.unwrap();
        manager.get_valid_token().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_coalesce_to_one_refresh() {
        let calls = Arc::new(AtomicU32::new(0));
        let manager = CredentialManager::new(MockSource::new(Arc::clone(&calls)), margin());

        let mut set = tokio::task::JoinSet::new();
        for _ in 0..10 {
            let manager = manager.clone();
            set.spawn(async move { manager.get_valid_token().await });
        }
        while let Some(result) = set.join_next().await {
            let token = result.unwrap().unwrap();
            assert_eq!(token.expose(), "token-1");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_unexpired_token() {
        let calls = Arc::new(AtomicU32::new(0));
        let source = MockSource::new(Arc::clone(&calls));
        let fail = Arc::clone(&source.fail);
        let manager = CredentialManager::new(source, margin());

        // Unexpired but inside the margin: the failing background refresh
        // must not disturb the current token.
        manager
            .install_token(IssuedToken {
                access_token: BearerToken::new("stale-but-alive"),
                expires_at: Utc::now() + chrono::Duration::seconds(120),
            })
            .await;
        fail.store(true, Ordering::SeqCst);

        let token = manager.get_valid_token().await.unwrap();
        assert_eq!(token.expose(), "stale-but-alive");
    }

    #[tokio::test]
    async fn test_expired_and_unrefreshable_is_unavailable() {
        let calls = Arc::new(AtomicU32::new(0));
        let source = MockSource::new(Arc::clone(&calls));
        let fail = Arc::clone(&source.fail);
        let manager = CredentialManager::new(source, margin());

        manager
            .install_token(IssuedToken {
                access_token: BearerToken::new("dead"),
                expires_at: Utc::now() - chrono::Duration::seconds(1),
            })
            .await;
        fail.store(true, Ordering::SeqCst);

        let err = manager.get_valid_token().await.unwrap_err();
        assert!(matches!(err, AuthError::Unavailable));
    }

    #[tokio::test]
    async fn test_expired_token_refreshes_on_request_path() {
        let calls = Arc::new(AtomicU32::new(0));
        let manager = CredentialManager::new(MockSource::new(Arc::clone(&calls)), margin());

        manager
            .install_token(IssuedToken {
                access_token: BearerToken::new("dead"),
                expires_at: Utc::now() - chrono::Duration::seconds(1),
            })
            .await;

        let token = manager.get_valid_token().await.unwrap();
        assert_eq!(token.expose(), "token-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_within_margin_arithmetic() {
        let token = IssuedToken {
            access_token: BearerToken::new("t"),
            expires_at: Utc::now() + chrono::Duration::seconds(100),
        };
        let now = Utc::now();
        assert!(token.within_margin(now, Duration::from_secs(300)));
        assert!(!token.within_margin(now, Duration::from_secs(10)));
        assert!(!token.is_expired(now));
    }
}
