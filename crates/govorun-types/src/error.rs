//! Error taxonomy for provider orchestration.
//!
//! Per-provider failures ([`ProviderError`]) are recovered locally by the
//! fallback chain executor and never reach the caller directly. Only
//! [`ChainExhausted`] and [`AuthError::Unavailable`] (plus input
//! validation) surface through [`OrchestrationError`].

use thiserror::Error;

use crate::health::ErrorKind;
use crate::provider::ProviderKind;

/// Failure of a single provider attempt.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider timed out after {waited_ms}ms")]
    Timeout { waited_ms: u64 },

    #[error("provider rejected request: HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("malformed provider payload: {0}")]
    Malformed(String),

    #[error("authentication failed")]
    Auth,

    #[error("transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    /// Coarse classification recorded into the health tracker.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::Timeout { .. } => ErrorKind::Timeout,
            ProviderError::Rejected { .. } | ProviderError::Invalid(_) => ErrorKind::Rejected,
            ProviderError::Malformed(_) => ErrorKind::Malformed,
            ProviderError::Auth => ErrorKind::Auth,
            ProviderError::Transport(_) => ErrorKind::Transport,
        }
    }
}

/// Failure of the credential lifecycle.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("token exchange failed: HTTP {status}: {message}")]
    Exchange { status: u16, message: String },

    #[error("token endpoint unreachable: {0}")]
    Transport(String),

    #[error("credential unavailable: token expired and refresh failed")]
    Unavailable,
}

/// Every provider in the chain was skipped or failed.
#[derive(Debug, Clone, Error)]
#[error("all {kind} providers exhausted ({} attempted or skipped)", .attempted.len())]
pub struct ChainExhausted {
    pub kind: ProviderKind,
    /// Providers attempted or skipped, in chain order.
    pub attempted: Vec<String>,
    pub last_error_kind: Option<ErrorKind>,
}

/// Error surfaced to the caller of the orchestration engine.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error(transparent)]
    ChainExhausted(#[from] ChainExhausted),

    #[error(transparent)]
    AuthUnavailable(#[from] AuthError),

    #[error("utterance is empty")]
    EmptyUtterance,
}

impl OrchestrationError {
    /// User-visible fallback text; the web layer must never crash or show
    /// a half-composed response.
    pub fn user_message(&self) -> &'static str {
        match self {
            OrchestrationError::EmptyUtterance => "Сообщение не может быть пустым",
            _ => "Произошла ошибка при генерации ответа. Попробуйте еще раз.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_kind_mapping() {
        assert_eq!(
            ProviderError::Timeout { waited_ms: 10_000 }.kind(),
            ErrorKind::Timeout
        );
        assert_eq!(
            ProviderError::Rejected {
                status: 503,
                message: "busy".into()
            }
            .kind(),
            ErrorKind::Rejected
        );
        assert_eq!(
            ProviderError::Invalid("too short".into()).kind(),
            ErrorKind::Rejected
        );
        assert_eq!(
            ProviderError::Malformed("no choices".into()).kind(),
            ErrorKind::Malformed
        );
        assert_eq!(ProviderError::Auth.kind(), ErrorKind::Auth);
        assert_eq!(
            ProviderError::Transport("refused".into()).kind(),
            ErrorKind::Transport
        );
    }

    #[test]
    fn test_chain_exhausted_display() {
        let err = ChainExhausted {
            kind: ProviderKind::Search,
            attempted: vec!["perplexity".into(), "yandex".into()],
            last_error_kind: Some(ErrorKind::Timeout),
        };
        let msg = err.to_string();
        assert!(msg.contains("search"));
        assert!(msg.contains('2'));
    }

    #[test]
    fn test_user_message_never_empty() {
        let exhausted = OrchestrationError::from(ChainExhausted {
            kind: ProviderKind::Image,
            attempted: vec![],
            last_error_kind: None,
        });
        assert!(!exhausted.user_message().is_empty());
        assert_eq!(
            OrchestrationError::EmptyUtterance.user_message(),
            "Сообщение не может быть пустым"
        );
    }
}
