//! Provider trait definition.
//!
//! This is the capability every external service adapter implements:
//! conversational reply, image generation, or web search. Uses RPITIT for
//! `send`; the object-safe wrapper for runtime chain assembly lives in
//! [`crate::boxed`].

use std::future::Future;

use govorun_types::error::ProviderError;
use govorun_types::provider::{ProviderKind, RawResult, RequestPayload};

/// Trait for external provider backends (GigaChat, Pollinations, Yandex, ...).
///
/// The orchestration core never depends on a specific provider's wire
/// format beyond this boundary. Implementations live in `govorun-infra`.
pub trait Provider: Send + Sync {
    /// Stable provider identifier (e.g., "gigachat", "yandex").
    fn id(&self) -> &str;

    /// Capability this provider implements.
    fn kind(&self) -> ProviderKind;

    /// Perform one request against the external service.
    ///
    /// Exactly one attempt; retries happen across requests through the
    /// fallback chain, never inside an adapter.
    fn send(
        &self,
        payload: &RequestPayload,
    ) -> impl Future<Output = Result<RawResult, ProviderError>> + Send;
}
