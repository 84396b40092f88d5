//! Fallback chain execution.
//!
//! Providers are attempted strictly in chain order, one attempt each, with
//! a per-attempt timeout. First success short-circuits the rest, so exactly
//! one provider's output reaches the caller per request. Providers sitting
//! in their failure cool-down are skipped without a network attempt.

use std::sync::Arc;
use std::time::Instant;

use govorun_types::error::{ChainExhausted, ProviderError};
use govorun_types::health::ErrorKind;
use govorun_types::provider::{RawResult, RequestPayload};

use crate::health::HealthTracker;
use crate::registry::ChainLink;

/// Output of a successful chain execution.
#[derive(Debug)]
pub struct ProviderOutcome {
    /// Id of the provider that produced the result.
    pub provider_id: String,
    pub result: RawResult,
}

/// Drives one fallback chain per request.
pub struct ChainExecutor {
    tracker: Arc<HealthTracker>,
}

impl ChainExecutor {
    pub fn new(tracker: Arc<HealthTracker>) -> Self {
        Self { tracker }
    }

    /// Attempt each provider in chain order until one succeeds.
    ///
    /// Failures (timeout, rejection, malformed payload, auth) are recorded
    /// into the health tracker and recovered locally by moving to the next
    /// provider; they never propagate. If every provider is skipped or
    /// fails, returns [`ChainExhausted`] listing everything tried.
    pub async fn execute(
        &self,
        payload: &RequestPayload,
        chain: &[ChainLink],
    ) -> Result<ProviderOutcome, ChainExhausted> {
        let mut attempted: Vec<String> = Vec::new();
        let mut last_error_kind: Option<ErrorKind> = None;

        for link in chain {
            let provider_id = link.provider.id().to_string();

            if self.tracker.should_skip(&provider_id) {
                tracing::debug!(provider = %provider_id, "provider in cool-down, skipping");
                self.tracker.report_skip(&provider_id);
                attempted.push(provider_id);
                continue;
            }

            let start = Instant::now();
            match tokio::time::timeout(link.timeout, link.provider.send(payload)).await {
                Ok(Ok(result)) => {
                    self.tracker.report_success(&provider_id);
                    tracing::debug!(
                        provider = %provider_id,
                        latency_ms = start.elapsed().as_millis() as u64,
                        "provider succeeded"
                    );
                    return Ok(ProviderOutcome {
                        provider_id,
                        result,
                    });
                }
                Ok(Err(err)) => {
                    let kind = err.kind();
                    tracing::warn!(
                        provider = %provider_id,
                        error = %err,
                        "provider failed, trying next in chain"
                    );
                    self.tracker.report_failure(&provider_id, kind);
                    last_error_kind = Some(kind);
                    attempted.push(provider_id);
                }
                Err(_) => {
                    let err = ProviderError::Timeout {
                        waited_ms: link.timeout.as_millis() as u64,
                    };
                    tracing::warn!(
                        provider = %provider_id,
                        error = %err,
                        "provider timed out, trying next in chain"
                    );
                    self.tracker.report_failure(&provider_id, ErrorKind::Timeout);
                    last_error_kind = Some(ErrorKind::Timeout);
                    attempted.push(provider_id);
                }
            }
        }

        Err(ChainExhausted {
            kind: payload.kind(),
            attempted,
            last_error_kind,
        })
    }
}
