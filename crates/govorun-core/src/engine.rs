//! The top-level orchestration engine.
//!
//! One [`Orchestrator::handle`] call per incoming utterance: classify,
//! resolve the static chain for the intent kind, execute it with fallback,
//! compose the envelope, and append the turn pair to the caller-supplied
//! history. Concurrent calls are independent; the only shared mutable
//! state is the health tracker and the credential manager.

use std::collections::HashMap;
use std::sync::Arc;

use govorun_types::chat::{ChatTurn, Utterance};
use govorun_types::envelope::ResponseEnvelope;
use govorun_types::error::OrchestrationError;
use govorun_types::health::HealthSnapshot;
use govorun_types::intent::Intent;
use govorun_types::provider::RequestPayload;

use crate::auth::{CredentialManager, TokenSource};
use crate::chain::ChainExecutor;
use crate::compose::compose;
use crate::health::HealthTracker;
use crate::intent::ClassifierTable;
use crate::registry::ChainSet;

/// Composes the classifier, the fallback chains, the health tracker and
/// the credential manager into the single entry point the chat surface
/// calls per request.
pub struct Orchestrator<S> {
    classifier: ClassifierTable,
    chains: ChainSet,
    executor: ChainExecutor,
    tracker: Arc<HealthTracker>,
    credentials: CredentialManager<S>,
    history_window: usize,
}

impl<S: TokenSource + 'static> Orchestrator<S> {
    pub fn new(
        chains: ChainSet,
        tracker: Arc<HealthTracker>,
        credentials: CredentialManager<S>,
        history_window: usize,
    ) -> Self {
        Self {
            classifier: ClassifierTable::new(),
            chains,
            executor: ChainExecutor::new(Arc::clone(&tracker)),
            tracker,
            credentials,
            history_window,
        }
    }

    /// Handle one utterance end to end.
    ///
    /// On success the user turn and the rendered assistant turn are
    /// appended to `history`, which is then trimmed to twice the history
    /// window. Failures leave the history untouched and surface as
    /// [`OrchestrationError`] -- never a partial envelope.
    pub async fn handle(
        &self,
        utterance: &Utterance,
        history: &mut Vec<ChatTurn>,
    ) -> Result<ResponseEnvelope, OrchestrationError> {
        let intent = self.classifier.classify(utterance, history);
        tracing::debug!(intent = ?intent.kind(), "utterance classified");

        if matches!(intent, Intent::Conversational { empty_input: true }) {
            return Err(OrchestrationError::EmptyUtterance);
        }

        let payload = self.build_payload(&intent, utterance, history).await?;
        let chain = self.chains.chain(intent.kind());
        let outcome = self.executor.execute(&payload, chain).await?;
        let envelope = compose(&intent, &outcome);

        history.push(ChatTurn::user(utterance.text.clone()));
        history.push(ChatTurn::assistant(envelope.rendered_content()));
        let cap = self.history_window * 2;
        if history.len() > cap {
            history.drain(..history.len() - cap);
        }

        Ok(envelope)
    }

    /// Status view for health endpoints.
    pub fn health_snapshot(&self) -> HashMap<String, HealthSnapshot> {
        self.tracker.snapshot()
    }

    async fn build_payload(
        &self,
        intent: &Intent,
        utterance: &Utterance,
        history: &[ChatTurn],
    ) -> Result<RequestPayload, OrchestrationError> {
        match intent {
            Intent::Conversational { .. } => {
                // Credential is injected only on the conversational path.
                let token = self.credentials.get_valid_token().await?;
                let tail_start = history.len().saturating_sub(self.history_window);
                let mut messages: Vec<ChatTurn> = history[tail_start..].to_vec();
                messages.push(ChatTurn::user(utterance.text.clone()));
                Ok(RequestPayload::Chat {
                    messages,
                    access_token: Some(token),
                })
            }
            Intent::ImageGeneration { prompt } => Ok(RequestPayload::Image {
                prompt: prompt.clone(),
            }),
            Intent::SearchAugmented { query, category } => Ok(RequestPayload::Search {
                query: query.clone(),
                category: *category,
            }),
        }
    }
}
