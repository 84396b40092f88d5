//! Orchestrator configuration.
//!
//! Deserialized from `govorun.toml` by the infra loader. Every field has a
//! default so a missing or partial file still yields a working engine.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::provider::{ProviderConfig, ProviderKind};

/// Top-level configuration for the orchestration engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Configured providers; fallback order within a kind is priority
    /// ascending, then declaration order.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,

    /// Consecutive failures after which a provider enters cool-down.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Cool-down window during which a failing provider is skipped.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Per-attempt timeout for conversational providers.
    #[serde(default = "default_chat_timeout_secs")]
    pub chat_timeout_secs: u64,

    /// Per-attempt timeout for search providers.
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,

    /// Per-attempt timeout for image providers (generation is slower).
    #[serde(default = "default_image_timeout_secs")]
    pub image_timeout_secs: u64,

    /// Remaining token lifetime below which a proactive refresh is kicked.
    #[serde(default = "default_refresh_margin_secs")]
    pub refresh_margin_secs: u64,

    /// Number of history turns handed to conversational providers; the
    /// stored history is capped at twice this many entries.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_cooldown_secs() -> u64 {
    60
}

fn default_chat_timeout_secs() -> u64 {
    10
}

fn default_search_timeout_secs() -> u64 {
    10
}

fn default_image_timeout_secs() -> u64 {
    30
}

fn default_refresh_margin_secs() -> u64 {
    300
}

fn default_history_window() -> usize {
    10
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            failure_threshold: default_failure_threshold(),
            cooldown_secs: default_cooldown_secs(),
            chat_timeout_secs: default_chat_timeout_secs(),
            search_timeout_secs: default_search_timeout_secs(),
            image_timeout_secs: default_image_timeout_secs(),
            refresh_margin_secs: default_refresh_margin_secs(),
            history_window: default_history_window(),
        }
    }
}

impl OrchestratorConfig {
    /// Default per-attempt timeout for the given provider kind.
    pub fn timeout_for(&self, kind: ProviderKind) -> Duration {
        let secs = match kind {
            ProviderKind::Conversational => self.chat_timeout_secs,
            ProviderKind::Search => self.search_timeout_secs,
            ProviderKind::Image => self.image_timeout_secs,
        };
        Duration::from_secs(secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn refresh_margin(&self) -> Duration {
        Duration::from_secs(self.refresh_margin_secs)
    }
}
