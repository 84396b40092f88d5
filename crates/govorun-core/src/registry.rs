//! Provider registry and fallback chain resolution.
//!
//! Adapters register under their id; [`ProviderRegistry::into_chains`]
//! consumes the registry and produces the fixed per-kind chains the engine
//! dispatches on. Chain order is total: priority ascending, then
//! declaration order within equal priorities.

use std::collections::HashMap;
use std::time::Duration;

use govorun_types::config::OrchestratorConfig;
use govorun_types::provider::{ProviderConfig, ProviderKind};

use crate::boxed::BoxProvider;

/// One position in a fallback chain: the provider plus its effective
/// per-attempt timeout.
pub struct ChainLink {
    pub provider: BoxProvider,
    pub timeout: Duration,
}

/// The fixed, ordered fallback chains, one per provider kind.
#[derive(Default)]
pub struct ChainSet {
    conversational: Vec<ChainLink>,
    image: Vec<ChainLink>,
    search: Vec<ChainLink>,
}

impl ChainSet {
    pub fn push(&mut self, kind: ProviderKind, link: ChainLink) {
        match kind {
            ProviderKind::Conversational => self.conversational.push(link),
            ProviderKind::Image => self.image.push(link),
            ProviderKind::Search => self.search.push(link),
        }
    }

    /// The ordered chain for a kind. May be empty if nothing was
    /// configured; execution then reports exhaustion with zero attempts.
    pub fn chain(&self, kind: ProviderKind) -> &[ChainLink] {
        match kind {
            ProviderKind::Conversational => &self.conversational,
            ProviderKind::Image => &self.image,
            ProviderKind::Search => &self.search,
        }
    }

    /// Ids of every provider across all chains, in chain order.
    pub fn ids(&self) -> Vec<&str> {
        self.conversational
            .iter()
            .chain(&self.image)
            .chain(&self.search)
            .map(|link| link.provider.id())
            .collect()
    }
}

/// Registry of available provider adapters, indexed by id.
pub struct ProviderRegistry {
    providers: HashMap<String, BoxProvider>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register an adapter under the given id.
    ///
    /// If an adapter with this id already exists, it is replaced.
    pub fn register(&mut self, id: impl Into<String>, provider: BoxProvider) {
        self.providers.insert(id.into(), provider);
    }

    /// Look up an adapter by id.
    pub fn get(&self, id: &str) -> Option<&BoxProvider> {
        self.providers.get(id)
    }

    /// List all registered adapter ids.
    pub fn list_ids(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }

    /// Consume the registry and build the per-kind fallback chains.
    ///
    /// Disabled configs, configs without a registered adapter, and configs
    /// whose declared kind disagrees with the adapter are skipped with a
    /// warning. The effective timeout is the per-provider override or the
    /// kind default from `config`.
    pub fn into_chains(mut self, configs: &[ProviderConfig], config: &OrchestratorConfig) -> ChainSet {
        // Stable sort keeps declaration order within equal priorities.
        let mut ordered: Vec<&ProviderConfig> = configs.iter().filter(|c| c.enabled).collect();
        ordered.sort_by_key(|c| c.priority);

        let mut chains = ChainSet::default();
        for cfg in ordered {
            let Some(provider) = self.providers.remove(&cfg.id) else {
                tracing::warn!(provider = %cfg.id, "configured provider has no registered adapter, skipping");
                continue;
            };
            if provider.kind() != cfg.kind {
                tracing::warn!(
                    provider = %cfg.id,
                    configured = %cfg.kind,
                    actual = %provider.kind(),
                    "provider kind mismatch, skipping"
                );
                continue;
            }
            let timeout = cfg
                .endpoint
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.timeout_for(cfg.kind));
            chains.push(cfg.kind, ChainLink { provider, timeout });
        }
        chains
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
