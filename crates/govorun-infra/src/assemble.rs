//! Assembly: configuration -> registry -> ready orchestrator.
//!
//! Adapters needing an API key are registered only when their key
//! resolves; a keyless deployment still gets the free sources
//! (Pollinations, Picsum, DuckDuckGo, Wikipedia, wttr.in), mirroring the
//! always-available baseline of the chat service.

use std::sync::Arc;

use secrecy::SecretString;

use govorun_core::auth::CredentialManager;
use govorun_core::boxed::BoxProvider;
use govorun_core::engine::Orchestrator;
use govorun_core::health::HealthTracker;
use govorun_core::registry::ProviderRegistry;
use govorun_types::config::OrchestratorConfig;
use govorun_types::provider::{EndpointConfig, ProviderConfig, ProviderKind};

use crate::auth::GigaChatTokenSource;
use crate::chat::GigaChatProvider;
use crate::config::resolve_api_key;
use crate::image::{PicsumProvider, PollinationsProvider};
use crate::search::{
    DuckDuckGoProvider, PerplexityProvider, WikipediaProvider, WttrProvider, YandexSearchProvider,
};

/// The canonical provider set: GigaChat for conversation, Pollinations
/// with a Picsum fallback for images, and the search chain ordered
/// paid-first (Perplexity, Yandex) then free (wttr, DuckDuckGo, Wikipedia).
pub fn default_provider_set() -> Vec<ProviderConfig> {
    fn provider(
        id: &str,
        kind: ProviderKind,
        priority: u32,
        api_key_env: Option<&str>,
    ) -> ProviderConfig {
        ProviderConfig {
            id: id.to_string(),
            kind,
            priority,
            endpoint: EndpointConfig {
                base_url: None,
                api_key_env: api_key_env.map(str::to_string),
                timeout_secs: None,
            },
            enabled: true,
        }
    }

    vec![
        provider(
            "gigachat",
            ProviderKind::Conversational,
            0,
            Some("GIGACHAT_API_KEY"),
        ),
        provider("pollinations", ProviderKind::Image, 0, None),
        provider("picsum", ProviderKind::Image, 1, None),
        provider(
            "perplexity",
            ProviderKind::Search,
            0,
            Some("PERPLEXITY_API_KEY"),
        ),
        provider(
            "yandex",
            ProviderKind::Search,
            1,
            Some("YANDEX_SEARCH_API_KEY"),
        ),
        provider("wttr", ProviderKind::Search, 2, None),
        provider("duckduckgo", ProviderKind::Search, 3, None),
        provider("wikipedia", ProviderKind::Search, 4, None),
    ]
}

/// Build a ready orchestrator from configuration.
pub fn build_orchestrator(config: &OrchestratorConfig) -> Orchestrator<GigaChatTokenSource> {
    let mut registry = ProviderRegistry::new();
    let mut gigachat_key: Option<SecretString> = None;

    for cfg in config.providers.iter().filter(|c| c.enabled) {
        let base_url = cfg.endpoint.base_url.clone();
        match cfg.id.as_str() {
            "gigachat" => {
                gigachat_key = resolve_api_key(&cfg.endpoint);
                if gigachat_key.is_none() {
                    tracing::error!(
                        env = cfg.endpoint.api_key_env.as_deref().unwrap_or("<unset>"),
                        "GigaChat authorization key not found; conversational requests will fail"
                    );
                }
                let mut provider = GigaChatProvider::new();
                if let Some(base) = base_url {
                    provider = provider.with_base_url(base);
                }
                registry.register(&cfg.id, BoxProvider::new(provider));
            }
            "pollinations" => {
                let mut provider = PollinationsProvider::new();
                if let Some(base) = base_url {
                    provider = provider.with_base_url(base);
                }
                registry.register(&cfg.id, BoxProvider::new(provider));
            }
            "picsum" => {
                let mut provider = PicsumProvider::new();
                if let Some(base) = base_url {
                    provider = provider.with_base_url(base);
                }
                registry.register(&cfg.id, BoxProvider::new(provider));
            }
            "perplexity" => match resolve_api_key(&cfg.endpoint) {
                Some(key) => {
                    let mut provider = PerplexityProvider::new(key);
                    if let Some(base) = base_url {
                        provider = provider.with_base_url(base);
                    }
                    registry.register(&cfg.id, BoxProvider::new(provider));
                }
                None => {
                    tracing::warn!(provider = %cfg.id, "api key not set, provider skipped");
                }
            },
            "yandex" => match resolve_api_key(&cfg.endpoint) {
                Some(key) => {
                    let mut provider = YandexSearchProvider::new(key);
                    if let Some(base) = base_url {
                        provider = provider.with_base_url(base);
                    }
                    registry.register(&cfg.id, BoxProvider::new(provider));
                }
                None => {
                    tracing::warn!(provider = %cfg.id, "api key not set, provider skipped");
                }
            },
            "wttr" => {
                let mut provider = WttrProvider::new();
                if let Some(base) = base_url {
                    provider = provider.with_base_url(base);
                }
                registry.register(&cfg.id, BoxProvider::new(provider));
            }
            "duckduckgo" => {
                let mut provider = DuckDuckGoProvider::new();
                if let Some(base) = base_url {
                    provider = provider.with_base_url(base);
                }
                registry.register(&cfg.id, BoxProvider::new(provider));
            }
            "wikipedia" => {
                let mut provider = WikipediaProvider::new();
                if let Some(base) = base_url {
                    provider = provider.with_base_url(base);
                }
                registry.register(&cfg.id, BoxProvider::new(provider));
            }
            other => {
                tracing::warn!(provider = %other, "unknown provider id, skipping");
            }
        }
    }

    let registered = registry.list_ids().len();
    tracing::info!(providers = registered, "provider adapters registered");

    let tracker = Arc::new(HealthTracker::new(
        config.failure_threshold,
        config.cooldown(),
    ));
    let chains = registry.into_chains(&config.providers, config);
    for id in chains.ids() {
        tracker.register(id);
    }

    let source = GigaChatTokenSource::new(
        gigachat_key.unwrap_or_else(|| SecretString::from(String::new())),
    );
    let credentials = CredentialManager::new(source, config.refresh_margin());

    Orchestrator::new(chains, tracker, credentials, config.history_window)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(providers: Vec<ProviderConfig>) -> OrchestratorConfig {
        OrchestratorConfig {
            providers,
            ..OrchestratorConfig::default()
        }
    }

    #[test]
    fn test_default_set_covers_all_kinds() {
        let set = default_provider_set();
        assert!(set.iter().any(|p| p.kind == ProviderKind::Conversational));
        assert!(set.iter().any(|p| p.kind == ProviderKind::Image));
        assert!(set.iter().filter(|p| p.kind == ProviderKind::Search).count() >= 3);
    }

    #[test]
    fn test_keyless_build_registers_free_providers() {
        // Point the keyed providers at env vars that are never set, so
        // the build is deterministic regardless of the host environment.
        let mut providers = default_provider_set();
        for provider in &mut providers {
            if let Some(env) = &mut provider.endpoint.api_key_env {
                *env = format!("GOVORUN_TEST_UNSET_{}", env);
            }
        }

        let engine = build_orchestrator(&config_with(providers));
        let snapshot = engine.health_snapshot();

        // Keyed search providers were skipped, free ones registered.
        assert!(!snapshot.contains_key("perplexity"));
        assert!(!snapshot.contains_key("yandex"));
        for id in ["gigachat", "pollinations", "picsum", "wttr", "duckduckgo", "wikipedia"] {
            assert!(snapshot.contains_key(id), "missing health record for {id}");
        }
    }

    #[test]
    fn test_keyed_provider_registered_when_env_present() {
        // SAFETY: test-local variable name, removed before the test ends.
        unsafe { std::env::set_var("GOVORUN_TEST_PPLX_KEY", "test-key-not-real") };

        let mut providers = default_provider_set();
        for provider in &mut providers {
            provider.endpoint.api_key_env = match provider.id.as_str() {
                "perplexity" => Some("GOVORUN_TEST_PPLX_KEY".into()),
                _ => provider
                    .endpoint
                    .api_key_env
                    .as_ref()
                    .map(|env| format!("GOVORUN_TEST_UNSET_{env}")),
            };
        }

        let engine = build_orchestrator(&config_with(providers));
        assert!(engine.health_snapshot().contains_key("perplexity"));

        // SAFETY: the variable was just set above.
        unsafe { std::env::remove_var("GOVORUN_TEST_PPLX_KEY") };
    }

    #[test]
    fn test_unknown_provider_id_is_skipped() {
        let providers = vec![ProviderConfig {
            id: "midjourney".into(),
            kind: ProviderKind::Image,
            priority: 0,
            endpoint: EndpointConfig::default(),
            enabled: true,
        }];
        let engine = build_orchestrator(&config_with(providers));
        assert!(engine.health_snapshot().is_empty());
    }
}
