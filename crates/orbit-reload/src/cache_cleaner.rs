// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Invalidation of the shared dependent caches an adapter references.
//!
//! Cleaning is table-driven: each row names the adapter field holding the
//! provider, the optional model field, the global defaults used when the
//! adapter leaves either unset, and the cache the row targets. Vector store
//! and datasource rows have no global default.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use orbit_config::{OrbitConfig, ProviderModelConfig};
use orbit_core::{AdapterConfig, DependencyKind};
use tracing::{debug, info};

use crate::cache::DependencyCaches;
use crate::recording;

/// Provider and model defaults taken from the global configuration sections.
///
/// A snapshot is kept by both the loader (to build clients) and the cleaner
/// (to find them again). The cleaner swaps its snapshot only after a bulk
/// reload finishes, so entries built under the previous defaults are still
/// found when the old definitions are invalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalDefaults {
    pub inference: Option<String>,
    pub embedding: Option<String>,
    pub reranker: Option<String>,
    pub vision: Option<String>,
    pub sound: Option<String>,
    pub stt: Option<String>,
    pub tts: Option<String>,
    /// Default model per embedding provider (`[embeddings.<provider>]`).
    pub embedding_models: BTreeMap<String, String>,
    /// Default model per reranker provider (`[rerankers.<provider>]`).
    pub reranker_models: BTreeMap<String, String>,
}

impl GlobalDefaults {
    pub fn from_config(config: &OrbitConfig) -> Self {
        Self {
            inference: config.general.inference_provider.clone(),
            embedding: config.embedding.provider.clone(),
            reranker: config.default_reranker_provider().map(str::to_string),
            vision: config.vision.provider.clone(),
            sound: config.sound.provider.clone(),
            stt: config.stt.provider.clone(),
            tts: config.tts.provider.clone(),
            embedding_models: default_models(&config.embeddings),
            reranker_models: default_models(&config.rerankers),
        }
    }
}

fn default_models(entries: &BTreeMap<String, ProviderModelConfig>) -> BTreeMap<String, String> {
    entries
        .iter()
        .filter_map(|(provider, entry)| Some((provider.clone(), entry.model.clone()?)))
        .collect()
}

type Field = fn(&AdapterConfig) -> Option<&str>;
type DefaultLookup = fn(&GlobalDefaults) -> Option<&str>;
type ModelLookup = for<'a> fn(&'a GlobalDefaults, &str) -> Option<&'a str>;

struct Row {
    label: &'static str,
    kind: DependencyKind,
    provider: Field,
    model: Option<Field>,
    default: DefaultLookup,
    default_model: Option<ModelLookup>,
}

fn no_default(_: &GlobalDefaults) -> Option<&str> {
    None
}

fn embedding_model<'a>(defaults: &'a GlobalDefaults, provider: &str) -> Option<&'a str> {
    defaults.embedding_models.get(provider).map(String::as_str)
}

fn reranker_model<'a>(defaults: &'a GlobalDefaults, provider: &str) -> Option<&'a str> {
    defaults.reranker_models.get(provider).map(String::as_str)
}

fn datasource(config: &AdapterConfig) -> Option<&str> {
    config
        .datasource
        .as_deref()
        .filter(|ds| !ds.is_empty() && *ds != "none")
}

const ROWS: &[Row] = &[
    Row {
        label: "provider",
        kind: DependencyKind::Provider,
        provider: |c| c.inference_provider.as_deref(),
        model: Some(|c| c.model.as_deref()),
        default: |d| d.inference.as_deref(),
        default_model: None,
    },
    Row {
        label: "embedding",
        kind: DependencyKind::Embedding,
        provider: |c| c.embedding_provider.as_deref(),
        model: None,
        default: |d| d.embedding.as_deref(),
        default_model: Some(embedding_model),
    },
    Row {
        label: "reranker",
        kind: DependencyKind::Reranker,
        provider: |c| c.reranker_provider.as_deref(),
        model: None,
        default: |d| d.reranker.as_deref(),
        default_model: Some(reranker_model),
    },
    Row {
        label: "vision",
        kind: DependencyKind::Vision,
        provider: |c| c.vision_provider.as_deref(),
        model: None,
        default: |d| d.vision.as_deref(),
        default_model: None,
    },
    Row {
        label: "audio",
        kind: DependencyKind::Audio,
        provider: |c| c.audio_provider.as_deref(),
        model: None,
        default: |d| d.sound.as_deref(),
        default_model: None,
    },
    Row {
        label: "stt",
        kind: DependencyKind::Audio,
        provider: |c| c.stt_provider.as_deref(),
        model: None,
        default: |d| d.stt.as_deref(),
        default_model: None,
    },
    Row {
        label: "tts",
        kind: DependencyKind::Audio,
        provider: |c| c.tts_provider.as_deref(),
        model: None,
        default: |d| d.tts.as_deref(),
        default_model: None,
    },
    Row {
        label: "store",
        kind: DependencyKind::Store,
        provider: |c| c.option_str("store_name"),
        model: None,
        default: no_default,
        default_model: None,
    },
    Row {
        label: "store",
        kind: DependencyKind::Store,
        provider: |c| c.option_str("vector_store"),
        model: None,
        default: no_default,
        default_model: None,
    },
    Row {
        label: "datasource",
        kind: DependencyKind::Datasource,
        provider: datasource,
        model: Some(AdapterConfig::database),
        default: no_default,
        default_model: None,
    },
];

/// One dependent resource an adapter resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDependency<'a> {
    /// Descriptor label (`provider`, `embedding`, ..., `store`, `datasource`).
    pub label: &'static str,
    pub kind: DependencyKind,
    /// Provider name, or the store / datasource name for those kinds.
    pub provider: &'a str,
    /// Model, or the database override for datasources.
    pub model: Option<&'a str>,
}

/// Resolve every dependent resource `config` references, falling back to the
/// global defaults for providers and models the adapter leaves unset.
pub fn resolve_dependencies<'a>(
    config: &'a AdapterConfig,
    defaults: &'a GlobalDefaults,
) -> Vec<ResolvedDependency<'a>> {
    ROWS.iter()
        .filter_map(|row| {
            let provider = (row.provider)(config).or_else(|| (row.default)(defaults))?;
            let model = row
                .model
                .and_then(|field| field(config))
                .or_else(|| row.default_model.and_then(|lookup| lookup(defaults, provider)));
            Some(ResolvedDependency {
                label: row.label,
                kind: row.kind,
                provider,
                model,
            })
        })
        .collect()
}

/// Evicts dependent cache entries derived from one adapter's configuration.
///
/// Best effort: a missing entry is not an error, and an entry shared with
/// another adapter may be evicted (the next rebuild repopulates it).
pub struct DependencyCacheCleaner {
    caches: DependencyCaches,
    defaults: ArcSwap<GlobalDefaults>,
}

impl DependencyCacheCleaner {
    pub fn new(caches: DependencyCaches) -> Self {
        Self {
            caches,
            defaults: ArcSwap::from_pointee(GlobalDefaults::default()),
        }
    }

    /// Seed the global provider defaults from `config`.
    pub fn with_defaults(self, config: &OrbitConfig) -> Self {
        self.update_defaults(config);
        self
    }

    /// Replace the global provider defaults after a configuration reload.
    pub fn update_defaults(&self, config: &OrbitConfig) {
        self.defaults.store(Arc::new(GlobalDefaults::from_config(config)));
    }

    pub fn defaults(&self) -> Arc<GlobalDefaults> {
        self.defaults.load_full()
    }

    pub fn caches(&self) -> &DependencyCaches {
        &self.caches
    }

    /// Remove every dependent cache entry `config` resolves to.
    ///
    /// Returns `"<label>:<key>"` descriptors for what was removed.
    pub async fn clear_adapter_dependencies(
        &self,
        name: &str,
        config: Option<&AdapterConfig>,
    ) -> Vec<String> {
        let Some(config) = config else {
            debug!(adapter = name, "no configuration to clear dependencies for");
            return Vec::new();
        };

        let defaults = self.defaults.load_full();
        let mut cleared = Vec::new();
        let mut per_kind: BTreeMap<&'static str, usize> = BTreeMap::new();

        for dep in resolve_dependencies(config, &defaults) {
            let Some(cache) = self.caches.get(dep.kind) else {
                continue;
            };
            let key = cache.build_cache_key(dep.provider, dep.model);

            if cache.contains(&key) {
                if cache.remove(&key).await {
                    recording::record_invalidation(dep.kind);
                    *per_kind.entry(dep.label).or_default() += 1;
                    cleared.push(format!("{}:{key}", dep.label));
                }
            } else if dep.kind == DependencyKind::Provider {
                for removed in cache.remove_by_prefix(dep.provider).await {
                    debug!(adapter = name, key = %removed, "cleared provider cache entry by prefix");
                    recording::record_invalidation(dep.kind);
                    *per_kind.entry(dep.label).or_default() += 1;
                    cleared.push(format!("{}:{removed}", dep.label));
                }
            }
        }

        if !cleared.is_empty() {
            info!(adapter = name, cleared = ?cleared, "cleared dependent caches");
            let summary = per_kind
                .iter()
                .map(|(label, count)| format!("{label}={count}"))
                .collect::<Vec<_>>()
                .join(", ");
            debug!(adapter = name, summary = %summary, "dependent cache invalidations by kind");
        }

        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ClientCache;
    use orbit_core::DependencyCache;

    struct Fixture {
        provider: Arc<ClientCache<String>>,
        embedding: Arc<ClientCache<String>>,
        audio: Arc<ClientCache<String>>,
        store: Arc<ClientCache<String>>,
        datasource: Arc<ClientCache<String>>,
        cleaner: DependencyCacheCleaner,
    }

    fn fixture() -> Fixture {
        let provider: Arc<ClientCache<String>> =
            Arc::new(ClientCache::new(DependencyKind::Provider));
        let embedding: Arc<ClientCache<String>> =
            Arc::new(ClientCache::new(DependencyKind::Embedding));
        let audio: Arc<ClientCache<String>> = Arc::new(ClientCache::new(DependencyKind::Audio));
        let store: Arc<ClientCache<String>> = Arc::new(ClientCache::new(DependencyKind::Store));
        let datasource: Arc<ClientCache<String>> =
            Arc::new(ClientCache::new(DependencyKind::Datasource));
        let caches = DependencyCaches::new()
            .with(DependencyKind::Provider, provider.clone())
            .with(DependencyKind::Embedding, embedding.clone())
            .with(DependencyKind::Audio, audio.clone())
            .with(DependencyKind::Store, store.clone())
            .with(DependencyKind::Datasource, datasource.clone());
        Fixture {
            provider,
            embedding,
            audio,
            store,
            datasource,
            cleaner: DependencyCacheCleaner::new(caches),
        }
    }

    fn embedding_model_config(provider: &str, model: &str) -> OrbitConfig {
        let mut config = OrbitConfig::default();
        config.embeddings.insert(
            provider.to_string(),
            ProviderModelConfig {
                model: Some(model.to_string()),
            },
        );
        config
    }

    fn client(key: &str) -> Arc<String> {
        Arc::new(key.to_string())
    }

    #[tokio::test]
    async fn clears_exact_provider_key() {
        let f = fixture();
        f.provider.put("ollama:llama3", client("a"));
        f.provider.put("ollama:mistral", client("b"));

        let cfg = AdapterConfig::named("qa-sql").with_inference("ollama", Some("llama3"));
        let cleared = f.cleaner.clear_adapter_dependencies("qa-sql", Some(&cfg)).await;

        assert_eq!(cleared, vec!["provider:ollama:llama3"]);
        assert_eq!(f.provider.keys(), vec!["ollama:mistral"]);
    }

    #[tokio::test]
    async fn provider_falls_back_to_prefix_removal() {
        let f = fixture();
        f.provider.put("ollama:llama3", client("a"));
        f.provider.put("ollama:mistral", client("b"));
        f.provider.put("openai:gpt-4o", client("c"));

        let cfg = AdapterConfig::named("qa-sql").with_inference("ollama", None);
        let cleared = f.cleaner.clear_adapter_dependencies("qa-sql", Some(&cfg)).await;

        assert_eq!(
            cleared,
            vec!["provider:ollama:llama3", "provider:ollama:mistral"]
        );
        assert_eq!(f.provider.keys(), vec!["openai:gpt-4o"]);
    }

    #[tokio::test]
    async fn non_provider_rows_do_not_use_prefix_removal() {
        let f = fixture();
        f.embedding.put("openai:large", client("e"));

        let cfg = AdapterConfig::named("qa-sql").with_embedding("openai");
        let cleared = f.cleaner.clear_adapter_dependencies("qa-sql", Some(&cfg)).await;

        assert!(cleared.is_empty());
        assert!(f.embedding.contains("openai:large"));
    }

    #[tokio::test]
    async fn falls_back_to_global_defaults() {
        let f = fixture();
        f.provider.put("ollama", client("p"));
        f.embedding.put("openai:text-embedding-3-small", client("e"));

        let mut config = embedding_model_config("openai", "text-embedding-3-small");
        config.general.inference_provider = Some("ollama".into());
        config.embedding.provider = Some("openai".into());
        f.cleaner.update_defaults(&config);

        let cfg = AdapterConfig::named("bare");
        let cleared = f.cleaner.clear_adapter_dependencies("bare", Some(&cfg)).await;

        assert_eq!(
            cleared,
            vec!["provider:ollama", "embedding:openai:text-embedding-3-small"]
        );
        assert!(f.provider.is_empty());
        assert!(f.embedding.is_empty());
    }

    #[tokio::test]
    async fn speech_rows_target_audio_cache() {
        let f = fixture();
        f.audio.put("whisper", client("stt"));
        f.audio.put("elevenlabs", client("tts"));

        let mut cfg = AdapterConfig::named("voice");
        cfg.stt_provider = Some("whisper".into());
        cfg.tts_provider = Some("elevenlabs".into());
        let cleared = f.cleaner.clear_adapter_dependencies("voice", Some(&cfg)).await;

        assert_eq!(cleared, vec!["stt:whisper", "tts:elevenlabs"]);
        assert!(f.audio.is_empty());
    }

    #[tokio::test]
    async fn old_default_model_is_cleared_until_defaults_are_swapped() {
        let f = fixture();
        f.cleaner.update_defaults(&embedding_model_config("openai", "small"));
        f.embedding.put("openai:small", client("old"));
        f.embedding.put("openai:large", client("new"));

        let cfg = AdapterConfig::named("qa").with_embedding("openai");
        let cleared = f.cleaner.clear_adapter_dependencies("qa", Some(&cfg)).await;
        assert_eq!(cleared, vec!["embedding:openai:small"]);

        f.cleaner.update_defaults(&embedding_model_config("openai", "large"));
        let cleared = f.cleaner.clear_adapter_dependencies("qa", Some(&cfg)).await;
        assert_eq!(cleared, vec!["embedding:openai:large"]);
        assert!(f.embedding.is_empty());
    }

    #[tokio::test]
    async fn store_rows_clear_named_and_vector_stores() {
        let f = fixture();
        f.store.put("faq-intents", client("s1"));
        f.store.put("docs-chroma", client("s2"));
        f.store.put("other", client("s3"));

        let cfg = AdapterConfig::named("intent")
            .with_option("store_name", serde_json::json!("faq-intents"))
            .with_option("vector_store", serde_json::json!("docs-chroma"));
        let cleared = f.cleaner.clear_adapter_dependencies("intent", Some(&cfg)).await;

        assert_eq!(cleared, vec!["store:faq-intents", "store:docs-chroma"]);
        assert_eq!(f.store.keys(), vec!["other"]);
    }

    #[tokio::test]
    async fn datasource_key_includes_database_override() {
        let f = fixture();
        f.datasource.put("sqlite:orders.db", client("d1"));
        f.datasource.put("sqlite", client("d2"));
        f.datasource.put("postgres", client("d3"));

        let mut cfg = AdapterConfig::named("qa-sql").with_datasource("sqlite");
        cfg.extra
            .insert("database".into(), serde_json::json!("orders.db"));
        let cleared = f.cleaner.clear_adapter_dependencies("qa-sql", Some(&cfg)).await;
        assert_eq!(cleared, vec!["datasource:sqlite:orders.db"]);

        let plain = AdapterConfig::named("qa-pg").with_datasource("postgres");
        let cleared = f.cleaner.clear_adapter_dependencies("qa-pg", Some(&plain)).await;
        assert_eq!(cleared, vec!["datasource:postgres"]);
        assert_eq!(f.datasource.keys(), vec!["sqlite"]);
    }

    #[tokio::test]
    async fn none_datasource_is_ignored() {
        let f = fixture();
        f.datasource.put("none", client("d"));

        let cfg = AdapterConfig::named("chat").with_datasource("none");
        assert!(
            f.cleaner
                .clear_adapter_dependencies("chat", Some(&cfg))
                .await
                .is_empty()
        );
        assert_eq!(f.datasource.len(), 1);
    }

    #[tokio::test]
    async fn unwired_kinds_and_missing_config_are_noops() {
        let f = fixture();
        let cfg = AdapterConfig::named("docs").with_vision("gemini");
        assert!(
            f.cleaner
                .clear_adapter_dependencies("docs", Some(&cfg))
                .await
                .is_empty()
        );
        assert!(f.cleaner.clear_adapter_dependencies("docs", None).await.is_empty());
    }

    #[test]
    fn resolve_uses_adapter_fields_before_defaults() {
        let defaults = GlobalDefaults {
            inference: Some("openai".into()),
            vision: Some("gemini".into()),
            ..GlobalDefaults::default()
        };
        let cfg = AdapterConfig::named("qa").with_inference("ollama", Some("llama3"));
        let deps = resolve_dependencies(&cfg, &defaults);

        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].provider, "ollama");
        assert_eq!(deps[0].model, Some("llama3"));
        assert_eq!(deps[1].label, "vision");
        assert_eq!(deps[1].provider, "gemini");
    }

    #[test]
    fn default_models_resolve_for_embedding_and_reranker() {
        let mut config = embedding_model_config("openai", "text-embedding-3-small");
        config.rerankers.insert(
            "cohere".into(),
            ProviderModelConfig {
                model: Some("rerank-v3".into()),
            },
        );
        config.rerankers.insert("jina".into(), ProviderModelConfig::default());
        let defaults = GlobalDefaults::from_config(&config);
        assert_eq!(defaults.reranker_models.len(), 1);

        let cfg = AdapterConfig::named("qa")
            .with_inference("ollama", None)
            .with_embedding("openai")
            .with_reranker("cohere");
        let models: Vec<Option<&str>> = resolve_dependencies(&cfg, &defaults)
            .iter()
            .map(|d| d.model)
            .collect();
        assert_eq!(
            models,
            vec![None, Some("text-embedding-3-small"), Some("rerank-v3")]
        );
    }

    #[test]
    fn reranker_override_wins() {
        let mut config = OrbitConfig::default();
        config.reranker.provider = Some("cohere".into());
        config.reranker.provider_override = Some("jina".into());
        assert_eq!(
            GlobalDefaults::from_config(&config).reranker.as_deref(),
            Some("jina")
        );
    }
}
