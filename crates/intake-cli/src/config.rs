//! Application configuration.
//!
//! Reads `config/default.toml` (or the path given on the command line) and
//! applies `INTAKE_*` environment overrides.  Every section is optional and
//! falls back to built-in defaults.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use intake_embed::EmbeddingClientConfig;
use intake_embed::client::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use intake_intent::{Action, Catalog};
use intake_web::WebConfig;

/// Overrides `[embedding].base_url`.
pub const ENV_EMBEDDING_URL: &str = "INTAKE_EMBEDDING_URL";
/// Overrides `[embedding].model`.
pub const ENV_EMBEDDING_MODEL: &str = "INTAKE_EMBEDDING_MODEL";
/// Overrides `[embedding].api_key`.
pub const ENV_EMBEDDING_API_KEY: &str = "INTAKE_EMBEDDING_API_KEY";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// The whole configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerSection,
    pub embedding: EmbeddingSection,
    pub catalog: CatalogSection,
}

/// `[server]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        let web = WebConfig::default();
        Self {
            bind: web.bind_addr,
            port: web.port,
        }
    }
}

/// `[embedding]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbeddingSection {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EmbeddingSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[catalog]`
///
/// Either table may be omitted, in which case the built-in one is used.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogSection {
    /// Process labels in match order.
    pub processes: Option<Vec<String>>,
    /// Trigger phrases keyed by action name.
    pub actions: Option<BTreeMap<String, Vec<String>>>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load the file at `path`, or the defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load the file at `path` and apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `INTAKE_*` overrides looked up through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_EMBEDDING_URL) {
            self.embedding.base_url = url;
        }
        if let Some(model) = get(ENV_EMBEDDING_MODEL) {
            self.embedding.model = model;
        }
        if let Some(key) = get(ENV_EMBEDDING_API_KEY) {
            self.embedding.api_key = Some(key);
        }
    }

    // -- Conversions ---------------------------------------------------------

    /// Build the catalog described by `[catalog]`.
    ///
    /// Configured actions are ordered by the canonical taxonomy order
    /// (Create, Update, Delete, Retrieve, Query), which is also the order in
    /// which the exact-match pass prefers them.
    pub fn catalog(&self) -> Result<Catalog> {
        let section = &self.catalog;
        if section.processes.is_none() && section.actions.is_none() {
            return Ok(Catalog::standard());
        }

        let standard = Catalog::standard();

        let taxonomy = match &section.actions {
            Some(table) => {
                let mut by_action = BTreeMap::new();
                for (name, phrases) in table {
                    let action: Action = name
                        .parse()
                        .with_context(|| format!("invalid [catalog.actions] key `{name}`"))?;
                    by_action.insert(action.as_str(), (action, phrases.clone()));
                }
                Action::ALL
                    .iter()
                    .filter_map(|a| by_action.remove(a.as_str()))
                    .collect()
            }
            None => standard
                .categories()
                .map(|(action, phrases)| (action, phrases.to_vec()))
                .collect(),
        };

        let processes = match &section.processes {
            Some(labels) => labels.clone(),
            None => standard.processes().to_vec(),
        };

        Catalog::new(taxonomy, processes).context("invalid [catalog] section")
    }

    /// Settings for the embedding client.
    pub fn embedding_client_config(&self) -> EmbeddingClientConfig {
        let section = &self.embedding;
        let mut config =
            EmbeddingClientConfig::openai_compatible(&section.model, &section.base_url)
                .with_timeout(Duration::from_secs(section.timeout_secs));
        if let Some(key) = &section.api_key {
            config = config.with_api_key(key);
        }
        config
    }

    /// Settings for the web server.
    pub fn web_config(&self) -> WebConfig {
        WebConfig {
            bind_addr: self.server.bind.clone(),
            port: self.server.port,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
