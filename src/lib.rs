//! Policy Corpus
//!
//! A graph of government policy entities with:
//! - Neo4j storage for typed nodes, typed edges and hierarchical tags
//! - Breadth-first path finding and subgraph extraction
//! - LLM-assisted edge suggestions from tag overlap
//! - A REST API over all of the above

pub mod api;
pub mod corpus;
pub mod neo4j;
pub mod suggest;
pub mod traversal;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use suggest::{EdgeSuggestionService, HttpRelevanceScorer, RelevanceScorer, SuggestionConfig};
use traversal::{TraversalBackend, TraversalEngine};

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub neo4j: Neo4jYamlConfig,
    pub traversal: TraversalYamlConfig,
    pub suggestions: SuggestionsYamlConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub port: u16,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "corpus123".into(),
        }
    }
}

/// Traversal configuration section
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TraversalYamlConfig {
    pub backend: TraversalBackend,
}

/// Suggestion pipeline configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SuggestionsYamlConfig {
    /// Chat-completions endpoint; empty or "disabled" turns suggestions off
    pub llm_url: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub max_candidates: usize,
    pub max_scored: usize,
    pub timeout_secs: u64,
    pub min_confidence: f64,
}

impl Default for SuggestionsYamlConfig {
    fn default() -> Self {
        let defaults = SuggestionConfig::default();
        Self {
            llm_url: suggest::llm::DEFAULT_LLM_URL.into(),
            llm_model: suggest::llm::DEFAULT_LLM_MODEL.into(),
            llm_api_key: None,
            max_candidates: defaults.max_candidates,
            max_scored: defaults.max_scored,
            timeout_secs: defaults.timeout.as_secs(),
            min_confidence: defaults.min_confidence,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub server_port: u16,
    pub traversal_backend: TraversalBackend,
    /// None means suggestions are disabled
    pub llm_url: Option<String>,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub suggestions: SuggestionConfig,
}

impl Config {
    /// Load configuration from environment variables only.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let traversal_backend = match std::env::var("TRAVERSAL_BACKEND") {
            Ok(raw) => raw
                .parse::<TraversalBackend>()
                .map_err(anyhow::Error::msg)
                .context("Invalid TRAVERSAL_BACKEND")?,
            Err(_) => yaml.traversal.backend,
        };

        let llm_url = std::env::var("LLM_URL").unwrap_or(yaml.suggestions.llm_url);
        let llm_url = match llm_url.trim() {
            "" | "disabled" => None,
            url => Some(url.to_string()),
        };

        let timeout_secs = std::env::var("SUGGESTION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(yaml.suggestions.timeout_secs);

        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.server.port),
            traversal_backend,
            llm_url,
            llm_model: std::env::var("LLM_MODEL").unwrap_or(yaml.suggestions.llm_model),
            llm_api_key: std::env::var("LLM_API_KEY")
                .ok()
                .or(yaml.suggestions.llm_api_key)
                .filter(|k| !k.is_empty()),
            suggestions: SuggestionConfig {
                max_candidates: yaml.suggestions.max_candidates,
                max_scored: yaml.suggestions.max_scored,
                timeout: Duration::from_secs(timeout_secs),
                min_confidence: yaml.suggestions.min_confidence,
            },
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

// ============================================================================
// Application state
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub neo4j: Arc<dyn neo4j::GraphStore>,
    pub scorer: Option<Arc<dyn RelevanceScorer>>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect to Neo4j and build the relevance scorer, if configured
    pub async fn new(config: Config) -> Result<Self> {
        let neo4j: Arc<dyn neo4j::GraphStore> = Arc::new(
            neo4j::client::Neo4jClient::new(
                &config.neo4j_uri,
                &config.neo4j_user,
                &config.neo4j_password,
            )
            .await?,
        );

        let scorer = match &config.llm_url {
            Some(url) => {
                let scorer = HttpRelevanceScorer::new(
                    url.clone(),
                    config.llm_model.clone(),
                    config.llm_api_key.clone(),
                )?;
                tracing::info!(url = %url, model = %config.llm_model, "Edge suggestions enabled");
                Some(Arc::new(scorer) as Arc<dyn RelevanceScorer>)
            }
            None => {
                tracing::info!("No LLM configured, edge suggestions disabled");
                None
            }
        };

        Ok(Self {
            neo4j,
            scorer,
            config: Arc::new(config),
        })
    }

    pub fn traversal(&self) -> TraversalEngine {
        TraversalEngine::new(self.neo4j.clone(), self.config.traversal_backend)
    }

    /// Assemble the HTTP server state
    pub fn server_state(&self) -> api::handlers::CorpusState {
        Arc::new(api::handlers::ServerState {
            neo4j: self.neo4j.clone(),
            corpus: Arc::new(corpus::CorpusManager::new(self.neo4j.clone())),
            traversal: Arc::new(self.traversal()),
            suggestions: Arc::new(EdgeSuggestionService::new(
                self.neo4j.clone(),
                self.scorer.clone(),
                self.config.suggestions.clone(),
            )),
        })
    }
}

/// Connect everything and serve the API until the process is stopped
pub async fn start_server(config: Config) -> Result<()> {
    let port = config.server_port;
    let backend = config.traversal_backend;

    let state = AppState::new(config).await?;
    tracing::info!("Connected to Neo4j");

    let app = api::create_router(state.server_state());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, traversal_backend = %backend, "Policy corpus API listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod config_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_config_loading() {
        let yaml = r#"
server:
  port: 9090

neo4j:
  uri: bolt://db:7687
  user: admin
  password: secret

traversal:
  backend: in_memory

suggestions:
  llm_url: https://llm.internal/v1/chat/completions
  llm_model: gpt-4o-mini
  max_scored: 3
  min_confidence: 0.5
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.neo4j.uri, "bolt://db:7687");
        assert_eq!(config.traversal.backend, TraversalBackend::InMemory);
        assert_eq!(config.suggestions.llm_model, "gpt-4o-mini");
        assert_eq!(config.suggestions.max_scored, 3);
        // Unset keys keep their defaults
        assert_eq!(config.suggestions.max_candidates, 10);
        assert_eq!(config.suggestions.timeout_secs, 30);
    }

    #[test]
    fn test_yaml_defaults() {
        let config = YamlConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(config.neo4j.user, "neo4j");
        assert_eq!(config.traversal.backend, TraversalBackend::Store);
        assert_eq!(config.suggestions.min_confidence, 0.3);
        assert!(config.suggestions.llm_api_key.is_none());
    }

    #[test]
    fn test_unknown_backend_in_yaml_is_an_error() {
        let yaml = "traversal:\n  backend: quantum\n";
        assert!(serde_yaml::from_str::<YamlConfig>(yaml).is_err());
    }

    /// Combined test for YAML file loading and env var overrides.
    /// Runs as a single test to avoid parallel env var race conditions.
    #[test]
    fn test_yaml_and_env_lifecycle() {
        fn clear_env() {
            for var in &[
                "NEO4J_URI",
                "NEO4J_USER",
                "NEO4J_PASSWORD",
                "SERVER_PORT",
                "TRAVERSAL_BACKEND",
                "LLM_URL",
                "LLM_MODEL",
                "LLM_API_KEY",
                "SUGGESTION_TIMEOUT_SECS",
            ] {
                std::env::remove_var(var);
            }
        }

        // --- Phase 1: YAML values loaded correctly ---
        let yaml = r#"
server:
  port: 9999
neo4j:
  uri: bolt://yaml-host:7687
  user: yaml-user
  password: yaml-pass
suggestions:
  llm_url: http://yaml-llm/v1/chat/completions
  timeout_secs: 12
"#;
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&file_path).unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        clear_env();

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.server_port, 9999);
        assert_eq!(config.neo4j_uri, "bolt://yaml-host:7687");
        assert_eq!(config.neo4j_user, "yaml-user");
        assert_eq!(
            config.llm_url.as_deref(),
            Some("http://yaml-llm/v1/chat/completions")
        );
        assert_eq!(config.suggestions.timeout, Duration::from_secs(12));
        assert_eq!(config.traversal_backend, TraversalBackend::Store);

        // --- Phase 2: Env vars override YAML ---
        std::env::set_var("NEO4J_URI", "bolt://env-host:7687");
        std::env::set_var("SERVER_PORT", "7777");
        std::env::set_var("TRAVERSAL_BACKEND", "in_memory");
        std::env::set_var("SUGGESTION_TIMEOUT_SECS", "5");
        std::env::set_var("LLM_API_KEY", "sk-test");

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.neo4j_uri, "bolt://env-host:7687");
        assert_eq!(config.server_port, 7777);
        assert_eq!(config.traversal_backend, TraversalBackend::InMemory);
        assert_eq!(config.suggestions.timeout, Duration::from_secs(5));
        assert_eq!(config.llm_api_key.as_deref(), Some("sk-test"));
        // YAML value still used where no env override
        assert_eq!(config.neo4j_user, "yaml-user");

        // --- Phase 3: LLM_URL=disabled turns suggestions off ---
        std::env::set_var("LLM_URL", "disabled");
        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert!(config.llm_url.is_none());

        std::env::set_var("LLM_URL", "");
        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert!(config.llm_url.is_none());

        // --- Phase 4: bad backend name is rejected ---
        std::env::set_var("TRAVERSAL_BACKEND", "quantum");
        assert!(Config::from_yaml_and_env(Some(&file_path)).is_err());

        clear_env();

        // --- Phase 5: No YAML file → defaults ---
        let nonexistent = Path::new("/tmp/nonexistent-corpus-config-12345.yaml");
        let config = Config::from_yaml_and_env(Some(nonexistent)).unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.neo4j_uri, "bolt://localhost:7687");
        assert_eq!(
            config.llm_url.as_deref(),
            Some(suggest::llm::DEFAULT_LLM_URL)
        );
        assert_eq!(config.suggestions.max_scored, 5);
    }
}
