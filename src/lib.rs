//! Social Graph Analyzer
//!
//! Read-only analytics over a social property graph stored in Neo4j:
//! - Shortest connection paths by iterative deepening
//! - Friend-of-friend recommendations
//! - Ego networks with drawing attributes
//! - Hobby-based communities and full adjacency listings
//! - HTTP API and one-shot CLI over the same engine

pub mod api;
pub mod graph;
pub mod neo4j;

use anyhow::{Context, Result};
use graph::{HobbyPalette, SocialGraphEngine};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub neo4j: Neo4jYamlConfig,
    pub engine: EngineYamlConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    /// Database holding the social graph
    pub database: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "password".into(),
            database: "neo4j".into(),
        }
    }
}

/// Engine configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineYamlConfig {
    /// Per-request deadline for HTTP calls
    pub request_timeout_secs: u64,
    /// Hobby name → node color, layered over the built-in palette
    pub palette: BTreeMap<String, String>,
}

impl Default for EngineYamlConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            palette: BTreeMap::new(),
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
    pub graph_name: String,
    pub server_host: String,
    pub server_port: u16,
    pub request_timeout_secs: u64,
    pub palette: BTreeMap<String, String>,
}

impl Config {
    /// Load configuration from environment variables and `config.yaml` in CWD.
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
        // 1. Load YAML config (or defaults if file not found)
        let yaml = Self::load_yaml(yaml_path);

        // 2. Build Config with env var overrides
        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            graph_name: std::env::var("GRAPH_NAME").unwrap_or(yaml.neo4j.database),
            server_host: std::env::var("SERVER_HOST").unwrap_or(yaml.server.host),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.server.port),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.engine.request_timeout_secs),
            palette: yaml.engine.palette,
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

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn neo4j::GraphStore>,
    pub engine: SocialGraphEngine,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect to Neo4j and build the engine from `config`
    pub async fn new(config: Config) -> Result<Self> {
        let store = Arc::new(
            neo4j::Neo4jClient::new(
                &config.neo4j_uri,
                &config.neo4j_user,
                &config.neo4j_password,
                &config.graph_name,
            )
            .await?,
        );
        Ok(Self::with_store(config, store))
    }

    /// Build state around an already-connected store
    pub fn with_store(config: Config, store: Arc<dyn neo4j::GraphStore>) -> Self {
        let engine = SocialGraphEngine::new(HobbyPalette::with_overrides(&config.palette));
        Self {
            store,
            engine,
            config: Arc::new(config),
        }
    }

    /// State handed to the HTTP handlers
    pub fn server_state(&self) -> api::handlers::AnalyzerState {
        Arc::new(api::handlers::ServerState {
            store: self.store.clone(),
            engine: self.engine.clone(),
            request_timeout: self.config.request_timeout(),
        })
    }
}

/// Serve the HTTP API until `shutdown` is cancelled
pub async fn start_server(config: Config, shutdown: CancellationToken) -> Result<()> {
    let bind_address = config.bind_address();
    let state = AppState::new(config).await?;
    tracing::info!("Connected to graph store");

    let app = api::create_router(state.server_state());
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;
    tracing::info!("Listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            tracing::info!("Shutdown requested, draining connections");
        })
        .await
        .context("HTTP server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
