//! Social Graph Analyzer - server and one-shot queries
//!
//! Runs the HTTP API or answers a single analytics question from the
//! command line, printing the JSON result to stdout.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use social_graph_analyzer::graph::{ego, path, recommend};
use social_graph_analyzer::{AppState, Config};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "social-graph")]
#[command(about = "Social graph analytics over Neo4j")]
struct Cli {
    /// Path to the YAML config file (default: ./config.yaml)
    #[arg(short, long, global = true, env = "SOCIAL_GRAPH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Shortest connection path between two people
    ShortestPath {
        origin: i64,
        destination: i64,
        #[arg(long, default_value_t = path::DEFAULT_MAX_DEPTH)]
        max_depth: u32,
    },

    /// Friend-of-friend recommendations for a person
    Recommend {
        user: i64,
        #[arg(long, default_value_t = recommend::DEFAULT_LIMIT)]
        limit: u32,
        #[arg(long, default_value_t = recommend::DEFAULT_MIN_COMMON)]
        min_common: u32,
    },

    /// Ego network of a person
    Ego {
        user: i64,
        #[arg(long, default_value_t = ego::DEFAULT_DEPTH)]
        depth: u32,
        #[arg(long, default_value_t = ego::DEFAULT_MAX_NODES)]
        max_nodes: u32,
    },

    /// Hobby-based communities
    Communities {
        /// Include per-community connection density
        #[arg(long)]
        density: bool,
    },

    /// Every person's outgoing connections
    Connections,

    /// A person with hobby and connections
    Profile { id: i64 },

    /// Hobby catalog
    Hobbies,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,social_graph_analyzer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received");
            signal.cancel();
        }
    });

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server_host = host;
            }
            if let Some(port) = port {
                config.server_port = port;
            }
            social_graph_analyzer::start_server(config, shutdown).await
        }
        command => run_query(config, command, shutdown).await,
    }
}

async fn run_query(config: Config, command: Commands, cancel: CancellationToken) -> Result<()> {
    let state = AppState::new(config).await?;
    let store = state.store.as_ref();
    let engine = &state.engine;

    match command {
        Commands::ShortestPath {
            origin,
            destination,
            max_depth,
        } => print_json(
            &engine
                .shortest_path(store, &cancel, origin, destination, max_depth)
                .await?,
        ),
        Commands::Recommend {
            user,
            limit,
            min_common,
        } => print_json(
            &engine
                .recommendations(store, &cancel, user, limit, min_common)
                .await?,
        ),
        Commands::Ego {
            user,
            depth,
            max_nodes,
        } => print_json(
            &engine
                .ego_graph(store, &cancel, user, depth, max_nodes)
                .await?,
        ),
        Commands::Communities { density: true } => {
            print_json(&engine.communities_with_density(store, &cancel).await?)
        }
        Commands::Communities { density: false } => {
            print_json(&engine.communities(store, &cancel).await?)
        }
        Commands::Connections => print_json(&engine.connections(store, &cancel).await?),
        Commands::Profile { id } => {
            print_json(&engine.person_profile(store, &cancel, id).await?)
        }
        Commands::Hobbies => print_json(&engine.hobby_catalog(store, &cancel).await?),
        Commands::Serve { .. } => anyhow::bail!("serve is not a one-shot query"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
