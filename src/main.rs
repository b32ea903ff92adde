//! Policy Corpus - Main Server
//!
//! REST API plus one-shot graph queries from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use policy_corpus::traversal::{
    check_depth, DEFAULT_PATH_MAX_DEPTH, DEFAULT_SUBGRAPH_DEPTH, MAX_PATH_DEPTH,
    MAX_SUBGRAPH_DEPTH,
};
use policy_corpus::{AppState, Config};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "corpus")]
#[command(about = "Policy corpus graph server")]
struct Cli {
    /// Path to the YAML config file (default: ./config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the shortest path between two nodes as JSON
    Path {
        #[arg(long)]
        from: Uuid,

        #[arg(long)]
        to: Uuid,

        /// Hop ceiling (1-50)
        #[arg(
            long,
            default_value_t = DEFAULT_PATH_MAX_DEPTH,
            value_parser = parse_path_depth
        )]
        max_depth: usize,
    },

    /// Print the subgraph around a node as JSON
    Subgraph {
        #[arg(long)]
        center: Uuid,

        /// Hops from the center (1-5)
        #[arg(
            long,
            default_value_t = DEFAULT_SUBGRAPH_DEPTH,
            value_parser = parse_subgraph_depth
        )]
        depth: usize,
    },
}

fn parse_path_depth(raw: &str) -> Result<usize, String> {
    let value = raw.parse::<usize>().map_err(|e| e.to_string())?;
    check_depth("max_depth", value, MAX_PATH_DEPTH)
}

fn parse_subgraph_depth(raw: &str) -> Result<usize, String> {
    let value = raw.parse::<usize>().map_err(|e| e.to_string())?;
    check_depth("depth", value, MAX_SUBGRAPH_DEPTH)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,policy_corpus=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server_port = port;
            }
            policy_corpus::start_server(config).await
        }
        Commands::Path {
            from,
            to,
            max_depth,
        } => {
            let state = AppState::new(config).await?;
            let path = state
                .traversal()
                .find_shortest_path(from, to, max_depth)
                .await?;
            if path.is_empty() {
                tracing::info!(%from, %to, max_depth, "No path found");
            }
            println!("{}", serde_json::to_string_pretty(&path)?);
            Ok(())
        }
        Commands::Subgraph { center, depth } => {
            let state = AppState::new(config).await?;
            let view = state.traversal().get_subgraph(center, depth).await?;
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(())
        }
    }
}
