//! Estate Explorer MCP server entry point.

use std::path::Path;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use estate_explorer::{ArtifactStore, EstateWriter};
use estate_explorer_mcp::config::{resolve_data_dir, resolve_model_path, ScoringConfig};
use estate_explorer_mcp::protocol::ProtocolHandler;
use estate_explorer_mcp::session::EstateSession;
use estate_explorer_mcp::tools::ToolRegistry;
use estate_explorer_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "estate-explorer-mcp",
    about = "MCP server for Gurgaon real-estate price estimates, nearby search and recommendations",
    version
)]
struct Cli {
    /// Artifact directory or .estate bundle.
    #[arg(short, long, global = true)]
    data: Option<String>,

    /// Path to the ONNX price pipeline.
    #[arg(long, global = true)]
    model: Option<String>,

    /// Similarity weights as "name,location,facilities".
    #[arg(long, global = true)]
    weights: Option<String>,

    /// Half-width of the price band, in crore.
    #[arg(long, global = true)]
    price_margin: Option<f64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Start MCP server over HTTP.
    #[cfg(feature = "sse")]
    ServeHttp {
        /// Listen address (host:port).
        #[arg(long, default_value = "127.0.0.1:3100")]
        addr: String,

        /// Bearer token for authentication.
        /// Also reads from ESTATE_TOKEN env var.
        #[arg(long)]
        token: Option<String>,
    },

    /// Validate an artifact directory or bundle.
    Validate,

    /// Print server capabilities as JSON.
    Info,

    /// Pack an artifact directory into a single .estate bundle.
    Pack {
        /// Output bundle path.
        #[arg(short, long, default_value = "artifacts.estate")]
        output: String,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   estate-explorer-mcp completions bash > ~/.local/share/bash-completion/completions/estate-explorer-mcp
    ///   estate-explorer-mcp completions zsh > ~/.zfunc/_estate-explorer-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },

    /// Launch interactive REPL mode.
    Repl,
}

fn open_session(cli: &Cli) -> anyhow::Result<EstateSession> {
    let data = resolve_data_dir(cli.data.as_deref());
    let model = resolve_model_path(cli.model.as_deref(), &data);
    let scoring = ScoringConfig::resolve(cli.weights.as_deref(), cli.price_margin)?;
    tracing::info!("Data: {}", data.display());
    Ok(EstateSession::open(&data, &model, scoring)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.as_ref().unwrap_or(&Commands::Serve) {
        Commands::Serve => {
            let session = open_session(&cli)?;
            let handler = ProtocolHandler::new(Arc::new(session));
            let transport = StdioTransport::new(handler);
            transport.run().await?;
        }

        #[cfg(feature = "sse")]
        Commands::ServeHttp { addr, token } => {
            use estate_explorer_mcp::config::resolve_token;
            use estate_explorer_mcp::transport::SseTransport;

            let effective_token = resolve_token(token.clone());
            let session = open_session(&cli)?;
            let handler = ProtocolHandler::new(Arc::new(session));

            if effective_token.is_some() {
                tracing::info!("Auth: bearer token required");
            }

            let transport = SseTransport::new(handler, effective_token);
            transport.run(addr).await?;
        }

        Commands::Validate => {
            let data = resolve_data_dir(cli.data.as_deref());
            match ArtifactStore::load(&data) {
                Ok(store) => print_summary(&data, &store),
                Err(e) => {
                    eprintln!("Invalid artifacts: {e}");
                    std::process::exit(1);
                }
            }
        }

        Commands::Info => {
            let capabilities = estate_explorer_mcp::types::InitializeResult::default_result();
            let tools = ToolRegistry::list_tools();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Pack { output } => {
            let data = resolve_data_dir(cli.data.as_deref());
            let store = ArtifactStore::load(&data)?;
            let output = Path::new(output);
            EstateWriter::write_to_file(&store, output)?;
            println!(
                "Packed {} properties from {} into {}",
                store.index().len(),
                data.display(),
                output.display()
            );
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(
                *shell,
                &mut cmd,
                "estate-explorer-mcp",
                &mut std::io::stdout(),
            );
        }

        Commands::Repl => {
            let scoring = ScoringConfig::resolve(cli.weights.as_deref(), cli.price_margin)?;
            estate_explorer_mcp::repl::run(cli.data.clone(), scoring)?;
        }
    }

    Ok(())
}

fn print_summary(data: &Path, store: &ArtifactStore) {
    let stats = store.stats();
    println!("Valid artifacts: {}", data.display());
    println!("  Properties: {}", stats.properties);
    println!("  Landmarks:  {}", stats.landmarks);
    println!("  Sectors:    {}", stats.sectors);
    match stats.market_listings {
        Some(n) => println!("  Listings:   {n}"),
        None => println!("  Listings:   (not loaded)"),
    }
    println!(
        "  Features:   {}",
        if stats.feature_text { "loaded" } else { "(not loaded)" }
    );
}
