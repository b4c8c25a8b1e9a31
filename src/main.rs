//! WeGene Assistant - MCP server exposing WeGene genetic test reports to AI assistants

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wegene_assistant::api;
use wegene_assistant::catalog::ReportCatalog;
use wegene_assistant::config::Config;
use wegene_assistant::context::AppContext;
use wegene_assistant::mcp::WegeneServer;
use wegene_assistant::store::TokenStore;

#[derive(Parser)]
#[command(name = "wegene-assistant")]
#[command(about = "MCP server exposing WeGene genetic test profiles and reports to AI assistants")]
#[command(version)]
struct Cli {
    /// Path to the report catalog (overrides WEGENE_REPORTS_PATH)
    #[arg(long, global = true)]
    reports: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server (stdio mode for desktop assistants)
    Mcp,

    /// Start the MCP server (streamable HTTP at /mcp)
    McpHttp {
        /// Port to listen on
        #[arg(short, long, default_value = "3940")]
        port: u16,
    },

    /// List the reports in the catalog
    Reports,

    /// Show whether a valid access token is stored
    Status,

    /// Delete the stored access token
    Logout,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr: stdout carries the MCP stdio transport
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("wegene_assistant={},tower_http=warn", log_level).into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load environment
    let _ = dotenvy::dotenv();

    let mut config = Config::from_env()?;
    if let Some(reports) = cli.reports {
        config.reports_path = reports;
    }

    match cli.command.unwrap_or(Commands::Mcp) {
        Commands::Mcp => {
            let server = start(config).await?;
            wegene_assistant::mcp::server::serve_stdio(server).await?;
        }

        Commands::McpHttp { port } => {
            let server = start(config).await?;
            println!("MCP server running at http://localhost:{}/mcp", port);
            wegene_assistant::mcp::server::serve_http(server, port).await?;
        }

        Commands::Reports => {
            let catalog = ReportCatalog::load(&config.reports_path)?;
            for report in catalog.reports() {
                println!(
                    "{:<6} {:<8} {:<24} {}",
                    report.report_id,
                    report.category.as_str(),
                    report.report_name,
                    report.report_endpoint
                );
            }
            println!("\n{} reports", catalog.len());
        }

        Commands::Status => {
            let tokens = TokenStore::open(&config.token_db_path)?;
            if tokens.has_token()? {
                println!("✓ Access token stored in {}", config.token_db_path.display());
            } else {
                println!("No valid access token. Use the wegene-oauth tool to authorize.");
            }
        }

        Commands::Logout => {
            let tokens = TokenStore::open(&config.token_db_path)?;
            tokens.delete_token()?;
            println!("✓ Access token removed");
        }
    }

    Ok(())
}

/// Build the context and bring up the callback listener.
/// Bad credentials, a broken catalog or a busy port all abort here.
async fn start(config: Config) -> anyhow::Result<WegeneServer> {
    config.validate()?;

    let ctx = Arc::new(AppContext::initialize(config)?);
    tracing::info!(
        "Loaded {} reports, token store at {}",
        ctx.catalog.len(),
        ctx.config.token_db_path.display()
    );

    let (addr, _listener) = api::spawn_callback_server(ctx.clone()).await?;
    tracing::debug!("Callback listener bound to {}", addr);

    Ok(WegeneServer::new(ctx))
}
