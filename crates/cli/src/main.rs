//! Atomia CLI — the main entry point.
//!
//! Commands:
//! - `serve`    — Start the HTTP API server
//! - `ask`      — Ask a single question in-process
//! - `status`   — Show effective configuration
//! - `onboard`  — Write a default config file

use atomia_core::Subject;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "atomia",
    about = "Atomia — AI doubt partner for IISER aspirants",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the bind address
        #[arg(long)]
        host: Option<String>,

        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask Atomia a single question
    Ask {
        /// The question
        message: String,

        /// Physics, Chemistry, Mathematics or Biology
        #[arg(short, long)]
        subject: Option<Subject>,
    },

    /// Show configuration and provider status
    Status,

    /// Initialize configuration
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is normal
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { host, port } => commands::serve::run(host, port).await?,
        Commands::Ask { message, subject } => commands::ask::run(message, subject).await?,
        Commands::Status => commands::status::run().await?,
        Commands::Onboard => commands::onboard::run().await?,
    }

    Ok(())
}
