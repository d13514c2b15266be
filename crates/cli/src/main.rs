//! ForgeCore CLI: the main entry point.
//!
//! Commands:
//! - `onboard`: write a default config and create the data directories
//! - `run`: handle one instruction, or read instructions interactively
//! - `ask`: query the knowledge base
//! - `tool`: run a tool command directly
//! - `history`: show recent instructions and their results
//! - `clear`: reset the persisted history

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "forgecore",
    about = "ForgeCore — instruction routing and script generation for Blender",
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
    /// Initialize configuration and data directories
    Onboard,

    /// Turn instructions into scripts, answers or tool output
    Run {
        /// Handle a single instruction instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Print the full reply as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the knowledge base a question
    Ask {
        question: Vec<String>,
    },

    /// Run a tool command, e.g. "list files: ."
    Tool {
        command: Vec<String>,
    },

    /// Show recent history entries
    History {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Reset prompts, results and history
    Clear {
        /// Required; clearing cannot be undone
        #[arg(long)]
        confirm: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Run { message, json } => commands::run::run(message, json).await?,
        Commands::Ask { question } => commands::ask::run(&question.join(" ")).await?,
        Commands::Tool { command } => commands::tool::run(&command.join(" ")).await?,
        Commands::History { limit } => commands::memory::history(limit).await?,
        Commands::Clear { confirm } => commands::memory::clear(confirm).await?,
    }

    Ok(())
}
