//! Aegis CLI - Command-line interface for the security gateway

use aegis_core::AegisConfig;
use clap::Parser;

#[derive(Parser)]
#[command(name = "aegis")]
#[command(about = "Aegis - Two-tier LLM security gateway")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Start the Aegis gateway
    Start {
        /// Configuration file path
        #[arg(short, long, default_value = "config/aegis.toml")]
        config: String,
    },
    /// Check configuration validity
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "config/aegis.toml")]
        config: String,
    },
    /// Show gateway status
    Status,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    match cli.command {
        Some(Commands::Start { config }) => {
            // Config loading (YAML/JSON loaders) and HTTP framework
            // bootstrap are external collaborators, not this binary's job.
            let _defaults = AegisConfig::default();
            println!("Starting Aegis Gateway with config: {}", config);
        }
        Some(Commands::Check { config }) => {
            println!("Checking config: {}", config);
        }
        Some(Commands::Status) => {
            println!("Aegis status: READY");
        }
        None => {
            println!("Aegis Gateway v0.1.0 - Use --help for commands");
        }
    }

    Ok(())
}
