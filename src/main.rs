use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tallyboard::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tallyboard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => cli::commands::init().await,
        Commands::Serve { host, port, memory } => {
            cli::commands::serve(cli.config, host, port, memory).await
        }
        Commands::HashPassword { password } => cli::commands::hash(cli.config, &password).await,
        Commands::IssueToken { email } => cli::commands::issue_token(cli.config, &email).await,
    }
}
