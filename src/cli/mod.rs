//! CLI interface for Tallyboard

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tallyboard")]
#[command(author = "Krakaw")]
#[command(version = "1.0.0")]
#[command(about = "Todo and expense tracking API", long_about = None)]
pub struct Cli {
    /// Path to tallyboard.toml (defaults to searching upward from the current directory)
    #[arg(short, long, global = true, env = "TALLYBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new tallyboard.toml configuration file
    Init,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Keep data in memory instead of PostgreSQL
        #[arg(long)]
        memory: bool,
    },

    /// Print a bcrypt hash for a password
    HashPassword {
        /// The plaintext password
        password: String,
    },

    /// Issue a session token for an email using the active signing key
    IssueToken {
        #[arg(short, long)]
        email: String,
    },
}
