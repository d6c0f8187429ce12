//! CLI argument definitions for Intake.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Intake -- classify free-text service requests.
#[derive(Parser)]
#[command(
    name = "intake",
    version,
    about = "Intake -- classify free-text service requests",
    long_about = "Classifies a free-text request into an action, a process and a request \
                  type, using exact phrase matching with an embedding-similarity fallback."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP service with the embedded form.
    Serve {
        /// Address to bind the HTTP server to (overrides the config file).
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on (overrides the config file).
        #[arg(long, short)]
        port: Option<u16>,

        /// Path to the configuration file.
        #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Classify a single request and print the result as JSON.
    Classify {
        /// The request text.
        text: String,

        /// Path to the configuration file.
        #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Print the effective action taxonomy and process registry.
    Catalog {
        /// Path to the configuration file.
        #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}
