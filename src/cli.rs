use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "anibridge")]
#[command(author, version, about = "Anime identifier bridging and episode listing service")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,
    },

    /// Resolve an external metadata id to its catalog slug
    Resolve {
        /// External numeric id
        #[arg(required = true)]
        id: u64,
    },

    /// Fetch the episode listing for an id (numeric external id or catalog slug)
    Episodes {
        /// External numeric id or internal catalog slug
        #[arg(required = true)]
        id: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
