//! CLI command definitions for the `forcehook` binary.

pub mod config;
pub mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Discover and provision outbound webhooks on a CRM platform.
#[derive(Parser)]
#[command(name = "forcehook", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Detailed logs (-v for debug, -vv for trace). Ignored when RUST_LOG is set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Port to listen on.
        #[arg(long, short, default_value = "3000", env = "FORCEHOOK_PORT")]
        port: u16,

        /// Host address to bind to.
        #[arg(long, default_value = "127.0.0.1", env = "FORCEHOOK_HOST")]
        host: String,
    },

    /// Print the effective configuration (secrets masked).
    Config,

    /// Print the Apex artifacts generated for a webhook definition file.
    Render {
        /// JSON file with `name`, `sobject`, `events` and `url`.
        file: PathBuf,
    },
}
