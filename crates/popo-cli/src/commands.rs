//! CLI command definitions.

use clap::Subcommand;
use std::net::SocketAddr;

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP query API
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Fetch today's bulletin (the default, as JSON, when no command is given)
    Latest {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the alert phase and plume direction
    Alert {
        /// Date to report on; today when omitted
        date: Option<String>,
    },

    /// Fetch the bulletin for one date
    Get {
        /// Date such as 01-JAN-2023, 2023-01-01 or 01/01/2023
        date: String,

        /// Print a single field (phase, plumeDirection, exhalations,
        /// tremorMinutes, explosions)
        #[arg(short, long)]
        field: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Dotted key, e.g. cache.capacity
        key: String,

        /// Value
        value: String,
    },

    /// Print the configuration file path
    Path,
}
