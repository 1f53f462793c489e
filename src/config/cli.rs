//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// pio: `PredictionIO` command-line client
///
/// Sends events to an event server and queries to a deployed engine.
#[derive(Debug, Parser)]
#[command(name = "pio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Event server URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Engine URL
    #[arg(long = "engine-url", global = true)]
    pub engine_url: Option<String>,

    /// Access key of the event server app
    #[arg(long = "access-key", global = true)]
    pub access_key: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Maximum number of attempts per request
    #[arg(long = "retry-max", global = true)]
    pub retry_max: Option<u32>,

    /// Initial retry delay in milliseconds
    #[arg(long = "retry-delay", global = true)]
    pub retry_delay: Option<u64>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for pio
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "pio.toml")]
        output: PathBuf,
    },

    /// Show the status of the event server (or the engine)
    Status {
        /// Ask the engine instead of the event server
        #[arg(long)]
        engine: bool,
    },

    /// Create an event
    CreateEvent(CreateEventArgs),

    /// Delete an event by id
    DeleteEvent {
        /// Event id
        id: String,
    },

    /// Fetch an event by id
    GetEvent {
        /// Event id
        id: String,
    },

    /// List events matching filters
    FindEvents(FindEventsArgs),

    /// Send a JSON query to the engine
    Query {
        /// Query as a JSON document, e.g. '{"user": "u1", "num": 4}'
        query: String,
    },
}

/// Arguments of `create-event`.
#[derive(Debug, Args)]
pub struct CreateEventArgs {
    /// Event name (e.g. `view`, `$set`)
    pub event: String,

    /// Entity type (e.g. `user`)
    pub entity_type: String,

    /// Entity id
    pub entity_id: String,

    /// Target entity type
    #[arg(long = "target-entity-type", requires = "target_entity_id")]
    pub target_entity_type: Option<String>,

    /// Target entity id
    #[arg(long = "target-entity-id", requires = "target_entity_type")]
    pub target_entity_id: Option<String>,

    /// Properties as a JSON object
    #[arg(long)]
    pub properties: Option<String>,

    /// Event time (RFC 3339); defaults to now
    #[arg(long = "event-time")]
    pub event_time: Option<String>,

    /// Prediction id
    #[arg(long = "pr-id")]
    pub pr_id: Option<String>,
}

/// Arguments of `find-events`.
#[derive(Debug, Args)]
pub struct FindEventsArgs {
    /// Entity type
    #[arg(long = "entity-type")]
    pub entity_type: Option<String>,

    /// Entity id
    #[arg(long = "entity-id")]
    pub entity_id: Option<String>,

    /// Event name (can be specified multiple times)
    #[arg(long = "event", value_name = "NAME")]
    pub events: Vec<String>,

    /// Target entity type
    #[arg(long = "target-entity-type")]
    pub target_entity_type: Option<String>,

    /// Target entity id
    #[arg(long = "target-entity-id")]
    pub target_entity_id: Option<String>,

    /// Window start (RFC 3339)
    #[arg(long = "start-time")]
    pub start_time: Option<String>,

    /// Window end (RFC 3339)
    #[arg(long = "until-time")]
    pub until_time: Option<String>,

    /// Maximum number of events (-1 for all)
    #[arg(long, allow_negative_numbers = true)]
    pub limit: Option<i32>,

    /// Newest first
    #[arg(long)]
    pub reversed: bool,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Like [`parse_from_iter`](Self::parse_from_iter), but returns the
    /// usage error instead of exiting.
    ///
    /// # Errors
    ///
    /// Returns the clap error describing the invalid arguments.
    pub fn try_parse_from_iter<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Command::Init { .. })
    }
}
