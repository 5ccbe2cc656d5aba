pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::month::YearMonth;
#[cfg(feature = "cli")]
use crate::narration::ScriptVariant;
#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "hakoake")]
#[command(about = "Tokyo live house schedules, monthly playlist rotation and narration scripts")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, default_value = "hakoake.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log CPU / memory per import phase
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListingFormat {
    Text,
    Csv,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Import the schedule feed into the catalog
    Import {
        /// Show the configuration and exit without fetching
        #[arg(long)]
        dry_run: bool,

        /// Import venues already collected today
        #[arg(long)]
        force: bool,
    },

    /// Collection status per venue
    Status {
        /// Months to show from the current month
        #[arg(long, default_value_t = 2)]
        months: usize,

        #[arg(long, value_enum, default_value_t = StatusFormat::Text)]
        format: StatusFormat,
    },

    /// Performers scheduled in a month
    Performers {
        /// Target month (YYYY-MM), defaults to the current month
        #[arg(long)]
        month: Option<YearMonth>,

        /// Only performances from today onwards
        #[arg(long)]
        upcoming_only: bool,

        #[arg(long, value_enum, default_value_t = ListingFormat::Text)]
        format: ListingFormat,
    },

    /// Monthly playlist rotation
    #[command(subcommand)]
    Playlist(PlaylistCommand),

    /// Narration prompt and script checks
    #[command(subcommand)]
    Narration(NarrationCommand),

    /// Reset or clear venue collection state
    #[command(subcommand)]
    Collection(CollectionCommand),
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum PlaylistCommand {
    /// Pick this month's performers by playlist weight
    Create {
        /// Target month (YYYY-MM)
        month: YearMonth,

        #[arg(long)]
        dry_run: bool,

        /// Id of the YouTube playlist created for this month
        #[arg(long)]
        youtube_playlist_id: Option<String>,
    },

    /// Append a spotlight song to an existing playlist
    Spotlight {
        #[arg(long)]
        playlist_id: u64,

        #[arg(long)]
        performer_id: u64,

        /// Override playlist.max_spotlight_duration_minutes
        #[arg(long)]
        max_minutes: Option<u32>,
    },

    /// Renumber entries: regular entries first, spotlight entries last
    FixPositions {
        /// Only this playlist (default: all)
        #[arg(long)]
        playlist_id: Option<u64>,

        #[arg(long)]
        dry_run: bool,
    },
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum NarrationCommand {
    /// Write the chat request for a playlist's narration
    Prompt {
        playlist_id: u64,

        /// sectioned or paragraph (default from config)
        #[arg(long)]
        variant: Option<ScriptVariant>,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },

    /// Check a generated script against the narration rules
    Lint {
        script: String,

        #[arg(long)]
        variant: Option<ScriptVariant>,

        /// Expected number of performer sections
        #[arg(long)]
        performers: Option<usize>,
    },
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum CollectionCommand {
    /// Delete a venue's schedules from a date onwards and mark it for re-collection
    Reset {
        #[arg(long)]
        live_house_id: u64,

        /// First performance date to delete (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        #[arg(long)]
        dry_run: bool,
    },

    /// Clear last collection time and state for venues
    Clear {
        #[arg(required = true)]
        live_house_ids: Vec<u64>,

        #[arg(long)]
        dry_run: bool,
    },
}
