use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};

use crate::store::RatingSystem;

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Sports ratings engine
///
/// Ingests scoreboards, rating tables, schedules and box scores, reconciles
/// team names against the registry, and derives blended win probabilities,
/// spreads and rolling team analytics.
///
/// Results are printed as JSON.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
pub struct Args {
    /// Path to the config file. Defaults to the platform config directory.
    #[arg(long = "config", global = true, help_heading = "Configuration")]
    pub config_path: Option<String>,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", global = true, help_heading = "Logging")]
    pub log_file: Option<String>,

    /// Log only to the log file, never to stdout
    #[arg(short, long, global = true, help_heading = "Logging")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Import the team registry (and aliases) from a JSON file
    ImportTeams {
        /// JSON array of teams: `[{"name": "...", "aliases": ["..."]}]`
        file: String,
    },

    /// Fetch a provider feed and store it
    Ingest {
        #[command(subcommand)]
        source: IngestSource,
    },

    /// Create or refresh the hypothetical prediction for a game
    Predict { game_id: i64 },

    /// Grade every prediction of a season whose game is final
    Grade {
        #[arg(long)]
        season: i32,
    },

    /// Show the ratings bundle for a game
    Ratings { game_id: i64 },

    /// Rolling analytics over a team's most recent games
    Analyze {
        /// Team id or name
        team: String,

        /// Number of recent games. Defaults to `analytics.default_window`.
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Print the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum IngestSource {
    /// Scoreboard events for one date (YYYY-MM-DD). Defaults to today.
    Scoreboard {
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Rating table of one system from its configured page
    Rankings {
        #[arg(long, value_parser = parse_rating_system)]
        system: RatingSystem,

        #[arg(long)]
        season: i32,

        /// Week of the table. Omit for season-level values.
        #[arg(long)]
        week: Option<u32>,
    },

    /// Efficiency and strength of schedule from the paginated ratings API
    RatingsApi {
        #[arg(long)]
        season: i32,

        #[arg(long)]
        week: Option<u32>,
    },

    /// Schedule table
    Schedule,

    /// Box score of one or more provider events
    BoxScore {
        #[arg(required = true)]
        event_ids: Vec<String>,
    },
}

fn parse_rating_system(raw: &str) -> Result<RatingSystem, String> {
    raw.parse()
}
