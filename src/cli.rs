//! CLI - Command line interface for cinetui
//!
//! Every TUI action is scriptable. All output is JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Search the catalog
//! cinetui search "blade runner" --json
//!
//! # Browse lists
//! cinetui popular --page 2
//! cinetui trending --window week
//!
//! # Local data
//! cinetui favorites add 27205
//! cinetui list rate 1700000000000 8.5
//! cinetui export backup.json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network or API error
    NetworkError = 3,
    /// Local storage error
    StorageError = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// cinetui - terminal movie discovery client
///
/// Run without arguments to launch the interactive TUI.
/// Use subcommands for scriptable automation.
#[derive(Parser, Debug)]
#[command(
    name = "cinetui",
    version,
    about = "Terminal movie discovery client for the TMDB catalog",
    long_about = "Search, browse and track movies from the terminal.\n\n\
                  Run without arguments to launch the interactive TUI.\n\
                  Use subcommands for automation and scripting.",
    after_help = "EXAMPLES:\n\
                  cinetui                         Launch interactive TUI\n\
                  cinetui search \"blade runner\"   Search the catalog\n\
                  cinetui info 27205              Show movie details\n\
                  cinetui favorites add 27205     Save a favorite\n\
                  cinetui export backup.json      Back up local data"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Subcommand to run (omit for TUI mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if running in CLI mode (has subcommand)
    pub fn is_cli_mode(&self) -> bool {
        self.command.is_some()
    }

    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the catalog by keyword
    #[command(visible_alias = "s")]
    Search(SearchCmd),

    /// Autocomplete suggestions for a partial query
    Suggest(SuggestCmd),

    /// Popular movies
    Popular(PageCmd),

    /// Top rated movies
    #[command(name = "top-rated")]
    TopRated(PageCmd),

    /// Movies currently in theaters
    #[command(name = "now-playing")]
    NowPlaying(PageCmd),

    /// Upcoming releases
    Upcoming(PageCmd),

    /// Popular TV shows
    #[command(name = "popular-tv")]
    PopularTv(PageCmd),

    /// Filtered discovery
    #[command(visible_alias = "d")]
    Discover(DiscoverCmd),

    /// Trending titles
    #[command(visible_alias = "tr")]
    Trending(TrendingCmd),

    /// Details for one movie
    #[command(visible_alias = "i")]
    Info(InfoCmd),

    /// Details for a person
    Person(PersonCmd),

    /// Cast and crew for one movie
    Credits(MovieIdCmd),

    /// Trailers and other videos for one movie
    Videos(MovieIdCmd),

    /// Movies similar to one movie
    Similar(RelatedCmd),

    /// Recommendations based on one movie
    #[command(visible_alias = "rec")]
    Recommend(RelatedCmd),

    /// List the movie genres
    Genres,

    /// Search history
    History(HistoryCmd),

    /// Manage favorites
    #[command(subcommand)]
    Favorites(SavedListCmd),

    /// Manage the watchlist
    #[command(subcommand)]
    Watchlist(SavedListCmd),

    /// Manage the personal list
    #[command(subcommand)]
    List(MyListCmd),

    /// Export favorites/watchlist/search/view-mode as one JSON document
    Export(ExportCmd),

    /// Import a previously exported backup
    Import(ImportCmd),

    /// Wipe all locally saved data
    Wipe,
}

// =============================================================================
// Catalog commands
// =============================================================================

/// Search the catalog by keyword
#[derive(Args, Debug)]
pub struct SearchCmd {
    /// Search query (title, keywords)
    #[arg(required = true)]
    pub query: String,

    /// Result page (1-based)
    #[arg(long, short = 'p', default_value = "1")]
    pub page: u32,

    /// Maximum number of results printed
    #[arg(long, short = 'l', default_value = "20")]
    pub limit: usize,

    /// Catalog section to search
    #[arg(long, short = 'm', value_enum, default_value = "movie")]
    pub media: SearchMedia,
}

/// Which search endpoint to hit
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMedia {
    #[default]
    Movie,
    Tv,
    Multi,
}

/// Autocomplete suggestions for a partial query
#[derive(Args, Debug)]
pub struct SuggestCmd {
    /// Partial query (at least 2 characters)
    #[arg(required = true)]
    pub query: String,
}

/// Paginated list fetch
#[derive(Args, Debug)]
pub struct PageCmd {
    /// Result page (1-based)
    #[arg(long, short = 'p', default_value = "1")]
    pub page: u32,

    /// Maximum number of results printed
    #[arg(long, short = 'l', default_value = "20")]
    pub limit: usize,
}

/// Filtered discovery
#[derive(Args, Debug)]
pub struct DiscoverCmd {
    /// Genre id (see `cinetui genres`)
    #[arg(long, short = 'g')]
    pub genre: Option<u32>,

    /// Release year
    #[arg(long, short = 'y')]
    pub year: Option<u16>,

    /// Minimum vote average (0-10)
    #[arg(long, short = 'r')]
    pub min_rating: Option<f32>,

    /// Original language code, e.g. "en"
    #[arg(long)]
    pub language: Option<String>,

    /// Sort order
    #[arg(long, short = 's', value_enum, default_value = "popularity")]
    pub sort: SortOption,

    /// Result page (1-based)
    #[arg(long, short = 'p', default_value = "1")]
    pub page: u32,
}

/// Sort order for discovery
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    #[default]
    Popularity,
    Rating,
    Date,
    Revenue,
}

impl SortOption {
    pub fn as_sort_key(self) -> crate::store::SortKey {
        match self {
            SortOption::Popularity => crate::store::SortKey::Popularity,
            SortOption::Rating => crate::store::SortKey::Rating,
            SortOption::Date => crate::store::SortKey::ReleaseDate,
            SortOption::Revenue => crate::store::SortKey::Revenue,
        }
    }
}

/// Trending titles
#[derive(Args, Debug)]
pub struct TrendingCmd {
    /// Time window
    #[arg(long, short = 'w', value_enum, default_value = "day")]
    pub window: WindowOption,

    /// Maximum number of results printed
    #[arg(long, short = 'l', default_value = "20")]
    pub limit: usize,
}

/// Trending time window
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowOption {
    #[default]
    Day,
    Week,
}

/// Details for one movie
#[derive(Args, Debug)]
pub struct InfoCmd {
    /// TMDB movie id
    #[arg(required = true)]
    pub id: u64,

    /// Skip the credits/videos/similar expansions
    #[arg(long)]
    pub brief: bool,
}

/// Details for a person
#[derive(Args, Debug)]
pub struct PersonCmd {
    /// TMDB person id
    #[arg(required = true)]
    pub id: u64,
}

/// A bare movie id argument
#[derive(Args, Debug)]
pub struct MovieIdCmd {
    /// TMDB movie id
    #[arg(required = true)]
    pub id: u64,
}

/// Related-movie lookup (similar/recommendations)
#[derive(Args, Debug)]
pub struct RelatedCmd {
    /// TMDB movie id
    #[arg(required = true)]
    pub id: u64,

    /// Result page (1-based)
    #[arg(long, short = 'p', default_value = "1")]
    pub page: u32,

    /// Maximum number of results printed
    #[arg(long, short = 'l', default_value = "20")]
    pub limit: usize,
}

/// Search history
#[derive(Args, Debug)]
pub struct HistoryCmd {
    /// Clear the history instead of printing it
    #[arg(long)]
    pub clear: bool,
}

// =============================================================================
// Local data commands
// =============================================================================

/// Operations shared by favorites and watchlist
#[derive(Subcommand, Debug)]
pub enum SavedListCmd {
    /// Print the list
    #[command(visible_alias = "ls")]
    Show,
    /// Add a movie by TMDB id
    Add {
        #[arg(required = true)]
        id: u64,
    },
    /// Remove a movie by TMDB id
    #[command(visible_alias = "rm")]
    Remove {
        #[arg(required = true)]
        id: u64,
    },
}

/// Personal list operations
#[derive(Subcommand, Debug)]
pub enum MyListCmd {
    /// Print the list
    #[command(visible_alias = "ls")]
    Show {
        /// Filter by watch status
        #[arg(long, short = 's')]
        status: Option<String>,
        /// Filter by title substring
        #[arg(long)]
        query: Option<String>,
    },
    /// Add a movie by TMDB id
    Add {
        #[arg(required = true)]
        id: u64,
    },
    /// Remove an entry by list id
    #[command(visible_alias = "rm")]
    Remove {
        #[arg(required = true)]
        id: u64,
    },
    /// Set your own rating (0-10)
    Rate {
        #[arg(required = true)]
        id: u64,
        #[arg(required = true)]
        rating: f32,
    },
    /// Set your notes
    Note {
        #[arg(required = true)]
        id: u64,
        #[arg(required = true)]
        notes: String,
    },
    /// Set the watch status (want-to-watch | watching | watched)
    Status {
        #[arg(required = true)]
        id: u64,
        #[arg(required = true)]
        status: String,
    },
    /// Toggle the favorite flag
    Fav {
        #[arg(required = true)]
        id: u64,
    },
    /// Show aggregate stats
    Stats,
    /// Export the list to a JSON file (stdout when omitted)
    Export {
        path: Option<PathBuf>,
    },
    /// Replace the list from a JSON file
    Import {
        #[arg(required = true)]
        path: PathBuf,
    },
    /// Delete every entry
    Clear,
}

/// Export local data
#[derive(Args, Debug)]
pub struct ExportCmd {
    /// Destination file (stdout when omitted)
    pub path: Option<PathBuf>,
}

/// Import local data
#[derive(Args, Debug)]
pub struct ImportCmd {
    /// Backup file to import
    #[arg(required = true)]
    pub path: PathBuf,
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print a preformatted line (non-JSON mode only)
    pub fn line(&self, text: impl std::fmt::Display) {
        if !self.json {
            println!("{}", text);
        }
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet and JSON modes)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Pages are 1-based; zero is the one value clap's u32 accepts that the
/// API rejects outright
pub fn validate_page(page: u32) -> Result<u32, &'static str> {
    if page == 0 {
        Err("page must be 1 or greater")
    } else {
        Ok(page)
    }
}

// =============================================================================
// Tests
// =============================================================================
