use clap::Parser;
use std::path::PathBuf;

use crate::build_info::BuildInfo;

const AFTER_HELP: &str = "\
Examples:
  tablite ./films.sqlite 'SELECT * FROM actor'
  tablite --no-header ./films.sqlite 'SELECT * FROM actor'
  tablite ./films.sqlite 'DELETE FROM actor WHERE first_name = ?' Kubla
  tablite --exec ./films.sqlite 'VACUUM'
  tablite https://example.com/films.sqlite 'SELECT count(*) FROM actor'
  tablite --create ./new.sqlite

A statement that starts with SELECT prints its rows as tab-separated
values. Any other statement prints the count of rows affected (and the
last insert ID if applicable).";

#[derive(Parser, Debug)]
#[command(
    name = "tablite",
    about = "Runs a single SQL statement against a SQLite database and prints TSV",
    version = Box::leak(BuildInfo::from_env().render().into_boxed_str()) as &'static str,
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Database file path, or an http(s) URL to fetch first
    pub locator: Option<String>,

    /// SQL statement to execute
    pub sql: Option<String>,

    /// Positional parameters bound to `?` placeholders, in order
    pub params: Vec<String>,

    /// Suppress the header row in query output
    #[arg(long, env = "TABLITE_NO_HEADER")]
    pub no_header: bool,

    /// Force exec-mode: report rows affected instead of printing rows
    #[arg(short = 'e', long, env = "TABLITE_EXEC")]
    pub exec: bool,

    /// Create a new SQLite database at the given path and exit
    #[arg(long, value_name = "PATH")]
    pub create: Option<PathBuf>,

    /// HTTP timeout in seconds when fetching a remote database
    #[arg(short = 't', long, env = "TABLITE_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Path to config file
    #[arg(short = 'c', long, env = "TABLITE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit diagnostics to stderr
    #[arg(short = 'v', long, env = "TABLITE_VERBOSE")]
    pub verbose: bool,
}
