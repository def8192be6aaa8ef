//! tablite runs a single SQL statement against a SQLite database file and
//! prints the result: SELECT-style queries as tab-separated rows, mutating
//! statements as a rows-affected summary. The database may also be fetched
//! from an HTTP(S) URL first, or created fresh with `--create`.

pub mod app;
pub mod build_info;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod fetch;
pub mod format;
pub mod output;
