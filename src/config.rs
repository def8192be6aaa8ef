use directories::ProjectDirs;
use serde::Deserialize;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::error::TabliteError;

/// How the SQL text is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Expect a result set and print rows.
    Query,
    /// Expect a mutation count rather than rows.
    Exec,
}

impl Mode {
    /// `--exec` always wins; otherwise a statement whose trimmed text
    /// starts with SELECT (case-insensitive) runs as a query and
    /// everything else as exec.
    pub fn detect(sql: &str, force_exec: bool) -> Self {
        if force_exec {
            return Mode::Exec;
        }
        let trimmed = sql.trim_start();
        let is_select = trimmed
            .get(..6)
            .is_some_and(|head| head.eq_ignore_ascii_case("select"));
        if is_select {
            Mode::Query
        } else {
            Mode::Exec
        }
    }
}

/// The database source: a local file or a URL to fetch first.
#[derive(Debug, Clone)]
pub enum Locator {
    Path(PathBuf),
    Url(String),
}

impl Locator {
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Locator::Url(raw.to_string())
        } else {
            Locator::Path(PathBuf::from(raw))
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Path(path) => write!(f, "{}", path.display()),
            Locator::Url(url) => write!(f, "{url}"),
        }
    }
}

/// One fully resolved run of the tool. Built once, immutable thereafter.
#[derive(Debug)]
pub struct Invocation {
    pub locator: Locator,
    pub sql: String,
    pub params: Vec<String>,
    pub mode: Mode,
    pub no_header: bool,
    pub timeout_secs: u64,
    pub verbose: bool,
}

/// What this process should do, decided entirely from the arguments.
#[derive(Debug)]
pub enum Action {
    /// `--create` short-circuits everything else.
    Create { path: PathBuf },
    Statement(Invocation),
}

// --- TOML config file structs ---

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    #[serde(default)]
    defaults: TomlDefaults,
}

#[derive(Debug, Deserialize, Default)]
struct TomlDefaults {
    no_header: Option<bool>,
    timeout: Option<u64>,
    verbose: Option<bool>,
}

/// Config path resolution result. An explicitly given path that is
/// missing is an error; a missing auto-resolved platform path is not.
struct ResolvedConfigPath {
    path: PathBuf,
    explicit: bool,
}

/// Resolve the config file path: --config flag > env var > platform default.
fn resolve_config_path(cli_config: Option<&PathBuf>) -> Option<ResolvedConfigPath> {
    if let Some(path) = cli_config {
        return Some(ResolvedConfigPath {
            path: path.clone(),
            explicit: true,
        });
    }
    if let Ok(path) = std::env::var("TABLITE_CONFIG") {
        return Some(ResolvedConfigPath {
            path: PathBuf::from(path),
            explicit: true,
        });
    }
    ProjectDirs::from("", "", "tablite").map(|dirs| ResolvedConfigPath {
        path: dirs.config_dir().join("config.toml"),
        explicit: false,
    })
}

/// Load and parse the TOML config file (if it exists).
fn load_toml_config(resolved: Option<&ResolvedConfigPath>) -> Result<TomlConfig, TabliteError> {
    let resolved = match resolved {
        Some(r) => r,
        None => return Ok(TomlConfig::default()),
    };

    if !resolved.path.exists() {
        if resolved.explicit {
            return Err(TabliteError::Config {
                message: format!("config file not found: {}", resolved.path.display()),
            });
        }
        return Ok(TomlConfig::default());
    }

    let content =
        std::fs::read_to_string(&resolved.path).map_err(|e| TabliteError::Config {
            message: format!("cannot read config file {}: {}", resolved.path.display(), e),
        })?;

    toml::from_str(&content).map_err(|e| TabliteError::Config {
        message: format!("invalid config file {}: {}", resolved.path.display(), e),
    })
}

/// Build the Action for this run from parsed CLI arguments.
///
/// Flag resolution order is CLI > env (clap handles env binding) > TOML
/// `[defaults]` > built-in default.
pub fn load_from_args(cli: &Cli) -> Result<Action, TabliteError> {
    if let Some(path) = &cli.create {
        return Ok(Action::Create { path: path.clone() });
    }

    let (locator, sql) = match (&cli.locator, &cli.sql) {
        (Some(locator), Some(sql)) => (locator.as_str(), sql.as_str()),
        _ => return Err(TabliteError::InvalidArgs),
    };

    let resolved_path = resolve_config_path(cli.config.as_ref());
    let toml_config = load_toml_config(resolved_path.as_ref())?;

    let sql = sql.trim().to_string();
    let mode = Mode::detect(&sql, cli.exec);

    // timeout: CLI/ENV > TOML > 60
    let timeout_secs = cli
        .timeout
        .unwrap_or_else(|| toml_config.defaults.timeout.unwrap_or(60));

    // booleans: CLI/ENV OR TOML default
    let no_header = cli.no_header || toml_config.defaults.no_header.unwrap_or(false);
    let verbose = cli.verbose || toml_config.defaults.verbose.unwrap_or(false);

    Ok(Action::Statement(Invocation {
        locator: Locator::parse(locator),
        sql,
        params: cli.params.clone(),
        mode,
        no_header,
        timeout_secs,
        verbose,
    }))
}
