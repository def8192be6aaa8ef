use std::io::Write;
use std::path::PathBuf;

use tempfile::TempDir;
use tokio::task;
use tokio_util::sync::CancellationToken;

use crate::config::{Action, Invocation, Locator, Mode};
use crate::db::{self, Database};
use crate::error::TabliteError;
use crate::fetch;
use crate::format::{self, TsvWriter};
use crate::output::{diag, Timer};

/// File name for databases fetched from a URL, used when the response
/// offers nothing better.
const DEFAULT_FETCH_NAME: &str = "database.sqlite";

/// Run one resolved action to completion, writing results to `out`.
///
/// All blocking database work happens on the blocking pool; the token is
/// observed by the HTTP fetch and, through the connection's interrupt
/// handle, by in-flight statements.
pub async fn run<W>(action: Action, out: W, token: CancellationToken) -> Result<(), TabliteError>
where
    W: Write + Send + 'static,
{
    match action {
        Action::Create { path } => create_database(path, out).await,
        Action::Statement(invocation) => run_statement(invocation, out, token).await,
    }
}

async fn create_database<W>(path: PathBuf, mut out: W) -> Result<(), TabliteError>
where
    W: Write + Send + 'static,
{
    task::spawn_blocking(move || -> Result<(), TabliteError> {
        let absolute = db::create(&path)?;
        writeln!(out, "Created SQLite DB: {}", absolute.display())?;
        out.flush()?;
        Ok(())
    })
    .await
    .map_err(join_error)?
}

async fn run_statement<W>(
    invocation: Invocation,
    out: W,
    token: CancellationToken,
) -> Result<(), TabliteError>
where
    W: Write + Send + 'static,
{
    if token.is_cancelled() {
        return Err(TabliteError::Cancelled);
    }

    let verbose = invocation.verbose;

    // The temp dir owning a fetched database must outlive the statement.
    let (db_path, locator_label, _fetch_dir) = match &invocation.locator {
        Locator::Path(path) => (path.clone(), path.display().to_string(), None),
        Locator::Url(url) => {
            let dir = TempDir::new()?;
            diag(verbose, &format!("downloading {url}..."));
            let timer = Timer::start();
            let downloaded = fetch::download(
                url,
                dir.path(),
                Some(DEFAULT_FETCH_NAME),
                invocation.timeout_secs,
                &token,
            )
            .await?;
            if downloaded.bytes == 0 {
                return Err(TabliteError::EmptyDownload { url: url.clone() });
            }
            diag(
                verbose,
                &format!(
                    "downloaded {} bytes ({}ms)",
                    downloaded.bytes,
                    timer.elapsed_ms()
                ),
            );
            (downloaded.path, url.clone(), Some(dir))
        }
    };

    diag(verbose, &format!("opening {locator_label}..."));
    let database = {
        let label = locator_label.clone();
        task::spawn_blocking(move || Database::open(&db_path, &label))
            .await
            .map_err(join_error)??
    };

    // The watcher's only job is to relay the token into the engine once.
    let interrupt = database.interrupt_handle();
    let watcher = tokio::spawn({
        let token = token.clone();
        async move {
            token.cancelled().await;
            interrupt.interrupt();
        }
    });

    let mode = invocation.mode;
    diag(verbose, "executing statement...");
    let timer = Timer::start();
    let result = task::spawn_blocking(move || -> Result<usize, TabliteError> {
        match invocation.mode {
            Mode::Query => {
                let mut sink = TsvWriter::new(out, invocation.no_header);
                database.query(&invocation.sql, &invocation.params, &mut sink)
            }
            Mode::Exec => {
                let mut out = out;
                let outcome = database.exec(&invocation.sql, &invocation.params)?;
                format::write_exec_outcome(&mut out, &outcome)?;
                Ok(outcome.rows_affected)
            }
        }
    })
    .await
    .map_err(join_error)?;
    watcher.abort();

    match (&result, mode) {
        (Ok(rows), Mode::Query) => diag(
            verbose,
            &format!("query complete ({}ms, {} rows)", timer.elapsed_ms(), rows),
        ),
        (Ok(rows), Mode::Exec) => diag(
            verbose,
            &format!(
                "exec complete ({}ms, {} rows affected)",
                timer.elapsed_ms(),
                rows
            ),
        ),
        (Err(_), _) => {}
    }

    result.map(|_| ())
}

fn join_error(err: task::JoinError) -> TabliteError {
    TabliteError::Internal {
        message: format!("worker task failed: {err}"),
    }
}
