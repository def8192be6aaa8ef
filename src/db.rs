use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, InterruptHandle, OpenFlags};

use crate::error::TabliteError;

/// A single cell of a result row. The variant is decided once per value
/// when the row is read; formatting never inspects driver types again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Null,
}

impl CellValue {
    /// The textual form used in TSV output. SQL NULL renders as an
    /// empty field.
    pub fn as_field(&self) -> &str {
        match self {
            CellValue::Text(s) => s,
            CellValue::Null => "",
        }
    }

    fn from_value_ref(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => CellValue::Null,
            ValueRef::Integer(v) => CellValue::Text(v.to_string()),
            ValueRef::Real(v) => CellValue::Text(v.to_string()),
            ValueRef::Text(v) => CellValue::Text(String::from_utf8_lossy(v).into_owned()),
            ValueRef::Blob(v) => CellValue::Text(String::from_utf8_lossy(v).into_owned()),
        }
    }
}

/// Receives a streamed result set, one row at a time.
pub trait RowSink {
    /// Called once with the column names, before any row.
    fn columns(&mut self, names: &[String]) -> Result<(), TabliteError>;

    /// Called per result row, in result order. Every row has exactly as
    /// many cells as there are column names.
    fn row(&mut self, cells: &[CellValue]) -> Result<(), TabliteError>;
}

/// Outcome of a mutating statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    pub rows_affected: usize,
    /// Only present when the engine reports a positive rowid for this
    /// connection, i.e. after an INSERT.
    pub last_insert_id: Option<i64>,
}

/// An open connection to one SQLite database file. Opened and dropped
/// exactly once per invocation.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    locator: String,
}

impl Database {
    /// Open an existing database file. The file must already exist; use
    /// [`create`] to make a new one.
    pub fn open(path: &Path, locator: &str) -> Result<Self, TabliteError> {
        if !path.exists() {
            return Err(TabliteError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|e| TabliteError::Open {
            locator: locator.to_string(),
            source: e,
        })?;
        Ok(Self {
            conn,
            locator: locator.to_string(),
        })
    }

    /// Handle for aborting an in-flight statement from another thread.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.conn.get_interrupt_handle()
    }

    /// Run a query, streaming each row into `sink` as it is read. The
    /// result set is never buffered. Returns the number of rows streamed.
    pub fn query<S: RowSink>(
        &self,
        sql: &str,
        params: &[String],
        sink: &mut S,
    ) -> Result<usize, TabliteError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| self.statement_error(e))?;

        let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        sink.columns(&names)?;
        let column_count = names.len();

        let mut rows = stmt
            .query(params_from_iter(params.iter()))
            .map_err(|e| self.statement_error(e))?;

        let mut streamed = 0;
        let mut cells = Vec::with_capacity(column_count);
        while let Some(row) = rows.next().map_err(|e| self.statement_error(e))? {
            cells.clear();
            for idx in 0..column_count {
                let value = row.get_ref(idx).map_err(|e| self.statement_error(e))?;
                cells.push(CellValue::from_value_ref(value));
            }
            sink.row(&cells)?;
            streamed += 1;
        }
        Ok(streamed)
    }

    /// Run a mutating statement with bound parameters. The last-insert-id
    /// is best effort: when the engine has nothing to report it is simply
    /// omitted, never an error.
    pub fn exec(&self, sql: &str, params: &[String]) -> Result<ExecOutcome, TabliteError> {
        let rows_affected = self
            .conn
            .execute(sql, params_from_iter(params.iter()))
            .map_err(|e| self.statement_error(e))?;
        let id = self.conn.last_insert_rowid();
        Ok(ExecOutcome {
            rows_affected,
            last_insert_id: (id > 0).then_some(id),
        })
    }

    /// Round-trip connectivity check.
    pub fn ping(&self) -> Result<(), TabliteError> {
        self.conn
            .query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|e| self.statement_error(e))
    }

    fn statement_error(&self, source: rusqlite::Error) -> TabliteError {
        if is_interrupt(&source) {
            return TabliteError::Cancelled;
        }
        TabliteError::Statement {
            locator: self.locator.clone(),
            source,
        }
    }
}

fn is_interrupt(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::OperationInterrupted
    )
}

/// Create a new (empty) database file at `path` and verify it is
/// reachable. Returns the absolute path of the created file.
pub fn create(path: &Path) -> Result<PathBuf, TabliteError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let conn = Connection::open(&absolute).map_err(|e| TabliteError::Open {
        locator: absolute.display().to_string(),
        source: e,
    })?;
    conn.query_row("SELECT 1", [], |_| Ok(()))
        .map_err(|e| TabliteError::Statement {
            locator: absolute.display().to_string(),
            source: e,
        })?;
    Ok(absolute)
}
