use std::io::Write;

use crate::db::{CellValue, ExecOutcome, RowSink};
use crate::error::TabliteError;

/// Streams a result set as tab-separated values.
///
/// The header row is held pending until the first data row arrives, so a
/// query with an empty result set produces no output lines at all. Every
/// record is flushed as soon as it is written, so a piped consumer sees
/// rows incrementally.
pub struct TsvWriter<W: Write> {
    writer: csv::Writer<W>,
    no_header: bool,
    pending_header: Option<Vec<String>>,
    rows_written: usize,
}

impl<W: Write> TsvWriter<W> {
    pub fn new(out: W, no_header: bool) -> Self {
        let writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(out);
        Self {
            writer,
            no_header,
            pending_header: None,
            rows_written: 0,
        }
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W, TabliteError> {
        self.writer
            .into_inner()
            .map_err(|e| TabliteError::Output(e.into_error().into()))
    }
}

impl<W: Write> RowSink for TsvWriter<W> {
    fn columns(&mut self, names: &[String]) -> Result<(), TabliteError> {
        if !self.no_header {
            self.pending_header = Some(names.to_vec());
        }
        Ok(())
    }

    fn row(&mut self, cells: &[CellValue]) -> Result<(), TabliteError> {
        if let Some(names) = self.pending_header.take() {
            self.writer.write_record(&names)?;
        }
        self.writer
            .write_record(cells.iter().map(CellValue::as_field))?;
        self.writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }
}

/// Render an exec outcome as the tool reports mutations: one line for the
/// affected-row count, and a second for the last insert ID when one was
/// obtained.
pub fn write_exec_outcome<W: Write>(
    out: &mut W,
    outcome: &ExecOutcome,
) -> Result<(), TabliteError> {
    writeln!(out, "Rows Affected: {}", outcome.rows_affected)?;
    if let Some(id) = outcome.last_insert_id {
        writeln!(out, "Last Insert ID: {id}")?;
    }
    out.flush()?;
    Ok(())
}
