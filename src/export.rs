//! Writing a finished batch of records to disk.
//!
//! The coordinator owns the output directory and base name and produces sibling files
//! `<base>.json`, `<base>.ndjson` and `<base>.csv`. Records are converted to ordered rows
//! once, then handed to the format-specific `RecordWriter`s.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::csv_writer::CsvRecordWriter;
use crate::json_writer::JsonRecordWriter;
use crate::ndjson_writer::NdjsonRecordWriter;
use crate::opts::ExportKind;
use crate::record::Record;
use crate::record_writer::{RecordWriter, Row};
use crate::{Error, Result};

/// Writes record batches into a directory under a shared base name.
#[derive(Debug, Clone)]
pub struct ExportCoordinator {
    out_dir: PathBuf,
    basename: String,
}

impl ExportCoordinator {
    /// Create the coordinator, creating `out_dir` if it does not exist yet.
    pub fn new(out_dir: impl Into<PathBuf>, basename: impl Into<String>) -> Result<Self> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir).map_err(|err| {
            Error::msg(format!(
                "failed to create output directory '{}': {err}",
                out_dir.display()
            ))
        })?;

        Ok(Self {
            out_dir,
            basename: basename.into(),
        })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// `<out_dir>/<basename><suffix>`.
    pub fn path_for(&self, suffix: &str) -> PathBuf {
        self.out_dir.join(format!("{}{suffix}", self.basename))
    }

    pub fn write_json(&self, records: &[Record]) -> Result<PathBuf> {
        let rows = to_rows(records)?;
        self.write_with(".json", &rows, JsonRecordWriter::new)
    }

    pub fn write_ndjson(&self, records: &[Record]) -> Result<PathBuf> {
        let rows = to_rows(records)?;
        self.write_with(".ndjson", &rows, NdjsonRecordWriter::new)
    }

    pub fn write_csv(&self, records: &[Record]) -> Result<PathBuf> {
        let rows = to_rows(records)?;
        self.write_with(".csv", &rows, CsvRecordWriter::new)
    }

    /// Same content as the JSON export, under `<basename>_compact.json`.
    pub fn write_compact_json(&self, records: &[Record]) -> Result<PathBuf> {
        let rows = to_rows(records)?;
        self.write_with("_compact.json", &rows, JsonRecordWriter::new)
    }

    /// Write every file `kind` selects, returning the paths in json, csv, ndjson order.
    pub fn export(&self, records: &[Record], kind: ExportKind) -> Result<Vec<PathBuf>> {
        let rows = to_rows(records)?;
        let mut written = Vec::new();

        if kind.includes_json() {
            written.push(self.write_with(".json", &rows, JsonRecordWriter::new)?);
        }
        if kind.includes_csv() {
            written.push(self.write_with(".csv", &rows, CsvRecordWriter::new)?);
        }
        if kind.includes_ndjson() {
            written.push(self.write_with(".ndjson", &rows, NdjsonRecordWriter::new)?);
        }

        info!(
            records = records.len(),
            files = written.len(),
            out_dir = %self.out_dir.display(),
            "export finished"
        );
        Ok(written)
    }

    fn write_with<E, F>(&self, suffix: &str, rows: &[Row], make: F) -> Result<PathBuf>
    where
        E: RecordWriter,
        F: FnOnce(BufWriter<File>) -> E,
    {
        let path = self.path_for(suffix);
        let file = File::create(&path).map_err(|err| {
            Error::msg(format!("failed to create '{}': {err}", path.display()))
        })?;

        // The file handle is dropped with the writer on every path; close() only flushes.
        let mut writer = make(BufWriter::new(file));
        let run_res = writer.write_rows(rows);
        merge_run_and_close(run_res, writer.close())?;

        debug!(path = %path.display(), rows = rows.len(), "wrote export file");
        Ok(path)
    }
}

/// `youtube_transcripts_<unix seconds>`.
pub fn default_basename(now: DateTime<Utc>) -> String {
    format!("youtube_transcripts_{}", now.timestamp())
}

/// Records as ordered JSON objects.
pub fn to_rows(records: &[Record]) -> Result<Vec<Row>> {
    records.iter().map(Record::to_json_map).collect()
}

fn merge_run_and_close(run_res: Result<()>, close_res: Result<()>) -> Result<()> {
    match (run_res, close_res) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => Err(Error::msg(format!(
            "{err} (closing the writer also failed: {close_err})"
        ))),
    }
}
