use std::borrow::Cow;
use std::io::Write;

use serde_json::Value;

use crate::record::CANONICAL_FIELDS;
use crate::record_writer::{RecordWriter, Row};
use crate::{Error, Result};

/// A `RecordWriter` that flattens rows into RFC-4180 style CSV.
///
/// Column rules:
/// - Columns are the union of all row keys, in order of first appearance.
/// - With no rows at all, the canonical record header is written so the file is never headerless.
/// - Arrays and objects are written as compact JSON inside a single cell; null is an empty cell.
pub struct CsvRecordWriter<W: Write> {
    w: W,

    /// Header used when a batch has no rows.
    fallback_header: &'static [&'static str],

    written: bool,
    closed: bool,
}

impl<W: Write> CsvRecordWriter<W> {
    /// A writer that falls back to the record schema header.
    pub fn new(w: W) -> Self {
        Self::with_fallback_header(w, &CANONICAL_FIELDS)
    }

    pub fn with_fallback_header(w: W, fallback_header: &'static [&'static str]) -> Self {
        Self {
            w,
            fallback_header,
            written: false,
            closed: false,
        }
    }

    fn write_line<'a>(&mut self, cells: impl IntoIterator<Item = Cow<'a, str>>) -> Result<()> {
        let mut line = String::new();
        for (i, cell) in cells.into_iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            push_escaped(&mut line, &cell);
        }
        line.push_str("\r\n");
        self.w.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl<W: Write> RecordWriter for CsvRecordWriter<W> {
    fn write_rows(&mut self, rows: &[Row]) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write rows: writer is already closed"));
        }
        if self.written {
            return Err(Error::msg("cannot write rows: CSV has already been written"));
        }

        if rows.is_empty() {
            let header = self.fallback_header;
            self.write_line(header.iter().map(|name| Cow::Borrowed(*name)))?;
            self.written = true;
            return Ok(());
        }

        let columns = column_union(rows);
        self.write_line(columns.iter().map(|name| Cow::Borrowed(name.as_str())))?;

        for row in rows {
            let cells = columns
                .iter()
                .map(|name| row.get(name).map_or(Ok(Cow::Borrowed("")), cell_text))
                .collect::<Result<Vec<_>>>()?;
            self.write_line(cells)?;
        }

        self.written = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        if !self.written {
            self.write_rows(&[])?;
        }
        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}

/// Keys of the first row in order, then any new keys from later rows as first seen.
pub fn column_union(rows: &[Row]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Render one value as cell text, before quoting.
fn cell_text(value: &Value) -> Result<Cow<'_, str>> {
    let text = match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Array(_) | Value::Object(_) => Cow::Owned(serde_json::to_string(value)?),
    };
    Ok(text)
}

/// Quote a cell when it holds a comma, a quote or a line break; quotes are doubled.
fn push_escaped(line: &mut String, cell: &str) {
    let needs_quotes = cell.contains([',', '"', '\n', '\r']);
    if !needs_quotes {
        line.push_str(cell);
        return;
    }

    line.push('"');
    for ch in cell.chars() {
        if ch == '"' {
            line.push('"');
        }
        line.push(ch);
    }
    line.push('"');
}
