use std::io::Write;

use crate::record_writer::{RecordWriter, Row};
use crate::{Error, Result};

/// A `RecordWriter` that writes one compact JSON object per line.
///
/// Every line, including the last, ends with `\n`. Unlike the JSON array writer this one
/// may be fed several batches; lines simply accumulate.
pub struct NdjsonRecordWriter<W: Write> {
    w: W,
    closed: bool,
}

impl<W: Write> NdjsonRecordWriter<W> {
    pub fn new(w: W) -> Self {
        Self { w, closed: false }
    }
}

impl<W: Write> RecordWriter for NdjsonRecordWriter<W> {
    fn write_rows(&mut self, rows: &[Row]) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write rows: writer is already closed"));
        }

        for row in rows {
            serde_json::to_writer(&mut self.w, row)?;
            self.w.write_all(b"\n")?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}
