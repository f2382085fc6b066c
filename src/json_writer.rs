use std::io::Write;

use crate::record_writer::{RecordWriter, Row};
use crate::{Error, Result};

/// A `RecordWriter` that writes all rows as one pretty-printed JSON array.
///
/// Non-ASCII text is written as UTF-8, not as `\u` escapes.
///
/// Example output:
/// ```json
/// [
///   {
///     "videoId": "vid1",
///     "captions": ["Hi"]
///   }
/// ]
/// ```
pub struct JsonRecordWriter<W: Write> {
    w: W,

    /// Whether the array has been written. A second batch would produce two documents.
    written: bool,

    closed: bool,
}

impl<W: Write> JsonRecordWriter<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            written: false,
            closed: false,
        }
    }
}

impl<W: Write> RecordWriter for JsonRecordWriter<W> {
    fn write_rows(&mut self, rows: &[Row]) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write rows: writer is already closed"));
        }
        if self.written {
            return Err(Error::msg(
                "cannot write rows: JSON array has already been written",
            ));
        }

        serde_json::to_writer_pretty(&mut self.w, rows)?;
        self.written = true;
        Ok(())
    }

    /// Flush the underlying writer. An unwritten writer still emits `[]`.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        if !self.written {
            self.w.write_all(b"[]")?;
            self.written = true;
        }
        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().expect("object row")
    }

    #[test]
    fn writes_pretty_array_with_raw_unicode() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut w = JsonRecordWriter::new(&mut out);
        w.write_rows(&[row(json!({"videoId": "vid1", "title": "Überraschung ✓"}))])?;
        w.close()?;

        let s = std::str::from_utf8(&out)?;
        assert!(s.starts_with("[\n  {\n    \"videoId\": \"vid1\""));
        assert!(s.contains("Überraschung ✓"));
        assert!(!s.contains("\\u"));
        Ok(())
    }

    #[test]
    fn close_without_rows_emits_empty_array() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut w = JsonRecordWriter::new(&mut out);
        w.close()?;
        w.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "[]");
        Ok(())
    }

    #[test]
    fn second_batch_is_rejected() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut w = JsonRecordWriter::new(&mut out);
        w.write_rows(&[])?;
        let err = w.write_rows(&[]).unwrap_err();
        assert!(err.to_string().contains("already been written"));
        Ok(())
    }
}
