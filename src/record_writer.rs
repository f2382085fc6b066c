use serde_json::{Map, Value};

use crate::Result;

/// One output row: a JSON object whose key order is preserved.
pub type Row = Map<String, Value>;

/// Serializes a complete batch of rows into one output format.
///
/// Every format needs the whole batch up front (the JSON array and the CSV column union),
/// so rows are handed over in a single call rather than one at a time.
pub trait RecordWriter {
    fn write_rows(&mut self, rows: &[Row]) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
