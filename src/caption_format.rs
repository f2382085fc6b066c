use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The supported shapes for a record's caption payload.
///
/// Integration notes:
/// - `ValueEnum` (behind the `cli` feature) lets clap reject unknown names before a run starts.
/// - `FromStr` is the library-side equivalent and fails with `Error::UnsupportedFormat`.
/// - The serialized form is the snake_case name written into `captionFormat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[cfg_attr(feature = "cli", value(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum CaptionFormat {
    /// Ordered list of caption texts.
    Array,

    /// Ordered list of `{start, end, text}` objects.
    #[default]
    ArrayWithTimestamps,

    /// Minimal XML document without timing.
    Xml,

    /// Minimal XML document with `start`/`end` attributes.
    XmlWithTimestamps,

    /// All caption text joined into a single line.
    OneLineText,
}

impl CaptionFormat {
    pub const ALL: [CaptionFormat; 5] = [
        CaptionFormat::Array,
        CaptionFormat::ArrayWithTimestamps,
        CaptionFormat::Xml,
        CaptionFormat::XmlWithTimestamps,
        CaptionFormat::OneLineText,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CaptionFormat::Array => "array",
            CaptionFormat::ArrayWithTimestamps => "array_with_timestamps",
            CaptionFormat::Xml => "xml",
            CaptionFormat::XmlWithTimestamps => "xml_with_timestamps",
            CaptionFormat::OneLineText => "one_line_text",
        }
    }
}

impl fmt::Display for CaptionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptionFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaptionFormat::ALL
            .into_iter()
            .find(|fmt| fmt.as_str() == s)
            .ok_or_else(|| Error::UnsupportedFormat(s.to_owned()))
    }
}
