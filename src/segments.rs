//! Caption segments as handed over by a caption source.
//!
//! Providers are loose about types (numeric strings for times, numbers for text), so
//! `Segment` keeps every field optional and accepts those shapes. Formats that need
//! complete timing data go through [`Segment::timed`], which is the one place a
//! missing field turns into a typed error.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// One time-coded unit of caption text, as produced by a caption source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds.
    #[serde(
        default,
        deserialize_with = "lenient_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub start: Option<f64>,

    /// End time in seconds. Expected to be `>= start`.
    #[serde(
        default,
        deserialize_with = "lenient_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub end: Option<f64>,

    /// Caption text; may contain embedded line breaks.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<String>,
}

/// A segment with every field present, as emitted by `array_with_timestamps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            text: Some(text.into()),
        }
    }

    /// A segment without timing information.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            start: None,
            end: None,
            text: Some(text.into()),
        }
    }

    /// The caption text, or `""` when the source gave none.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Validate that start, end and text are all present.
    ///
    /// `index` is the segment's position in its sequence and only feeds the error.
    pub fn timed(&self, index: usize) -> Result<TimedSegment> {
        let start = self.start.ok_or(Error::MissingField {
            index,
            field: "start",
        })?;
        let end = self.end.ok_or(Error::MissingField {
            index,
            field: "end",
        })?;
        let text = self.text.clone().ok_or(Error::MissingField {
            index,
            field: "text",
        })?;

        Ok(TimedSegment { start, end, text })
    }
}

/// Accept seconds as a JSON number or a numeric string.
///
/// Seconds must be finite and non-negative.
fn lenient_seconds<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(None),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| de::Error::custom(format!("seconds out of range: {n}")))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("expected seconds, got {s:?}")))?,
        other => return Err(de::Error::custom(format!("expected seconds, got {other}"))),
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(de::Error::custom(format!(
            "seconds must be finite and non-negative, got {seconds}"
        )));
    }
    Ok(Some(seconds))
}

/// Accept text as a string, or coerce numbers and booleans to their string form.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(de::Error::custom(format!("expected text, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_numeric_strings_and_non_string_text() -> anyhow::Result<()> {
        let seg: Segment = serde_json::from_str(r#"{"start":"1.25","end":2,"text":42}"#)?;
        assert_eq!(seg.start, Some(1.25));
        assert_eq!(seg.end, Some(2.0));
        assert_eq!(seg.text.as_deref(), Some("42"));
        Ok(())
    }

    #[test]
    fn absent_and_null_fields_become_none() -> anyhow::Result<()> {
        let seg: Segment = serde_json::from_str(r#"{"text":null}"#)?;
        assert_eq!(seg, Segment::default());
        assert_eq!(seg.text_or_empty(), "");
        Ok(())
    }

    #[test]
    fn rejects_non_numeric_seconds() {
        let res = serde_json::from_str::<Segment>(r#"{"start":"soon","end":1,"text":"x"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn rejects_non_finite_and_negative_seconds() {
        for raw in [
            r#"{"start":"NaN","end":1,"text":"x"}"#,
            r#"{"start":0,"end":"inf","text":"x"}"#,
            r#"{"start":"-infinity","end":1,"text":"x"}"#,
            r#"{"start":-0.5,"end":1,"text":"x"}"#,
            r#"{"start":0,"end":"-2","text":"x"}"#,
        ] {
            assert!(serde_json::from_str::<Segment>(raw).is_err(), "{raw}");
        }

        let zero: Segment = serde_json::from_str(r#"{"start":"0","end":0.0,"text":"x"}"#)
            .expect("zero seconds are valid");
        assert_eq!(zero.start, Some(0.0));
    }

    #[test]
    fn timed_requires_every_field() {
        let err = Segment::text_only("hi").timed(3).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingField {
                index: 3,
                field: "start"
            }
        ));

        let mut seg = Segment::new(0.0, 1.0, "hi");
        seg.text = None;
        assert!(matches!(
            seg.timed(0).unwrap_err(),
            Error::MissingField { field: "text", .. }
        ));
    }

    #[test]
    fn timed_keeps_values() -> anyhow::Result<()> {
        let timed = Segment::new(1.5, 3.0, "world!").timed(0)?;
        assert_eq!(
            timed,
            TimedSegment {
                start: 1.5,
                end: 3.0,
                text: "world!".to_owned()
            }
        );
        Ok(())
    }
}
