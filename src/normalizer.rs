//! Conversion of raw caption segments into the payload shape a run asked for.

use serde::Serialize;

use crate::Result;
use crate::caption_format::CaptionFormat;
use crate::segments::{Segment, TimedSegment};
use crate::xml::to_xml;

/// Normalized caption output attached to a record.
///
/// Serialized untagged, so `captions` holds a plain array or string in every export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// `array`: one text per segment, empty strings kept.
    Texts(Vec<String>),

    /// `array_with_timestamps`.
    Timed(Vec<TimedSegment>),

    /// `xml` and `xml_with_timestamps`.
    Xml(String),

    /// `one_line_text`.
    Line(String),
}

impl Payload {
    pub fn as_texts(&self) -> Option<&[String]> {
        match self {
            Payload::Texts(texts) => Some(texts),
            _ => None,
        }
    }

    pub fn as_timed(&self) -> Option<&[TimedSegment]> {
        match self {
            Payload::Timed(timed) => Some(timed),
            _ => None,
        }
    }

    /// The string body of an XML or one-line payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Payload::Xml(s) | Payload::Line(s) => Some(s),
            _ => None,
        }
    }
}

/// Convert `segments` into the payload for `format`.
///
/// Only `array_with_timestamps` can fail, with `Error::MissingField`.
pub fn normalize(segments: &[Segment], format: CaptionFormat) -> Result<Payload> {
    let payload = match format {
        CaptionFormat::Array => Payload::Texts(texts(segments)),
        CaptionFormat::ArrayWithTimestamps => Payload::Timed(timed(segments)?),
        CaptionFormat::Xml => Payload::Xml(to_xml(segments, false)),
        CaptionFormat::XmlWithTimestamps => Payload::Xml(to_xml(segments, true)),
        CaptionFormat::OneLineText => Payload::Line(one_line_text(segments)),
    };
    Ok(payload)
}

/// Like [`normalize`], but resolves the format from its name first.
///
/// Unknown names fail with `Error::UnsupportedFormat` before any segment is looked at.
pub fn normalize_named(segments: &[Segment], format: &str) -> Result<Payload> {
    let format: CaptionFormat = format.parse()?;
    normalize(segments, format)
}

/// One text per segment, missing text as `""`.
pub fn texts(segments: &[Segment]) -> Vec<String> {
    segments
        .iter()
        .map(|seg| seg.text_or_empty().to_owned())
        .collect()
}

/// Every segment validated into a `TimedSegment`, in input order.
pub fn timed(segments: &[Segment]) -> Result<Vec<TimedSegment>> {
    segments
        .iter()
        .enumerate()
        .map(|(index, seg)| seg.timed(index))
        .collect()
}

/// Join all non-blank segment texts into one line.
///
/// Line breaks inside a segment become spaces; blank segments add no separator.
pub fn one_line_text(segments: &[Segment]) -> String {
    let mut out = String::new();
    for seg in segments {
        let flattened = seg.text_or_empty().replace("\r\n", " ").replace('\n', " ");
        let token = flattened.trim();
        if token.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}
