//! The fixed output schema: one `Record` per requested video.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::caption_format::CaptionFormat;
use crate::metadata::VideoMetadata;
use crate::normalizer::Payload;
use crate::{Error, Result};

/// Record keys in schema order.
///
/// Written as the CSV header when there are no records; must match `Record`'s fields.
pub const CANONICAL_FIELDS: [&str; 15] = [
    "videoId",
    "videoUrl",
    "title",
    "channelId",
    "channelName",
    "language",
    "hasAutoCaptions",
    "captionFormat",
    "captions",
    "duration",
    "publishedAt",
    "thumbnailUrl",
    "requestedFormat",
    "error",
    "createdAt",
];

/// One fully assembled output row.
///
/// Construct through [`build_record`] so `captions` and `error` stay mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub video_id: String,
    pub video_url: String,
    pub title: Option<String>,
    pub channel_id: Option<String>,
    pub channel_name: Option<String>,
    pub language: Option<String>,
    pub has_auto_captions: Option<bool>,
    pub caption_format: CaptionFormat,
    pub captions: Option<Payload>,
    pub duration: Option<Number>,
    pub published_at: Option<String>,
    pub thumbnail_url: Option<String>,
    pub requested_format: CaptionFormat,
    pub error: Option<String>,
    pub created_at: String,
}

impl Record {
    /// The record as an ordered JSON object keyed by `CANONICAL_FIELDS`.
    pub fn to_json_map(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(Error::msg(format!(
                "record serialized to a non-object: {other}"
            ))),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Everything a record is built from, apart from the creation time.
#[derive(Debug, Clone)]
pub struct RecordInput<'a> {
    pub video_id: &'a str,
    pub video_url: &'a str,
    pub metadata: &'a VideoMetadata,
    pub language: Option<&'a str>,
    pub has_auto_captions: Option<bool>,
    pub format: CaptionFormat,
    pub payload: Option<Payload>,
    pub error: Option<String>,
}

/// Build a record stamped with the current UTC time.
pub fn build_record(input: RecordInput<'_>) -> Record {
    build_record_at(input, Utc::now())
}

/// Build a record stamped with `now`.
///
/// A present `error` always drops the payload, whatever the caller passed.
pub fn build_record_at(input: RecordInput<'_>, now: DateTime<Utc>) -> Record {
    let RecordInput {
        video_id,
        video_url,
        metadata,
        language,
        has_auto_captions,
        format,
        payload,
        error,
    } = input;

    let captions = if error.is_some() { None } else { payload };

    Record {
        video_id: video_id.to_owned(),
        video_url: video_url.to_owned(),
        title: metadata.title.clone(),
        channel_id: metadata.channel_id.clone(),
        channel_name: metadata.uploader.clone(),
        language: language.map(str::to_owned),
        has_auto_captions,
        caption_format: format,
        captions,
        duration: metadata.duration.clone(),
        published_at: metadata.upload_date_iso.clone(),
        thumbnail_url: metadata.thumbnail.clone(),
        requested_format: format,
        error,
        created_at: format_created_at(now),
    }
}

/// UTC, second precision, literal `Z`.
pub fn format_created_at(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn metadata() -> VideoMetadata {
        VideoMetadata {
            title: Some("T1".to_owned()),
            uploader: Some("Ch1".to_owned()),
            channel_id: Some("C1".to_owned()),
            duration: Some(Number::from(60_u64)),
            upload_date_iso: Some("2024-01-01T00:00:00Z".to_owned()),
            thumbnail: Some("http://i.ytimg.com/vi/vid1/hqdefault.jpg".to_owned()),
        }
    }

    fn input<'a>(meta: &'a VideoMetadata) -> RecordInput<'a> {
        RecordInput {
            video_id: "vid1",
            video_url: "https://www.youtube.com/watch?v=vid1",
            metadata: meta,
            language: Some("en"),
            has_auto_captions: Some(false),
            format: CaptionFormat::Array,
            payload: Some(Payload::Texts(vec!["Hi".to_owned()])),
            error: None,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 10, 8, 30, 5)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn maps_metadata_into_schema() {
        let meta = metadata();
        let record = build_record_at(input(&meta), fixed_now());

        assert_eq!(record.video_id, "vid1");
        assert_eq!(record.channel_name.as_deref(), Some("Ch1"));
        assert_eq!(record.channel_id.as_deref(), Some("C1"));
        assert_eq!(record.published_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(record.caption_format, CaptionFormat::Array);
        assert_eq!(record.requested_format, CaptionFormat::Array);
        assert_eq!(record.created_at, "2025-11-10T08:30:05Z");
        assert_eq!(record.duration, Some(Number::from(60_u64)));
        assert!(record.captions.is_some());
        assert!(!record.is_error());
    }

    #[test]
    fn error_forces_null_payload() {
        let meta = metadata();
        let mut with_error = input(&meta);
        with_error.error = Some("Transcripts are disabled".to_owned());

        let record = build_record_at(with_error, fixed_now());
        assert!(record.is_error());
        assert_eq!(record.captions, None);
    }

    #[test]
    fn identical_inputs_build_identical_records() {
        let meta = metadata();
        let a = build_record_at(input(&meta), fixed_now());
        let b = build_record_at(input(&meta), fixed_now());
        assert_eq!(a, b);
    }

    #[test]
    fn empty_metadata_yields_nulls() -> anyhow::Result<()> {
        let meta = VideoMetadata::default();
        let record = build_record_at(input(&meta), fixed_now());
        let map = record.to_json_map()?;
        assert_eq!(map["title"], Value::Null);
        assert_eq!(map["duration"], Value::Null);
        assert_eq!(map["thumbnailUrl"], Value::Null);
        Ok(())
    }

    #[test]
    fn created_at_uses_now() {
        let meta = metadata();
        let record = build_record(input(&meta));
        assert!(record.created_at.ends_with('Z'));
        assert_eq!(record.created_at.len(), "2025-11-10T08:30:05Z".len());
    }

    #[test]
    fn canonical_fields_match_serialized_keys() -> anyhow::Result<()> {
        let meta = metadata();
        let map = build_record_at(input(&meta), fixed_now()).to_json_map()?;
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, CANONICAL_FIELDS);
        Ok(())
    }
}
