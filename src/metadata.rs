use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Best-effort descriptive fields for one video.
///
/// Every field is optional; a provider that failed hands back `VideoMetadata::default()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub title: Option<String>,

    /// Channel display name.
    #[serde(default)]
    pub uploader: Option<String>,

    #[serde(default)]
    pub channel_id: Option<String>,

    /// Duration in seconds, kept as the provider wrote it (`60` stays an integer).
    #[serde(default)]
    pub duration: Option<Number>,

    /// ISO-8601 publish timestamp, `None` when the provider's date was unparseable.
    #[serde(default)]
    pub upload_date_iso: Option<String>,

    /// Thumbnail URL.
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Convert a `YYYYMMDD` upload date into `YYYY-MM-DDT00:00:00Z`.
pub fn upload_date_to_iso(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y%m%d")
        .ok()
        .map(|date| date.format("%Y-%m-%dT00:00:00Z").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_compact_upload_date() {
        assert_eq!(
            upload_date_to_iso("20240131").as_deref(),
            Some("2024-01-31T00:00:00Z")
        );
    }

    #[test]
    fn unparseable_upload_date_is_none() {
        assert_eq!(upload_date_to_iso("2024-01-31"), None);
        assert_eq!(upload_date_to_iso("20241341"), None);
        assert_eq!(upload_date_to_iso(""), None);
    }

    #[test]
    fn absent_keys_deserialize_as_none() -> anyhow::Result<()> {
        let meta: VideoMetadata = serde_json::from_str(r#"{"title":"T1"}"#)?;
        assert_eq!(meta.title.as_deref(), Some("T1"));
        assert_eq!(meta.duration, None);

        let whole: VideoMetadata = serde_json::from_str(r#"{"duration":60}"#)?;
        assert_eq!(serde_json::to_string(&whole.duration)?, "60");

        let empty: VideoMetadata = serde_json::from_str("{}")?;
        assert_eq!(empty, VideoMetadata::default());
        Ok(())
    }
}
