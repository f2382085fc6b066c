//! Metadata and caption provider backed by the `yt-dlp` executable.
//!
//! `yt-dlp --dump-json` gives us both the descriptive fields and the list of caption
//! tracks; the chosen track is then downloaded in YouTube's `json3` timed-text format.

use std::path::PathBuf;
use std::process::Command;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::metadata::{VideoMetadata, upload_date_to_iso};
use crate::provider::{CaptionTrack, VideoSource};
use crate::segments::Segment;
use crate::url::video_url;
use crate::{Error, Result};

const CAPTION_EXT: &str = "json3";
const ORIGINAL_SUFFIX: &str = "-orig";

/// Talks to `yt-dlp` for metadata and to YouTube's timed-text endpoint for captions.
pub struct YtDlpClient {
    binary: PathBuf,
    http: Client,
}

impl YtDlpClient {
    /// Use `yt-dlp` from `PATH`.
    pub fn new() -> Result<Self> {
        Self::with_binary("yt-dlp")
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|err| Error::msg(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            binary: binary.into(),
            http,
        })
    }

    fn dump_info(&self, video_id: &str) -> Result<Value> {
        let output = Command::new(&self.binary)
            .arg("--dump-json")
            .arg("--skip-download")
            .arg("--no-warnings")
            .arg("--no-playlist")
            .arg(video_url(video_id))
            .output()
            .map_err(|err| {
                Error::provider(format!(
                    "failed to run '{}': {err}",
                    self.binary.display()
                ))
            })?;

        if !output.status.success() {
            return Err(Error::provider(format!(
                "yt-dlp failed for {video_id}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        serde_json::from_slice(&output.stdout).map_err(|err| {
            Error::provider(format!("unreadable yt-dlp output for {video_id}: {err}"))
        })
    }

    fn download(&self, url: &str) -> Result<String> {
        self.http
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(|err| Error::provider(format!("caption download failed: {err}")))
    }
}

impl VideoSource for YtDlpClient {
    /// One `yt-dlp` extraction feeds both the metadata and the track choice.
    fn lookup(
        &self,
        video_id: &str,
        preferred_language: Option<&str>,
    ) -> (VideoMetadata, Result<CaptionTrack>) {
        match self.dump_info(video_id) {
            Ok(info) => (
                metadata_from_info(&info),
                self.captions_from_info(video_id, &info, preferred_language),
            ),
            Err(err) => {
                warn!(video_id, error = %err, "yt-dlp extraction failed");
                (VideoMetadata::default(), Err(err))
            }
        }
    }
}

impl YtDlpClient {
    fn captions_from_info(
        &self,
        video_id: &str,
        info: &Value,
        preferred_language: Option<&str>,
    ) -> Result<CaptionTrack> {
        let choice = select_track(info, preferred_language)
            .ok_or_else(|| Error::provider(format!("No transcript found for {video_id}")))?;
        debug!(
            video_id,
            language = %choice.language,
            auto_generated = choice.auto_generated,
            "Selected caption track"
        );

        let body = self.download(&choice.url)?;
        let segments = parse_json3(&body)?;

        Ok(CaptionTrack {
            segments,
            language: choice.language,
            auto_generated: choice.auto_generated,
        })
    }
}

/// Map `yt-dlp --dump-json` fields onto `VideoMetadata`.
pub fn metadata_from_info(info: &Value) -> VideoMetadata {
    let text = |key: &str| info.get(key).and_then(Value::as_str).map(str::to_owned);

    VideoMetadata {
        title: text("title"),
        uploader: text("uploader"),
        channel_id: text("channel_id"),
        duration: match info.get("duration") {
            Some(Value::Number(n)) => Some(n.clone()),
            _ => None,
        },
        upload_date_iso: info
            .get("upload_date")
            .and_then(Value::as_str)
            .and_then(upload_date_to_iso),
        thumbnail: text("thumbnail"),
    }
}

/// A caption track picked from the `yt-dlp` info document.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackChoice {
    pub language: String,
    pub auto_generated: bool,
    pub url: String,
}

/// Pick the track to download.
///
/// Order: preferred language (manual), preferred language (auto-generated in that
/// spoken language), first manual track, then the original-language auto track or
/// the first auto track that is not a machine translation.
pub fn select_track(info: &Value, preferred_language: Option<&str>) -> Option<TrackChoice> {
    let manual = track_map(info, "subtitles");
    let auto = track_map(info, "automatic_captions");

    if let Some(lang) = preferred_language {
        if let Some(url) = manual.and_then(|m| json3_url(m, lang)) {
            return Some(choice(lang, false, url));
        }
        if let Some(url) = auto.and_then(|m| spoken_url(m, lang)) {
            return Some(choice(lang, true, url));
        }
    }

    if let Some(manual) = manual {
        let first = manual
            .keys()
            .filter(|lang| lang.as_str() != "live_chat")
            .find_map(|lang| json3_url(manual, lang).map(|url| (lang.as_str(), url)));
        if let Some((lang, url)) = first {
            return Some(choice(lang, false, url));
        }
    }

    let auto = auto?;
    let original = auto.keys().find_map(|key| {
        let lang = key.strip_suffix(ORIGINAL_SUFFIX)?;
        json3_url(auto, key)
            .filter(|url| !is_translation(url))
            .map(|url| (lang, url))
    });
    let (lang, url) = original.or_else(|| {
        auto.keys().find_map(|key| {
            json3_url(auto, key)
                .filter(|url| !is_translation(url))
                .map(|url| (key.as_str(), url))
        })
    })?;
    Some(choice(lang, true, url))
}

/// Auto-generated track for `lang` as spoken, skipping machine translations.
fn spoken_url<'a>(tracks: &'a Map<String, Value>, lang: &str) -> Option<&'a str> {
    [format!("{lang}{ORIGINAL_SUFFIX}"), lang.to_owned()]
        .iter()
        .find_map(|key| json3_url(tracks, key).filter(|url| !is_translation(url)))
}

/// YouTube serves translated captions with a `tlang` query parameter.
fn is_translation(url: &str) -> bool {
    url.split_once('?').is_some_and(|(_, query)| {
        query
            .split('&')
            .any(|pair| pair.split('=').next() == Some("tlang"))
    })
}

fn choice(language: &str, auto_generated: bool, url: &str) -> TrackChoice {
    TrackChoice {
        language: language.to_owned(),
        auto_generated,
        url: url.to_owned(),
    }
}

fn track_map<'a>(info: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    info.get(key).and_then(Value::as_object)
}

fn json3_url<'a>(tracks: &'a Map<String, Value>, lang: &str) -> Option<&'a str> {
    tracks
        .get(lang)?
        .as_array()?
        .iter()
        .find(|fmt| fmt.get("ext").and_then(Value::as_str) == Some(CAPTION_EXT))
        .and_then(|fmt| fmt.get("url"))
        .and_then(Value::as_str)
}

#[derive(Debug, Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: f64,
    #[serde(default)]
    d_duration_ms: f64,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Turn a `json3` timed-text document into segments.
///
/// Times are converted to seconds and rounded to two decimals; events without any
/// text (window setup, bare line breaks) are dropped.
pub fn parse_json3(body: &str) -> Result<Vec<Segment>> {
    let doc: Json3 = serde_json::from_str(body)
        .map_err(|err| Error::provider(format!("unreadable caption document: {err}")))?;

    let segments = doc
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|seg| seg.utf8.as_str()).collect();
            if text.trim().is_empty() {
                return None;
            }
            let start = event.t_start_ms / 1000.0;
            let end = start + event.d_duration_ms / 1000.0;
            Some(Segment::new(round2(start), round2(end), text))
        })
        .collect();

    Ok(segments)
}

fn round2(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn info() -> Value {
        json!({
            "title": "T1",
            "uploader": "Ch1",
            "channel_id": "C1",
            "duration": 60,
            "upload_date": "20240131",
            "thumbnail": "http://i.ytimg.com/vi/vid1/hqdefault.jpg",
            "subtitles": {
                "live_chat": [{"ext": "json", "url": "https://chat"}],
                "de": [
                    {"ext": "vtt", "url": "https://subs/de.vtt"},
                    {"ext": "json3", "url": "https://subs/de.json3"}
                ]
            },
            "automatic_captions": {
                "af": [{"ext": "json3", "url": "https://auto/tt?v=vid1&tlang=af"}],
                "en-orig": [{"ext": "json3", "url": "https://auto/tt?v=vid1"}],
                "en": [{"ext": "json3", "url": "https://auto/tt?v=vid1&lang=en"}],
                "fr": [{"ext": "json3", "url": "https://auto/tt?v=vid1&tlang=fr"}]
            }
        })
    }

    #[test]
    fn maps_metadata_fields() {
        let meta = metadata_from_info(&info());
        assert_eq!(meta.title.as_deref(), Some("T1"));
        assert_eq!(meta.uploader.as_deref(), Some("Ch1"));
        assert_eq!(meta.duration, Some(serde_json::Number::from(60_u64)));
        assert_eq!(meta.upload_date_iso.as_deref(), Some("2024-01-31T00:00:00Z"));
    }

    #[test]
    fn keeps_fractional_duration() {
        let meta = metadata_from_info(&json!({"duration": 61.5}));
        assert_eq!(meta.duration.and_then(|d| d.as_f64()), Some(61.5));
        assert_eq!(metadata_from_info(&json!({"duration": "60"})).duration, None);
    }

    #[test]
    fn prefers_manual_track_in_preferred_language() {
        let picked = select_track(&info(), Some("de")).expect("track");
        assert_eq!(picked, choice("de", false, "https://subs/de.json3"));
    }

    #[test]
    fn falls_back_to_spoken_auto_track_in_preferred_language() {
        let picked = select_track(&info(), Some("en")).expect("track");
        assert_eq!(picked, choice("en", true, "https://auto/tt?v=vid1"));
    }

    #[test]
    fn translated_auto_track_is_never_the_preferred_match() {
        let picked = select_track(&info(), Some("fr")).expect("track");
        assert_eq!(picked.language, "de");
        assert!(!picked.auto_generated);

        let mut info = info();
        info["subtitles"] = json!({});
        let picked = select_track(&info, Some("fr")).expect("track");
        assert_eq!(picked, choice("en", true, "https://auto/tt?v=vid1"));
    }

    #[test]
    fn falls_back_to_original_auto_track() {
        let mut info = info();
        info["subtitles"] = json!({});
        let picked = select_track(&info, None).expect("track");
        assert_eq!(picked, choice("en", true, "https://auto/tt?v=vid1"));
    }

    #[test]
    fn without_original_marker_takes_first_untranslated_auto_track() {
        let mut info = info();
        info["subtitles"] = json!({});
        if let Some(auto) = info["automatic_captions"].as_object_mut() {
            auto.remove("en-orig");
        }
        let picked = select_track(&info, None).expect("track");
        assert_eq!(picked, choice("en", true, "https://auto/tt?v=vid1&lang=en"));
    }

    #[test]
    fn only_translations_selects_nothing() {
        let info = json!({
            "automatic_captions": {
                "fr": [{"ext": "json3", "url": "https://auto/tt?tlang=fr&v=vid1"}]
            }
        });
        assert_eq!(select_track(&info, Some("fr")), None);
    }

    #[test]
    fn detects_translation_urls() {
        assert!(is_translation("https://auto/tt?v=x&tlang=fr"));
        assert!(is_translation("https://auto/tt?tlang=fr"));
        assert!(!is_translation("https://auto/tt?v=x&lang=fr"));
        assert!(!is_translation("https://auto/tlang=fr"));
    }

    #[test]
    fn no_tracks_selects_nothing() {
        assert_eq!(select_track(&json!({"title": "x"}), Some("en")), None);
    }

    #[test]
    fn missing_binary_fails_captions_and_empties_metadata() -> anyhow::Result<()> {
        let client = YtDlpClient::with_binary("/nonexistent/yt-dlp")?;
        let (meta, track) = client.lookup("vid1", None);
        assert_eq!(meta, VideoMetadata::default());
        assert!(matches!(track, Err(Error::ProviderFailure(_))));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn lookup_runs_one_extraction_per_video() -> anyhow::Result<()> {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir()?;
        let script = dir.path().join("yt-dlp");
        fs::write(
            &script,
            "#!/bin/sh\n\
             echo call >> \"$(dirname \"$0\")/calls\"\n\
             printf '%s\\n' '{\"title\":\"T1\",\"duration\":60}'\n",
        )?;
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;

        let client = YtDlpClient::with_binary(&script)?;
        let (meta, track) = client.lookup("vid1", Some("en"));

        assert_eq!(meta.title.as_deref(), Some("T1"));
        assert_eq!(meta.duration, Some(serde_json::Number::from(60_u64)));
        assert!(matches!(
            track,
            Err(Error::ProviderFailure(msg)) if msg == "No transcript found for vid1"
        ));
        let calls = fs::read_to_string(dir.path().join("calls"))?;
        assert_eq!(calls.lines().count(), 1);
        Ok(())
    }

    #[test]
    fn parses_json3_events() -> anyhow::Result<()> {
        let body = r#"{
            "events": [
                {"tStartMs": 0, "dDurationMs": 5000},
                {"tStartMs": 120, "dDurationMs": 1504, "segs": [{"utf8": "Hello"}, {"utf8": " there"}]},
                {"tStartMs": 1624, "dDurationMs": 10, "segs": [{"utf8": "\n"}]},
                {"tStartMs": 1700, "dDurationMs": 2333, "segs": [{"utf8": "A&B"}]}
            ]
        }"#;
        let segments = parse_json3(body)?;
        assert_eq!(
            segments,
            vec![
                Segment::new(0.12, 1.62, "Hello there"),
                Segment::new(1.7, 4.03, "A&B"),
            ]
        );
        Ok(())
    }

    #[test]
    fn unreadable_json3_is_provider_failure() {
        assert!(matches!(
            parse_json3("<transcript/>"),
            Err(Error::ProviderFailure(_))
        ));
    }
}
