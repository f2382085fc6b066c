use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::{Error, Result};

fn video_id_regex() -> &'static Regex {
    static VIDEO_ID_REGEX: OnceLock<Regex> = OnceLock::new();
    VIDEO_ID_REGEX.get_or_init(|| {
        Regex::new(
            r"(?:https?://)?(?:www\.)?(?:m\.)?(?:youtube\.com/watch\?v=|youtube\.com/embed/|youtu\.be/)([A-Za-z0-9_-]{6,})",
        )
        .expect("Failed to compile video id regex")
    })
}

/// Extract a video id from the common watch, embed and short-link URL shapes.
pub fn parse_video_id(url: &str) -> Option<&str> {
    video_id_regex()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Like [`parse_video_id`], failing with `Error::InvalidInput`.
pub fn require_video_id(url: &str) -> Result<&str> {
    parse_video_id(url).ok_or_else(|| Error::InvalidInput(url.to_owned()))
}

/// Canonical watch URL for a video id.
pub fn video_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Resolve CLI inputs into URLs.
///
/// A single input naming an existing file is read as one URL per line (blank lines dropped);
/// anything else is taken as a list of URLs.
pub fn load_urls(inputs: &[String]) -> Result<Vec<String>> {
    if let [single] = inputs {
        let path = Path::new(single);
        if path.is_file() {
            let content = std::fs::read_to_string(path).map_err(|err| {
                Error::msg(format!("failed to read URL list '{}': {err}", path.display()))
            })?;
            return Ok(content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect());
        }
    }

    Ok(inputs.to_vec())
}
