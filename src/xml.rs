//! Minimal caption XML (not TTML/WebVTT).
//!
//! Example output with timestamps:
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <captions>
//!   <c start="0.00" end="1.50">Hello</c>
//! </captions>
//! ```

use crate::segments::Segment;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Serialize segments into a `<captions>` document with one `<c>` element per segment.
///
/// Timestamps are fixed-point with two decimals and fall back to `0.00` when absent.
/// Output is a pure function of the input.
pub fn to_xml(segments: &[Segment], with_timestamps: bool) -> String {
    let mut out = String::with_capacity(64 + segments.len() * 48);
    out.push_str(XML_DECLARATION);
    out.push_str("\n<captions>");

    for seg in segments {
        let text = escape_xml(seg.text_or_empty());
        if with_timestamps {
            let start = seg.start.unwrap_or(0.0);
            let end = seg.end.unwrap_or(0.0);
            out.push_str(&format!(
                "\n  <c start=\"{start:.2}\" end=\"{end:.2}\">{text}</c>"
            ));
        } else {
            out.push_str(&format!("\n  <c>{text}</c>"));
        }
    }

    out.push_str("\n</captions>");
    out
}

/// Escape the five XML special characters.
pub fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}
