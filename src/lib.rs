//! `ytcaptions`: caption extraction and multi-format export for batches of YouTube videos.
//!
//! This crate provides:
//! - Caption normalization into five payload shapes (see [`CaptionFormat`])
//! - A minimal caption XML assembler
//! - A fixed-schema [`Record`] per video
//! - Export of record batches to JSON, NDJSON and CSV
//!
//! Fetching is behind the [`VideoSource`] trait, or a [`MetadataProvider`] and
//! [`CaptionSource`] pair; the `ytdlp` feature adds an implementation backed by the
//! `yt-dlp` executable.

mod error;

// High-level API (most consumers should start here).
pub mod harvester;
pub mod opts;

// Caption data and normalization.
pub mod caption_format;
pub mod normalizer;
pub mod segments;
pub mod xml;

// Per-video output schema and its inputs.
pub mod metadata;
pub mod record;
pub mod url;

// Provider interfaces.
pub mod provider;
#[cfg(feature = "ytdlp")]
pub mod ytdlp;

// Export of record batches.
pub mod csv_writer;
pub mod export;
pub mod json_writer;
pub mod ndjson_writer;
pub mod record_writer;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub use caption_format::CaptionFormat;
pub use error::{Error, INVALID_URL, Result};
pub use export::ExportCoordinator;
pub use harvester::Harvester;
pub use metadata::VideoMetadata;
pub use normalizer::{Payload, normalize};
pub use opts::{ExportKind, LogLevel, Opts};
pub use provider::{CaptionSource, CaptionTrack, MetadataProvider, VideoSource};
pub use record::{CANONICAL_FIELDS, Record, RecordInput, build_record};
pub use segments::{Segment, TimedSegment};
pub use xml::to_xml;
#[cfg(feature = "ytdlp")]
pub use ytdlp::YtDlpClient;
