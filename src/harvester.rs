//! High-level API for turning a list of video URLs into records.
//!
//! `Harvester` wires URL parsing → video lookup → normalization → record building.
//! Every per-video failure ends up inside that video's record; a run only stops early on
//! configuration errors, which are rejected before any work starts.

use std::thread;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::metadata::VideoMetadata;
use crate::normalizer::{Payload, normalize};
use crate::opts::Opts;
use crate::provider::{CaptionSource, CaptionTrack, MetadataProvider, VideoSource};
use crate::record::{Record, RecordInput, build_record};
use crate::url::require_video_id;
use crate::Result;

/// Owns the video source and run options, and processes URLs into records.
///
/// Typical usage:
/// - Construct once with the providers for the run.
/// - Call `run` with the full URL list, then hand the records to an `ExportCoordinator`.
pub struct Harvester<S> {
    source: S,
    opts: Opts,
}

impl<M, C> Harvester<(M, C)>
where
    M: MetadataProvider,
    C: CaptionSource,
{
    /// Pair a metadata provider with a caption source.
    pub fn new(metadata: M, captions: C, opts: Opts) -> Self {
        Self::from_source((metadata, captions), opts)
    }
}

impl<S: VideoSource> Harvester<S> {
    pub fn from_source(source: S, opts: Opts) -> Self {
        Self { source, opts }
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Process every URL, `batch_size()` at a time, returning records in input order.
    ///
    /// URLs within a batch run concurrently. `on_record` sees each record as its batch
    /// completes, which is enough for progress reporting.
    pub fn run<F>(&self, urls: &[String], mut on_record: F) -> Vec<Record>
    where
        F: FnMut(&Record),
    {
        let batch_size = self.opts.batch_size();
        let mut records = Vec::with_capacity(urls.len());

        for (batch_index, batch) in urls.chunks(batch_size).enumerate() {
            let first = batch_index * batch_size + 1;
            info!(
                "Processing batch {}..{} / {}",
                first,
                first + batch.len() - 1,
                urls.len()
            );

            for record in self.process_batch(batch) {
                on_record(&record);
                records.push(record);
            }
        }

        records
    }

    fn process_batch(&self, batch: &[String]) -> Vec<Record> {
        thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|url| (url, scope.spawn(move || self.process_url(url))))
                .collect();

            handles
                .into_iter()
                .map(|(url, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        warn!(url = %url, "worker panicked while processing video");
                        self.failed_record("", url, &VideoMetadata::default(), "worker panicked")
                    })
                })
                .collect()
        })
    }

    /// Build the record for a single URL. Never fails; failures are recorded in `error`.
    pub fn process_url(&self, url: &str) -> Record {
        let started = Instant::now();

        let video_id = match require_video_id(url) {
            Ok(video_id) => video_id,
            Err(err) => {
                warn!(url, "Unable to parse video id from URL");
                return self.failed_record("", url, &VideoMetadata::default(), &err.record_code());
            }
        };

        let (metadata, track) = self.source.lookup(video_id, self.opts.language.as_deref());

        let record = match track.and_then(|track| self.normalize_track(video_id, track)) {
            Ok((track, payload)) => build_record(RecordInput {
                video_id,
                video_url: url,
                metadata: &metadata,
                language: Some(&track.language),
                has_auto_captions: Some(track.auto_generated),
                format: self.opts.caption_format,
                payload: Some(payload),
                error: None,
            }),
            Err(err) => {
                warn!(video_id, error = %err, "Caption extraction failed");
                self.failed_record(video_id, url, &metadata, &err.record_code())
            }
        };

        info!(
            video_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Processed video"
        );
        record
    }

    fn normalize_track(
        &self,
        video_id: &str,
        track: CaptionTrack,
    ) -> Result<(CaptionTrack, Payload)> {
        debug!(
            video_id,
            segments = track.segments.len(),
            language = %track.language,
            "Fetched caption segments"
        );

        let payload = normalize(&track.segments, self.opts.caption_format)?;
        Ok((track, payload))
    }

    fn failed_record(
        &self,
        video_id: &str,
        url: &str,
        metadata: &VideoMetadata,
        error: &str,
    ) -> Record {
        build_record(RecordInput {
            video_id,
            video_url: url,
            metadata,
            language: None,
            has_auto_captions: None,
            format: self.opts.caption_format,
            payload: None,
            error: Some(error.to_owned()),
        })
    }
}
