use crate::Result;
use crate::metadata::VideoMetadata;
use crate::segments::Segment;

/// Captions fetched for one video.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub segments: Vec<Segment>,

    /// Language code of the track actually chosen.
    pub language: String,

    /// Whether the track came from automatic speech recognition.
    pub auto_generated: bool,
}

/// Source of descriptive video fields.
///
/// Best-effort: implementations log their own failures and return
/// `VideoMetadata::default()` rather than an error.
pub trait MetadataProvider: Send + Sync {
    fn video_metadata(&self, video_id: &str) -> VideoMetadata;
}

/// Source of time-coded captions.
///
/// Disabled or missing captions, as well as transport failures, are reported as
/// `Error::ProviderFailure` and end up in that video's record.
pub trait CaptionSource: Send + Sync {
    fn fetch_captions(
        &self,
        video_id: &str,
        preferred_language: Option<&str>,
    ) -> Result<CaptionTrack>;
}

/// Everything [`crate::Harvester`] needs for one video, looked up in a single call.
///
/// Backends that get metadata and caption tracks from the same request implement
/// this directly so each video costs one lookup. A `(MetadataProvider, CaptionSource)`
/// pair implements it by asking each half in turn.
pub trait VideoSource: Send + Sync {
    fn lookup(
        &self,
        video_id: &str,
        preferred_language: Option<&str>,
    ) -> (VideoMetadata, Result<CaptionTrack>);
}

impl<M, C> VideoSource for (M, C)
where
    M: MetadataProvider,
    C: CaptionSource,
{
    fn lookup(
        &self,
        video_id: &str,
        preferred_language: Option<&str>,
    ) -> (VideoMetadata, Result<CaptionTrack>) {
        let metadata = self.0.video_metadata(video_id);
        (metadata, self.1.fetch_captions(video_id, preferred_language))
    }
}

impl<T: VideoSource + ?Sized> VideoSource for &T {
    fn lookup(
        &self,
        video_id: &str,
        preferred_language: Option<&str>,
    ) -> (VideoMetadata, Result<CaptionTrack>) {
        (**self).lookup(video_id, preferred_language)
    }
}

impl<T: MetadataProvider + ?Sized> MetadataProvider for &T {
    fn video_metadata(&self, video_id: &str) -> VideoMetadata {
        (**self).video_metadata(video_id)
    }
}

impl<T: CaptionSource + ?Sized> CaptionSource for &T {
    fn fetch_captions(
        &self,
        video_id: &str,
        preferred_language: Option<&str>,
    ) -> Result<CaptionTrack> {
        (**self).fetch_captions(video_id, preferred_language)
    }
}
