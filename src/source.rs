//! Transcript sources and track selection.
//!
//! A [`TranscriptSource`] knows how to list the caption tracks of a video and how to fetch the
//! raw captions of one track. [`fetch_transcript`] ties that to the language policy
//! (English, else the first track) and the normalizer.

use serde::Serialize;
use tracing::debug;

use crate::segments::{RawCaption, TranscriptSegment, normalize};
use crate::{Error, Result};

/// A transcript available in one specific language for a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    /// BCP-47-ish language tag as reported by the source (`en`, `en-GB`, `de`).
    pub language_code: String,

    /// Human-readable track name (`English (auto-generated)`).
    pub name: String,

    /// Whether the track was produced by speech recognition rather than uploaded.
    pub is_generated: bool,

    /// Source-specific location of the caption data.
    pub url: String,
}

impl Track {
    /// Whether this track is in English, including regional variants like `en-US`.
    pub fn is_english(&self) -> bool {
        let code = self.language_code.as_str();
        code.eq_ignore_ascii_case("en")
            || code
                .get(..3)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("en-"))
    }
}

/// A fetched transcript: the chosen track and its normalized segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub video_id: String,
    pub track: Track,
    pub segments: Vec<TranscriptSegment>,
}

/// Pluggable transcript retrieval.
///
/// Implementations must report "no such video", "captions disabled" and transport failures as
/// distinct [`Error`] variants so callers can tell them apart.
pub trait TranscriptSource {
    /// List every caption track available for `video_id`, in the source's order.
    fn list_tracks(&self, video_id: &str) -> Result<Vec<Track>>;

    /// Fetch the raw caption entries of one track.
    fn fetch_captions(&self, track: &Track) -> Result<Vec<RawCaption>>;
}

/// Pick the track to fetch: the first English track if any, otherwise the first track.
///
/// This is a single pass with no further fallback chain.
pub fn select_track(tracks: &[Track]) -> Option<&Track> {
    tracks
        .iter()
        .find(|track| track.is_english())
        .or_else(|| tracks.first())
}

/// List tracks for `video_id`, choose one, fetch it, and normalize the result.
///
/// A video without any tracks, or a track without any captions, is
/// [`Error::EmptyTranscript`]. Nothing is retried.
pub fn fetch_transcript<S>(source: &S, video_id: &str) -> Result<Transcript>
where
    S: TranscriptSource + ?Sized,
{
    let tracks = source.list_tracks(video_id)?;
    let track = select_track(&tracks).ok_or(Error::EmptyTranscript)?;
    debug!(
        video_id,
        language = %track.language_code,
        generated = track.is_generated,
        available = tracks.len(),
        "selected caption track"
    );

    let raw = source.fetch_captions(track)?;
    let segments = normalize(&raw)?;

    Ok(Transcript {
        video_id: video_id.to_owned(),
        track: track.clone(),
        segments,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn track(code: &str) -> Track {
        Track {
            language_code: code.to_owned(),
            name: code.to_owned(),
            is_generated: false,
            url: format!("mem://{code}"),
        }
    }

    #[derive(Default)]
    struct MemorySource {
        tracks: Vec<Track>,
        captions: Vec<RawCaption>,
        fetched: RefCell<Vec<String>>,
    }

    impl TranscriptSource for MemorySource {
        fn list_tracks(&self, _video_id: &str) -> Result<Vec<Track>> {
            Ok(self.tracks.clone())
        }

        fn fetch_captions(&self, track: &Track) -> Result<Vec<RawCaption>> {
            self.fetched.borrow_mut().push(track.language_code.clone());
            Ok(self.captions.clone())
        }
    }

    #[test]
    fn select_track_prefers_english() {
        let tracks = vec![track("de"), track("en"), track("fr")];
        assert_eq!(select_track(&tracks).map(|t| t.language_code.as_str()), Some("en"));
    }

    #[test]
    fn select_track_accepts_regional_english() {
        let tracks = vec![track("es"), track("en-GB")];
        assert_eq!(
            select_track(&tracks).map(|t| t.language_code.as_str()),
            Some("en-GB")
        );
    }

    #[test]
    fn select_track_falls_back_to_first() {
        let tracks = vec![track("ja"), track("ko")];
        assert_eq!(select_track(&tracks).map(|t| t.language_code.as_str()), Some("ja"));
        assert!(select_track(&[]).is_none());
    }

    #[test]
    fn is_english_does_not_match_other_en_prefixes() {
        assert!(!track("eng").is_english());
        assert!(!track("e").is_english());
        assert!(track("EN-us").is_english());
    }

    #[test]
    fn fetch_transcript_normalizes_selected_track() -> anyhow::Result<()> {
        let source = MemorySource {
            tracks: vec![track("de"), track("en")],
            captions: vec![RawCaption::new(" Hi ", 65.0, 3.5)],
            ..Default::default()
        };

        let transcript = fetch_transcript(&source, "dQw4w9WgXcQ")?;
        assert_eq!(transcript.video_id, "dQw4w9WgXcQ");
        assert_eq!(transcript.track.language_code, "en");
        assert_eq!(transcript.segments, vec![TranscriptSegment::new("Hi", 65.0, 3.5)]);
        assert_eq!(*source.fetched.borrow(), vec!["en".to_owned()]);
        Ok(())
    }

    #[test]
    fn fetch_transcript_without_tracks_is_empty() {
        let source = MemorySource::default();
        let err = fetch_transcript(&source, "dQw4w9WgXcQ").unwrap_err();
        assert!(matches!(err, Error::EmptyTranscript));
        assert!(source.fetched.borrow().is_empty());
    }

    #[test]
    fn fetch_transcript_with_no_captions_is_empty() {
        let source = MemorySource {
            tracks: vec![track("en")],
            ..Default::default()
        };
        let err = fetch_transcript(&source, "dQw4w9WgXcQ").unwrap_err();
        assert!(matches!(err, Error::EmptyTranscript));
    }
}
