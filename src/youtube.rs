//! YouTube transcript source.
//!
//! Retrieval happens in two requests:
//! 1. The watch page, which embeds the player response JSON. Its `captions` section lists the
//!    caption tracks with a signed `baseUrl` each.
//! 2. The chosen track's `baseUrl` with `fmt=json3`, which returns timed events as JSON.
//!
//! Parsing is kept separate from the HTTP calls so it can be tested against captured payloads.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::segments::RawCaption;
use crate::source::{Track, TranscriptSource};
use crate::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://www.youtube.com";
const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse = ";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches caption tracks from youtube.com with a blocking HTTP client.
pub struct YouTubeSource {
    client: Client,
    base_url: String,
}

impl YouTubeSource {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the source at a different origin (a mirror or a local test server).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| Error::Fetch(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn get_text(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            // Skips the EU cookie consent interstitial.
            .header(COOKIE, "CONSENT=YES+cb")
            .send()
            .map_err(|err| Error::Fetch(format!("request failed: {err}")))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::Fetch("rate limited by YouTube (HTTP 429)".to_owned()));
        }
        if !status.is_success() {
            return Err(Error::Fetch(format!("unexpected HTTP status {status}")));
        }

        resp.text()
            .map_err(|err| Error::Fetch(format!("failed to read response body: {err}")))
    }
}

impl TranscriptSource for YouTubeSource {
    fn list_tracks(&self, video_id: &str) -> Result<Vec<Track>> {
        let url = format!("{}/watch?v={video_id}", self.base_url);
        debug!(%url, "fetching watch page");

        let html = self.get_text(&url)?;
        let player = extract_player_response(&html)?;
        tracks_from_player_response(video_id, player)
    }

    fn fetch_captions(&self, track: &Track) -> Result<Vec<RawCaption>> {
        let url = json3_url(track)?;

        debug!(language = %track.language_code, "fetching caption track");
        let body = self.get_text(url.as_str())?;
        parse_json3(&body)
    }
}

/// The track's caption URL with its `fmt` parameter replaced by `fmt=json3`.
fn json3_url(track: &Track) -> Result<Url> {
    let mut url = Url::parse(&track.url)
        .map_err(|err| Error::Fetch(format!("invalid caption track URL: {err}")))?;
    let query: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "fmt")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(query)
        .append_pair("fmt", "json3");
    Ok(url)
}

// -----------------------------------------------------------------------------
// Player response
// -----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PlayerResponse {
    playability_status: PlayabilityStatus,
    captions: Option<Captions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TracklistRenderer {
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    #[serde(default)]
    name: TrackName,
    #[serde(default)]
    kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TrackName {
    simple_text: Option<String>,
    runs: Vec<TextRun>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl TrackName {
    fn into_text(self) -> Option<String> {
        self.simple_text
            .or_else(|| self.runs.into_iter().next().map(|run| run.text))
    }
}

/// Pull the embedded `ytInitialPlayerResponse` object out of a watch page.
fn extract_player_response(html: &str) -> Result<PlayerResponse> {
    let Some(start) = html.find(PLAYER_RESPONSE_MARKER) else {
        if html.contains("class=\"g-recaptcha\"") {
            return Err(Error::Fetch(
                "YouTube is asking for a captcha; too many requests from this IP".to_owned(),
            ));
        }
        return Err(Error::Fetch("watch page has no player response".to_owned()));
    };

    // The object is followed by `;var ...` or `;</script>`; the streaming deserializer stops at
    // the end of the first complete JSON value, so we don't need to find the terminator.
    let rest = &html[start + PLAYER_RESPONSE_MARKER.len()..];
    let mut values = serde_json::Deserializer::from_str(rest).into_iter::<PlayerResponse>();
    match values.next() {
        Some(Ok(player)) => Ok(player),
        Some(Err(err)) => Err(Error::Fetch(format!("malformed player response: {err}"))),
        None => Err(Error::Fetch("empty player response".to_owned())),
    }
}

fn tracks_from_player_response(video_id: &str, player: PlayerResponse) -> Result<Vec<Track>> {
    let renderer = player
        .captions
        .and_then(|captions| captions.player_captions_tracklist_renderer);

    let Some(renderer) = renderer else {
        let status = &player.playability_status;
        if status.status != "OK" {
            debug!(
                video_id,
                status = %status.status,
                reason = status.reason.as_deref().unwrap_or_default(),
                "video not playable"
            );
            return Err(Error::VideoNotFound(video_id.to_owned()));
        }
        return Err(Error::TranscriptsDisabled(video_id.to_owned()));
    };

    if renderer.caption_tracks.is_empty() {
        return Err(Error::TranscriptsDisabled(video_id.to_owned()));
    }

    let tracks = renderer
        .caption_tracks
        .into_iter()
        .map(|track| {
            let is_generated = track.kind.as_deref() == Some("asr");
            Track {
                name: track
                    .name
                    .into_text()
                    .unwrap_or_else(|| track.language_code.clone()),
                language_code: track.language_code,
                is_generated,
                url: track.base_url,
            }
        })
        .collect();

    Ok(tracks)
}

// -----------------------------------------------------------------------------
// json3 caption payload
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    /// Set on events that only append a line break to the previous cue.
    #[serde(default)]
    a_append: u8,
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Convert a `fmt=json3` caption payload into raw caption entries.
///
/// Window/style events (no `segs`) and line-break append events are skipped; every other
/// event becomes one caption in payload order.
fn parse_json3(body: &str) -> Result<Vec<RawCaption>> {
    let payload: Json3 = serde_json::from_str(body)
        .map_err(|err| Error::Fetch(format!("malformed caption payload: {err}")))?;

    let mut captions = Vec::with_capacity(payload.events.len());
    for event in payload.events {
        if event.a_append != 0 {
            continue;
        }
        let Some(segs) = event.segs else {
            continue;
        };

        let text: String = segs.iter().map(|seg| seg.utf8.as_str()).collect();
        captions.push(RawCaption {
            text,
            start: event.t_start_ms as f64 / 1000.0,
            duration: event.d_duration_ms as f64 / 1000.0,
        });
    }

    if captions.is_empty() {
        warn!("caption payload contained no text events");
    }

    Ok(captions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATCH_PAGE: &str = r#"<html><script>var ytInitialPlayerResponse = {"playabilityStatus":{"status":"OK"},"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=de","name":{"simpleText":"German"},"languageCode":"de"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=en&kind=asr&fmt=srv3","name":{"runs":[{"text":"English (auto-generated)"}]},"languageCode":"en","kind":"asr"}]}}};var meta = {"a": 1};</script></html>"#;

    #[test]
    fn extracts_tracks_from_watch_page() -> anyhow::Result<()> {
        let player = extract_player_response(WATCH_PAGE)?;
        let tracks = tracks_from_player_response("dQw4w9WgXcQ", player)?;

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].language_code, "de");
        assert_eq!(tracks[0].name, "German");
        assert!(!tracks[0].is_generated);
        assert_eq!(tracks[1].language_code, "en");
        assert_eq!(tracks[1].name, "English (auto-generated)");
        assert!(tracks[1].is_generated);
        assert!(tracks[1].url.contains("lang=en"));
        Ok(())
    }

    #[test]
    fn missing_captions_on_playable_video_means_disabled() -> anyhow::Result<()> {
        let html = r#"ytInitialPlayerResponse = {"playabilityStatus":{"status":"OK"}};"#;
        let player = extract_player_response(html)?;
        let err = tracks_from_player_response("dQw4w9WgXcQ", player).unwrap_err();
        assert!(matches!(err, Error::TranscriptsDisabled(_)));
        Ok(())
    }

    #[test]
    fn unplayable_video_is_not_found() -> anyhow::Result<()> {
        let html = r#"ytInitialPlayerResponse = {"playabilityStatus":{"status":"ERROR","reason":"Video unavailable"}};"#;
        let player = extract_player_response(html)?;
        let err = tracks_from_player_response("dQw4w9WgXcQ", player).unwrap_err();
        assert!(matches!(err, Error::VideoNotFound(ref id) if id == "dQw4w9WgXcQ"));
        Ok(())
    }

    #[test]
    fn page_without_player_response_is_a_fetch_error() {
        let err = extract_player_response("<html></html>").unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));

        let err = extract_player_response(r#"<div class="g-recaptcha"></div>"#).unwrap_err();
        assert!(err.to_string().contains("captcha"));
    }

    #[test]
    fn parses_json3_events_in_order() -> anyhow::Result<()> {
        let body = r#"{
            "wireMagic": "pb3",
            "events": [
                {"tStartMs": 0, "dDurationMs": 120000, "id": 1, "wpWinPosId": 1},
                {"tStartMs": 65000, "dDurationMs": 3500, "segs": [{"utf8": "Hi"}, {"utf8": " there"}]},
                {"tStartMs": 68500, "dDurationMs": 10, "aAppend": 1, "segs": [{"utf8": "\n"}]},
                {"tStartMs": 68510, "dDurationMs": 1490, "segs": [{"utf8": "again"}]}
            ]
        }"#;

        let captions = parse_json3(body)?;
        assert_eq!(
            captions,
            vec![
                RawCaption::new("Hi there", 65.0, 3.5),
                RawCaption::new("again", 68.51, 1.49),
            ]
        );
        Ok(())
    }

    #[test]
    fn caption_url_requests_json3() -> anyhow::Result<()> {
        let player = extract_player_response(WATCH_PAGE)?;
        let tracks = tracks_from_player_response("dQw4w9WgXcQ", player)?;

        let url = json3_url(&tracks[1])?;
        let fmts: Vec<String> = url
            .query_pairs()
            .filter(|(key, _)| key == "fmt")
            .map(|(_, value)| value.into_owned())
            .collect();
        assert_eq!(fmts, vec!["json3"]);
        assert_eq!(
            url.as_str(),
            "https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=en&kind=asr&fmt=json3"
        );

        let url = json3_url(&tracks[0])?;
        assert!(url.as_str().ends_with("lang=de&fmt=json3"));
        Ok(())
    }

    #[test]
    fn invalid_caption_url_is_a_fetch_error() {
        let track = Track {
            language_code: "en".to_owned(),
            name: "English".to_owned(),
            is_generated: false,
            url: "not a url".to_owned(),
        };
        assert!(matches!(json3_url(&track).unwrap_err(), Error::Fetch(_)));
    }

    #[test]
    fn malformed_json3_is_a_fetch_error() {
        let err = parse_json3("<transcript/>").unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() -> anyhow::Result<()> {
        let source = YouTubeSource::with_base_url("http://127.0.0.1:9/")?;
        assert_eq!(source.base_url, "http://127.0.0.1:9");
        Ok(())
    }
}
