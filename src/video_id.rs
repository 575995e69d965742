use url::Url;

use crate::{Error, Result};

const VIDEO_ID_LEN: usize = 11;

/// Resolve a YouTube URL (or a bare video id) to its video id.
///
/// Accepted shapes:
/// - `https://www.youtube.com/watch?v=ID` (also `m.`, `music.` and scheme-less forms)
/// - `https://youtu.be/ID`
/// - `https://www.youtube.com/{shorts,embed,live,v}/ID`
/// - `ID` on its own
pub fn extract_video_id(input: &str) -> Result<String> {
    let input = input.trim();
    if is_video_id(input) {
        return Ok(input.to_owned());
    }

    let url = parse_loose(input).ok_or_else(|| Error::InvalidVideoUrl(input.to_owned()))?;
    let host = url.host_str().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);

    let candidate = match host {
        "youtu.be" => url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .map(str::to_owned),
        "youtube.com" | "m.youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            id_from_youtube_path(&url)
        }
        _ => None,
    };

    candidate
        .filter(|id| is_video_id(id))
        .ok_or_else(|| Error::InvalidVideoUrl(input.to_owned()))
}

fn id_from_youtube_path(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?;
    match segments.next()? {
        "watch" => url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned()),
        "shorts" | "embed" | "live" | "v" => segments.next().map(str::to_owned),
        _ => None,
    }
}

/// Parse `input` as a URL, assuming `https://` when no scheme was given.
fn parse_loose(input: &str) -> Option<Url> {
    match Url::parse(input) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{input}")).ok()
        }
        Err(_) => None,
    }
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
