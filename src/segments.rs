use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// One caption entry exactly as a transcript source delivered it.
///
/// The field names match the JSON export, so a saved JSON transcript can be read back in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCaption {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl RawCaption {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// One timed unit of transcript text.
///
/// Serializes as `{ "text", "start", "duration" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    #[serde(rename = "start")]
    pub start_seconds: f64,
    #[serde(rename = "duration")]
    pub duration_seconds: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start_seconds: f64, duration_seconds: f64) -> Self {
        Self {
            text: text.into(),
            start_seconds,
            duration_seconds,
        }
    }

    /// Offset at which this segment stops being spoken.
    pub fn end_seconds(&self) -> f64 {
        self.start_seconds + self.duration_seconds
    }

    /// The text with each run of line breaks collapsed into a single space.
    ///
    /// Multi-line captions are common; TXT and DOCX give every segment exactly one line.
    pub fn single_line_text(&self) -> Cow<'_, str> {
        if !self.text.contains(['\r', '\n']) {
            return Cow::Borrowed(&self.text);
        }

        let mut out = String::with_capacity(self.text.len());
        let mut in_break = false;
        for c in self.text.chars() {
            if c == '\r' || c == '\n' {
                if !in_break {
                    out.push(' ');
                }
                in_break = true;
            } else {
                out.push(c);
                in_break = false;
            }
        }
        Cow::Owned(out)
    }
}

/// Convert raw caption entries into the canonical segment sequence used by every exporter.
///
/// Order and count are preserved. Text is trimmed, but entries that end up empty are kept so
/// indices stay aligned with the source.
pub fn normalize(raw: &[RawCaption]) -> Result<Vec<TranscriptSegment>> {
    if raw.is_empty() {
        return Err(Error::EmptyTranscript);
    }

    let segments = raw
        .iter()
        .enumerate()
        .map(|(index, caption)| TranscriptSegment {
            text: caption.text.trim().to_owned(),
            start_seconds: non_negative(caption.start, index, "start"),
            duration_seconds: non_negative(caption.duration, index, "duration"),
        })
        .collect();

    Ok(segments)
}

fn non_negative(value: f64, index: usize, field: &'static str) -> f64 {
    if value.is_finite() && value >= 0.0 {
        return value;
    }

    warn!(index, field, value, "clamping invalid caption timing to zero");
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_preserves_order_and_count_and_trims() -> anyhow::Result<()> {
        let raw = vec![
            RawCaption::new("  first  ", 0.0, 1.5),
            RawCaption::new("second\n", 1.5, 2.0),
            RawCaption::new("\tthird", 3.5, 0.5),
        ];

        let segments = normalize(&raw)?;
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], TranscriptSegment::new("first", 0.0, 1.5));
        assert_eq!(segments[1], TranscriptSegment::new("second", 1.5, 2.0));
        assert_eq!(segments[2], TranscriptSegment::new("third", 3.5, 0.5));
        Ok(())
    }

    #[test]
    fn normalize_keeps_entries_that_are_empty_after_trimming() -> anyhow::Result<()> {
        let raw = vec![
            RawCaption::new("a", 0.0, 1.0),
            RawCaption::new("   ", 1.0, 1.0),
            RawCaption::new("b", 2.0, 1.0),
        ];

        let segments = normalize(&raw)?;
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].text, "");
        assert_eq!(segments[1].start_seconds, 1.0);
        Ok(())
    }

    #[test]
    fn normalize_rejects_empty_input() {
        let err = normalize(&[]).unwrap_err();
        assert!(matches!(err, Error::EmptyTranscript));
    }

    #[test]
    fn normalize_clamps_negative_and_non_finite_timing() -> anyhow::Result<()> {
        let raw = vec![
            RawCaption::new("x", -1.0, f64::NAN),
            RawCaption::new("y", 2.0, f64::INFINITY),
        ];

        let segments = normalize(&raw)?;
        assert_eq!(segments[0].start_seconds, 0.0);
        assert_eq!(segments[0].duration_seconds, 0.0);
        assert_eq!(segments[1].start_seconds, 2.0);
        assert_eq!(segments[1].duration_seconds, 0.0);
        Ok(())
    }

    #[test]
    fn raw_captions_deserialize_from_exported_json() -> anyhow::Result<()> {
        let json = r#"[{"text":"hi","start":1.25,"duration":2.0}]"#;
        let raw: Vec<RawCaption> = serde_json::from_str(json)?;
        assert_eq!(raw, vec![RawCaption::new("hi", 1.25, 2.0)]);
        Ok(())
    }

    #[test]
    fn end_seconds_adds_duration() {
        let seg = TranscriptSegment::new("Hi", 65.0, 3.5);
        assert_eq!(seg.end_seconds(), 68.5);
    }

    #[test]
    fn single_line_text_collapses_line_break_runs() {
        let seg = TranscriptSegment::new("line one\r\n\nline two\nthree", 0.0, 1.0);
        assert_eq!(seg.single_line_text(), "line one line two three");

        let plain = TranscriptSegment::new("no breaks", 0.0, 1.0);
        assert!(matches!(plain.single_line_text(), Cow::Borrowed("no breaks")));
    }
}
