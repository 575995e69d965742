use std::io::Write;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::Result;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::TranscriptSegment;

const INDENT: &[u8] = b"    ";

/// A `SegmentEncoder` that writes segments as a single, pretty-printed JSON array.
///
/// Design:
/// - We stream output directly to a `Write` implementation to avoid buffering
///   all segments in memory.
/// - The encoder is stateful so we can emit a well-formed JSON array incrementally.
/// - Timing is always present; this is the raw-data format.
///
/// Example output:
/// ```json
/// [
///     {
///         "text": "hello",
///         "start": 0.0,
///         "duration": 1.2
///     }
/// ]
/// ```
pub struct JsonArrayEncoder<W: Write> {
    /// The underlying writer we stream JSON into.
    w: W,

    /// Whether we have written the opening `[` of the JSON array.
    started: bool,

    /// Whether the next element will be the first element in the array.
    /// This lets us correctly place commas between elements.
    first: bool,

    /// Whether the encoder has been closed.
    /// Once closed, no further writes are allowed.
    closed: bool,

    /// Scratch buffer for a single pretty-printed element.
    buf: Vec<u8>,
}

impl<W: Write> JsonArrayEncoder<W> {
    /// Create a new JSON array encoder that writes to the given writer.
    ///
    /// The JSON array is opened lazily on the first write or on close.
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            first: true,
            closed: false,
            buf: Vec::new(),
        }
    }

    /// Write the opening `[` of the JSON array if we have not already done so.
    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w.write_all(b"[")?;
            self.started = true;
        }
        Ok(())
    }

    /// Pretty-print `seg` one level deep into `self.buf`.
    ///
    /// Serialized JSON never contains a raw newline inside a string, so re-indenting on `\n`
    /// only touches structural line breaks.
    fn render_element(&mut self, seg: &TranscriptSegment) -> Result<()> {
        let mut element = Vec::new();
        let mut ser = Serializer::with_formatter(&mut element, PrettyFormatter::with_indent(INDENT));
        seg.serialize(&mut ser)?;

        self.buf.clear();
        self.buf.extend_from_slice(INDENT);
        for byte in element {
            self.buf.push(byte);
            if byte == b'\n' {
                self.buf.extend_from_slice(INDENT);
            }
        }
        Ok(())
    }
}

impl<W: Write> SegmentEncoder for JsonArrayEncoder<W> {
    /// Serialize a single segment and append it to the JSON array.
    fn write_segment(&mut self, seg: &TranscriptSegment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write segment: encoder is already closed",
            ));
        }

        self.start_if_needed()?;

        // Write a comma before every element except the first.
        if !self.first {
            self.w.write_all(b",")?;
        }
        self.first = false;

        self.render_element(seg)?;
        self.w.write_all(b"\n")?;
        self.w.write_all(&self.buf)?;

        Ok(())
    }

    /// Finalize the JSON array and flush the underlying writer.
    ///
    /// This method is idempotent:
    /// - Calling `close()` multiple times is safe.
    /// - After closing, no further segments may be written.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        // Ensure we still output a valid JSON array even if no segments were written.
        self.start_if_needed()?;

        if !self.first {
            self.w.write_all(b"\n")?;
        }
        self.w.write_all(b"]")?;
        self.w.flush()?;

        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str, start: f64, duration: f64) -> TranscriptSegment {
        TranscriptSegment::new(text, start, duration)
    }

    #[test]
    fn json_array_close_without_segments_emits_empty_array() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "[]");
        Ok(())
    }

    #[test]
    fn json_array_pretty_prints_with_four_space_indent() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);
        enc.write_segment(&seg("hello", 0.0, 1.5))?;
        enc.close()?;

        assert_eq!(
            std::str::from_utf8(&out)?,
            "[\n    {\n        \"text\": \"hello\",\n        \"start\": 0.0,\n        \"duration\": 1.5\n    }\n]"
        );
        Ok(())
    }

    #[test]
    fn json_array_writes_numeric_timing_in_order() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);

        enc.write_segment(&seg("hello", 0.0, 1.0))?;
        enc.write_segment(&seg("line\nbreak \"quoted\"", 1.0, 2.5))?;
        enc.close()?;

        let parsed: serde_json::Value = serde_json::from_slice(&out)?;
        let arr = parsed.as_array().expect("expected JSON array");
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["text"], "hello");
        assert_eq!(arr[1]["text"], "line\nbreak \"quoted\"");
        assert_eq!(arr[1]["start"].as_f64(), Some(1.0));
        assert_eq!(arr[1]["duration"].as_f64(), Some(2.5));
        Ok(())
    }

    #[test]
    fn json_array_close_is_idempotent() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);
        enc.close()?;
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "[]");
        Ok(())
    }

    #[test]
    fn json_array_write_after_close_errors() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);
        enc.close()?;
        let err = enc.write_segment(&seg("nope", 0.0, 1.0)).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
