use std::io::Write;

use crate::Result;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::TranscriptSegment;
use crate::timestamp::format_timestamp_srt;

/// A `SegmentEncoder` that writes segments in SubRip (SRT) format.
///
/// Every cue is:
/// ```text
/// 1
/// 00:01:05,000 --> 00:01:08,500
/// Hi
///
/// ```
/// Text lines are kept, minus blank ones. SRT has no header, so closing without segments
/// writes nothing. Timing is always emitted; the export config's timestamp toggle and style
/// do not apply.
pub struct SrtEncoder<W: Write> {
    /// The underlying writer we stream SRT into.
    w: W,

    /// Sequence number of the next cue. SRT numbering starts at 1.
    next_index: usize,

    /// Whether the encoder has been closed.
    closed: bool,
}

impl<W: Write> SrtEncoder<W> {
    /// Create a new SRT encoder that writes to the provided writer.
    pub fn new(w: W) -> Self {
        Self {
            w,
            next_index: 1,
            closed: false,
        }
    }
}

impl<W: Write> SegmentEncoder for SrtEncoder<W> {
    /// Write a single numbered cue.
    fn write_segment(&mut self, seg: &TranscriptSegment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write segment: encoder is already closed",
            ));
        }

        let start = format_timestamp_srt(seg.start_seconds);
        let end = format_timestamp_srt(seg.end_seconds());

        writeln!(&mut self.w, "{}", self.next_index)?;
        writeln!(&mut self.w, "{start} --> {end}")?;
        // A blank line ends the cue, so blank lines inside the text are dropped. Empty text
        // gives a cue with no text line.
        for line in seg.text.lines().filter(|line| !line.trim().is_empty()) {
            writeln!(&mut self.w, "{line}")?;
        }

        // Blank line separates cues.
        writeln!(&mut self.w)?;

        self.next_index += 1;
        Ok(())
    }

    /// Flush the underlying writer. This is idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

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
    fn srt_close_without_segments_emits_nothing() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = SrtEncoder::new(&mut out);
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "");
        Ok(())
    }

    #[test]
    fn srt_numbers_cues_from_one_and_computes_end() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = SrtEncoder::new(&mut out);

        enc.write_segment(&seg("Hi", 65.0, 3.5))?;
        enc.write_segment(&seg("there", 68.5, 1.25))?;
        enc.close()?;

        let s = std::str::from_utf8(&out)?;
        assert_eq!(
            s,
            "1\n00:01:05,000 --> 00:01:08,500\nHi\n\n\
             2\n00:01:08,500 --> 00:01:09,750\nthere\n\n"
        );
        Ok(())
    }

    #[test]
    fn srt_empty_text_does_not_add_blank_lines() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = SrtEncoder::new(&mut out);

        enc.write_segment(&seg("", 1.0, 2.0))?;
        enc.write_segment(&seg("a\r\n\r\nb", 3.0, 1.0))?;
        enc.close()?;

        let s = std::str::from_utf8(&out)?;
        assert_eq!(
            s,
            "1\n00:00:01,000 --> 00:00:03,000\n\n\
             2\n00:00:03,000 --> 00:00:04,000\na\nb\n\n"
        );
        Ok(())
    }

    #[test]
    fn srt_write_after_close_errors() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = SrtEncoder::new(&mut out);
        enc.close()?;
        let err = enc.write_segment(&seg("nope", 0.0, 1.0)).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
