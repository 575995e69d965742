use std::io::Write;

use crate::Result;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::TranscriptSegment;
use crate::timestamp::{TimestampStyle, format_timestamp};

/// A `SegmentEncoder` that writes one plain-text line per segment.
///
/// With timestamps enabled a line looks like `[00:01:05] Hi`; without, it's just `Hi`.
/// Every line ends in `\n`, so a non-empty file always has a trailing newline.
pub struct TxtEncoder<W: Write> {
    w: W,

    /// `None` means timestamps are off.
    style: Option<TimestampStyle>,

    closed: bool,
}

impl<W: Write> TxtEncoder<W> {
    pub fn new(w: W, include_timestamps: bool, style: TimestampStyle) -> Self {
        Self {
            w,
            style: include_timestamps.then_some(style),
            closed: false,
        }
    }
}

impl<W: Write> SegmentEncoder for TxtEncoder<W> {
    fn write_segment(&mut self, seg: &TranscriptSegment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write segment: encoder is already closed",
            ));
        }

        let text = seg.single_line_text();
        match self.style {
            Some(style) => {
                let ts = format_timestamp(seg.start_seconds, style);
                writeln!(&mut self.w, "[{ts}] {text}")?;
            }
            None => writeln!(&mut self.w, "{text}")?,
        }

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}
