use std::borrow::Cow;
use std::io::Write;

use crate::Result;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::TranscriptSegment;

const HEADER: &str = "Start,Duration,Text";

/// A `SegmentEncoder` that writes `Start,Duration,Text` rows.
///
/// Times are plain decimal seconds with millisecond precision (`65.000`), never styled
/// timestamps. When timestamps are disabled the `Start` cell is left empty.
///
/// The header is written lazily, like the other encoders, and also on `close` so an empty
/// export is still a valid CSV file.
pub struct CsvEncoder<W: Write> {
    w: W,
    include_start: bool,
    started: bool,
    closed: bool,
}

impl<W: Write> CsvEncoder<W> {
    pub fn new(w: W, include_timestamps: bool) -> Self {
        Self {
            w,
            include_start: include_timestamps,
            started: false,
            closed: false,
        }
    }

    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            writeln!(&mut self.w, "{HEADER}")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> SegmentEncoder for CsvEncoder<W> {
    fn write_segment(&mut self, seg: &TranscriptSegment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write segment: encoder is already closed",
            ));
        }

        self.start_if_needed()?;

        if self.include_start {
            write!(&mut self.w, "{:.3}", seg.start_seconds)?;
        }
        writeln!(
            &mut self.w,
            ",{:.3},{}",
            seg.duration_seconds,
            escape_field(&seg.text)
        )?;

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}

/// Quote a field if it contains a delimiter, quote, or line break; embedded quotes are doubled.
fn escape_field(field: &str) -> Cow<'_, str> {
    if !field.contains([',', '"', '\n', '\r']) {
        return Cow::Borrowed(field);
    }

    Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
}
