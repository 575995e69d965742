use crate::Result;
use crate::segments::TranscriptSegment;

/// A streaming serializer for one export format.
///
/// Callers write segments in order and then call `close` exactly when they are done.
/// `close` must be idempotent, and writing after `close` is an error.
pub trait SegmentEncoder {
    fn write_segment(&mut self, seg: &TranscriptSegment) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
