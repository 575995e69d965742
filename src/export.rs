//! High-level export API.
//!
//! `export` turns a normalized segment sequence into the payload for one format, and
//! `export_to_path` writes that payload to disk atomically. Encoder selection is an
//! exhaustive match over [`ExportFormat`], so adding a format is a compile error until it is
//! handled here.

use std::io::{Cursor, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::csv_encoder::CsvEncoder;
use crate::docx_encoder::DocxEncoder;
use crate::export_config::ExportConfig;
use crate::export_format::ExportFormat;
use crate::json_array_encoder::JsonArrayEncoder;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::TranscriptSegment;
use crate::srt_encoder::SrtEncoder;
use crate::timestamp::TimestampStyle;
use crate::txt_encoder::TxtEncoder;
use crate::{Error, Result};

/// Serialize `segments` into the payload for `config.format`.
///
/// This is a pure function of its inputs: nothing is written anywhere and `segments` is not
/// modified. On error no payload is returned.
pub fn export(segments: &[TranscriptSegment], config: &ExportConfig) -> Result<Vec<u8>> {
    let mut out = Vec::new();

    match config.format {
        ExportFormat::Txt => {
            let encoder =
                TxtEncoder::new(&mut out, config.include_timestamps, config.timestamp_style);
            encode_all(encoder, segments)?;
        }
        ExportFormat::Csv => {
            let encoder = CsvEncoder::new(&mut out, config.include_timestamps);
            encode_all(encoder, segments)?;
        }
        ExportFormat::Json => {
            let encoder = JsonArrayEncoder::new(&mut out);
            encode_all(encoder, segments)?;
        }
        ExportFormat::Docx => {
            let mut cursor = Cursor::new(&mut out);
            let encoder = DocxEncoder::new(
                &mut cursor,
                config.include_timestamps,
                config.timestamp_style,
            );
            encode_all(encoder, segments)?;
        }
        ExportFormat::Srt => {
            let encoder = SrtEncoder::new(&mut out);
            encode_all(encoder, segments)?;
        }
    }

    debug!(
        format = %config.format,
        segments = segments.len(),
        bytes = out.len(),
        "encoded transcript"
    );
    Ok(out)
}

/// Serialize `segments` and write the payload to `path`.
///
/// The payload is fully encoded before the filesystem is touched, then written to a temporary
/// file in the destination directory and renamed into place. If anything fails, the temporary
/// file is removed and whatever was previously at `path` is left as it was.
pub fn export_to_path(
    segments: &[TranscriptSegment],
    config: &ExportConfig,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let payload = export(segments, config)?;
    write_atomic(path, &payload)?;

    info!(
        path = %path.display(),
        format = %config.format,
        bytes = payload.len(),
        "exported transcript"
    );
    Ok(())
}

/// Render the on-screen listing of a transcript.
///
/// This is the same text a TXT export produces, for showing a transcript before saving it.
pub fn render_preview(
    segments: &[TranscriptSegment],
    include_timestamps: bool,
    timestamp_style: TimestampStyle,
) -> Result<String> {
    let config = ExportConfig::new(ExportFormat::Txt)
        .with_timestamps(include_timestamps)
        .with_timestamp_style(timestamp_style);
    let payload = export(segments, &config)?;
    String::from_utf8(payload).map_err(|err| Error::msg(format!("preview is not UTF-8: {err}")))
}

fn encode_all<E: SegmentEncoder>(mut encoder: E, segments: &[TranscriptSegment]) -> Result<()> {
    let run_res = segments
        .iter()
        .try_for_each(|seg| encoder.write_segment(seg));
    merge_run_and_close(run_res, encoder.close())
}

fn merge_run_and_close(run_res: Result<()>, close_res: Result<()>) -> Result<()> {
    match (run_res, close_res) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close_err)) => Err(close_err),
        (Err(err), _) => Err(err),
    }
}

fn write_atomic(path: &Path, payload: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| Error::write(path, err))?;
    tmp.write_all(payload)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|err| Error::write(path, err))?;

    // On failure the returned `PersistError` drops the temp file, which deletes it.
    tmp.persist(path).map_err(|err| Error::write(path, err.error))?;

    Ok(())
}
