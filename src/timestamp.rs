//! Timestamp rendering shared by the exporters.
//!
//! Two families live here:
//! - human-readable prefixes for TXT and DOCX (`HH:MM:SS` or `mm:ss`, whole seconds)
//! - the fixed SubRip form `HH:MM:SS,mmm` used by SRT regardless of user settings

use std::fmt;

use serde::{Deserialize, Serialize};

/// How human-readable timestamps are rendered.
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimestampStyle {
    /// Hours, minutes and seconds. Hours grow past 24 without wrapping.
    #[default]
    #[serde(rename = "HH:MM:SS")]
    #[cfg_attr(feature = "cli", value(name = "HH:MM:SS", alias = "hh:mm:ss"))]
    HoursMinutesSeconds,

    /// Minutes and seconds only. Minutes grow past 59 without wrapping (`75:03`).
    #[serde(rename = "mm:ss")]
    #[cfg_attr(feature = "cli", value(name = "mm:ss", alias = "MM:SS"))]
    MinutesSeconds,
}

impl TimestampStyle {
    pub fn label(self) -> &'static str {
        match self {
            TimestampStyle::HoursMinutesSeconds => "HH:MM:SS",
            TimestampStyle::MinutesSeconds => "mm:ss",
        }
    }
}

impl fmt::Display for TimestampStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Format an offset in seconds for TXT/DOCX output.
///
/// The fractional part is truncated, so `125.9` renders as `02:05` in `mm:ss` style. Every
/// field is zero-padded to at least two digits.
pub fn format_timestamp(seconds: f64, style: TimestampStyle) -> String {
    // `as` saturates: negative and NaN inputs become 0.
    let total_s = seconds.trunc() as u64;
    let s = total_s % 60;
    let total_m = total_s / 60;

    match style {
        TimestampStyle::HoursMinutesSeconds => {
            let m = total_m % 60;
            let h = total_m / 60;
            format!("{h:02}:{m:02}:{s:02}")
        }
        TimestampStyle::MinutesSeconds => format!("{total_m:02}:{s:02}"),
    }
}

/// Format seconds into a SubRip timestamp (`HH:MM:SS,mmm`).
///
/// We round to the nearest millisecond and carry, so `1.9995` becomes `00:00:02,000`.
pub fn format_timestamp_srt(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0).round() as u64;

    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}
