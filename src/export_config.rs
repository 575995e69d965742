use serde::{Deserialize, Serialize};

use crate::export_format::ExportFormat;
use crate::timestamp::TimestampStyle;

/// Options that control how a transcript is exported.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI layers its flags over the persisted settings and builds one of these right before
/// each export; the exporters only ever read it.
///
/// Serialized form (also the on-disk settings file):
/// ```json
/// { "format": "TXT", "include_timestamps": true, "timestamp_style": "HH:MM:SS" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// The target format.
    pub format: ExportFormat,

    /// Whether timestamps are written.
    ///
    /// Ignored by JSON (timing is always present) and SRT (timing is mandatory).
    pub include_timestamps: bool,

    /// Rendering of human-readable timestamps in TXT and DOCX.
    pub timestamp_style: TimestampStyle,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Txt,
            include_timestamps: true,
            timestamp_style: TimestampStyle::HoursMinutesSeconds,
        }
    }
}

impl ExportConfig {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_timestamps(mut self, include_timestamps: bool) -> Self {
        self.include_timestamps = include_timestamps;
        self
    }

    pub fn with_timestamp_style(mut self, timestamp_style: TimestampStyle) -> Self {
        self.timestamp_style = timestamp_style;
        self
    }
}
