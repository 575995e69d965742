use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The supported export formats for a transcript.
///
/// Each variant maps to a concrete `SegmentEncoder` implementation; `export::export`
/// selects one with an exhaustive match.
///
/// Format names are parsed case-insensitively, so both the CLI and persisted settings can
/// use `txt` or `TXT`. Anything else is an [`Error::UnsupportedFormat`].
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExportFormat {
    /// One line per segment, optionally prefixed with a timestamp.
    #[default]
    Txt,

    /// `Start,Duration,Text` rows.
    Csv,

    /// A JSON array of `{ text, start, duration }` objects.
    Json,

    /// A Word document with one paragraph per segment.
    Docx,

    /// SubRip subtitles.
    Srt,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Txt,
        ExportFormat::Csv,
        ExportFormat::Json,
        ExportFormat::Docx,
        ExportFormat::Srt,
    ];

    /// The upper-case label shown to users (`TXT`, `CSV`, ...).
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Txt => "TXT",
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
            ExportFormat::Docx => "DOCX",
            ExportFormat::Srt => "SRT",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Docx => "docx",
            ExportFormat::Srt => "srt",
        }
    }

    /// Whether `include_timestamps` changes the output of this format.
    ///
    /// JSON always carries raw timing and SRT is meaningless without it.
    pub fn honors_timestamp_toggle(self) -> bool {
        matches!(
            self,
            ExportFormat::Txt | ExportFormat::Csv | ExportFormat::Docx
        )
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnsupportedFormat(name.to_owned()))
    }
}

impl TryFrom<String> for ExportFormat {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExportFormat> for String {
    fn from(format: ExportFormat) -> Self {
        format.label().to_owned()
    }
}
