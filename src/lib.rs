//! `transkripto` — fetch YouTube transcripts and export them to common document formats.
//!
//! This crate provides:
//! - Video id resolution from YouTube URLs
//! - Caption track selection (English, else the first track) and retrieval
//! - Normalization into a canonical segment sequence
//! - Pluggable output encoders (TXT, CSV, JSON, DOCX, SRT)
//! - Persistence of the last-used export settings
//!
//! Typical flow:
//! ```no_run
//! # #[cfg(feature = "youtube")]
//! # fn main() -> transkripto::Result<()> {
//! use transkripto::{ExportConfig, ExportFormat, YouTubeSource, export_to_path};
//!
//! let id = transkripto::extract_video_id("https://youtu.be/dQw4w9WgXcQ")?;
//! let transcript = transkripto::fetch_transcript(&YouTubeSource::new()?, &id)?;
//! export_to_path(&transcript.segments, &ExportConfig::new(ExportFormat::Srt), "out.srt")?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "youtube"))]
//! # fn main() {}
//! ```

mod error;

// High-level API (most consumers should start here).
pub mod export;
pub mod export_config;
pub mod source;

// Segment data structures and normalization.
pub mod segments;
pub mod timestamp;

// Input resolution and network retrieval.
pub mod video_id;
#[cfg(feature = "youtube")]
pub mod youtube;

// Output selection and encoder interfaces.
pub mod export_format;
pub mod segment_encoder;

// Output encoders that serialize segments into the supported formats.
pub mod csv_encoder;
pub mod docx_encoder;
pub mod json_array_encoder;
pub mod srt_encoder;
pub mod txt_encoder;

// Persisted user preferences.
pub mod settings;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub use error::{Error, Result};
pub use export::{export, export_to_path, render_preview};
pub use export_config::ExportConfig;
pub use export_format::ExportFormat;
#[cfg(feature = "logging")]
pub use logging::init as init_logging;
pub use segments::{RawCaption, TranscriptSegment, normalize};
pub use settings::SettingsStore;
pub use source::{Track, Transcript, TranscriptSource, fetch_transcript, select_track};
pub use timestamp::TimestampStyle;
pub use video_id::extract_video_id;
#[cfg(feature = "youtube")]
pub use youtube::YouTubeSource;
