// Fetch a YouTube transcript (or load saved captions) and export it to a file or stdout.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use transkripto::{
    ExportConfig, ExportFormat, RawCaption, SettingsStore, TimestampStyle, Transcript,
    TranscriptSegment, TranscriptSource, YouTubeSource, export, export_to_path,
    extract_video_id, fetch_transcript, normalize, render_preview,
};

#[derive(Parser, Debug)]
#[command(name = "transkripto")]
#[command(about = "Fetch YouTube transcripts and export them as TXT, CSV, JSON, DOCX, or SRT")]
struct Params {
    /// YouTube URL or bare video id.
    #[arg(short = 'u', long = "url", required_unless_present = "input_path")]
    url: Option<String>,

    /// Export previously saved captions (a JSON array of `{text, start, duration}`) instead of
    /// fetching.
    #[arg(short = 'i', long = "input", conflicts_with = "url")]
    input_path: Option<PathBuf>,

    /// Export format. Defaults to the saved setting.
    #[arg(short = 'f', long = "format", value_enum, ignore_case = true)]
    format: Option<ExportFormat>,

    /// Prefix lines with timestamps (TXT, CSV, DOCX).
    #[arg(long = "timestamps", overrides_with = "no_timestamps")]
    timestamps: bool,

    /// Omit timestamps (TXT, CSV, DOCX).
    #[arg(long = "no-timestamps", overrides_with = "timestamps")]
    no_timestamps: bool,

    /// Timestamp rendering for TXT and DOCX.
    #[arg(short = 's', long = "timestamp-style", value_enum)]
    timestamp_style: Option<TimestampStyle>,

    /// Output path, or `-` for stdout. Defaults to `<video id>.<extension>`.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// List the available caption tracks and exit.
    #[arg(long = "list-tracks", conflicts_with = "input_path")]
    list_tracks: bool,

    /// Print the transcript to stdout instead of exporting (unless `--output` is also given).
    #[arg(long = "preview")]
    preview: bool,

    /// Remember the effective format and timestamp options for next time.
    #[arg(long = "save-defaults")]
    save_defaults: bool,

    /// Settings file to use instead of the per-user default.
    #[arg(long = "settings")]
    settings_path: Option<PathBuf>,
}

impl Params {
    /// Explicit flags win over saved settings.
    fn effective_config(&self, saved: ExportConfig) -> ExportConfig {
        let include_timestamps = if self.timestamps {
            true
        } else if self.no_timestamps {
            false
        } else {
            saved.include_timestamps
        };

        ExportConfig {
            format: self.format.unwrap_or(saved.format),
            include_timestamps,
            timestamp_style: self.timestamp_style.unwrap_or(saved.timestamp_style),
        }
    }

    /// A note for the user when a timestamp flag has no effect on `format`.
    fn ignored_timestamp_flags(&self, format: ExportFormat) -> Option<String> {
        let flagged = self.timestamps || self.no_timestamps || self.timestamp_style.is_some();
        (flagged && !format.honors_timestamp_toggle())
            .then(|| format!("timestamp options do not apply to {format} output"))
    }
}

fn main() -> Result<()> {
    transkripto::init_logging();
    let params = Params::parse();

    let store = settings_store(&params);
    let config = params.effective_config(load_saved(store.as_ref()));

    if params.list_tracks {
        let url = params.url.as_deref().context("--list-tracks needs --url")?;
        return list_tracks(url);
    }

    if let Some(note) = params.ignored_timestamp_flags(config.format) {
        eprintln!("note: {note}");
    }

    let (name, segments) = load_segments(&params)?;

    if params.preview {
        let text = render_preview(&segments, config.include_timestamps, config.timestamp_style)?;
        io::stdout().lock().write_all(text.as_bytes())?;
    }

    if !params.preview || params.output.is_some() {
        let output = params.output.clone().unwrap_or_else(|| {
            default_output_path(&name, config.format, params.input_path.as_deref())
        });
        write_output(&segments, &config, &output)?;
    }

    if params.save_defaults {
        match &store {
            Some(store) => {
                store.save(&config).with_context(|| {
                    format!("failed to save settings to {}", store.path().display())
                })?;
                eprintln!("saved defaults to {}", store.path().display());
            }
            None => eprintln!("no settings location available; defaults were not saved"),
        }
    }

    Ok(())
}

/// The settings file to use, if there is one. Without a config directory the run goes on with
/// built-in defaults.
fn settings_store(params: &Params) -> Option<SettingsStore> {
    match &params.settings_path {
        Some(path) => Some(SettingsStore::new(path)),
        None => SettingsStore::user_default()
            .inspect_err(|err| warn!(error = %err, "no settings location; using defaults"))
            .ok(),
    }
}

fn load_saved(store: Option<&SettingsStore>) -> ExportConfig {
    let Some(store) = store else {
        return ExportConfig::default();
    };
    store.load().unwrap_or_else(|err| {
        warn!(error = %err, "ignoring saved settings");
        ExportConfig::default()
    })
}

/// Resolve the segments to export plus a base name for the default output file.
fn load_segments(params: &Params) -> Result<(String, Vec<TranscriptSegment>)> {
    if let Some(path) = &params.input_path {
        let bytes =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let raw: Vec<RawCaption> = serde_json::from_slice(&bytes)
            .with_context(|| format!("{} is not a caption JSON array", path.display()))?;
        let segments = normalize(&raw)?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "transcript".to_owned());
        return Ok((name, segments));
    }

    let Some(url) = params.url.as_deref() else {
        bail!("either --url or --input is required");
    };

    let transcript = fetch_with_spinner(url)?;
    eprintln!(
        "fetched {} segments ({})",
        transcript.segments.len(),
        transcript.track.name
    );
    Ok((transcript.video_id, transcript.segments))
}

fn fetch_with_spinner(url: &str) -> Result<Transcript> {
    let video_id = extract_video_id(url)?;
    let source = YouTubeSource::new()?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    pb.set_message(format!("fetching transcript for {video_id}"));
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = fetch_transcript(&source, &video_id);
    pb.finish_and_clear();

    Ok(result?)
}

fn list_tracks(url: &str) -> Result<()> {
    let video_id = extract_video_id(url)?;
    let source = YouTubeSource::new()?;
    let tracks = source.list_tracks(&video_id)?;

    print!("{}", track_list_string(&tracks));
    Ok(())
}

fn track_list_string(tracks: &[transkripto::Track]) -> String {
    let chosen = transkripto::select_track(tracks);

    let mut out = String::new();
    for track in tracks {
        let marker = if chosen == Some(track) { "*" } else { " " };
        let generated = if track.is_generated { " [auto]" } else { "" };
        out.push_str(&format!(
            "{marker} {:<8} {}{generated}\n",
            track.language_code, track.name
        ));
    }
    out
}

/// `<name>.<ext>` in the current directory. When that is the input file itself, `.export` is
/// inserted before the extension so the input is never overwritten.
fn default_output_path(name: &str, format: ExportFormat, input: Option<&Path>) -> PathBuf {
    let ext = format.extension();
    let path = PathBuf::from(format!("{name}.{ext}"));
    match input {
        Some(input) if same_file(&path, input) => PathBuf::from(format!("{name}.export.{ext}")),
        _ => path,
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn write_output(segments: &[TranscriptSegment], config: &ExportConfig, output: &Path) -> Result<()> {
    if output == Path::new("-") {
        let payload = export(segments, config)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(&payload)?;
        stdout.flush()?;
        return Ok(());
    }

    export_to_path(segments, config, output)?;
    eprintln!("exported {} to {}", config.format, output.display());
    Ok(())
}
