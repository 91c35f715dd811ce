use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod frames;
pub mod parse;
pub mod streams;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream frame records from a media target as they are produced.
    Frames(FramesArgs),
    /// Print normalized video and audio stream descriptors.
    Streams(StreamsArgs),
    /// Parse `-show_frames` text from a file or stdin.
    Parse(ParseArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Frames(args) => frames::run(args, format),
        Command::Streams(args) => streams::run(args, format),
        Command::Parse(args) => parse::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct FramesArgs {
    /// Media file or URL to inspect.
    pub target: String,
    /// Path to the ffprobe executable.
    #[arg(long, env = "FFPROBE_PATH", default_value = "ffprobe")]
    pub executable: PathBuf,
    /// Kill the tool after this long (e.g. 30s, 500ms).
    #[arg(long, default_value = "30s")]
    pub timeout: String,
    /// Stream specifier passed through as -select_streams.
    #[arg(long)]
    pub select_streams: Option<String>,
    /// Entry list passed through as -show_entries.
    #[arg(long)]
    pub show_entries: Option<String>,
    /// Interval list passed through as -read_intervals.
    #[arg(long)]
    pub read_intervals: Option<String>,
    /// Stop after N records.
    #[arg(long)]
    pub count: Option<u64>,
}

#[derive(Args, Debug)]
pub struct StreamsArgs {
    /// Media file or URL to inspect.
    pub target: String,
    /// Path to the ffprobe executable.
    #[arg(long, env = "FFPROBE_PATH", default_value = "ffprobe")]
    pub executable: PathBuf,
    /// Kill the tool after this long (e.g. 30s, 500ms).
    #[arg(long, default_value = "30s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// File holding captured frame output. Reads stdin when omitted.
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `5s`, `150ms`, or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "timeout must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid timeout value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "timeout must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
