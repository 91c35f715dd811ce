use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use probeframe_frame::Record;
use probeframe_probe::{MediaStreams, StreamDescriptor};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    /// Frames in the tool's `[FRAME]` text layout, rebuilt from parsed
    /// fields. Numbers print normalized (`9.9679000` becomes `9.9679`) and
    /// lines without `=` are gone.
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct RecordOutput<'a> {
    seq: u64,
    fields: &'a Record,
}

/// Print one frame record. `seq` counts records from 1 within a run.
pub fn print_record(record: &Record, seq: u64, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = RecordOutput {
                seq,
                fields: record,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![format!("FRAME {seq}"), "VALUE".to_string()]);
            for (key, value) in record.iter() {
                table.add_row(vec![key.to_string(), value.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let fields = record
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!("frame {seq}: {fields}");
        }
        OutputFormat::Raw => print_raw(frame_text(record).as_bytes()),
    }
}

pub fn print_streams(streams: &MediaStreams, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Raw => {
            println!(
                "{}",
                serde_json::to_string(streams).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["INDEX", "TYPE", "CODEC", "SIZE", "SAR", "DAR"]);
            for stream in streams.videos.iter().chain(&streams.audios) {
                table.add_row(vec![
                    stream.index.to_string(),
                    stream.codec_type.clone(),
                    or_dash(stream.codec_name.as_deref()),
                    frame_size(stream),
                    or_dash(stream.sample_aspect_ratio.as_deref()),
                    or_dash(stream.display_aspect_ratio.as_deref()),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("Streams:");
            for stream in streams.videos.iter().chain(&streams.audios) {
                println!(
                    "  #{} {:<6} {:<10} {:<10} sar={} dar={}",
                    stream.index,
                    stream.codec_type,
                    or_dash(stream.codec_name.as_deref()),
                    frame_size(stream),
                    or_dash(stream.sample_aspect_ratio.as_deref()),
                    or_dash(stream.display_aspect_ratio.as_deref()),
                );
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Render `record` back into a `[FRAME]` block.
fn frame_text(record: &Record) -> String {
    let mut text = String::from("[FRAME]\n");
    for (key, value) in record.iter() {
        text.push_str(&format!("{key}={value}\n"));
    }
    text.push_str("[/FRAME]\n");
    text
}

fn frame_size(stream: &StreamDescriptor) -> String {
    match (stream.width, stream.height) {
        (Some(w), Some(h)) => format!("{w}x{h}"),
        _ => "-".to_string(),
    }
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}
