use probeframe_frame::FrameStream;
use probeframe_probe::{CancelHandle, FrameProbe, ProbeConfig};

use crate::cmd::{parse_duration, FramesArgs};
use crate::exit::{probe_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_record, OutputFormat};

pub fn run(args: FramesArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let mut config = ProbeConfig::new(args.target)
        .with_executable(args.executable)
        .with_timeout(timeout);
    if let Some(streams) = args.select_streams {
        config = config.with_select_streams(streams);
    }
    if let Some(entries) = args.show_entries {
        config = config.with_show_entries(entries);
    }
    if let Some(intervals) = args.read_intervals {
        config = config.with_read_intervals(intervals);
    }

    let probe = FrameProbe::new(config).map_err(|err| probe_error("invalid probe", err))?;

    let cancel = CancelHandle::new();
    install_ctrlc_handler(cancel.clone())?;
    if args.count == Some(0) {
        cancel.cancel();
    }

    let mut stream = FrameStream::new();
    {
        let cancel = cancel.clone();
        let limit = args.count;
        let mut printed = 0u64;
        stream.on_frame(move |record| {
            // Records already buffered past the limit are dropped.
            if limit.is_some_and(|limit| printed >= limit) {
                return;
            }
            printed += 1;
            print_record(record, printed, format);
            if limit.is_some_and(|limit| printed >= limit) {
                cancel.cancel();
            }
        });
    }

    let summary = probe
        .stream_frames_until(&mut stream, &cancel)
        .map_err(|err| probe_error("frame probe failed", err))?;

    tracing::info!(
        records = summary.records,
        bytes = summary.bytes_read,
        discarded = summary.discarded,
        cancelled = summary.cancelled,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "frame probe complete"
    );
    Ok(SUCCESS)
}

fn install_ctrlc_handler(cancel: CancelHandle) -> CliResult<()> {
    ctrlc::set_handler(move || cancel.cancel())
        .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
