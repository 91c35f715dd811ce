use probeframe_probe::{FrameProbe, ProbeConfig};

use crate::cmd::{parse_duration, StreamsArgs};
use crate::exit::{probe_error, CliResult, SUCCESS};
use crate::output::{print_streams, OutputFormat};

pub fn run(args: StreamsArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let config = ProbeConfig::new(args.target)
        .with_executable(args.executable)
        .with_timeout(timeout);

    let probe = FrameProbe::new(config).map_err(|err| probe_error("invalid probe", err))?;
    let streams = probe
        .fetch_metadata()
        .map_err(|err| probe_error("stream metadata failed", err))?;

    tracing::debug!(
        videos = streams.videos.len(),
        audios = streams.audios.len(),
        "fetched stream metadata"
    );
    print_streams(&streams, format);
    Ok(SUCCESS)
}
