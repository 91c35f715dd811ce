use std::fs::File;
use std::io::Read;

use probeframe_frame::{pump, FrameConfig, FrameStream};

use crate::cmd::ParseArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

pub fn run(args: ParseArgs, format: OutputFormat) -> CliResult<i32> {
    let source: Box<dyn Read> = match &args.file {
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("open {}", path.display()), err))?;
            Box::new(file)
        }
        None => Box::new(std::io::stdin().lock()),
    };

    let mut stream = FrameStream::new();
    let mut seq = 0u64;
    stream.on_frame(move |record| {
        seq += 1;
        print_record(record, seq, format);
    });

    let summary = pump(source, &mut stream, &FrameConfig::default())
        .map_err(|err| frame_error("parse failed", err))?;

    tracing::debug!(
        records = summary.records,
        bytes = summary.bytes_read,
        discarded = summary.discarded,
        "parse complete"
    );
    Ok(SUCCESS)
}
