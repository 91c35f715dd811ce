//! Argument lists for the two tool invocations.

use std::ffi::OsString;

use crate::config::ProbeConfig;

const COMMON_ARGS: [&str; 3] = ["-hide_banner", "-v", "error"];

/// Arguments for the streaming `-show_frames` invocation.
pub fn frames_args(config: &ProbeConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = COMMON_ARGS.iter().map(OsString::from).collect();
    args.extend(["-print_format", "default", "-show_frames"].map(OsString::from));

    let options = [
        ("-select_streams", &config.select_streams),
        ("-show_entries", &config.show_entries),
        ("-read_intervals", &config.read_intervals),
    ];
    for (flag, value) in options {
        if let Some(value) = value {
            args.push(flag.into());
            args.push(value.into());
        }
    }

    args.push(config.target.clone().into());
    args
}

/// Arguments for the one-shot JSON stream metadata invocation.
pub fn metadata_args(config: &ProbeConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = COMMON_ARGS.iter().map(OsString::from).collect();
    args.extend(["-print_format", "json", "-show_streams"].map(OsString::from));
    args.push(config.target.clone().into());
    args
}
