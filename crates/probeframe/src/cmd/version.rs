use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("probeframe {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: probeframe");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("PROBEFRAME_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "git_hash: {}",
        option_env!("PROBEFRAME_GIT_HASH").unwrap_or("unknown")
    );
    println!("features: async={}, cli=true", cfg!(feature = "async"));
    println!(
        "default_executable: {}",
        probeframe_probe::DEFAULT_EXECUTABLE
    );

    Ok(SUCCESS)
}
