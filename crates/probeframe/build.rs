use std::process::Command;

fn main() {
    if let Ok(target) = std::env::var("TARGET") {
        println!("cargo:rustc-env=PROBEFRAME_BUILD_TARGET={target}");
    }
    if let Some(hash) = git_hash() {
        println!("cargo:rustc-env=PROBEFRAME_GIT_HASH={hash}");
    }
    println!("cargo:rerun-if-env-changed=TARGET");
    println!("cargo:rerun-if-env-changed=GIT_HASH");
    println!("cargo:rerun-if-changed=../../.git/HEAD");
}

// Release tarballs have no .git; GIT_HASH lets packagers supply it.
fn git_hash() -> Option<String> {
    if let Ok(hash) = std::env::var("GIT_HASH") {
        return Some(hash);
    }
    let output = Command::new("git")
        .args(["rev-parse", "--short=12", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}
