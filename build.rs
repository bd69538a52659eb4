use std::process::Command;

// Embed `git describe` output so `upkeep --version` identifies the exact build.
fn main() {
    let described = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .filter(|s| !s.is_empty());

    let version = match described {
        Some(tag) => tag.trim_start_matches('v').to_string(),
        None => env!("CARGO_PKG_VERSION").to_string(),
    };

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rustc-env=UPKEEP_VERSION={version}");
}
