// build.rs
use std::process::Command;

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(&["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if hash.is_empty() {
        None
    } else {
        Some(hash)
    }
}

fn git_dirty_suffix() -> &'static str {
    Command::new("git")
        .args(&["diff", "--quiet", "HEAD"])
        .status()
        .map(|status| if status.success() { "" } else { "-dirty" })
        .unwrap_or("")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let version = std::env::var("CARGO_PKG_VERSION")?;
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let full_version = match git_short_hash() {
        Some(hash) => format!("{} {}{}-{}", version, hash, git_dirty_suffix(), profile),
        None => format!("{} {}", version, profile),
    };
    println!("cargo:rustc-env=SEISGRID_VERSION={}", full_version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    Ok(())
}
