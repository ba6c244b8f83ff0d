//! Build script for github-stats-metrics
//!
//! Records the version of the compiler building the crate so the health
//! endpoint can report it.

use std::process::Command;

fn main() {
    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let version = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .and_then(|text| parse_rustc_version(&text))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=BUILD_RUSTC_VERSION={}", version);
    println!("cargo:rerun-if-env-changed=RUSTC");
}

/// `rustc 1.82.0 (f6e511eec 2024-10-15)` → `1.82.0`
fn parse_rustc_version(text: &str) -> Option<String> {
    text.split_whitespace().nth(1).map(str::to_string)
}
