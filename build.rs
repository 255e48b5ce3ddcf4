// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=QR_ANALYZER_VERSION");

    // Packagers can pin the version string without a git checkout
    let version = std::env::var("QR_ANALYZER_VERSION").unwrap_or_else(|_| describe_version());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// Version from `git describe`, e.g. "0.1.0" on a tag or "0.1.0-3-gabc1234" after one.
fn describe_version() -> String {
    let package_version = env!("CARGO_PKG_VERSION").to_string();

    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--match", "v*"])
        .output();

    match output {
        Ok(output) if output.status.success() => {
            let described = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let described = described.strip_prefix('v').unwrap_or(&described);
            if described.contains('.') {
                described.to_string()
            } else {
                // Bare commit hash (no release tags yet)
                format!("{}-{}", package_version, described)
            }
        }
        _ => package_version,
    }
}
