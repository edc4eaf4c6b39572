//! Integration tests for authorizer_lints.
//!
//! These tests run `cargo dylint` against the authorizer crate and verify
//! the output.

use std::process::Command;

fn workspace_root() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../..")
}

#[test]
fn authorizer_crate_passes_lints() {
    let output = Command::new("cargo")
        .args([
            "dylint",
            "--lib",
            "authorizer_lints",
            "--",
            "--manifest-path",
            "Cargo.toml",
        ])
        .current_dir(workspace_root())
        .output()
        .expect("Failed to run cargo dylint");

    let stderr = String::from_utf8_lossy(&output.stderr);

    // No println!/eprintln!/dbg! and no detached tokio::spawn in the crate.
    assert!(
        output.status.success(),
        "dylint should pass on the authorizer crate, got: {}",
        stderr
    );
}

#[test]
fn lints_are_registered_at_deny() {
    let output = Command::new("cargo")
        .args(["dylint", "list", "--lib", "authorizer_lints"])
        .current_dir(workspace_root())
        .output()
        .expect("Failed to run cargo dylint list");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        stdout.contains("authorizer_lints::no_println"),
        "no_println lint should be registered"
    );
    assert!(
        stdout.contains("authorizer_lints::no_untracked_spawn"),
        "no_untracked_spawn lint should be registered"
    );
    assert!(stdout.contains("deny"), "lints should be at deny level");
}
