// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;

/// Use the built binary directly instead of cargo run to avoid compilation output
pub fn binary_path() -> &'static str {
    if cfg!(debug_assertions) {
        "./target/debug/topids"
    } else {
        "./target/release/topids"
    }
}

/// Run topids with given arguments and input bytes via stdin, ignoring any user config
pub fn run_topids_with_bytes(args: &[&str], input: &[u8]) -> (String, String, i32) {
    let mut cmd = Command::new(binary_path())
        .arg("--ignore-config")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start topids");

    // Invalid K exits before stdin is read, so a write error here is expected
    if let Some(mut stdin) = cmd.stdin.take() {
        let _ = stdin.write_all(input);
    }

    let output = cmd.wait_with_output().expect("Failed to read output");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

pub fn run_topids_with_input(args: &[&str], input: &str) -> (String, String, i32) {
    run_topids_with_bytes(args, input.as_bytes())
}

/// Run topids with the given content in a temporary file passed as the last argument
pub fn run_topids_with_file(args: &[&str], file_content: &[u8]) -> (String, String, i32) {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file
        .write_all(file_content)
        .expect("Failed to write to temp file");

    let mut full_args = args.to_vec();
    full_args.push(temp_file.path().to_str().unwrap());
    run_topids_with_args(&full_args)
}

/// Run topids with arguments only (stdin closed), ignoring any user config
pub fn run_topids_with_args(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(binary_path())
        .arg("--ignore-config")
        .args(args)
        .output()
        .expect("Failed to execute topids");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Output lines sorted, for comparing unordered result sets
pub fn sorted_lines(stdout: &str) -> Vec<String> {
    let mut lines: Vec<String> = stdout.lines().map(str::to_string).collect();
    lines.sort();
    lines
}

/// Lines of stderr that are per-line discard warnings
pub fn warning_lines(stderr: &str) -> Vec<&str> {
    stderr
        .lines()
        .filter(|line| line.starts_with("topids: warning:"))
        .collect()
}
