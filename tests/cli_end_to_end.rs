use std::io::Write;

use assert_cmd::Command;
use predicates::{prelude::*, str::contains};
use tempfile::NamedTempFile;

fn markdown_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tmp file");
    file.write_all(contents.as_bytes()).expect("write markdown");
    file
}

fn inkpress() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("inkpress"));
    cmd.env_remove("INKPRESS_CONFIG_FILE")
        .env_remove("INKPRESS__RENDER__BASE_URL")
        .env("RUST_LOG", "error");
    cmd
}

#[test]
fn render_prints_sanitized_html() {
    let file = markdown_file("# Hello\n\nSee [[ctf:abc123]] <script>alert(1)</script>");

    let assert = inkpress()
        .arg("render")
        .arg(file.path())
        .arg("--base-url")
        .arg("https://ctf.example/")
        .assert()
        .success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("<h1 id=\"hello\""));
    assert!(output.contains("href=\"https://ctf.example/ctf/abc123\""));
    assert!(!output.contains("<script"));
}

#[test]
fn render_reads_stdin_and_emits_json() {
    let assert = inkpress()
        .args(["render", "-", "--format", "json"])
        .write_stdin("## Setup\n\n## Setup\n")
        .assert()
        .success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&output).expect("json output");
    assert_eq!(json["toc"][1]["id"], "setup-1");
    assert_eq!(json["read_time_minutes"], 1);
}

#[test]
fn base_url_can_come_from_the_environment() {
    inkpress()
        .env("INKPRESS__RENDER__BASE_URL", "https://env.example")
        .args(["render", "-"])
        .write_stdin("[[writeup:ff00]]")
        .assert()
        .success()
        .stdout(contains("href=\"https://env.example/writeups/ff00\""));
}

#[test]
fn validate_reports_detected_tools() {
    let body = format!(
        "Scanned with nmap, then fuzzed with gobuster.\n\n```bash\nnmap -sV target\n```\n{}",
        "Notes. ".repeat(20)
    );
    let file = markdown_file(&body);

    inkpress()
        .arg("validate")
        .arg(file.path())
        .assert()
        .success()
        .stdout(contains("ok (tools: nmap, gobuster)"));
}

#[test]
fn validate_rejects_short_and_unbalanced_content() {
    inkpress()
        .args(["validate", "-"])
        .write_stdin("```\ntoo short")
        .assert()
        .code(2)
        .stderr(contains("content must be at least 100 characters"))
        .stderr(contains("code fences"));
}

#[test]
fn summary_strips_markdown_and_truncates() {
    let file = markdown_file("# Title\n\nThe **quick** brown fox jumps over the lazy dog again and again.");

    inkpress()
        .arg("summary")
        .arg(file.path())
        .args(["--max-length", "30"])
        .assert()
        .success()
        .stdout(contains("..."))
        .stdout(contains("**").not());
}

#[test]
fn missing_file_fails() {
    inkpress()
        .args(["render", "/definitely/not/here.md"])
        .assert()
        .code(1)
        .stderr(contains("io error"));
}

#[test]
fn invalid_log_level_is_a_configuration_error() {
    inkpress()
        .args(["--log-level", "chatty", "render", "-"])
        .write_stdin("text")
        .assert()
        .code(78);
}
