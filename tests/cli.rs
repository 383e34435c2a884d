use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn run_cli(dir: &Path, args: &[&str]) -> Output {
    let font = dir.join("corrupt.ttf");
    fs::write(&font, b"\x00\x01\x00\x00 truncated").expect("write corrupt font");

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tableqr"));
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir)
        .env("TABLEQR_LOG_LEVEL", "debug")
        .args(["--output", "codes", "--font"])
        .arg(&font)
        .args(args);
    for var in [
        "TABLEQR_BASE_URL",
        "TABLEQR_TABLE_COUNT",
        "TABLEQR_OUTPUT_DIR",
        "TABLEQR_FONT_PATH",
        "TABLEQR_FONT_SIZE",
        "TABLEQR_LOG_FILE",
        "TABLEQR_LOG_COLOR",
        "TABLEQR_LOG_ROTATION",
    ] {
        cmd.env_remove(var);
    }
    cmd.output().expect("run tableqr")
}

#[test]
fn json_stdout_is_only_json_while_logs_go_to_stderr() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let output = run_cli(
        tmp.path(),
        &["--json", "--base-url", "https://site.com/t=", "--count", "2"],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    let values: Vec<Value> = serde_json::Deserializer::from_str(&stdout)
        .into_iter::<Value>()
        .collect::<Result<_, _>>()
        .unwrap_or_else(|e| panic!("stdout is not a JSON stream ({e}):\n{stdout}"));

    assert_eq!(values.first().map(|v| v["event"].clone()), Some(Value::from("font_fallback")));
    let summary = values.last().expect("summary object");
    assert_eq!(summary["status"], "completed");
    assert_eq!(summary["completed"], 2);

    // Debug logging was requested, so the subscriber wrote somewhere other than stdout.
    assert!(!output.stderr.is_empty());
    assert!(tmp.path().join("codes").join("2.png").is_file());
}

#[test]
fn negative_count_is_rejected_before_output_dir_exists() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let output = run_cli(
        tmp.path(),
        &["--base-url", "https://site.com/t=", "--count", "-1"],
    );
    assert!(!output.status.success());
    assert!(!tmp.path().join("codes").exists());
}
