use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "whoisdoor-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_whoisdoor-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("realtime-arrival"));
}

#[test]
fn cli_smoke_run_writes_json_report() {
    let exe = env!("CARGO_BIN_EXE_whoisdoor-tester");
    let output_path = temp_path("smoke");
    let status = Command::new(exe)
        .args([
            "--scenarios",
            "smoke,legacy-loop",
            "--seeds",
            "1,2",
            "--iterations",
            "1",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let runs = report.as_array().expect("array");
    assert_eq!(runs.len(), 4);
    assert!(runs.iter().all(|r| r["passed"] == true));
}

#[test]
fn cli_rejects_unreadable_config() {
    let exe = env!("CARGO_BIN_EXE_whoisdoor-tester");
    let output = Command::new(exe)
        .args(["--config", "/definitely/not/here.json"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"));
}

#[test]
fn cli_exits_nonzero_on_a_failing_run() {
    let exe = env!("CARGO_BIN_EXE_whoisdoor-tester");
    let config = temp_path("fast-ageing.json");
    std::fs::write(&config, r#"{ "parent_age_step": 10 }"#).expect("write config");
    // The full-life expectations assume the default ageing of five years a day.
    let output = Command::new(exe)
        .args([
            "--scenarios",
            "full-life",
            "--iterations",
            "1",
            "--report",
            "markdown",
            "--config",
        ])
        .arg(&config)
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("parent age"));
}
