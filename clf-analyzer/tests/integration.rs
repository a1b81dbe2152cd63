use serde_json::Value;
use std::path::Path;
use tokio::process::Command;

const ACCESS_LOG: &str = r#"192.168.1.10 - - [10/Oct/2023:13:55:36 +0000] "GET /index.html HTTP/1.1" 200 2326
192.168.1.11 - - [10/Oct/2023:13:56:01 +0000] "POST /login HTTP/1.1" 302 -
this line is not a log line
192.168.1.10 - - [10/Oct/2023:14:02:11 +0000] "GET /missing HTTP/1.1" 404 512
192.168.1.12 - - [10/Oct/2023:14:02:12 +0000] "GET /index.html" 200 10
192.168.1.10 - - [10/Oct/2023:14:10:00 +0000] "GET /index.html HTTP/1.1" 500 0
"#;

async fn write_log(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    tokio::fs::write(&path, contents)
        .await
        .expect("Failed to write fixture");
    path.display().to_string()
}

#[tokio::test]
async fn json_report_on_stdout() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let log = write_log(dir.path(), "access.log", ACCESS_LOG).await;

    let output = Command::new(env!("CARGO_BIN_EXE_clf-analyzer"))
        .args(["--format", "json", &log])
        .output()
        .await
        .expect("Failed to run clf-analyzer");
    assert!(output.status.success());
    assert!(output.stdout.ends_with(b"}\n") && !output.stdout.ends_with(b"\n\n"));

    let report: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(report["summary"]["total_requests"], 4);
    assert_eq!(report["summary"]["unique_ip_addresses"], 2);
    assert_eq!(report["summary"]["average_response_size"], 946);
    assert_eq!(report["summary"]["error_rate_percent"], 50.0);
    assert_eq!(report["malformed_lines"], 2);
    assert_eq!(report["top_ip_addresses"][0]["address"], "192.168.1.10");
    assert_eq!(report["top_endpoints"][0]["path"], "/index.html");
    assert_eq!(
        report["analysis_period"]["start"],
        "2023-10-10T13:55:36+00:00"
    );
}

#[tokio::test]
async fn writes_both_reports_per_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let first = write_log(dir.path(), "first.log", ACCESS_LOG).await;
    let second = write_log(dir.path(), "second.log", "").await;
    let out = dir.path().join("out");

    let status = Command::new(env!("CARGO_BIN_EXE_clf-analyzer"))
        .args(["--output-dir", &out.display().to_string(), &first, &second])
        .status()
        .await
        .expect("Failed to run clf-analyzer");
    assert!(status.success());

    let text = tokio::fs::read_to_string(out.join("first.report.txt"))
        .await
        .expect("text report written");
    assert!(text.starts_with("=== Log Analysis Report ===\n"));
    assert!(text.contains("- Total Requests: 4\n"));
    assert!(text.contains("Malformed lines skipped: 2"));

    let empty = tokio::fs::read_to_string(out.join("second.report.txt"))
        .await
        .expect("empty text report written");
    assert!(empty.contains("Analysis Period: N/A"));

    let json = tokio::fs::read_to_string(out.join("second.report.json"))
        .await
        .expect("empty json report written");
    let json: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(json["summary"]["total_requests"], 0);
    assert_eq!(json["analysis_period"]["end"], Value::Null);
}

#[tokio::test]
async fn same_named_logs_get_separate_reports() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    for sub in ["a", "b"] {
        tokio::fs::create_dir(dir.path().join(sub))
            .await
            .expect("Failed to create log dir");
    }
    let first = write_log(&dir.path().join("a"), "access.log", ACCESS_LOG).await;
    let second = write_log(
        &dir.path().join("b"),
        "access.log",
        "10.0.0.9 - - [11/Oct/2023:08:00:00 +0000] \"GET / HTTP/1.1\" 200 1\n",
    )
    .await;
    let out = dir.path().join("out");

    let status = Command::new(env!("CARGO_BIN_EXE_clf-analyzer"))
        .args(["--format", "json", "--output-dir", &out.display().to_string(), &first, &second])
        .status()
        .await
        .expect("Failed to run clf-analyzer");
    assert!(status.success());

    let mut totals = Vec::new();
    for name in ["1-access.report.json", "2-access.report.json"] {
        let json = tokio::fs::read_to_string(out.join(name))
            .await
            .unwrap_or_else(|e| panic!("{name} not written: {e}"));
        let report: Value = serde_json::from_str(&json).unwrap();
        totals.push(report["summary"]["total_requests"].clone());
    }
    assert_eq!(totals, vec![Value::from(4), Value::from(1)]);
    assert!(!out.join("access.report.json").exists());
}

#[tokio::test]
async fn missing_file_fails_the_run() {
    let output = Command::new(env!("CARGO_BIN_EXE_clf-analyzer"))
        .arg("/definitely/not/here.log")
        .output()
        .await
        .expect("Failed to run clf-analyzer");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read /definitely/not/here.log"));
}

#[tokio::test]
async fn smaller_rankings_on_request() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let log = write_log(dir.path(), "access.log", ACCESS_LOG).await;

    let output = Command::new(env!("CARGO_BIN_EXE_clf-analyzer"))
        .args(["--format", "json", "--top-addresses", "1", "--top-endpoints", "2", &log])
        .output()
        .await
        .expect("Failed to run clf-analyzer");
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["top_ip_addresses"].as_array().map(Vec::len), Some(1));
    assert_eq!(report["top_endpoints"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn unwritable_output_dir_is_logged_and_fails() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let log = write_log(dir.path(), "access.log", ACCESS_LOG).await;
    let blocker = write_log(dir.path(), "not-a-dir", "").await;

    let output = Command::new(env!("CARGO_BIN_EXE_clf-analyzer"))
        .args(["--output-dir", &blocker, &log])
        .output()
        .await
        .expect("Failed to run clf-analyzer");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR"), "{stderr}");
    assert!(stderr.contains(&format!("failed to write {blocker}")), "{stderr}");
}
