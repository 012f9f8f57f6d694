use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

#[allow(deprecated)]
fn troublecode(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("troublecode").expect("binary");
    cmd.current_dir(workdir)
        .env_remove("TROUBLECODE_CONFIG")
        .env_remove("TROUBLECODE_COMPRESSION")
        .env_remove("TROUBLECODE_MAX_PAYLOAD_BYTES")
        .env("RUST_LOG", "warn");
    cmd
}

fn sample_bundle() -> Value {
    json!({
        "version": "1.0",
        "userError": "checkout button does nothing",
        "navigator": { "onLine": true, "languages": ["en-US", "de"] },
        "logs": [
            {
                "level": "error",
                "message": "TypeError: x is undefined",
                "time": "2024-01-01T00:00:00.000Z"
            }
        ]
    })
}

fn setup() -> TempDir {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("bundle.json"),
        serde_json::to_string_pretty(&sample_bundle()).expect("json"),
    )
    .expect("write bundle");
    temp
}

fn encode(workdir: &Path, extra: &[&str]) -> String {
    let output = troublecode(workdir)
        .args(extra)
        .args(["encode", "--input", "bundle.json"])
        .output()
        .expect("encode run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout)
        .expect("utf8")
        .trim()
        .to_string()
}

fn stdout_json(output: &std::process::Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn encode_then_decode_round_trips() {
    let temp = setup();
    let token = encode(temp.path(), &[]);
    assert!(token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

    let output = troublecode(temp.path())
        .args(["decode", "--token", &token])
        .output()
        .expect("decode run");
    assert_eq!(stdout_json(&output), sample_bundle());
}

#[test]
fn uncompressed_tokens_decode_and_stdin_is_accepted() {
    let temp = setup();
    let token = encode(temp.path(), &["--no-compress"]);

    let output = troublecode(temp.path())
        .args(["decode", "--compact"])
        .write_stdin(format!("  {token}\n"))
        .output()
        .expect("decode run");
    assert_eq!(stdout_json(&output), sample_bundle());
}

#[test]
fn malformed_token_is_rejected() {
    let temp = setup();
    troublecode(temp.path())
        .args(["decode", "--token", "not-valid-base64!!"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed token"));
}

#[test]
fn lookup_reports_reveal_chain_and_fails_on_unknown_paths() {
    let temp = setup();
    let token = encode(temp.path(), &[]);

    let output = troublecode(temp.path())
        .args(["lookup", "logs[0].message", "--token", &token])
        .output()
        .expect("lookup run");
    let report = stdout_json(&output);
    assert_eq!(report["value"], "TypeError: x is undefined");
    assert_eq!(report["reveal"], json!(["", "logs", "logs[0]"]));

    troublecode(temp.path())
        .args(["lookup", "logs[9]", "--token", &token])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No node at path 'logs[9]'"));
}

#[test]
fn tree_lists_paths() {
    let temp = setup();
    let token = encode(temp.path(), &[]);
    troublecode(temp.path())
        .args(["tree", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("languages #2: de  @navigator.languages[1]"))
        .stdout(predicate::str::contains("* logs  @logs"));
}

#[test]
fn render_binds_references() {
    let temp = setup();
    let token = encode(temp.path(), &[]);
    fs::write(
        temp.path().join("reply.md"),
        "## Summary\n\nThe error [[ref:logs[0].message]] is **fatal**.\n\n```js\nx.y [[ref:nope]]\n```",
    )
    .expect("write commentary");

    troublecode(temp.path())
        .args(["render", "--commentary", "reply.md", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("<h4 class=\"ai-heading\">Summary</h4>"))
        .stdout(predicate::str::contains(
            "<button type=\"button\" class=\"ref-chip\" data-ref=\"logs[0].message\">",
        ))
        .stdout(predicate::str::contains("<strong>fatal</strong>"))
        .stdout(predicate::str::contains("x.y [[ref:nope]]"));

    troublecode(temp.path())
        .args(["render", "-c", "-", "--token", &token, "--strict", "--format", "text"])
        .write_stdin("See [[ref:missing.field]]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 unresolved reference(s)"));
}

#[test]
fn prompt_modes() {
    let temp = setup();
    let token = encode(temp.path(), &[]);

    troublecode(temp.path())
        .args(["prompt", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("[[ref:path.to.field]]"))
        .stdout(predicate::str::contains("1) quick summary"));

    troublecode(temp.path())
        .args(["prompt", "--mode", "troubleshoot", "--token", &token])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Issue description is empty"));

    troublecode(temp.path())
        .args(["prompt", "-m", "troubleshoot", "--issue", "cart is empty", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("User issue description:\ncart is empty"));

    troublecode(temp.path())
        .args(["prompt", "--mode", "Troubleshoot", "--issue", "x", "--token", &token])
        .assert()
        .success();

    troublecode(temp.path())
        .args(["prompt", "--mode", "fix-it", "--token", &token])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown prompt mode 'fix-it'"));
}

#[test]
fn capture_assembles_a_report() {
    let temp = setup();
    fs::write(
        temp.path().join("facts.json"),
        r#"{ "timezone": "Europe/Berlin", "screen": { "width": 1280 } }"#,
    )
    .expect("write facts");
    let logs: String = (0..5)
        .map(|i| format!("{{\"level\":\"info\",\"message\":\"line {i}\",\"time\":\"t{i}\"}}\n"))
        .collect();
    fs::write(temp.path().join("logs.jsonl"), logs).expect("write logs");
    fs::write(temp.path().join("troublecode.toml"), "log_capacity = 3\n").expect("write config");

    let output = troublecode(temp.path())
        .args([
            "capture",
            "--error",
            "  page froze ",
            "--facts",
            "facts.json",
            "--logs",
            "logs.jsonl",
            "--json",
        ])
        .output()
        .expect("capture run");
    let bundle = stdout_json(&output);
    let keys: Vec<&str> = bundle
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        keys,
        vec!["version", "timestamp", "userError", "timezone", "screen", "logs"]
    );
    assert_eq!(bundle["userError"], "page froze");
    let messages: Vec<&str> = bundle["logs"]
        .as_array()
        .expect("logs")
        .iter()
        .filter_map(|entry| entry["message"].as_str())
        .collect();
    assert_eq!(messages, vec!["line 2", "line 3", "line 4"]);

    let token_output = troublecode(temp.path())
        .args(["capture", "--error", "x"])
        .output()
        .expect("capture run");
    assert!(token_output.status.success());
    let token = String::from_utf8(token_output.stdout).expect("utf8");
    let decoded = troublecode(temp.path())
        .args(["decode", "--token", token.trim()])
        .output()
        .expect("decode run");
    assert_eq!(stdout_json(&decoded)["userError"], "x");
}

#[test]
fn config_rejects_unknown_keys_and_env_overrides_apply() {
    let temp = setup();
    fs::write(temp.path().join("bad.toml"), "compresion = \"off\"\n").expect("write config");
    troublecode(temp.path())
        .args(["--config", "bad.toml", "decode", "--token", "e30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field"));

    troublecode(temp.path())
        .env("TROUBLECODE_MAX_PAYLOAD_BYTES", "16")
        .args(["encode", "--input", "bundle.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Payload too large"));
}
