//! End-to-end tests for the `mailtally-extract` binary.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

const AIRLINE_EMAIL: &str = "\
Booking confirmation ABC123

Base fare            €189,00
Taxes and fees       €42,37
Total paid           €231,37

We charged €231,37 to your card.
";

fn mailtally_extract(config_home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mailtally-extract"));
    // Keep the user's own currency table out of the way
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("RUST_LOG");
    cmd
}

fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_text_output_by_body_scan() {
    let dir = tempfile::tempdir().unwrap();
    let receipt = write_file(dir.path(), "airline.txt", AIRLINE_EMAIL);

    let output = mailtally_extract(dir.path())
        .arg(&receipt)
        .args(["--currency", "EUR"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let text = stdout(&output);
    assert!(text.contains("231.37 EUR (manual)"), "{text}");
    assert!(text.contains("candidates: 189.00, 42.37, 231.37, 231.37"), "{text}");
}

#[test]
fn test_json_output_with_reply() {
    let dir = tempfile::tempdir().unwrap();
    let receipt = write_file(dir.path(), "airline.txt", AIRLINE_EMAIL);

    let output = mailtally_extract(dir.path())
        .arg(&receipt)
        .args(["--currency", "eur"])
        .args(["--reply", "231,37|Travel|Flight ABC123"])
        .args(["--reply-parser", "gpt-3.5-turbo"])
        .args(["--category", "10=Travel", "--category", "11=Food"])
        .args(["--message-id", "<abc123@airline.example>"])
        .args(["--date", "Fri, 01 Mar 2024 09:30:00 +0100"])
        .args(["--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let receipt = &json[0]["receipt"];
    assert_eq!(receipt["amount"], 23137);
    assert_eq!(receipt["currency"], "EUR");
    assert_eq!(receipt["currency_decimal"], 2);
    assert_eq!(receipt["category_id"], 10);
    assert_eq!(receipt["summary"], "Flight ABC123");
    assert_eq!(receipt["parser"], "gpt-3.5-turbo");
    assert_eq!(receipt["email_id"], "<abc123@airline.example>");
    assert_eq!(receipt["email_created"], "2024-03-01T09:30:00+01:00");
}

#[test]
fn test_several_files_keep_their_order() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_file(dir.path(), "a.txt", "Total $10.00");
    let second = write_file(dir.path(), "b.txt", "Nothing to see here");
    let third = write_file(dir.path(), "c.txt", "Total $1,299.99");

    let output = mailtally_extract(dir.path())
        .args([&first, &second, &third])
        .args(["--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["receipt"]["amount"], 1000);
    assert!(entries[1]["receipt"].is_null());
    assert_eq!(entries[2]["receipt"]["amount"], 129_999);
}

#[test]
fn test_stdin_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = mailtally_extract(dir.path())
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"Latte $5.50\nTotal $5.50")
        .unwrap();

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "-: 5.50 USD (manual)\n  candidates: 5.50, 5.50\n"
    );
}

#[test]
fn test_no_amount_still_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let email = write_file(dir.path(), "news.txt", "Save up to 50% this week!");

    let output = mailtally_extract(dir.path()).arg(&email).output().unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).ends_with("news.txt: no amount found\n"));
}

#[test]
fn test_custom_currency_table() {
    let dir = tempfile::tempdir().unwrap();
    let table = write_file(
        dir.path(),
        "currencies.json",
        r#"[{"code": "CHF", "symbol": "Fr.", "exponent": 2}]"#,
    );
    let email = write_file(dir.path(), "coop.txt", "Total Fr. 12.50");

    let output = mailtally_extract(dir.path())
        .arg(&email)
        .args(["--currency", "CHF"])
        .arg("--currency-table")
        .arg(&table)
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("12.50 CHF (manual)"));
}

#[test]
fn test_runtime_errors_exit_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let email = write_file(dir.path(), "a.txt", "Total $10.00");

    let missing = mailtally_extract(dir.path())
        .arg(dir.path().join("missing.txt"))
        .output()
        .unwrap();
    assert_eq!(missing.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&missing.stderr).contains("failed to read"));

    let unknown = mailtally_extract(dir.path())
        .arg(&email)
        .args(["--currency", "XYZ"])
        .output()
        .unwrap();
    assert_eq!(unknown.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&unknown.stderr);
    assert!(stderr.contains("unknown currency XYZ"), "{stderr}");
    assert!(stderr.contains("EUR, GBP"), "{stderr}");
}

#[test]
fn test_stdin_given_twice_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = mailtally_extract(dir.path())
        .args(["-", "-"])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("only be given once"));
}

#[test]
fn test_sender_category_on_body_scan() {
    let dir = tempfile::tempdir().unwrap();
    let receipt = write_file(dir.path(), "airline.txt", AIRLINE_EMAIL);

    let output = mailtally_extract(dir.path())
        .arg(&receipt)
        .args(["--currency", "EUR"])
        .args(["--from", "Airline <noreply@airline.example>"])
        .args(["--sender-category", "noreply@airline.example=10"])
        .args(["--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["receipt"]["parser"], "manual");
    assert_eq!(json[0]["receipt"]["category_id"], 10);
}

#[test]
fn test_usage_errors_exit_with_two() {
    let dir = tempfile::tempdir().unwrap();

    let bad_category = mailtally_extract(dir.path())
        .args(["--category", "Food"])
        .output()
        .unwrap();
    assert_eq!(bad_category.status.code(), Some(2));

    let bad_date = mailtally_extract(dir.path())
        .args(["--date", "yesterday"])
        .output()
        .unwrap();
    assert_eq!(bad_date.status.code(), Some(2));
}

#[test]
fn test_generate_completions() {
    let dir = tempfile::tempdir().unwrap();
    let output = mailtally_extract(dir.path())
        .args(["--generate-completions", "bash"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("mailtally-extract"));
}
