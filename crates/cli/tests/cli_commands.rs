use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn write_file(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, body).expect("write file");
}

fn run_chatty(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chatty"))
        .args(args)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("CHATTY_CONFIG", home.join("chatty.toml"))
        .env_remove("RUST_LOG")
        .output()
        .expect("run chatty")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

fn make_vault(root: &Path) {
    write_file(
        &root.join("instances/zen-001/chatty/chat_with_zen-001.md"),
        "# Chat with Zen\n\n**User**: one\n**Zen**: two\n**User**: three\n",
    );
    write_file(
        &root.join("backup/chat_with_zen-002-legacy.md"),
        "**User**: one\n**Zen**: two\n",
    );
}

#[test]
fn parse_prints_transcript_json() {
    let home = tempfile::tempdir().expect("tempdir");
    let file = home.path().join("chat.md");
    write_file(&file, "December 19, 2025\nYou said:\nGood morning\n");

    let json = stdout_json(&run_chatty(home.path(), &["parse", file.to_str().unwrap()]));
    let messages = json["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["is_date_header"], true);
    assert_eq!(messages[1]["role"], "user");
    assert_eq!(messages[1]["content"], "Good morning");
}

#[test]
fn parse_identity_sets_construct() {
    let home = tempfile::tempdir().expect("tempdir");
    let file = home.path().join("chat.md");
    write_file(&file, "Sera: hello\n");

    let json = stdout_json(&run_chatty(
        home.path(),
        &["parse", file.to_str().unwrap(), "--identity", "instances/sera-004/chat.md"],
    ));
    assert_eq!(json["construct_identity"], "sera-004");
    assert_eq!(json["messages"][0]["role"], "assistant");
}

#[test]
fn reconcile_merges_overlapping_sources() {
    let home = tempfile::tempdir().expect("tempdir");
    let vault = home.path().join("vault");
    make_vault(&vault);

    let json = stdout_json(&run_chatty(home.path(), &["reconcile", vault.to_str().unwrap()]));
    let records = json.as_array().expect("records array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["construct_identity"], "zen-001");
    assert_eq!(records[0]["title"], "Chat with Zen");
    assert_eq!(records[0]["messages"].as_array().unwrap().len(), 3);
    assert_eq!(records[0]["sources"].as_array().unwrap().len(), 2);
}

#[test]
fn reconcile_jsonl_output() {
    let home = tempfile::tempdir().expect("tempdir");
    let vault = home.path().join("vault");
    make_vault(&vault);

    let output = run_chatty(home.path(), &["reconcile", vault.to_str().unwrap(), "--jsonl"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("jsonl line"))
        .collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["type"], "header");
    assert!(lines[1..].iter().all(|l| l["type"] == "message"));
}

#[test]
fn inspect_prints_table_and_totals() {
    let home = tempfile::tempdir().expect("tempdir");
    let vault = home.path().join("vault");
    make_vault(&vault);

    let output = run_chatty(home.path(), &["inspect", vault.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.contains("CONSTRUCT"));
    assert!(stdout.contains("zen-001"));
    assert!(stdout.contains("1 conversation(s) from 2 source(s), 3 message(s)"));
}

#[test]
fn format_renders_canonical_markdown() {
    let home = tempfile::tempdir().expect("tempdir");
    let file = home.path().join("chat_with_zen-001.md");
    write_file(&file, "You: Hello\n\n---\n\nZen: Hi there\n");

    let output = run_chatty(home.path(), &["format", file.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(
        stdout,
        "# Chat with zen-001\n\n**User**: Hello\n\n**Assistant**: Hi there\n"
    );
}

#[test]
fn config_init_then_show_and_refuse_overwrite() {
    let home = tempfile::tempdir().expect("tempdir");
    let path = home.path().join("chatty.toml");

    let output = run_chatty(home.path(), &["config", "--init"]);
    assert!(output.status.success());
    assert!(path.exists());

    let output = run_chatty(home.path(), &["config"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.contains("[speakers]"));
    assert!(stdout.contains("unknown_speaker = \"user\""));

    let output = run_chatty(home.path(), &["config", "--init"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: config already exists"));
}

#[test]
fn config_file_changes_parsing() {
    let home = tempfile::tempdir().expect("tempdir");
    write_file(
        &home.path().join("custom.toml"),
        "[speakers]\nunknown_speaker = \"skip\"\n",
    );
    let file = home.path().join("chat.md");
    write_file(&file, "**User**: hi\n**Narrator**: scene\n**Assistant**: hello\n");

    let config = home.path().join("custom.toml");
    let json = stdout_json(&run_chatty(
        home.path(),
        &["--config", config.to_str().unwrap(), "parse", file.to_str().unwrap()],
    ));
    let contents: Vec<_> = json["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(contents, vec!["hi", "hello"]);
}

#[test]
fn missing_input_exits_with_error() {
    let home = tempfile::tempdir().expect("tempdir");
    let output = run_chatty(home.path(), &["parse", "/definitely/not/here.md"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: Failed to read transcript"));
}

#[test]
fn malformed_config_is_reported() {
    let home = tempfile::tempdir().expect("tempdir");
    write_file(&home.path().join("chatty.toml"), "[speakers\n");
    let output = run_chatty(home.path(), &["config"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid config"));
}

#[test]
fn search_prints_hits_with_context() {
    let home = tempfile::tempdir().expect("tempdir");
    let vault = home.path().join("vault");
    make_vault(&vault);
    write_file(&vault.join("notes.json"), "{\"text\": \"three\"}\n");

    let output = run_chatty(
        home.path(),
        &["search", "THREE", vault.to_str().unwrap(), "--around", "1"],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let source = vault.join("instances/zen-001/chatty/chat_with_zen-001.md");
    assert!(stdout.starts_with("1 match(es) for \"THREE\""), "{stdout}");
    assert!(stdout.contains(&format!("  1. {}:5: **User**: three", source.display())));
    assert!(stdout.contains("        4 | **Zen**: two"));
    assert!(stdout.contains("     >>      5 | **User**: three"));
}

#[test]
fn search_json_reports_count_and_limit() {
    let home = tempfile::tempdir().expect("tempdir");
    let vault = home.path().join("vault");
    make_vault(&vault);

    let json = stdout_json(&run_chatty(
        home.path(),
        &["search", "one", vault.to_str().unwrap(), "--json"],
    ));
    assert_eq!(json["count"], 2);
    assert_eq!(json["case_sensitive"], false);
    let matches = json["matches"].as_array().expect("matches array");
    assert!(matches.iter().all(|m| m["line"] == 1 || m["line"] == 3));
    assert!(matches.iter().all(|m| m.get("context").is_none()));

    let json = stdout_json(&run_chatty(
        home.path(),
        &["search", "one", vault.to_str().unwrap(), "--json", "--max", "1"],
    ));
    assert_eq!(json["count"], 1);

    let json = stdout_json(&run_chatty(
        home.path(),
        &["search", "One", vault.to_str().unwrap(), "--json", "--case-sensitive"],
    ));
    assert_eq!(json["count"], 0);
}

#[test]
fn search_without_hits_and_bad_pattern() {
    let home = tempfile::tempdir().expect("tempdir");
    let vault = home.path().join("vault");
    make_vault(&vault);

    let output = run_chatty(home.path(), &["search", "absent", vault.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("No matches for \"absent\""));

    let output = run_chatty(
        home.path(),
        &["search", "(open", vault.to_str().unwrap(), "--regex"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid search pattern"));
}
