#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

const BASE: &str = "http://example.org/objects";
const AGG: &str = "http://example.org/agg/1";

fn setup(name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(format!("{name}.json"));
    (dir, path)
}

fn run(graph: &Path, args: &[&str]) -> String {
    let output = cargo_bin_cmd!("order-cli")
        .env_remove("PROXY_ORDER_CONFIG")
        .env_remove("PROXY_ORDER_LOG")
        .arg("--graph")
        .arg(graph)
        .args(["--anchor", AGG, "--base", BASE])
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8_lossy(&output).into_owned()
}

#[test]
fn edits_persist_between_invocations() {
    let (_dir, graph) = setup("edits");
    run(&graph, &["append", "a"]);
    run(&graph, &["append", "b"]);
    run(&graph, &["insert", "0", "z"]);
    assert!(graph.exists());
    assert_eq!(run(&graph, &["ids"]), "z\na\nb\n");

    run(&graph, &["remove", "a"]);
    run(&graph, &["delete-at", "1"]);
    assert_eq!(run(&graph, &["ids"]), "z\n");
}

#[test]
fn show_reports_positions_as_json() {
    let (_dir, graph) = setup("show");
    run(&graph, &["append", "a"]);
    run(&graph, &["append", "b"]);

    let stdout = run(&graph, &["--format", "json", "show"]);
    let positions: Value = serde_json::from_str(&stdout).expect("json output");
    let positions = positions.as_array().expect("array");
    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0]["index"], 0);
    assert_eq!(positions[0]["id"], "a");
    assert_eq!(positions[1]["id"], "b");
    assert_ne!(positions[0]["subject"], positions[1]["subject"]);
}

#[test]
fn mutation_reports_committed_statements() {
    let (_dir, graph) = setup("report");
    let stdout = run(&graph, &["--format", "json", "append", "a"]);
    let report: Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(report["removed"], 0);
    // proxyFor and proxyIn for the node plus first and last on the anchor.
    assert_eq!(report["added"], 4);
    assert_eq!(report["ids"], serde_json::json!(["a"]));

    let stored: Value =
        serde_json::from_str(&fs::read_to_string(&graph).expect("graph file")).expect("json");
    assert_eq!(stored.as_array().map(Vec::len), Some(4));
}

#[test]
fn out_of_range_delete_fails_without_writing() {
    let (_dir, graph) = setup("range");
    run(&graph, &["append", "a"]);
    let before = fs::read_to_string(&graph).expect("graph file");

    cargo_bin_cmd!("order-cli")
        .env_remove("PROXY_ORDER_CONFIG")
        .env_remove("PROXY_ORDER_LOG")
        .arg("--graph")
        .arg(&graph)
        .args(["--anchor", AGG, "--base", BASE, "delete-at", "5"])
        .assert()
        .failure();
    assert_eq!(fs::read_to_string(&graph).expect("graph file"), before);
}

#[test]
fn member_base_can_come_from_config() {
    let (dir, graph) = setup("config");
    let config = dir.path().join("order.toml");
    fs::write(
        &config,
        format!("[order]\nmember_base = \"{BASE}\"\n\n[logging]\nlevel = \"error\"\n"),
    )
    .expect("write config");

    for id in ["a", "b"] {
        cargo_bin_cmd!("order-cli")
            .env_remove("PROXY_ORDER_LOG")
            .arg("--graph")
            .arg(&graph)
            .arg("--config")
            .arg(&config)
            .args(["--anchor", AGG, "append", id])
            .assert()
            .success();
    }
    assert_eq!(run(&graph, &["ids"]), "a\nb\n");
}

#[test]
fn missing_base_is_an_error() {
    let (_dir, graph) = setup("nobase");
    cargo_bin_cmd!("order-cli")
        .env_remove("PROXY_ORDER_CONFIG")
        .env_remove("PROXY_ORDER_LOG")
        .arg("--graph")
        .arg(&graph)
        .args(["--anchor", AGG, "ids"])
        .assert()
        .failure();
}

#[test]
fn malformed_graph_file_is_reported() {
    let (_dir, graph) = setup("garbled");
    fs::write(&graph, "{not json").expect("write graph");
    let output = cargo_bin_cmd!("order-cli")
        .env_remove("PROXY_ORDER_CONFIG")
        .env_remove("PROXY_ORDER_LOG")
        .arg("--graph")
        .arg(&graph)
        .args(["--anchor", AGG, "--base", BASE, "ids"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8_lossy(&output).contains("error: json:"));
}
