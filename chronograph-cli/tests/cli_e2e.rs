//! End to end smoke tests for the `chronograph` binary: validate and run a workflow
//! against a temp config directory, using the passthrough demo agent registry.

use std::fs;
use std::process::Command;

fn run_chronograph(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_chronograph"))
        .args(args)
        .output()
        .expect("failed to run chronograph binary")
}

fn write_demo_config(dir: &std::path::Path) {
    fs::write(
        dir.join("agents.yaml"),
        r#"
orchestrator_node:
  id: orchestrator
  display_name: Orchestrator
agents:
  - id: git_reader
    display_name: Git Reader
  - id: semantic_analyzer
    display_name: Semantic Analyzer
step_mappings:
  read_commits: git_reader
  analyze: semantic_analyzer
"#,
    )
    .unwrap();

    fs::create_dir_all(dir.join("workflows")).unwrap();
    fs::write(
        dir.join("workflows").join("demo.yaml"),
        r#"
name: demo
version: "1.0"
type: standard
steps:
  - name: read_commits
    agent_id: git_reader
    action: read
  - name: analyze
    agent_id: semantic_analyzer
    action: analyze
    dependencies: [read_commits]
"#,
    )
    .unwrap();
}

#[test]
fn validate_accepts_a_well_formed_workflow() {
    let dir = tempfile::tempdir().unwrap();
    write_demo_config(dir.path());

    let out = run_chronograph(&[
        "validate",
        "--config-dir",
        dir.path().to_str().unwrap(),
        "demo",
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("demo"));
    assert!(stdout.contains("2 steps"));
}

#[test]
fn validate_rejects_an_unknown_agent_id() {
    let dir = tempfile::tempdir().unwrap();
    write_demo_config(dir.path());
    fs::write(
        dir.path().join("workflows").join("broken.yaml"),
        r#"
name: broken
version: "1.0"
type: standard
steps:
  - name: solo
    agent_id: nonexistent_agent
    action: do_it
"#,
    )
    .unwrap();

    let out = run_chronograph(&[
        "validate",
        "--config-dir",
        dir.path().to_str().unwrap(),
        "broken",
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("failed validation"));
}

#[test]
fn run_executes_the_passthrough_registry_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    write_demo_config(dir.path());

    let out = run_chronograph(&[
        "run",
        "--config-dir",
        dir.path().to_str().unwrap(),
        "demo",
        "--input",
        r#"{"seed": true}"#,
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    let state: serde_json::Value = serde_json::from_str(&stdout).expect("run prints workflow state JSON");
    assert_eq!(state["status"], "completed");
    assert!(state["step_results"]["read_commits"]["status"] == "completed");
    assert!(state["step_results"]["analyze"]["status"] == "completed");
}
