//! Shared helpers for stylegraft CLI tests.
//!
//! Every test works in its own temp directory; documents are written there
//! and the binary runs with that directory as its working directory.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// A project with one used token (`t1` "Primary", red), one unused token
/// (`t-unused` "Muted") and a local source bound to `instance1`.
pub const PROJECT: &str = r#"{
  "breakpoints": [
    { "id": "base", "label": "Base" },
    { "id": "tablet", "label": "Tablet", "minWidth": 768 }
  ],
  "styleSources": [
    { "type": "token", "id": "t1", "name": "Primary" },
    { "type": "token", "id": "t-unused", "name": "Muted" },
    { "type": "local", "id": "local1" }
  ],
  "styleSourceSelections": [
    { "instanceId": "instance1", "values": ["t1", "local1"] }
  ],
  "styles": [
    { "styleSourceId": "t1", "breakpointId": "base", "property": "color",
      "value": { "type": "keyword", "value": "red" } },
    { "styleSourceId": "t-unused", "breakpointId": "base", "property": "opacity",
      "value": { "type": "unit", "value": 0.5, "unit": "number" } },
    { "styleSourceId": "local1", "breakpointId": "tablet", "property": "margin",
      "value": { "type": "unit", "value": 4, "unit": "px" } }
  ]
}
"#;

/// A pasted instance styled by a token named "Primary" with `color` set to
/// `color`, plus its own local source. Its breakpoint ids differ from the
/// project's.
pub fn fragment_json(color: &str) -> String {
    format!(
        r#"{{
  "breakpoints": [{{ "id": "fbase", "label": "Base" }}],
  "styleSources": [
    {{ "type": "token", "id": "t2", "name": "Primary" }},
    {{ "type": "local", "id": "flocal" }}
  ],
  "styleSourceSelections": [
    {{ "instanceId": "pasted", "values": ["t2", "flocal"] }}
  ],
  "styles": [
    {{ "styleSourceId": "t2", "breakpointId": "fbase", "property": "color",
      "value": {{ "type": "keyword", "value": "{color}" }} }},
    {{ "styleSourceId": "flocal", "breakpointId": "fbase", "property": "gap",
      "value": {{ "type": "unit", "value": 8, "unit": "px" }} }}
  ],
  "instanceIds": ["pasted"]
}}
"#
    )
}

/// Temp dir holding `project.json` and a fragment with the given color.
pub fn setup(fragment_color: &str) -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    std::fs::write(dir.path().join("project.json"), PROJECT).unwrap();
    std::fs::write(dir.path().join("fragment.json"), fragment_json(fragment_color)).unwrap();
    dir
}

pub fn path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

pub fn stylegraft_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stylegraft"))
        .args(args)
        .current_dir(dir)
        .env_remove("STYLEGRAFT_LOG")
        .env_remove("STYLEGRAFT_CONFIG")
        .output()
        .expect("failed to execute stylegraft")
}

/// Run stylegraft and assert it succeeds. Returns stdout.
pub fn stylegraft_ok(dir: &Path, args: &[&str]) -> String {
    let out = stylegraft_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "stylegraft {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    stdout.to_string()
}

/// Run stylegraft and assert it exits with `code`. Returns (stdout, stderr).
pub fn stylegraft_exit(dir: &Path, args: &[&str], code: i32) -> (String, String) {
    let out = stylegraft_in(dir, args);
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    assert_eq!(
        out.status.code(),
        Some(code),
        "stylegraft {}:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    (stdout, stderr)
}

/// Parse `project.json` back as loose JSON.
pub fn read_project(dir: &TempDir) -> serde_json::Value {
    let text = std::fs::read_to_string(path(dir, "project.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

/// Names of every token in a project document.
pub fn token_names(project: &serde_json::Value) -> Vec<String> {
    project["styleSources"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["type"] == "token")
        .map(|s| s["name"].as_str().unwrap().to_owned())
        .collect()
}
