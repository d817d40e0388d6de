//! Integration tests for one-shot `stylebind` runs.

use serial_test::serial;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "stylebind-cli", "--bin", "stylebind", "--"]);
    cmd
}

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn run(root: &Path, extra: &[&str]) -> Output {
    cargo_bin()
        .args(extra)
        .arg("--no-pretty")
        .arg("-p")
        .arg(root)
        .output()
        .expect("Failed to run stylebind")
}

#[test]
#[serial]
fn test_clean_project_emits_declarations() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "tsconfig.json", "{}");
    write(root, "src/a.module.css", "@import './b.module.css';\n.a { color: red; }");
    write(root, "src/b.module.css", ".b {}");

    let output = run(root, &[]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let dts = fs::read_to_string(root.join("generated/src/a.module.css.d.ts")).unwrap();
    assert!(dts.starts_with("// @ts-nocheck\n"));
    assert!(dts.contains("'a': '' as readonly string"));
    assert!(root.join("generated/src/b.module.css.d.ts").is_file());
}

#[test]
#[serial]
fn test_semantic_diagnostic_fails_run() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "tsconfig.json", "{}");
    write(root, "a.module.css", "@value y from './missing.module.css';");

    let output = run(root, &[]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("a.module.css:1:16 - error: Cannot import module './missing.module.css'"),
        "stderr: {stderr}"
    );
    assert!(!root.join("generated").exists());
}

#[test]
#[serial]
fn test_syntax_error_hides_semantic_diagnostics() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "tsconfig.json", "{}");
    write(root, "a.module.css", "@value y from './missing.module.css';");
    write(root, "b.module.css", ".b {");

    let output = run(root, &[]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: Unclosed block"), "stderr: {stderr}");
    assert!(!stderr.contains("Cannot import module"));
}

#[test]
#[serial]
fn test_json_report() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "tsconfig.json", "{}");
    write(root, "a.module.css", "@value q from './b.module.css';");
    write(root, "b.module.css", ".p {}");

    let output = run(root, &["--json"]);
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["schema_version"].as_u64(), Some(1));
    assert_eq!(json["ok"].as_bool(), Some(false));

    let diagnostics = json["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0]["text"].as_str(),
        Some("Module './b.module.css' has no exported token 'q'.")
    );
    assert_eq!(diagnostics[0]["category"].as_str(), Some("error"));
    assert_eq!(diagnostics[0]["start"]["line"].as_u64(), Some(1));
}

#[test]
#[serial]
fn test_empty_project_reports_not_found() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "tsconfig.json", "{}");

    let output = run(root, &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: The file specified in tsconfig.json not found."));
}

#[test]
#[serial]
fn test_clean_removes_stale_outputs() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "tsconfig.json", r#"{ "cmkOptions": { "dtsOutDir": "types" } }"#);
    write(root, "a.module.css", ".a {}");
    write(root, "types/stale.module.css.d.ts", "// stale");

    let output = run(root, &["--clean"]);
    assert!(output.status.success());
    assert!(!root.join("types/stale.module.css.d.ts").exists());
    assert!(root.join("types/a.module.css.d.ts").is_file());
}

#[test]
#[serial]
fn test_project_option_accepts_config_file() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "tsconfig.app.json", r#"{ "include": ["app"] }"#);
    write(root, "app/a.module.css", ".a {}");
    write(root, "other/b.module.css", ".b {");

    let output = run(&root.join("tsconfig.app.json"), &[]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(root.join("generated/app/a.module.css.d.ts").is_file());
}
