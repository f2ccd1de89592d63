//! CLI behavior tests.
//!
//! Each test runs the `cultiv` binary and checks its exit status and
//! output files.

use std::fs;
use std::process::{Command, Output};

fn cultiv(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cultiv"))
        .args(args)
        .output()
        .expect("failed to run cultiv")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============================================================================
// version / layout
// ============================================================================

#[test]
fn test_version() {
    let out = cultiv(&["version"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_layout_json() {
    let out = cultiv(&["layout", "--distance", "5", "--json"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let summary: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(summary["distance"], 5);
    assert_eq!(summary["data_qubits"], 25);
    assert_eq!(summary["patch_size"], 72);
}

#[test]
fn test_layout_rejects_even_distance() {
    let out = cultiv(&["layout", "--distance", "4"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Error"));
}

// ============================================================================
// generate
// ============================================================================

#[test]
fn test_generate_to_stdout() {
    let out = cultiv(&["generate", "--distance", "5", "--noise", "0"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.starts_with("QUBIT_COORDS"));
    assert!(text.contains("DETECTOR"));
    assert!(text.contains("OBSERVABLE_INCLUDE(0)"));
    assert!(!text.contains("DEPOLARIZE"));
}

#[test]
fn test_generate_from_json_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(
        &config,
        r#"{ "distance": 7, "prep": "unitstab", "helper_length": 5 }"#,
    )
    .unwrap();
    let target = dir.path().join("d7.stim");

    let out = cultiv(&[
        "generate",
        "--config",
        config.to_str().unwrap(),
        "--output",
        target.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", stderr(&out));
    let text = fs::read_to_string(&target).unwrap();
    assert!(text.contains("DEPOLARIZE2(0.001)"));
    assert!(text.contains("OBSERVABLE_INCLUDE(0)"));
}

#[test]
fn test_generate_from_yaml_config_with_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    fs::write(&config, "distance: 5\npostselect: rotated\nembedding: native\n").unwrap();
    let target = dir.path().join("program.json");

    let out = cultiv(&[
        "generate",
        "--config",
        config.to_str().unwrap(),
        "--hardware",
        "neutral_atom",
        "--cultivation-only",
        "--verify",
        "-o",
        target.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", stderr(&out));
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    assert!(json.is_object());
}

#[test]
fn test_generate_unknown_prep_fails() {
    let out = cultiv(&["generate", "--prep", "teleport"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("--prep"));
}

#[test]
fn test_generate_invalid_distance_fails() {
    let out = cultiv(&["generate", "--distance", "6"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Error"));
}

#[test]
fn test_generate_unknown_config_format_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "distance = 5\n").unwrap();

    let out = cultiv(&["generate", "--config", config.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Unknown config format"));
}
