use std::fs;

use navsync::core::action::StackAction;
use navsync::replay::{CorrectiveAction, ReplayError, ReplayOptions, load_trace, replay};

// ============================================================================
// Helper Functions
// ============================================================================

fn write_trace(dir: &tempfile::TempDir, json: &str) -> std::path::PathBuf {
    let path = dir.path().join("trace.json");
    fs::write(&path, json).unwrap();
    path
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_and_replay_full_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_trace(
        &dir,
        r#"{
            "prefix": ["login"],
            "tabs": ["home", "search"],
            "steps": [
                { "set_stack": ["feed"] },
                { "push": "post-42" },
                { "push": "comments" },
                { "swipe_back": 2 },
                { "tap_tab": 1 },
                { "present": "compose" },
                "user_dismiss"
            ]
        }"#,
    );

    let trace = load_trace(&path).unwrap();
    let report = replay(&trace, &ReplayOptions::default()).unwrap();

    assert_eq!(report.stack, vec!["feed"]);
    assert_eq!(report.host_stack, vec!["login", "feed"]);
    assert_eq!(report.replacements.len(), 3);
    assert_eq!(report.selected_tab.as_deref(), Some("search"));
    assert_eq!(report.presented, None);
    assert_eq!(report.corrective_actions.len(), 3);
    assert_eq!(
        report.corrective_actions[0],
        CorrectiveAction::Stack(StackAction::PopItems(2))
    );
    // feed, post-42, comments, two tabs, compose
    assert_eq!(report.views_created, 6);
    assert_eq!(report.integrity_warnings, 0);
}

#[test]
fn test_report_serializes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_trace(&dir, r#"{ "steps": [{ "push": "a" }, { "push": "b" }, { "pop": 1 }] }"#);

    let report = replay(&load_trace(&path).unwrap(), &ReplayOptions::default()).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["stack"], serde_json::json!(["a"]));
    assert_eq!(json["replacements"][0]["animated"], serde_json::json!(false));
    assert_eq!(json["replacements"][1]["animated"], serde_json::json!(true));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_trace(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ReplayError::Io(_)));
}

#[test]
fn test_unknown_step_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_trace(&dir, r#"{ "steps": [{ "teleport": "x" }] }"#);
    let err = load_trace(&path).unwrap_err();
    assert!(matches!(err, ReplayError::Parse(_)));
    assert!(err.to_string().starts_with("trace parse error"));
}

#[test]
fn test_invalid_step_reports_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_trace(&dir, r#"{ "steps": [{ "push": "a" }, { "select_tab": "home" }] }"#);
    let err = replay(&load_trace(&path).unwrap(), &ReplayOptions::default()).unwrap_err();
    assert_eq!(err.to_string(), "invalid trace at step 1: trace declares no tabs");
}
