//! `stackplan --json deploy` event stream

mod common;

use common::*;

#[test]
fn json_deploy_emits_ndjson_events_then_summary() {
    let env = TestEnv::builder().build();

    let result = env.run(&["--json", "deploy", "-e", "dev"]);

    assert_success!(result);
    let lines = result.json_lines();
    let events: Vec<&str> = lines
        .iter()
        .map(|l| l["event"].as_str().unwrap())
        .collect();

    assert_eq!(events.first(), Some(&"planned"));
    assert_eq!(events.last(), Some(&"summary"));
    assert_eq!(events.iter().filter(|e| **e == "stack_start").count(), 3);
    assert_eq!(events.iter().filter(|e| **e == "stack_complete").count(), 3);
    assert!(events.contains(&"resource_created"));
    assert!(events.contains(&"complete"));

    let summary = &lines.last().unwrap()["summary"];
    assert_eq!(summary["applied"], true);
    assert_eq!(summary["mode"], "standing");
}

#[test]
fn json_review_deploy_reports_resolved_imports() {
    let env = TestEnv::builder().build();
    assert_success!(env.run(&["deploy", "-e", "dev"]));

    let result = env.run(&[
        "deploy",
        "-e",
        "dev",
        "--pr",
        "9",
        "--image-tag",
        "sha-9",
        "--json",
    ]);

    assert_success!(result);
    let lines = result.json_lines();
    let imports: Vec<&serde_json::Value> = lines
        .iter()
        .filter(|l| l["event"] == "import_resolved")
        .collect();
    assert!(!imports.is_empty());
    assert!(imports
        .iter()
        .all(|l| l["stack"].as_str().unwrap().starts_with("webapp-dev-")));
}

#[test]
fn json_mode_keeps_errors_off_stdout() {
    let env = TestEnv::builder().build();

    let result = env.run(&[
        "deploy",
        "-e",
        "dev",
        "--pr",
        "9",
        "--image-tag",
        "sha-9",
        "--json",
    ]);

    assert_eq!(result.exit_code, 1);
    assert!(result.stderr.contains("Error [cross-stack import]"));
    for line in result.json_lines() {
        assert_ne!(line["event"], "stack_start");
        assert_ne!(line["event"], "summary");
    }
}
