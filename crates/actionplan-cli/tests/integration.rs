#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn actionplan(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("actionplan").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

fn write_plan(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

const ROUTES: &str = r#"
actions:
  - discriminator: route:about
    info: views:30
    op: { type: set, key: route.about, value: /about }
  - discriminator: route:home
    after: [route:about]
    info: views:10
    op: { type: set, key: route.home, value: / }
  - discriminator: settings
    phase: phase0
    op: { type: set, key: debug, value: "false" }
  - discriminator: settings
    phase: phase0
    override: true
    op: { type: set, key: debug, value: "true" }
"#;

// ---------------------------------------------------------------------------
// actionplan resolve
// ---------------------------------------------------------------------------

#[test]
fn resolve_prints_phase_then_hint_order() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir, "plan.yaml", ROUTES);

    let output = actionplan(&dir)
        .args(["resolve", plan.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();

    let settings = stdout.find("settings").unwrap();
    let about = stdout.find("route:about").unwrap();
    let home = stdout.find("route:home").unwrap();
    assert!(settings < about && about < home, "unexpected order:\n{stdout}");
    assert!(stdout.contains("DISCRIMINATOR"));
}

#[test]
fn resolve_json_lists_steps() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir, "plan.yaml", ROUTES);

    let output = actionplan(&dir)
        .args(["--json", "resolve", plan.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let steps: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let steps = steps.as_array().unwrap();
    assert_eq!(steps.len(), 3);

    let keys: Vec<&str> = steps
        .iter()
        .map(|s| s["discriminator"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["settings", "route:about", "route:home"]);
    // Overriding action is the survivor.
    assert_eq!(steps[0]["order"], 3);
    assert_eq!(steps[0]["phase"], -30);
}

#[test]
fn resolve_reports_conflict() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(
        &dir,
        "plan.yaml",
        r#"
actions:
  - discriminator: route:home
    info: views:10
    op: { type: set, key: a, value: "1" }
  - discriminator: route:home
    info: views:20
    op: { type: set, key: a, value: "2" }
"#,
    );

    actionplan(&dir)
        .args(["resolve", plan.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Conflicting configuration actions"))
        .stderr(predicate::str::contains("  For: route:home"))
        .stderr(predicate::str::contains("views:10"))
        .stderr(predicate::str::contains("views:20"));
}

#[test]
fn resolve_reports_cycle() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(
        &dir,
        "plan.yaml",
        r#"
actions:
  - discriminator: A
    after: [B]
    op: { type: unset, key: x }
  - discriminator: B
    after: [A]
    op: { type: unset, key: x }
"#,
    );

    actionplan(&dir)
        .args(["resolve", plan.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Implicit ordering cycle:'A' sorts before ['B']; 'B' sorts before ['A']",
        ));
}

// ---------------------------------------------------------------------------
// actionplan run
// ---------------------------------------------------------------------------

#[test]
fn run_applies_settings() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir, "plan.yaml", ROUTES);

    actionplan(&dir)
        .args(["run", plan.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Executed 3 action(s)."))
        .stdout(predicate::str::contains("route.home"))
        .stdout(predicate::str::contains("true"));
}

#[test]
fn run_json_output() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(
        &dir,
        "plan.json",
        r#"{"actions": [
            {"discriminator": "a", "op": {"type": "set", "key": "k", "value": "v"}},
            {"op": {"type": "append", "key": "k", "value": "w"}}
        ]}"#,
    );

    let output = actionplan(&dir)
        .args(["run", "--json", plan.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["executed"], 2);
    assert_eq!(value["settings"]["k"], "v,w");
}

#[test]
fn run_stops_at_first_failure() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(
        &dir,
        "plan.yaml",
        r#"
actions:
  - op: { type: set, key: first, value: "1" }
  - discriminator: broken
    info: views:20
    op: { type: fail, message: boom }
  - op: { type: set, key: never, value: "1" }
"#,
    );

    actionplan(&dir)
        .args(["run", plan.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PlanFailure: boom\n  in:\n"))
        .stderr(predicate::str::contains("views:20"))
        .stdout(predicate::str::contains("never").not());
}

#[test]
fn run_failure_prints_execution_error_once() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(
        &dir,
        "plan.yaml",
        r#"
actions:
  - discriminator: broken
    info: views:20
    op: { type: fail, message: boom }
"#,
    );

    let expected = format!(
        "error: PlanFailure: boom\n  in:\n  {}: action #1\nviews:20\n",
        plan.display()
    );
    actionplan(&dir)
        .args(["run", plan.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::ends_with(expected))
        .stderr(predicate::str::contains("views:20: boom").not());
}

#[test]
fn missing_plan_error_keeps_cause() {
    let dir = TempDir::new().unwrap();
    actionplan(&dir)
        .args(["run", "nope.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: failed to load plan nope.yaml: "));
}

// ---------------------------------------------------------------------------
// actionplan check
// ---------------------------------------------------------------------------

#[test]
fn check_summarizes_plan() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir, "plan.yaml", ROUTES);

    actionplan(&dir)
        .args(["check", plan.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: 3 action(s) in 2 phase(s)"));
}

#[test]
fn check_warns_on_ignore_policy() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(
        &dir,
        "plan.yaml",
        "options:\n  hint_policy: ignore\nactions:\n  - discriminator: a\n    before: [ghost]\n    op: { type: unset, key: x }\n",
    );

    actionplan(&dir)
        .args(["check", plan.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("warning: hint_policy 'ignore'"));
}

#[test]
fn check_deny_policy_rejects_unknown_hint() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(
        &dir,
        "plan.yaml",
        "options:\n  hint_policy: deny\nactions:\n  - discriminator: a\n    before: [ghost]\n    op: { type: unset, key: x }\n",
    );

    actionplan(&dir)
        .args(["check", plan.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown discriminator 'ghost'"));
}

#[test]
fn missing_plan_file_fails() {
    let dir = TempDir::new().unwrap();
    actionplan(&dir)
        .args(["check", "nope.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load plan"));
}
