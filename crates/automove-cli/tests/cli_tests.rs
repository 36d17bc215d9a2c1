// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
//! End-to-end runs of the `automove` binary.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SCENE: &str = r#"{
    "nodes": [
        { "id": "a", "position": { "x": 0, "y": 0 } },
        { "id": "b", "position": { "x": 10, "y": 20 } },
        { "id": "L", "position": { "x": 50, "y": 50 }, "classes": ["label"] }
    ],
    "edges": [
        { "source": "a", "target": "L" },
        { "source": "L", "target": "b" }
    ]
}"#;

fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn automove() -> Command {
    Command::cargo_bin("automove").unwrap()
}

#[test]
fn run_applies_rules_and_moves_then_prints_json() {
    let dir = TempDir::new().unwrap();
    let scene = write(&dir, "scene.json", SCENE);
    let rules = write(&dir, "rules.json", r#"[{ "nodesMatching": ".label" }]"#);

    automove()
        .arg("run")
        .arg("--scene")
        .arg(&scene)
        .arg("--rules")
        .arg(&rules)
        .args(["--move", "a=20,0", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""id": "L""#))
        .stdout(predicate::str::contains(r#""x": 15.0"#))
        .stdout(predicate::str::contains(r#""automoves": 2"#));
}

#[test]
fn run_prints_a_table_by_default() {
    let dir = TempDir::new().unwrap();
    let scene = write(&dir, "scene.json", SCENE);
    let rules = write(
        &dir,
        "rules.json",
        r#"{ "nodesMatching": ["a"], "reposition": { "x1": 5, "y1": 5, "x2": 9, "y2": 9 } }"#,
    );

    automove()
        .arg("run")
        .arg("--scene")
        .arg(&scene)
        .arg("--rules")
        .arg(&rules)
        .assert()
        .success()
        .stdout(predicate::str::contains("automoves"))
        .stdout(predicate::str::contains("| a "));
}

#[test]
fn check_reports_each_rule() {
    let dir = TempDir::new().unwrap();
    let scene = write(&dir, "scene.json", SCENE);
    let rules = write(
        &dir,
        "rules.json",
        r##"[{ "nodesMatching": ".label" }, { "nodesMatching": "#b", "reposition": "viewport" }]"##,
    );

    automove()
        .arg("check")
        .arg("--scene")
        .arg(&scene)
        .arg("--rules")
        .arg(&rules)
        .assert()
        .success()
        .stdout(predicate::str::contains("rule 0: ok (mean, 2 bindings)"))
        .stdout(predicate::str::contains("rule 1: ok (viewport, 1 bindings)"));
}

#[test]
fn check_fails_on_invalid_rules() {
    let dir = TempDir::new().unwrap();
    let scene = write(&dir, "scene.json", SCENE);
    let rules = write(
        &dir,
        "rules.json",
        r#"[{ "nodesMatching": ".label" }, { "reposition": "middle" }, { "nodesMatching": "node >" }]"#,
    );

    automove()
        .arg("check")
        .arg("--scene")
        .arg(&scene)
        .arg("--rules")
        .arg(&rules)
        .assert()
        .failure()
        .stderr(predicate::str::contains("rule 1: error: can not create reposition"))
        .stderr(predicate::str::contains("rule 2: error: invalid selector"))
        .stderr(predicate::str::contains("2 of 3 rules invalid"));
}

#[test]
fn unknown_move_target_is_an_error() {
    let dir = TempDir::new().unwrap();
    let scene = write(&dir, "scene.json", SCENE);
    let rules = write(&dir, "rules.json", "[]");

    automove()
        .arg("run")
        .arg("--scene")
        .arg(&scene)
        .arg("--rules")
        .arg(&rules)
        .args(["--move", "zz=1,1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown node `zz`"));
}

#[test]
fn malformed_move_is_rejected_by_the_parser() {
    automove()
        .args(["run", "--scene", "s.json", "--rules", "r.json", "--move", "oops"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected ID=X,Y"));
}

#[test]
fn missing_scene_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let rules = write(&dir, "rules.json", "[]");
    automove()
        .arg("check")
        .arg("--scene")
        .arg(dir.path().join("absent.json"))
        .arg("--rules")
        .arg(&rules)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
