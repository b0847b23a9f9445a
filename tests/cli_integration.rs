//! CLI integration tests for tick
//!
//! Each test runs the binary in its own project directory with `HOME` and
//! `XDG_CONFIG_HOME` pointed at a private temp directory, so the user's real
//! configuration is never read or written.

use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct Sandbox {
    home: TempDir,
    project: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
            project: TempDir::new().unwrap(),
        }
    }

    /// Sandbox whose project has a local config listing `files`
    fn with_project_files(files: &[&str]) -> Self {
        let sandbox = Self::new();
        sandbox
            .tick()
            .arg("path")
            .arg("set")
            .args(files)
            .assert()
            .success();
        sandbox
    }

    /// Get a command instance for the tick binary, run inside the project
    fn tick(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("tick"));
        cmd.current_dir(self.project.path())
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path().join(".config"))
            .env_remove("RUST_LOG");
        cmd
    }

    fn write(&self, name: &str, lines: &[&str]) {
        let path = self.project.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, lines.join("\n")).unwrap();
    }

    fn read(&self, name: &str) -> Vec<String> {
        read_lines(&self.project.path().join(name))
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self
            .tick()
            .args(args)
            .args(["--format", "json"])
            .assert()
            .success();
        serde_json::from_slice(&output.get_output().stdout).unwrap()
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .split('\n')
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Advancing
// =============================================================================

#[test]
fn test_next_marks_first_task() {
    let sandbox = Sandbox::with_project_files(&["TODO.md"]);
    sandbox.write("TODO.md", &["# H", "- [ ] A", "- [ ] B"]);

    sandbox
        .tick()
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("👉 - [ ] A"))
        .stdout(predicate::str::contains(
            "Total: 2 task(s) | Completed: 0 (0.0%) | Remaining: 2",
        ));

    assert_eq!(sandbox.read("TODO.md"), vec!["# H", "👉 - [ ] A", "- [ ] B"]);
}

#[test]
fn test_next_completes_and_moves_marker() {
    let sandbox = Sandbox::with_project_files(&["TODO.md"]);
    sandbox.write("TODO.md", &["# H", "- [ ] A", "- [ ] B"]);

    sandbox.tick().arg("next").assert().success();
    sandbox
        .tick()
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed: A"))
        .stdout(predicate::str::contains(
            "Total: 2 task(s) | Completed: 1 (50.0%) | Remaining: 1",
        ));

    assert_eq!(sandbox.read("TODO.md"), vec!["# H", "- [x] A", "👉 - [ ] B"]);
}

#[test]
fn test_next_reports_all_complete() {
    let sandbox = Sandbox::with_project_files(&["TODO.md"]);
    sandbox.write("TODO.md", &["# H", "- [ ] A", "- [ ] B"]);

    sandbox.tick().arg("next").assert().success();
    sandbox.tick().arg("next").assert().success();
    sandbox
        .tick()
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("All tasks complete!"))
        .stdout(predicate::str::contains("Completed: 2 (100.0%) | Remaining: 0"));

    assert_eq!(sandbox.read("TODO.md"), vec!["# H", "- [x] A", "- [x] B"]);
}

#[test]
fn test_next_moves_to_second_file() {
    let sandbox = Sandbox::with_project_files(&["one.md", "two.md"]);
    sandbox.write("one.md", &["- [x] Done"]);
    sandbox.write("two.md", &["- [ ] C"]);

    let json = sandbox.json(&["next"]);

    assert_eq!(json["status"], "NEXT_TASK_FOUND");
    assert_eq!(json["task"]["text"], "C");
    assert!(json["task"]["path"].as_str().unwrap().ends_with("two.md"));
    assert_eq!(sandbox.read("two.md"), vec!["👉 - [ ] C"]);
    assert_eq!(sandbox.read("one.md"), vec!["- [x] Done"]);
}

#[test]
fn test_next_shows_context_headers() {
    let sandbox = Sandbox::with_project_files(&["TODO.md"]);
    sandbox.write("TODO.md", &["# Release", "## Docs", "- [ ] Write changelog"]);

    sandbox
        .tick()
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("[Release - Docs]"));
}

#[test]
fn test_next_without_tasks() {
    let sandbox = Sandbox::with_project_files(&["TODO.md"]);
    sandbox.write("TODO.md", &["# Notes", "nothing to do"]);

    let json = sandbox.json(&["next"]);
    assert_eq!(json["status"], "NO_TASKS");
}

#[test]
fn test_next_fails_when_no_file_is_readable() {
    let sandbox = Sandbox::with_project_files(&["missing.md"]);

    sandbox
        .tick()
        .arg("next")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not read any task file"));
}

#[test]
fn test_next_uses_global_files_outside_projects() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.home.path().join("TODO.md"), "- [ ] From home\n").unwrap();

    sandbox
        .tick()
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("From home"));

    assert_eq!(
        read_lines(&sandbox.home.path().join("TODO.md")),
        vec!["👉 - [ ] From home", ""]
    );
}

// =============================================================================
// Reset
// =============================================================================

#[test]
fn test_reset_unchecks_tasks() {
    let sandbox = Sandbox::with_project_files(&["TODO.md"]);
    sandbox.write("TODO.md", &["- [x] A", "- [ ] B", "- [X] C"]);

    let json = sandbox.json(&["reset", "TODO.md"]);

    assert_eq!(json[0]["reset_count"], 2);
    assert_eq!(sandbox.read("TODO.md"), vec!["- [ ] A", "- [ ] B", "- [ ] C"]);
}

#[test]
fn test_reset_defaults_to_primary_file() {
    let sandbox = Sandbox::with_project_files(&["main.md", "other.md"]);
    sandbox.write("main.md", &["- [x] A"]);
    sandbox.write("other.md", &["- [x] B"]);

    sandbox
        .tick()
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reset 1 task(s)"));

    assert_eq!(sandbox.read("main.md"), vec!["- [ ] A"]);
    assert_eq!(sandbox.read("other.md"), vec!["- [x] B"]);
}

#[test]
fn test_reset_all_files() {
    let sandbox = Sandbox::with_project_files(&["main.md", "other.md"]);
    sandbox.write("main.md", &["- [x] A"]);
    sandbox.write("other.md", &["- [x] B", "- [x] C"]);

    let json = sandbox.json(&["reset", "--all"]);

    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[1]["reset_count"], 2);
    assert_eq!(sandbox.read("other.md"), vec!["- [ ] B", "- [ ] C"]);
}

#[test]
fn test_reset_missing_file_fails() {
    let sandbox = Sandbox::with_project_files(&["TODO.md"]);

    sandbox.tick().args(["reset", "nope.md"]).assert().failure();
}

// =============================================================================
// Stats and add
// =============================================================================

#[test]
fn test_stats_totals_across_files() {
    let sandbox = Sandbox::with_project_files(&["a.md", "b.md", "gone.md"]);
    sandbox.write("a.md", &["- [x] A", "- [ ] B"]);
    sandbox.write("b.md", &["- [ ] C"]);

    let json = sandbox.json(&["stats"]);

    assert_eq!(json["total"]["total"], 3);
    assert_eq!(json["total"]["completed"], 1);
    assert_eq!(json["total"]["remaining"], 2);
    assert_eq!(json["files"][2]["exists"], false);
}

#[test]
fn test_add_appends_to_paste_target() {
    let sandbox = Sandbox::with_project_files(&["TODO.md"]);
    sandbox.write("TODO.md", &["- [ ] A", ""]);

    sandbox
        .tick()
        .args(["add", "Buy", "milk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added task"));

    assert_eq!(sandbox.read("TODO.md"), vec!["- [ ] A", "- [ ] Buy milk", ""]);
}

#[test]
fn test_add_creates_paste_file() {
    let sandbox = Sandbox::new();
    sandbox
        .tick()
        .args(["path", "set", "TODO.md", "--paste", "inbox.md"])
        .assert()
        .success();

    sandbox.tick().args(["add", "New idea"]).assert().success();

    assert_eq!(sandbox.read("inbox.md"), vec!["- [ ] New idea", ""]);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_path_set_writes_local_config() {
    let sandbox = Sandbox::new();

    sandbox
        .tick()
        .args(["path", "set", "TODO.md", "docs/later.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 2 task file(s)"));

    let config = fs::read_to_string(sandbox.project.path().join(".tick/config.toml")).unwrap();
    let table: toml::Table = toml::from_str(&config).unwrap();
    assert_eq!(table["tasks"]["primary"].as_str(), Some("TODO.md"));
    assert_eq!(table["tasks"]["all"].as_array().unwrap().len(), 2);
}

#[test]
fn test_path_set_rejects_empty_list() {
    let sandbox = Sandbox::new();

    sandbox
        .tick()
        .args(["path", "set"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("At least one task file path is required"));

    assert!(!sandbox.project.path().join(".tick").exists());
}

#[test]
fn test_path_set_rejects_duplicate_files() {
    let sandbox = Sandbox::new();

    sandbox
        .tick()
        .args(["path", "set", "TODO.md", "./TODO.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("listed more than once"));

    assert!(!sandbox.project.path().join(".tick").exists());
}

#[test]
fn test_path_show_found_from_subdirectory() {
    let sandbox = Sandbox::with_project_files(&["TODO.md"]);
    let nested = sandbox.project.path().join("src/deep");
    fs::create_dir_all(&nested).unwrap();

    let output = sandbox
        .tick()
        .current_dir(&nested)
        .args(["path", "show", "--format", "json"])
        .assert()
        .success();
    let json: Value = serde_json::from_slice(&output.get_output().stdout).unwrap();

    assert_eq!(json["scope"], "local");
    assert_eq!(json["exists"], true);
    let expected = sandbox.project.path().join("TODO.md");
    assert_eq!(json["paths"][0].as_str(), expected.to_str());
}

#[test]
fn test_path_show_global_flag_skips_project() {
    let sandbox = Sandbox::with_project_files(&["TODO.md"]);

    let json = sandbox.json(&["path", "show", "--global"]);

    assert_eq!(json["scope"], "global");
    assert_eq!(json["exists"], false);
}

#[test]
fn test_config_timestamp_defaults_to_zero() {
    let sandbox = Sandbox::new();

    sandbox
        .tick()
        .args(["config", "get", "last_update_check_timestamp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("last_update_check_timestamp = 0"));
}

#[test]
fn test_config_set_and_get_timestamp() {
    let sandbox = Sandbox::new();

    sandbox
        .tick()
        .args(["config", "set", "last_update_check_timestamp", "1700000000000"])
        .assert()
        .success();

    let json = sandbox.json(&["config", "get", "last_update_check_timestamp"]);
    assert_eq!(json["scope"], "global");
    assert_eq!(json["value"], 1_700_000_000_000_i64);
}

#[test]
fn test_config_set_rejects_bad_timestamp() {
    let sandbox = Sandbox::new();

    sandbox
        .tick()
        .args(["config", "set", "last_update_check_timestamp", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));
}

#[test]
fn test_malformed_config_falls_back_to_defaults() {
    let sandbox = Sandbox::new();
    sandbox.write(".tick/config.toml", &["[tasks", "all = 3"]);
    sandbox.write("TODO.md", &["- [ ] Still works"]);

    // A malformed local document still marks the project root
    sandbox
        .tick()
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("Still works"));
}
