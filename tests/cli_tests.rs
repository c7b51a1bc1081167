use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

const SANDBOX: &str = r#"
[logging]
level = "warn"

[lifecycle]
progress_interval_ms = 20

[sandbox]
launch_step_ms = 5
app_interval_ms = 10

[[sandbox.experiments]]
name = "exp1"
vms = 2
scenario = "baseline"
"#;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

fn labctl() -> Command {
    Command::new(env!("CARGO_BIN_EXE_labctl"))
}

#[test]
fn cycle_prints_start_and_stop_bodies() {
    let config = write_config(SANDBOX);

    labctl()
        .args(["cycle", "exp1", "--hold-ms", "30", "--config"])
        .arg(config.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""running":true"#))
        .stdout(predicate::str::contains(r#""running":false"#))
        .stdout(predicate::str::contains(r#""scenario":"baseline""#));
}

#[test]
fn watch_prints_lifecycle_events() {
    let config = write_config(SANDBOX);

    labctl()
        .args(["--watch", "start", "exp1", "--config"])
        .arg(config.path())
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "experiments/start:update:exp1 experiment exp1 starting",
        ))
        .stderr(predicate::str::is_match("(?m)experiment exp1 start$").unwrap());
}

#[test]
fn status_of_defined_experiment_is_stopped() {
    let config = write_config(SANDBOX);

    labctl()
        .args(["status", "exp1", "--config"])
        .arg(config.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("stopped"));
}

#[test]
fn stopping_an_idle_experiment_fails() {
    let config = write_config(SANDBOX);

    labctl()
        .args(["stop", "exp1", "--config"])
        .arg(config.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unable to stop experiment exp1"));
}

#[test]
fn invalid_config_exits_with_config_code() {
    let config = write_config("[lifecycle]\nprogress_interval_ms = 0\n");

    labctl()
        .args(["start", "exp1", "--config"])
        .arg(config.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("progress_interval_ms"));
}
