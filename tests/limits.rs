mod common;

use predicates::prelude::*;
use std::time::Duration;

fn infinite_bf() -> &'static str {
    "+[]" // increments to 1, then [] does nothing forever (infinite loop)
}

#[test]
fn step_limit_aborts_infinite_loop() {
    common::cargo_bin()
        .timeout(Duration::from_secs(5))
        .arg("run")
        .args(["--max-steps", "50"])
        .arg(infinite_bf())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("step limit exceeded (50)"))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn step_limit_from_environment() {
    common::cargo_bin()
        .timeout(Duration::from_secs(5))
        .env("BF_MAX_STEPS", "50")
        .arg("run")
        .arg(infinite_bf())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("step limit exceeded (50)"));
}

#[test]
fn flag_overrides_environment_step_limit() {
    common::cargo_bin()
        .timeout(Duration::from_secs(5))
        .env("BF_MAX_STEPS", "50")
        .arg("run")
        .args(["--max-steps", "7"])
        .arg(infinite_bf())
        .assert()
        .stderr(predicate::str::contains("step limit exceeded (7)"));
}

#[test]
fn timeout_aborts_infinite_loop() {
    common::cargo_bin()
        .timeout(Duration::from_secs(5))
        .arg("run")
        .args(["--timeout", "100"])
        .arg(infinite_bf())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Execution aborted").and(predicate::str::contains("timeout")))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn program_finishing_under_the_limits_succeeds() {
    common::cargo_bin()
        .timeout(Duration::from_secs(5))
        .arg("run")
        .args(["--max-steps", "1000", "--timeout", "2000"])
        .arg("++++++++[-]")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}
