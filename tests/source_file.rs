mod common;

use predicates::prelude::*;
use std::io::Write;

fn read_to_tempfile(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn runs_program_streamed_from_file() {
    let tf = read_to_tempfile(
        "Prints an A\n\
         ++++++++ [ > ++++++++ < - ]   eight times eight\n\
         > + .                         plus one\n",
    );
    common::cargo_bin()
        .arg("run")
        .arg("--file")
        .arg(tf.path())
        .assert()
        .success()
        .stdout("A")
        .stderr(predicate::str::is_empty());
}

#[test]
fn file_errors_show_context_from_the_file() {
    let tf = read_to_tempfile("+++\n]\n");
    common::cargo_bin()
        .arg("run")
        .arg("-f")
        .arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unmatched bracket ']' at position 4"))
        .stderr(predicate::str::contains("  +++ ] \n      ^"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn deep_file_errors_show_the_surrounding_window() {
    let code = format!("{}]{}", "+".repeat(5000), "-".repeat(100));
    let tf = read_to_tempfile(&code);
    let window = format!("  {}]{}\n  {}^", "+".repeat(32), "-".repeat(32), " ".repeat(32));
    common::cargo_bin()
        .arg("run")
        .arg("--file")
        .arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("at position 5000"))
        .stderr(predicate::str::contains(window));
}

#[test]
fn unmatched_open_in_file_reports_its_offset() {
    let tf = read_to_tempfile("# comment\n[+");
    common::cargo_bin()
        .arg("run")
        .arg("--file")
        .arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unmatched bracket '['"))
        .stderr(predicate::str::contains("at position 10"));
}

#[test]
fn missing_file_is_an_error() {
    common::cargo_bin()
        .arg("run")
        .arg("--file")
        .arg("/nonexistent/program.bf")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to open code file"));
}

#[test]
fn file_and_positional_code_conflict() {
    let tf = read_to_tempfile("+");
    common::cargo_bin()
        .arg("run")
        .arg("--file")
        .arg(tf.path())
        .arg("+")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot use positional code together with --file"));
}
