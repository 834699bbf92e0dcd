#![cfg(unix)]

mod common;

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Give `bf` time to install its Ctrl+C handler, then send SIGINT.
fn interrupt(child: &Child) {
    thread::sleep(Duration::from_millis(500));
    let status = Command::new("kill")
        .arg("-INT")
        .arg(child.id().to_string())
        .status()
        .expect("kill");
    assert!(status.success());
}

/// Wait for `child` to exit, failing if it takes longer than `bound`.
fn wait_within(child: &mut Child, bound: Duration) -> std::process::ExitStatus {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        if started.elapsed() > bound {
            let _ = child.kill();
            panic!("bf did not exit within {:?} of SIGINT", bound);
        }
        thread::sleep(Duration::from_millis(20));
    }
}

fn spawn_bf(code: &str) -> Child {
    common::std_cargo_bin()
        .arg("run")
        .arg(code)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap()
}

fn stderr_of(child: &mut Child) -> String {
    let mut err = String::new();
    child.stderr.take().unwrap().read_to_string(&mut err).unwrap();
    err
}

#[test]
fn sigint_while_blocked_on_input_exits_130() {
    let mut child = spawn_bf(",");
    // Hold stdin open so ',' keeps blocking.
    let stdin = child.stdin.take();

    interrupt(&child);
    let status = wait_within(&mut child, Duration::from_secs(3));
    drop(stdin);

    assert_eq!(status.code(), Some(130));
    assert!(stderr_of(&mut child).contains("Execution aborted: interrupted"));
}

#[test]
fn sigint_during_execution_exits_130() {
    let mut child = spawn_bf("+[]");
    let stdin = child.stdin.take();

    interrupt(&child);
    let status = wait_within(&mut child, Duration::from_secs(3));
    drop(stdin);

    assert_eq!(status.code(), Some(130));
    assert!(stderr_of(&mut child).contains("Execution aborted: interrupted"));
}
