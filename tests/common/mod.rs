use assert_cmd::prelude::*;
use assert_cmd::Command;

const BF_VARS: &[&str] = &[
    "BF_EOF",
    "BF_NEWLINE_AS_EOF",
    "BF_TAPE_SIZE",
    "BF_TAPE_LIMIT",
    "BF_TAPE_GROWTH",
    "BF_CELL_BITS",
    "BF_WRAP",
    "BF_MAX_STEPS",
    "BF_TIMEOUT_MS",
];

/// `bf` with no user config file and no BF_* overrides leaking in.
pub fn cargo_bin() -> Command {
    Command::from_std(std_cargo_bin())
}

/// Same isolation as [`cargo_bin`], as a plain `std::process::Command` for
/// tests that need to spawn and signal the process.
#[allow(dead_code)]
pub fn std_cargo_bin() -> std::process::Command {
    let mut cmd = std::process::Command::cargo_bin("bf").unwrap();
    for var in BF_VARS {
        cmd.env_remove(var);
    }
    cmd.env("XDG_CONFIG_HOME", "/nonexistent/bf-test-config");
    cmd
}

/// Run `bf run <code>` with `stdin` and return raw stdout bytes.
#[allow(dead_code)]
pub fn run_stdout(flags: &[&str], code: &str, stdin: &str) -> Vec<u8> {
    let mut cmd = cargo_bin();
    cmd.arg("run").args(flags).arg(code).write_stdin(stdin);
    cmd.assert().success().get_output().stdout.clone()
}
