//! Integration tests for the neng-pass CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.  The
//! master key comes from `NENG_PASS_MASTER_KEY` so no prompt is shown,
//! and every test gets its own data directory with cheap Argon2 params.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const FAST_SETTINGS: &str = "\
argon2_memory_kib = 8192
argon2_iterations = 1
argon2_parallelism = 1
";

/// Helper: a data directory with fast KDF settings.
fn data_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child("neng-pass.toml").write_str(FAST_SETTINGS).unwrap();
    tmp
}

/// Helper: a Command pointing at the neng-pass binary and `dir`.
fn neng_pass(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("neng-pass").expect("binary should exist");
    cmd.env("NENG_PASS_DATA_DIR", dir.path())
        .env_remove("NENG_PASS_MASTER_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn neng_pass_with_key(dir: &TempDir, key: &str) -> Command {
    let mut cmd = neng_pass(dir);
    cmd.env("NENG_PASS_MASTER_KEY", key);
    cmd
}

#[test]
fn help_flag_shows_usage() {
    let tmp = data_dir();
    neng_pass(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("master key"))
        .stdout(predicate::str::contains("set-master"))
        .stdout(predicate::str::contains("new"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn no_args_shows_usage() {
    let tmp = data_dir();
    neng_pass(&tmp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn generate_prints_password_of_requested_length() {
    let tmp = data_dir();
    let out = neng_pass(&tmp)
        .args(["generate", "--length", "20"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let pw = String::from_utf8(out).unwrap();
    let pw = pw.trim_end_matches('\n');
    assert_eq!(pw.chars().count(), 20);
    assert!(pw.bytes().all(|b| (b'!'..=b'~').contains(&b)));
}

#[test]
fn generate_defaults_to_sixteen_characters() {
    let tmp = data_dir();
    let out = neng_pass(&tmp)
        .arg("generate")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(out).unwrap().trim_end_matches('\n').len(), 16);
}

#[test]
fn commands_needing_a_key_fail_before_setup() {
    let tmp = data_dir();
    neng_pass_with_key(&tmp, "hunter2")
        .args(["set", "github", "p@ss"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("set-master"));
}

#[test]
fn full_lifecycle() {
    let tmp = data_dir();

    neng_pass_with_key(&tmp, "hunter2")
        .arg("set-master")
        .assert()
        .success()
        .stdout(predicate::str::contains("Master key set"));

    neng_pass_with_key(&tmp, "hunter2")
        .args(["set", "github", "p@ss"])
        .assert()
        .success()
        .stdout(predicate::str::contains("github"));

    neng_pass_with_key(&tmp, "hunter2")
        .args(["get", "github", "--raw"])
        .assert()
        .success()
        .stdout("p@ss\n");

    neng_pass(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("github"));

    neng_pass(&tmp)
        .args(["delete", "github", "--force"])
        .assert()
        .success();

    neng_pass_with_key(&tmp, "hunter2")
        .args(["get", "github", "--raw"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn set_master_twice_fails() {
    let tmp = data_dir();
    neng_pass_with_key(&tmp, "hunter2")
        .arg("set-master")
        .assert()
        .success();
    neng_pass_with_key(&tmp, "other")
        .arg("set-master")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already been set"));
}

#[test]
fn wrong_master_key_is_rejected() {
    let tmp = data_dir();
    neng_pass_with_key(&tmp, "hunter2")
        .arg("set-master")
        .assert()
        .success();
    neng_pass_with_key(&tmp, "hunter2")
        .args(["set", "github", "p@ss"])
        .assert()
        .success();

    neng_pass_with_key(&tmp, "wrong")
        .args(["get", "github", "--raw"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("p@ss").not())
        .stderr(predicate::str::contains("wrong master key"));
}

#[test]
fn new_generates_and_stores() {
    let tmp = data_dir();
    neng_pass_with_key(&tmp, "hunter2")
        .arg("set-master")
        .assert()
        .success();

    let out = neng_pass_with_key(&tmp, "hunter2")
        .args(["new", "mail"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let out = String::from_utf8(out).unwrap();
    let generated = out.lines().last().unwrap().to_string();
    assert_eq!(generated.len(), 16);

    neng_pass_with_key(&tmp, "hunter2")
        .args(["get", "mail", "--raw"])
        .assert()
        .success()
        .stdout(format!("{generated}\n"));
}

#[test]
fn too_long_password_is_rejected() {
    let tmp = data_dir();
    neng_pass_with_key(&tmp, "hunter2")
        .arg("set-master")
        .assert()
        .success();

    neng_pass_with_key(&tmp, "hunter2")
        .args(["set", "github", "abcdefghijklmnopq"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("too long"));

    neng_pass(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No passwords stored yet"));
}

#[test]
fn status_reports_master_key_state() {
    let tmp = data_dir();
    neng_pass(&tmp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not set"));
}

#[test]
fn completions_for_bash() {
    let tmp = data_dir();
    neng_pass(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("neng-pass"));
}

#[test]
fn unknown_shell_fails() {
    let tmp = data_dir();
    neng_pass(&tmp)
        .args(["completions", "csh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown shell"));
}

#[test]
fn delete_with_wrong_key_keeps_the_entry() {
    let tmp = data_dir();
    neng_pass_with_key(&tmp, "hunter2")
        .arg("set-master")
        .assert()
        .success();
    neng_pass_with_key(&tmp, "hunter2")
        .args(["set", "github", "p@ss"])
        .assert()
        .success();

    neng_pass_with_key(&tmp, "wrong")
        .args(["delete", "github", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("wrong master key"));

    neng_pass_with_key(&tmp, "hunter2")
        .args(["get", "github", "--raw"])
        .assert()
        .success()
        .stdout("p@ss\n");
}

#[test]
fn piped_value_keeps_trailing_spaces() {
    let tmp = data_dir();
    neng_pass_with_key(&tmp, "hunter2")
        .arg("set-master")
        .assert()
        .success();

    neng_pass_with_key(&tmp, "hunter2")
        .args(["set", "spaced"])
        .write_stdin("pass  \r\n")
        .assert()
        .success();

    neng_pass_with_key(&tmp, "hunter2")
        .args(["get", "spaced", "--raw"])
        .assert()
        .success()
        .stdout("pass  \n");
}

#[test]
fn new_rejects_length_above_the_limit() {
    let tmp = data_dir();
    neng_pass_with_key(&tmp, "hunter2")
        .arg("set-master")
        .assert()
        .success();

    neng_pass_with_key(&tmp, "hunter2")
        .args(["new", "mail", "--length", "17"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--length must be between 1 and 16"));

    neng_pass(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No passwords stored yet"));
}
