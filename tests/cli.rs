use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn prints_version() {
    Command::cargo_bin("goshorts")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn prints_help() {
    Command::cargo_bin("goshorts")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("GoShorts"))
        .stdout(predicate::str::contains("--print-user-id"));
}

#[test]
fn set_endpoint_requires_a_url() {
    Command::cargo_bin("goshorts")
        .unwrap()
        .arg("--set-endpoint")
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs a URL"));
}

#[cfg(target_os = "linux")]
#[test]
fn user_id_is_stable_between_runs() {
    let home = tempfile::tempdir().unwrap();
    let run = || {
        let output = Command::cargo_bin("goshorts")
            .unwrap()
            .arg("--print-user-id")
            .env("HOME", home.path())
            .env("XDG_DATA_HOME", home.path().join("data"))
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    };
    let first = run();
    assert!(first.starts_with("user_"), "unexpected id {first}");
    assert_eq!(run(), first);
}
