// Black-box CLI tests.

use assert_cmd::Command;
use predicates::prelude::*;

fn doorlink() -> Command {
    let mut cmd = Command::cargo_bin("doorlink").unwrap();
    cmd.env_remove("DOORLINK_APPLIANCE");
    cmd
}

#[test]
fn help_lists_subcommands() {
    doorlink()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("arm"))
        .stdout(predicate::str::contains("disarm"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("check-updates"));
}

#[test]
fn invalid_appliance_url_is_rejected() {
    doorlink()
        .args(["arm", "--appliance", "not a url"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid appliance URL"));
}

#[test]
fn unreachable_appliance_fails_with_connection_code() {
    // Port 1 is never listening; the command surfaces a transport
    // error instead of hanging or mutating anything.
    doorlink()
        .args(["disarm", "--appliance", "http://127.0.0.1:1", "--timeout", "2"])
        .assert()
        .failure()
        .code(7);
}
