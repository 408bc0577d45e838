mod common;

use assert_cmd::Command;
use predicates::prelude::*;

use common::Fixture;

fn revsight() -> Command {
    let mut command = Command::cargo_bin("revsight").expect("binary exists");
    command
        .env_remove("REVSIGHT_FOCUSED")
        .env_remove("REVSIGHT_GIT")
        .env_remove("REVSIGHT_REMOTE")
        .env("RUST_LOG", "off");
    command
}

#[test]
fn help_displays_usage() {
    revsight()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("open-remote"));
}

#[test]
fn open_remote_prints_url_with_line() {
    let repo = Fixture::with_history();
    repo.git(&["checkout", "--quiet", "-b", "develop"]);
    repo.git(&["remote", "add", "origin", "git@github.com:acme/widgets.git"]);

    revsight()
        .current_dir(repo.root())
        .args(["open-remote", "lib/util.ts", "--line", "10", "--print"])
        .assert()
        .success()
        .stdout("https://github.com/acme/widgets/blob/develop/lib/util.ts#L10\n");
}

#[test]
fn open_remote_uses_focused_document() {
    let repo = Fixture::with_history();
    repo.git(&["remote", "add", "origin", "https://git.example.com/acme/widgets.git"]);

    revsight()
        .current_dir(repo.root())
        .env("REVSIGHT_FOCUSED", "lib/util.ts:3")
        .args(["open-remote", "--print"])
        .assert()
        .success()
        .stdout("https://git.example.com/acme/widgets/blob/main/lib/util.ts\n");
}

#[test]
fn workspace_config_comes_from_the_file_repository() {
    let repo = Fixture::with_history();
    repo.git(&["remote", "add", "origin", "git@github.com:acme/widgets.git"]);
    repo.git(&["remote", "add", "upstream", "git@gitlab.com:team/widgets.git"]);
    repo.write(".revsight/config.toml", "[git]\nremote = \"upstream\"\n");
    let elsewhere = tempfile::tempdir().expect("tempdir");

    revsight()
        .current_dir(elsewhere.path())
        .arg("open-remote")
        .arg(repo.path("lib/util.ts"))
        .args(["--line", "2", "--print"])
        .assert()
        .success()
        .stdout("https://gitlab.com/team/widgets/-/blob/main/lib/util.ts#L2\n");
}

#[test]
fn compare_with_revision_prints_diff() {
    let repo = Fixture::with_history();

    revsight()
        .current_dir(repo.root())
        .args(["compare", "lib/util.ts", "--rev", "HEAD~1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("util.ts (HEAD~1) vs working tree"))
        .stdout(predicate::str::contains("-export const answer = 41;"))
        .stdout(predicate::str::contains("+export const answer = 42;"));
}

#[test]
fn compare_without_file_fails_with_notice() {
    let repo = Fixture::with_history();

    revsight()
        .current_dir(repo.root())
        .args(["compare", "--rev", "HEAD"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no file selected"));
}

#[test]
fn branches_lists_candidates_as_json() {
    let repo = Fixture::with_history();
    repo.git(&["branch", "feature/login"]);

    revsight()
        .current_dir(repo.root())
        .args(["branches", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"identifier\": \"feature/login\""))
        .stdout(predicate::str::contains("\"identifier\": \"main\""));
}

#[test]
fn completions_are_generated() {
    revsight()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("revsight"));
}
