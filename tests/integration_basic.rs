mod common;

use common::TestHome;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;

#[test]
fn test_fully_impure_directory_is_one_line() {
    let home = TestHome::new();
    home.file(".junk/a").file(".junk/b");

    home.purity()
        .assert()
        .success()
        .stdout(home.lines(&[".junk"]));
}

#[test]
fn test_allow_listed_directory_is_silent() {
    let home = TestHome::new();
    home.file(".notes/todo.txt").file(".notes/old/x");
    let allow = home.scratch_file("allow", "~/.notes\n");

    home.purity()
        .arg("-w")
        .arg(&allow)
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_partially_allowed_directory_reports_only_strays() {
    let home = TestHome::new();
    home.file(".config/nvim/init.lua")
        .file(".config/stray.conf")
        .dir(".config/empty");
    let allow = home.scratch_file("allow", "# editor\n~/.config/nvim\n\n");

    home.purity()
        .arg("--allow")
        .arg(&allow)
        .assert()
        .success()
        .stdout(home.lines(&[".config/empty", ".config/stray.conf"]));
}

#[test]
fn test_git_repository_is_exempt() {
    let home = TestHome::new();
    home.file(".proj/.git/HEAD")
        .file(".proj/src/main.c")
        .file(".proj/build/out.o");

    home.purity().assert().success().stdout("");
}

#[test]
fn test_deny_list_reported_without_descent() {
    let home = TestHome::new();
    home.file(".cache/a/b/c").file(".cache/d");
    let allow = home.scratch_file("allow", "~\n");
    let deny = home.scratch_file("deny", "~/.cache\n");

    // The root itself is allowed, so only denial can produce output.
    home.purity()
        .args(["-b"])
        .arg(&deny)
        .args(["-w"])
        .arg(&allow)
        .assert()
        .success()
        .stdout("");

    home.purity()
        .arg("-b")
        .arg(&deny)
        .assert()
        .success()
        .stdout(home.lines(&[".cache"]));
}

#[test]
fn test_list_files_from_environment() {
    let home = TestHome::new();
    home.file(".notes/todo.txt").file(".junk");
    let allow = home.scratch_file("allow", "$HOME/.notes\n");

    home.purity()
        .env("PURITY_ALLOW_LIST", &allow)
        .assert()
        .success()
        .stdout(home.lines(&[".junk"]));
}

#[test]
fn test_top_level_public_entries_and_symlinks_are_exempt() {
    let home = TestHome::new();
    home.file("Documents/report.txt")
        .symlink(".vimrc", "/nowhere/vimrc")
        .symlink(".bin/tool", "/srv/dotfiles/bin/tool")
        .symlink(".bin/other", "/usr/bin/other")
        .file(".bin/script");

    home.purity()
        .assert()
        .success()
        .stdout(home.lines(&[".bin/other", ".bin/script"]));
}

#[test]
fn test_mark_dirs_appends_slash() {
    let home = TestHome::new();
    home.file(".junk/a").file(".mixed/stray").file(".mixed/.git");

    home.purity()
        .arg("-F")
        .assert()
        .success()
        .stdout(format!("{}/\n", home.path(".junk").display()));
}

#[test]
fn test_root_option_overrides_home() {
    let home = TestHome::new();
    home.file("sub/.junk/a").file("sub/.junk/b").file("sub/.keep/x");
    let allow = home.scratch_file("allow", &format!("{}\n", home.path("sub/.keep").display()));

    home.purity()
        .arg("--root")
        .arg(home.path("sub"))
        .arg("-w")
        .arg(&allow)
        .assert()
        .success()
        .stdout(home.lines(&["sub/.junk"]));
}

#[test]
fn test_config_file_supplies_lists() {
    let home = TestHome::new();
    home.file(".notes/todo.txt").file(".junk");
    let allow = home.scratch_file("allow", "~/.notes\n");
    home.scratch_file(
        "config.toml",
        &format!("[lists]\nallow = \"{}\"\n\n[walk]\nmark_dirs = false\n", allow.display()),
    );

    home.purity()
        .assert()
        .success()
        .stdout(home.lines(&[".junk"]));
}

#[test]
fn test_unknown_config_keys_warn() {
    let home = TestHome::new();
    home.file(".junk");
    home.scratch_file("config.toml", "[walk]\nfollow_symlinks = true\n");

    home.purity()
        .assert()
        .success()
        .stdout(home.lines(&[".junk"]))
        .stderr(predicate::str::contains("walk.follow_symlinks"));
}

#[test]
fn test_missing_list_file_fails() {
    let home = TestHome::new();
    home.file(".junk");

    home.purity()
        .arg("-w")
        .arg(home.scratch.path().join("absent"))
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("allow-list"));
}

#[test]
fn test_unexpandable_pattern_fails() {
    let home = TestHome::new();
    let allow = home.scratch_file("allow", "$PURITY_TEST_UNDEFINED_VAR/x\n");

    home.purity()
        .env_remove("PURITY_TEST_UNDEFINED_VAR")
        .arg("-w")
        .arg(&allow)
        .assert()
        .failure()
        .stderr(predicate::str::contains("PURITY_TEST_UNDEFINED_VAR"));
}

#[test]
fn test_missing_root_fails() {
    let home = TestHome::new();

    home.purity()
        .arg("--root")
        .arg(home.path("does-not-exist"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_dangling_symlink_home_fails() {
    let home = TestHome::new();
    let link = home.scratch.path().join("home");
    std::os::unix::fs::symlink(home.scratch.path().join("gone"), &link).unwrap();

    home.purity()
        .env("HOME", &link)
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_unreadable_directory_warns_and_continues() {
    let home = TestHome::new();
    home.file(".locked/secret").file(".other/a").file(".other/.keep");
    let locked = home.path(".locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&locked).is_ok() {
        // Permissions are not enforced for this user; the routing itself is
        // covered by the walker unit tests.
        eprintln!("skipping unreadable-directory check: permissions are not enforced");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let assert = home.purity().assert();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert
        .success()
        .stdout(predicate::str::contains(format!("{}\n", locked.display())))
        .stderr(predicate::str::contains(locked.display().to_string()));
}

#[test]
fn test_stats_on_stderr() {
    let home = TestHome::new();
    home.file(".junk/a");

    home.purity()
        .arg("--stats")
        .assert()
        .success()
        .stdout(home.lines(&[".junk"]))
        .stderr(predicate::str::contains("visited").and(predicate::str::contains("reported 1")));
}

#[test]
fn test_quiet_suppresses_stats() {
    let home = TestHome::new();
    home.file(".junk/a");

    home.purity()
        .args(["--stats", "-q"])
        .assert()
        .success()
        .stderr(predicate::str::contains("visited").not());
}

#[test]
fn test_completions() {
    let home = TestHome::new();

    home.purity()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("purity"));
}

#[test]
fn test_version() {
    TestHome::new()
        .purity()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
