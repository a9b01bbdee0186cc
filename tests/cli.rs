//! End-to-end tests for the `flat` binary.
//!
//! Each test runs the binary against a fresh project with `HOME` and
//! `XDG_CONFIG_HOME` pointed into the temp dir, so no user config leaks in.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn kotlin(project: &TempDir, rel: &str, package: &str) {
    project
        .child(rel)
        .write_str(&format!("package {}\n\nclass Placeholder\n", package))
        .unwrap();
}

fn blog_project() -> TempDir {
    let project = TempDir::new().unwrap();
    kotlin(&project, "src/main/kotlin/ch/frankel/blog/Foo.kt", "ch.frankel.blog");
    kotlin(
        &project,
        "src/main/kotlin/ch/frankel/blog/bar/Bar.kt",
        "ch.frankel.blog.bar",
    );
    project
}

fn flat(project: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("flat").unwrap();
    cmd.arg("--cwd")
        .arg(project.path())
        .env("HOME", project.path().join("home"))
        .env("XDG_CONFIG_HOME", project.path().join("xdg"))
        .env_remove("FLATLAYOUT_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn root_prints_discovered_prefix() {
    let project = blog_project();

    flat(&project)
        .arg("root")
        .assert()
        .success()
        .stdout(predicate::str::contains("ch.frankel.blog (discovered)"))
        .stdout(predicate::str::contains("2 file(s) scanned"));
}

#[test]
fn quiet_root_prints_only_the_root() {
    let project = blog_project();

    flat(&project)
        .args(["-q", "root"])
        .assert()
        .success()
        .stdout("ch.frankel.blog\n");
}

#[test]
fn disjoint_root_prints_none() {
    let project = TempDir::new().unwrap();
    kotlin(&project, "src/main/kotlin/ch/a/A.kt", "ch.a");
    kotlin(&project, "src/main/kotlin/org/b/B.kt", "org.b");

    flat(&project)
        .args(["-q", "root"])
        .assert()
        .success()
        .stdout("<none>\n");
}

#[test]
fn plan_json_lists_moves() {
    let project = blog_project();

    flat(&project)
        .args(["plan", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"move_file\""))
        .stdout(predicate::str::contains("src/main/kotlin/bar/Bar.kt"))
        .stdout(predicate::str::contains("\"prune_empty_dirs\""));

    project
        .child("src/main/kotlin/ch/frankel/blog/Foo.kt")
        .assert(predicate::path::exists());
}

#[test]
fn plan_preview_is_numbered() {
    let project = blog_project();

    flat(&project)
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1. move src/main/kotlin/ch/frankel/blog/Foo.kt -> src/main/kotlin/Foo.kt",
        ));
}

#[test]
fn apply_refuses_without_confirmation() {
    let project = blog_project();

    flat(&project)
        .args(["--no-interactive", "apply"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    project
        .child("src/main/kotlin/ch/frankel/blog/Foo.kt")
        .assert(predicate::path::exists());
}

#[test]
fn apply_dry_run_moves_nothing() {
    let project = blog_project();

    flat(&project)
        .args(["apply", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    project
        .child("src/main/kotlin/Foo.kt")
        .assert(predicate::path::missing());
}

#[test]
fn apply_then_undo() {
    let project = blog_project();

    flat(&project)
        .args(["apply", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved 2 file(s)"));

    project
        .child("src/main/kotlin/Foo.kt")
        .assert(predicate::path::exists());
    project
        .child("src/main/kotlin/bar/Bar.kt")
        .assert(predicate::path::exists());
    project
        .child("src/main/kotlin/ch")
        .assert(predicate::path::missing());

    flat(&project)
        .arg("undo")
        .assert()
        .success()
        .stdout(predicate::str::contains("restored 2 file(s)"));

    project
        .child("src/main/kotlin/ch/frankel/blog/Foo.kt")
        .assert(predicate::path::exists());
    project
        .child("src/main/kotlin/Foo.kt")
        .assert(predicate::path::missing());

    flat(&project)
        .arg("undo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to undo"));
}

#[test]
fn apply_with_explicit_root() {
    let project = TempDir::new().unwrap();
    kotlin(
        &project,
        "src/main/kotlin/com/example/deep/nested/Test.kt",
        "com.example.deep.nested",
    );
    kotlin(&project, "src/main/kotlin/org/other/Other.kt", "org.other");

    flat(&project)
        .args(["apply", "--yes", "--root", "com.example"])
        .assert()
        .success();

    project
        .child("src/main/kotlin/deep/nested/Test.kt")
        .assert(predicate::path::exists());
    project
        .child("src/main/kotlin/org/other/Other.kt")
        .assert(predicate::path::exists());
}

#[test]
fn config_set_then_get() {
    let project = blog_project();

    flat(&project)
        .args(["config", "set", "root_package", "ch.frankel"])
        .assert()
        .success();

    project
        .child(".flatlayout/config.toml")
        .assert(predicate::str::contains("root_package = \"ch.frankel\""));

    flat(&project)
        .args(["config", "get", "root_package"])
        .assert()
        .success()
        .stdout("ch.frankel\n");

    flat(&project)
        .args(["-q", "root"])
        .assert()
        .success()
        .stdout("ch.frankel\n");
}

#[test]
fn config_rejects_invalid_values() {
    let project = blog_project();

    flat(&project)
        .args(["config", "set", "root_package", "ch..frankel"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("root_package"));

    flat(&project)
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));

    project
        .child(".flatlayout/config.toml")
        .assert(predicate::path::missing());
}

#[test]
fn config_show_lists_defaults() {
    let project = blog_project();

    flat(&project)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("base_dir = src/main/kotlin"))
        .stdout(predicate::str::contains("root_package = (discovered)"))
        .stdout(predicate::str::contains("project = (none)"));
}

#[test]
fn malformed_project_config_is_reported() {
    let project = blog_project();
    project
        .child(".flatlayout/config.toml")
        .write_str("surprise = true\n")
        .unwrap();

    flat(&project)
        .arg("root")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}

#[test]
fn missing_cwd_fails() {
    let project = TempDir::new().unwrap();

    flat(&project)
        .args(["--cwd"])
        .arg(project.path().join("does-not-exist"))
        .arg("root")
        .assert()
        .failure();
}

#[test]
fn completion_generates_script() {
    let project = TempDir::new().unwrap();

    flat(&project)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("flat"));
}
