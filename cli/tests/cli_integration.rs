//! End-to-end tests of the fpick binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "").unwrap();
}

fn fpick(root: &Path, cache: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fpick").unwrap();
    cmd.arg("--root").arg(root).arg("--cache-dir").arg(cache);
    cmd
}

#[test]
fn build_then_query_round_trip() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("proj");
    let cache = tmp.path().join("cache");
    touch(&root.join("src/main.rs"));
    touch(&root.join(".git/config"));

    fpick(&root, &cache)
        .arg("build-index")
        .assert()
        .success()
        .stdout(predicate::str::contains("indexed 1 files"));

    fpick(&root, &cache)
        .arg("query")
        .arg("main")
        .assert()
        .success()
        .stdout(predicate::str::contains("src/main.rs"));
}

#[test]
fn query_without_a_database_prints_the_build_hint() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("proj");
    let cache = tmp.path().join("cache");
    std::fs::create_dir_all(&root).unwrap();

    fpick(&root, &cache)
        .arg("query")
        .arg("anything")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "file list database not exist, please build it",
        ));
}

#[test]
fn exclusions_persist_across_invocations() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("proj");
    let cache = tmp.path().join("cache");
    touch(&root.join("a.ts"));
    touch(&root.join("build/out.o"));

    fpick(&root, &cache).arg("build-index").assert().success();

    fpick(&root, &cache)
        .arg("exclude")
        .arg(root.join("build"))
        .assert()
        .success()
        .stdout(predicate::str::contains("removed 1 indexed files"));

    fpick(&root, &cache)
        .arg("query")
        .arg("out.o")
        .assert()
        .success()
        .stdout(predicate::str::contains("no matching result"));

    fpick(&root, &cache)
        .arg("unexclude")
        .arg(root.join("build"))
        .assert()
        .success()
        .stdout(predicate::str::contains("restored 1 indexed files"));

    fpick(&root, &cache)
        .arg("query")
        .arg("out.o")
        .assert()
        .success()
        .stdout(predicate::str::contains("build/out.o"));
}

#[test]
fn verbose_logging_does_not_disturb_results() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("proj");
    let cache = tmp.path().join("cache");
    touch(&root.join("src/main.rs"));

    fpick(&root, &cache)
        .arg("--verbose")
        .arg("build-index")
        .assert()
        .success()
        .stdout(predicate::str::contains("indexed 1 files"));

    fpick(&root, &cache)
        .arg("--verbose")
        .arg("query")
        .arg("main")
        .assert()
        .success()
        .stdout(predicate::str::contains("src/main.rs"));
}

#[test]
fn excluding_a_directory_outside_the_root_fails() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("proj");
    let cache = tmp.path().join("cache");
    std::fs::create_dir_all(&root).unwrap();

    fpick(&root, &cache)
        .arg("exclude")
        .arg(tmp.path().join("elsewhere"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not inside any workspace root"));
}

#[test]
fn opened_files_show_up_in_recent() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("proj");
    let cache = tmp.path().join("cache");
    touch(&root.join("a.ts"));
    touch(&root.join("b.ts"));

    for name in ["a.ts", "b.ts"] {
        fpick(&root, &cache)
            .arg("opened")
            .arg(root.join(name))
            .assert()
            .success();
    }

    let expected = format!("{}\n{}", root.join("b.ts").display(), root.join("a.ts").display());
    fpick(&root, &cache)
        .arg("recent")
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));
}
