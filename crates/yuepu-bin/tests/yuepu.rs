use assert_cmd::prelude::*;
use predicates::prelude::*;
use sfnt::testutil::FontBuilder;
use std::path::{Path, PathBuf};
use std::process::Command;

fn write(dir: &Path, name: &str, data: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

fn write_fonts(dir: &Path) -> (PathBuf, PathBuf) {
    let cjk = write(
        dir,
        "cjk.otf",
        FontBuilder::default()
            .format_12_group(0x3000, 0x9FFF, 1)
            .build(),
    );
    let western = write(
        dir,
        "western.ttf",
        FontBuilder::default()
            .format_4_segment(0x20, 0x7E, 0, None)
            .build(),
    );
    (cjk, western)
}

#[test]
fn lex() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "doc.txt", "你〚字号〛12pt");
    let mut cmd = Command::cargo_bin("yuepu").unwrap();
    cmd.arg("lex").arg(&path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Character('你')"))
        .stdout(predicate::str::contains("EndOfFile"));
}

#[test]
fn lex_warnings_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "doc.txt", "〚字号〛5号");
    let mut cmd = Command::cargo_bin("yuepu").unwrap();
    cmd.arg("lex").arg(&path);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("the 号 unit is deprecated"));
}

#[test]
fn parse() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "score.txt", "标题 = “春晓”\n旋律 = 简谱 {} { 1 2 3 }\n");
    let mut cmd = Command::cargo_bin("yuepu").unwrap();
    cmd.arg("parse").arg(&path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("“春晓”"))
        .stdout(predicate::str::contains("Document"));
}

#[test]
fn parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "score.txt", "旋律 = 简谱 {} { 1 2 3\n");
    let mut cmd = Command::cargo_bin("yuepu").unwrap();
    cmd.arg("parse").arg(&path);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unmatched brace"));
}

#[test]
fn metrics() {
    let dir = tempfile::tempdir().unwrap();
    let (_, western) = write_fonts(dir.path());
    let mut cmd = Command::cargo_bin("yuepu").unwrap();
    cmd.arg("metrics").arg(&western).arg("A");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("units per em: 1000"))
        .stdout(predicate::str::contains("cmap:         format 4"))
        .stdout(predicate::str::contains("'A' U+0041"));
}

#[test]
fn typeset() {
    let dir = tempfile::tempdir().unwrap();
    let (cjk, western) = write_fonts(dir.path());
    let path = write(dir.path(), "doc.txt", "ai 你好\n\n再见");
    let mut cmd = Command::cargo_bin("yuepu").unwrap();
    cmd.arg("typeset")
        .arg(&path)
        .arg("--cjk-font")
        .arg(&cjk)
        .arg("--western-font")
        .arg(&western);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("# paragraph 2"))
        .stdout(predicate::str::contains("glyph '你'"));
}

#[test]
fn typeset_json() {
    let dir = tempfile::tempdir().unwrap();
    let (cjk, western) = write_fonts(dir.path());
    let path = write(dir.path(), "doc.txt", "你好");
    let mut cmd = Command::cargo_bin("yuepu").unwrap();
    cmd.arg("typeset")
        .arg(&path)
        .arg("--cjk-font")
        .arg(&cjk)
        .arg("--western-font")
        .arg(&western)
        .arg("--json");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"char\": \"你\""))
        .stdout(predicate::str::contains("\"Glue\""));
}

#[test]
fn typeset_missing_font() {
    let dir = tempfile::tempdir().unwrap();
    let (cjk, _) = write_fonts(dir.path());
    let path = write(dir.path(), "doc.txt", "你好");
    let mut cmd = Command::cargo_bin("yuepu").unwrap();
    cmd.arg("typeset")
        .arg(&path)
        .arg("--cjk-font")
        .arg(&cjk)
        .arg("--western-font")
        .arg(dir.path().join("missing.ttf"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn missing_file() {
    let mut cmd = Command::cargo_bin("yuepu").unwrap();
    cmd.args(["lex", "no_such_file.txt"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to read file"));
}
