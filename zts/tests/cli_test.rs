use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in files {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn sample_apk(dir: &Path) -> (PathBuf, usize) {
    let nested = zip_bytes(&[("instant-run/classes1.dex", b"dx")]);
    let bytes = zip_bytes(&[
        ("res/anim/fade.xml", b"<fade>"),
        ("instant-run.zip", nested.as_slice()),
        ("AndroidManifest.xml", b"<manifest/>"),
    ]);
    let path = dir.join("test.apk");
    std::fs::write(&path, bytes).unwrap();
    (path, nested.len())
}

fn get_zts_cmd() -> Command {
    Command::cargo_bin("zts").unwrap()
}

#[test]
fn test_tree_raw_sizes() {
    let dir = tempfile::tempdir().unwrap();
    let (path, blob) = sample_apk(dir.path());

    let expected = format!(
        "{:<10} /\n\
         {:<10} /res/\n\
         {:<10} /res/anim/\n\
         {:<10} /res/anim/fade.xml\n\
         {:<10} /instant-run.zip\n\
         {:<10} /instant-run.zip/instant-run/\n\
         {:<10} /instant-run.zip/instant-run/classes1.dex\n\
         {:<10} /AndroidManifest.xml\n",
        17 + blob,
        6,
        6,
        6,
        blob,
        2,
        2,
        11
    );

    get_zts_cmd()
        .arg("tree")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::diff(expected));
}

#[test]
fn test_tree_sorted_by_raw_size() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = sample_apk(dir.path());

    let output = get_zts_cmd()
        .arg("tree")
        .arg(&path)
        .arg("--sort")
        .arg("raw")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let paths: Vec<&str> = stdout
        .lines()
        .map(|l| l.split_whitespace().last().unwrap())
        .collect();
    assert_eq!(
        paths,
        vec![
            "/",
            "/instant-run.zip",
            "/instant-run.zip/instant-run/",
            "/instant-run.zip/instant-run/classes1.dex",
            "/AndroidManifest.xml",
            "/res/",
            "/res/anim/",
            "/res/anim/fade.xml",
        ]
    );
}

#[test]
fn test_tree_json() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = sample_apk(dir.path());

    get_zts_cmd()
        .arg("tree")
        .arg(&path)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"path\": \"/instant-run.zip\""))
        .stdout(predicate::str::contains("\"isMountPoint\": true"))
        .stdout(predicate::str::contains("\"downloadSize\""));
}

#[test]
fn test_summary() {
    let dir = tempfile::tempdir().unwrap();
    let (path, blob) = sample_apk(dir.path());

    get_zts_cmd()
        .arg("summary")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Raw size: {} bytes", 17 + blob)))
        .stdout(predicate::str::contains("Entries: 7"))
        .stdout(predicate::str::contains("Nested archives: 1"))
        .stdout(predicate::str::contains("Containers opened: 2"));
}

#[test]
fn test_config_disables_mounting() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = sample_apk(dir.path());
    let config = dir.path().join("options.json");
    std::fs::write(&config, r#"{"maxMountDepth": 0}"#).unwrap();

    get_zts_cmd()
        .arg("--config")
        .arg(&config)
        .arg("summary")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Nested archives: 0"))
        .stdout(predicate::str::contains("Entries: 5"));
}

#[test]
fn test_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = sample_apk(dir.path());
    let config = dir.path().join("options.json");
    std::fs::write(&config, r#"{"download": {"compressionLevel": 42}}"#).unwrap();

    get_zts_cmd()
        .arg("--config")
        .arg(&config)
        .arg("tree")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_missing_archive() {
    let dir = tempfile::tempdir().unwrap();
    get_zts_cmd()
        .arg("tree")
        .arg(dir.path().join("missing.apk"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot open"));
}

#[test]
fn test_no_subcommand() {
    get_zts_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("No command specified"));
}
