use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const PAGE: &str = r#"<html><body><div class="pageContainer">
<div class="pageHeader">Wednesday, May 14, 2025</div>
<div class="title"><span class="s2">Morning Walk</span></div>
<p class="p1"><span class="s1">Felt great today.</span></p>
<div class="assetGrid"><div class="gridItem assetType_photo"><img class="asset_image" src="../Resources/IMG1.png"></div></div>
</div></body></html>"#;

const BAD_PAGE: &str = r#"<html><body><div class="pageContainer">
<div class="pageHeader">garbage text</div><p>lost</p></div></body></html>"#;

fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in files {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

fn read_journal(path: &Path) -> (serde_json::Value, Vec<String>) {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let names = archive.file_names().map(str::to_string).collect();
    let mut json = String::new();
    archive
        .by_name("Journal.json")
        .unwrap()
        .read_to_string(&mut json)
        .unwrap();
    (serde_json::from_str(&json).unwrap(), names)
}

fn porter() -> Command {
    Command::cargo_bin("journal-porter").unwrap()
}

#[test]
fn converts_export_and_skips_bad_entries() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("export.zip");
    let output = temp.path().join("dayone.zip");
    write_zip(
        &input,
        &[
            ("AppleJournalEntries/Entries/2025-05-14.html", PAGE.as_bytes()),
            ("AppleJournalEntries/Entries/2025-05-15.html", BAD_PAGE.as_bytes()),
            ("AppleJournalEntries/Resources/IMG1.png", b"\x89PNG fake"),
        ],
    );

    porter()
        .args(["-i", input.to_str().unwrap(), "-o", output.to_str().unwrap(), "--tz", "Europe/Oslo"])
        .assert()
        .success();

    let (journal, names) = read_journal(&output);
    let entries = journal["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["timeZone"], "Europe/Oslo");
    assert_eq!(entries[0]["creationDate"], "2025-05-14T12:00:00Z");
    assert!(entries[0]["text"].as_str().unwrap().starts_with("# Morning Walk"));

    let photo_id = entries[0]["photos"][0]["identifier"].as_str().unwrap();
    assert_eq!(photo_id.len(), 32);
    assert!(names.contains(&format!("photos/{photo_id}.png")));
}

#[test]
fn export_without_documents_produces_empty_journal() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("export.zip");
    let output = temp.path().join("dayone.zip");
    write_zip(&input, &[("Entries/readme.txt", b"nothing here")]);

    porter()
        .args(["-i", input.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .assert()
        .success();

    let (journal, names) = read_journal(&output);
    assert_eq!(journal["metadata"]["version"], "1.0");
    assert!(journal["entries"].as_array().unwrap().is_empty());
    assert_eq!(names, vec!["Journal.json".to_string()]);
}

#[test]
fn missing_entries_folder_is_fatal() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("export.zip");
    let output = temp.path().join("dayone.zip");
    write_zip(&input, &[("Something/else.html", PAGE.as_bytes()), ("other.txt", b"x")]);

    porter()
        .args(["-i", input.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("entries folder not found"));
    assert!(!output.exists());
}

#[test]
fn fatal_error_is_written_to_log_file() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("export.zip");
    let output = temp.path().join("dayone.zip");
    let log = temp.path().join("run.log");
    write_zip(&input, &[("a/x.html", PAGE.as_bytes()), ("b/y.html", PAGE.as_bytes())]);

    porter()
        .args(["-i", input.to_str().unwrap(), "-o", output.to_str().unwrap(), "-q", "--log-file"])
        .arg(&log)
        .assert()
        .failure()
        .code(1);

    let logged = std::fs::read_to_string(&log).unwrap();
    assert!(logged.contains("ERROR"));
    assert!(logged.contains("entries folder not found"));
}

#[test]
fn unreadable_input_is_fatal() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("dayone.zip");

    porter()
        .args(["-i", temp.path().join("missing.zip").to_str().unwrap(), "-o", output.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to unzip"));
}

#[test]
fn missing_arguments_are_rejected() {
    porter().assert().failure();
}
