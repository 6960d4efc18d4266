#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-data";

pub fn init_logging() {
    porter_logging::initialize_for_tests();
}

/// An extracted export on disk: `<root>/Entries` and `<root>/Resources`.
pub struct ExportFixture {
    pub temp: TempDir,
}

impl ExportFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Entries")).unwrap();
        fs::create_dir_all(temp.path().join("Resources")).unwrap();
        Self { temp }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn entries_dir(&self) -> PathBuf {
        self.root().join("Entries")
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.root().join("Resources")
    }

    pub fn add_entry(&self, filename: &str, html: &str) -> PathBuf {
        let path = self.entries_dir().join(filename);
        fs::write(&path, html).unwrap();
        path
    }

    pub fn add_resource(&self, filename: &str, bytes: &[u8]) -> PathBuf {
        let path = self.resources_dir().join(filename);
        fs::write(&path, bytes).unwrap();
        path
    }
}

/// Markup shaped like an exported entry page.
pub fn entry_page(header: &str, title: Option<&str>, blocks: &[String]) -> String {
    let title = title
        .map(|t| format!(r#"<div class="title"><span class="s2">{t}</span></div>"#))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>Entry</title></head>
<body><div class="pageContainer">
<div class="pageHeader">{header}</div>
{title}
{blocks}
</div></body></html>"#,
        blocks = blocks.join("\n")
    )
}

pub fn paragraph(text: &str) -> String {
    format!(r#"<p class="p1"><span class="s1">{text}</span></p>"#)
}

pub fn asset_grid(sources: &[&str]) -> String {
    let items: String = sources
        .iter()
        .map(|src| {
            format!(
                r#"<div class="gridItem assetType_photo"><img class="asset_image" src="{src}"></div>"#
            )
        })
        .collect();
    format!(r#"<div class="assetGrid">{items}</div>"#)
}
