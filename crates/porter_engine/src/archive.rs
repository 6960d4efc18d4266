use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use porter_logging::porter_debug;
use zip::result::ZipError;
use zip::ZipArchive;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("cannot open archive {path:?}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("illegal file path in archive: {0}")]
    UnsafePath(String),
    #[error("zip error: {0}")]
    Zip(#[from] ZipError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Unpacks `archive_path` into `dest` and returns the number of files written.
///
/// Any entry whose path would land outside `dest` aborts the extraction.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<usize, ExtractError> {
    let file = File::open(archive_path).map_err(|source| ExtractError::Open {
        path: archive_path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file)?;
    fs::create_dir_all(dest)?;

    let mut written = 0;
    for index in 0..archive.len() {
        let mut item = archive.by_index(index)?;
        let relative = item
            .enclosed_name()
            .ok_or_else(|| ExtractError::UnsafePath(item.name().to_string()))?;
        let target = dest.join(relative);

        if item.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut item, &mut out)?;
        porter_debug!("Extracted {:?}", target);
        written += 1;
    }
    Ok(written)
}
