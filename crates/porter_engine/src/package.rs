use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use porter_core::{CopyInstruction, Journal, MediaManifest};
use porter_logging::{porter_debug, porter_warn};
use tempfile::NamedTempFile;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::options::PackageOptions;

#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("failed to serialize journal: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("zip error: {0}")]
    Zip(#[from] ZipError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub output_path: PathBuf,
    pub entries: usize,
    pub media_written: usize,
    pub media_failed: usize,
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PackageError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PackageError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PackageError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PackageError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Writes the journal document and every listed media file into one archive.
///
/// The archive is assembled in a temp file next to `output` and renamed into
/// place once complete. A media file that cannot be copied is logged and left
/// out; it never fails the archive.
pub fn write_journal_archive(
    output: &Path,
    journal: &Journal,
    media: &MediaManifest,
    options: &PackageOptions,
) -> Result<PackageReport, PackageError> {
    let dir = output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    ensure_output_dir(dir)?;

    let tmp = NamedTempFile::new_in(dir).map_err(|e| PackageError::OutputDir(e.to_string()))?;
    let mut zip = ZipWriter::new(tmp);
    let file_options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(options.journal_filename.as_str(), file_options)?;
    zip.write_all(&serde_json::to_vec_pretty(journal)?)?;

    let mut media_written = 0;
    let mut media_failed = 0;
    for instruction in media.sorted_by_destination() {
        match copy_into(&mut zip, &instruction, file_options) {
            Ok(bytes) => {
                media_written += 1;
                porter_debug!(
                    "Copied {:?} to {} in archive ({} bytes).",
                    instruction.source,
                    instruction.destination,
                    bytes
                );
            }
            Err(err) => {
                media_failed += 1;
                porter_warn!(
                    "Copying media file {:?} to archive: {}. Skipping this media file.",
                    instruction.source,
                    err
                );
            }
        }
    }

    let mut tmp = zip.finish()?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    // Replace existing file if present.
    if output.exists() {
        fs::remove_file(output)?;
    }
    tmp.persist(output).map_err(|e| PackageError::Io(e.error))?;

    Ok(PackageReport {
        output_path: output.to_path_buf(),
        entries: journal.len(),
        media_written,
        media_failed,
    })
}

fn copy_into(
    zip: &mut ZipWriter<NamedTempFile>,
    instruction: &CopyInstruction,
    options: SimpleFileOptions,
) -> Result<u64, PackageError> {
    let mut source = File::open(&instruction.source)?;
    zip.start_file(instruction.destination.as_str(), options)?;
    match io::copy(&mut source, zip) {
        Ok(bytes) => Ok(bytes),
        Err(err) => {
            zip.abort_file()?;
            Err(err.into())
        }
    }
}
