use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use porter_core::{CopyInstruction, IdMinter, Photo};
use porter_logging::porter_debug;

use crate::options::ConvertOptions;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("image has no source reference")]
    MissingSource,
    #[error("image reference '{0}' is not a local file")]
    NotLocal(String),
    #[error("unsupported media type '{format}' for {path}")]
    UnsupportedFormat { format: String, path: PathBuf },
    #[error("image file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to hash {path}: {source}")]
    Hash { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPhoto {
    pub photo: Photo,
    pub copy: CopyInstruction,
}

/// Resolves image references found in one source document.
///
/// References are relative to the document's own directory, even though the
/// files live in the sibling resources directory.
pub struct MediaResolver<'a> {
    document_dir: PathBuf,
    resources_dir: Option<&'a Path>,
    options: &'a ConvertOptions,
}

impl<'a> MediaResolver<'a> {
    pub fn new(document_path: &Path, resources_dir: Option<&'a Path>, options: &'a ConvertOptions) -> Self {
        let document_dir = document_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            document_dir,
            resources_dir,
            options,
        }
    }

    pub fn resolve(
        &self,
        src: Option<&str>,
        captured_at: DateTime<Utc>,
        ids: &mut dyn IdMinter,
    ) -> Result<ResolvedPhoto, MediaError> {
        let src = src.map(str::trim).filter(|s| !s.is_empty()).ok_or(MediaError::MissingSource)?;
        if src.contains("://") || src.to_ascii_lowercase().starts_with("data:") {
            return Err(MediaError::NotLocal(src.to_string()));
        }
        // rooted references would escape the document directory on join
        if Path::new(src)
            .components()
            .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)))
        {
            return Err(MediaError::NotLocal(src.to_string()));
        }

        let path = self.absolute_path(src)?;
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !self.options.allows_format(&format) {
            return Err(MediaError::UnsupportedFormat { format, path });
        }

        if !fs::metadata(&path).map(|meta| meta.is_file()).unwrap_or(false) {
            return Err(MediaError::NotFound(path));
        }
        if let Some(resources) = self.resources_dir {
            if !path.starts_with(resources) {
                porter_debug!("{:?} resolves outside the resources directory {:?}", path, resources);
            }
        }

        let content_hash = md5_hex(&path).map_err(|source| MediaError::Hash {
            path: path.clone(),
            source,
        })?;
        let identifier = ids.mint();
        let destination = format!("{}/{}.{}", self.options.media_dir, identifier, format);

        Ok(ResolvedPhoto {
            photo: Photo {
                content_hash,
                format,
                identifier,
                captured_at,
            },
            copy: CopyInstruction {
                source: path,
                destination,
            },
        })
    }

    fn absolute_path(&self, src: &str) -> Result<PathBuf, MediaError> {
        let joined = self.document_dir.join(src);
        let absolute = std::path::absolute(&joined).map_err(|_| MediaError::NotFound(joined.clone()))?;
        Ok(normalize_lexically(&absolute))
    }
}

/// Collapses `.` and `..` without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Hex MD5 of a file, streamed.
pub fn md5_hex(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    io::copy(&mut file, &mut hasher)?;
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(32);
    for byte in digest.iter() {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    Ok(hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_segments_collapse() {
        assert_eq!(
            normalize_lexically(Path::new("/tmp/x/Entries/../Resources/./a.png")),
            PathBuf::from("/tmp/x/Resources/a.png")
        );
    }

    #[test]
    fn rooted_sources_are_not_local() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("outside.png");
        fs::write(&image, b"png").unwrap();
        let options = ConvertOptions::default();
        let resolver = MediaResolver::new(&dir.path().join("Entries/a.html"), None, &options);

        let err = resolver
            .resolve(image.to_str(), Utc::now(), &mut porter_core::SequentialIds::new())
            .unwrap_err();
        assert!(matches!(err, MediaError::NotLocal(_)));
    }

    #[test]
    fn md5_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, b"hello").unwrap();
        assert_eq!(md5_hex(&path).unwrap(), "5d41402abc4b2a76b9719d911017c592");
    }
}
