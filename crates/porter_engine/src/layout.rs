use std::fs;
use std::path::{Path, PathBuf};

use porter_logging::{porter_debug, porter_info, porter_warn};
use walkdir::WalkDir;

const ENTRIES_DIR: &str = "Entries";
const RESOURCES_DIR: &str = "Resources";

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("entries folder not found at {0:?}; expected <root>/Entries or <root>/<folder>/Entries")]
    MissingEntries(PathBuf),
}

/// Where entry documents and their assets live inside an extracted export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    pub entries_dir: PathBuf,
    pub resources_dir: Option<PathBuf>,
}

impl SourceLayout {
    /// Uses a lone top-level folder as the root when it holds `Entries`,
    /// otherwise the extraction root itself.
    pub fn detect(extract_root: &Path) -> Result<Self, LayoutError> {
        let root = single_wrapping_folder(extract_root)
            .filter(|folder| folder.join(ENTRIES_DIR).is_dir())
            .inspect(|folder| porter_info!("Detected root folder {:?} in archive", folder))
            .unwrap_or_else(|| extract_root.to_path_buf());

        let entries_dir = root.join(ENTRIES_DIR);
        if !entries_dir.is_dir() {
            return Err(LayoutError::MissingEntries(entries_dir));
        }

        let resources_dir = root.join(RESOURCES_DIR);
        let resources_dir = if resources_dir.is_dir() {
            Some(resources_dir)
        } else {
            porter_warn!("Resources folder not found at {:?}; photos may not resolve", resources_dir);
            None
        };

        Ok(Self {
            entries_dir,
            resources_dir,
        })
    }

    /// Every `.html`/`.htm` file under the entries folder, sorted by path.
    ///
    /// Unreadable directory entries are logged and skipped.
    pub fn entry_documents(&self) -> Vec<PathBuf> {
        let mut documents = Vec::new();
        for item in WalkDir::new(&self.entries_dir).sort_by_file_name() {
            let item = match item {
                Ok(item) => item,
                Err(err) => {
                    porter_warn!("Error accessing path under {:?}: {}. Skipping.", self.entries_dir, err);
                    continue;
                }
            };
            if item.file_type().is_file() && is_document(item.path()) {
                documents.push(item.into_path());
            }
        }
        porter_debug!("Found {} entry documents under {:?}", documents.len(), self.entries_dir);
        documents
    }
}

fn single_wrapping_folder(root: &Path) -> Option<PathBuf> {
    let mut items = fs::read_dir(root).ok()?.filter_map(|e| e.ok());
    let first = items.next()?;
    if items.next().is_some() || !first.file_type().ok()?.is_dir() {
        return None;
    }
    Some(first.path())
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn entries_at_top_level_are_found() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Entries")).unwrap();
        fs::create_dir_all(temp.path().join("Resources")).unwrap();

        let layout = SourceLayout::detect(temp.path()).unwrap();
        assert_eq!(layout.entries_dir, temp.path().join("Entries"));
        assert_eq!(layout.resources_dir, Some(temp.path().join("Resources")));
    }

    #[test]
    fn single_wrapping_folder_is_descended_into() {
        let temp = TempDir::new().unwrap();
        let wrapped = temp.path().join("AppleJournalEntries");
        fs::create_dir_all(wrapped.join("Entries")).unwrap();

        let layout = SourceLayout::detect(temp.path()).unwrap();
        assert_eq!(layout.entries_dir, wrapped.join("Entries"));
        assert_eq!(layout.resources_dir, None);
    }

    #[test]
    fn lone_folder_without_entries_is_not_a_root() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Other")).unwrap();

        let err = SourceLayout::detect(temp.path()).unwrap_err();
        assert!(matches!(err, LayoutError::MissingEntries(path) if path == temp.path().join("Entries")));
    }

    #[test]
    fn only_html_documents_are_listed() {
        let temp = TempDir::new().unwrap();
        let entries = temp.path().join("Entries");
        fs::create_dir_all(entries.join("nested")).unwrap();
        fs::write(entries.join("b.HTML"), "").unwrap();
        fs::write(entries.join("a.htm"), "").unwrap();
        fs::write(entries.join("nested/c.html"), "").unwrap();
        fs::write(entries.join("notes.txt"), "").unwrap();

        let layout = SourceLayout::detect(temp.path()).unwrap();
        let names: Vec<_> = layout
            .entry_documents()
            .iter()
            .map(|p| p.strip_prefix(&entries).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.htm", "b.HTML", "nested/c.html"]);
    }
}
