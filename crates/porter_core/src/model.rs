use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Schema version written into the journal metadata.
pub const SCHEMA_VERSION: &str = "1.0";

const PLACEHOLDER_SCHEME: &str = "dayone-moment://";

/// One embedded image, normalized into the target schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    #[serde(rename = "md5")]
    pub content_hash: String,
    /// Lowercase extension without the dot, e.g. `png`.
    #[serde(rename = "type")]
    pub format: String,
    pub identifier: String,
    /// Inherited from the owning entry; no EXIF timestamp is read.
    #[serde(rename = "creationDate", serialize_with = "serialize_instant")]
    pub captured_at: DateTime<Utc>,
}

/// One journal entry derived from one source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(rename = "uuid")]
    pub identifier: String,
    #[serde(serialize_with = "serialize_instant")]
    pub creation_date: DateTime<Utc>,
    #[serde(serialize_with = "serialize_instant")]
    pub modified_date: DateTime<Utc>,
    pub text: String,
    pub starred: bool,
    /// Stored as given; never used to shift the instant.
    pub time_zone: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<Photo>,
}

impl Entry {
    /// A fresh, unstarred entry whose creation and modification instants coincide.
    pub fn new(identifier: String, created: DateTime<Utc>, time_zone: impl Into<String>) -> Self {
        Self {
            identifier,
            creation_date: created,
            modified_date: created,
            text: String::new(),
            starred: false,
            time_zone: time_zone.into(),
            photos: Vec::new(),
        }
    }

    /// An entry with neither text nor photos must never be emitted.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.photos.is_empty()
    }

    /// Placeholder identifiers in the body that have no matching photo.
    pub fn dangling_placeholders(&self) -> Vec<&str> {
        placeholder_identifiers(&self.text)
            .into_iter()
            .filter(|id| !self.photos.iter().any(|photo| photo.identifier == *id))
            .collect()
    }
}

/// Inline marker the target renderer resolves to an embedded photo.
pub fn photo_placeholder(identifier: &str) -> String {
    format!("![]({PLACEHOLDER_SCHEME}{identifier})")
}

/// Every photo identifier referenced by a placeholder in `text`, in order.
pub fn placeholder_identifiers(text: &str) -> Vec<&str> {
    let opener = format!("![]({PLACEHOLDER_SCHEME}");
    let mut ids = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(&opener) {
        let after = &rest[start + opener.len()..];
        match after.find(')') {
            Some(end) => {
                ids.push(&after[..end]);
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    ids
}

/// The aggregate output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    pub metadata: BTreeMap<String, String>,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("entry {0} has neither text nor photos")]
pub struct EmptyEntryError(pub String);

impl Journal {
    pub fn new() -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("version".to_string(), SCHEMA_VERSION.to_string());
        Self {
            metadata,
            entries: Vec::new(),
        }
    }

    /// Appends an entry, refusing empty ones.
    pub fn push(&mut self, entry: Entry) -> Result<(), EmptyEntryError> {
        if entry.is_empty() {
            return Err(EmptyEntryError(entry.identifier));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn photo_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.photos.len()).sum()
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}

/// A source file to copy into the output archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyInstruction {
    /// Absolute path of the extracted source file.
    pub source: PathBuf,
    /// Archive-relative destination, always `/`-separated.
    pub destination: String,
}

/// Source path -> archive destination for every media file of a run.
///
/// Keyed by source path: when two entries reference the same file the last
/// instruction wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaManifest {
    files: BTreeMap<PathBuf, String>,
}

impl MediaManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instruction: CopyInstruction) {
        self.files.insert(instruction.source, instruction.destination);
    }

    /// Adds every instruction of `other`; on a shared source the incoming one wins.
    ///
    /// Returns the instructions that were replaced. Their destinations will not
    /// exist in the archive.
    pub fn merge(&mut self, other: MediaManifest) -> Vec<CopyInstruction> {
        let mut displaced = Vec::new();
        for (source, destination) in other.files {
            if let Some(previous) = self.files.insert(source.clone(), destination) {
                displaced.push(CopyInstruction {
                    source,
                    destination: previous,
                });
            }
        }
        displaced
    }

    pub fn destination_of(&self, source: &Path) -> Option<&str> {
        self.files.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files
            .iter()
            .map(|(source, destination)| (source.as_path(), destination.as_str()))
    }

    /// Instructions ordered by destination, for reproducible archives.
    pub fn sorted_by_destination(&self) -> Vec<CopyInstruction> {
        let mut instructions: Vec<_> = self
            .files
            .iter()
            .map(|(source, destination)| CopyInstruction {
                source: source.clone(),
                destination: destination.clone(),
            })
            .collect();
        instructions.sort_by(|a, b| a.destination.cmp(&b.destination));
        instructions
    }
}

fn serialize_instant<S: Serializer>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&instant.to_rfc3339_opts(SecondsFormat::Secs, true))
}
