use std::collections::BTreeMap;
use std::path::Path;

use porter_core::{IdMinter, Journal, MediaManifest};
use porter_logging::{porter_info, porter_warn};

use crate::entry::{EntryError, EntryParser, ParsedEntry};
use crate::layout::SourceLayout;

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub documents_seen: usize,
    pub entries_processed: usize,
    pub entries_skipped: usize,
    pub skipped_by_reason: BTreeMap<&'static str, usize>,
    pub photos: usize,
    /// Photos whose file was replaced by a later entry sharing the same source.
    pub photos_without_file: usize,
}

/// Everything the packager needs.
#[derive(Debug, Clone)]
pub struct Aggregate {
    pub journal: Journal,
    pub media: MediaManifest,
    pub summary: RunSummary,
}

/// Collects parsed entries into one journal and one media manifest.
///
/// Failed or empty entries are logged and counted, never fatal.
#[derive(Debug, Default)]
pub struct JournalAggregator {
    journal: Journal,
    media: MediaManifest,
    summary: RunSummary,
}

impl JournalAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, document: &Path, result: Result<ParsedEntry, EntryError>) {
        self.summary.documents_seen += 1;
        let parsed = match result {
            Ok(parsed) => parsed,
            Err(err) => {
                porter_warn!("Error processing entry {:?}: {}. Entry skipped.", document, err);
                self.skip(err.reason());
                return;
            }
        };

        let photos = parsed.entry.photos.len();
        match self.journal.push(parsed.entry) {
            Ok(()) => {
                for lost in self.media.merge(parsed.media) {
                    porter_warn!(
                        "{:?} is shared with an earlier entry; {} will not be written",
                        lost.source,
                        lost.destination
                    );
                    self.summary.photos_without_file += 1;
                }
                self.summary.entries_processed += 1;
                self.summary.photos += photos;
            }
            Err(err) => {
                porter_warn!("Skipping entry {:?}: {}", document, err);
                self.skip("empty");
            }
        }
    }

    pub fn finish(self) -> Aggregate {
        if self.journal.is_empty() {
            porter_info!("No journal entries were successfully processed. Output will be empty.");
        } else {
            porter_info!(
                "Processed {} entries with {} photos ({} skipped).",
                self.summary.entries_processed,
                self.summary.photos,
                self.summary.entries_skipped
            );
        }
        Aggregate {
            journal: self.journal,
            media: self.media,
            summary: self.summary,
        }
    }

    fn skip(&mut self, reason: &'static str) {
        self.summary.entries_skipped += 1;
        *self.summary.skipped_by_reason.entry(reason).or_insert(0) += 1;
    }
}

/// Parses every entry document of an extracted export, in path order.
pub fn convert_tree(layout: &SourceLayout, parser: &EntryParser, ids: &mut dyn IdMinter) -> Aggregate {
    porter_info!("Processing HTML entries from: {:?}", layout.entries_dir);
    let mut aggregator = JournalAggregator::new();
    for document in layout.entry_documents() {
        porter_info!("Processing entry: {:?}", document);
        let result = parser.parse_file(&document, layout.resources_dir.as_deref(), ids);
        aggregator.record(&document, result);
    }
    aggregator.finish()
}
