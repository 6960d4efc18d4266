//! Porter engine: reads an extracted journal export and produces the import archive.
mod aggregate;
mod archive;
mod convert;
mod decode;
mod entry;
mod layout;
mod markdown;
mod media;
mod options;
mod package;
mod title;

pub use aggregate::{convert_tree, Aggregate, JournalAggregator, RunSummary};
pub use archive::{extract_archive, ExtractError};
pub use convert::{ConvertError, Converter, Html2MdConverter};
pub use decode::{decode_html, DecodedHtml};
pub use entry::{EntryError, EntryParser, ParsedEntry};
pub use layout::{LayoutError, SourceLayout};
pub use markdown::MarkdownConverter;
pub use media::{md5_hex, normalize_lexically, MediaError, MediaResolver, ResolvedPhoto};
pub use options::{ConvertOptions, PackageOptions, DEFAULT_PHOTO_FORMATS};
pub use package::{ensure_output_dir, write_journal_archive, PackageError, PackageReport};
pub use title::title_from_filename;
