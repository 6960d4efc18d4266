//! Porter core: the journal model, source-date parsing and identifier minting.
//!
//! Nothing in this crate touches the filesystem.
mod date;
mod ids;
mod model;

pub use date::{at_canonical_time, parse_header_date, DateParseError, CANONICAL_HOUR};
pub use ids::{IdMinter, SequentialIds, UuidMinter};
pub use model::{
    photo_placeholder, placeholder_identifiers, CopyInstruction, EmptyEntryError, Entry, Journal,
    MediaManifest, Photo, SCHEMA_VERSION,
};
