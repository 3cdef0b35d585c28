//! Domain types for remote objects, listing queries and export formats.

mod export;
mod object;
mod query;

pub use export::ExportFormat;
pub use object::{FOLDER_MIME_TYPE, NATIVE_MIME_PREFIX, ObjectKind, RemoteObject};
pub use query::{KindFilter, NameMatch, ObjectQuery, escape_query_value};
