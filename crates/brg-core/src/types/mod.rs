//! Domain types shared across the workspace.
//!
//! - [`CanonicalField`] - the eight canonical catalog columns
//! - [`CellValue`], [`RawTable`], [`CanonicalRow`] - tabular data before typing
//! - [`CatalogRecord`], [`Dimensions`], [`DedupKey`], [`Conflict`] - catalog rows
//! - [`ProcessStatus`], [`FileKind`] - ingestion outcome and input format

mod field;
mod record;
mod status;
mod table;

pub use field::{CanonicalField, UnknownField};
pub use record::{CatalogRecord, Conflict, DedupKey, Dimensions};
pub use status::{FileKind, ProcessStatus};
pub use table::{CanonicalRow, CellValue, RawTable, format_number};
