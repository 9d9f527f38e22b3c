//! Parsing of supplier catalog files for the brg-ingest pipeline.
//!
//! This crate turns one input file into canonical rows:
//!
//! - Read CSV, Excel, JSON and plain-text/Markdown files into a [`RawTable`]
//! - Map heterogeneous column names onto [`CanonicalField`]s
//! - Drop rows lacking the configured identifying fields
//!
//! # Overview
//!
//! The main entry point is [`DataParser`], built from
//! [`ParsingRules`](brg_core::ParsingRules):
//!
//! ```
//! use brg_core::{FileKind, ParsingRules};
//! use brg_parser::DataParser;
//!
//! let parser = DataParser::new(&ParsingRules::default())?;
//!
//! let tmp = tempfile::tempdir().unwrap();
//! let path = camino::Utf8PathBuf::from_path_buf(tmp.path().join("skf.json")).unwrap();
//! std::fs::write(&path, r#"{"items": [{"part": "6206", "brand": "nsk", "outer diameter": 62}]}"#).unwrap();
//!
//! let table = parser.parse(&path, FileKind::Json)?;
//! let rows = parser.validate_required_fields(parser.normalize_columns(&table));
//! assert_eq!(rows.len(), 1);
//! # Ok::<(), brg_parser::ParseError>(())
//! ```
//!
//! # Formats
//!
//! | Kind | Handling |
//! |------|----------|
//! | CSV | Header row; UTF-8, then Windows-1251, then Latin-1 |
//! | Excel | First worksheet, first row is the header |
//! | JSON | Array of objects, object holding an array, or a single object |
//! | Text | Tab-separated if the first line has a tab, else dimension patterns |
//!
//! [`RawTable`]: brg_core::RawTable
//! [`CanonicalField`]: brg_core::CanonicalField

#![deny(clippy::all)]
#![warn(missing_docs)]

mod columns;
mod decode;
mod delimited;
mod error;
mod json;
mod keyed;
mod parser;
mod text;
mod workbook;

pub use columns::ColumnMapper;
pub use decode::SourceEncoding;
pub use error::ParseError;
pub use parser::DataParser;
pub use text::CompiledPattern;
