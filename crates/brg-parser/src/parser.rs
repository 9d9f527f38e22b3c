//! The [`DataParser`]: file reading, column mapping and row filtering.

use brg_core::{CanonicalField, CanonicalRow, FileKind, ParsingRules, RawTable};
use camino::Utf8Path;

use crate::columns::ColumnMapper;
use crate::decode::decodings;
use crate::delimited::read_delimited;
use crate::error::ParseError;
use crate::json::{JsonShapeError, read_json};
use crate::text::{CompiledPattern, extract_rows};
use crate::workbook::read_first_sheet;

/// Parser for supplier catalog files.
///
/// Built once from [`ParsingRules`]; patterns are compiled up front so a
/// bad configuration fails at startup rather than on the first text file.
///
/// # Examples
///
/// ```
/// use brg_core::{CanonicalField, FileKind, ParsingRules};
/// use brg_parser::DataParser;
///
/// let parser = DataParser::new(&ParsingRules::default())?;
///
/// let tmp = tempfile::tempdir().unwrap();
/// let path = camino::Utf8PathBuf::from_path_buf(tmp.path().join("in.csv")).unwrap();
/// std::fs::write(&path, "part,brand\n6205,skf\n,\n").unwrap();
///
/// let rows = parser.parse_rows(&path, FileKind::Csv)?;
/// assert_eq!(rows.len(), 1);
/// assert!(rows[0].has_value(CanonicalField::Article));
/// # Ok::<(), brg_parser::ParseError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DataParser {
    mapper: ColumnMapper,
    required: Vec<CanonicalField>,
    patterns: Vec<CompiledPattern>,
}

impl DataParser {
    /// Creates a parser from parsing rules.
    pub fn new(rules: &ParsingRules) -> Result<Self, ParseError> {
        let patterns = rules
            .dimension_patterns
            .iter()
            .map(CompiledPattern::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            mapper: ColumnMapper::new(&rules.column_mappings),
            required: rules.required_fields.any_of.clone(),
            patterns,
        })
    }

    /// Reads a file into a raw table.
    ///
    /// Fails with [`ParseError::NoTabularData`] when the file yields no rows.
    pub fn parse(&self, path: &Utf8Path, kind: FileKind) -> Result<RawTable, ParseError> {
        let table = match kind {
            FileKind::Csv => parse_csv(path)?,
            FileKind::Xlsx => read_first_sheet(path)?,
            FileKind::Json => parse_json(path)?,
            FileKind::Txt => self.parse_txt(path)?,
        };

        if table.is_empty() {
            return Err(ParseError::NoTabularData {
                path: path.to_owned(),
            });
        }
        tracing::debug!(file = %path, kind = %kind, n_rows = table.len(), "parsed file");
        Ok(table)
    }

    /// Maps source columns onto canonical fields.
    ///
    /// Unmapped columns are dropped; canonical fields with no source column
    /// are left absent.
    #[must_use]
    pub fn normalize_columns(&self, table: &RawTable) -> Vec<CanonicalRow> {
        self.mapper.apply(table)
    }

    /// Keeps rows that have at least one of the required fields.
    #[must_use]
    pub fn validate_required_fields(&self, mut rows: Vec<CanonicalRow>) -> Vec<CanonicalRow> {
        let before = rows.len();
        rows.retain(|row| self.required.iter().any(|&field| row.has_value(field)));
        if rows.len() < before {
            tracing::debug!(
                dropped = before - rows.len(),
                kept = rows.len(),
                "dropped rows missing required fields"
            );
        }
        rows
    }

    /// Parses, maps and filters a file in one step.
    ///
    /// The result may be empty when every row lacks the required fields.
    pub fn parse_rows(&self, path: &Utf8Path, kind: FileKind) -> Result<Vec<CanonicalRow>, ParseError> {
        let table = self.parse(path, kind)?;
        Ok(self.validate_required_fields(self.normalize_columns(&table)))
    }

    /// Like [`parse_rows`](Self::parse_rows), detecting the kind from the extension.
    pub fn parse_path(&self, path: &Utf8Path) -> Result<Vec<CanonicalRow>, ParseError> {
        let kind = FileKind::from_path(path)
            .ok_or_else(|| ParseError::UnsupportedFileType(path.to_owned()))?;
        self.parse_rows(path, kind)
    }

    fn parse_txt(&self, path: &Utf8Path) -> Result<RawTable, ParseError> {
        let bytes = read(path)?;
        let Some((encoding, text)) = decodings(&bytes).next() else {
            return Err(ParseError::UnsupportedEncoding {
                path: path.to_owned(),
            });
        };
        let text = text.trim();

        if text.lines().next().is_some_and(|line| line.contains('\t')) {
            match read_delimited(text, b'\t') {
                Ok(table) if !table.is_empty() => {
                    tracing::trace!(file = %path, encoding = encoding.label(), "read tab-separated text");
                    return Ok(table);
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(file = %path, error = %e, "tab-separated read failed"),
            }
        }

        Ok(extract_rows(text, &self.patterns))
    }
}

fn read(path: &Utf8Path) -> Result<Vec<u8>, ParseError> {
    std::fs::read(path).map_err(|e| ParseError::io(path, e))
}

fn parse_csv(path: &Utf8Path) -> Result<RawTable, ParseError> {
    let bytes = read(path)?;
    for (encoding, text) in decodings(&bytes) {
        match read_delimited(&text, b',') {
            Ok(table) => {
                tracing::trace!(file = %path, encoding = encoding.label(), "decoded CSV");
                return Ok(table);
            }
            Err(e) => {
                tracing::debug!(file = %path, encoding = encoding.label(), error = %e, "CSV read failed");
            }
        }
    }
    Err(ParseError::UnsupportedEncoding {
        path: path.to_owned(),
    })
}

fn parse_json(path: &Utf8Path) -> Result<RawTable, ParseError> {
    let bytes = read(path)?;
    read_json(&bytes).map_err(|e| match e {
        JsonShapeError::Syntax(source) => ParseError::Json {
            path: path.to_owned(),
            source,
        },
        JsonShapeError::Unsupported(found) => ParseError::UnsupportedStructure {
            path: path.to_owned(),
            found,
        },
    })
}
