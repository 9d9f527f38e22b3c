//! Loosely typed tabular data as read from source files.
//!
//! A [`RawTable`] is what a parser produces: whatever headers the source file
//! had, with one [`CellValue`] per header per row. Column mapping turns it
//! into [`CanonicalRow`]s keyed by [`CanonicalField`].

use std::collections::BTreeMap;
use std::fmt;

use super::field::CanonicalField;

/// A single cell from a source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Missing or empty cell.
    #[default]
    Null,
    /// Textual cell.
    Text(String),
    /// Numeric cell (JSON numbers, Excel numeric cells).
    Number(f64),
}

impl CellValue {
    /// Builds a cell from text, treating blank strings as [`CellValue::Null`].
    ///
    /// # Examples
    ///
    /// ```
    /// use brg_core::CellValue;
    ///
    /// assert_eq!(CellValue::from_text("  "), CellValue::Null);
    /// assert_eq!(CellValue::from_text("6205"), CellValue::Text("6205".to_owned()));
    /// ```
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Self::Null
        } else {
            Self::Text(text)
        }
    }

    /// Returns `true` if the cell carries no usable value.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(n) => n.is_nan(),
        }
    }

    /// Renders the cell as text, or `None` for blank cells.
    ///
    /// Integral numbers render without a fractional part, so a JSON
    /// designation like `6205` becomes `"6205"` rather than `"6205.0"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use brg_core::CellValue;
    ///
    /// assert_eq!(CellValue::Number(6205.0).as_text().as_deref(), Some("6205"));
    /// assert_eq!(CellValue::Number(2.5).as_text().as_deref(), Some("2.5"));
    /// assert_eq!(CellValue::Null.as_text(), None);
    /// ```
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        Some(self.to_string())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Text(text) => f.write_str(text),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
        }
    }
}

/// Formats a number the way catalog files store it.
///
/// Uses the shortest representation that round-trips, which prints integral
/// values without a trailing `.0`.
#[must_use]
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

/// A table read from a source file, before column mapping.
///
/// Every row has exactly `headers.len()` cells; parsers pad short rows with
/// [`CellValue::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Column headers in file order.
    pub headers: Vec<String>,
    /// Data rows, each aligned with `headers`.
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Creates a table with the given headers and no rows.
    #[must_use]
    pub fn with_headers(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.headers.len(), CellValue::Null);
        self.rows.push(row);
    }

    /// Returns the number of data rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no data rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the index of a header, if present.
    #[must_use]
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}

/// A row keyed by canonical field. Absent fields are null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalRow {
    cells: BTreeMap<CanonicalField, CellValue>,
}

impl CanonicalRow {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field value.
    pub fn set(&mut self, field: CanonicalField, value: CellValue) {
        self.cells.insert(field, value);
    }

    /// Builder-style variant of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, field: CanonicalField, value: CellValue) -> Self {
        self.set(field, value);
        self
    }

    /// Returns the value of a field, if present.
    #[must_use]
    pub fn get(&self, field: CanonicalField) -> Option<&CellValue> {
        self.cells.get(&field)
    }

    /// Returns `true` if the field is present and not blank.
    #[must_use]
    pub fn has_value(&self, field: CanonicalField) -> bool {
        self.get(field).is_some_and(|value| !value.is_blank())
    }

    /// Iterates over present fields in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &CellValue)> {
        self.cells.iter().map(|(field, value)| (*field, value))
    }
}
