//! Value normalization for catalog fields.
//!
//! Free text, numbers and brand names arrive in whatever shape the supplier
//! used. The functions here reduce them to the canonical representation
//! stored in the catalog.

use std::collections::BTreeMap;

use crate::config::BrandFormat;
use crate::types::CellValue;

/// Normalizes free text.
///
/// Control characters are removed, whitespace runs collapse to a single
/// space, the result is trimmed and then every `replacements` entry is
/// applied in key order.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use brg_core::normalize_text;
///
/// let replacements = BTreeMap::from([("×".to_owned(), "x".to_owned())]);
/// assert_eq!(normalize_text("  25×52\t×15 ", &replacements), "25x52 x15");
/// ```
#[must_use]
pub fn normalize_text(text: &str, replacements: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().filter(|c| !c.is_control()));
    }
    // A word made only of control characters leaves a trailing space.
    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);

    for (from, to) in replacements {
        if !from.is_empty() && out.contains(from.as_str()) {
            out = out.replace(from.as_str(), to);
        }
    }
    out
}

/// Normalizes a numeric cell.
///
/// Numbers pass through when finite. Text has all whitespace removed, a
/// comma accepted as the decimal separator, and is then parsed. Anything
/// unparseable or non-finite yields `None`.
///
/// # Examples
///
/// ```
/// use brg_core::{CellValue, normalize_number};
///
/// assert_eq!(normalize_number(&CellValue::from_text("1 234,5")), Some(1234.5));
/// assert_eq!(normalize_number(&CellValue::Number(62.0)), Some(62.0));
/// assert_eq!(normalize_number(&CellValue::from_text("n/a")), None);
/// ```
#[must_use]
pub fn normalize_number(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::Null => return None,
        CellValue::Number(n) => *n,
        CellValue::Text(text) => {
            let cleaned: String = text
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            cleaned.parse::<f64>().ok()?
        }
    };
    value.is_finite().then_some(value)
}

/// Normalizes a brand name.
///
/// The text is normalized, resolved through `aliases` (exact key first,
/// then the lowercased key) and finally re-cased according to `format`.
/// Returns `None` when nothing is left.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use brg_core::{BrandFormat, normalize_brand};
///
/// let aliases = BTreeMap::from([("skf".to_owned(), "SKF".to_owned())]);
/// assert_eq!(normalize_brand(" Skf ", &aliases, BrandFormat::Upper).as_deref(), Some("SKF"));
/// assert_eq!(normalize_brand("nsk", &aliases, BrandFormat::Title).as_deref(), Some("Nsk"));
/// assert_eq!(normalize_brand("  ", &aliases, BrandFormat::Upper), None);
/// ```
#[must_use]
pub fn normalize_brand(
    brand: &str,
    aliases: &BTreeMap<String, String>,
    format: BrandFormat,
) -> Option<String> {
    let normalized = normalize_text(brand, &BTreeMap::new());
    if normalized.is_empty() {
        return None;
    }

    let resolved = aliases
        .get(&normalized)
        .or_else(|| aliases.get(&normalized.to_lowercase()))
        .map_or(normalized.as_str(), String::as_str);

    let cased = match format {
        BrandFormat::Upper => resolved.to_uppercase(),
        BrandFormat::Title => title_case(resolved),
    };
    (!cased.is_empty()).then_some(cased)
}

/// Uppercases the first letter of every alphabetic run and lowercases the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
