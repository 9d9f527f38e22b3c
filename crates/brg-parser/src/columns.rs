//! Mapping of source headers onto canonical fields.
//!
//! Matching runs in two passes over the canonical fields, in canonical order:
//!
//! 1. exact, case-sensitive match against the field's synonyms;
//! 2. for fields still unmatched, a trimmed, case-insensitive match.
//!
//! Within a pass each field takes the first unused source column (in file
//! order) that matches, and a source column is consumed at most once. The
//! canonical header itself always counts as a synonym.

use std::collections::BTreeMap;

use brg_core::{CanonicalField, CanonicalRow, RawTable};

/// Synonym table compiled for header matching.
#[derive(Debug, Clone)]
pub struct ColumnMapper {
    targets: Vec<Target>,
}

#[derive(Debug, Clone)]
struct Target {
    field: CanonicalField,
    exact: Vec<String>,
    folded: Vec<String>,
}

impl ColumnMapper {
    /// Compiles a synonym table.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use brg_core::CanonicalField;
    /// use brg_parser::ColumnMapper;
    ///
    /// let mapper = ColumnMapper::new(&BTreeMap::from([
    ///     (CanonicalField::Article, vec!["part".to_owned()]),
    /// ]));
    /// let headers = vec!["PART".to_owned(), "Бренд".to_owned(), "misc".to_owned()];
    /// assert_eq!(
    ///     mapper.resolve(&headers),
    ///     vec![(0, CanonicalField::Article), (1, CanonicalField::Brand)]
    /// );
    /// ```
    #[must_use]
    pub fn new(synonyms: &BTreeMap<CanonicalField, Vec<String>>) -> Self {
        let targets = CanonicalField::ALL
            .into_iter()
            .map(|field| {
                let mut exact: Vec<String> = synonyms.get(&field).cloned().unwrap_or_default();
                if !exact.iter().any(|s| s == field.header()) {
                    exact.push(field.header().to_owned());
                }
                let folded = exact.iter().map(|s| fold(s)).collect();
                Target {
                    field,
                    exact,
                    folded,
                }
            })
            .collect();
        Self { targets }
    }

    /// Resolves source headers to canonical fields.
    ///
    /// Returns `(column index, field)` pairs sorted by column index. Columns
    /// that match nothing are absent.
    #[must_use]
    pub fn resolve(&self, headers: &[String]) -> Vec<(usize, CanonicalField)> {
        let mut used = vec![false; headers.len()];
        let mut assigned: Vec<Option<usize>> = vec![None; self.targets.len()];

        for (slot, target) in assigned.iter_mut().zip(&self.targets) {
            *slot = claim(headers, &mut used, |h| target.exact.iter().any(|s| s == h));
        }

        let folded_headers: Vec<String> = headers.iter().map(|h| fold(h)).collect();
        for (slot, target) in assigned.iter_mut().zip(&self.targets) {
            if slot.is_some() {
                continue;
            }
            *slot = claim(&folded_headers, &mut used, |h| target.folded.iter().any(|s| s == h));
        }

        let mut mapping: Vec<(usize, CanonicalField)> = assigned
            .into_iter()
            .zip(&self.targets)
            .filter_map(|(slot, target)| slot.map(|idx| (idx, target.field)))
            .collect();
        mapping.sort_unstable_by_key(|(idx, _)| *idx);
        mapping
    }

    /// Projects a table onto canonical fields, dropping unmapped columns.
    #[must_use]
    pub fn apply(&self, table: &RawTable) -> Vec<CanonicalRow> {
        let mapping = self.resolve(&table.headers);
        tracing::trace!(
            mapped = mapping.len(),
            columns = table.headers.len(),
            "resolved column mapping"
        );
        table
            .rows
            .iter()
            .map(|cells| {
                let mut row = CanonicalRow::new();
                for &(idx, field) in &mapping {
                    if let Some(cell) = cells.get(idx) {
                        row.set(field, cell.clone());
                    }
                }
                row
            })
            .collect()
    }
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

fn claim<F>(headers: &[String], used: &mut [bool], matches: F) -> Option<usize>
where
    F: Fn(&str) -> bool,
{
    let idx = headers
        .iter()
        .enumerate()
        .find(|(idx, h)| !used[*idx] && matches(h.as_str()))
        .map(|(idx, _)| idx)?;
    used[idx] = true;
    Some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brg_core::{CellValue, ParsingRules};

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    fn mapper() -> ColumnMapper {
        ColumnMapper::new(&ParsingRules::default().column_mappings)
    }

    #[test]
    fn test_exact_beats_case_insensitive() {
        // "Part" only matches case-insensitively; "part" matches exactly.
        let m = ColumnMapper::new(&BTreeMap::from([(
            CanonicalField::Article,
            vec!["part".to_owned()],
        )]));
        let resolved = m.resolve(&headers(&["Part", "part"]));
        assert_eq!(resolved, vec![(1, CanonicalField::Article)]);
    }

    #[test]
    fn test_d_and_big_d_stay_distinct() {
        let resolved = mapper().resolve(&headers(&["d", "D", "H"]));
        assert_eq!(
            resolved,
            vec![
                (0, CanonicalField::InnerDiameter),
                (1, CanonicalField::OuterDiameter),
                (2, CanonicalField::Height),
            ]
        );
    }

    #[test]
    fn test_column_consumed_once() {
        let m = ColumnMapper::new(&BTreeMap::from([
            (CanonicalField::Name, vec!["code".to_owned()]),
            (CanonicalField::Article, vec!["code".to_owned()]),
        ]));
        assert_eq!(
            m.resolve(&headers(&["code"])),
            vec![(0, CanonicalField::Name)]
        );
    }

    #[test]
    fn test_whitespace_in_header_matches_in_second_pass() {
        let resolved = mapper().resolve(&headers(&["  Outer Diameter ", "Brand"]));
        assert_eq!(
            resolved,
            vec![(0, CanonicalField::OuterDiameter), (1, CanonicalField::Brand)]
        );
    }

    #[test]
    fn test_mapping_is_independent_of_column_order() {
        let a = mapper().resolve(&headers(&["brand", "part", "weight"]));
        let b = mapper().resolve(&headers(&["weight", "part", "brand"]));
        let fields = |v: Vec<(usize, CanonicalField)>| {
            let mut f: Vec<_> = v.into_iter().map(|(_, f)| f).collect();
            f.sort();
            f
        };
        assert_eq!(fields(a), fields(b));
    }

    #[test]
    fn test_apply_drops_unmapped() {
        let mut table = RawTable::with_headers(headers(&["part", "comment", "brand"]));
        table.push_row(vec![
            CellValue::from_text("6206"),
            CellValue::from_text("ignored"),
            CellValue::from_text("nsk"),
        ]);
        let rows = mapper().apply(&table);
        assert_eq!(rows.len(), 1);
        let fields: Vec<_> = rows[0].iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec![CanonicalField::Article, CanonicalField::Brand]);
    }
}
