//! Free-text extraction of bearing dimensions.

use brg_core::{CanonicalField, CellValue, DimensionPattern, RawTable};
use regex::Regex;

use crate::error::ParseError;
use crate::keyed::KeyedRows;

/// A dimension pattern with its regex compiled.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    groups: Vec<String>,
}

impl CompiledPattern {
    /// Compiles a configured pattern.
    ///
    /// Every listed group must be a named capture group of the regex.
    ///
    /// # Examples
    ///
    /// ```
    /// use brg_core::DimensionPattern;
    /// use brg_parser::CompiledPattern;
    ///
    /// assert!(CompiledPattern::compile(&DimensionPattern::inner_outer_height()).is_ok());
    ///
    /// let bad = DimensionPattern { regex: r"(?P<d>\d+)".to_owned(), groups: vec!["D".to_owned()] };
    /// assert!(CompiledPattern::compile(&bad).is_err());
    /// ```
    pub fn compile(pattern: &DimensionPattern) -> Result<Self, ParseError> {
        let invalid = |reason: String| ParseError::InvalidPattern {
            pattern: pattern.regex.clone(),
            reason,
        };

        let regex = Regex::new(&pattern.regex).map_err(|e| invalid(e.to_string()))?;
        let names: Vec<&str> = regex.capture_names().flatten().collect();
        if let Some(missing) = pattern.groups.iter().find(|g| !names.contains(&g.as_str())) {
            return Err(invalid(format!("no capture group named '{missing}'")));
        }

        Ok(Self {
            regex,
            groups: pattern.groups.clone(),
        })
    }

    /// Extracts one row from a line, or `None` if the pattern does not match.
    ///
    /// Each non-empty group becomes a column named after the group. The last
    /// whitespace-separated token before the match becomes the article.
    fn extract(&self, line: &str) -> Option<Vec<(String, CellValue)>> {
        let caps = self.regex.captures(line)?;
        let mut row: Vec<(String, CellValue)> = self
            .groups
            .iter()
            .filter_map(|group| {
                let value = caps.name(group)?.as_str();
                (!value.is_empty()).then(|| (group.clone(), CellValue::from_text(value)))
            })
            .collect();

        let start = caps.get(0).map_or(0, |m| m.start());
        if let Some(token) = line[..start].split_whitespace().last() {
            row.push((
                CanonicalField::Article.header().to_owned(),
                CellValue::from_text(token),
            ));
        }
        Some(row)
    }
}

/// Extracts rows from lines using the first matching pattern per line.
pub(crate) fn extract_rows(text: &str, patterns: &[CompiledPattern]) -> RawTable {
    let mut rows = KeyedRows::new();
    for line in text.lines() {
        if let Some(row) = patterns.iter().find_map(|p| p.extract(line)) {
            rows.push(row);
        }
    }
    rows.into_table()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_patterns() -> Vec<CompiledPattern> {
        vec![CompiledPattern::compile(&DimensionPattern::inner_outer_height()).unwrap()]
    }

    #[test]
    fn test_extracts_dimensions_and_article() {
        let table = extract_rows(
            "Подшипник 6205 25x52x15\nпросто текст\n6206-2RS 30 × 62 × 16 SKF\n",
            &default_patterns(),
        );
        assert_eq!(table.headers, vec!["d", "D", "H", "Артикул"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][3], CellValue::Text("6205".to_owned()));
        assert_eq!(table.rows[1][1], CellValue::Text("62".to_owned()));
        assert_eq!(table.rows[1][3], CellValue::Text("6206-2RS".to_owned()));
    }

    #[test]
    fn test_line_without_leading_token_has_no_article() {
        let table = extract_rows("25x52x15", &default_patterns());
        assert_eq!(table.headers, vec!["d", "D", "H"]);
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        let patterns = vec![
            CompiledPattern::compile(&DimensionPattern {
                regex: r"m=(?P<m>\d+(?:[.,]\d+)?)".to_owned(),
                groups: vec!["m".to_owned()],
            })
            .unwrap(),
            default_patterns().remove(0),
        ];
        let table = extract_rows("6205 25x52x15 m=0,12", &patterns);
        assert_eq!(table.headers, vec!["m", "Артикул"]);
        assert_eq!(table.rows[0][0], CellValue::Text("0,12".to_owned()));
        assert_eq!(table.rows[0][1], CellValue::Text("25x52x15".to_owned()));
    }

    #[test]
    fn test_invalid_regex() {
        let err = CompiledPattern::compile(&DimensionPattern {
            regex: "(".to_owned(),
            groups: vec![],
        })
        .unwrap_err();
        assert!(matches!(err, ParseError::InvalidPattern { .. }));
    }
}
