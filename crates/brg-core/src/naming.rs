//! Archival file naming.
//!
//! Every ingested file is renamed on the way out of the inbox to
//!
//! ```text
//! YYYYMMDD_HHMMSS__<safe-stem>__<n-records>__<short-hash>[__ERROR__<CODE>].<ext>
//! ```
//!
//! so the archive directories sort chronologically and each name carries
//! enough context to find the matching registry entry and audit record.

use camino::Utf8Path;
use chrono::NaiveDateTime;

/// Default length of the sanitized source-name segment.
pub const MAX_STEM_LEN: usize = 50;

/// Default length of the hash segment.
pub const SHORT_HASH_LEN: usize = 8;

/// Timestamp format of the leading segment.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Turns a file name into a filesystem-safe slug.
///
/// The extension is dropped, characters other than letters, digits, `_`,
/// `-` and whitespace become `_`, whitespace runs become `_`, repeated `_`
/// collapse and leading/trailing `_` are trimmed. The result is cut to
/// `max_len` characters. An empty result becomes `"file"`.
///
/// # Examples
///
/// ```
/// use brg_core::safe_file_stem;
///
/// assert_eq!(safe_file_stem("Прайс SKF (март).xlsx", 50), "Прайс_SKF_март");
/// assert_eq!(safe_file_stem("???.csv", 50), "file");
/// ```
#[must_use]
pub fn safe_file_stem(name: &str, max_len: usize) -> String {
    let stem = Utf8Path::new(name).file_stem().unwrap_or(name);

    let mut slug = String::with_capacity(stem.len());
    for c in stem.chars() {
        let mapped = if c.is_alphanumeric() || c == '-' {
            c
        } else {
            '_'
        };
        if mapped == '_' && slug.ends_with('_') {
            continue;
        }
        slug.push(mapped);
    }

    let trimmed = slug.trim_matches('_');
    let truncated: String = trimmed.chars().take(max_len).collect();
    let truncated = truncated.trim_end_matches('_');
    if truncated.is_empty() {
        "file".to_owned()
    } else {
        truncated.to_owned()
    }
}

/// Returns the first `len` characters of a hex digest.
///
/// # Examples
///
/// ```
/// use brg_core::short_hash;
///
/// assert_eq!(short_hash("abcdef0123456789", 8), "abcdef01");
/// assert_eq!(short_hash("abc", 8), "abc");
/// ```
#[must_use]
pub fn short_hash(hash: &str, len: usize) -> &str {
    hash.char_indices()
        .nth(len)
        .map_or(hash, |(end, _)| &hash[..end])
}

/// Builds the archival name for an ingested file.
///
/// `error_code` adds the `__ERROR__<CODE>` marker used for files routed to
/// the error directory. The original extension is kept; files without one
/// get `.txt`.
#[must_use]
pub fn archive_file_name(
    original: &str,
    n_records: usize,
    hash: &str,
    error_code: Option<&str>,
    now: NaiveDateTime,
) -> String {
    let ext = Utf8Path::new(original)
        .extension()
        .filter(|ext| !ext.is_empty())
        .unwrap_or("txt");

    let mut name = format!(
        "{}__{}__{}__{}",
        now.format(TIMESTAMP_FORMAT),
        safe_file_stem(original, MAX_STEM_LEN),
        n_records,
        short_hash(hash, SHORT_HASH_LEN),
    );
    if let Some(code) = error_code {
        name.push_str("__ERROR__");
        name.push_str(code);
    }
    name.push('.');
    name.push_str(ext);
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 9)
            .unwrap()
    }

    const HASH: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    #[test]
    fn test_safe_file_stem() {
        assert_eq!(safe_file_stem("price list.csv", 50), "price_list");
        assert_eq!(safe_file_stem("a  --  b.csv", 50), "a_--_b");
        assert_eq!(safe_file_stem("__x__.csv", 50), "x");
        assert_eq!(safe_file_stem("noext", 50), "noext");
        assert_eq!(safe_file_stem("", 50), "file");
    }

    #[test]
    fn test_safe_file_stem_truncates() {
        let long = format!("{}.csv", "a".repeat(80));
        assert_eq!(safe_file_stem(&long, 50).chars().count(), 50);
        assert_eq!(safe_file_stem("ab_cd.csv", 3), "ab");
    }

    #[test]
    fn test_archive_file_name_success() {
        let name = archive_file_name("Прайс SKF.csv", 2, HASH, None, at());
        insta::assert_snapshot!(name, @"20240305_140709__Прайс_SKF__2__9f86d081.csv");
    }

    #[test]
    fn test_archive_file_name_error() {
        let name = archive_file_name("big.xlsx", 0, HASH, Some("SIZE"), at());
        insta::assert_snapshot!(name, @"20240305_140709__big__0__9f86d081__ERROR__SIZE.xlsx");
    }

    #[test]
    fn test_archive_file_name_default_extension() {
        let name = archive_file_name("README", 0, "unknown", Some("UNSUPPORTED_TYPE"), at());
        assert_eq!(
            name,
            "20240305_140709__README__0__unknown__ERROR__UNSUPPORTED_TYPE.txt"
        );
    }
}
