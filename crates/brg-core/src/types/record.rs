//! Typed catalog rows and the values derived from them.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::field::CanonicalField;
use super::table::format_number;

/// One canonical catalog row.
///
/// Text fields are `None` when absent or blank; dimension fields are `None`
/// when absent or unparseable. A record is only admitted into the catalog
/// when [`article`](Self::article) is present.
///
/// Serializes with the canonical headers as keys, so the JSON mirror of the
/// catalog is an array of these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Free-text product name.
    #[serde(rename = "Наименование")]
    pub name: Option<String>,
    /// Bearing designation.
    #[serde(rename = "Артикул")]
    pub article: Option<String>,
    /// Alternate designation.
    #[serde(rename = "Аналог")]
    pub analog: Option<String>,
    /// Normalized brand.
    #[serde(rename = "Бренд")]
    pub brand: Option<String>,
    /// Outer diameter.
    #[serde(rename = "D")]
    pub outer: Option<f64>,
    /// Inner diameter.
    #[serde(rename = "d")]
    pub inner: Option<f64>,
    /// Height or width.
    #[serde(rename = "H")]
    pub height: Option<f64>,
    /// Mass.
    #[serde(rename = "m")]
    pub mass: Option<f64>,
}

impl CatalogRecord {
    /// Returns the physical dimension triple used for conflict detection.
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            outer: self.outer,
            inner: self.inner,
            height: self.height,
        }
    }

    /// Returns the dedup key, or `None` if the record has no article.
    #[must_use]
    pub fn dedup_key(&self) -> Option<DedupKey> {
        let article = self.article.as_deref().filter(|a| !a.is_empty())?;
        Some(DedupKey::new(article, self.brand.as_deref()))
    }

    /// Renders a field as it appears in a catalog CSV cell.
    ///
    /// Absent values render as an empty string.
    #[must_use]
    pub fn field_text(&self, field: CanonicalField) -> String {
        let number = |v: Option<f64>| v.map(format_number).unwrap_or_default();
        match field {
            CanonicalField::Name => self.name.clone().unwrap_or_default(),
            CanonicalField::Article => self.article.clone().unwrap_or_default(),
            CanonicalField::Analog => self.analog.clone().unwrap_or_default(),
            CanonicalField::Brand => self.brand.clone().unwrap_or_default(),
            CanonicalField::OuterDiameter => number(self.outer),
            CanonicalField::InnerDiameter => number(self.inner),
            CanonicalField::Height => number(self.height),
            CanonicalField::Mass => number(self.mass),
        }
    }
}

/// The `(D, d, H)` triple compared by the dedup rule.
///
/// Two triples are equal when each component is equal, with two absent
/// components counting as equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Outer diameter.
    #[serde(rename = "D")]
    pub outer: Option<f64>,
    /// Inner diameter.
    #[serde(rename = "d")]
    pub inner: Option<f64>,
    /// Height or width.
    #[serde(rename = "H")]
    pub height: Option<f64>,
}

/// Identity of a catalog row for deduplication.
///
/// A blank brand is normalized to `None`, so brandless rows only ever match
/// other brandless rows.
///
/// # Examples
///
/// ```
/// use brg_core::DedupKey;
///
/// assert_eq!(DedupKey::new("6205", Some("")), DedupKey::new("6205", None));
/// assert_ne!(DedupKey::new("6205", Some("SKF")), DedupKey::new("6205", None));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey {
    /// Bearing designation.
    pub article: String,
    /// Brand, if any.
    pub brand: Option<String>,
}

impl DedupKey {
    /// Creates a key, treating an empty brand as absent.
    #[must_use]
    pub fn new(article: impl Into<String>, brand: Option<&str>) -> Self {
        Self {
            article: article.into(),
            brand: brand.filter(|b| !b.is_empty()).map(str::to_owned),
        }
    }
}

/// A dimension mismatch between a new row and existing rows with the same key.
///
/// The new row is still added; the conflict is only reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// Article shared by the conflicting rows.
    pub article: String,
    /// Brand shared by the conflicting rows.
    pub brand: Option<String>,
    /// Dimensions of the row being added.
    pub new_dimensions: Dimensions,
    /// Dimensions of every existing row with the same key.
    pub existing_dimensions: SmallVec<[Dimensions; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(article: &str, brand: Option<&str>, h: f64) -> CatalogRecord {
        CatalogRecord {
            article: Some(article.to_owned()),
            brand: brand.map(str::to_owned),
            outer: Some(52.0),
            inner: Some(25.0),
            height: Some(h),
            ..CatalogRecord::default()
        }
    }

    #[test]
    fn test_dedup_key() {
        assert_eq!(
            record("6205", Some("SKF"), 15.0).dedup_key(),
            Some(DedupKey::new("6205", Some("SKF")))
        );
        assert_eq!(CatalogRecord::default().dedup_key(), None);
        let blank = CatalogRecord {
            article: Some(String::new()),
            ..CatalogRecord::default()
        };
        assert_eq!(blank.dedup_key(), None);
    }

    #[test]
    fn test_dimensions_equality() {
        let a = record("6205", None, 15.0);
        let b = record("6205", None, 18.0);
        assert_eq!(a.dimensions(), a.clone().dimensions());
        assert_ne!(a.dimensions(), b.dimensions());
        assert_eq!(Dimensions::default(), Dimensions::default());
    }

    #[test]
    fn test_field_text() {
        let r = record("6205", Some("SKF"), 15.0);
        assert_eq!(r.field_text(CanonicalField::Article), "6205");
        assert_eq!(r.field_text(CanonicalField::Height), "15");
        assert_eq!(r.field_text(CanonicalField::Mass), "");
        assert_eq!(r.field_text(CanonicalField::Name), "");
    }

    #[test]
    fn test_json_uses_canonical_headers() {
        let json = serde_json::to_value(record("6205", None, 15.5)).unwrap();
        assert_eq!(json["Артикул"], "6205");
        assert_eq!(json["H"], 15.5);
        assert!(json["Бренд"].is_null());
        assert!(json["m"].is_null());
    }
}
