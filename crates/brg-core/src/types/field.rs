//! Canonical catalog columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the eight canonical catalog columns.
///
/// The declaration order is the canonical column order used for CSV headers,
/// JSON object members and column-mapping passes. Each variant serializes to
/// the header string used in the catalog files.
///
/// # Examples
///
/// ```
/// use brg_core::CanonicalField;
///
/// assert_eq!(CanonicalField::Article.header(), "Артикул");
/// assert_eq!("D".parse::<CanonicalField>(), Ok(CanonicalField::OuterDiameter));
/// assert!(CanonicalField::Height.is_numeric());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    /// Free-text product name.
    #[serde(rename = "Наименование")]
    Name,
    /// Bearing designation, the primary business identifier.
    #[serde(rename = "Артикул")]
    Article,
    /// Alternate designation.
    #[serde(rename = "Аналог")]
    Analog,
    /// Manufacturer brand.
    #[serde(rename = "Бренд")]
    Brand,
    /// Outer diameter `D`.
    #[serde(rename = "D")]
    OuterDiameter,
    /// Inner diameter `d`.
    #[serde(rename = "d")]
    InnerDiameter,
    /// Height or width `H`.
    #[serde(rename = "H")]
    Height,
    /// Mass `m`.
    #[serde(rename = "m")]
    Mass,
}

impl CanonicalField {
    /// All canonical fields in canonical column order.
    pub const ALL: [Self; 8] = [
        Self::Name,
        Self::Article,
        Self::Analog,
        Self::Brand,
        Self::OuterDiameter,
        Self::InnerDiameter,
        Self::Height,
        Self::Mass,
    ];

    /// Returns the column header used in catalog files.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::Name => "Наименование",
            Self::Article => "Артикул",
            Self::Analog => "Аналог",
            Self::Brand => "Бренд",
            Self::OuterDiameter => "D",
            Self::InnerDiameter => "d",
            Self::Height => "H",
            Self::Mass => "m",
        }
    }

    /// Returns `true` for the physical dimension columns (`D`, `d`, `H`, `m`).
    #[inline]
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::OuterDiameter | Self::InnerDiameter | Self::Height | Self::Mass
        )
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Error returned when a string is not a canonical header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown canonical field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for CanonicalField {
    type Err = UnknownField;

    /// Matches the header exactly; `d` and `D` are distinct columns.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.header() == s)
            .ok_or_else(|| UnknownField(s.to_owned()))
    }
}
