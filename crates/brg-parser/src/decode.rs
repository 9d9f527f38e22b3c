//! Text decoding with a fixed fallback order.
//!
//! Supplier files come as UTF-8, Windows-1251 or Latin-1. Each candidate is
//! tried in that order; the caller decides whether a decoded text is usable.

use std::borrow::Cow;

/// A text encoding tried when reading source files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    /// UTF-8, with an optional byte order mark.
    Utf8,
    /// Windows Cyrillic code page 1251.
    Windows1251,
    /// ISO-8859-1.
    Latin1,
}

impl SourceEncoding {
    /// Candidates in the order they are tried.
    pub const FALLBACK_ORDER: [Self; 3] = [Self::Utf8, Self::Windows1251, Self::Latin1];

    /// Returns the conventional label of the encoding.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Windows1251 => "cp1251",
            Self::Latin1 => "latin1",
        }
    }

    /// Decodes `bytes`, or returns `None` if they are not valid in this encoding.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Option<Cow<'_, str>> {
        match self {
            Self::Utf8 => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                std::str::from_utf8(bytes).ok().map(Cow::Borrowed)
            }
            Self::Windows1251 => encoding_rs::WINDOWS_1251
                .decode_without_bom_handling_and_without_replacement(bytes),
            Self::Latin1 => Some(encoding_rs::mem::decode_latin1(bytes)),
        }
    }
}

/// Yields every successful decoding of `bytes`, in fallback order.
pub fn decodings(bytes: &[u8]) -> impl Iterator<Item = (SourceEncoding, Cow<'_, str>)> {
    SourceEncoding::FALLBACK_ORDER
        .into_iter()
        .filter_map(move |enc| enc.decode(bytes).map(|text| (enc, text)))
}
