//! Locale and bundle file naming.
//!
//! Bundle files follow `{basename}[_{language}[_{country}]].properties`.

use std::fmt;

/// File suffix shared by every bundle file.
pub const PROPERTIES_SUFFIX: &str = ".properties";

/// A (language, country) pair. Either part may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale {
    pub language: String,
    pub country: String,
}

impl Locale {
    pub fn new(language: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            country: country.into(),
        }
    }

    /// The default locale of the base file.
    #[cfg(test)]
    pub fn base() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_base(&self) -> bool {
        self.language.is_empty() && self.country.is_empty()
    }

    /// `language_country`, also the name of the locale's subscriber group.
    pub fn tag(&self) -> String {
        format!("{}_{}", self.language, self.country)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// A parsed bundle file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFileName {
    pub basename: String,
    pub locale: Locale,
}

/// Derive the family base name from the base file name.
///
/// `messages.properties` and `messages_en.properties` both yield `messages`.
pub fn derive_base_name(file_name: &str) -> String {
    let stem = file_name
        .strip_suffix(PROPERTIES_SUFFIX)
        .unwrap_or(file_name);

    match stem.find('_') {
        Some(idx) => stem[..idx].to_string(),
        None => stem.to_string(),
    }
}

/// Parse a bundle file name into base name and locale.
///
/// Parsing is greedy left to right: language first, then country.
/// Anything after the country is ignored.
pub fn parse_file_name(file_name: &str) -> Option<BundleFileName> {
    if !file_name.ends_with(PROPERTIES_SUFFIX) {
        return None;
    }

    let stem = file_name.split('.').next().unwrap_or_default();
    let mut parts = stem.split('_');

    let basename = parts.next().unwrap_or_default().to_string();
    let language = parts.next().unwrap_or_default();
    let country = parts.next().unwrap_or_default();

    Some(BundleFileName {
        basename,
        locale: Locale::new(language, country),
    })
}
