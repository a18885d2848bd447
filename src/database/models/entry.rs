//! Translation entry model.
//!
//! One entry per (owner, path, basename, language, country, key).

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::bundle::Locale;

/// A persisted translation of one key in one locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// MongoDB document ID (None until inserted)
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Owning tenant
    pub owner: ObjectId,

    /// Absolute directory of the bundle family
    pub path: String,

    /// Bundle family name
    pub basename: String,

    /// 2-letter language code, empty for the base locale
    #[serde(default)]
    pub language: String,

    /// 2-letter country code, possibly empty
    #[serde(default)]
    pub country: String,

    pub key: String,

    /// Empty means untranslated
    #[serde(default)]
    pub value: String,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,

    /// Last editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Entry {
    /// Create a fresh, not yet persisted entry.
    pub fn new(
        owner: ObjectId,
        path: impl Into<String>,
        basename: impl Into<String>,
        locale: &Locale,
        key: impl Into<String>,
        value: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            owner,
            path: path.into(),
            basename: basename.into(),
            language: locale.language.clone(),
            country: locale.country.clone(),
            key: key.into(),
            value: value.into(),
            created: now,
            modified: now,
            author: None,
        }
    }

    #[cfg(test)]
    pub fn locale(&self) -> Locale {
        Locale::new(self.language.clone(), self.country.clone())
    }

    pub fn is_translated(&self) -> bool {
        !self.value.is_empty()
    }

    /// Replace the value, refreshing `modified` only when it actually changes.
    ///
    /// Returns `true` if the entry changed.
    pub fn set_value(&mut self, value: &str, now: DateTime<Utc>, author: Option<&str>) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value.to_string();
        self.modified = now;
        if let Some(author) = author {
            self.author = Some(author.to_string());
        }
        true
    }
}
