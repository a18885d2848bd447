//! Per-file change planning.
//!
//! Decides, for one bundle file and the entries already stored for its
//! locale, which entries to create and which to update. No I/O.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

use crate::bundle::Locale;
use crate::database::Entry;

/// Everything the planner needs to know about the file being processed.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    pub owner: ObjectId,
    pub path: &'a str,
    pub basename: &'a str,
    pub locale: &'a Locale,
    /// The family's base file: its values always win over stored ones.
    pub is_base: bool,
    pub now: DateTime<Utc>,
    pub author: Option<&'a str>,
}

/// Entries to persist for one file.
#[derive(Debug, Default)]
pub struct ChangePlan {
    pub batch: Vec<Entry>,
    pub created: usize,
    pub updated: usize,
    /// Newly created keys without a value, in key order
    pub missing: Vec<String>,
}

/// Plan the changes for one file.
///
/// - A stored entry whose key is in `keys` takes the file's value when the
///   file is the base file, or when the stored value is empty and the file
///   has a non-empty one. Unchanged values are left alone.
/// - A key of `keys` with no stored entry gets a new entry valued from the
///   file, or empty (and reported missing) when the file lacks it.
pub fn plan_changes(
    ctx: &FileContext<'_>,
    keys: &BTreeSet<String>,
    file_values: &BTreeMap<String, String>,
    existing: Vec<Entry>,
) -> ChangePlan {
    let mut plan = ChangePlan::default();
    let mut seen: HashSet<String> = HashSet::with_capacity(existing.len());

    for mut entry in existing {
        if keys.contains(&entry.key) {
            let file_value = file_values.get(&entry.key).map(String::as_str);
            let replacement = if ctx.is_base {
                file_value
            } else if entry.value.is_empty() {
                file_value.filter(|v| !v.is_empty())
            } else {
                None
            };

            if let Some(value) = replacement
                && entry.set_value(value, ctx.now, ctx.author)
            {
                plan.updated += 1;
                plan.batch.push(entry.clone());
            }
        }
        seen.insert(entry.key);
    }

    for key in keys {
        if seen.contains(key) {
            continue;
        }

        let value = file_values.get(key).cloned().unwrap_or_default();
        let mut entry = Entry::new(ctx.owner, ctx.path, ctx.basename, ctx.locale, key, value, ctx.now);
        entry.author = ctx.author.map(str::to_string);

        if !entry.is_translated() {
            plan.missing.push(key.clone());
        }
        plan.created += 1;
        plan.batch.push(entry);
    }

    plan
}
