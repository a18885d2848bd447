//! In-memory storage used by tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use parking_lot::Mutex;

use super::models::{Company, Entry, Group, User};
use super::store::{Directory, EntryStore};
use crate::bundle::Locale;
use crate::error::{SyncError, SyncResult};

/// Entry store with all-or-nothing batches and a unique identity check.
#[derive(Default)]
pub struct MemoryEntryStore {
    entries: Mutex<Vec<Entry>>,
    failing: Mutex<HashSet<Locale>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every batch touching `locale` fail on its last write.
    pub fn fail_batches_for(&self, locale: Locale) {
        self.failing.lock().insert(locale);
    }

    pub fn seed(&self, mut entry: Entry) -> Entry {
        entry.id.get_or_insert_with(ObjectId::new);
        self.entries.lock().push(entry.clone());
        entry
    }

    pub fn all(&self) -> Vec<Entry> {
        self.entries.lock().clone()
    }

    pub fn locale(&self, locale: &Locale) -> Vec<Entry> {
        let mut found: Vec<Entry> = self
            .entries
            .lock()
            .iter()
            .filter(|e| e.language == locale.language && e.country == locale.country)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.key.cmp(&b.key));
        found
    }
}

fn same_identity(a: &Entry, b: &Entry) -> bool {
    a.owner == b.owner
        && a.path == b.path
        && a.basename == b.basename
        && a.language == b.language
        && a.country == b.country
        && a.key == b.key
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn find_by_locale(&self, path: &str, basename: &str, locale: &Locale) -> SyncResult<Vec<Entry>> {
        let mut found: Vec<Entry> = self
            .entries
            .lock()
            .iter()
            .filter(|e| {
                e.path == path
                    && e.basename == basename
                    && e.language == locale.language
                    && e.country == locale.country
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(found)
    }

    async fn upsert_batch(&self, batch: &[Entry]) -> SyncResult<()> {
        let failing = self.failing.lock().clone();
        let mut entries = self.entries.lock();
        let mut staged = entries.clone();

        for (idx, entry) in batch.iter().enumerate() {
            if idx + 1 == batch.len() && failing.contains(&entry.locale()) {
                return Err(SyncError::Persistence("simulated write failure".to_string()));
            }

            match entry.id {
                None => {
                    if staged.iter().any(|e| same_identity(e, entry)) {
                        return Err(SyncError::Persistence(format!("duplicate key '{}'", entry.key)));
                    }
                    let mut inserted = entry.clone();
                    inserted.id = Some(ObjectId::new());
                    staged.push(inserted);
                }
                Some(id) => {
                    let Some(existing) = staged.iter_mut().find(|e| e.id == Some(id)) else {
                        return Err(SyncError::Persistence(format!("no entry with id {}", id)));
                    };
                    *existing = entry.clone();
                }
            }
        }

        *entries = staged;
        Ok(())
    }
}

/// Directory backed by plain vectors.
#[derive(Default)]
pub struct MemoryDirectory {
    companies: Vec<Company>,
    groups: Vec<Group>,
    members: HashMap<ObjectId, Vec<User>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_company(mut self, host: &str, support_email: &str) -> (Self, Company) {
        let company = Company {
            id: ObjectId::new(),
            host: host.to_string(),
            support_email_address: support_email.to_string(),
        };
        self.companies.push(company.clone());
        (self, company)
    }

    /// Add a group named `name` with one user per address.
    pub fn with_group(mut self, company: &Company, name: &str, emails: &[&str]) -> Self {
        let group = Group {
            id: ObjectId::new(),
            owner: company.id,
            name: name.to_string(),
        };
        let users = emails
            .iter()
            .map(|email| User {
                id: ObjectId::new(),
                owner: company.id,
                email_address: email.to_string(),
            })
            .collect();
        self.members.insert(group.id, users);
        self.groups.push(group);
        self
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn company_by_host(&self, host: &str) -> SyncResult<Option<Company>> {
        let exact = self.companies.iter().find(|c| c.host == host);
        let wildcard = || self.companies.iter().find(|c| c.host == super::WILDCARD_HOST);
        Ok(exact.or_else(wildcard).cloned())
    }

    async fn group_by_name(&self, company: &Company, name: &str) -> SyncResult<Option<Group>> {
        Ok(self
            .groups
            .iter()
            .find(|g| g.owner == company.id && g.name == name)
            .cloned())
    }

    async fn group_members(&self, _company: &Company, group: &Group) -> SyncResult<Vec<User>> {
        Ok(self.members.get(&group.id).cloned().unwrap_or_default())
    }
}
