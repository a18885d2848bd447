//! Storage seams used by the synchronizer.
//!
//! The MongoDB repositories implement these; tests use in-memory versions.

use async_trait::async_trait;

use super::models::{Company, Entry, Group, User};
use crate::bundle::Locale;
use crate::error::SyncResult;

/// Persisted translation entries.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// All entries of one locale of one bundle family, sorted by key.
    async fn find_by_locale(&self, path: &str, basename: &str, locale: &Locale) -> SyncResult<Vec<Entry>>;

    /// Insert entries without id and replace entries with id, atomically.
    ///
    /// Either the whole batch is committed or none of it is. Unique key
    /// violations are `Persistence` errors.
    async fn upsert_batch(&self, entries: &[Entry]) -> SyncResult<()>;
}

/// Tenants, groups and their members.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Tenant registered for `host`, falling back to the wildcard tenant.
    async fn company_by_host(&self, host: &str) -> SyncResult<Option<Company>>;

    async fn group_by_name(&self, company: &Company, name: &str) -> SyncResult<Option<Group>>;

    async fn group_members(&self, company: &Company, group: &Group) -> SyncResult<Vec<User>>;
}
