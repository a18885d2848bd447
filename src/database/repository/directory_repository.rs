//! Tenant directory repository with caching.
//!
//! Tenants and groups are cached; memberships are always read fresh so new
//! translators get the next request.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::Collection;
use tracing::debug;

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::database::models::{Company, Group, GroupMember, User, WILDCARD_HOST};
use crate::database::store::Directory;
use crate::database::Database;
use crate::error::SyncResult;

/// Repository for tenants, groups and users.
pub struct DirectoryRepository {
    companies: Collection<Company>,
    groups: Collection<Group>,
    members: Collection<GroupMember>,
    users: Collection<User>,
    /// Host -> tenant
    company_cache: TypedCache<String, Company>,
    /// (Tenant, group name) -> group
    group_cache: TypedCache<(ObjectId, String), Group>,
}

impl DirectoryRepository {
    pub fn new(db: &Database, cache: &CacheRegistry) -> Self {
        let company_cache = cache.get_or_create("companies_by_host", CacheConfig::directory());
        let group_cache = cache.get_or_create(
            "groups_by_name",
            CacheConfig::with_capacity(5_000).ttl(Duration::from_secs(120)),
        );

        Self {
            companies: db.collection("companies"),
            groups: db.collection("groups"),
            members: db.collection("group_members"),
            users: db.collection("users"),
            company_cache,
            group_cache,
        }
    }

    async fn find_company(&self, host: &str) -> SyncResult<Option<Company>> {
        Ok(self.companies.find_one(doc! { "host": host }).await?)
    }
}

#[async_trait]
impl Directory for DirectoryRepository {
    async fn company_by_host(&self, host: &str) -> SyncResult<Option<Company>> {
        if let Some(company) = self.company_cache.get(&host.to_string()) {
            debug!("{} hit for '{}'", self.company_cache.name(), host);
            return Ok(Some(company));
        }

        let company = match self.find_company(host).await? {
            Some(company) => Some(company),
            None if host != WILDCARD_HOST => self.find_company(WILDCARD_HOST).await?,
            None => None,
        };

        if let Some(c) = &company {
            debug!("Resolved host '{}' to tenant {} ({})", host, c.id, c.host);
            self.company_cache.insert(host.to_string(), c.clone());
        }

        Ok(company)
    }

    async fn group_by_name(&self, company: &Company, name: &str) -> SyncResult<Option<Group>> {
        let key = (company.id, name.to_string());
        if let Some(group) = self.group_cache.get(&key) {
            debug!("{} hit for '{}'", self.group_cache.name(), name);
            return Ok(Some(group));
        }

        let filter = doc! { "owner": company.id, "name": name };
        let group = self.groups.find_one(filter).await?;

        if let Some(g) = &group {
            self.group_cache.insert(key, g.clone());
        }

        Ok(group)
    }

    async fn group_members(&self, company: &Company, group: &Group) -> SyncResult<Vec<User>> {
        let mut cursor = self.members.find(doc! { "group": group.id }).await?;
        let mut user_ids = Vec::new();
        while let Some(result) = cursor.next().await {
            user_ids.push(result?.user);
        }

        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let filter = doc! { "_id": { "$in": user_ids }, "owner": company.id };
        let mut cursor = self.users.find(filter).sort(doc! { "email_address": 1 }).await?;
        let mut users = Vec::new();
        while let Some(result) = cursor.next().await {
            users.push(result?);
        }

        debug!("Group '{}' of tenant {} has {} members", group.name, company.id, users.len());
        Ok(users)
    }
}
