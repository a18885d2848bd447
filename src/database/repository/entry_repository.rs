//! Entry repository.
//!
//! Reads entries per locale and writes per-file batches inside a
//! MongoDB transaction.

use async_trait::async_trait;
use futures::StreamExt;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{ClientSession, Collection, IndexModel};
use tracing::{debug, warn};

use crate::bundle::Locale;
use crate::database::models::Entry;
use crate::database::store::EntryStore;
use crate::database::Database;
use crate::error::SyncResult;

/// Repository for translation entries.
#[derive(Debug, Clone)]
pub struct EntryRepository {
    db: Database,
    collection: Collection<Entry>,
}

impl EntryRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            collection: db.collection("entries"),
        }
    }

    /// Create the unique identity index and the per-locale lookup index.
    pub async fn ensure_indexes(&self) -> SyncResult<()> {
        let identity = IndexModel::builder()
            .keys(doc! {
                "owner": 1,
                "path": 1,
                "basename": 1,
                "language": 1,
                "country": 1,
                "key": 1,
            })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("entry_identity".to_string())
                    .build(),
            )
            .build();

        let lookup = IndexModel::builder()
            .keys(doc! {
                "path": 1,
                "basename": 1,
                "language": 1,
                "country": 1,
                "key": 1,
            })
            .options(IndexOptions::builder().name("entry_locale".to_string()).build())
            .build();

        self.collection.create_index(identity).await?;
        self.collection.create_index(lookup).await?;
        debug!("Ensured entry indexes");
        Ok(())
    }

    async fn write_batch(&self, session: &mut ClientSession, entries: &[Entry]) -> SyncResult<()> {
        for entry in entries {
            match entry.id {
                None => {
                    self.collection.insert_one(entry).session(&mut *session).await?;
                }
                Some(id) => {
                    self.collection
                        .replace_one(doc! { "_id": id }, entry)
                        .session(&mut *session)
                        .await?;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EntryStore for EntryRepository {
    async fn find_by_locale(&self, path: &str, basename: &str, locale: &Locale) -> SyncResult<Vec<Entry>> {
        let filter = doc! {
            "path": path,
            "basename": basename,
            "language": locale.language.as_str(),
            "country": locale.country.as_str(),
        };

        let mut cursor = self.collection.find(filter).sort(doc! { "key": 1 }).await?;
        let mut entries = Vec::new();

        while let Some(result) = cursor.next().await {
            entries.push(result?);
        }

        debug!("Found {} entries for {} {} '{}'", entries.len(), path, basename, locale);
        Ok(entries)
    }

    async fn upsert_batch(&self, entries: &[Entry]) -> SyncResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut session = self.db.start_session().await?;
        session.start_transaction().await?;

        if let Err(e) = self.write_batch(&mut session, entries).await {
            if let Err(abort) = session.abort_transaction().await {
                warn!("Failed to abort entry transaction: {}", abort);
            }
            return Err(e);
        }

        session.commit_transaction().await?;
        debug!("Committed batch of {} entries", entries.len());
        Ok(())
    }
}
