//! Reconciliation engine.
//!
//! Merges every configured bundle family with the stored entries:
//! the base file defines the key set, variant files may fill empty
//! translations, stored values are written back to variant files, and new
//! untranslated keys are mailed to the locale's translators.
//!
//! Failures are contained: a missing base file skips its family, an
//! unreadable file or failed batch skips that file only.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::notifier::Notifier;
use super::plan::{plan_changes, FileContext};
use super::report::{FamilyReport, PassReport};
use super::scheduler::PassRunner;
use super::bounded;
use crate::bundle::{derive_base_name, BundleFile, BundleStore, Locale};
use crate::config::BundleFamily;
use crate::database::{Company, Directory, EntryStore};
use crate::error::{SyncError, SyncResult};

/// Default bound for a single storage, file or mail operation.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved state of the family being reconciled.
struct FamilyContext {
    company: Company,
    /// Absolute bundle directory, as stored in entries
    path: String,
    directory: PathBuf,
    basename: String,
    base_file_name: String,
    keys: BTreeSet<String>,
}

/// What happened to one file.
#[derive(Debug, Default)]
struct FileOutcome {
    created: usize,
    updated: usize,
    missing: Vec<String>,
    rewritten: bool,
    rewrite_failed: bool,
}

pub struct Reconciler {
    bundles: BundleStore,
    entries: Arc<dyn EntryStore>,
    directory: Arc<dyn Directory>,
    notifier: Notifier,
    families: Vec<BundleFamily>,
    author: Option<String>,
    io_timeout: Duration,
}

impl Reconciler {
    pub fn new(
        bundles: BundleStore,
        entries: Arc<dyn EntryStore>,
        directory: Arc<dyn Directory>,
        notifier: Notifier,
        families: Vec<BundleFamily>,
    ) -> Self {
        Self {
            bundles,
            entries,
            directory,
            notifier,
            families,
            author: None,
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }

    /// Record `author` on values the synchronizer writes.
    #[must_use]
    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    #[must_use]
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Reconcile one bundle family.
    ///
    /// # Errors
    /// `NotFound` when the base bundle does not exist; `TenantNotFound`,
    /// `Read` or a storage error when the family cannot be processed at all.
    pub async fn reconcile_family(&self, family: &BundleFamily) -> SyncResult<FamilyReport> {
        let base_file = family.base_file();
        let keys = bounded(self.io_timeout, "base bundle read", self.bundles.load_base(&base_file)).await?;
        info!("Base bundle exists: {} ({} keys)", base_file.display(), keys.len());

        let company = bounded(self.io_timeout, "tenant lookup", self.directory.company_by_host(&family.host))
            .await?
            .ok_or_else(|| SyncError::TenantNotFound(family.host.clone()))?;

        let base_file_name = base_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let basename = derive_base_name(&base_file_name);

        let parent = base_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let directory = std::path::absolute(parent).map_err(|source| SyncError::Read {
            path: parent.to_path_buf(),
            source,
        })?;

        let ctx = FamilyContext {
            company,
            path: directory.to_string_lossy().into_owned(),
            directory,
            basename,
            base_file_name,
            keys,
        };
        debug!("Basename: '{}' path: {}", ctx.basename, ctx.path);

        let files = bounded(
            self.io_timeout,
            "bundle directory listing",
            self.bundles.list_family(&ctx.directory, &ctx.basename),
        )
        .await?;

        let mut report = FamilyReport::default();
        let mut missing: BTreeMap<Locale, Vec<String>> = BTreeMap::new();

        for file in &files {
            match self.reconcile_file(&ctx, file).await {
                Ok(outcome) => {
                    report.entries_created += outcome.created;
                    report.entries_updated += outcome.updated;
                    if outcome.rewrite_failed {
                        report.files_failed += 1;
                    } else {
                        report.files_processed += 1;
                    }
                    if outcome.rewritten {
                        report.files_rewritten += 1;
                    }
                    if !outcome.missing.is_empty() {
                        missing.entry(file.locale.clone()).or_default().extend(outcome.missing);
                    }
                }
                Err(e) => {
                    error!(
                        "Skipping bundle {} (locale '{}', {} base keys): {}",
                        file.path.display(),
                        file.locale,
                        ctx.keys.len(),
                        e
                    );
                    report.files_failed += 1;
                }
            }
        }

        for (locale, keys) in missing {
            let tag = locale.tag();
            let outcome = self.notifier.notify(&ctx.company, &tag, &keys).await;
            report.notifications_sent += outcome.delivered();
            report.notifications_failed += outcome.failed;
            report.missing.insert(tag, keys);
        }

        Ok(report)
    }

    async fn reconcile_file(&self, ctx: &FamilyContext, file: &BundleFile) -> SyncResult<FileOutcome> {
        let is_base = file.file_name == ctx.base_file_name;
        debug!(
            "Bundle basename: '{}' language: '{}' country: '{}'",
            ctx.basename, file.locale.language, file.locale.country
        );

        let values = bounded(self.io_timeout, "bundle read", self.bundles.load_variant(&file.path)).await?;
        let existing = bounded(
            self.io_timeout,
            "entry query",
            self.entries.find_by_locale(&ctx.path, &ctx.basename, &file.locale),
        )
        .await?;

        let file_ctx = FileContext {
            owner: ctx.company.id,
            path: &ctx.path,
            basename: &ctx.basename,
            locale: &file.locale,
            is_base,
            now: Utc::now(),
            author: self.author.as_deref(),
        };
        let plan = plan_changes(&file_ctx, &ctx.keys, &values, existing);

        if !plan.batch.is_empty() {
            bounded(self.io_timeout, "entry batch", self.entries.upsert_batch(&plan.batch))
                .await
                .inspect_err(|e| {
                    error!(
                        "Rolled back {} entries for {} locale '{}': {}",
                        plan.batch.len(),
                        ctx.path,
                        file.locale,
                        e
                    );
                })?;
            debug!(
                "Persisted {} created / {} updated entries for locale '{}'",
                plan.created, plan.updated, file.locale
            );
        }

        let mut outcome = FileOutcome {
            created: plan.created,
            updated: plan.updated,
            missing: plan.missing,
            ..Default::default()
        };

        if !is_base {
            match self.rewrite(ctx, file).await {
                Ok(()) => outcome.rewritten = true,
                Err(e) => {
                    error!("Failed to rewrite {}: {}", file.path.display(), e);
                    outcome.rewrite_failed = true;
                }
            }
        }

        Ok(outcome)
    }

    /// Rewrite a variant file from the entries currently stored for it.
    async fn rewrite(&self, ctx: &FamilyContext, file: &BundleFile) -> SyncResult<()> {
        let current = bounded(
            self.io_timeout,
            "entry query",
            self.entries.find_by_locale(&ctx.path, &ctx.basename, &file.locale),
        )
        .await?;
        bounded(self.io_timeout, "bundle write", self.bundles.write_variant(&file.path, &current)).await
    }
}

#[async_trait]
impl PassRunner for Reconciler {
    /// Run one pass over all families, stopping between families once
    /// `cancel` fires. Never fails: every error is contained and logged.
    async fn run_pass(&self, cancel: &CancellationToken) -> PassReport {
        let started = Instant::now();
        let mut report = PassReport::default();
        info!("Synchronizing {} bundle families", self.families.len());

        for family in &self.families {
            if cancel.is_cancelled() {
                info!("Shutdown requested, stopping pass before {}", family);
                report.cancelled = true;
                break;
            }

            match self.reconcile_family(family).await {
                Ok(family_report) => {
                    debug!(
                        "Family {} done, {} locales missing translations",
                        family,
                        family_report.missing.len()
                    );
                    report.absorb(&family_report);
                }
                Err(SyncError::NotFound(path)) => {
                    info!("Base bundle does not exist: {}", path.display());
                    report.families_skipped += 1;
                }
                Err(e) => {
                    error!("Failed to synchronize bundle family {}: {}", family, e);
                    report.families_failed += 1;
                }
            }
        }

        if report.files_failed > 0 || report.families_failed > 0 {
            warn!("Synchronization pass finished with errors in {:?}: {}", started.elapsed(), report);
        } else {
            info!("Synchronization pass finished in {:?}: {}", started.elapsed(), report);
        }
        report
    }
}
