//! Pass and family summaries.

use std::collections::BTreeMap;
use std::fmt;

/// Result of reconciling one bundle family.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilyReport {
    pub files_processed: usize,
    pub files_failed: usize,
    pub files_rewritten: usize,
    pub entries_created: usize,
    pub entries_updated: usize,
    /// Locale tag -> keys still waiting for a translation
    pub missing: BTreeMap<String, Vec<String>>,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
}

/// Result of one complete pass over all configured families.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    pub families_processed: usize,
    pub families_skipped: usize,
    pub families_failed: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub files_rewritten: usize,
    pub entries_created: usize,
    pub entries_updated: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
    /// Stopped early because shutdown was requested
    pub cancelled: bool,
}

impl PassReport {
    pub fn absorb(&mut self, family: &FamilyReport) {
        self.families_processed += 1;
        self.files_processed += family.files_processed;
        self.files_failed += family.files_failed;
        self.files_rewritten += family.files_rewritten;
        self.entries_created += family.entries_created;
        self.entries_updated += family.entries_updated;
        self.notifications_sent += family.notifications_sent;
        self.notifications_failed += family.notifications_failed;
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "families {} ok / {} skipped / {} failed, files {} ok / {} failed / {} rewritten, \
             entries {} created / {} updated, mails {} sent / {} failed",
            self.families_processed,
            self.families_skipped,
            self.families_failed,
            self.files_processed,
            self.files_failed,
            self.files_rewritten,
            self.entries_created,
            self.entries_updated,
            self.notifications_sent,
            self.notifications_failed,
        )
    }
}
