//! Translation request notifier.
//!
//! Mails every member of a locale's group the keys that still need a
//! translation. One failed delivery never stops the others.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::bounded;
use crate::database::{Company, Directory};
use crate::mail::Mailer;

/// Delivery counts for one locale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyOutcome {
    pub attempted: usize,
    pub failed: usize,
}

impl NotifyOutcome {
    pub fn delivered(&self) -> usize {
        self.attempted - self.failed
    }
}

pub struct Notifier {
    directory: Arc<dyn Directory>,
    mailer: Arc<dyn Mailer>,
    io_timeout: Duration,
}

impl Notifier {
    pub fn new(directory: Arc<dyn Directory>, mailer: Arc<dyn Mailer>, io_timeout: Duration) -> Self {
        Self {
            directory,
            mailer,
            io_timeout,
        }
    }

    /// Send the missing `keys` of `locale` to the locale's subscribers.
    ///
    /// A tenant without a group for the locale has no subscribers, which is
    /// not an error.
    pub async fn notify(&self, company: &Company, locale: &str, keys: &[String]) -> NotifyOutcome {
        let mut outcome = NotifyOutcome::default();

        let group = match bounded(self.io_timeout, "group lookup", self.directory.group_by_name(company, locale)).await {
            Ok(Some(group)) => group,
            Ok(None) => {
                debug!("No subscriber group '{}' for tenant {}", locale, company.id);
                return outcome;
            }
            Err(e) => {
                error!("Failed to look up subscriber group '{}': {}", locale, e);
                return outcome;
            }
        };

        let members = match bounded(self.io_timeout, "group members", self.directory.group_members(company, &group)).await {
            Ok(members) => members,
            Err(e) => {
                error!("Failed to list members of group '{}': {}", locale, e);
                return outcome;
            }
        };

        let subject = subject(locale);
        let body = body(keys);

        for user in &members {
            info!(
                "Sending translation request to {} for {} ({} keys)",
                user.email_address,
                locale,
                keys.len()
            );
            outcome.attempted += 1;

            let send = self.mailer.send(&user.email_address, &company.support_email_address, &subject, &body);
            if let Err(e) = bounded(self.io_timeout, "mail delivery", send).await {
                warn!("Translation request to {} failed: {}", user.email_address, e);
                outcome.failed += 1;
            }
        }

        outcome
    }
}

fn subject(locale: &str) -> String {
    format!("Please translate {}", locale)
}

fn body(keys: &[String]) -> String {
    let mut body = String::from("Missing keys are:\n");
    for key in keys {
        body.push_str(key);
        body.push('\n');
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryDirectory;
    use crate::mail::recording::RecordingMailer;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[tokio::test]
    async fn test_fan_out_continues_after_failure() {
        let (directory, company) = MemoryDirectory::new().with_company("example.com", "support@example.com");
        let directory = directory.with_group(
            &company,
            "fi_FI",
            &["a@example.com", "b@example.com", "c@example.com"],
        );
        let mailer = Arc::new(RecordingMailer::failing_for(&["b@example.com"]));
        let notifier = Notifier::new(Arc::new(directory), mailer.clone(), Duration::from_secs(5));

        let outcome = notifier.notify(&company, "fi_FI", &keys(&["greeting", "farewell"])).await;

        assert_eq!(outcome, NotifyOutcome { attempted: 3, failed: 1 });
        assert_eq!(outcome.delivered(), 2);

        let attempts = mailer.attempts();
        assert_eq!(attempts.len(), 3);
        for mail in &attempts {
            assert_eq!(mail.from, "support@example.com");
            assert_eq!(mail.subject, "Please translate fi_FI");
            assert_eq!(mail.body.lines().filter(|l| *l == "greeting" || *l == "farewell").count(), 2);
        }
    }

    #[tokio::test]
    async fn test_missing_group_is_silent() {
        let (directory, company) = MemoryDirectory::new().with_company("example.com", "support@example.com");
        let mailer = Arc::new(RecordingMailer::new());
        let notifier = Notifier::new(Arc::new(directory), mailer.clone(), Duration::from_secs(5));

        let outcome = notifier.notify(&company, "sv_SE", &keys(&["greeting"])).await;

        assert_eq!(outcome, NotifyOutcome::default());
        assert!(mailer.attempts().is_empty());
    }

    #[test]
    fn test_body_lists_one_key_per_line() {
        assert_eq!(body(&keys(&["a", "b"])), "Missing keys are:\na\nb\n");
    }
}
