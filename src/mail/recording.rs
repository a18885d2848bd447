//! Mailer that records messages instead of sending them.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::Mailer;
use crate::error::{SyncError, SyncResult};

#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

/// Records every attempt; addresses in `failing` are rejected after recording.
#[derive(Default)]
pub struct RecordingMailer {
    attempts: Mutex<Vec<SentMail>>,
    failing: HashSet<String>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(addresses: &[&str]) -> Self {
        Self {
            attempts: Mutex::default(),
            failing: addresses.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn attempts(&self) -> Vec<SentMail> {
        self.attempts.lock().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, from: &str, subject: &str, body: &str) -> SyncResult<()> {
        self.attempts.lock().push(SentMail {
            to: to.to_string(),
            from: from.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });

        if self.failing.contains(to) {
            return Err(SyncError::Delivery {
                recipient: to.to_string(),
                reason: "mailbox unavailable".to_string(),
            });
        }
        Ok(())
    }
}
