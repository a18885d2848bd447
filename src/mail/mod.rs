//! Mail module - outbound translation requests.

mod smtp;

#[cfg(test)]
pub mod recording;

use async_trait::async_trait;

use crate::error::SyncResult;

pub use smtp::SmtpMailer;

/// Sends a single plain-text message.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, from: &str, subject: &str, body: &str) -> SyncResult<()>;
}
