//! SMTP mailer backed by lettre's tokio transport.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use super::Mailer;
use crate::error::{SyncError, SyncResult};

/// Plain SMTP relay (port 25, no TLS), as used for internal relays.
pub struct SmtpMailer {
    host: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(host: &str, timeout: Duration) -> Self {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .timeout(Some(timeout))
            .build();

        Self {
            host: host.to_string(),
            transport,
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, from: &str, subject: &str, body: &str) -> SyncResult<()> {
        let delivery_err = |reason: String| SyncError::Delivery {
            recipient: to.to_string(),
            reason,
        };

        let to_box: Mailbox = to
            .parse()
            .map_err(|e| delivery_err(format!("invalid recipient address: {}", e)))?;
        let from_box: Mailbox = from
            .parse()
            .map_err(|e| delivery_err(format!("invalid sender address: {}", e)))?;

        let message = Message::builder()
            .from(from_box)
            .to(to_box)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| delivery_err(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| delivery_err(format!("smtp {}: {}", self.host, e)))?;

        debug!("Mail '{}' delivered to {} via {}", subject, to, self.host);
        Ok(())
    }
}
