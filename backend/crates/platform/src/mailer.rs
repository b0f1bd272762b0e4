//! Outbound Mail Capability
//!
//! The rest of the system only depends on the [`Mailer`] trait: deliver a
//! rendered message to one recipient, report success or failure. Transport
//! mechanics live behind it. The production implementation posts to an HTTP
//! mail relay; tests substitute an in-memory double.

use serde::Serialize;
use thiserror::Error;

/// Mail delivery failure. Not retried here; resending is an explicit
/// caller action.
#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Mail relay request failed: {0}")]
    Transport(String),

    #[error("Mail relay rejected the message: status {0}")]
    Rejected(u16),
}

/// A fully rendered outbound message.
#[derive(Debug, Clone, Serialize)]
pub struct MailMessage {
    pub subject: String,
    pub html_body: String,
}

impl MailMessage {
    pub fn new(subject: impl Into<String>, html_body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            html_body: html_body.into(),
        }
    }
}

/// Capability to send one message to one recipient.
#[trait_variant::make(Mailer: Send)]
pub trait LocalMailer {
    async fn send(&self, to: &str, message: &MailMessage) -> Result<(), MailerError>;
}

/// HTTP mail relay client.
///
/// Posts a JSON envelope to the relay endpoint. The relay owns SMTP
/// mechanics; this client only reports delivery success or failure.
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    relay_url: String,
    from: String,
}

#[derive(Serialize)]
struct RelayEnvelope<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

impl HttpMailer {
    pub fn new(client: reqwest::Client, relay_url: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            client,
            relay_url: relay_url.into(),
            from: from.into(),
        }
    }
}

impl Mailer for HttpMailer {
    async fn send(&self, to: &str, message: &MailMessage) -> Result<(), MailerError> {
        let envelope = RelayEnvelope {
            from: &self.from,
            to,
            subject: &message.subject,
            html: &message.html_body,
        };

        let response = self
            .client
            .post(&self.relay_url)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| MailerError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            tracing::warn!(
                status = response.status().as_u16(),
                "Mail relay rejected message"
            );
            return Err(MailerError::Rejected(response.status().as_u16()));
        }

        tracing::debug!(to = %to, "Mail delivered to relay");
        Ok(())
    }
}
