//! Outbound email seam.
//!
//! Delivery is delegated to an external transactional-email provider. The
//! [`Mailer`] trait keeps the API handlers independent of the concrete
//! provider so tests can substitute a recording or failing implementation.

mod error;
mod http;

pub use error::MailError;
pub use http::HttpMailer;

use async_trait::async_trait;

/// A plain-text email message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound email delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a message. Callers decide whether a failure is fatal;
    /// invitation handlers deliberately tolerate it.
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Mailer that silently drops all messages. Used when delivery is disabled.
pub struct NullMailer;

#[async_trait]
impl Mailer for NullMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        tracing::debug!(to = %message.to, subject = %message.subject, "Mail delivery disabled, dropping message");
        Ok(())
    }
}
