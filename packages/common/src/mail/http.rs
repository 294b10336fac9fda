use async_trait::async_trait;
use serde::Serialize;

use super::{MailError, MailMessage, Mailer};

/// Mailer backed by an HTTP transactional-email provider.
///
/// Posts a JSON payload to the configured endpoint with a bearer API key.
/// The payload shape (`from`/`to`/`subject`/`text`) matches the common
/// denominator of hosted providers.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    sender: String,
}

#[derive(Serialize)]
struct SendPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl HttpMailer {
    pub fn new(endpoint: String, api_key: String, sender: String) -> Result<Self, MailError> {
        if endpoint.trim().is_empty() {
            return Err(MailError::Config("endpoint must not be empty".into()));
        }
        if sender.trim().is_empty() {
            return Err(MailError::Config("sender must not be empty".into()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            sender,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let payload = SendPayload {
            from: &self.sender,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        tracing::debug!(to = %message.to, "Mail accepted by provider");
        Ok(())
    }
}
