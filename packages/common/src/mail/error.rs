use thiserror::Error;

/// Errors produced by a [`super::Mailer`] implementation.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail provider rejected the message: {status}: {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Invalid mail configuration: {0}")]
    Config(String),
}
