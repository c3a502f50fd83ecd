// src/services/mailer.rs

use async_trait::async_trait;

use crate::error::AppError;

/// Outgoing mail. Delivery itself (SMTP, provider API) lives outside this
/// service.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError>;
}

/// Writes mails to the log instead of sending them.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        tracing::info!(to = %to, subject = %subject, "Outgoing mail:\n{}", body);
        Ok(())
    }
}

/// Keeps every mail in memory. Used by tests to read reset links.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    outbox: std::sync::Mutex<Vec<SentMail>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MemoryMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.outbox.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        self.outbox
            .lock()
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
            .push(SentMail {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        Ok(())
    }
}
