//! Delivery of login links and codes.

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait LoginMailer: Send + Sync {
    async fn send_login_link(&self, email: &str, link: &str) -> Result<()>;

    async fn send_login_code(&self, email: &str, code: &str) -> Result<()>;
}

/// Writes the message to the log instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMailer;

#[async_trait]
impl LoginMailer for LoggingMailer {
    async fn send_login_link(&self, email: &str, link: &str) -> Result<()> {
        tracing::info!("[Mailer] Login link for {}: {}", email, link);
        Ok(())
    }

    async fn send_login_code(&self, email: &str, code: &str) -> Result<()> {
        tracing::info!("[Mailer] Verification code for {}: {}", email, code);
        Ok(())
    }
}
