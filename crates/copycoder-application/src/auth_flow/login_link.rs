//! Email login links.

use std::sync::Arc;
use thiserror::Error;

use copycoder_core::auth::{AuthService, LoginMailer, LoginRejection, LoginRequest};
use copycoder_core::error::CopyCoderError;

use super::query::{get, parse_query, query_of};

/// Path of the verification endpoint.
pub const VERIFY_PATH: &str = "/api/auth/verify";

#[derive(Debug, Clone, Error)]
pub enum LoginFlowError {
    #[error(transparent)]
    Rejected(#[from] LoginRejection),

    #[error("Failed to send verification email. Please try again.")]
    Delivery(#[source] CopyCoderError),
}

/// `<base>/api/auth/verify?email=<urlencoded>&token=<token>`
pub fn build_verification_link(base_url: &str, email: &str, token: &str) -> String {
    format!(
        "{}{}?email={}&token={}",
        base_url.trim_end_matches('/'),
        VERIFY_PATH,
        urlencoding::encode(email),
        token
    )
}

/// Issues login secrets and delivers them by mail.
pub struct LoginLinkService {
    auth: Arc<AuthService>,
    mailer: Arc<dyn LoginMailer>,
}

impl LoginLinkService {
    pub fn new(auth: Arc<AuthService>, mailer: Arc<dyn LoginMailer>) -> Self {
        Self { auth, mailer }
    }

    /// Sends a verification link and returns it.
    pub async fn send_login_link(&self, email: &str) -> Result<String, LoginFlowError> {
        let ticket = self
            .auth
            .request_login(LoginRequest::EmailLink {
                email: email.to_string(),
            })
            .await?;
        let link = build_verification_link(&self.auth.config().base_url, email, &ticket.secret);

        self.mailer
            .send_login_link(email, &link)
            .await
            .map_err(LoginFlowError::Delivery)?;
        tracing::info!("[Auth] Verification link sent to {}", email);
        Ok(link)
    }

    /// Sends a 6-digit verification code.
    pub async fn send_login_code(&self, email: &str) -> Result<(), LoginFlowError> {
        let ticket = self
            .auth
            .request_login(LoginRequest::EmailCode {
                email: email.to_string(),
            })
            .await?;
        self.mailer
            .send_login_code(email, &ticket.secret)
            .await
            .map_err(LoginFlowError::Delivery)?;
        tracing::info!("[Auth] Verification code sent to {}", email);
        Ok(())
    }
}

/// A redirect issued by the verification endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
}

impl Redirect {
    fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

/// Handles requests to the verification endpoint.
pub struct VerifyLinkHandler {
    auth: Arc<AuthService>,
}

impl VerifyLinkHandler {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }

    /// Verifies the `email`/`token` pair from `url` (a full link or just its
    /// query) and returns where to send the browser.
    pub async fn handle(&self, url: &str) -> Redirect {
        let query = if url.contains('?') { query_of(url) } else { url };
        let pairs = parse_query(query);

        let (Some(email), Some(token)) = (get(&pairs, "email"), get(&pairs, "token")) else {
            return Redirect::to("/?error=invalid_link");
        };

        match self.auth.verify(email, token).await {
            Ok(_) => Redirect::to("/?login=success"),
            Err(e) => Redirect::to(format!("/?error={}", urlencoding::encode(&e.to_string()))),
        }
    }
}
