//! Authentication service.
//!
//! Issues one-time secrets (UUID tokens for links, 6-digit codes otherwise),
//! checks them, and persists the logged-in user to session storage under
//! `auth_user` / `auth_token`.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use super::model::{LoginMethod, LoginRequest, User};
use super::state::SessionState;
use crate::clock::Clock;
use crate::config::AuthConfig;
use crate::error::CopyCoderError;
use crate::storage::{AUTH_TOKEN_KEY, AUTH_USER_KEY, KeyValueStore};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

const MIN_PASSWORD_LEN: usize = 6;
const SESSION_TOKEN_PREFIX: &str = "email-login-token-";

/// A login request that failed input validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginRejection {
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Username is required")]
    MissingUsername,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
}

#[derive(Debug, Clone, Error)]
pub enum VerificationError {
    #[error("Invalid verification link")]
    InvalidLink,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Verification link has expired")]
    Expired,

    #[error("User not found")]
    UserNotFound,

    #[error("Failed to persist session: {0}")]
    Storage(#[from] CopyCoderError),
}

/// Any failure of a one-shot login.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error(transparent)]
    Rejected(#[from] LoginRejection),

    #[error(transparent)]
    Verification(#[from] VerificationError),
}

/// An issued one-time secret, handed to the delivery channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginTicket {
    pub identifier: String,
    pub method: LoginMethod,
    pub secret: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct PendingSecret {
    secret: String,
    method: LoginMethod,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct AuthInner {
    users: HashMap<String, User>,
    secrets: HashMap<String, PendingSecret>,
    /// Method of the latest secret issued per identifier; outlives the secret.
    issued: HashMap<String, LoginMethod>,
    state: SessionState,
}

/// Mock authentication service; construct once and share through `Arc`.
pub struct AuthService {
    clock: Arc<dyn Clock>,
    session: Arc<dyn KeyValueStore>,
    config: AuthConfig,
    rng: Mutex<StdRng>,
    inner: AsyncMutex<AuthInner>,
}

impl AuthService {
    pub fn new(clock: Arc<dyn Clock>, session: Arc<dyn KeyValueStore>, config: AuthConfig) -> Self {
        Self::with_rng(clock, session, config, StdRng::from_entropy())
    }

    pub fn with_seed(
        clock: Arc<dyn Clock>,
        session: Arc<dyn KeyValueStore>,
        config: AuthConfig,
        seed: u64,
    ) -> Self {
        Self::with_rng(clock, session, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        clock: Arc<dyn Clock>,
        session: Arc<dyn KeyValueStore>,
        config: AuthConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            clock,
            session,
            config,
            rng: Mutex::new(rng),
            inner: AsyncMutex::new(AuthInner::default()),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn is_valid_email(email: &str) -> bool {
        EMAIL_PATTERN.is_match(email)
    }

    fn check_request(request: &LoginRequest) -> Result<(), LoginRejection> {
        match request {
            LoginRequest::EmailLink { email } | LoginRequest::EmailCode { email } => {
                if !Self::is_valid_email(email) {
                    return Err(LoginRejection::InvalidEmail);
                }
            }
            LoginRequest::Credentials { username, password } => {
                if username.trim().is_empty() {
                    return Err(LoginRejection::MissingUsername);
                }
                if password.chars().count() < MIN_PASSWORD_LEN {
                    return Err(LoginRejection::PasswordTooShort);
                }
            }
        }
        Ok(())
    }

    fn new_secret(&self, method: LoginMethod) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        match method {
            LoginMethod::EmailLink => {
                let mut bytes = [0u8; 16];
                rng.fill(&mut bytes);
                uuid::Builder::from_random_bytes(bytes)
                    .into_uuid()
                    .to_string()
            }
            LoginMethod::EmailCode | LoginMethod::Credentials => {
                rng.gen_range(100_000..1_000_000).to_string()
            }
        }
    }

    /// Validates the request, creates or fetches the user, and stores a
    /// fresh one-time secret (replacing any earlier one for the identifier).
    pub async fn request_login(&self, request: LoginRequest) -> Result<LoginTicket, LoginRejection> {
        tokio::time::sleep(self.config.request_latency()).await;

        if let Err(rejection) = Self::check_request(&request) {
            tracing::info!("[Auth] Login request rejected: {}", rejection);
            return Err(rejection);
        }

        let identifier = request.identifier().to_string();
        let method = request.method();
        let secret = self.new_secret(method);
        let expires_at = self.clock.now() + self.config.token_ttl();

        let mut inner = self.inner.lock().await;
        inner
            .users
            .entry(identifier.clone())
            .or_insert_with(|| User::new(identifier.clone()));
        inner.issued.insert(identifier.clone(), method);
        inner.secrets.insert(
            identifier.clone(),
            PendingSecret {
                secret: secret.clone(),
                method,
                expires_at,
            },
        );
        let state = std::mem::take(&mut inner.state);
        inner.state = state.requested(identifier.clone(), method);

        tracing::info!("[Auth] Issued {} secret for {}", method, identifier);
        Ok(LoginTicket {
            identifier,
            method,
            secret,
            expires_at,
        })
    }

    /// Checks a one-time secret. Link tokens are consumed by every attempt;
    /// codes survive a mismatch and are consumed on success or expiry.
    pub async fn verify(&self, identifier: &str, secret: &str) -> Result<User, VerificationError> {
        tokio::time::sleep(self.config.verify_latency()).await;

        let mut inner = self.inner.lock().await;
        let result = Self::consume_secret(&mut inner, identifier, secret, self.clock.now());

        let user = match result {
            Ok(user) => user,
            Err(e) => {
                tracing::info!("[Auth] Verification failed for {}: {}", identifier, e);
                if !inner.secrets.contains_key(identifier) {
                    let state = std::mem::take(&mut inner.state);
                    inner.state = state.rejected();
                }
                return Err(e);
            }
        };

        self.persist_session(&user).await?;
        let state = std::mem::take(&mut inner.state);
        inner.state = state.verified(user.clone());
        tracing::info!("[Auth] {} logged in as {}", user.email, user.role);
        Ok(user)
    }

    fn consume_secret(
        inner: &mut AuthInner,
        identifier: &str,
        secret: &str,
        now: DateTime<Utc>,
    ) -> Result<User, VerificationError> {
        let invalid = |method: LoginMethod| match method {
            LoginMethod::EmailLink => VerificationError::InvalidLink,
            LoginMethod::EmailCode | LoginMethod::Credentials => VerificationError::InvalidCode,
        };

        let Some(stored) = inner.secrets.get(identifier).cloned() else {
            let method = inner
                .issued
                .get(identifier)
                .copied()
                .unwrap_or(LoginMethod::EmailLink);
            return Err(invalid(method));
        };

        if stored.secret != secret {
            if stored.method == LoginMethod::EmailLink {
                inner.secrets.remove(identifier);
            }
            return Err(invalid(stored.method));
        }
        inner.secrets.remove(identifier);
        if now > stored.expires_at {
            return Err(VerificationError::Expired);
        }

        inner
            .users
            .get(identifier)
            .cloned()
            .ok_or(VerificationError::UserNotFound)
    }

    /// Request followed by immediate verification; credentials have no
    /// out-of-band step.
    pub async fn login_with_credentials(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let ticket = self
            .request_login(LoginRequest::Credentials {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;
        Ok(self.verify(&ticket.identifier, &ticket.secret).await?)
    }

    /// Demo shortcut: logs in without a secret.
    pub async fn auto_verify(&self, email: &str) -> Result<User, AuthError> {
        tokio::time::sleep(self.config.verify_latency()).await;
        if !Self::is_valid_email(email) {
            return Err(LoginRejection::InvalidEmail.into());
        }

        let mut inner = self.inner.lock().await;
        inner.secrets.remove(email);
        let user = inner
            .users
            .entry(email.to_string())
            .or_insert_with(|| User::new(email))
            .clone();

        self.persist_session(&user)
            .await
            .map_err(VerificationError::from)?;
        let state = std::mem::take(&mut inner.state);
        inner.state = state.verified(user.clone());
        tracing::info!("[Auth] {} auto-verified as {}", user.email, user.role);
        Ok(user)
    }

    async fn persist_session(&self, user: &User) -> Result<(), CopyCoderError> {
        let json = serde_json::to_string(user)?;
        self.session.set(AUTH_USER_KEY, json).await?;
        self.session
            .set(
                AUTH_TOKEN_KEY,
                format!("{}{}", SESSION_TOKEN_PREFIX, Uuid::new_v4()),
            )
            .await?;
        Ok(())
    }

    /// Clears the session. Safe to call when nobody is logged in.
    pub async fn logout(&self) -> Result<(), CopyCoderError> {
        let mut inner = self.inner.lock().await;
        let state = std::mem::take(&mut inner.state);
        inner.state = state.logged_out();
        self.session.remove(AUTH_USER_KEY).await?;
        self.session.remove(AUTH_TOKEN_KEY).await?;
        tracing::info!("[Auth] Logged out");
        Ok(())
    }

    /// The logged-in user: memory first, then session storage.
    pub async fn current_user(&self) -> Option<User> {
        let mut inner = self.inner.lock().await;
        if let Some(user) = inner.state.user() {
            return Some(user.clone());
        }

        let raw = match self.session.get(AUTH_USER_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("[Auth] Failed to read session storage: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(user) => {
                inner.state = SessionState::Anonymous.verified(user.clone());
                Some(user)
            }
            Err(e) => {
                tracing::error!("[Auth] Failed to parse user from session storage: {}", e);
                None
            }
        }
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;

    struct Fixture {
        clock: Arc<ManualClock>,
        session: Arc<MemoryStore>,
        service: AuthService,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::default());
        let session = Arc::new(MemoryStore::new());
        let service = AuthService::with_seed(clock.clone(), session.clone(), AuthConfig::default(), 3);
        Fixture {
            clock,
            session,
            service,
        }
    }

    fn link(email: &str) -> LoginRequest {
        LoginRequest::EmailLink {
            email: email.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_link_login_assigns_roles() {
        let f = fixture();

        let ticket = f.service.request_login(link("admin@example.com")).await.unwrap();
        assert!(Uuid::parse_str(&ticket.secret).is_ok());
        let admin = f.service.verify("admin@example.com", &ticket.secret).await.unwrap();
        assert_eq!(admin.role, Role::Admin);

        let ticket = f.service.request_login(link("alice@example.com")).await.unwrap();
        let alice = f.service.verify("alice@example.com", &ticket.secret).await.unwrap();
        assert_eq!(alice.role, Role::User);

        assert_eq!(f.service.current_user().await, Some(alice));
        let token = f.session.get(AUTH_TOKEN_KEY).await.unwrap().unwrap();
        assert!(token.starts_with("email-login-token-"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_email_stays_anonymous() {
        let f = fixture();
        let err = f.service.request_login(link("not-an-email")).await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid email address");
        assert_eq!(f.service.state().await, SessionState::Anonymous);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_token_is_purged() {
        let f = fixture();
        let ticket = f.service.request_login(link("alice@example.com")).await.unwrap();

        f.clock.advance(chrono::Duration::minutes(16));
        let err = f
            .service
            .verify("alice@example.com", &ticket.secret)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Verification link has expired");

        let err = f
            .service
            .verify("alice@example.com", &ticket.secret)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid verification link");
        assert!(f.service.current_user().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_valid_until_exact_expiry() {
        let f = fixture();
        let ticket = f.service.request_login(link("alice@example.com")).await.unwrap();
        f.clock.advance(chrono::Duration::minutes(15));
        assert!(f.service.verify("alice@example.com", &ticket.secret).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_code_keeps_secret_for_retry() {
        let f = fixture();
        let ticket = f
            .service
            .request_login(LoginRequest::EmailCode {
                email: "bob@example.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(ticket.secret.len(), 6);

        let err = f.service.verify("bob@example.com", "000000x").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid verification code");
        assert_eq!(
            f.service.state().await.pending_method("bob@example.com"),
            Some(LoginMethod::EmailCode)
        );

        let user = f.service.verify("bob@example.com", &ticket.secret).await.unwrap();
        assert_eq!(user.email, "bob@example.com");

        // Consumed on success; the wording still follows the issued method.
        let err = f
            .service
            .verify("bob@example.com", &ticket.secret)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid verification code");
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_link_token_purges_secret() {
        let f = fixture();
        let ticket = f.service.request_login(link("alice@example.com")).await.unwrap();

        let err = f.service.verify("alice@example.com", "bogus").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid verification link");
        assert_eq!(f.service.state().await, SessionState::Anonymous);

        let err = f
            .service
            .verify("alice@example.com", &ticket.secret)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid verification link");
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_code_is_purged() {
        let f = fixture();
        let ticket = f
            .service
            .request_login(LoginRequest::EmailCode {
                email: "bob@example.com".to_string(),
            })
            .await
            .unwrap();

        f.clock.advance(chrono::Duration::minutes(16));
        let err = f.service.verify("bob@example.com", &ticket.secret).await.unwrap_err();
        assert!(matches!(err, VerificationError::Expired));
        let err = f.service.verify("bob@example.com", &ticket.secret).await.unwrap_err();
        assert!(matches!(err, VerificationError::InvalidCode));
    }

    #[tokio::test(start_paused = true)]
    async fn test_credentials_login() {
        let f = fixture();
        let err = f.service.login_with_credentials("", "secret1").await.unwrap_err();
        assert_eq!(err.to_string(), "Username is required");
        let err = f.service.login_with_credentials("rowdy", "12345").await.unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters");

        let user = f.service.login_with_credentials("rowdy", "123456").await.unwrap();
        assert_eq!(user.email, "rowdy");
        assert!(user.is_admin());
        assert!(f.service.state().await.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_verify_and_logout() {
        let f = fixture();
        let user = f.service.auto_verify("alice@example.com").await.unwrap();
        assert_eq!(user.role, Role::User);

        f.service.logout().await.unwrap();
        f.service.logout().await.unwrap();
        assert!(f.service.current_user().await.is_none());
        assert!(f.session.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_user_restored_from_session_storage() {
        let f = fixture();
        let stored = User::new("carol@example.com");
        f.session
            .set(AUTH_USER_KEY, serde_json::to_string(&stored).unwrap())
            .await
            .unwrap();
        assert_eq!(f.service.current_user().await, Some(stored));

        let g = fixture();
        g.session.set(AUTH_USER_KEY, "{not json".to_string()).await.unwrap();
        assert!(g.service.current_user().await.is_none());
    }
}
