//! Session state machine.
//!
//! ```text
//! Anonymous --request--> PendingVerification --verified--> Authenticated
//!     ^                        |                                |
//!     +------- rejected -------+------------ logged_out --------+
//! ```

use super::model::{LoginMethod, User};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    PendingVerification {
        identifier: String,
        method: LoginMethod,
    },
    Authenticated {
        user: User,
    },
}

impl SessionState {
    /// A login was requested and a secret issued.
    pub fn requested(self, identifier: impl Into<String>, method: LoginMethod) -> Self {
        Self::PendingVerification {
            identifier: identifier.into(),
            method,
        }
    }

    /// Verification succeeded.
    pub fn verified(self, user: User) -> Self {
        Self::Authenticated { user }
    }

    /// A verification attempt failed. A pending login is abandoned; an
    /// existing session is kept.
    pub fn rejected(self) -> Self {
        match self {
            Self::PendingVerification { .. } => Self::Anonymous,
            other => other,
        }
    }

    pub fn logged_out(self) -> Self {
        Self::Anonymous
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated { user } => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Method of the pending login for `identifier`, if any.
    pub fn pending_method(&self, identifier: &str) -> Option<LoginMethod> {
        match self {
            Self::PendingVerification {
                identifier: pending,
                method,
            } if pending == identifier => Some(*method),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let state = SessionState::default().requested("a@b.co", LoginMethod::EmailLink);
        assert_eq!(state.pending_method("a@b.co"), Some(LoginMethod::EmailLink));
        assert_eq!(state.pending_method("x@b.co"), None);

        let user = User::new("a@b.co");
        let state = state.verified(user.clone());
        assert_eq!(state.user(), Some(&user));
        assert_eq!(state.logged_out(), SessionState::Anonymous);
    }

    #[test]
    fn test_rejection_keeps_existing_session() {
        let user = User::new("a@b.co");
        let authenticated = SessionState::Authenticated { user };
        assert!(authenticated.clone().rejected().is_authenticated());

        let pending = SessionState::Anonymous.requested("a@b.co", LoginMethod::EmailCode);
        assert_eq!(pending.rejected(), SessionState::Anonymous);
    }
}
