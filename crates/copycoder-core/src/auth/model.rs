use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Identifiers containing `admin` or `rowdy` get the admin role.
    pub fn for_identifier(identifier: &str) -> Self {
        if identifier.contains("admin") || identifier.contains("rowdy") {
            Self::Admin
        } else {
            Self::User
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Email address, or the username for credential logins.
    pub email: String,
    pub role: Role,
}

impl User {
    pub fn new(identifier: impl Into<String>) -> Self {
        let email = identifier.into();
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::for_identifier(&email),
            email,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoginMethod {
    EmailLink,
    EmailCode,
    Credentials,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginRequest {
    EmailLink { email: String },
    EmailCode { email: String },
    Credentials { username: String, password: String },
}

impl LoginRequest {
    pub fn identifier(&self) -> &str {
        match self {
            Self::EmailLink { email } | Self::EmailCode { email } => email,
            Self::Credentials { username, .. } => username,
        }
    }

    pub fn method(&self) -> LoginMethod {
        match self {
            Self::EmailLink { .. } => LoginMethod::EmailLink,
            Self::EmailCode { .. } => LoginMethod::EmailCode,
            Self::Credentials { .. } => LoginMethod::Credentials,
        }
    }
}
