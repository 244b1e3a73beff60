//! Mock authentication.
//!
//! # Module Structure
//!
//! - `model`: `User`, `Role`, `LoginMethod`, `LoginRequest`
//! - `state`: the `SessionState` machine
//! - `service`: `AuthService`, which issues and checks one-time secrets
//! - `mailer`: delivery seam for login links and codes

mod mailer;
mod model;
mod service;
mod state;

pub use mailer::{LoggingMailer, LoginMailer};
pub use model::{LoginMethod, LoginRequest, Role, User};
pub use service::{AuthError, AuthService, LoginRejection, LoginTicket, VerificationError};
pub use state::SessionState;
