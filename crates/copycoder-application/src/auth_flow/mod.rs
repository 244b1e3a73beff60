//! Login-link flow: issuing links, handling the verify endpoint, and turning
//! the resulting redirect into a landing-page message.

mod landing;
mod login_link;
mod query;

pub use landing::landing_notifications;
pub use login_link::{
    LoginFlowError, LoginLinkService, Redirect, VerifyLinkHandler, build_verification_link,
};
