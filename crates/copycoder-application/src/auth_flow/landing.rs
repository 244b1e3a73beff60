//! Messages shown when the browser lands back on `/` after verification.

use crate::notification::Notification;

use super::query::{get, parse_query, query_of};

/// Notifications for a landing URL such as `/?login=success` or
/// `/?error=Verification%20link%20has%20expired`.
pub fn landing_notifications(url: &str) -> Vec<Notification> {
    let pairs = parse_query(query_of(url));
    let mut notifications = Vec::new();

    if let Some(error) = get(&pairs, "error") {
        notifications.push(Notification::destructive("Authentication Error", error));
    }
    if get(&pairs, "login") == Some("success") {
        notifications.push(Notification::info(
            "Login Successful",
            "You have been logged in successfully.",
        ));
    }
    notifications
}
