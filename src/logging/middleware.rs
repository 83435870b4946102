//! Request correlation IDs

use uuid::Uuid;

/// Generate a new request ID using UUID v4
///
/// Attached to the span of every `/judge` request so all attempts and
/// retries of one submission can be correlated.
///
/// # Examples
///
/// ```
/// use emoji_judge::logging::generate_request_id;
///
/// let request_id = generate_request_id();
/// assert!(!request_id.is_empty());
/// ```
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
