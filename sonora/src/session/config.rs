use chrono::TimeDelta;

/// Name of the cookie carrying the bearer token.
pub const SESSION_COOKIE_NAME: &str = "session";

/// How long a freshly issued or renewed session stays valid.
pub const SESSION_LIFETIME: TimeDelta = TimeDelta::days(30);

/// A session validated with less than this much time left is extended by
/// [`SESSION_LIFETIME`] from the moment of validation.
pub const SESSION_RENEWAL_WINDOW: TimeDelta = TimeDelta::days(15);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_shorter_than_lifetime() {
        assert!(SESSION_RENEWAL_WINDOW < SESSION_LIFETIME);
        assert_eq!(SESSION_LIFETIME.num_seconds(), 30 * 24 * 60 * 60);
    }
}
