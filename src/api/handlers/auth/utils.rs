//! Small helpers for auth validation and link building.

use regex::Regex;

/// Normalize an email for lookup/uniqueness checks.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Build the frontend reset link included in outbound emails.
pub(super) fn build_reset_url(frontend_base_url: &str, secret: &str) -> String {
    let base = frontend_base_url.trim_end_matches('/');
    format!("{base}/reset-password/{secret}")
}

pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn build_reset_url_trims_trailing_slash() {
        let url = build_reset_url("http://localhost:5173/", "abc123");
        assert_eq!(url, "http://localhost:5173/reset-password/abc123");
    }

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }
}
