//! Email address validation
//!
//! Teachers and students are keyed by email, compared exactly as stored.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::schema::Problem;

/// RFC 5321 path limit
const MAX_EMAIL_LEN: usize = 254;

/// Local part of printable specials, then a dotted domain of
/// alphanumeric/hyphen labels that neither start nor end with a hyphen.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$",
    )
    .expect("invalid email regex")
});

/// Validated email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Validate an email address.
    ///
    /// # Rules
    /// - Not empty, at most 254 bytes
    /// - Exactly one `@` with a non-empty local part
    /// - Domain has at least two labels (`school.edu`)
    ///
    /// # Example
    /// ```
    /// use roster_core::Email;
    ///
    /// assert!(Email::new("teacherken@gmail.com").is_ok());
    /// assert!(Email::new("teacherken").is_err());
    /// assert!(Email::new(" teacherken@gmail.com").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, Problem> {
        if s.is_empty() {
            return Err(Problem::Empty);
        }

        if s.len() > MAX_EMAIL_LEN {
            return Err(Problem::TooLong { max: MAX_EMAIL_LEN });
        }

        if !EMAIL_RE.is_match(s) {
            return Err(Problem::InvalidFormat {
                reason: "must be a valid email address",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_addresses() {
        assert!(Email::new("studentjon@gmail.com").is_ok());
        assert!(Email::new("first.last+tag@school.edu.sg").is_ok());
        assert!(Email::new("a@b.co").is_ok());
        assert!(Email::new("o'brien@sub-domain.example.org").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(Email::new("").unwrap_err(), Problem::Empty);
    }

    #[test]
    fn rejects_missing_at_or_domain() {
        for bad in ["studentjon", "studentjon@", "@gmail.com", "studentjon@gmail"] {
            let err = Email::new(bad).unwrap_err();
            assert!(matches!(err, Problem::InvalidFormat { .. }), "{bad}");
        }
    }

    #[test]
    fn rejects_double_at_and_whitespace() {
        assert!(Email::new("a@b@c.com").is_err());
        assert!(Email::new("a b@c.com").is_err());
        assert!(Email::new("ab@c.com ").is_err());
    }

    #[test]
    fn rejects_hyphen_edged_labels() {
        assert!(Email::new("a@-school.com").is_err());
        assert!(Email::new("a@school-.com").is_err());
    }

    #[test]
    fn max_length() {
        let domain = "@school.com";
        let local_ok = "a".repeat(MAX_EMAIL_LEN - domain.len());
        assert!(Email::new(&format!("{local_ok}{domain}")).is_ok());

        let local_long = "a".repeat(MAX_EMAIL_LEN - domain.len() + 1);
        let err = Email::new(&format!("{local_long}{domain}")).unwrap_err();
        assert_eq!(err, Problem::TooLong { max: 254 });
    }

    #[test]
    fn case_is_preserved() {
        let email = Email::new("Teacher.Ken@Gmail.com").unwrap();
        assert_eq!(email.as_str(), "Teacher.Ken@Gmail.com");
        assert_ne!(email, Email::new("teacher.ken@gmail.com").unwrap());
    }
}
