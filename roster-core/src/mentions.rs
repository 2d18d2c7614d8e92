//! `@mention` extraction from notification text

/// Extract mention candidates from free text.
///
/// A mention is any whitespace-delimited token starting with `@`; the
/// candidate is the token minus that `@`. No email-shape check happens here:
/// `@notanemail` yields `notanemail`, which simply fails the student lookup
/// later on.
///
/// ```
/// use roster_core::parse_mentions;
///
/// assert!(parse_mentions("hello").is_empty());
/// assert_eq!(
///     parse_mentions("hello @a@x.com @b@x.com"),
///     ["a@x.com", "b@x.com"]
/// );
/// ```
pub fn parse_mentions(text: &str) -> Vec<String> {
    if !text.contains('@') {
        return Vec::new();
    }

    text.split_whitespace()
        .filter_map(|token| token.strip_prefix('@'))
        // a lone "@" can't name anyone
        .filter(|candidate| !candidate.is_empty())
        .map(str::to_owned)
        .collect()
}
