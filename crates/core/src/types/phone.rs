//! Egyptian mobile phone numbers.
//!
//! The commerce API only accepts Egyptian mobile numbers for sign-up and
//! shipping addresses. Validating locally lets the forms show a useful
//! message instead of a round trip to the API.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains something other than digits, spaces and dashes.
    #[error("phone number may only contain digits")]
    InvalidCharacter,
    /// Not an 11-digit number starting with 010, 011, 012 or 015.
    #[error("phone number must be an Egyptian mobile number (e.g. 01012345678)")]
    NotEgyptianMobile,
}

/// Mobile operator prefixes.
const PREFIXES: [&str; 4] = ["010", "011", "012", "015"];

/// A normalized Egyptian mobile number (`01XXXXXXXXX`).
///
/// ```
/// use freshcart_core::Phone;
///
/// let phone = Phone::parse("+20 101-234-5678").unwrap();
/// assert_eq!(phone.as_str(), "01012345678");
/// assert!(Phone::parse("01312345678").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse and normalize a phone number.
    ///
    /// Spaces and dashes are ignored; a `+20` or `0020` country prefix is
    /// replaced by the national leading `0`.
    ///
    /// # Errors
    ///
    /// Returns a [`PhoneError`] if the number is not an Egyptian mobile.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if compact.is_empty() {
            return Err(PhoneError::Empty);
        }

        let national = if let Some(rest) = compact.strip_prefix("+20") {
            format!("0{rest}")
        } else if let Some(rest) = compact.strip_prefix("0020") {
            format!("0{rest}")
        } else {
            compact
        };

        if !national.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::InvalidCharacter);
        }
        if national.len() != 11 || !PREFIXES.iter().any(|p| national.starts_with(p)) {
            return Err(PhoneError::NotEgyptianMobile);
        }

        Ok(Self(national))
    }

    /// Returns the normalized number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper, returning the normalized number.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_each_operator_prefix() {
        for number in ["01012345678", "01112345678", "01212345678", "01512345678"] {
            assert_eq!(Phone::parse(number).map(|p| p.0), Ok(number.to_string()));
        }
    }

    #[test]
    fn normalizes_country_prefix() {
        assert_eq!(Phone::parse("+201012345678").map(|p| p.0), Ok("01012345678".into()));
        assert_eq!(Phone::parse("00201012345678").map(|p| p.0), Ok("01012345678".into()));
    }

    #[test]
    fn ignores_spaces_and_dashes() {
        assert_eq!(Phone::parse("010 1234-5678").map(|p| p.0), Ok("01012345678".into()));
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(Phone::parse("  "), Err(PhoneError::Empty));
    }

    #[test]
    fn rejects_letters() {
        assert_eq!(Phone::parse("0101234567a"), Err(PhoneError::InvalidCharacter));
    }

    #[test]
    fn rejects_unknown_prefix_or_length() {
        assert_eq!(Phone::parse("01312345678"), Err(PhoneError::NotEgyptianMobile));
        assert_eq!(Phone::parse("0101234567"), Err(PhoneError::NotEgyptianMobile));
        assert_eq!(Phone::parse("010123456789"), Err(PhoneError::NotEgyptianMobile));
    }
}
