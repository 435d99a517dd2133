//! Newtype IDs for type-safe entity references.
//!
//! The commerce API identifies every entity with a 24-character hexadecimal
//! object id. Use the `define_id!` macro to create wrappers that prevent
//! accidentally passing a brand id where a product id is expected.

use thiserror::Error;

/// Length of an API object id.
pub const OBJECT_ID_LEN: usize = 24;

/// Error returned when a string is not a valid object id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// Wrong number of characters.
    #[error("id must be {OBJECT_ID_LEN} characters (got {0})")]
    Length(usize),
    /// A character outside `[0-9a-fA-F]`.
    #[error("id must be hexadecimal")]
    NotHex,
}

/// Check that `s` looks like an API object id.
///
/// # Errors
///
/// Returns [`IdError`] if the length or alphabet is wrong.
pub fn validate_object_id(s: &str) -> Result<(), IdError> {
    if s.len() != OBJECT_ID_LEN {
        return Err(IdError::Length(s.len()));
    }
    if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(IdError::NotHex);
    }
    Ok(())
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]` (no validation:
///   ids coming back from the API are trusted)
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Display`
/// - `parse()` for untrusted input (paths, form fields)
///
/// # Example
///
/// ```rust
/// # use freshcart_core::define_id;
/// define_id!(WidgetId);
///
/// let id = WidgetId::parse("6428ebc6dc1175abc65ca0b9").unwrap();
/// assert_eq!(id.as_str(), "6428ebc6dc1175abc65ca0b9");
/// assert!(WidgetId::parse("../etc/passwd").is_err());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an id from untrusted input.
            ///
            /// # Errors
            ///
            /// Returns an error unless the input is a 24-character hex string.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::types::id::IdError> {
                let s = s.trim();
                $crate::types::id::validate_object_id(s)?;
                Ok(Self(s.to_owned()))
            }

            /// Get the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the id, returning the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(CategoryId);
define_id!(SubcategoryId);
define_id!(BrandId);
define_id!(CartId);
define_id!(OrderId);
define_id!(UserId);
