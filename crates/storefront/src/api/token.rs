//! Reading the customer's auth token.
//!
//! The token is a JWT signed by the API. The storefront never verifies it (it
//! has no key); it only reads the payload to learn the user id the orders
//! endpoint needs. The API verifies the token on every request anyway.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use freshcart_core::UserId;

use super::ApiError;

/// Claims carried in the API's token payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Whether the token is past its expiry at `now` (unix seconds).
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now)
    }
}

/// Decode the payload of `token` without verifying the signature.
///
/// # Errors
///
/// Returns [`ApiError::MalformedToken`] if the token is not a three-part JWT
/// with a base64url JSON payload containing an `id`.
pub fn claims(token: &str) -> Result<TokenClaims, ApiError> {
    let mut parts = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ApiError::MalformedToken("expected three segments".to_string()));
    };

    // Some encoders keep the padding; URL_SAFE_NO_PAD rejects it.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ApiError::MalformedToken(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::MalformedToken(format!("payload is not valid claims: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Build an unsigned token with the given JSON payload.
    pub(crate) fn make_token(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn test_claims_reads_user_id() {
        let token = make_token(&serde_json::json!({
            "id": "64c8b1d2e7c7a3b1a1f0c0aa",
            "name": "Mona",
            "role": "user",
            "iat": 1_700_000_000,
            "exp": 1_707_776_000
        }));
        let claims = claims(&token).unwrap();
        assert_eq!(claims.id.as_str(), "64c8b1d2e7c7a3b1a1f0c0aa");
        assert_eq!(claims.name, "Mona");
        assert!(!claims.is_expired_at(1_700_000_001));
        assert!(claims.is_expired_at(1_707_776_000));
    }

    #[test]
    fn test_claims_without_exp_never_expire() {
        let token = make_token(&serde_json::json!({"id": "64c8b1d2e7c7a3b1a1f0c0aa"}));
        assert!(!claims(&token).unwrap().is_expired_at(i64::MAX));
    }

    #[test]
    fn test_malformed_tokens_are_errors() {
        for token in ["", "abc", "a.b", "a.b.c.d", "a.!!!.c"] {
            assert!(
                matches!(claims(token), Err(ApiError::MalformedToken(_))),
                "{token:?} should be rejected"
            );
        }

        let no_id = make_token(&serde_json::json!({"name": "x"}));
        assert!(matches!(claims(&no_id), Err(ApiError::MalformedToken(_))));
    }
}
