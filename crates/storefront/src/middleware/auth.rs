//! Authentication extractors and session helpers.
//!
//! A customer is "signed in" when the session holds a [`CurrentCustomer`],
//! i.e. an API token obtained from sign-in.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{Method, StatusCode, Uri, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::{info, warn};

use crate::api::token;
use crate::models::{CurrentCustomer, session_keys};

/// Extractor that requires a signed-in customer.
///
/// Guests are redirected to the login page, which brings them back afterwards.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(RequireAuth(customer): RequireAuth) -> impl IntoResponse {
///     format!("Orders for {}", customer.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentCustomer);

/// Rejection when a signed-in customer is required.
pub enum AuthRejection {
    /// Redirect to login, returning to `path` afterwards.
    RedirectToLogin(String),
    /// The session layer is missing.
    NoSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(path) => Redirect::to(&login_url(&path)).into_response(),
            Self::NoSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Login page URL that returns to `path`.
#[must_use]
pub fn login_url(path: &str) -> String {
    let mut url = String::from("/auth/login");
    if is_local_path(path) && path != "/" {
        url.push_str("?return_to=");
        url.extend(url::form_urlencoded::byte_serialize(path.as_bytes()));
    }
    url
}

/// Whether `path` is safe to redirect to: a local absolute path.
///
/// Rejects `//host` and `/\host`, which browsers treat as other origins.
#[must_use]
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.starts_with("/\\")
        && !path.chars().any(char::is_control)
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::NoSession)?;

        current_customer(session)
            .await
            .map(Self)
            .ok_or_else(|| AuthRejection::RedirectToLogin(return_path(parts)))
    }
}

/// Where to come back to after signing in.
///
/// Form posts cannot be replayed by a redirect, so they return to the page
/// the form lives on.
fn return_path(parts: &Parts) -> String {
    if parts.method == Method::GET {
        return request_path(parts);
    }
    let path = original_uri(parts).path();
    path.rsplit_once('/')
        .map(|(parent, _)| parent)
        .filter(|parent| !parent.is_empty())
        .unwrap_or("/")
        .to_string()
}

/// The URI as the client sent it.
///
/// Routers nested under a prefix see `parts.uri` with the prefix stripped.
fn original_uri(parts: &Parts) -> &Uri {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |OriginalUri(uri)| uri)
}

/// Path and query of the current request, for redirect-back forms.
#[must_use]
pub fn request_path(parts: &Parts) -> String {
    original_uri(parts)
        .path_and_query()
        .map_or_else(|| "/".to_string(), ToString::to_string)
}

/// Load the signed-in customer.
///
/// A customer whose token has expired is signed out and treated as a guest;
/// the API would reject the token anyway.
pub async fn current_customer(session: &Session) -> Option<CurrentCustomer> {
    let customer = session
        .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await
        .ok()
        .flatten()?;

    if token_expired(&customer.token, Utc::now().timestamp()) {
        info!(user_id = %customer.user_id, "Customer token expired, signing out");
        if let Err(e) = clear_current_customer(session).await {
            warn!(error = %e, "Failed to clear expired customer");
        }
        return None;
    }
    Some(customer)
}

/// Unreadable tokens count as live; sign-in already decoded them once.
fn token_expired(token: &str, now: i64) -> bool {
    token::claims(token).is_ok_and(|claims| claims.is_expired_at(now))
}

/// Extractor that optionally gets the signed-in customer.
pub struct OptionalAuth(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => current_customer(session).await,
            None => None,
        };

        Ok(Self(customer))
    }
}

/// Store the signed-in customer.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}

/// Sign out: drop the customer and everything cached for them.
///
/// Guest cart and wishlist blobs are left alone.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    for key in [
        session_keys::CURRENT_CUSTOMER,
        session_keys::CART_COUNT,
        session_keys::WISHLIST_COUNT,
        session_keys::WISHLIST_IDS,
    ] {
        session.remove_value(key).await?;
    }
    Ok(())
}
