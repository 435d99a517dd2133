//! Navigation badge counters for signed-in customers.
//!
//! The remote cart and wishlist sizes are mirrored in the session so the
//! navigation can render without an API call. Mutations bump the counter
//! optimistically, then either settle it to the API's count or roll it back.

use tower_sessions::Session;
use tracing::warn;

use crate::models::session_keys;

/// Which badge a counter backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Cart,
    Wishlist,
}

impl Badge {
    const fn key(self) -> &'static str {
        match self {
            Self::Cart => session_keys::CART_COUNT,
            Self::Wishlist => session_keys::WISHLIST_COUNT,
        }
    }

    /// Current value, or `None` if never recorded this session.
    pub async fn get(self, session: &Session) -> Option<u32> {
        session.get::<u32>(self.key()).await.ok().flatten()
    }

    /// Record an authoritative value.
    pub async fn set(self, session: &Session, value: u32) {
        if let Err(e) = session.insert(self.key(), value).await {
            warn!(error = %e, badge = ?self, "Failed to store badge counter");
        }
    }

    /// Optimistically add one; returns the previous value for rollback.
    pub async fn bump(self, session: &Session) -> Option<u32> {
        let previous = self.get(session).await;
        self.set(session, previous.unwrap_or(0).saturating_add(1))
            .await;
        previous
    }

    /// Restore the value [`Badge::bump`] returned.
    pub async fn restore(self, session: &Session, previous: Option<u32>) {
        match previous {
            Some(value) => self.set(session, value).await,
            None => self.forget(session).await,
        }
    }

    /// Drop the stored value so it is refetched on next render.
    pub async fn forget(self, session: &Session) {
        if let Err(e) = session.remove_value(self.key()).await {
            warn!(error = %e, badge = ?self, "Failed to clear badge counter");
        }
    }
}

/// Convert an API or list count to a badge value.
#[must_use]
pub fn clamp_count(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
