//! Moving guest data into a customer's account after sign-in.

use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::api::{ApiError, CommerceClient};

use super::cart::CartService;
use super::guest::{GuestCart, GuestCartLine, GuestWishlist, MAX_LINE_COUNT};
use super::wishlist::WishlistService;

/// Outcome of a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub cart_merged: usize,
    pub cart_failed: usize,
    pub wishlist_merged: usize,
    pub wishlist_failed: usize,
}

impl MergeReport {
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.cart_failed > 0 || self.wishlist_failed > 0
    }
}

/// Push the guest cart and wishlist to the customer's account.
///
/// Guest lines are added to the remote cart; when the remote cart already
/// holds the product the counts are summed. Lines and wishlist entries that
/// fail stay in the guest blobs so nothing is lost; merged ones are removed.
/// Both badge counters are refreshed from the API afterwards.
#[instrument(skip_all)]
pub async fn merge_guest_into_account(
    api: &CommerceClient,
    session: &Session,
    token: &str,
) -> MergeReport {
    let mut report = MergeReport::default();

    let cart = GuestCart::load(session).await;
    if !cart.is_empty() {
        let mut remaining = GuestCart::default();
        for line in cart.lines() {
            match merge_line(api, token, line).await {
                Ok(()) => report.cart_merged += 1,
                Err(Unmerged { error, left }) => {
                    warn!(
                        error = %error,
                        product_id = %line.product,
                        left,
                        "Failed to merge guest cart line"
                    );
                    report.cart_failed += 1;
                    remaining.add(line.product.clone(), left);
                }
            }
        }
        if let Err(e) = remaining.save(session).await {
            warn!(error = %e, "Failed to save guest cart after merge");
        }
    }

    let wishlist = GuestWishlist::load(session).await;
    if !wishlist.is_empty() {
        let mut remaining = GuestWishlist::default();
        for id in wishlist.ids() {
            match api.add_to_wishlist(token, id).await {
                Ok(_) => report.wishlist_merged += 1,
                Err(e) => {
                    warn!(error = %e, product_id = %id, "Failed to merge guest wishlist entry");
                    report.wishlist_failed += 1;
                    remaining.add(id.clone());
                }
            }
        }
        if let Err(e) = remaining.save(session).await {
            warn!(error = %e, "Failed to save guest wishlist after merge");
        }
    }

    CartService::new(api, session).refresh_badge(token).await;
    WishlistService::new(api, session).refresh(token).await;

    if report != MergeReport::default() {
        info!(?report, "Merged guest data into account");
    }
    report
}

/// A guest line the remote cart did not fully take.
struct Unmerged {
    error: ApiError,
    /// Units still owed to the remote cart.
    left: u32,
}

/// Add one guest line to the remote cart, summing with an existing line.
async fn merge_line(
    api: &CommerceClient,
    token: &str,
    line: &GuestCartLine,
) -> Result<(), Unmerged> {
    let response = api
        .add_to_cart(token, &line.product)
        .await
        .map_err(|error| Unmerged {
            error,
            left: line.count,
        })?;
    if line.count <= 1 {
        return Ok(());
    }
    // The add above counted one unit already.
    let left = line.count - 1;
    let target = response
        .data
        .count_of(&line.product)
        .saturating_add(left)
        .min(MAX_LINE_COUNT);
    api.update_cart_item(token, &line.product, target)
        .await
        .map_err(|error| Unmerged { error, left })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_failures() {
        assert!(!MergeReport::default().has_failures());
        assert!(
            MergeReport {
                wishlist_failed: 1,
                ..MergeReport::default()
            }
            .has_failures()
        );
    }
}
