//! Who may do what, resolved through the application's identity hooks.

use crate::{ApiApplication, error::ApiError};
use headers::{Authorization, authorization::Bearer};
use ras_core::{
    models::{AuctionId, AuctionRecord, AuctionStatus, SupplierIdentity, UserId},
    ports::{Application, AuctionRepository as _},
};

/// The buyer user id of a caller that may manage auctions.
pub(crate) async fn manager<T: ApiApplication>(
    app: &T,
    auth: &Authorization<Bearer>,
) -> Result<UserId, ApiError> {
    app.can_manage_auctions(auth)
        .await
        .ok_or_else(ApiError::unauthorized)
}

/// The verified supplier identity of the caller.
pub(crate) async fn supplier<T: ApiApplication>(
    app: &T,
    auth: &Authorization<Bearer>,
) -> Result<SupplierIdentity, ApiError> {
    app.supplier_identity(auth)
        .await
        .ok_or_else(ApiError::unauthorized)
}

/// The caller's supplier identity and the auction, if they may take part in it.
///
/// Drafts are invisible to suppliers. An auction linked to an invited-only
/// RFQ additionally requires a visibility entry.
pub(crate) async fn participation<T: ApiApplication>(
    app: &T,
    auth: &Authorization<Bearer>,
    auction_id: AuctionId,
) -> Result<(SupplierIdentity, AuctionRecord), ApiError> {
    let identity = supplier(app, auth).await?;
    let db = app.database();

    let auction = db
        .get_auction(auction_id)
        .await
        .map_err(ApiError::transient)?
        .filter(|auction| auction.status != AuctionStatus::Draft)
        .ok_or_else(ApiError::not_found)?;

    if auction.requires_invitation()
        && !db
            .is_supplier_invited(auction_id, identity.supplier_id)
            .await
            .map_err(ApiError::transient)?
    {
        return Err(ApiError::forbidden());
    }

    Ok((identity, auction))
}
