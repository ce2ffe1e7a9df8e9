use crate::{ApiApplication, access::manager, auction_routes::AuctionPath, error::ApiError};

use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use ras_core::{
    models::{BidRecord, RankingSnapshot},
    ports::{Application, AuctionRepository as _, BidRepository as _},
};

/// The unfiltered ranking, with every supplier's per-item prices.
///
/// # Authorization
///
/// Requires auction management rights.
pub(crate) async fn read_ranking<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(AuctionPath { auction_id }): Path<AuctionPath>,
) -> Result<Json<RankingSnapshot>, ApiError> {
    manager(&app, &auth).await?;
    let db = app.database();
    db.get_auction(auction_id)
        .await
        .map_err(ApiError::transient)?
        .ok_or_else(ApiError::not_found)?;

    let snapshot = db
        .get_ranking(auction_id)
        .await
        .map_err(ApiError::transient)?;
    Ok(Json(snapshot))
}

/// Every ledger row of an auction, in append order.
///
/// # Authorization
///
/// Requires auction management rights.
pub(crate) async fn read_ledger<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(AuctionPath { auction_id }): Path<AuctionPath>,
) -> Result<Json<Vec<BidRecord>>, ApiError> {
    manager(&app, &auth).await?;
    let db = app.database();
    db.get_auction(auction_id)
        .await
        .map_err(ApiError::transient)?
        .ok_or_else(ApiError::not_found)?;

    let ledger = db.get_ledger(auction_id).await.map_err(ApiError::transient)?;
    Ok(Json(ledger))
}
