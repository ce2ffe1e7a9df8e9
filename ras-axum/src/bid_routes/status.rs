use crate::{
    ApiApplication, access::participation, auction_routes::AuctionPath, config::AxumConfig,
    error::ApiError,
};

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use ras_core::{
    models::{BidRecord, BidStatus, DateTimeRangeQuery, DateTimeRangeResponse, RankingSnapshot},
    ports::{Application, BidRepository as _},
};
use std::sync::Arc;

/// The caller's own bidding state for an auction.
///
/// Rendered on page load and after reconnecting to the live channel, so it
/// carries everything the bidding room needs: the caller's latest amount per
/// item, whether they can submit, and their projected view of the ranking.
pub(crate) async fn bid_status<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(AuctionPath { auction_id }): Path<AuctionPath>,
) -> Result<Json<BidStatus>, ApiError> {
    let (identity, auction) = participation(&app, &auth, auction_id).await?;
    let db = app.database();

    let ledger = db.get_ledger(auction_id).await.map_err(ApiError::transient)?;
    let names = db
        .get_supplier_names(auction_id)
        .await
        .map_err(ApiError::transient)?;
    let snapshot = RankingSnapshot::compute(&ledger, &names);

    Ok(Json(BidStatus::build(
        &auction,
        &ledger,
        &snapshot,
        identity.supplier_id,
        app.now(),
    )))
}

/// Retrieve the caller's own bids on an auction, newest first.
///
/// Rows of a single submission are never split across pages.
///
/// # Returns
///
/// - `200 OK`: Paginated bid rows
/// - `401 Unauthorized`: No supplier identity
/// - `403 Forbidden`: The supplier is not invited
/// - `404 Not Found`: The auction does not exist
pub(crate) async fn bid_history<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(AuctionPath { auction_id }): Path<AuctionPath>,
    Extension(config): Extension<Arc<AxumConfig>>,
    Query(query): Query<DateTimeRangeQuery>,
) -> Result<Json<DateTimeRangeResponse<BidRecord>>, ApiError> {
    let (identity, _) = participation(&app, &auth, auction_id).await?;

    let history = app
        .database()
        .get_bid_history(auction_id, identity.supplier_id, query, config.page_limit)
        .await
        .map_err(ApiError::transient)?;

    Ok(Json(history))
}
