use super::AuctionPath;
use crate::{
    ApiApplication,
    access::manager,
    error::ApiError,
    live::{LiveChannel, publish_current},
};

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use ras_core::{
    models::AuctionRecord,
    ports::{Application, AuctionRepository as _},
};
use std::sync::Arc;

/// Publish a draft auction, locking it against further edits.
///
/// # Returns
///
/// - `200 OK`: The published auction
/// - `401 Unauthorized`: Missing management rights
/// - `404 Not Found`: The auction does not exist
/// - `409 Conflict`: The auction is already published or archived
/// - `422 Unprocessable Entity`: A publish precondition failed
pub(crate) async fn publish_auction<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(AuctionPath { auction_id }): Path<AuctionPath>,
    Extension(live): Extension<Arc<LiveChannel>>,
) -> Result<Json<AuctionRecord>, ApiError> {
    manager(&app, &auth).await?;
    let auction = app
        .database()
        .publish_auction(auction_id, app.now())
        .await
        .map_err(ApiError::transient)??;

    publish_current(&app, &live, auction.clone()).await;
    Ok(Json(auction))
}

/// Archive an auction. Bids are kept.
///
/// # Returns
///
/// - `200 OK`: The archived auction
/// - `401 Unauthorized`: Missing management rights
/// - `404 Not Found`: The auction does not exist
/// - `409 Conflict`: The auction is already archived
pub(crate) async fn archive_auction<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(AuctionPath { auction_id }): Path<AuctionPath>,
    Extension(live): Extension<Arc<LiveChannel>>,
) -> Result<Json<AuctionRecord>, ApiError> {
    manager(&app, &auth).await?;
    let auction = app
        .database()
        .archive_auction(auction_id, app.now())
        .await
        .map_err(ApiError::transient)??;

    publish_current(&app, &live, auction.clone()).await;
    Ok(Json(auction))
}
