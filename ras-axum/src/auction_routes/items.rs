use super::{AuctionPath, ItemPath};
use crate::{ApiApplication, access::manager, error::ApiError};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use ras_core::{
    models::{AuctionItem, ItemData},
    ports::{Application, AuctionRepository as _},
};

pub(crate) async fn add_item<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(AuctionPath { auction_id }): Path<AuctionPath>,
    Json(body): Json<ItemData>,
) -> Result<(StatusCode, Json<AuctionItem>), ApiError> {
    manager(&app, &auth).await?;
    let item_id = app.generate_item_id(&body);
    let item = app
        .database()
        .add_item(auction_id, item_id, body, app.now())
        .await
        .map_err(ApiError::transient)??;
    Ok((StatusCode::CREATED, Json(item)))
}

pub(crate) async fn update_item<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(ItemPath {
        auction_id,
        item_id,
    }): Path<ItemPath>,
    Json(body): Json<ItemData>,
) -> Result<Json<AuctionItem>, ApiError> {
    manager(&app, &auth).await?;
    let item = app
        .database()
        .update_item(auction_id, item_id, body, app.now())
        .await
        .map_err(ApiError::transient)??;
    Ok(Json(item))
}

pub(crate) async fn remove_item<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(ItemPath {
        auction_id,
        item_id,
    }): Path<ItemPath>,
) -> Result<StatusCode, ApiError> {
    manager(&app, &auth).await?;
    app.database()
        .remove_item(auction_id, item_id, app.now())
        .await
        .map_err(ApiError::transient)??;
    Ok(StatusCode::NO_CONTENT)
}
