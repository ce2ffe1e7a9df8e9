use super::AuctionPath;
use crate::{
    ApiApplication,
    access::{manager, participation},
    error::ApiError,
};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use ras_core::{
    models::{
        AuctionData, AuctionItem, AuctionRecord, AuctionVisibilityEntry, ItemData, SupplierId,
    },
    ports::{Application, AuctionRepository as _},
};

pub(crate) async fn create_auction<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(body): Json<CreateAuctionDto>,
) -> Result<(StatusCode, Json<AuctionDetail>), ApiError> {
    let created_by = manager(&app, &auth).await?;
    let as_of = app.now();
    let db = app.database();

    let auction_id = app.generate_auction_id(&body.data);
    let items = body
        .items
        .into_iter()
        .map(|item| (app.generate_item_id(&item), item))
        .collect();

    let auction = db
        .create_auction(
            auction_id,
            created_by,
            body.data,
            items,
            body.suppliers,
            as_of,
        )
        .await
        .map_err(ApiError::transient)??;

    let detail = AuctionDetail::load(&app, auction, true).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Retrieve an auction and its items.
///
/// # Authorization
///
/// Managers may read any auction. Suppliers may read a published or archived
/// auction they are allowed to take part in.
///
/// # Returns
///
/// - `200 OK`: The auction
/// - `401 Unauthorized`: No usable identity
/// - `403 Forbidden`: The supplier is not invited
/// - `404 Not Found`: The auction does not exist or is a draft
/// - `503 Service Unavailable`: Database query failed
pub(crate) async fn read_auction<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(AuctionPath { auction_id }): Path<AuctionPath>,
) -> Result<Json<AuctionDetail>, ApiError> {
    if manager(&app, &auth).await.is_ok() {
        let auction = app
            .database()
            .get_auction(auction_id)
            .await
            .map_err(ApiError::transient)?
            .ok_or_else(ApiError::not_found)?;
        return Ok(Json(AuctionDetail::load(&app, auction, true).await?));
    }

    let (_, auction) = participation(&app, &auth, auction_id).await?;
    Ok(Json(AuctionDetail::load(&app, auction, false).await?))
}

/// Replace the editable fields of a draft auction.
///
/// # Returns
///
/// - `200 OK`: The updated auction
/// - `401 Unauthorized`: Missing management rights
/// - `404 Not Found`: The auction does not exist
/// - `409 Conflict`: The auction is no longer a draft
/// - `422 Unprocessable Entity`: Invalid schedule or currency
pub(crate) async fn update_auction<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(AuctionPath { auction_id }): Path<AuctionPath>,
    Json(body): Json<AuctionData>,
) -> Result<Json<AuctionRecord>, ApiError> {
    manager(&app, &auth).await?;
    let auction = app
        .database()
        .update_auction(auction_id, body, app.now())
        .await
        .map_err(ApiError::transient)??;
    Ok(Json(auction))
}

/// Request body for creating a new auction.
#[derive(schemars::JsonSchema, serde::Deserialize)]
#[schemars(inline)]
pub(crate) struct CreateAuctionDto {
    /// The auction's type, currency, schedule, visibility and configuration
    #[serde(flatten)]
    data: AuctionData,
    /// Initial items
    #[serde(default)]
    items: Vec<ItemData>,
    /// Initially invited suppliers
    #[serde(default)]
    suppliers: Vec<SupplierId>,
}

/// An auction together with its items.
#[derive(schemars::JsonSchema, serde::Serialize)]
pub(crate) struct AuctionDetail {
    #[serde(flatten)]
    auction: AuctionRecord,
    items: Vec<AuctionItem>,
    /// Only shown to managers
    #[serde(skip_serializing_if = "Option::is_none")]
    suppliers: Option<Vec<AuctionVisibilityEntry>>,
}

impl AuctionDetail {
    async fn load<T: ApiApplication>(
        app: &T,
        auction: AuctionRecord,
        with_suppliers: bool,
    ) -> Result<Self, ApiError> {
        let db = app.database();
        let items = db
            .get_auction_items(auction.id)
            .await
            .map_err(ApiError::transient)?;
        let suppliers = if with_suppliers {
            Some(
                db.get_auction_suppliers(auction.id)
                    .await
                    .map_err(ApiError::transient)?,
            )
        } else {
            None
        };
        Ok(Self {
            auction,
            items,
            suppliers,
        })
    }
}
