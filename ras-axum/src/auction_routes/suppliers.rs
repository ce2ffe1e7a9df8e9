use super::SupplierPath;
use crate::{ApiApplication, access::manager, error::ApiError};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use ras_core::{
    models::AuctionVisibilityEntry,
    ports::{Application, AuctionRepository as _},
};

/// Invite a supplier. Inviting the same supplier again keeps the original grant.
pub(crate) async fn grant_supplier<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(SupplierPath {
        auction_id,
        supplier_id,
    }): Path<SupplierPath>,
) -> Result<Json<AuctionVisibilityEntry>, ApiError> {
    manager(&app, &auth).await?;
    let entry = app
        .database()
        .grant_supplier(auction_id, supplier_id, app.now())
        .await
        .map_err(ApiError::transient)??;
    Ok(Json(entry))
}

pub(crate) async fn revoke_supplier<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(SupplierPath {
        auction_id,
        supplier_id,
    }): Path<SupplierPath>,
) -> Result<StatusCode, ApiError> {
    manager(&app, &auth).await?;
    let removed = app
        .database()
        .revoke_supplier(auction_id, supplier_id, app.now())
        .await
        .map_err(ApiError::transient)??;
    Ok(if removed {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    })
}
