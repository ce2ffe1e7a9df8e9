use crate::{
    ApiApplication,
    access::supplier,
    auction_routes::AuctionPath,
    error::ApiError,
    live::{LiveChannel, LiveState},
};

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use ras_core::{
    models::{BidFailure, BidLine, BidRecord, BidSubmission, Projection, SubmissionId},
    ports::{Application, AuctionRepository as _, BidRepository as _},
};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{Level, event};

/// Submit a complete bid.
///
/// Once the store has accepted the submission the request succeeds. If the
/// ranking cannot be read back afterwards the response carries no projection
/// and live subscribers catch up on the next update.
///
/// # Returns
///
/// - `200 OK`: The accepted rows and the caller's new standing
/// - `401 Unauthorized`: No supplier identity
/// - `403 Forbidden`: The supplier is not invited
/// - `409 Conflict`: The auction is not open, or a sealed bid already exists
/// - `422 Unprocessable Entity`: The bid is incomplete or an amount is invalid
/// - `503 Service Unavailable`: The store failed or timed out; nothing was appended
pub(crate) async fn submit_bid<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(AuctionPath { auction_id }): Path<AuctionPath>,
    Extension(live): Extension<Arc<LiveChannel>>,
    Json(body): Json<SubmitBidDto>,
) -> Result<Json<SubmitBidResponse>, ApiError> {
    let identity = supplier(&app, &auth).await?;
    let db = app.database();

    // A missing auction is reported the same way as a closed one
    let mut auction = db
        .get_auction(auction_id)
        .await
        .map_err(ApiError::transient)?
        .ok_or(BidFailure::AuctionNotOpen)?;

    let submission = BidSubmission {
        auction_id,
        supplier_id: identity.supplier_id,
        supplier_name: identity.display_name,
        placed_by: identity.user_id,
        currency: body.currency.unwrap_or_else(|| auction.currency.clone()),
        lines: body.lines,
        metadata: body.metadata,
    };
    let submission_id = app.generate_submission_id(&submission);

    let receipt = db
        .submit_bid(submission_id, submission, app.now())
        .await
        .map_err(ApiError::transient)??;

    // The bid is committed; nothing below may turn this into a failure
    auction.end_at = receipt.end_at;
    let projection = match db.get_ranking(auction_id).await {
        Ok(snapshot) => {
            let projection = Projection::project(
                auction.visibility,
                auction.phase(app.now()),
                &snapshot,
                identity.supplier_id,
            );
            if let Ok(Some(current)) = db.get_auction(auction_id).await {
                auction = current;
            }
            live.publish(LiveState { auction, snapshot });
            Some(projection)
        }
        Err(err) => {
            event!(
                Level::WARN,
                %auction_id,
                err = err.to_string(),
                "accepted bid without a projection"
            );
            None
        }
    };

    Ok(Json(SubmitBidResponse {
        accepted: true,
        submission_id: receipt.submission_id,
        bids: receipt.bids,
        end_at: receipt.end_at,
        extended: receipt.extended,
        projection,
    }))
}

/// Request body for a bid submission.
#[derive(schemars::JsonSchema, serde::Deserialize)]
#[schemars(inline)]
pub(crate) struct SubmitBidDto {
    /// The currency of the amounts; defaults to the auction's currency
    #[serde(default)]
    currency: Option<String>,
    /// One line per auction item
    lines: Vec<BidLine>,
    /// Free-form data stored with every row of the submission
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

/// The result of an accepted submission.
#[derive(schemars::JsonSchema, serde::Serialize)]
pub(crate) struct SubmitBidResponse {
    /// Always true; rejections are reported as errors
    accepted: bool,
    /// The identifier shared by the appended rows
    submission_id: SubmissionId,
    /// The appended rows, one per item
    bids: Vec<BidRecord>,
    /// When bidding closes, after any auto-extension
    #[serde(with = "time::serde::rfc3339::option")]
    #[schemars(with = "Option<String>")]
    end_at: Option<OffsetDateTime>,
    /// Whether this submission extended the auction
    extended: bool,
    /// The caller's view of the ranking after the submission, when it could be read
    #[serde(skip_serializing_if = "Option::is_none")]
    projection: Option<Projection>,
}
