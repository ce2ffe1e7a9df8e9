//! The error body shared by every endpoint.
//!
//! Domain failures from `ras-core` map onto fixed status codes. Infrastructure
//! errors are logged and reported as `503` with `"kind": "transient"`; their
//! details never reach the client.

use aide::{
    OperationOutput,
    generate::GenContext,
    openapi::{Operation, Response as ApiResponse},
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ras_core::models::{AuctionItemId, BidFailure, LifecycleFailure, PublishCheck};
use schemars::JsonSchema;
use serde::Serialize;
use std::fmt::Display;
use tracing::{Level, event};

/// The JSON body of an error response.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ErrorBody {
    /// A stable, machine-readable error name
    pub kind: &'static str,
    /// A human-readable description
    pub message: String,
    /// The publish precondition that failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<PublishCheck>,
    /// Auction items the submission left unpriced
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<AuctionItemId>,
    /// Lines for unknown or repeated items
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unexpected: Vec<AuctionItemId>,
    /// The line whose amount was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_item_id: Option<AuctionItemId>,
}

/// An error response: a status code and an [`ErrorBody`].
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                kind,
                message: message.into(),
                check: None,
                missing: Vec::new(),
                unexpected: Vec::new(),
                auction_item_id: None,
            },
        }
    }

    /// The caller presented no usable identity for this operation
    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or insufficient credentials",
        )
    }

    /// The caller is identified but may not see or act on this auction
    pub fn forbidden() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "not_authorized",
            "not authorized for this auction",
        )
    }

    /// The auction does not exist, or is not visible to the caller
    pub fn not_found() -> Self {
        LifecycleFailure::NotFound.into()
    }

    /// Log an infrastructure error and report it as transient.
    pub fn transient(err: impl Display) -> Self {
        event!(Level::ERROR, err = err.to_string());
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "transient",
            "the service is temporarily unavailable, please retry",
        )
    }

    /// The status code of the response
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The body of the response
    pub fn body(&self) -> &ErrorBody {
        &self.body
    }
}

impl From<BidFailure> for ApiError {
    fn from(failure: BidFailure) -> Self {
        let message = failure.to_string();
        match failure {
            BidFailure::AuctionNotOpen => {
                Self::new(StatusCode::CONFLICT, "auction_not_open", message)
            }
            BidFailure::IncompleteBid {
                missing,
                unexpected,
            } => {
                let mut error =
                    Self::new(StatusCode::UNPROCESSABLE_ENTITY, "incomplete_bid", message);
                error.body.missing = missing;
                error.body.unexpected = unexpected;
                error
            }
            BidFailure::InvalidAmount {
                auction_item_id, ..
            } => {
                let mut error =
                    Self::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_amount", message);
                error.body.auction_item_id = auction_item_id;
                error
            }
            BidFailure::SealedBidAlreadySubmitted => Self::new(
                StatusCode::CONFLICT,
                "sealed_bid_already_submitted",
                message,
            ),
            BidFailure::NotAuthorized => {
                Self::new(StatusCode::FORBIDDEN, "not_authorized", message)
            }
        }
    }
}

impl From<LifecycleFailure> for ApiError {
    fn from(failure: LifecycleFailure) -> Self {
        let message = failure.to_string();
        match failure {
            LifecycleFailure::NotFound => Self::new(StatusCode::NOT_FOUND, "not_found", message),
            LifecycleFailure::ItemNotFound => {
                Self::new(StatusCode::NOT_FOUND, "item_not_found", message)
            }
            LifecycleFailure::AuctionLocked => {
                Self::new(StatusCode::CONFLICT, "auction_locked", message)
            }
            LifecycleFailure::PublishPreconditionFailed(check) => {
                let mut error = Self::new(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "publish_precondition_failed",
                    message,
                );
                error.body.check = Some(check);
                error
            }
            LifecycleFailure::InvalidSchedule => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_schedule", message)
            }
            LifecycleFailure::InvalidCurrency => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_currency", message)
            }
            LifecycleFailure::InvalidItem => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_item", message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl OperationOutput for ApiError {
    type Inner = ErrorBody;

    fn operation_response(ctx: &mut GenContext, operation: &mut Operation) -> Option<ApiResponse> {
        Json::<ErrorBody>::operation_response(ctx, operation)
    }
}
