//! REST API endpoints for bidding.
//!
//! Suppliers submit complete bids, read their own standing and history, and
//! follow the ranking live. What they see of other suppliers is always
//! filtered through the auction's visibility mode. Managers get the
//! unfiltered ranking and the full ledger.

use crate::{ApiApplication, error::ApiError, live::live_stream, openapi::BEARER};
use aide::{
    axum::{
        ApiRouter,
        routing::{get, get_with},
    },
    transform::TransformOperation,
};

mod audit;
use audit::*;

mod status;
use status::*;

mod submit;
use submit::*;

/// Creates a router with bidding endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new()
        .api_route_with(
            "/{auction_id}/bids",
            get_with(bid_status::<T>, bid_status_docs).post_with(submit_bid::<T>, submit_bid_docs),
            |route| route.security_requirement(BEARER).tag("bid"),
        )
        .api_route_with(
            "/{auction_id}/bids/history",
            get(bid_history::<T>),
            |route| route.security_requirement(BEARER).tag("bid").tag("history"),
        )
        .api_route_with(
            "/{auction_id}/ranking",
            get(read_ranking::<T>),
            |route| route.security_requirement(BEARER).tag("bid").tag("manager"),
        )
        .api_route_with(
            "/{auction_id}/ledger",
            get(read_ledger::<T>),
            |route| {
                route
                    .security_requirement(BEARER)
                    .tag("bid")
                    .tag("history")
                    .tag("manager")
            },
        )
        // Server-sent events are not described by the OpenAPI document
        .route(
            "/{auction_id}/live",
            axum::routing::get(live_stream::<T>),
        )
}

fn submit_bid_docs(op: TransformOperation) -> TransformOperation<'_> {
    op.summary("Submit Bid")
        .description(
            r#"
            Submit a price for every item of a live auction. Amounts may be
            JSON numbers or strings. Each accepted submission appends one
            ledger row per item; earlier rows are never changed. A bid close to
            the end of a standard reverse auction with auto-extension enabled
            moves the end.

            Requires a supplier identity.
            "#,
        )
        .response_with::<401, ApiError, _>(|res| res.description("No supplier identity"))
        .response_with::<403, ApiError, _>(|res| res.description("Supplier is not invited"))
        .response_with::<409, ApiError, _>(|res| {
            res.description("Auction is not open, or a sealed bid was already submitted")
        })
        .response_with::<422, ApiError, _>(|res| {
            res.description("Bid does not price every item once, or an amount is invalid")
        })
        .response_with::<503, ApiError, _>(|res| res.description("Submission could not complete"))
}

fn bid_status_docs(op: TransformOperation) -> TransformOperation<'_> {
    op.summary("Bid Status")
        .description(
            r#"
            The caller's latest price per item, whether they can currently
            submit, and their view of the ranking. Only `open_lowest` auctions
            include the leaderboard.

            Requires a supplier identity.
            "#,
        )
        .response_with::<401, ApiError, _>(|res| res.description("No supplier identity"))
        .response_with::<403, ApiError, _>(|res| res.description("Supplier is not invited"))
        .response_with::<404, ApiError, _>(|res| res.description("Auction does not exist"))
}
