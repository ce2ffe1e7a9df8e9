//! REST API endpoints for the auction lifecycle.
//!
//! Auctions are created as drafts, edited freely while they remain drafts,
//! then published (which locks them) and eventually archived. Everything here
//! except reading an auction requires auction management rights.

use crate::{ApiApplication, error::ApiError, openapi::BEARER};
use aide::{
    axum::{
        ApiRouter,
        routing::{get_with, post_with, put_with},
    },
    transform::TransformOperation,
};
use ras_core::models::{AuctionId, AuctionItemId, SupplierId};

mod crud;
use crud::*;

mod items;
use items::*;

mod lifecycle;
use lifecycle::*;

mod suppliers;
use suppliers::*;

/// Path parameter for auction-specific endpoints.
#[derive(serde::Deserialize, schemars::JsonSchema)]
#[schemars(inline)]
pub(crate) struct AuctionPath {
    /// The unique identifier of the auction
    pub auction_id: AuctionId,
}

/// Path parameters for item-specific endpoints.
#[derive(serde::Deserialize, schemars::JsonSchema)]
#[schemars(inline)]
pub(crate) struct ItemPath {
    /// The unique identifier of the auction
    auction_id: AuctionId,
    /// The unique identifier of the item
    item_id: AuctionItemId,
}

/// Path parameters for invitation endpoints.
#[derive(serde::Deserialize, schemars::JsonSchema)]
#[schemars(inline)]
pub(crate) struct SupplierPath {
    /// The unique identifier of the auction
    auction_id: AuctionId,
    /// The unique identifier of the supplier
    supplier_id: SupplierId,
}

/// Creates a router with auction lifecycle endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new()
        .api_route_with(
            "/",
            post_with(create_auction::<T>, create_auction_docs),
            |route| route.security_requirement(BEARER).tag("auction").tag("manager"),
        )
        .api_route_with(
            "/{auction_id}",
            get_with(read_auction::<T>, read_auction_docs)
                .put_with(update_auction::<T>, update_auction_docs),
            |route| route.security_requirement(BEARER).tag("auction"),
        )
        .api_route_with(
            "/{auction_id}/publish",
            post_with(publish_auction::<T>, publish_auction_docs),
            |route| route.security_requirement(BEARER).tag("auction").tag("manager"),
        )
        .api_route_with(
            "/{auction_id}/archive",
            post_with(archive_auction::<T>, archive_auction_docs),
            |route| route.security_requirement(BEARER).tag("auction").tag("manager"),
        )
        .api_route_with(
            "/{auction_id}/items",
            post_with(add_item::<T>, draft_edit_docs),
            |route| route.security_requirement(BEARER).tag("auction").tag("manager"),
        )
        .api_route_with(
            "/{auction_id}/items/{item_id}",
            put_with(update_item::<T>, draft_edit_docs).delete_with(remove_item::<T>, draft_edit_docs),
            |route| route.security_requirement(BEARER).tag("auction").tag("manager"),
        )
        .api_route_with(
            "/{auction_id}/suppliers/{supplier_id}",
            put_with(grant_supplier::<T>, draft_edit_docs)
                .delete_with(revoke_supplier::<T>, draft_edit_docs),
            |route| route.security_requirement(BEARER).tag("auction").tag("manager"),
        )
}

fn create_auction_docs(op: TransformOperation) -> TransformOperation<'_> {
    op.summary("Create Auction")
        .description(
            r#"
            Create a draft auction, optionally seeded with items and invited
            suppliers. Copying an RFQ is expressed by setting `rfq` and the
            `rfq_item_id` of each item.

            Requires auction management rights.
            "#,
        )
        .response_with::<401, ApiError, _>(|res| res.description("Missing management rights"))
        .response_with::<422, ApiError, _>(|res| {
            res.description("Invalid schedule, currency or item")
        })
        .response_with::<503, ApiError, _>(|res| res.description("Database operation failed"))
}

fn read_auction_docs(op: TransformOperation) -> TransformOperation<'_> {
    op.summary("Read Auction")
        .description(
            r#"
            Retrieve an auction and its items. Managers also see the invited
            suppliers. Suppliers may read any non-draft auction they are allowed
            to take part in.
            "#,
        )
        .response_with::<401, ApiError, _>(|res| res.description("No usable identity"))
        .response_with::<403, ApiError, _>(|res| res.description("Supplier is not invited"))
        .response_with::<404, ApiError, _>(|res| res.description("Auction does not exist"))
}

fn update_auction_docs(op: TransformOperation) -> TransformOperation<'_> {
    op.summary("Update Auction")
        .description(
            r#"
            Replace the editable fields of a draft auction.

            Requires auction management rights.
            "#,
        )
        .response_with::<401, ApiError, _>(|res| res.description("Missing management rights"))
        .response_with::<404, ApiError, _>(|res| res.description("Auction does not exist"))
        .response_with::<409, ApiError, _>(|res| res.description("Auction is no longer a draft"))
        .response_with::<422, ApiError, _>(|res| res.description("Invalid schedule or currency"))
}

fn publish_auction_docs(op: TransformOperation) -> TransformOperation<'_> {
    op.summary("Publish Auction")
        .description(
            r#"
            Publish a draft auction. The start must be in the future, the end
            after the start, there must be at least one item, and an auction
            created from an invited-only RFQ must have at least one invited
            supplier. The failing precondition is reported as `check`.

            Requires auction management rights.
            "#,
        )
        .response_with::<401, ApiError, _>(|res| res.description("Missing management rights"))
        .response_with::<404, ApiError, _>(|res| res.description("Auction does not exist"))
        .response_with::<409, ApiError, _>(|res| res.description("Auction is already published"))
        .response_with::<422, ApiError, _>(|res| res.description("A precondition failed"))
}

fn archive_auction_docs(op: TransformOperation) -> TransformOperation<'_> {
    op.summary("Archive Auction")
        .description(
            r#"
            Retire an auction. Its bids remain available for audit.

            Requires auction management rights.
            "#,
        )
        .response_with::<401, ApiError, _>(|res| res.description("Missing management rights"))
        .response_with::<404, ApiError, _>(|res| res.description("Auction does not exist"))
        .response_with::<409, ApiError, _>(|res| res.description("Auction is already archived"))
}

fn draft_edit_docs(op: TransformOperation) -> TransformOperation<'_> {
    op.description(
        r#"
            Only permitted while the auction is a draft.

            Requires auction management rights.
            "#,
    )
    .response_with::<401, ApiError, _>(|res| res.description("Missing management rights"))
    .response_with::<404, ApiError, _>(|res| res.description("Auction or item does not exist"))
    .response_with::<409, ApiError, _>(|res| res.description("Auction is no longer a draft"))
}
