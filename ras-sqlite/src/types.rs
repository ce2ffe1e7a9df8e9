//! Type definitions for the SQLite implementation.
//!
//! This module contains the storage forms of timestamps and amounts, and the
//! internal row types used to map query results onto the core models.

use ras_core::models::{
    AuctionConfig, AuctionId, AuctionItem, AuctionItemId, AuctionRecord, AuctionStatus,
    AuctionType, AuctionVisibilityEntry, BidRecord, ItemData, RfqId, RfqItemId, RfqLink,
    RfqVisibility, SubmissionId, SupplierId, UserId, VisibilityMode,
};
use sqlx::types::Json;

mod amount;
pub use amount::Amount;

mod datetime;
pub use datetime::DateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct AuctionRow {
    pub id: AuctionId,
    pub auction_type: AuctionType,
    pub status: AuctionStatus,
    pub currency: String,
    pub visibility: VisibilityMode,
    pub start_at: Option<DateTime>,
    pub end_at: Option<DateTime>,
    pub config: Json<AuctionConfig>,
    pub rfq_id: Option<RfqId>,
    pub rfq_visibility: Option<RfqVisibility>,
    pub created_by: UserId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub published_at: Option<DateTime>,
    pub archived_at: Option<DateTime>,
}

impl From<AuctionRow> for AuctionRecord {
    fn from(row: AuctionRow) -> Self {
        Self {
            id: row.id,
            auction_type: row.auction_type,
            status: row.status,
            currency: row.currency,
            visibility: row.visibility,
            start_at: row.start_at.map(Into::into),
            end_at: row.end_at.map(Into::into),
            config: row.config.0,
            rfq: row
                .rfq_id
                .zip(row.rfq_visibility)
                .map(|(rfq_id, visibility)| RfqLink { rfq_id, visibility }),
            created_by: row.created_by,
            created_at: row.created_at.into(),
            updated_at: row.updated_at.into(),
            published_at: row.published_at.map(Into::into),
            archived_at: row.archived_at.map(Into::into),
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ItemRow {
    pub id: AuctionItemId,
    pub auction_id: AuctionId,
    pub description: String,
    pub quantity: Amount,
    pub unit_of_measure: String,
    pub rfq_item_id: Option<RfqItemId>,
}

impl From<ItemRow> for AuctionItem {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            auction_id: row.auction_id,
            data: ItemData {
                description: row.description,
                quantity: row.quantity.0,
                unit_of_measure: row.unit_of_measure,
                rfq_item_id: row.rfq_item_id,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct SupplierRow {
    pub auction_id: AuctionId,
    pub supplier_id: SupplierId,
    pub granted_at: DateTime,
}

impl From<SupplierRow> for AuctionVisibilityEntry {
    fn from(row: SupplierRow) -> Self {
        Self {
            auction_id: row.auction_id,
            supplier_id: row.supplier_id,
            granted_at: row.granted_at.into(),
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct BidRow {
    pub seq: i64,
    pub submission_id: SubmissionId,
    pub auction_id: AuctionId,
    pub auction_item_id: AuctionItemId,
    pub supplier_id: SupplierId,
    pub amount: Amount,
    pub currency: String,
    pub placed_by: UserId,
    pub created_at: DateTime,
    pub metadata: Option<Json<serde_json::Value>>,
}

impl From<BidRow> for BidRecord {
    fn from(row: BidRow) -> Self {
        Self {
            seq: row.seq,
            submission_id: row.submission_id,
            auction_id: row.auction_id,
            auction_item_id: row.auction_item_id,
            supplier_id: row.supplier_id,
            amount: row.amount.0,
            currency: row.currency,
            placed_by: row.placed_by,
            created_at: row.created_at.into(),
            metadata: row.metadata.map(|json| json.0),
        }
    }
}
