use super::{AuctionId, SupplierId, UserId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[cfg(feature = "schemars")]
use super::datetime::time_schema;

/// Grants a supplier permission to view and bid on an auction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct AuctionVisibilityEntry {
    /// The auction
    pub auction_id: AuctionId,

    /// The invited supplier
    pub supplier_id: SupplierId,

    /// When the invitation was made
    #[serde(with = "time::serde::rfc3339")]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "time_schema"))]
    pub granted_at: OffsetDateTime,
}

/// The verified identity of a user acting on behalf of a supplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierIdentity {
    /// The supplier organization
    pub supplier_id: SupplierId,
    /// The individual user
    pub user_id: UserId,
    /// The supplier's display name, if the identity layer provides one
    pub display_name: Option<String>,
}
