use super::{AuctionId, AuctionItemId, LifecycleFailure, RfqItemId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The buyer-editable portion of an auction item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct ItemData {
    /// What is being procured
    pub description: String,

    /// How many units
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub quantity: Decimal,

    /// The unit `quantity` is expressed in
    #[serde(default)]
    pub unit_of_measure: String,

    /// The RFQ line this item was copied from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rfq_item_id: Option<RfqItemId>,
}

impl ItemData {
    /// Reject blank descriptions and non-positive quantities.
    pub fn validate(mut self) -> Result<Self, LifecycleFailure> {
        self.description = self.description.trim().to_owned();
        self.unit_of_measure = self.unit_of_measure.trim().to_owned();

        if self.description.is_empty() || self.quantity <= Decimal::ZERO {
            Err(LifecycleFailure::InvalidItem)
        } else {
            Ok(self)
        }
    }
}

/// A priceable line within an auction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct AuctionItem {
    /// The item's id
    pub id: AuctionItemId,

    /// The owning auction
    pub auction_id: AuctionId,

    /// The item's description and quantity
    #[serde(flatten)]
    pub data: ItemData,
}
