use super::{
    AuctionId, AuctionItemId, AuctionPhase, AuctionRecord, AuctionType, BidRecord, RankingEntry,
    RankingSnapshot, SupplierId, VisibilityMode, current_bids,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[cfg(feature = "schemars")]
use super::datetime::{optional_time_schema, time_schema};

/// A supplier's own position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct Standing {
    /// 1-based rank
    pub rank: u32,
    /// The supplier's current total
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub total: Decimal,
}

impl From<&RankingEntry> for Standing {
    fn from(entry: &RankingEntry) -> Self {
        Self {
            rank: entry.rank,
            total: entry.total,
        }
    }
}

/// One row of the open leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct LeaderboardEntry {
    /// 1-based rank
    pub rank: u32,
    /// The supplier
    pub supplier_id: SupplierId,
    /// The supplier's display name, if known
    pub display_name: Option<String>,
    /// The supplier's current total
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub total: Decimal,
}

/// What one supplier is allowed to see of the ranking.
///
/// Only the `OpenLowest` variant has room for other suppliers' data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Projection {
    /// The full leaderboard
    OpenLowest {
        /// The viewer's own position, if they have bid
        standing: Option<Standing>,
        /// Every bidding supplier, in rank order
        leaderboard: Vec<LeaderboardEntry>,
    },
    /// Only the viewer's own position
    RankOnly {
        /// The viewer's own position, if they have bid
        standing: Option<Standing>,
    },
    /// Only an acknowledgement until the auction closes
    Sealed {
        /// Whether the viewer has submitted
        submitted: bool,
        /// The viewer's own position, revealed once the auction has closed
        standing: Option<Standing>,
    },
}

impl Projection {
    /// Filter a ranking for one supplier.
    pub fn project(
        mode: VisibilityMode,
        phase: AuctionPhase,
        snapshot: &RankingSnapshot,
        viewer: SupplierId,
    ) -> Self {
        let own = snapshot.entry(viewer);
        let standing = own.map(Standing::from);

        match mode {
            VisibilityMode::OpenLowest => Self::OpenLowest {
                standing,
                leaderboard: snapshot
                    .entries
                    .iter()
                    .map(|entry| LeaderboardEntry {
                        rank: entry.rank,
                        supplier_id: entry.supplier_id,
                        display_name: entry.display_name.clone(),
                        total: entry.total,
                    })
                    .collect(),
            },
            VisibilityMode::RankOnly => Self::RankOnly { standing },
            VisibilityMode::Sealed => Self::Sealed {
                submitted: own.is_some(),
                standing: standing.filter(|_| phase.is_closed()),
            },
        }
    }
}

/// The viewer's own current bid on an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct OwnLine {
    /// The item
    pub auction_item_id: AuctionItemId,
    /// The latest amount
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub amount: Decimal,
    /// When it was placed
    #[serde(with = "time::serde::rfc3339")]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "time_schema"))]
    pub created_at: OffsetDateTime,
}

/// Everything a supplier's bidding room needs to render or re-sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct BidStatus {
    /// The auction
    pub auction_id: AuctionId,
    /// Where the auction is in its lifetime
    pub phase: AuctionPhase,
    /// The auction's currency
    pub currency: String,
    /// When bidding closes
    #[serde(with = "time::serde::rfc3339::option")]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "optional_time_schema"))]
    pub end_at: Option<OffsetDateTime>,
    /// Whether a submission would currently pass the open and sealed checks
    pub can_submit: bool,
    /// The viewer's latest amount per item, to pre-fill inputs
    pub lines: Vec<OwnLine>,
    /// The viewer's filtered view of the ranking
    pub projection: Projection,
}

impl BidStatus {
    /// Assemble the status of `auction` for `viewer` from its full ledger.
    pub fn build(
        auction: &AuctionRecord,
        ledger: &[BidRecord],
        snapshot: &RankingSnapshot,
        viewer: SupplierId,
        now: OffsetDateTime,
    ) -> Self {
        let phase = auction.phase(now);

        let mut lines: Vec<OwnLine> = current_bids(ledger)
            .into_iter()
            .filter(|((_, supplier_id), _)| *supplier_id == viewer)
            .map(|((auction_item_id, _), bid)| OwnLine {
                auction_item_id,
                amount: bid.amount,
                created_at: bid.created_at,
            })
            .collect();
        lines.sort_by_key(|line| line.auction_item_id);

        let sealed_and_spent = auction.auction_type == AuctionType::SealedBid && !lines.is_empty();

        Self {
            auction_id: auction.id,
            phase,
            currency: auction.currency.clone(),
            end_at: auction.end_at,
            can_submit: phase == AuctionPhase::Live && !sealed_and_spent,
            lines,
            projection: Projection::project(auction.visibility, phase, snapshot, viewer),
        }
    }
}
