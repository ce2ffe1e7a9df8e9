use super::{AuctionItemId, BidRecord, Map, SupplierId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use time::OffsetDateTime;

#[cfg(feature = "schemars")]
use super::datetime::time_schema;

/// One supplier's position in the ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct RankingEntry {
    /// 1-based, 1 is the lowest total
    pub rank: u32,

    /// The supplier
    pub supplier_id: SupplierId,

    /// The supplier's display name, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Sum of the supplier's current bid on every item
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub total: Decimal,

    /// The supplier's current bid on each item
    #[cfg_attr(feature = "schemars", schemars(with = "Map<AuctionItemId, String>"))]
    pub items: Map<AuctionItemId, Decimal>,

    /// The time of the most recent bid contributing to `total`
    #[serde(with = "time::serde::rfc3339")]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "time_schema"))]
    pub last_bid_at: OffsetDateTime,

    /// The ledger position of that bid
    pub last_seq: i64,
}

/// The ranking of an auction, derived from its ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct RankingSnapshot {
    /// Entries in rank order
    pub entries: Vec<RankingEntry>,

    /// The highest ledger position seen, if any bids exist
    pub as_of_seq: Option<i64>,
}

/// Whether `a` supersedes `b` as the current bid for the same (item, supplier)
fn is_later(a: &BidRecord, b: &BidRecord) -> bool {
    (a.created_at, a.seq) > (b.created_at, b.seq)
}

/// The current (latest) bid for each (item, supplier) pair.
pub fn current_bids(bids: &[BidRecord]) -> Map<(AuctionItemId, SupplierId), &BidRecord> {
    let mut current: Map<(AuctionItemId, SupplierId), &BidRecord> = Map::default();
    for bid in bids {
        current
            .entry((bid.auction_item_id, bid.supplier_id))
            .and_modify(|existing| {
                if is_later(bid, existing) {
                    *existing = bid;
                }
            })
            .or_insert(bid);
    }
    current
}

impl RankingSnapshot {
    /// Rank every supplier with bids in the ledger.
    ///
    /// Only the latest row per (item, supplier) counts. Totals are ordered
    /// ascending; equal totals go to the supplier whose last update is older,
    /// then to the lower ledger position, then to the lower supplier id. The
    /// result depends only on the set of rows, not on their order in `bids`.
    pub fn compute(bids: &[BidRecord], names: &Map<SupplierId, String>) -> Self {
        let mut per_supplier: Map<SupplierId, RankingEntry> = Map::default();

        for ((item_id, supplier_id), bid) in current_bids(bids) {
            let entry = per_supplier
                .entry(supplier_id)
                .or_insert_with(|| RankingEntry {
                    rank: 0,
                    supplier_id,
                    display_name: names.get(&supplier_id).cloned(),
                    total: Decimal::ZERO,
                    items: Map::default(),
                    last_bid_at: bid.created_at,
                    last_seq: bid.seq,
                });
            // amounts are capped on entry; saturate rather than panic on older rows
            entry.total = entry.total.saturating_add(bid.amount);
            entry.items.insert(item_id, bid.amount);
            if (bid.created_at, bid.seq) > (entry.last_bid_at, entry.last_seq) {
                entry.last_bid_at = bid.created_at;
                entry.last_seq = bid.seq;
            }
        }

        let mut entries: Vec<RankingEntry> = per_supplier.into_iter().map(|(_, e)| e).collect();
        entries.sort_by(compare_entries);
        for (index, entry) in entries.iter_mut().enumerate() {
            entry.rank = index as u32 + 1;
            entry.items.sort_keys();
        }

        Self {
            entries,
            as_of_seq: bids.iter().map(|bid| bid.seq).max(),
        }
    }

    /// The entry for a specific supplier, if they have bid.
    pub fn entry(&self, supplier_id: SupplierId) -> Option<&RankingEntry> {
        self.entries
            .iter()
            .find(|entry| entry.supplier_id == supplier_id)
    }

    /// Whether no supplier has bid yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn compare_entries(a: &RankingEntry, b: &RankingEntry) -> Ordering {
    a.total
        .cmp(&b.total)
        .then_with(|| a.last_bid_at.cmp(&b.last_bid_at))
        .then_with(|| a.last_seq.cmp(&b.last_seq))
        .then_with(|| a.supplier_id.cmp(&b.supplier_id))
}
