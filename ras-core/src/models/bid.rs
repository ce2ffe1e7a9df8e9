use super::{
    AmountError, AuctionId, AuctionItem, AuctionItemId, AuctionRecord, AuctionType, RawAmount,
    SubmissionId, SupplierId, UserId,
};
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[cfg(feature = "schemars")]
use super::datetime::{optional_time_schema, time_schema};

/// One line of a submission, as sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct BidLine {
    /// The item being priced
    pub auction_item_id: AuctionItemId,

    /// The price for the whole line
    #[serde(default)]
    pub amount: RawAmount,
}

/// A batch of bid lines from one supplier.
///
/// The supplier and the placing user come from the identity layer, never from
/// the request body.
#[derive(Debug, Clone, PartialEq)]
pub struct BidSubmission {
    /// The auction being bid on
    pub auction_id: AuctionId,
    /// The bidding supplier
    pub supplier_id: SupplierId,
    /// The supplier's display name, recorded for the open leaderboard
    pub supplier_name: Option<String>,
    /// The user placing the bid
    pub placed_by: UserId,
    /// The currency the amounts are denominated in
    pub currency: String,
    /// One entry per auction item
    pub lines: Vec<BidLine>,
    /// Opaque client metadata stored with every row
    pub metadata: Option<serde_json::Value>,
}

/// A row of the bid ledger. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct BidRecord {
    /// Position in the ledger
    pub seq: i64,

    /// The submission batch this row belongs to
    pub submission_id: SubmissionId,

    /// The auction
    pub auction_id: AuctionId,

    /// The priced item
    pub auction_item_id: AuctionItemId,

    /// The bidding supplier
    pub supplier_id: SupplierId,

    /// The validated amount
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub amount: Decimal,

    /// The auction's currency
    pub currency: String,

    /// The user who placed the bid
    pub placed_by: UserId,

    /// When the bid was accepted
    #[serde(with = "time::serde::rfc3339")]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "time_schema"))]
    pub created_at: OffsetDateTime,

    /// Opaque client metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// The outcome of an accepted submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct SubmissionReceipt {
    /// The batch id shared by every appended row
    pub submission_id: SubmissionId,

    /// The appended rows, in item order
    pub bids: Vec<BidRecord>,

    /// The auction's `end_at` after this submission
    #[serde(with = "time::serde::rfc3339::option")]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "optional_time_schema"))]
    pub end_at: Option<OffsetDateTime>,

    /// Whether this submission pushed `end_at` back
    pub extended: bool,
}

/// The ways in which a submission may be rejected.
///
/// Messages only ever refer to the auction and the submitting supplier's own
/// lines.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BidFailure {
    /// The auction is missing, unpublished or outside its bidding window
    #[error("auction is not open for bidding")]
    AuctionNotOpen,
    /// The lines do not cover every item exactly once
    #[error("bid must price every auction item exactly once")]
    IncompleteBid {
        /// Auction items without a line
        missing: Vec<AuctionItemId>,
        /// Lines for items not in the auction, or repeated lines
        unexpected: Vec<AuctionItemId>,
    },
    /// An amount or the currency is unacceptable
    #[error("{error}")]
    InvalidAmount {
        /// The offending line, if the problem is with a line
        auction_item_id: Option<AuctionItemId>,
        /// What was wrong
        error: AmountError,
    },
    /// A sealed-bid auction already holds a submission from this supplier
    #[error("a sealed bid has already been submitted for this auction")]
    SealedBidAlreadySubmitted,
    /// The supplier is not invited to this auction
    #[error("supplier is not authorized to bid on this auction")]
    NotAuthorized,
}

/// What the ledger knows about the submitting supplier, gathered before validation.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionContext<'a> {
    /// The auction, if it exists
    pub auction: Option<&'a AuctionRecord>,
    /// All items of the auction
    pub items: &'a [AuctionItem],
    /// Whether the supplier already has ledger rows in this auction
    pub has_prior_bids: bool,
    /// Whether the supplier has a visibility entry for this auction
    pub is_invited: bool,
    /// The time of submission
    pub now: OffsetDateTime,
}

/// A line that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptedLine {
    /// The priced item
    pub auction_item_id: AuctionItemId,
    /// The sanitized amount
    pub amount: Decimal,
}

impl BidSubmission {
    /// Run the gateway checks in order, returning the sanitized lines in item order.
    pub fn validate(
        &self,
        context: SubmissionContext<'_>,
    ) -> Result<Vec<AcceptedLine>, BidFailure> {
        // 1. open
        let auction = match context.auction {
            Some(auction) if auction.is_open(context.now) => auction,
            _ => return Err(BidFailure::AuctionNotOpen),
        };

        // 2. complete
        let mut seen = FxHashSet::default();
        let mut unexpected = Vec::new();
        for line in &self.lines {
            let known = context
                .items
                .iter()
                .any(|item| item.id == line.auction_item_id);
            if !known || !seen.insert(line.auction_item_id) {
                unexpected.push(line.auction_item_id);
            }
        }
        let missing: Vec<_> = context
            .items
            .iter()
            .map(|item| item.id)
            .filter(|id| !seen.contains(id))
            .collect();
        if context.items.is_empty() || !missing.is_empty() || !unexpected.is_empty() {
            return Err(BidFailure::IncompleteBid {
                missing,
                unexpected,
            });
        }

        // 3. amounts
        if !self.currency.trim().eq_ignore_ascii_case(&auction.currency) {
            return Err(BidFailure::InvalidAmount {
                auction_item_id: None,
                error: AmountError::CurrencyMismatch {
                    expected: auction.currency.clone(),
                    received: self.currency.clone(),
                },
            });
        }
        let mut accepted = Vec::with_capacity(self.lines.len());
        for item in context.items {
            // completeness guarantees exactly one line per item
            let Some(line) = self.lines.iter().find(|l| l.auction_item_id == item.id) else {
                continue;
            };
            let amount = line.amount.parse().map_err(|error| BidFailure::InvalidAmount {
                auction_item_id: Some(item.id),
                error,
            })?;
            accepted.push(AcceptedLine {
                auction_item_id: item.id,
                amount,
            });
        }

        // 4. sealed
        if auction.auction_type == AuctionType::SealedBid && context.has_prior_bids {
            return Err(BidFailure::SealedBidAlreadySubmitted);
        }

        // 5. invited
        if auction.requires_invitation() && !context.is_invited {
            return Err(BidFailure::NotAuthorized);
        }

        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AuctionConfig, AuctionStatus, ItemData, RfqId, RfqLink, RfqVisibility, VisibilityMode,
    };
    use time::macros::datetime;
    use uuid::Uuid;

    fn item(n: u128) -> AuctionItem {
        AuctionItem {
            id: AuctionItemId(Uuid::from_u128(n)),
            auction_id: AuctionId(Uuid::nil()),
            data: ItemData {
                description: format!("item {n}"),
                quantity: Decimal::ONE,
                unit_of_measure: "ea".into(),
                rfq_item_id: None,
            },
        }
    }

    fn auction(auction_type: AuctionType) -> AuctionRecord {
        let created = datetime!(2026-01-01 09:00 UTC);
        AuctionRecord {
            id: AuctionId(Uuid::nil()),
            auction_type,
            status: AuctionStatus::Published,
            currency: "USD".into(),
            visibility: VisibilityMode::OpenLowest,
            start_at: Some(datetime!(2026-01-02 10:00 UTC)),
            end_at: Some(datetime!(2026-01-02 12:00 UTC)),
            config: AuctionConfig::default(),
            rfq: Some(RfqLink {
                rfq_id: RfqId(Uuid::nil()),
                visibility: RfqVisibility::Public,
            }),
            created_by: UserId(Uuid::nil()),
            created_at: created,
            updated_at: created,
            published_at: Some(created),
            archived_at: None,
        }
    }

    fn submission(lines: &[(u128, &str)]) -> BidSubmission {
        BidSubmission {
            auction_id: AuctionId(Uuid::nil()),
            supplier_id: SupplierId(Uuid::from_u128(100)),
            supplier_name: None,
            placed_by: UserId(Uuid::from_u128(200)),
            currency: "USD".into(),
            lines: lines
                .iter()
                .map(|(n, amount)| BidLine {
                    auction_item_id: AuctionItemId(Uuid::from_u128(*n)),
                    amount: (*amount).into(),
                })
                .collect(),
            metadata: None,
        }
    }

    fn context<'a>(auction: &'a AuctionRecord, items: &'a [AuctionItem]) -> SubmissionContext<'a> {
        SubmissionContext {
            auction: Some(auction),
            items,
            has_prior_bids: false,
            is_invited: false,
            now: datetime!(2026-01-02 11:00 UTC),
        }
    }

    #[test]
    fn test_accepts_complete_submission_in_item_order() {
        let auction = auction(AuctionType::StandardReverse);
        let items = [item(1), item(2)];
        let lines = submission(&[(2, "50"), (1, " 100.00 ")])
            .validate(context(&auction, &items))
            .unwrap();
        assert_eq!(
            lines,
            vec![
                AcceptedLine {
                    auction_item_id: items[0].id,
                    amount: "100".parse().unwrap()
                },
                AcceptedLine {
                    auction_item_id: items[1].id,
                    amount: "50".parse().unwrap()
                },
            ]
        );
    }

    #[test]
    fn test_not_open_outside_window_or_unpublished() {
        let mut auction = auction(AuctionType::StandardReverse);
        let items = [item(1)];
        let bid = submission(&[(1, "10")]);

        let mut early = context(&auction, &items);
        early.now = datetime!(2026-01-02 09:59:59 UTC);
        assert_eq!(bid.validate(early), Err(BidFailure::AuctionNotOpen));

        let mut late = context(&auction, &items);
        late.now = datetime!(2026-01-02 12:00:01 UTC);
        assert_eq!(bid.validate(late), Err(BidFailure::AuctionNotOpen));

        let mut missing = context(&auction, &items);
        missing.auction = None;
        assert_eq!(bid.validate(missing), Err(BidFailure::AuctionNotOpen));

        auction.status = AuctionStatus::Draft;
        assert_eq!(
            bid.validate(context(&auction, &items)),
            Err(BidFailure::AuctionNotOpen)
        );
    }

    #[test]
    fn test_incomplete_bid() {
        let auction = auction(AuctionType::StandardReverse);
        let items = [item(1), item(2)];

        assert_eq!(
            submission(&[(1, "80")]).validate(context(&auction, &items)),
            Err(BidFailure::IncompleteBid {
                missing: vec![items[1].id],
                unexpected: vec![],
            })
        );

        assert_eq!(
            submission(&[(1, "80"), (2, "10"), (3, "5")]).validate(context(&auction, &items)),
            Err(BidFailure::IncompleteBid {
                missing: vec![],
                unexpected: vec![AuctionItemId(Uuid::from_u128(3))],
            })
        );

        assert_eq!(
            submission(&[(1, "80"), (1, "70"), (2, "10")]).validate(context(&auction, &items)),
            Err(BidFailure::IncompleteBid {
                missing: vec![],
                unexpected: vec![items[0].id],
            })
        );
    }

    #[test]
    fn test_invalid_amounts() {
        let auction = auction(AuctionType::StandardReverse);
        let items = [item(1), item(2)];

        for bad in ["", "-", "+", "abc", "-5", "79228162514264337593543950335"] {
            assert!(matches!(
                submission(&[(1, "10"), (2, bad)]).validate(context(&auction, &items)),
                Err(BidFailure::InvalidAmount {
                    auction_item_id: Some(id),
                    ..
                }) if id == items[1].id
            ));
        }

        let mut euros = submission(&[(1, "10"), (2, "10")]);
        euros.currency = "EUR".into();
        assert!(matches!(
            euros.validate(context(&auction, &items)),
            Err(BidFailure::InvalidAmount {
                auction_item_id: None,
                error: AmountError::CurrencyMismatch { .. }
            })
        ));
    }

    #[test]
    fn test_sealed_single_shot() {
        let auction = auction(AuctionType::SealedBid);
        let items = [item(1)];
        let bid = submission(&[(1, "10")]);

        assert!(bid.validate(context(&auction, &items)).is_ok());

        let mut again = context(&auction, &items);
        again.has_prior_bids = true;
        assert_eq!(bid.validate(again), Err(BidFailure::SealedBidAlreadySubmitted));

        // revisions are fine for the other types
        let open = self::auction(AuctionType::RankedReverse);
        let mut revision = context(&open, &items);
        revision.has_prior_bids = true;
        assert!(bid.validate(revision).is_ok());
    }

    #[test]
    fn test_invitation_required_unless_public() {
        let mut auction = auction(AuctionType::StandardReverse);
        let items = [item(1)];
        let bid = submission(&[(1, "10")]);

        auction.rfq = Some(RfqLink {
            rfq_id: RfqId(Uuid::nil()),
            visibility: RfqVisibility::Invited,
        });
        assert_eq!(
            bid.validate(context(&auction, &items)),
            Err(BidFailure::NotAuthorized)
        );

        let mut invited = context(&auction, &items);
        invited.is_invited = true;
        assert!(bid.validate(invited).is_ok());

        auction.rfq = None;
        assert_eq!(
            bid.validate(context(&auction, &items)),
            Err(BidFailure::NotAuthorized)
        );
    }

    #[test]
    fn test_checks_run_in_order() {
        let mut auction = auction(AuctionType::SealedBid);
        auction.rfq = None;
        let items = [item(1), item(2)];

        let mut everything_wrong = context(&auction, &items);
        everything_wrong.has_prior_bids = true;

        // incomplete beats invalid amount, sealed and authorization
        assert!(matches!(
            submission(&[(1, "-")]).validate(everything_wrong),
            Err(BidFailure::IncompleteBid { .. })
        ));
        // invalid amount beats sealed and authorization
        assert!(matches!(
            submission(&[(1, "-"), (2, "1")]).validate(everything_wrong),
            Err(BidFailure::InvalidAmount { .. })
        ));
        // sealed beats authorization
        assert_eq!(
            submission(&[(1, "1"), (2, "1")]).validate(everything_wrong),
            Err(BidFailure::SealedBidAlreadySubmitted)
        );
    }
}
