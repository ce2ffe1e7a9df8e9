use super::{AuctionId, Map, RfqId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

#[cfg(feature = "schemars")]
use super::datetime::{optional_time_schema, time_schema};

/// The bidding rules of an auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum AuctionType {
    /// Suppliers may revise their bids freely; eligible for auto-extension
    StandardReverse,
    /// Suppliers may revise their bids freely; ranking is the primary feedback
    RankedReverse,
    /// Each supplier may submit exactly one batch of lines
    SealedBid,
}

/// The lifecycle status of an auction. Transitions are monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum AuctionStatus {
    /// Editable, not yet visible to suppliers
    Draft,
    /// Read-only; suppliers may bid between `start_at` and `end_at`
    Published,
    /// Terminal
    Archived,
}

/// How much of the ranking each supplier may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum VisibilityMode {
    /// Every supplier sees the full leaderboard
    OpenLowest,
    /// Every supplier sees only their own rank and total
    RankOnly,
    /// Suppliers see only that their submission was received, until the auction closes
    Sealed,
}

/// Who may participate in the RFQ an auction was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum RfqVisibility {
    /// Any supplier may participate
    Public,
    /// Only suppliers with a visibility entry may participate
    Invited,
}

/// A reference back to the RFQ an auction was copied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct RfqLink {
    /// The source RFQ
    pub rfq_id: RfqId,
    /// The participation rule inherited from the RFQ
    pub visibility: RfqVisibility,
}

/// Free-form auction configuration.
///
/// The well-known keys are typed; anything else is preserved verbatim for
/// the supplier-facing UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct AuctionConfig {
    /// Display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Informational opening price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "schemars", schemars(with = "Option<String>"))]
    pub starting_price: Option<Decimal>,

    /// Informational minimum decrement between successive bids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "schemars", schemars(with = "Option<String>"))]
    pub minimum_decrement: Option<Decimal>,

    /// Buyer-side reserve price; never shown to suppliers by this service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "schemars", schemars(with = "Option<String>"))]
    pub reserve_price: Option<Decimal>,

    /// Whether late bids push back `end_at` (standard reverse auctions only)
    #[serde(default)]
    pub auto_extend_enabled: bool,

    /// How close to `end_at` a bid must land to trigger an extension
    #[serde(default)]
    pub auto_extend_window_seconds: u32,

    /// How far `end_at` moves per triggering bid
    #[serde(default)]
    pub auto_extend_minutes: u32,

    /// Any other keys
    #[serde(flatten)]
    pub extra: Map<String, serde_json::Value>,
}

/// The buyer-editable portion of an auction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct AuctionData {
    /// The bidding rules
    #[serde(rename = "type")]
    pub auction_type: AuctionType,

    /// Three-letter currency code every bid must be denominated in
    pub currency: String,

    /// How much of the ranking suppliers may see
    pub visibility: VisibilityMode,

    /// When bidding opens
    #[serde(default, with = "time::serde::rfc3339::option")]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "optional_time_schema"))]
    pub start_at: Option<OffsetDateTime>,

    /// When bidding closes
    #[serde(default, with = "time::serde::rfc3339::option")]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "optional_time_schema"))]
    pub end_at: Option<OffsetDateTime>,

    /// Free-form configuration
    #[serde(default)]
    pub config: AuctionConfig,

    /// The RFQ this auction was created from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rfq: Option<RfqLink>,
}

impl AuctionData {
    /// Check the data is self-consistent, normalizing the currency code.
    pub fn validate(mut self) -> Result<Self, LifecycleFailure> {
        let currency = self.currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(LifecycleFailure::InvalidCurrency);
        }
        self.currency = currency.to_ascii_uppercase();

        if let (Some(start_at), Some(end_at)) = (self.start_at, self.end_at) {
            if end_at <= start_at {
                return Err(LifecycleFailure::InvalidSchedule);
            }
        }

        Ok(self)
    }
}

/// A stored auction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct AuctionRecord {
    /// The auction's id
    pub id: AuctionId,

    /// The bidding rules
    #[serde(rename = "type")]
    pub auction_type: AuctionType,

    /// Lifecycle status
    pub status: AuctionStatus,

    /// Currency every bid must be denominated in
    pub currency: String,

    /// How much of the ranking suppliers may see
    pub visibility: VisibilityMode,

    /// When bidding opens
    #[serde(with = "time::serde::rfc3339::option")]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "optional_time_schema"))]
    pub start_at: Option<OffsetDateTime>,

    /// When bidding closes, including any auto-extensions
    #[serde(with = "time::serde::rfc3339::option")]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "optional_time_schema"))]
    pub end_at: Option<OffsetDateTime>,

    /// Free-form configuration
    pub config: AuctionConfig,

    /// The RFQ this auction was created from, if any
    pub rfq: Option<RfqLink>,

    /// The buyer user who created the auction
    pub created_by: UserId,

    /// Creation time
    #[serde(with = "time::serde::rfc3339")]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "time_schema"))]
    pub created_at: OffsetDateTime,

    /// Time of the last change to the record
    #[serde(with = "time::serde::rfc3339")]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "time_schema"))]
    pub updated_at: OffsetDateTime,

    /// When the auction was published
    #[serde(with = "time::serde::rfc3339::option")]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "optional_time_schema"))]
    pub published_at: Option<OffsetDateTime>,

    /// When the auction was archived
    #[serde(with = "time::serde::rfc3339::option")]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "optional_time_schema"))]
    pub archived_at: Option<OffsetDateTime>,
}

/// Where an auction is in its lifetime, combining status with the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum AuctionPhase {
    /// Still being edited
    Draft,
    /// Published, bidding has not opened yet
    Scheduled,
    /// Published and accepting bids
    Live,
    /// Published, bidding window has passed
    Closed,
    /// Retired
    Archived,
}

impl AuctionPhase {
    /// Whether the final ranking may be revealed
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed | Self::Archived)
    }
}

impl AuctionRecord {
    /// Whether only invited suppliers may participate.
    ///
    /// Participation is open only when the auction was created from a public RFQ.
    pub fn requires_invitation(&self) -> bool {
        !matches!(
            self.rfq,
            Some(RfqLink {
                visibility: RfqVisibility::Public,
                ..
            })
        )
    }

    /// The phase of the auction at the given time.
    pub fn phase(&self, now: OffsetDateTime) -> AuctionPhase {
        match self.status {
            AuctionStatus::Draft => AuctionPhase::Draft,
            AuctionStatus::Archived => AuctionPhase::Archived,
            AuctionStatus::Published => match (self.start_at, self.end_at) {
                (Some(start_at), _) if now < start_at => AuctionPhase::Scheduled,
                (Some(_), Some(end_at)) if now <= end_at => AuctionPhase::Live,
                (Some(_), Some(_)) => AuctionPhase::Closed,
                // Publishing requires a schedule, so this is unreachable in practice
                _ => AuctionPhase::Scheduled,
            },
        }
    }

    /// Whether bids are accepted at the given time (`start_at <= now <= end_at`).
    pub fn is_open(&self, now: OffsetDateTime) -> bool {
        self.phase(now) == AuctionPhase::Live
    }

    /// Fail with [`LifecycleFailure::AuctionLocked`] unless the auction is a draft.
    pub fn ensure_editable(&self) -> Result<(), LifecycleFailure> {
        if self.status == AuctionStatus::Draft {
            Ok(())
        } else {
            Err(LifecycleFailure::AuctionLocked)
        }
    }

    /// Check every publish precondition, in order.
    pub fn check_publish(
        &self,
        item_count: usize,
        supplier_count: usize,
        now: OffsetDateTime,
    ) -> Result<(), LifecycleFailure> {
        self.ensure_editable()?;

        let start_at = self
            .start_at
            .ok_or(LifecycleFailure::PublishPreconditionFailed(
                PublishCheck::MissingSchedule,
            ))?;

        if start_at <= now {
            return Err(LifecycleFailure::PublishPreconditionFailed(
                PublishCheck::StartNotInFuture,
            ));
        }

        match self.end_at {
            Some(end_at) if end_at > start_at => {}
            _ => {
                return Err(LifecycleFailure::PublishPreconditionFailed(
                    PublishCheck::EndNotAfterStart,
                ));
            }
        }

        if item_count == 0 {
            return Err(LifecycleFailure::PublishPreconditionFailed(
                PublishCheck::NoItems,
            ));
        }

        // nobody could bid in an invitation-only auction without a grant
        if self.requires_invitation() && supplier_count == 0 {
            return Err(LifecycleFailure::PublishPreconditionFailed(
                PublishCheck::NoInvitedSuppliers,
            ));
        }

        Ok(())
    }

    /// Fail with [`LifecycleFailure::AuctionLocked`] if the auction is already archived.
    pub fn ensure_archivable(&self) -> Result<(), LifecycleFailure> {
        if self.status == AuctionStatus::Archived {
            Err(LifecycleFailure::AuctionLocked)
        } else {
            Ok(())
        }
    }

    /// The new `end_at` if a bid placed at `now` triggers an auto-extension.
    ///
    /// Applies only to standard reverse auctions with auto-extension enabled,
    /// when `end_at - window <= now <= end_at`.
    pub fn auto_extension(&self, now: OffsetDateTime) -> Option<OffsetDateTime> {
        let config = &self.config;
        if self.auction_type != AuctionType::StandardReverse
            || !config.auto_extend_enabled
            || config.auto_extend_minutes == 0
        {
            return None;
        }

        let end_at = self.end_at?;
        let window = Duration::seconds(config.auto_extend_window_seconds.into());

        if now <= end_at && end_at - now <= window {
            Some(end_at + Duration::minutes(config.auto_extend_minutes.into()))
        } else {
            None
        }
    }
}

/// Which publish precondition failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum PublishCheck {
    /// `start_at` or `end_at` has not been set
    #[error("start_at and end_at must be set")]
    MissingSchedule,
    /// `start_at` is now or in the past
    #[error("start_at must be in the future")]
    StartNotInFuture,
    /// `end_at` is not after `start_at`
    #[error("end_at must be after start_at")]
    EndNotAfterStart,
    /// The auction has no items
    #[error("must have at least one item")]
    NoItems,
    /// An invitation-only auction has no suppliers
    #[error("must invite at least one supplier")]
    NoInvitedSuppliers,
}

/// The ways in which a lifecycle operation may fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleFailure {
    /// No such auction
    #[error("auction not found")]
    NotFound,
    /// No such item within the auction
    #[error("auction item not found")]
    ItemNotFound,
    /// The auction is not a draft, so it can no longer be changed
    #[error("auction is locked")]
    AuctionLocked,
    /// One of the publish checks failed
    #[error("cannot publish: {0}")]
    PublishPreconditionFailed(PublishCheck),
    /// `end_at` is not after `start_at`
    #[error("end_at must be after start_at")]
    InvalidSchedule,
    /// The currency is not a three-letter code
    #[error("currency must be a three-letter code")]
    InvalidCurrency,
    /// The item quantity is not positive or its description is blank
    #[error("item must have a description and a positive quantity")]
    InvalidItem,
}
