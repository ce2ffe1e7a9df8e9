mod amount;
mod auction;
mod bid;
mod datetime;
mod ids;
mod item;
mod map;
mod projection;
mod ranking;
mod visibility;

pub use amount::{AmountError, MAX_AMOUNT, RawAmount};
pub use auction::{
    AuctionConfig, AuctionData, AuctionPhase, AuctionRecord, AuctionStatus, AuctionType,
    LifecycleFailure, PublishCheck, RfqLink, RfqVisibility, VisibilityMode,
};
pub use bid::{
    AcceptedLine, BidFailure, BidLine, BidRecord, BidSubmission, SubmissionContext,
    SubmissionReceipt,
};
pub use datetime::{DateTimeRangeQuery, DateTimeRangeResponse};
#[cfg(feature = "schemars")]
pub use datetime::{optional_time_schema, time_schema};
pub use ids::{AuctionId, AuctionItemId, RfqId, RfqItemId, SubmissionId, SupplierId, UserId};
pub use item::{AuctionItem, ItemData};
pub use map::Map;
pub use projection::{BidStatus, LeaderboardEntry, OwnLine, Projection, Standing};
pub use ranking::{RankingEntry, RankingSnapshot, current_bids};
pub use visibility::{AuctionVisibilityEntry, SupplierIdentity};
