mod auction;
mod bid;

pub use auction::AuctionRepository;
pub use bid::BidRepository;

use crate::models::{
    AuctionData, AuctionId, AuctionItemId, BidSubmission, ItemData, SubmissionId,
    SupplierIdentity, UserId,
};
use time::OffsetDateTime;

/// Base trait for every repository: fixes the infrastructure error type.
///
/// Repository methods that can fail for domain reasons return a nested result,
/// `Result<Result<T, Failure>, Self::Error>`, so that a store outage is never
/// confused with a rejected request.
pub trait Repository: Clone + Sized + Send + Sync + 'static {
    /// The error type for infrastructure failures (e.g. the store is unavailable)
    type Error: std::error::Error + Send + Sync + 'static;
}

/// The integration point between the engine and an embedding application.
///
/// An application supplies storage, the clock, identifier generation and the
/// identity checks the engine cannot make on its own.
pub trait Application: Send + Sync + 'static {
    /// Whatever the transport layer extracts to identify the caller
    type Context: Send + Sync;

    /// The store backing auctions and the bid ledger
    type Repository: AuctionRepository + BidRepository;

    /// Access the store
    fn database(&self) -> &Self::Repository;

    /// The current time; every lifecycle and bidding decision is made against this clock
    fn now(&self) -> OffsetDateTime;

    /// Produce an id for a new auction
    fn generate_auction_id(&self, data: &AuctionData) -> AuctionId;

    /// Produce an id for a new auction item
    fn generate_item_id(&self, data: &ItemData) -> AuctionItemId;

    /// Produce an id for a new submission batch
    fn generate_submission_id(&self, submission: &BidSubmission) -> SubmissionId;

    /// The verified supplier the caller acts for, if any
    fn supplier_identity(
        &self,
        context: &Self::Context,
    ) -> impl Future<Output = Option<SupplierIdentity>> + Send;

    /// The buyer user id if the caller may create and administer auctions
    fn can_manage_auctions(
        &self,
        context: &Self::Context,
    ) -> impl Future<Output = Option<UserId>> + Send;
}
