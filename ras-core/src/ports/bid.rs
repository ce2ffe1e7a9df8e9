use crate::models::{
    AuctionId, BidFailure, BidRecord, BidSubmission, DateTimeRangeQuery, DateTimeRangeResponse,
    Map, RankingSnapshot, SubmissionId, SubmissionReceipt, SupplierId,
};
use time::OffsetDateTime;

/// Repository interface for the append-only bid ledger.
///
/// Rows are only ever inserted. A supplier revising a price appends a new row;
/// the current price is always derived as the latest row per (item, supplier).
pub trait BidRepository: super::Repository {
    /// Validate and append a submission as a single transaction.
    ///
    /// Validation runs in order (auction open, complete, amounts, sealed,
    /// authorized) against the store's current state. On success one row is
    /// appended per auction item, and if the bid lands inside the
    /// auto-extension window `end_at` is moved with a compare-and-swap.
    ///
    /// # Returns
    ///
    /// - Ok(Ok(receipt)) if the submission was accepted
    /// - Ok(Err(failure)) if it was rejected; the ledger is unchanged
    /// - Err(repository_error) if there is some other error; the ledger is unchanged
    fn submit_bid(
        &self,
        submission_id: SubmissionId,
        submission: BidSubmission,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<SubmissionReceipt, BidFailure>, Self::Error>> + Send;

    /// Every row of an auction's ledger, in append order.
    fn get_ledger(
        &self,
        auction_id: AuctionId,
    ) -> impl Future<Output = Result<Vec<BidRecord>, Self::Error>> + Send;

    /// Display names of every supplier that has bid on the auction.
    fn get_supplier_names(
        &self,
        auction_id: AuctionId,
    ) -> impl Future<Output = Result<Map<SupplierId, String>, Self::Error>> + Send;

    /// Retrieve a supplier's own rows for an auction, newest first.
    ///
    /// # Returns
    ///
    /// A paginated response; `more` holds the query for the next page.
    fn get_bid_history(
        &self,
        auction_id: AuctionId,
        supplier_id: SupplierId,
        query: DateTimeRangeQuery,
        limit: usize,
    ) -> impl Future<Output = Result<DateTimeRangeResponse<BidRecord>, Self::Error>> + Send;

    /// Recompute the ranking from the current ledger.
    fn get_ranking(
        &self,
        auction_id: AuctionId,
    ) -> impl Future<Output = Result<RankingSnapshot, Self::Error>> + Send {
        async move {
            let ledger = self.get_ledger(auction_id).await?;
            let names = self.get_supplier_names(auction_id).await?;
            Ok(RankingSnapshot::compute(&ledger, &names))
        }
    }
}
