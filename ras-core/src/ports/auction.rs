use crate::models::{
    AuctionData, AuctionId, AuctionItem, AuctionItemId, AuctionRecord, AuctionVisibilityEntry,
    ItemData, LifecycleFailure, SupplierId, UserId,
};
use time::OffsetDateTime;

/// Repository interface for the auction record store and its lifecycle.
///
/// Every mutation other than archival is only permitted while the auction is a
/// draft, and fails with [`LifecycleFailure::AuctionLocked`] otherwise.
///
/// Mutations return a nested result:
/// - Ok(Ok(value)) if the change was applied
/// - Ok(Err(failure)) if the change was rejected; nothing was written
/// - Err(repository_error) if there is some other error
pub trait AuctionRepository: super::Repository {
    /// Create a draft auction, optionally seeded with items and invited suppliers.
    fn create_auction(
        &self,
        auction_id: AuctionId,
        created_by: UserId,
        data: AuctionData,
        items: Vec<(AuctionItemId, ItemData)>,
        suppliers: Vec<SupplierId>,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<AuctionRecord, LifecycleFailure>, Self::Error>> + Send;

    /// Retrieve an auction, returning Option::None if it does not exist.
    fn get_auction(
        &self,
        auction_id: AuctionId,
    ) -> impl Future<Output = Result<Option<AuctionRecord>, Self::Error>> + Send;

    /// Retrieve the items of an auction in creation order.
    fn get_auction_items(
        &self,
        auction_id: AuctionId,
    ) -> impl Future<Output = Result<Vec<AuctionItem>, Self::Error>> + Send;

    /// Retrieve the suppliers invited to an auction.
    fn get_auction_suppliers(
        &self,
        auction_id: AuctionId,
    ) -> impl Future<Output = Result<Vec<AuctionVisibilityEntry>, Self::Error>> + Send;

    /// Whether the supplier has a visibility entry for the auction.
    fn is_supplier_invited(
        &self,
        auction_id: AuctionId,
        supplier_id: SupplierId,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Replace the editable fields of a draft auction.
    fn update_auction(
        &self,
        auction_id: AuctionId,
        data: AuctionData,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<AuctionRecord, LifecycleFailure>, Self::Error>> + Send;

    /// Add an item to a draft auction.
    fn add_item(
        &self,
        auction_id: AuctionId,
        item_id: AuctionItemId,
        data: ItemData,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<AuctionItem, LifecycleFailure>, Self::Error>> + Send;

    /// Replace an item of a draft auction.
    fn update_item(
        &self,
        auction_id: AuctionId,
        item_id: AuctionItemId,
        data: ItemData,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<AuctionItem, LifecycleFailure>, Self::Error>> + Send;

    /// Delete an item from a draft auction.
    fn remove_item(
        &self,
        auction_id: AuctionId,
        item_id: AuctionItemId,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<(), LifecycleFailure>, Self::Error>> + Send;

    /// Invite a supplier to a draft auction. Inviting twice is not an error.
    fn grant_supplier(
        &self,
        auction_id: AuctionId,
        supplier_id: SupplierId,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<AuctionVisibilityEntry, LifecycleFailure>, Self::Error>>
    + Send;

    /// Withdraw a supplier's invitation to a draft auction.
    ///
    /// # Returns
    ///
    /// - Ok(Ok(true)) if an invitation was removed
    /// - Ok(Ok(false)) if there was no invitation to remove
    fn revoke_supplier(
        &self,
        auction_id: AuctionId,
        supplier_id: SupplierId,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<bool, LifecycleFailure>, Self::Error>> + Send;

    /// Validate the publish preconditions and, if they all hold, publish the auction.
    fn publish_auction(
        &self,
        auction_id: AuctionId,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<AuctionRecord, LifecycleFailure>, Self::Error>> + Send;

    /// Archive a draft or published auction. Bids are untouched.
    fn archive_auction(
        &self,
        auction_id: AuctionId,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<AuctionRecord, LifecycleFailure>, Self::Error>> + Send;
}
