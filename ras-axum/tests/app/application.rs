use super::Permissions;
use headers::{Authorization, authorization::Bearer};
use ras_core::{
    models::{
        AuctionData, AuctionId, AuctionItemId, BidSubmission, ItemData, SubmissionId,
        SupplierIdentity, UserId,
    },
    ports::Application,
};
use ras_sqlite::{Db, config::SqliteConfig};
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

#[derive(Clone)]
pub struct TestApp {
    pub db: Db,
    clock: Arc<Mutex<OffsetDateTime>>,
}

impl TestApp {
    pub async fn open(now: OffsetDateTime) -> Self {
        Self {
            db: Db::open(&SqliteConfig::default()).await.unwrap(),
            clock: Arc::new(Mutex::new(now)),
        }
    }

    /// Move the clock every request sees.
    pub fn set_now(&self, now: OffsetDateTime) {
        *self.clock.lock().unwrap() = now;
    }

    fn permissions(&self, context: &Authorization<Bearer>) -> Option<Permissions> {
        context.0.token().parse().ok()
    }
}

impl Application for TestApp {
    // We will stuff plain-text declarations of the permissions in the token
    type Context = Authorization<Bearer>;
    type Repository = Db;

    fn database(&self) -> &Self::Repository {
        &self.db
    }

    fn now(&self) -> OffsetDateTime {
        *self.clock.lock().unwrap()
    }

    fn generate_auction_id(&self, _data: &AuctionData) -> AuctionId {
        uuid::Uuid::new_v4().into()
    }

    fn generate_item_id(&self, _data: &ItemData) -> AuctionItemId {
        uuid::Uuid::new_v4().into()
    }

    fn generate_submission_id(&self, _submission: &BidSubmission) -> SubmissionId {
        uuid::Uuid::new_v4().into()
    }

    async fn supplier_identity(&self, context: &Self::Context) -> Option<SupplierIdentity> {
        let permissions = self.permissions(context)?;
        Some(SupplierIdentity {
            supplier_id: permissions.supplier_id?,
            user_id: permissions.user_id?,
            display_name: permissions.supplier_name,
        })
    }

    async fn can_manage_auctions(&self, context: &Self::Context) -> Option<UserId> {
        self.permissions(context)
            .filter(|p| p.manager)
            .and_then(|p| p.user_id)
    }
}
