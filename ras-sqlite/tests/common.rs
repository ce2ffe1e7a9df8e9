#![allow(dead_code)]

use ras_core::{
    models::{
        AuctionConfig, AuctionData, AuctionId, AuctionItemId, AuctionType, BidLine,
        BidSubmission, ItemData, RfqId, RfqLink, RfqVisibility, SubmissionId, SupplierId,
        SupplierIdentity, UserId, VisibilityMode,
    },
    ports::{Application, AuctionRepository},
};
use ras_sqlite::{Db, config::SqliteConfig};
use time::{OffsetDateTime, macros::datetime};

/// When test auctions are created and published
pub const CREATED: OffsetDateTime = datetime!(2026-01-01 09:00 UTC);
/// When bidding opens
pub const START: OffsetDateTime = datetime!(2026-01-02 10:00 UTC);
/// When bidding closes
pub const END: OffsetDateTime = datetime!(2026-01-02 12:00 UTC);
/// Somewhere in the middle of the bidding window
pub const LIVE: OffsetDateTime = datetime!(2026-01-02 11:00 UTC);

pub struct TestApp(pub Db);

impl TestApp {
    pub async fn open() -> anyhow::Result<Self> {
        Self::with_config(&SqliteConfig::default()).await
    }

    pub async fn with_config(config: &SqliteConfig) -> anyhow::Result<Self> {
        Ok(Self(Db::open(config).await?))
    }
}

impl Application for TestApp {
    type Context = ();
    type Repository = Db;

    fn database(&self) -> &Self::Repository {
        &self.0
    }

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
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

    async fn supplier_identity(&self, _context: &Self::Context) -> Option<SupplierIdentity> {
        None
    }

    async fn can_manage_auctions(&self, _context: &Self::Context) -> Option<UserId> {
        None
    }
}

pub fn supplier() -> SupplierId {
    uuid::Uuid::new_v4().into()
}

pub fn buyer() -> UserId {
    uuid::Uuid::new_v4().into()
}

pub fn auction_data(auction_type: AuctionType, visibility: VisibilityMode) -> AuctionData {
    AuctionData {
        auction_type,
        currency: "USD".into(),
        visibility,
        start_at: Some(START),
        end_at: Some(END),
        config: AuctionConfig::default(),
        rfq: Some(RfqLink {
            rfq_id: RfqId(uuid::Uuid::new_v4()),
            visibility: RfqVisibility::Public,
        }),
    }
}

pub fn item_data(description: &str) -> ItemData {
    ItemData {
        description: description.into(),
        quantity: "10".parse().unwrap(),
        unit_of_measure: "ea".into(),
        rfq_item_id: None,
    }
}

pub struct Seeded {
    pub auction_id: AuctionId,
    pub items: Vec<AuctionItemId>,
}

/// Create a draft auction with `item_count` items and the given invitations.
pub async fn draft(
    app: &TestApp,
    data: AuctionData,
    item_count: usize,
    suppliers: Vec<SupplierId>,
) -> anyhow::Result<Seeded> {
    let auction_id = app.generate_auction_id(&data);
    let items: Vec<_> = (0..item_count)
        .map(|n| {
            let item = item_data(&format!("item {n}"));
            (app.generate_item_id(&item), item)
        })
        .collect();
    let item_ids = items.iter().map(|(id, _)| *id).collect();

    app.database()
        .create_auction(auction_id, buyer(), data, items, suppliers, CREATED)
        .await??;

    Ok(Seeded {
        auction_id,
        items: item_ids,
    })
}

/// Create and publish an auction that is open for bidding at [`LIVE`].
pub async fn live(
    app: &TestApp,
    data: AuctionData,
    item_count: usize,
    suppliers: Vec<SupplierId>,
) -> anyhow::Result<Seeded> {
    let seeded = draft(app, data, item_count, suppliers).await?;
    app.database()
        .publish_auction(seeded.auction_id, CREATED)
        .await??;
    Ok(seeded)
}

pub fn submission(
    auction_id: AuctionId,
    supplier_id: SupplierId,
    lines: &[(AuctionItemId, &str)],
) -> BidSubmission {
    BidSubmission {
        auction_id,
        supplier_id,
        supplier_name: None,
        placed_by: uuid::Uuid::new_v4().into(),
        currency: "USD".into(),
        lines: lines
            .iter()
            .map(|(auction_item_id, amount)| BidLine {
                auction_item_id: *auction_item_id,
                amount: (*amount).into(),
            })
            .collect(),
        metadata: None,
    }
}
