//! Application implementation with JWT-based identity.
//!
//! This module provides the concrete implementation of the Application trait,
//! connecting the SQLite store to the HTTP server and deriving supplier and
//! manager identities from HS256-signed JWTs.

use headers::{Authorization, authorization::Bearer};
use jwt_simple::{
    claims::JWTClaims,
    prelude::{HS256Key, MACLike},
};
use rand::RngCore;
use ras_core::{
    models::{
        AuctionData, AuctionId, AuctionItemId, BidSubmission, ItemData, SubmissionId, SupplierId,
        SupplierIdentity, UserId,
    },
    ports::Application,
};
use ras_sqlite::Db;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{Level, event};
use uuid::Uuid;

/// Namespace nibble of auction ids
const AUCTION_NAMESPACE: u64 = 0xA;
/// Namespace nibble of auction item ids
const ITEM_NAMESPACE: u64 = 0xB;
/// Namespace nibble of submission ids
const SUBMISSION_NAMESPACE: u64 = 0x9;

/// Main application implementation combining all system components.
///
/// This struct implements the Application trait and provides the integration point
/// for the database and identity. It uses JWT tokens to identify callers.
#[derive(Clone)]
pub struct DemoApp {
    /// Database connection for persistent storage
    pub db: Db,
    /// HMAC key for JWT token verification
    pub key: HS256Key,
}

impl DemoApp {
    /// Extract and verify JWT claims from the authorization header.
    fn claims(&self, context: &Authorization<Bearer>) -> Option<JWTClaims<CustomJWTClaims>> {
        let token = context.0.token();
        match self.key.verify_token::<CustomJWTClaims>(token, None) {
            Ok(claims) => Some(claims),
            Err(error) => {
                event!(Level::DEBUG, %error, "rejected bearer token");
                None
            }
        }
    }
}

/// A time-ordered UUIDv8 tagged with an entity namespace.
///
/// The unix timestamp is split into (48, 12, 4) bits around the version and
/// variant fields; the namespace nibble shares its top two bits with the
/// variant, so only namespaces 0x8 through 0xB are valid.
fn timestamped_id(namespace: u64, now: OffsetDateTime) -> Uuid {
    let rng56 = rand::rng().next_u64() >> 8; // 56 random bits

    let now = now.unix_timestamp() as u64;
    let now48 = 0xffff_ffff_ffff_0000 & now;
    let now12 = (0xfff0 & now) >> 4;
    let now04 = (0x000f & now) << 56;

    let hi = 0x0000_0000_0000_8000 | now48 | now12;
    let lo = (namespace << 60) | now04 | rng56;
    Uuid::from_u64_pair(hi, lo)
}

impl Application for DemoApp {
    type Context = Authorization<Bearer>;
    type Repository = Db;

    fn database(&self) -> &Self::Repository {
        &self.db
    }

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn generate_auction_id(&self, _data: &AuctionData) -> AuctionId {
        timestamped_id(AUCTION_NAMESPACE, self.now()).into()
    }

    fn generate_item_id(&self, _data: &ItemData) -> AuctionItemId {
        timestamped_id(ITEM_NAMESPACE, self.now()).into()
    }

    fn generate_submission_id(&self, _submission: &BidSubmission) -> SubmissionId {
        timestamped_id(SUBMISSION_NAMESPACE, self.now()).into()
    }

    async fn supplier_identity(&self, context: &Self::Context) -> Option<SupplierIdentity> {
        // The standard sub: claim is the user, the custom claims name the supplier
        let claims = self.claims(context)?;
        Some(SupplierIdentity {
            supplier_id: claims.custom.supplier_id?,
            user_id: claims.subject?.parse().ok()?,
            display_name: claims.custom.supplier_name,
        })
    }

    async fn can_manage_auctions(&self, context: &Self::Context) -> Option<UserId> {
        // managing auctions requires a `manager: true` custom claim
        let claims = self.claims(context)?;
        if claims.custom.manager {
            claims.subject?.parse().ok()
        } else {
            None
        }
    }
}

/// Custom claims structure for JWT tokens.
///
/// Contains application-specific claims beyond standard JWT claims.
#[derive(Serialize, Deserialize, Default)]
pub struct CustomJWTClaims {
    /// The supplier the token holder bids for
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
    /// The supplier's display name
    #[serde(default)]
    pub supplier_name: Option<String>,
    /// Whether the token holder may create and administer auctions
    #[serde(default)]
    pub manager: bool,
}
