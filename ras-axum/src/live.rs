//! Live ranking updates over server-sent events.
//!
//! Every auction with at least one subscriber has a topic: a `watch` channel
//! holding the latest unfiltered [`LiveState`]. Subscribers project each state
//! for their own supplier identity before it is serialized, so the only data
//! that crosses the wire is what [`Projection`] allows that supplier to see.

use crate::{ApiApplication, access::participation, auction_routes::AuctionPath, error::ApiError};
use axum::{
    Extension,
    extract::{Path, State},
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use ras_core::{
    models::{
        AuctionId, AuctionPhase, AuctionRecord, Projection, RankingSnapshot, SupplierId,
    },
    ports::{Application, BidRepository as _},
};
use rustc_hash::FxBuildHasher;
use serde::Serialize;
use std::{convert::Infallible, sync::Arc};
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio_stream::{Stream, StreamExt as _, wrappers::WatchStream};

/// The unfiltered state of an auction, as held by its topic.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveState {
    /// The auction, including its current `end_at` and status
    pub auction: AuctionRecord,
    /// The ranking as of the latest accepted bid
    pub snapshot: RankingSnapshot,
}

impl LiveState {
    fn supersedes(&self, other: &Self) -> bool {
        (self.snapshot.as_of_seq, self.auction.updated_at)
            > (other.snapshot.as_of_seq, other.auction.updated_at)
    }

    /// What `viewer` may see of this state at time `now`.
    pub fn project(&self, viewer: SupplierId, now: OffsetDateTime) -> LiveUpdate {
        let phase = self.auction.phase(now);
        LiveUpdate {
            auction_id: self.auction.id,
            phase,
            end_at: self.auction.end_at,
            projection: Projection::project(self.auction.visibility, phase, &self.snapshot, viewer),
        }
    }
}

/// The payload of a `ranking` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveUpdate {
    /// The auction
    pub auction_id: AuctionId,
    /// Where the auction is in its lifetime
    pub phase: AuctionPhase,
    /// When bidding closes, after any auto-extension
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_at: Option<OffsetDateTime>,
    /// The subscriber's view of the ranking
    pub projection: Projection,
}

/// The registry of per-auction topics.
#[derive(Default)]
pub struct LiveChannel {
    topics: dashmap::DashMap<AuctionId, watch::Sender<Arc<LiveState>>, FxBuildHasher>,
}

impl LiveChannel {
    /// Subscribe to an auction, seeding its topic with `state` if it is newer
    /// than what the topic holds.
    pub fn subscribe(&self, state: LiveState) -> watch::Receiver<Arc<LiveState>> {
        match self.topics.entry(state.auction.id) {
            dashmap::Entry::Occupied(entry) => {
                let sender = entry.get();
                sender.send_if_modified(|current| {
                    if state.supersedes(current) {
                        *current = Arc::new(state);
                        true
                    } else {
                        false
                    }
                });
                sender.subscribe()
            }
            dashmap::Entry::Vacant(entry) => {
                let (sender, receiver) = watch::channel(Arc::new(state));
                entry.insert(sender);
                receiver
            }
        }
    }

    /// Push a new state to every subscriber of its auction.
    ///
    /// Auctions nobody is watching have no topic and are skipped; a topic
    /// whose subscribers have all gone is removed. A state older than the one
    /// the topic holds is dropped, so concurrent publishers cannot roll the
    /// topic back.
    pub fn publish(&self, state: LiveState) {
        let auction_id = state.auction.id;
        if let dashmap::Entry::Occupied(entry) = self.topics.entry(auction_id) {
            if entry.get().receiver_count() == 0 {
                entry.remove();
                tracing::debug!(%auction_id, "pruned live topic");
            } else {
                entry.get().send_if_modified(|current| {
                    if state.supersedes(current) {
                        *current = Arc::new(state);
                        true
                    } else {
                        false
                    }
                });
            }
        }
    }
}

fn render(update: &LiveUpdate) -> Event {
    Event::default()
        .event("ranking")
        .json_data(update)
        .unwrap_or_else(|err| {
            tracing::error!(err = err.to_string(), "unable to serialize live update");
            Event::default().comment("")
        })
}

/// Load the current state of an auction and hand it to the live channel.
pub(crate) async fn publish_current<T: ApiApplication>(
    app: &T,
    live: &LiveChannel,
    auction: AuctionRecord,
) {
    match app.database().get_ranking(auction.id).await {
        Ok(snapshot) => live.publish(LiveState { auction, snapshot }),
        Err(err) => {
            tracing::warn!(auction_id = %auction.id, err = err.to_string(), "skipped live update");
        }
    }
}

/// Stream the caller's view of an auction's ranking.
///
/// The first event carries the current state; later events follow every
/// accepted bid, publish and archive. Requires a supplier identity that may
/// participate in the auction.
pub(crate) async fn live_stream<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(AuctionPath { auction_id }): Path<AuctionPath>,
    Extension(live): Extension<Arc<LiveChannel>>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let (identity, auction) = participation(&app, &auth, auction_id).await?;
    let snapshot = app
        .database()
        .get_ranking(auction_id)
        .await
        .map_err(ApiError::transient)?;

    let viewer = identity.supplier_id;
    let receiver = live.subscribe(LiveState { auction, snapshot });
    let stream = WatchStream::new(receiver)
        .map(move |state| Ok::<_, Infallible>(render(&state.project(viewer, app.now()))));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ras_core::models::{
        AuctionItemId, AuctionStatus, AuctionType, BidRecord, Map, SubmissionId, UserId,
        VisibilityMode,
    };
    use time::{Duration, macros::datetime};
    use uuid::Uuid;

    const A: SupplierId = SupplierId(Uuid::from_u128(0xA));
    const B: SupplierId = SupplierId(Uuid::from_u128(0xB));
    const NOW: OffsetDateTime = datetime!(2026-01-02 11:00 UTC);

    fn auction(visibility: VisibilityMode) -> AuctionRecord {
        let created = datetime!(2026-01-01 09:00 UTC);
        AuctionRecord {
            id: AuctionId(Uuid::from_u128(1)),
            auction_type: AuctionType::StandardReverse,
            status: AuctionStatus::Published,
            currency: "USD".into(),
            visibility,
            start_at: Some(datetime!(2026-01-02 10:00 UTC)),
            end_at: Some(datetime!(2026-01-02 12:00 UTC)),
            config: Default::default(),
            rfq: None,
            created_by: UserId(Uuid::nil()),
            created_at: created,
            updated_at: created,
            published_at: Some(created),
            archived_at: None,
        }
    }

    fn snapshot(bids: &[(SupplierId, &str)]) -> RankingSnapshot {
        let ledger: Vec<BidRecord> = bids
            .iter()
            .enumerate()
            .map(|(n, (supplier_id, amount))| BidRecord {
                seq: n as i64 + 1,
                submission_id: SubmissionId(Uuid::from_u128(n as u128)),
                auction_id: AuctionId(Uuid::from_u128(1)),
                auction_item_id: AuctionItemId(Uuid::from_u128(7)),
                supplier_id: *supplier_id,
                amount: amount.parse().unwrap(),
                currency: "USD".into(),
                placed_by: UserId(Uuid::nil()),
                created_at: NOW - Duration::minutes(10) + Duration::seconds(n as i64),
                metadata: None,
            })
            .collect();
        let names: Map<SupplierId, String> = [(B, "Bolt & Nut".to_owned())].into_iter().collect();
        RankingSnapshot::compute(&ledger, &names)
    }

    #[test]
    fn test_subscribers_converge_on_latest() {
        let channel = LiveChannel::default();
        let mut receiver = channel.subscribe(LiveState {
            auction: auction(VisibilityMode::OpenLowest),
            snapshot: RankingSnapshot::default(),
        });
        assert_eq!(channel.topics.len(), 1);

        let history = [(A, "30"), (A, "20"), (A, "10")];
        for len in 1..=history.len() {
            channel.publish(LiveState {
                auction: auction(VisibilityMode::OpenLowest),
                snapshot: snapshot(&history[..len]),
            });
        }

        assert!(receiver.has_changed().unwrap());
        let latest = receiver.borrow_and_update().clone();
        assert_eq!(latest.snapshot.entries[0].total, "10".parse().unwrap());
    }

    #[test]
    fn test_stale_seed_does_not_overwrite() {
        let channel = LiveChannel::default();
        let _first = channel.subscribe(LiveState {
            auction: auction(VisibilityMode::OpenLowest),
            snapshot: snapshot(&[(A, "30"), (A, "20")]),
        });
        let second = channel.subscribe(LiveState {
            auction: auction(VisibilityMode::OpenLowest),
            snapshot: snapshot(&[(A, "30")]),
        });
        assert_eq!(second.borrow().snapshot.as_of_seq, Some(2));
    }

    #[test]
    fn test_late_publish_of_older_state_is_dropped() {
        let channel = LiveChannel::default();
        let mut receiver = channel.subscribe(LiveState {
            auction: auction(VisibilityMode::OpenLowest),
            snapshot: RankingSnapshot::default(),
        });

        channel.publish(LiveState {
            auction: auction(VisibilityMode::OpenLowest),
            snapshot: snapshot(&[(A, "30"), (B, "20")]),
        });
        receiver.borrow_and_update();

        // a handler that computed its snapshot earlier publishes last
        channel.publish(LiveState {
            auction: auction(VisibilityMode::OpenLowest),
            snapshot: snapshot(&[(A, "30")]),
        });

        assert!(!receiver.has_changed().unwrap());
        assert_eq!(receiver.borrow().snapshot.as_of_seq, Some(2));

        // a newer auction record at the same ledger position still goes out
        let mut archived = auction(VisibilityMode::OpenLowest);
        archived.status = AuctionStatus::Archived;
        archived.updated_at += Duration::hours(1);
        channel.publish(LiveState {
            auction: archived,
            snapshot: snapshot(&[(A, "30"), (B, "20")]),
        });
        assert!(receiver.has_changed().unwrap());
        assert_eq!(receiver.borrow().auction.status, AuctionStatus::Archived);
    }

    #[test]
    fn test_abandoned_topics_are_pruned() {
        let channel = LiveChannel::default();
        let state = LiveState {
            auction: auction(VisibilityMode::OpenLowest),
            snapshot: RankingSnapshot::default(),
        };

        // nobody watching, nothing to publish to
        channel.publish(state.clone());
        assert_eq!(channel.topics.len(), 0);

        let receiver = channel.subscribe(state.clone());
        drop(receiver);
        channel.publish(state);
        assert_eq!(channel.topics.len(), 0);
    }

    #[test]
    fn test_events_are_projected_per_subscriber() {
        let state = LiveState {
            auction: auction(VisibilityMode::RankOnly),
            snapshot: snapshot(&[(A, "100"), (B, "90")]),
        };

        let update = state.project(A, NOW);
        assert_eq!(update.phase, AuctionPhase::Live);
        let payload = serde_json::to_string(&update).unwrap();
        assert!(payload.contains(r#""mode":"rank_only""#));
        assert!(!payload.contains(&B.to_string()));
        assert!(!payload.contains("Bolt & Nut"));
        assert!(!payload.contains("90"));

        let open = LiveState {
            auction: auction(VisibilityMode::OpenLowest),
            ..state
        };
        let payload = serde_json::to_string(&open.project(A, NOW)).unwrap();
        assert!(payload.contains("Bolt & Nut"));
    }
}
