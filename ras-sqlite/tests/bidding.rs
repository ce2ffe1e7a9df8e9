mod common;

use common::{END, LIVE, TestApp, auction_data, live, submission, supplier};
use ras_core::{
    models::{
        AuctionType, BidFailure, DateTimeRangeQuery, RfqVisibility, VisibilityMode,
    },
    ports::{Application, AuctionRepository, BidRepository},
};
use ras_sqlite::config::SqliteConfig;
use rust_decimal::Decimal;
use time::{Duration, macros::datetime};

fn d(value: &str) -> Decimal {
    value.parse().unwrap()
}

#[tokio::test]
async fn test_lowest_total_ranks_first() -> anyhow::Result<()> {
    let app = TestApp::open().await?;
    let db = app.database();
    let data = auction_data(AuctionType::StandardReverse, VisibilityMode::OpenLowest);
    let seeded = live(&app, data, 2, vec![]).await?;
    let (item1, item2) = (seeded.items[0], seeded.items[1]);
    let (a, b) = (supplier(), supplier());

    let mut bid_a = submission(seeded.auction_id, a, &[(item1, "100"), (item2, "50")]);
    bid_a.supplier_name = Some("Acme".into());
    let receipt = db.submit_bid(app.generate_submission_id(&bid_a), bid_a, LIVE).await??;
    assert_eq!(receipt.bids.len(), 2);
    assert!(!receipt.extended);

    let ranking = db.get_ranking(seeded.auction_id).await?;
    assert_eq!(ranking.entries.len(), 1);
    assert_eq!(ranking.entries[0].supplier_id, a);
    assert_eq!(ranking.entries[0].rank, 1);
    assert_eq!(ranking.entries[0].total, d("150"));
    assert_eq!(ranking.entries[0].display_name.as_deref(), Some("Acme"));

    let bid_b = submission(seeded.auction_id, b, &[(item1, "90"), (item2, "50")]);
    db.submit_bid(
        app.generate_submission_id(&bid_b),
        bid_b,
        LIVE + Duration::seconds(1),
    )
    .await??;

    let ranking = db.get_ranking(seeded.auction_id).await?;
    let ranks: Vec<_> = ranking
        .entries
        .iter()
        .map(|entry| (entry.supplier_id, entry.rank, entry.total))
        .collect();
    assert_eq!(ranks, vec![(b, 1, d("140")), (a, 2, d("150"))]);

    Ok(())
}

#[tokio::test]
async fn test_incomplete_bid_leaves_ledger_untouched() -> anyhow::Result<()> {
    let app = TestApp::open().await?;
    let db = app.database();
    let data = auction_data(AuctionType::StandardReverse, VisibilityMode::OpenLowest);
    let seeded = live(&app, data, 2, vec![]).await?;
    let a = supplier();

    let full = submission(
        seeded.auction_id,
        a,
        &[(seeded.items[0], "100"), (seeded.items[1], "50")],
    );
    db.submit_bid(app.generate_submission_id(&full), full, LIVE)
        .await??;
    let before = db.get_ranking(seeded.auction_id).await?;

    let partial = submission(seeded.auction_id, a, &[(seeded.items[0], "80")]);
    let result = db
        .submit_bid(app.generate_submission_id(&partial), partial, LIVE)
        .await?;
    assert!(matches!(result, Err(BidFailure::IncompleteBid { .. })));

    assert_eq!(db.get_ledger(seeded.auction_id).await?.len(), 2);
    assert_eq!(db.get_ranking(seeded.auction_id).await?, before);

    Ok(())
}

#[tokio::test]
async fn test_revisions_append_rows() -> anyhow::Result<()> {
    let app = TestApp::open().await?;
    let db = app.database();
    let data = auction_data(AuctionType::RankedReverse, VisibilityMode::RankOnly);
    let seeded = live(&app, data, 3, vec![]).await?;
    let a = supplier();

    for (offset, amount) in [(0, "30"), (10, "20"), (20, "10")] {
        let lines: Vec<_> = seeded.items.iter().map(|id| (*id, amount)).collect();
        let bid = submission(seeded.auction_id, a, &lines);
        let receipt = db
            .submit_bid(
                app.generate_submission_id(&bid),
                bid,
                LIVE + Duration::seconds(offset),
            )
            .await??;
        // one row per auction item, every time
        assert_eq!(receipt.bids.len(), seeded.items.len());
    }

    let ledger = db.get_ledger(seeded.auction_id).await?;
    assert_eq!(ledger.len(), 9);
    assert!(ledger.windows(2).all(|pair| pair[0].seq < pair[1].seq));
    assert_eq!(ledger[0].amount, d("30"));

    let ranking = db.get_ranking(seeded.auction_id).await?;
    assert_eq!(ranking.entries[0].total, d("30"));

    // the ledger refuses in-place changes
    let update = sqlx::query("update bid set amount = '0' where seq = $1")
        .bind(ledger[0].seq)
        .execute(&db.writer)
        .await;
    assert!(update.is_err());
    let delete = sqlx::query("delete from bid where seq = $1")
        .bind(ledger[0].seq)
        .execute(&db.writer)
        .await;
    assert!(delete.is_err());
    assert_eq!(db.get_ledger(seeded.auction_id).await?, ledger);

    Ok(())
}

#[tokio::test]
async fn test_sealed_bid_single_shot() -> anyhow::Result<()> {
    let app = TestApp::open().await?;
    let db = app.database();
    let data = auction_data(AuctionType::SealedBid, VisibilityMode::Sealed);
    let seeded = live(&app, data, 1, vec![]).await?;
    let a = supplier();

    let first = submission(seeded.auction_id, a, &[(seeded.items[0], "100")]);
    db.submit_bid(app.generate_submission_id(&first), first, LIVE)
        .await??;
    assert_eq!(db.get_ledger(seeded.auction_id).await?.len(), 1);

    let second = submission(seeded.auction_id, a, &[(seeded.items[0], "1")]);
    let result = db
        .submit_bid(
            app.generate_submission_id(&second),
            second,
            LIVE + Duration::minutes(1),
        )
        .await?;
    assert_eq!(result, Err(BidFailure::SealedBidAlreadySubmitted));

    let ranking = db.get_ranking(seeded.auction_id).await?;
    assert_eq!(ranking.entries[0].total, d("100"));

    Ok(())
}

#[tokio::test]
async fn test_late_bid_extends_end_once() -> anyhow::Result<()> {
    let app = TestApp::open().await?;
    let db = app.database();
    let mut data = auction_data(AuctionType::StandardReverse, VisibilityMode::OpenLowest);
    data.config.auto_extend_enabled = true;
    data.config.auto_extend_window_seconds = 60;
    data.config.auto_extend_minutes = 5;
    let seeded = live(&app, data, 1, vec![]).await?;

    let bid = submission(seeded.auction_id, supplier(), &[(seeded.items[0], "10")]);
    let receipt = db
        .submit_bid(
            app.generate_submission_id(&bid),
            bid,
            END - Duration::seconds(30),
        )
        .await??;
    assert!(receipt.extended);
    assert_eq!(receipt.end_at, Some(datetime!(2026-01-02 12:05 UTC)));

    let auction = db.get_auction(seeded.auction_id).await?.unwrap();
    assert_eq!(auction.end_at, Some(datetime!(2026-01-02 12:05 UTC)));

    // bidding is still open after the original end
    let late = submission(seeded.auction_id, supplier(), &[(seeded.items[0], "9")]);
    let receipt = db
        .submit_bid(
            app.generate_submission_id(&late),
            late,
            END + Duration::minutes(1),
        )
        .await??;
    assert!(!receipt.extended);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_late_bids_extend_once() -> anyhow::Result<()> {
    let app = TestApp::open().await?;
    let db = app.database();
    let mut data = auction_data(AuctionType::StandardReverse, VisibilityMode::OpenLowest);
    data.config.auto_extend_enabled = true;
    data.config.auto_extend_window_seconds = 60;
    data.config.auto_extend_minutes = 5;
    let seeded = live(&app, data, 1, vec![]).await?;

    let first = submission(seeded.auction_id, supplier(), &[(seeded.items[0], "10")]);
    let second = submission(seeded.auction_id, supplier(), &[(seeded.items[0], "11")]);
    let (first_id, second_id) = (
        app.generate_submission_id(&first),
        app.generate_submission_id(&second),
    );

    let (db1, db2) = (db.clone(), db.clone());
    let (r1, r2) = tokio::join!(
        tokio::spawn(async move { db1.submit_bid(first_id, first, END - Duration::seconds(30)).await }),
        tokio::spawn(async move { db2.submit_bid(second_id, second, END - Duration::seconds(20)).await }),
    );
    let (r1, r2) = (r1???, r2???);

    assert_eq!(
        [r1.extended, r2.extended].iter().filter(|x| **x).count(),
        1
    );
    let auction = db.get_auction(seeded.auction_id).await?.unwrap();
    assert_eq!(auction.end_at, Some(END + Duration::minutes(5)));
    assert_eq!(db.get_ledger(seeded.auction_id).await?.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_bids_outside_the_window_are_rejected() -> anyhow::Result<()> {
    let app = TestApp::open().await?;
    let db = app.database();
    let data = auction_data(AuctionType::StandardReverse, VisibilityMode::OpenLowest);
    let seeded = live(&app, data, 1, vec![]).await?;

    for at in [
        datetime!(2026-01-02 09:59 UTC),
        END + Duration::seconds(1),
    ] {
        let bid = submission(seeded.auction_id, supplier(), &[(seeded.items[0], "10")]);
        let result = db
            .submit_bid(app.generate_submission_id(&bid), bid, at)
            .await?;
        assert_eq!(result, Err(BidFailure::AuctionNotOpen));
    }

    // exactly at the end is still open
    let bid = submission(seeded.auction_id, supplier(), &[(seeded.items[0], "10")]);
    db.submit_bid(app.generate_submission_id(&bid), bid, END)
        .await??;

    db.archive_auction(seeded.auction_id, LIVE).await??;
    let bid = submission(seeded.auction_id, supplier(), &[(seeded.items[0], "10")]);
    let result = db
        .submit_bid(app.generate_submission_id(&bid), bid, LIVE)
        .await?;
    assert_eq!(result, Err(BidFailure::AuctionNotOpen));

    // archival keeps history
    assert_eq!(db.get_ledger(seeded.auction_id).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_uninvited_supplier_is_not_authorized() -> anyhow::Result<()> {
    let app = TestApp::open().await?;
    let db = app.database();
    let invited = supplier();
    let mut data = auction_data(AuctionType::StandardReverse, VisibilityMode::RankOnly);
    if let Some(rfq) = data.rfq.as_mut() {
        rfq.visibility = RfqVisibility::Invited;
    }
    let seeded = live(&app, data, 1, vec![invited]).await?;

    let outsider = submission(seeded.auction_id, supplier(), &[(seeded.items[0], "10")]);
    let result = db
        .submit_bid(app.generate_submission_id(&outsider), outsider, LIVE)
        .await?;
    assert_eq!(result, Err(BidFailure::NotAuthorized));

    let insider = submission(seeded.auction_id, invited, &[(seeded.items[0], "10")]);
    db.submit_bid(app.generate_submission_id(&insider), insider, LIVE)
        .await??;

    Ok(())
}

#[tokio::test]
async fn test_bid_history_pages_newest_first() -> anyhow::Result<()> {
    let app = TestApp::open().await?;
    let db = app.database();
    let data = auction_data(AuctionType::StandardReverse, VisibilityMode::OpenLowest);
    let seeded = live(&app, data, 2, vec![]).await?;
    let a = supplier();

    for (offset, amount) in [(0, "30"), (10, "20"), (20, "10")] {
        let lines: Vec<_> = seeded.items.iter().map(|id| (*id, amount)).collect();
        let bid = submission(seeded.auction_id, a, &lines);
        db.submit_bid(
            app.generate_submission_id(&bid),
            bid,
            LIVE + Duration::seconds(offset),
        )
        .await??;
    }
    // someone else's bids never show up
    let other = submission(
        seeded.auction_id,
        supplier(),
        &[(seeded.items[0], "1"), (seeded.items[1], "1")],
    );
    db.submit_bid(app.generate_submission_id(&other), other, LIVE)
        .await??;

    // a limit of 3 would split a submission, so the page stops at 2
    let page = db
        .get_bid_history(seeded.auction_id, a, DateTimeRangeQuery::default(), 3)
        .await?;
    assert_eq!(page.results.len(), 2);
    assert!(page.results.iter().all(|bid| bid.amount == d("10")));
    let more = page.more.expect("more pages");

    let page = db.get_bid_history(seeded.auction_id, a, more, 3).await?;
    assert_eq!(page.results.len(), 2);
    assert!(page.results.iter().all(|bid| bid.amount == d("20")));
    let more = page.more.expect("more pages");

    let page = db.get_bid_history(seeded.auction_id, a, more, 3).await?;
    assert_eq!(page.results.len(), 2);
    assert!(page.results.iter().all(|bid| bid.amount == d("30")));
    assert!(page.more.is_none());

    // a limit smaller than a submission still returns the whole submission
    let page = db
        .get_bid_history(seeded.auction_id, a, DateTimeRangeQuery::default(), 1)
        .await?;
    assert_eq!(page.results.len(), 2);
    assert!(page.results.iter().all(|bid| bid.amount == d("10")));

    Ok(())
}

#[tokio::test]
async fn test_timed_out_submission_is_rolled_back() -> anyhow::Result<()> {
    let app = TestApp::with_config(&SqliteConfig {
        submit_timeout: std::time::Duration::from_millis(100),
        ..Default::default()
    })
    .await?;
    let db = app.database();
    let data = auction_data(AuctionType::StandardReverse, VisibilityMode::OpenLowest);
    let seeded = live(&app, data, 1, vec![]).await?;

    // hold the only writer connection so the submission cannot get started
    let blocker = db.writer.begin().await?;
    let bid = submission(seeded.auction_id, supplier(), &[(seeded.items[0], "100")]);
    let result = db.submit_bid(app.generate_submission_id(&bid), bid, LIVE).await;
    assert!(matches!(
        result,
        Err(sqlx::Error::Io(ref err)) if err.kind() == std::io::ErrorKind::TimedOut
    ));
    blocker.rollback().await?;

    assert!(db.get_ledger(seeded.auction_id).await?.is_empty());

    // once the store is free again, submissions go through
    let bid = submission(seeded.auction_id, supplier(), &[(seeded.items[0], "90")]);
    db.submit_bid(app.generate_submission_id(&bid), bid, LIVE)
        .await??;
    assert_eq!(db.get_ledger(seeded.auction_id).await?.len(), 1);

    Ok(())
}
