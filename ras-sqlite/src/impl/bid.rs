use super::{fetch_auction, fetch_items, is_invited};
use crate::{
    Db,
    types::{Amount, BidRow, DateTime},
};
use ras_core::{
    models::{
        AuctionId, BidFailure, BidRecord, BidSubmission, DateTimeRangeQuery,
        DateTimeRangeResponse, Map, SubmissionContext, SubmissionId, SubmissionReceipt,
        SupplierId,
    },
    ports::BidRepository,
};
use sqlx::{Sqlite, SqliteConnection, Transaction, types::Json};
use std::io;
use time::{Duration, OffsetDateTime};

async fn has_any_bid(
    conn: &mut SqliteConnection,
    auction_id: AuctionId,
    supplier_id: SupplierId,
) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(
        "select count(*) from bid where auction_id = $1 and supplier_id = $2",
    )
    .bind(auction_id)
    .bind(supplier_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count > 0)
}

impl Db {
    /// Validate and append a submission, leaving the transaction open.
    ///
    /// Dropping the returned future (or the transaction) rolls everything back.
    async fn stage_submission(
        &self,
        submission_id: SubmissionId,
        submission: BidSubmission,
        as_of: OffsetDateTime,
    ) -> Result<Result<(Transaction<'static, Sqlite>, SubmissionReceipt), BidFailure>, sqlx::Error>
    {
        let auction_id = submission.auction_id;
        let supplier_id = submission.supplier_id;

        // Everything below happens on the single writer connection, so the
        // validation sees exactly the state the rows are appended to.
        let mut tx = self.writer.begin().await?;

        let Some(auction) = fetch_auction(&mut *tx, auction_id).await? else {
            return Ok(Err(BidFailure::AuctionNotOpen));
        };
        let items = fetch_items(&mut *tx, auction_id).await?;
        let has_prior_bids = has_any_bid(&mut tx, auction_id, supplier_id).await?;
        let invited = is_invited(&mut *tx, auction_id, supplier_id).await?;

        let lines = match submission.validate(SubmissionContext {
            auction: Some(&auction),
            items: &items,
            has_prior_bids,
            is_invited: invited,
            now: as_of,
        }) {
            Ok(lines) => lines,
            Err(failure) => {
                tracing::debug!(%auction_id, %supplier_id, %failure, "submission rejected");
                return Ok(Err(failure));
            }
        };

        let mut bids = Vec::with_capacity(lines.len());
        for line in lines {
            let row = sqlx::query_as::<_, BidRow>(
                r#"
                insert into
                    bid (
                        submission_id, auction_id, auction_item_id, supplier_id,
                        amount, currency, placed_by, created_at, metadata
                    )
                values
                    ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                returning
                    *
                "#,
            )
            .bind(submission_id)
            .bind(auction_id)
            .bind(line.auction_item_id)
            .bind(supplier_id)
            .bind(Amount(line.amount))
            .bind(&auction.currency)
            .bind(submission.placed_by)
            .bind(DateTime(as_of))
            .bind(submission.metadata.as_ref().map(Json))
            .fetch_one(&mut *tx)
            .await?;
            bids.push(BidRecord::from(row));
        }

        if let Some(display_name) = submission.supplier_name.as_deref() {
            sqlx::query(
                r#"
                insert into
                    supplier (id, display_name, updated_at)
                values
                    ($1, $2, $3)
                on conflict (id)
                    do update set display_name = excluded.display_name, updated_at = excluded.updated_at
                "#,
            )
            .bind(supplier_id)
            .bind(display_name)
            .bind(DateTime(as_of))
            .execute(&mut *tx)
            .await?;
        }

        // Auto-extension: compare-and-swap on the observed end_at. If another
        // writer moved it first, re-read and re-evaluate against the new value.
        let mut observed = auction;
        let mut extended = false;
        while let Some(new_end_at) = observed.auto_extension(as_of) {
            let swapped = sqlx::query(
                r#"
                update
                    auction
                set
                    end_at = $2,
                    updated_at = $3
                where
                    id = $1
                and
                    end_at = $4
                "#,
            )
            .bind(auction_id)
            .bind(DateTime(new_end_at))
            .bind(DateTime(as_of))
            .bind(observed.end_at.map(DateTime))
            .execute(&mut *tx)
            .await?
            .rows_affected()
                == 1;

            if swapped {
                tracing::info!(
                    %auction_id,
                    from = ?observed.end_at,
                    to = %new_end_at,
                    "auto-extended auction"
                );
                observed.end_at = Some(new_end_at);
                extended = true;
                break;
            }

            observed.end_at =
                sqlx::query_scalar::<_, Option<DateTime>>("select end_at from auction where id = $1")
                    .bind(auction_id)
                    .fetch_one(&mut *tx)
                    .await?
                    .map(Into::into);
        }

        Ok(Ok((
            tx,
            SubmissionReceipt {
                submission_id,
                bids,
                end_at: observed.end_at,
                extended,
            },
        )))
    }
}

impl BidRepository for Db {
    async fn submit_bid(
        &self,
        submission_id: SubmissionId,
        submission: BidSubmission,
        as_of: OffsetDateTime,
    ) -> Result<Result<SubmissionReceipt, BidFailure>, Self::Error> {
        let auction_id = submission.auction_id;
        let supplier_id = submission.supplier_id;

        // Only validation and the appends are bounded; once staged, the
        // commit runs to completion so the caller never misreports its outcome.
        let staged = tokio::time::timeout(
            self.submit_timeout,
            self.stage_submission(submission_id, submission, as_of),
        )
        .await
        .map_err(|_| {
            tracing::warn!(
                %auction_id,
                %supplier_id,
                timeout = ?self.submit_timeout,
                "bid submission timed out"
            );
            sqlx::Error::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                "bid submission timed out",
            ))
        })??;

        let (tx, receipt) = match staged {
            Ok(staged) => staged,
            Err(failure) => return Ok(Err(failure)),
        };
        tx.commit().await?;

        tracing::info!(
            %auction_id,
            %supplier_id,
            %submission_id,
            lines = receipt.bids.len(),
            "accepted bid"
        );

        Ok(Ok(receipt))
    }

    async fn get_ledger(&self, auction_id: AuctionId) -> Result<Vec<BidRecord>, Self::Error> {
        let rows = sqlx::query_as::<_, BidRow>(
            "select * from bid where auction_id = $1 order by seq",
        )
        .bind(auction_id)
        .fetch_all(&self.reader)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_supplier_names(
        &self,
        auction_id: AuctionId,
    ) -> Result<Map<SupplierId, String>, Self::Error> {
        let rows = sqlx::query_as::<_, (SupplierId, String)>(
            r#"
            select
                id, display_name
            from
                supplier
            where
                id in (select distinct supplier_id from bid where auction_id = $1)
            order by
                id
            "#,
        )
        .bind(auction_id)
        .fetch_all(&self.reader)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn get_bid_history(
        &self,
        auction_id: AuctionId,
        supplier_id: SupplierId,
        query: DateTimeRangeQuery,
        limit: usize,
    ) -> Result<DateTimeRangeResponse<BidRecord>, Self::Error> {
        let limit_p1 = (limit + 1) as i64;
        let mut rows: Vec<BidRecord> = sqlx::query_as::<_, BidRow>(
            r#"
            select
                *
            from
                bid
            where
                auction_id = $1
            and
                supplier_id = $2
            and
                ($3 is null or created_at >= $3)
            and
                ($4 is null or created_at < $4)
            order by
                created_at desc, seq desc
            limit $5
            "#,
        )
        .bind(auction_id)
        .bind(supplier_id)
        .bind(query.after.map(DateTime))
        .bind(query.before.map(DateTime))
        .bind(limit_p1) // +1 to check if there are more results
        .fetch_all(&self.reader)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

        if rows.len() <= limit {
            return Ok(DateTimeRangeResponse {
                results: rows,
                more: None,
            });
        }

        // Rows of one submission share a timestamp, and the cursor is a
        // timestamp, so a page never ends partway through a timestamp.
        let boundary = rows[limit].created_at;
        rows.retain(|bid| bid.created_at != boundary);

        if rows.is_empty() {
            // The whole page is a single timestamp: return all of it.
            let rows = sqlx::query_as::<_, BidRow>(
                r#"
                select
                    *
                from
                    bid
                where
                    auction_id = $1
                and
                    supplier_id = $2
                and
                    created_at = $3
                order by
                    seq desc
                "#,
            )
            .bind(auction_id)
            .bind(supplier_id)
            .bind(DateTime(boundary))
            .fetch_all(&self.reader)
            .await?;

            return Ok(DateTimeRangeResponse {
                results: rows.into_iter().map(Into::into).collect(),
                more: Some(DateTimeRangeQuery {
                    before: Some(boundary),
                    after: query.after,
                }),
            });
        }

        Ok(DateTimeRangeResponse {
            results: rows,
            more: Some(DateTimeRangeQuery {
                before: Some(boundary + Duration::nanoseconds(1)),
                after: query.after,
            }),
        })
    }
}
