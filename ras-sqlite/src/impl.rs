//! Repository trait implementations for the SQLite database.
//!
//! This module contains the implementations of the repository traits defined in
//! `ras-core` for the SQLite database backend, plus the queries they share.

use crate::{
    Db,
    types::{AuctionRow, ItemRow},
};
use ras_core::{
    models::{AuctionId, AuctionItem, AuctionRecord, LifecycleFailure, SupplierId},
    ports::Repository,
};
use sqlx::{Sqlite, SqliteConnection};

mod auction;
mod bid;

impl Repository for Db {
    type Error = sqlx::Error;
}

pub(crate) async fn fetch_auction<'c, E>(
    executor: E,
    auction_id: AuctionId,
) -> Result<Option<AuctionRecord>, sqlx::Error>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, AuctionRow>("select * from auction where id = $1")
        .bind(auction_id)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(Into::into))
}

pub(crate) async fn fetch_items<'c, E>(
    executor: E,
    auction_id: AuctionId,
) -> Result<Vec<AuctionItem>, sqlx::Error>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, ItemRow>(
        r#"
        select
            id, auction_id, description, quantity, unit_of_measure, rfq_item_id
        from
            auction_item
        where
            auction_id = $1
        order by
            rowid
        "#,
    )
    .bind(auction_id)
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub(crate) async fn is_invited<'c, E>(
    executor: E,
    auction_id: AuctionId,
    supplier_id: SupplierId,
) -> Result<bool, sqlx::Error>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let count = sqlx::query_scalar::<_, i64>(
        "select count(*) from auction_supplier where auction_id = $1 and supplier_id = $2",
    )
    .bind(auction_id)
    .bind(supplier_id)
    .fetch_one(executor)
    .await?;
    Ok(count > 0)
}

/// Load an auction for modification inside a write transaction, failing unless it is a draft.
pub(crate) async fn fetch_draft(
    conn: &mut SqliteConnection,
    auction_id: AuctionId,
) -> Result<Result<AuctionRecord, LifecycleFailure>, sqlx::Error> {
    Ok(match fetch_auction(&mut *conn, auction_id).await? {
        None => Err(LifecycleFailure::NotFound),
        Some(auction) => auction.ensure_editable().map(|_| auction),
    })
}
