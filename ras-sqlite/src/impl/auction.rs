use super::{fetch_auction, fetch_draft, fetch_items, is_invited};
use crate::{
    Db,
    types::{Amount, AuctionRow, DateTime, ItemRow, SupplierRow},
};
use ras_core::{
    models::{
        AuctionData, AuctionId, AuctionItem, AuctionItemId, AuctionRecord, AuctionVisibilityEntry,
        ItemData, LifecycleFailure, SupplierId, UserId,
    },
    ports::AuctionRepository,
};
use sqlx::{SqliteConnection, types::Json};
use time::OffsetDateTime;

async fn insert_item(
    conn: &mut SqliteConnection,
    auction_id: AuctionId,
    item_id: AuctionItemId,
    data: &ItemData,
) -> Result<AuctionItem, sqlx::Error> {
    let row = sqlx::query_as::<_, ItemRow>(
        r#"
        insert into
            auction_item (id, auction_id, description, quantity, unit_of_measure, rfq_item_id)
        values
            ($1, $2, $3, $4, $5, $6)
        returning
            id, auction_id, description, quantity, unit_of_measure, rfq_item_id
        "#,
    )
    .bind(item_id)
    .bind(auction_id)
    .bind(&data.description)
    .bind(Amount(data.quantity))
    .bind(&data.unit_of_measure)
    .bind(data.rfq_item_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row.into())
}

async fn insert_supplier(
    conn: &mut SqliteConnection,
    auction_id: AuctionId,
    supplier_id: SupplierId,
    as_of: OffsetDateTime,
) -> Result<AuctionVisibilityEntry, sqlx::Error> {
    // re-inviting keeps the original grant time
    let row = sqlx::query_as::<_, SupplierRow>(
        r#"
        insert into
            auction_supplier (auction_id, supplier_id, granted_at)
        values
            ($1, $2, $3)
        on conflict (auction_id, supplier_id)
            do update set granted_at = granted_at
        returning
            auction_id, supplier_id, granted_at
        "#,
    )
    .bind(auction_id)
    .bind(supplier_id)
    .bind(DateTime(as_of))
    .fetch_one(&mut *conn)
    .await?;
    Ok(row.into())
}

async fn touch(
    conn: &mut SqliteConnection,
    auction_id: AuctionId,
    as_of: OffsetDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("update auction set updated_at = $2 where id = $1")
        .bind(auction_id)
        .bind(DateTime(as_of))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

impl AuctionRepository for Db {
    async fn create_auction(
        &self,
        auction_id: AuctionId,
        created_by: UserId,
        data: AuctionData,
        items: Vec<(AuctionItemId, ItemData)>,
        suppliers: Vec<SupplierId>,
        as_of: OffsetDateTime,
    ) -> Result<Result<AuctionRecord, LifecycleFailure>, Self::Error> {
        let data = match data.validate() {
            Ok(data) => data,
            Err(failure) => return Ok(Err(failure)),
        };
        let items = match items
            .into_iter()
            .map(|(item_id, item)| item.validate().map(|item| (item_id, item)))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(items) => items,
            Err(failure) => return Ok(Err(failure)),
        };

        let mut tx = self.writer.begin().await?;

        let auction: AuctionRecord = sqlx::query_as::<_, AuctionRow>(
            r#"
            insert into
                auction (
                    id, auction_type, status, currency, visibility, start_at, end_at,
                    config, rfq_id, rfq_visibility, created_by, created_at, updated_at
                )
            values
                ($1, $2, 'draft', $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            returning
                *
            "#,
        )
        .bind(auction_id)
        .bind(data.auction_type)
        .bind(&data.currency)
        .bind(data.visibility)
        .bind(data.start_at.map(DateTime))
        .bind(data.end_at.map(DateTime))
        .bind(Json(&data.config))
        .bind(data.rfq.map(|rfq| rfq.rfq_id))
        .bind(data.rfq.map(|rfq| rfq.visibility))
        .bind(created_by)
        .bind(DateTime(as_of))
        .fetch_one(&mut *tx)
        .await?
        .into();

        for (item_id, item) in &items {
            insert_item(&mut tx, auction_id, *item_id, item).await?;
        }
        for supplier_id in suppliers {
            insert_supplier(&mut tx, auction_id, supplier_id, as_of).await?;
        }

        tx.commit().await?;

        tracing::info!(
            %auction_id,
            %created_by,
            items = items.len(),
            "created draft auction"
        );
        Ok(Ok(auction))
    }

    async fn get_auction(
        &self,
        auction_id: AuctionId,
    ) -> Result<Option<AuctionRecord>, Self::Error> {
        fetch_auction(&self.reader, auction_id).await
    }

    async fn get_auction_items(&self, auction_id: AuctionId) -> Result<Vec<AuctionItem>, Self::Error> {
        fetch_items(&self.reader, auction_id).await
    }

    async fn get_auction_suppliers(
        &self,
        auction_id: AuctionId,
    ) -> Result<Vec<AuctionVisibilityEntry>, Self::Error> {
        let rows = sqlx::query_as::<_, SupplierRow>(
            r#"
            select
                auction_id, supplier_id, granted_at
            from
                auction_supplier
            where
                auction_id = $1
            order by
                granted_at, supplier_id
            "#,
        )
        .bind(auction_id)
        .fetch_all(&self.reader)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn is_supplier_invited(
        &self,
        auction_id: AuctionId,
        supplier_id: SupplierId,
    ) -> Result<bool, Self::Error> {
        is_invited(&self.reader, auction_id, supplier_id).await
    }

    async fn update_auction(
        &self,
        auction_id: AuctionId,
        data: AuctionData,
        as_of: OffsetDateTime,
    ) -> Result<Result<AuctionRecord, LifecycleFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;
        if let Err(failure) = fetch_draft(&mut tx, auction_id).await? {
            return Ok(Err(failure));
        }
        let data = match data.validate() {
            Ok(data) => data,
            Err(failure) => return Ok(Err(failure)),
        };

        let auction: AuctionRecord = sqlx::query_as::<_, AuctionRow>(
            r#"
            update
                auction
            set
                auction_type = $2,
                currency = $3,
                visibility = $4,
                start_at = $5,
                end_at = $6,
                config = $7,
                rfq_id = $8,
                rfq_visibility = $9,
                updated_at = $10
            where
                id = $1
            returning
                *
            "#,
        )
        .bind(auction_id)
        .bind(data.auction_type)
        .bind(&data.currency)
        .bind(data.visibility)
        .bind(data.start_at.map(DateTime))
        .bind(data.end_at.map(DateTime))
        .bind(Json(&data.config))
        .bind(data.rfq.map(|rfq| rfq.rfq_id))
        .bind(data.rfq.map(|rfq| rfq.visibility))
        .bind(DateTime(as_of))
        .fetch_one(&mut *tx)
        .await?
        .into();

        tx.commit().await?;
        Ok(Ok(auction))
    }

    async fn add_item(
        &self,
        auction_id: AuctionId,
        item_id: AuctionItemId,
        data: ItemData,
        as_of: OffsetDateTime,
    ) -> Result<Result<AuctionItem, LifecycleFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;
        if let Err(failure) = fetch_draft(&mut tx, auction_id).await? {
            return Ok(Err(failure));
        }
        let data = match data.validate() {
            Ok(data) => data,
            Err(failure) => return Ok(Err(failure)),
        };

        let item = insert_item(&mut tx, auction_id, item_id, &data).await?;
        touch(&mut tx, auction_id, as_of).await?;
        tx.commit().await?;
        Ok(Ok(item))
    }

    async fn update_item(
        &self,
        auction_id: AuctionId,
        item_id: AuctionItemId,
        data: ItemData,
        as_of: OffsetDateTime,
    ) -> Result<Result<AuctionItem, LifecycleFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;
        if let Err(failure) = fetch_draft(&mut tx, auction_id).await? {
            return Ok(Err(failure));
        }
        let data = match data.validate() {
            Ok(data) => data,
            Err(failure) => return Ok(Err(failure)),
        };

        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            update
                auction_item
            set
                description = $3,
                quantity = $4,
                unit_of_measure = $5,
                rfq_item_id = $6
            where
                id = $1
            and
                auction_id = $2
            returning
                id, auction_id, description, quantity, unit_of_measure, rfq_item_id
            "#,
        )
        .bind(item_id)
        .bind(auction_id)
        .bind(&data.description)
        .bind(Amount(data.quantity))
        .bind(&data.unit_of_measure)
        .bind(data.rfq_item_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(Err(LifecycleFailure::ItemNotFound));
        };
        touch(&mut tx, auction_id, as_of).await?;
        tx.commit().await?;
        Ok(Ok(row.into()))
    }

    async fn remove_item(
        &self,
        auction_id: AuctionId,
        item_id: AuctionItemId,
        as_of: OffsetDateTime,
    ) -> Result<Result<(), LifecycleFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;
        if let Err(failure) = fetch_draft(&mut tx, auction_id).await? {
            return Ok(Err(failure));
        }

        let deleted = sqlx::query("delete from auction_item where id = $1 and auction_id = $2")
            .bind(item_id)
            .bind(auction_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Ok(Err(LifecycleFailure::ItemNotFound));
        }
        touch(&mut tx, auction_id, as_of).await?;
        tx.commit().await?;
        Ok(Ok(()))
    }

    async fn grant_supplier(
        &self,
        auction_id: AuctionId,
        supplier_id: SupplierId,
        as_of: OffsetDateTime,
    ) -> Result<Result<AuctionVisibilityEntry, LifecycleFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;
        if let Err(failure) = fetch_draft(&mut tx, auction_id).await? {
            return Ok(Err(failure));
        }

        let entry = insert_supplier(&mut tx, auction_id, supplier_id, as_of).await?;
        touch(&mut tx, auction_id, as_of).await?;
        tx.commit().await?;
        Ok(Ok(entry))
    }

    async fn revoke_supplier(
        &self,
        auction_id: AuctionId,
        supplier_id: SupplierId,
        as_of: OffsetDateTime,
    ) -> Result<Result<bool, LifecycleFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;
        if let Err(failure) = fetch_draft(&mut tx, auction_id).await? {
            return Ok(Err(failure));
        }

        let deleted = sqlx::query(
            "delete from auction_supplier where auction_id = $1 and supplier_id = $2",
        )
        .bind(auction_id)
        .bind(supplier_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if deleted > 0 {
            touch(&mut tx, auction_id, as_of).await?;
        }
        tx.commit().await?;
        Ok(Ok(deleted > 0))
    }

    async fn publish_auction(
        &self,
        auction_id: AuctionId,
        as_of: OffsetDateTime,
    ) -> Result<Result<AuctionRecord, LifecycleFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;
        let Some(auction) = fetch_auction(&mut *tx, auction_id).await? else {
            return Ok(Err(LifecycleFailure::NotFound));
        };

        let item_count = sqlx::query_scalar::<_, i64>(
            "select count(*) from auction_item where auction_id = $1",
        )
        .bind(auction_id)
        .fetch_one(&mut *tx)
        .await?;
        let supplier_count = sqlx::query_scalar::<_, i64>(
            "select count(*) from auction_supplier where auction_id = $1",
        )
        .bind(auction_id)
        .fetch_one(&mut *tx)
        .await?;

        if let Err(failure) =
            auction.check_publish(item_count as usize, supplier_count as usize, as_of)
        {
            tracing::debug!(%auction_id, %failure, "publish rejected");
            return Ok(Err(failure));
        }

        let auction: AuctionRecord = sqlx::query_as::<_, AuctionRow>(
            r#"
            update
                auction
            set
                status = 'published',
                published_at = $2,
                updated_at = $2
            where
                id = $1
            and
                status = 'draft'
            returning
                *
            "#,
        )
        .bind(auction_id)
        .bind(DateTime(as_of))
        .fetch_one(&mut *tx)
        .await?
        .into();

        tx.commit().await?;

        tracing::info!(%auction_id, start_at = ?auction.start_at, end_at = ?auction.end_at, "published auction");
        Ok(Ok(auction))
    }

    async fn archive_auction(
        &self,
        auction_id: AuctionId,
        as_of: OffsetDateTime,
    ) -> Result<Result<AuctionRecord, LifecycleFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;
        let Some(auction) = fetch_auction(&mut *tx, auction_id).await? else {
            return Ok(Err(LifecycleFailure::NotFound));
        };
        if let Err(failure) = auction.ensure_archivable() {
            return Ok(Err(failure));
        }

        let auction: AuctionRecord = sqlx::query_as::<_, AuctionRow>(
            r#"
            update
                auction
            set
                status = 'archived',
                archived_at = $2,
                updated_at = $2
            where
                id = $1
            returning
                *
            "#,
        )
        .bind(auction_id)
        .bind(DateTime(as_of))
        .fetch_one(&mut *tx)
        .await?
        .into();

        tx.commit().await?;

        tracing::info!(%auction_id, "archived auction");
        Ok(Ok(auction))
    }
}
