use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{Postgres, Row};
use tracing::info;

use crate::db::{self, DbPool, WAREHOUSE};
use crate::error::{EtlError, Result};
use crate::model::AggregatedRecord;

pub const AGGREGATED_SALES_TABLE: &str = "aggregated_sales";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub deleted: u64,
    pub inserted: u64,
}

/// Creates the warehouse table if it does not exist yet.
pub async fn ensure_schema(pool: &DbPool) -> Result<()> {
    db::run_migrations(pool).await
}

/// Replaces the warehouse rows for every product in `records`.
///
/// Existing rows for those products are deleted and the new rows inserted
/// inside a single transaction, so a failed insert leaves the previous rows in
/// place. An empty slice touches nothing.
pub async fn load(pool: &DbPool, records: &[AggregatedRecord]) -> Result<LoadSummary> {
    if records.is_empty() {
        info!("no aggregated rows to load");
        return Ok(LoadSummary::default());
    }

    let product_ids: Vec<i64> = records
        .iter()
        .map(|record| record.product_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let write_err = |err: sqlx::Error| EtlError::write(WAREHOUSE, AGGREGATED_SALES_TABLE, err);

    let mut tx = pool
        .begin()
        .await
        .map_err(|err| EtlError::connection(WAREHOUSE, err))?;

    let deleted = sqlx::query::<Postgres>(
        r#"
            DELETE FROM aggregated_sales
            WHERE product_id = ANY($1)
        "#,
    )
    .bind(&product_ids)
    .execute(&mut *tx)
    .await
    .map_err(write_err)?
    .rows_affected();

    let mut inserted = 0;
    for record in records {
        inserted += sqlx::query::<Postgres>(
            r#"
                INSERT INTO aggregated_sales (product_id, total_quantity, total_sale_amount)
                VALUES ($1, $2, $3)
            "#,
        )
        .bind(record.product_id)
        .bind(record.total_quantity)
        .bind(record.total_sale_amount)
        .execute(&mut *tx)
        .await
        .map_err(write_err)?
        .rows_affected();
    }

    tx.commit().await.map_err(write_err)?;

    info!(deleted, inserted, "loaded aggregated sales");
    Ok(LoadSummary { deleted, inserted })
}

/// Returns every warehouse row ordered by product.
pub async fn fetch_aggregated(pool: &DbPool) -> Result<Vec<AggregatedRecord>> {
    let rows = sqlx::query::<Postgres>(
        r#"
            SELECT product_id, total_quantity, total_sale_amount
            FROM aggregated_sales
            ORDER BY product_id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|err| EtlError::query(WAREHOUSE, AGGREGATED_SALES_TABLE, err))?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        records.push(
            decode_row(&row)
                .map_err(|err| EtlError::query(WAREHOUSE, AGGREGATED_SALES_TABLE, err))?,
        );
    }

    Ok(records)
}

fn decode_row(row: &sqlx::postgres::PgRow) -> std::result::Result<AggregatedRecord, sqlx::Error> {
    Ok(AggregatedRecord {
        product_id: row.try_get("product_id")?,
        total_quantity: row.try_get("total_quantity")?,
        total_sale_amount: row.try_get("total_sale_amount")?,
    })
}

/// Column totals across a set of warehouse rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WarehouseTotals {
    pub products: usize,
    pub total_quantity: i64,
    pub total_sale_amount: Decimal,
}

impl WarehouseTotals {
    pub fn from_records(records: &[AggregatedRecord]) -> Self {
        records.iter().fold(
            WarehouseTotals {
                products: records.len(),
                ..Default::default()
            },
            |mut totals, record| {
                totals.total_quantity = totals.total_quantity.saturating_add(record.total_quantity);
                totals.total_sale_amount = totals
                    .total_sale_amount
                    .saturating_add(record.total_sale_amount);
                totals
            },
        )
    }
}
