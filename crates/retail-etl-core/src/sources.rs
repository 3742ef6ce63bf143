use std::path::Path;

use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};
use tracing::info;

use crate::db::{DbPool, SOURCE};
use crate::error::{EtlError, Result};
use crate::model::RawSale;

pub const ONLINE_SALES_TABLE: &str = "online_sales";

// Columns come back as text so both sources reach the transform step uncoerced.
const SELECT_ALL: &str = r#"
    SELECT product_id::text AS product_id,
           quantity::text AS quantity,
           sale_amount::text AS sale_amount,
           sale_date::text AS sale_date
    FROM online_sales
"#;

const SELECT_BY_DATE: &str = r#"
    SELECT product_id::text AS product_id,
           quantity::text AS quantity,
           sale_amount::text AS sale_amount,
           sale_date::text AS sale_date
    FROM online_sales
    WHERE sale_date = $1
"#;

/// Fetches online sales, restricted to `date` when given.
///
/// One connection is held for the duration of the read and returned to the
/// pool when this function exits, on success or failure.
pub async fn read_relational(pool: &DbPool, date: Option<NaiveDate>) -> Result<Vec<RawSale>> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(|err| EtlError::connection(SOURCE, err))?;

    let query = match date {
        Some(date) => sqlx::query::<Postgres>(SELECT_BY_DATE).bind(date),
        None => sqlx::query::<Postgres>(SELECT_ALL),
    };

    let rows = query
        .fetch_all(&mut *conn)
        .await
        .map_err(|err| EtlError::query(SOURCE, ONLINE_SALES_TABLE, err))?;

    let mut sales = Vec::with_capacity(rows.len());
    for row in rows {
        sales.push(RawSale {
            product_id: optional_text(&row, "product_id")?,
            quantity: optional_text(&row, "quantity")?,
            sale_amount: optional_text(&row, "sale_amount")?,
            sale_date: optional_text(&row, "sale_date")?,
        });
    }

    info!(rows = sales.len(), ?date, "extracted online sales");
    Ok(sales)
}

/// Reads in-store sales from the CSV export, restricted to `date` when given.
pub fn read_csv(path: &Path, date: Option<NaiveDate>) -> Result<Vec<RawSale>> {
    let sales = retail_etl_parser::read_sales_csv(path, date)?;
    info!(
        rows = sales.len(),
        ?date,
        path = %path.display(),
        "extracted in-store sales"
    );
    Ok(sales)
}

fn optional_text(row: &PgRow, column: &'static str) -> Result<Option<String>> {
    row.try_get::<Option<String>, _>(column)
        .map_err(|err| EtlError::query(SOURCE, ONLINE_SALES_TABLE, err))
}
