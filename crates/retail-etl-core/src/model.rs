use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use retail_etl_parser::RawSale;

/// A sale that survived cleaning: every field present and the numeric ones coerced.
///
/// `sale_date` is carried as the source wrote it. Date filtering happens while
/// reading, so nothing downstream interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRecord {
    pub product_id: i64,
    pub quantity: Decimal,
    pub sale_amount: Decimal,
    pub sale_date: String,
}

/// One row of the `aggregated_sales` warehouse table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    pub product_id: i64,
    pub total_quantity: i64,
    pub total_sale_amount: Decimal,
}

impl AggregatedRecord {
    pub fn new(product_id: i64, total_quantity: i64, total_sale_amount: Decimal) -> Self {
        Self {
            product_id,
            total_quantity,
            total_sale_amount,
        }
    }
}
