use serde::{Deserialize, Serialize};

/// Column names shared by the `online_sales` table and the in-store CSV export.
pub const SALES_COLUMNS: [&str; 4] = ["product_id", "quantity", "sale_amount", "sale_date"];

/// A sales row exactly as a source produced it.
///
/// Every field is kept as optional text: `None` marks SQL NULL, an empty CSV
/// cell, or a cell missing from a short row. Coercion to typed values happens
/// in the transform step, never here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSale {
    pub product_id: Option<String>,
    pub quantity: Option<String>,
    pub sale_amount: Option<String>,
    pub sale_date: Option<String>,
}

impl RawSale {
    pub fn new(
        product_id: impl Into<String>,
        quantity: impl Into<String>,
        sale_amount: impl Into<String>,
        sale_date: impl Into<String>,
    ) -> Self {
        Self {
            product_id: Some(product_id.into()),
            quantity: Some(quantity.into()),
            sale_amount: Some(sale_amount.into()),
            sale_date: Some(sale_date.into()),
        }
    }
}

/// Normalises a raw cell: surrounding whitespace is dropped and blank cells become `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
