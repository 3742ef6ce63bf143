use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::model::{AggregatedRecord, RawSale, SaleRecord};

/// Unions both sources, drops invalid rows and aggregates the rest by product.
///
/// The output holds one record per distinct valid `product_id`. Callers must
/// not rely on its order.
pub fn transform<A, B>(online: A, in_store: B) -> Vec<AggregatedRecord>
where
    A: IntoIterator<Item = RawSale>,
    B: IntoIterator<Item = RawSale>,
{
    aggregate(&clean(online.into_iter().chain(in_store)))
}

/// Keeps only rows with every field present and coercible.
///
/// Invalid rows are dropped silently; only their count is logged.
pub fn clean<I>(records: I) -> Vec<SaleRecord>
where
    I: IntoIterator<Item = RawSale>,
{
    let mut seen = 0usize;
    let mut cleaned = Vec::new();
    for raw in records {
        seen += 1;
        if let Some(sale) = coerce(&raw) {
            cleaned.push(sale);
        }
    }

    let dropped = seen - cleaned.len();
    if dropped > 0 {
        debug!(dropped, seen, "dropped sales rows with missing or non-numeric fields");
    }

    cleaned
}

/// Converts one raw row, or returns `None` if any field is missing or a
/// numeric field is malformed. `sale_date` only has to be present.
pub fn coerce(raw: &RawSale) -> Option<SaleRecord> {
    Some(SaleRecord {
        product_id: parse_product_id(raw.product_id.as_deref()?)?,
        quantity: parse_number(raw.quantity.as_deref()?)?,
        sale_amount: parse_number(raw.sale_amount.as_deref()?)?,
        sale_date: raw.sale_date.clone()?,
    })
}

/// Groups sales by product, summing quantity and amount.
pub fn aggregate(records: &[SaleRecord]) -> Vec<AggregatedRecord> {
    let mut totals: BTreeMap<i64, (Decimal, Decimal)> = BTreeMap::new();
    for sale in records {
        let (quantity, amount) = totals
            .entry(sale.product_id)
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        *quantity = quantity.saturating_add(sale.quantity);
        *amount = amount.saturating_add(sale.sale_amount);
    }

    totals
        .into_iter()
        .map(|(product_id, (quantity, amount))| {
            AggregatedRecord::new(product_id, quantity_total(product_id, quantity), amount)
        })
        .collect()
}

fn parse_number(value: &str) -> Option<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

// Integer ids come back as "7.0" once a nullable column has passed through a float.
fn parse_product_id(value: &str) -> Option<i64> {
    let value = value.trim();
    value.parse::<i64>().ok().or_else(|| {
        parse_number(value)
            .filter(|number| number.fract().is_zero())
            .and_then(|number| number.to_i64())
    })
}

// Truncates toward zero like an integer cast.
fn quantity_total(product_id: i64, quantity: Decimal) -> i64 {
    quantity.trunc().to_i64().unwrap_or_else(|| {
        warn!(product_id, %quantity, "total quantity exceeds i64; saturating");
        if quantity.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_ids_accept_integral_decimals() {
        assert_eq!(parse_product_id("7"), Some(7));
        assert_eq!(parse_product_id(" 7.0 "), Some(7));
        assert_eq!(parse_product_id("7.5"), None);
        assert_eq!(parse_product_id("seven"), None);
    }

    #[test]
    fn numbers_accept_scientific_notation() {
        assert_eq!(parse_number("1e3"), Some(Decimal::from(1000)));
        assert_eq!(parse_number(" 12.50 "), Some(Decimal::new(1250, 2)));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn fractional_quantities_truncate_toward_zero() {
        assert_eq!(quantity_total(1, Decimal::new(45, 1)), 4);
        assert_eq!(quantity_total(1, Decimal::new(-45, 1)), -4);
    }

    #[test]
    fn oversized_quantities_saturate() {
        assert_eq!(quantity_total(1, Decimal::MAX), i64::MAX);
        assert_eq!(quantity_total(1, Decimal::MIN), i64::MIN);
    }
}
