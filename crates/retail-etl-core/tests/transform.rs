use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use retail_etl_core::model::{AggregatedRecord, RawSale};
use retail_etl_core::transform::{aggregate, clean, coerce, transform};

fn dec(value: &str) -> Decimal {
    value.parse().expect("valid decimal literal")
}

fn by_product(records: Vec<AggregatedRecord>) -> HashMap<i64, (i64, Decimal)> {
    records
        .into_iter()
        .map(|record| {
            (
                record.product_id,
                (record.total_quantity, record.total_sale_amount),
            )
        })
        .collect()
}

fn sale(product_id: &str, quantity: &str, amount: &str) -> RawSale {
    RawSale::new(product_id, quantity, amount, "2024-03-01")
}

#[test]
fn unions_and_aggregates_both_sources() {
    let online = vec![sale("1", "2", "10.00")];
    let in_store = vec![sale("1", "3", "15.00"), sale("2", "1", "5.00")];

    let result = by_product(transform(online, in_store));

    assert_eq!(result.len(), 2);
    assert_eq!(result[&1], (5, dec("25.00")));
    assert_eq!(result[&2], (1, dec("5.00")));
}

#[test]
fn non_numeric_quantity_drops_the_only_record_for_a_product() {
    let online = vec![sale("1", "2", "10.00")];
    let in_store = vec![sale("3", "abc", "7.50")];

    let result = by_product(transform(online, in_store));

    assert_eq!(result.len(), 1);
    assert!(!result.contains_key(&3));
}

#[test]
fn null_sale_amount_is_excluded_not_zeroed() {
    let mut missing_amount = sale("4", "2", "0");
    missing_amount.sale_amount = None;

    let result = by_product(transform(vec![missing_amount], vec![sale("5", "1", "1.00")]));

    assert!(!result.contains_key(&4));
    assert_eq!(result[&5], (1, dec("1.00")));
}

#[test]
fn any_missing_field_drops_the_record() {
    let mut no_product = sale("1", "1", "1.00");
    no_product.product_id = None;
    let mut no_quantity = sale("1", "1", "1.00");
    no_quantity.quantity = None;
    let mut no_date = sale("1", "1", "1.00");
    no_date.sale_date = None;

    assert!(coerce(&no_product).is_none());
    assert!(coerce(&no_quantity).is_none());
    assert!(coerce(&no_date).is_none());
    assert!(transform(vec![no_product, no_quantity], vec![no_date]).is_empty());
}

#[test]
fn malformed_values_are_dropped_without_error() {
    let rows = vec![
        sale("x1", "1", "1.00"),
        sale("1", "1", "ten"),
        sale("2", " 4 ", " 2.50 "),
    ];

    let cleaned = clean(rows);

    assert_eq!(cleaned.len(), 1);
    assert_eq!(cleaned[0].product_id, 2);
    assert_eq!(cleaned[0].quantity, Decimal::from(4));
    assert_eq!(cleaned[0].sale_amount, dec("2.50"));
}

#[test]
fn sale_date_only_needs_to_be_present() {
    let row = RawSale::new("1", "1", "1.00", "not-a-date");

    let cleaned = coerce(&row).expect("unparseable date still counts as present");

    assert_eq!(cleaned.sale_date, "not-a-date");
}

#[test]
fn non_iso_sale_dates_are_aggregated() {
    let online = vec![RawSale::new("1", "2", "10.00", "2024-03-01")];
    let in_store = vec![
        RawSale::new("1", "3", "15.00", "03/01/2024"),
        RawSale::new("2", "1", "5.00", "2024-03-01 10:15:00.5"),
        RawSale::new("3", "4", "8.00", "2024-03-01 00:00:00+00"),
    ];

    let result = by_product(transform(online, in_store));

    assert_eq!(result.len(), 3);
    assert_eq!(result[&1], (5, dec("25.00")));
    assert_eq!(result[&2], (1, dec("5.00")));
    assert_eq!(result[&3], (4, dec("8.00")));
    assert_eq!(result.values().map(|(quantity, _)| quantity).sum::<i64>(), 10);
}

#[test]
fn empty_input_yields_empty_output() {
    assert!(transform(Vec::<RawSale>::new(), Vec::<RawSale>::new()).is_empty());
    assert!(aggregate(&[]).is_empty());
}

#[test]
fn output_has_no_duplicate_products() {
    let rows: Vec<RawSale> = (0..60)
        .map(|i| sale(&(i % 7).to_string(), "1", "1.10"))
        .collect();

    let result = transform(rows, Vec::<RawSale>::new());
    let mut ids: Vec<i64> = result.iter().map(|record| record.product_id).collect();
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), result.len());
    assert_eq!(ids, (0..7).collect::<Vec<_>>());
}

#[test]
fn total_quantity_is_conserved() {
    let online: Vec<RawSale> = (0..25)
        .map(|i| sale(&(i % 4).to_string(), &(i * 3).to_string(), "2.00"))
        .collect();
    let in_store: Vec<RawSale> = (0..25)
        .map(|i| sale(&(i % 6).to_string(), &(i + 1).to_string(), "0.75"))
        .collect();

    let expected_quantity: i64 = clean(online.iter().chain(in_store.iter()).cloned())
        .iter()
        .map(|record| record.quantity.to_i64().expect("small quantity"))
        .sum();
    let expected_amount: Decimal = dec("2.00") * Decimal::from(25) + dec("0.75") * Decimal::from(25);

    let result = transform(online, in_store);

    assert_eq!(
        result.iter().map(|record| record.total_quantity).sum::<i64>(),
        expected_quantity
    );
    assert_eq!(
        result
            .iter()
            .map(|record| record.total_sale_amount)
            .sum::<Decimal>(),
        expected_amount
    );
}

#[test]
fn transform_is_idempotent_and_order_independent() {
    let online = vec![
        sale("1", "2", "10.00"),
        sale("2", "5", "1.25"),
        sale("3", "abc", "1.00"),
    ];
    let in_store = vec![sale("1", "3", "15.00"), sale("2", "1", "5.00")];

    let first = by_product(transform(online.clone(), in_store.clone()));
    let second = by_product(transform(online.clone(), in_store.clone()));
    let mut reversed_input = in_store;
    reversed_input.extend(online);
    reversed_input.reverse();
    let swapped = by_product(transform(reversed_input, Vec::<RawSale>::new()));

    assert_eq!(first, second);
    assert_eq!(first, swapped);
}
