use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::errors::ParserError;
use crate::model::{non_blank, RawSale, SALES_COLUMNS};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Reads the in-store sales export at `path`, keeping only rows sold on `date`
/// when one is given.
pub fn read_sales_csv(
    path: impl AsRef<Path>,
    date: Option<NaiveDate>,
) -> Result<Vec<RawSale>, ParserError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ParserError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ParserError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    parse_sales_csv(file, date)
}

/// Parses sales rows from any reader.
///
/// The header row must name every column in [`crate::SALES_COLUMNS`]; order is
/// free and extra columns are ignored. Rows with too few cells are kept with the
/// missing fields set to `None`.
pub fn parse_sales_csv<R: Read>(
    reader: R,
    date: Option<NaiveDate>,
) -> Result<Vec<RawSale>, ParserError> {
    let mut csv_reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = SalesColumns::locate(&headers)?;

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let sale = columns.extract(&record?);
        if let Some(date) = date {
            if !matches_date(sale.sale_date.as_deref(), date) {
                continue;
            }
        }
        rows.push(sale);
    }

    Ok(rows)
}

/// Parses a sale date as written by either source. Timestamps are truncated to
/// their calendar date.
pub fn parse_sale_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Some(date);
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|timestamp| timestamp.date())
}

fn matches_date(value: Option<&str>, date: NaiveDate) -> bool {
    value.and_then(parse_sale_date) == Some(date)
}

#[derive(Debug, Clone, Copy)]
struct SalesColumns {
    product_id: usize,
    quantity: usize,
    sale_amount: usize,
    sale_date: usize,
}

impl SalesColumns {
    fn locate(headers: &StringRecord) -> Result<Self, ParserError> {
        let position = |column: &'static str| {
            headers
                .iter()
                .position(|header| header == column)
                .ok_or(ParserError::MissingColumn { column })
        };

        let [product_id, quantity, sale_amount, sale_date] = SALES_COLUMNS;
        Ok(Self {
            product_id: position(product_id)?,
            quantity: position(quantity)?,
            sale_amount: position(sale_amount)?,
            sale_date: position(sale_date)?,
        })
    }

    fn extract(&self, record: &StringRecord) -> RawSale {
        RawSale {
            product_id: non_blank(record.get(self.product_id)),
            quantity: non_blank(record.get(self.quantity)),
            sale_amount: non_blank(record.get(self.sale_amount)),
            sale_date: non_blank(record.get(self.sale_date)),
        }
    }
}
