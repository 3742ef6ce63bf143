pub mod errors;
pub mod model;
pub mod reader;

pub use errors::ParserError;
pub use model::{RawSale, SALES_COLUMNS};
pub use reader::{parse_sale_date, parse_sales_csv, read_sales_csv};
