pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod sources;
pub mod transform;
pub mod warehouse;

pub use config::{DatabaseConfig, EtlConfig};
pub use error::{EtlError, Result};
pub use model::{AggregatedRecord, RawSale, SaleRecord};
pub use pipeline::{Pipeline, RunReport};
