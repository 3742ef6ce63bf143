use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::EtlConfig;
use crate::db::{self, DbPool, SOURCE, WAREHOUSE};
use crate::error::Result;
use crate::{sources, transform, warehouse};

/// Outcome of a single pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// `None` when the run covered every date.
    pub sale_date: Option<NaiveDate>,
    pub online_rows: usize,
    pub in_store_rows: usize,
    pub valid_rows: usize,
    pub dropped_rows: usize,
    pub products_loaded: usize,
    pub deleted: u64,
    pub inserted: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Sequences extract, transform and load for one run date.
#[derive(Debug, Clone)]
pub struct Pipeline {
    source: DbPool,
    warehouse: DbPool,
    csv_path: PathBuf,
}

impl Pipeline {
    pub fn new(source: DbPool, warehouse: DbPool, csv_path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            warehouse,
            csv_path: csv_path.into(),
        }
    }

    /// Connects both pools eagerly, failing fast if either store is down.
    pub async fn connect(config: &EtlConfig) -> Result<Self> {
        let source = db::connect(SOURCE, &config.source).await?;
        let warehouse = db::connect(WAREHOUSE, &config.warehouse).await?;
        Ok(Self::new(source, warehouse, config.csv_path.clone()))
    }

    /// Builds pools that connect on first use.
    pub fn connect_lazy(config: &EtlConfig) -> Result<Self> {
        let source = db::connect_lazy(SOURCE, &config.source)?;
        let warehouse = db::connect_lazy(WAREHOUSE, &config.warehouse)?;
        Ok(Self::new(source, warehouse, config.csv_path.clone()))
    }

    pub fn warehouse(&self) -> &DbPool {
        &self.warehouse
    }

    /// Runs the pipeline for `date`, or for every date when `None`.
    ///
    /// Stages run strictly in order and the first error aborts the run.
    pub async fn run(&self, date: Option<NaiveDate>) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, ?date, "starting ETL run");

        let online = sources::read_relational(&self.source, date).await?;
        let in_store = sources::read_csv(&self.csv_path, date)?;
        let online_rows = online.len();
        let in_store_rows = in_store.len();

        let cleaned = transform::clean(online.into_iter().chain(in_store));
        let aggregated = transform::aggregate(&cleaned);
        info!(
            %run_id,
            valid_rows = cleaned.len(),
            products = aggregated.len(),
            "transformed sales"
        );

        let summary = warehouse::load(&self.warehouse, &aggregated).await?;

        let report = RunReport {
            run_id,
            sale_date: date,
            online_rows,
            in_store_rows,
            valid_rows: cleaned.len(),
            dropped_rows: online_rows + in_store_rows - cleaned.len(),
            products_loaded: aggregated.len(),
            deleted: summary.deleted,
            inserted: summary.inserted,
            started_at,
            finished_at: Utc::now(),
        };

        info!(%run_id, products = report.products_loaded, "ETL run completed");
        Ok(report)
    }
}
