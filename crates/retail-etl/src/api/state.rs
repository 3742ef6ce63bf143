use std::sync::Arc;

use retail_etl_core::db::DbPool;
use retail_etl_core::Pipeline;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    // Runs triggered through the API execute one at a time.
    pipeline: Arc<Mutex<Pipeline>>,
    warehouse: DbPool,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        let warehouse = pipeline.warehouse().clone();
        Self {
            pipeline: Arc::new(Mutex::new(pipeline)),
            warehouse,
        }
    }

    pub fn pipeline(&self) -> &Arc<Mutex<Pipeline>> {
        &self.pipeline
    }

    pub fn warehouse(&self) -> &DbPool {
        &self.warehouse
    }
}
