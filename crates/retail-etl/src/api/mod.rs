//! HTTP surface for triggering runs and reading the warehouse.

mod routes;
mod state;

use std::net::SocketAddr;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

pub use routes::{ApiError, RunParams, RunResponse};
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/sales", get(routes::list_sales))
        .route("/run-etl", post(routes::run_etl))
        .route("/health", get(routes::health))
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state).into_make_service()).await?;
    Ok(())
}
