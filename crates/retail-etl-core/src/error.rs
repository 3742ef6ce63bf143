// crates/retail-etl-core/src/error.rs

use std::path::PathBuf;

use retail_etl_parser::ParserError;
use sqlx::migrate::MigrateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("{target} database is unreachable: {source}")]
    Connection {
        target: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("query against {table} failed: {source}")]
    Query {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("CSV source '{}' not found", path.display())]
    FileNotFound { path: PathBuf },

    #[error("CSV source could not be parsed: {0}")]
    Parse(#[source] ParserError),

    #[error("write to {table} was rejected: {source}")]
    Write {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("warehouse migration failed: {0}")]
    Migration(#[from] MigrateError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl EtlError {
    pub fn connection(target: &'static str, source: sqlx::Error) -> Self {
        EtlError::Connection { target, source }
    }

    /// Classifies a failure while reading from `table`.
    pub fn query(target: &'static str, table: &'static str, source: sqlx::Error) -> Self {
        if is_connection_failure(&source) {
            EtlError::Connection { target, source }
        } else {
            EtlError::Query { table, source }
        }
    }

    /// Classifies a failure while writing to `table`.
    pub fn write(target: &'static str, table: &'static str, source: sqlx::Error) -> Self {
        if is_connection_failure(&source) {
            EtlError::Connection { target, source }
        } else {
            EtlError::Write { table, source }
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, EtlError::Connection { .. })
    }
}

impl From<ParserError> for EtlError {
    fn from(err: ParserError) -> Self {
        match err {
            ParserError::NotFound { path } => EtlError::FileNotFound { path },
            other => EtlError::Parse(other),
        }
    }
}

/// True when the error means the store could not be reached at all, as
/// opposed to a statement it rejected.
pub fn is_connection_failure(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_)
    )
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeouts_are_connection_failures() {
        let err = EtlError::query("source", "online_sales", sqlx::Error::PoolTimedOut);
        assert!(err.is_connection());
        assert!(err.to_string().starts_with("source database is unreachable"));
    }

    #[test]
    fn statement_failures_keep_their_stage() {
        let err = EtlError::query("source", "online_sales", sqlx::Error::RowNotFound);
        assert!(matches!(err, EtlError::Query { table: "online_sales", .. }));

        let err = EtlError::write("warehouse", "aggregated_sales", sqlx::Error::RowNotFound);
        assert!(matches!(err, EtlError::Write { table: "aggregated_sales", .. }));
    }

    #[test]
    fn missing_csv_maps_to_file_not_found() {
        let err: EtlError = ParserError::NotFound {
            path: PathBuf::from("in_store_sales.csv"),
        }
        .into();
        assert!(matches!(err, EtlError::FileNotFound { .. }));

        let err: EtlError = ParserError::MissingColumn { column: "quantity" }.into();
        assert!(matches!(err, EtlError::Parse(_)));
    }
}
