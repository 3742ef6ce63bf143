use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("sales file '{}' does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read sales file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("header is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("CSV error: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },
}

impl From<csv::Error> for ParserError {
    fn from(source: csv::Error) -> Self {
        ParserError::Csv { source }
    }
}
