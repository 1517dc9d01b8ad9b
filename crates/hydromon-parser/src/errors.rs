use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    #[error("record has {columns} column names but {values} values")]
    LengthMismatch { columns: usize, values: usize },
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{feed} feed could not be opened at {}: {source}", path.display())]
    Open {
        feed: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{feed} CSV error: {source}")]
    Csv {
        feed: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{feed} header invalid: {source}")]
    Header {
        feed: &'static str,
        #[source]
        source: RecordError,
    },

    #[error("{feed} feed is missing required column '{column}'")]
    MissingColumn {
        feed: &'static str,
        column: &'static str,
    },

    #[error("{feed} row {row_index} invalid: {source}")]
    Record {
        feed: &'static str,
        row_index: usize,
        #[source]
        source: RecordError,
    },
}
