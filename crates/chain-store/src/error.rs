//! Store adapter error taxonomy (component C5).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("partition {partition:?} row {row:?} not found in table {table}")]
    NotFound { table: &'static str, partition: String, row: String },

    #[error("row codec failure in table {table}: {source}")]
    Codec { table: &'static str, #[source] source: bincode::error::EncodeError },

    #[error("row decode failure in table {table}: {source}")]
    Decode { table: &'static str, #[source] source: bincode::error::DecodeError },

    #[error("backend I/O failure: {0}")]
    Io(String),
}
