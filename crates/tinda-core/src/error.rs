use std::io;
use thiserror::Error;

use crate::types::TableName;

#[derive(Error, Debug)]
pub enum TindaError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Table {table} has no column named '{column}'")]
    UnknownColumn { table: TableName, column: String },

    #[error("Unsupported value in {table}.{column}: {reason}")]
    UnsupportedValue {
        table: TableName,
        column: String,
        reason: String,
    },

    #[error("Audit log error: {0}")]
    Audit(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<serde_json::Error> for TindaError {
    fn from(err: serde_json::Error) -> Self {
        TindaError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TindaError>;
