//! Error taxonomy for the service pipeline.
//!
//! Transient per-record kinds (`Parse`, `MissingProduct`, `EmptyBook`,
//! `DanglingChildOrder`) are logged where they occur and never abort the run.
//! Structural kinds (`KeyNotFound`, `Io` on a mandatory sink) propagate to
//! the caller.

use thiserror::Error;
use tsy_common::{MissingProduct, TickParseError};

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A keyed-store lookup missed.
    #[error("{service}: key {key:?} not found")]
    KeyNotFound { service: &'static str, key: String },

    /// A malformed input line.
    #[error("parse error: {0}")]
    Parse(String),

    /// Reference data lookup failed for an incoming product id.
    #[error(transparent)]
    MissingProduct(#[from] MissingProduct),

    /// Could not open or write a file.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// A child order whose parent is not in the store.
    #[error("child order {order_id:?} references unknown parent {parent_id:?}")]
    DanglingChildOrder { order_id: String, parent_id: String },

    /// An order book arrived with one or both sides empty.
    #[error("order book for {0:?} has an empty side")]
    EmptyBook(String),
}

impl From<TickParseError> for PipelineError {
    fn from(err: TickParseError) -> Self {
        PipelineError::Parse(err.to_string())
    }
}
