//! Error taxonomy for engine operations.

use super::decode::DecodeError;
use std::future::Future;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors raised by the analytics engine.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A referenced person does not exist.
    #[error("person {0} not found")]
    NotFound(i64),

    /// The store returned a value the decoder could not interpret.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A caller-supplied parameter is outside its accepted range.
    #[error("{param} must be between {min} and {max} (got {value})")]
    Validation {
        param: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// The backing store failed.
    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),

    /// The operation was cancelled or timed out before completing.
    #[error("operation cancelled")]
    Cancelled,
}

/// Result type for engine operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Check that `value` lies in `min..=max`.
pub fn ensure_range(param: &'static str, value: i64, min: i64, max: i64) -> GraphResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(GraphError::Validation {
            param,
            value,
            min,
            max,
        })
    }
}

/// Await a store call, racing it against `cancel`.
///
/// A cancelled token wins even when the call is ready, so no work is
/// reported after cancellation.
pub async fn store_call<T, F>(cancel: &CancellationToken, call: F) -> GraphResult<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(GraphError::Cancelled),
        result = call => result.map_err(GraphError::Storage),
    }
}
