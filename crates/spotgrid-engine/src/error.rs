//! Engine error types.

use thiserror::Error;

use crate::aggregates::Metric;
use crate::pool::PoolKind;

/// Result type alias for search, sort, and selection primitives.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type alias for advisory runs.
pub type AdviseResult<T> = Result<T, AdviseError>;

/// Errors raised by the engine primitives.
///
/// `InvalidRange`, `EmptyRange`, and `NotSorted` mean the caller broke a
/// precondition. `NoFeasibleInstance` is an expected outcome when a
/// catalog has nothing large enough for a service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid range {start}..{end} for a pool of {len} instances")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("empty range {start}..{end}")]
    EmptyRange { start: usize, end: usize },

    #[error("cannot aggregate an empty pool")]
    EmptyPool,

    #[error("range {start}..{end} is not sorted ascending by {metric}")]
    NotSorted { metric: Metric, start: usize, end: usize },

    #[error("no {pool} instance offers {required_gb} GB of memory{}", largest_hint(.largest_gb))]
    NoFeasibleInstance {
        pool: PoolKind,
        required_gb: f64,
        largest_gb: Option<f64>,
    },
}

fn largest_hint(largest_gb: &Option<f64>) -> String {
    match largest_gb {
        Some(gb) => format!(" (largest available: {gb} GB)"),
        None => " (pool is empty)".to_string(),
    }
}

/// Errors raised while advising a region.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdviseError {
    #[error("selecting instance for service {service}: {source}")]
    Selection {
        service: String,
        #[source]
        source: EngineError,
    },

    #[error("invalid request: {0}")]
    Validation(#[from] spotgrid_core::ValidationError),

    #[error("advisory cancelled before service {0}")]
    Cancelled(String),
}

impl AdviseError {
    /// True when a service simply cannot be satisfied by the catalog.
    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            AdviseError::Selection {
                source: EngineError::NoFeasibleInstance { .. },
                ..
            }
        )
    }
}
