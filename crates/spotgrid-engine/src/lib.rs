//! SpotGrid selection engine — binds catalog offerings to services.
//!
//! Given per-region pools of compute offerings, the engine picks one
//! offering per service and per capacity class (permanent or transient)
//! by narrowing each pool to the memory-feasible range and ranking that
//! range with a weighted score. It owns no I/O; catalogs come from
//! `spotgrid-catalog` and advice is serialized by the caller.
//!
//! # Components
//!
//! - **`aggregates`** — Pool statistics and min-max normalisation
//! - **`search`** — Floor searches (linear and binary) over pool ranges
//! - **`sort`** — Range sorts by dimension or weighted score
//! - **`pool`** — Region pools split into permanent/all candidates
//! - **`advisor`** — Per-service selection and per-region advice
//! - **`advice`** — Bidirectional assignments and region advice output
//! - **`region_score`** — Pluggable region ranking strategies
//! - **`fleet`** — Multi-region fan-out with deadline and cancellation

pub mod advice;
pub mod advisor;
pub mod aggregates;
pub mod error;
pub mod fleet;
pub mod pool;
pub mod region_score;
pub mod search;
pub mod sort;

pub use advice::{Assignments, RegionAdvice};
pub use advisor::Advisor;
pub use aggregates::{Aggregates, Metric, Stats};
pub use error::{AdviseError, AdviseResult, EngineError, EngineResult};
pub use fleet::{
    FleetAdvice, FleetOptions, RegionFailure, advise_across_regions,
    advise_across_regions_concurrently,
};
pub use pool::{CandidatePool, Catalog, PoolKind, RegionPool};
pub use region_score::{
    HourlyCostScorer, PlaceholderScorer, RegionScorer, WeightedSumScorer, scorer_for,
};
pub use search::{find_floor_binary, find_floor_linear, sort_then_find};
pub use sort::{SortKey, SortWeights, sort_range, weighted_score, weighted_score_with_vcpu_limiter};
