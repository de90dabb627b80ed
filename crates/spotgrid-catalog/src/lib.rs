//! Catalog boundary for SpotGrid.
//!
//! The engine consumes an in-memory catalog of per-region pools. This
//! crate produces one: it reads offerings from a [`CatalogSource`],
//! validates and groups them by region, and caches the result as a
//! read-only snapshot with a time-to-live.
//!
//! # Components
//!
//! - **`source`** — Offering sources (JSON file, in-memory)
//! - **`builder`** — Validation and grouping into region pools
//! - **`cache`** — TTL snapshot cache

pub mod builder;
pub mod cache;
pub mod error;
pub mod source;

pub use builder::{RegionSummary, build_catalog, summarize};
pub use cache::{CatalogSnapshot, Clock, SnapshotCache, SystemClock};
pub use error::{CatalogError, CatalogResult};
pub use source::{CatalogSource, JsonFileSource, StaticSource};
