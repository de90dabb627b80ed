//! Region pools: the candidate sets the advisor draws from.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use spotgrid_core::{Instance, RegionCode};

use crate::aggregates::Aggregates;

/// Per-region pools keyed by region code.
pub type Catalog = BTreeMap<RegionCode, RegionPool>;

/// Which candidate set of a region a draw comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    /// Permanent offerings only.
    Permanent,
    /// Permanent and transient offerings.
    All,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PoolKind::Permanent => "permanent",
            PoolKind::All => "permanent or transient",
        })
    }
}

/// A candidate set with its precomputed statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePool {
    pub instances: Vec<Instance>,
    /// `None` exactly when `instances` is empty.
    pub aggregates: Option<Aggregates>,
}

impl CandidatePool {
    pub fn new(instances: Vec<Instance>) -> Self {
        let aggregates = Aggregates::compute(&instances).ok();
        Self {
            instances,
            aggregates,
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Candidate offerings available in one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPool {
    pub region: RegionCode,
    pub permanent: CandidatePool,
    /// Permanent and transient offerings; a superset of `permanent`.
    pub all: CandidatePool,
}

impl RegionPool {
    /// Build a region pool from its offerings, splitting by lifecycle.
    ///
    /// Offering order is preserved in both pools; selection ties between
    /// offerings of equal memory resolve to this order.
    pub fn from_instances(region: impl Into<RegionCode>, instances: Vec<Instance>) -> Self {
        let permanent = instances
            .iter()
            .filter(|i| !i.is_transient())
            .cloned()
            .collect();
        Self {
            region: region.into(),
            permanent: CandidatePool::new(permanent),
            all: CandidatePool::new(instances),
        }
    }

    pub fn pool(&self, kind: PoolKind) -> &CandidatePool {
        match kind {
            PoolKind::Permanent => &self.permanent,
            PoolKind::All => &self.all,
        }
    }

    /// Look up an offering by id.
    pub fn instance(&self, id: &str) -> Option<&Instance> {
        self.all.instances.iter().find(|i| i.id == id)
    }
}
