//! Pool statistics and min-max normalisation.
//!
//! Aggregates are computed once per candidate pool and are read-only
//! afterwards. Scoring normalises each dimension against them so that
//! vCPU counts, probabilities, and prices are comparable.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use spotgrid_core::Instance;

use crate::error::{EngineError, EngineResult};

/// Numeric dimensions of an offering that can be searched and sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Memory,
    Vcpu,
    Price,
    RevocationProbability,
}

impl Metric {
    /// Read this dimension from an offering.
    pub fn of(&self, instance: &Instance) -> f64 {
        match self {
            Metric::Memory => instance.memory_gb,
            Metric::Vcpu => instance.vcpu,
            Metric::Price => instance.price_per_hour,
            Metric::RevocationProbability => instance.revocation_probability,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::Memory => "memory",
            Metric::Vcpu => "vcpu",
            Metric::Price => "price",
            Metric::RevocationProbability => "revocation probability",
        })
    }
}

/// Min, max, and mean of one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Stats {
    fn seed(value: f64) -> Self {
        Self {
            min: value,
            max: value,
            mean: 0.0,
        }
    }

    fn observe(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.mean += value;
    }
}

/// Summary statistics over a candidate pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    pub count: usize,
    pub vcpu: Stats,
    pub revocation_probability: Stats,
    pub price_per_hour: Stats,
}

impl Aggregates {
    /// Compute statistics in a single pass.
    ///
    /// Fails with [`EngineError::EmptyPool`] on an empty pool.
    pub fn compute<T: Borrow<Instance>>(pool: &[T]) -> EngineResult<Self> {
        let first = pool.first().ok_or(EngineError::EmptyPool)?.borrow();

        let mut vcpu = Stats::seed(first.vcpu);
        let mut revocation_probability = Stats::seed(first.revocation_probability);
        let mut price_per_hour = Stats::seed(first.price_per_hour);

        for instance in pool.iter().map(Borrow::borrow) {
            vcpu.observe(instance.vcpu);
            revocation_probability.observe(instance.revocation_probability);
            price_per_hour.observe(instance.price_per_hour);
        }

        let count = pool.len();
        for stats in [&mut vcpu, &mut revocation_probability, &mut price_per_hour] {
            stats.mean /= count as f64;
        }

        Ok(Self {
            count,
            vcpu,
            revocation_probability,
            price_per_hour,
        })
    }

    pub fn normalise_vcpu(&self, value: f64) -> f64 {
        self.normalise(&self.vcpu, value)
    }

    pub fn normalise_revocation_probability(&self, value: f64) -> f64 {
        self.normalise(&self.revocation_probability, value)
    }

    pub fn normalise_price_per_hour(&self, value: f64) -> f64 {
        self.normalise(&self.price_per_hour, value)
    }

    /// Min-max scaling. When every value in the pool is tied the result
    /// is `1 / count`.
    fn normalise(&self, stats: &Stats, value: f64) -> f64 {
        let spread = stats.max - stats.min;
        if spread == 0.0 {
            return 1.0 / self.count as f64;
        }
        (value - stats.min) / spread
    }
}
