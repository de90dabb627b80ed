//! Advisor — binds services to the best offering of a region.
//!
//! For each service, in the order given, the advisor:
//! 1. Draws `min_instances` offerings from the region's permanent pool.
//! 2. Draws the remaining `total_instances - min_instances` offerings from
//!    the pool of all offerings, permanent and transient.
//!
//! A draw narrows the pool to the offerings that meet the service's memory
//! floor and takes the best weighted score among them. Draws never consume
//! capacity, so every draw of one service from one pool yields the same
//! offering; the advisor selects once per (service, pool) and records the
//! draw count.
//!
//! Callers should order services by decreasing memory floor
//! (see [`spotgrid_core::order_by_memory_demand`]) so the most constrained
//! requirements are handled first.

use spotgrid_core::{AdvisorWeights, Instance, Service, validate_services};
use tracing::{debug, info};

use crate::advice::RegionAdvice;
use crate::aggregates::{Aggregates, Metric};
use crate::error::{AdviseError, AdviseResult, EngineError, EngineResult};
use crate::pool::{CandidatePool, PoolKind, RegionPool};
use crate::search::sort_then_find;
use crate::sort::{SortKey, SortWeights, sort_range};

/// Stateless selection engine configured with scoring weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Advisor {
    weights: SortWeights,
}

impl Advisor {
    pub fn new(preferences: &AdvisorWeights) -> Self {
        Self::with_sort_weights(SortWeights::from_preferences(preferences))
    }

    pub fn with_sort_weights(weights: SortWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &SortWeights {
        &self.weights
    }

    /// Pick the best offering of `pool` for `service`.
    ///
    /// Works on a private vector of references, so the pool itself is
    /// never reordered and the result depends only on the pool, the
    /// service, and the weights. Feasible offerings are ranked after being
    /// ordered by memory, so equal scores resolve to the smallest memory
    /// and then to pool order.
    pub fn select_one<'p>(
        &self,
        pool: &'p CandidatePool,
        kind: PoolKind,
        service: &Service,
    ) -> EngineResult<&'p Instance> {
        let infeasible = |largest_gb| EngineError::NoFeasibleInstance {
            pool: kind,
            required_gb: service.min_memory,
            largest_gb,
        };

        if pool.is_empty() {
            return Err(infeasible(None));
        }
        let computed;
        let aggregates = match &pool.aggregates {
            Some(aggregates) => aggregates,
            None => {
                computed = Aggregates::compute(&pool.instances)?;
                &computed
            }
        };

        let mut candidates: Vec<&Instance> = pool.instances.iter().collect();
        let end = candidates.len();
        let floor = sort_then_find(&mut candidates, Metric::Memory, service.min_memory, 0..end)?;

        // A short floor means the search saturated to the largest offering.
        if candidates[floor].memory_gb < service.min_memory {
            return Err(infeasible(Some(candidates[floor].memory_gb)));
        }

        let key = SortKey::WeightedWithVcpuLimit {
            aggregates,
            weights: self.weights,
            max_vcpu: service.max_vcpu,
        };
        sort_range(&mut candidates, floor..end, &key)?;
        Ok(candidates[floor])
    }

    /// Advise one region for every service.
    pub fn advise_for_region(
        &self,
        pool: &RegionPool,
        services: &[Service],
    ) -> AdviseResult<RegionAdvice> {
        self.advise_for_region_until(pool, services, || false)
    }

    /// Like [`Advisor::advise_for_region`], but checks `should_stop` before
    /// each service and gives up with [`AdviseError::Cancelled`].
    pub fn advise_for_region_until(
        &self,
        pool: &RegionPool,
        services: &[Service],
        should_stop: impl Fn() -> bool,
    ) -> AdviseResult<RegionAdvice> {
        validate_services(services)?;

        let mut advice = RegionAdvice::new(pool.region.clone());
        for service in services {
            if should_stop() {
                return Err(AdviseError::Cancelled(service.name.clone()));
            }

            for (kind, count) in [
                (PoolKind::Permanent, service.min_instances),
                (PoolKind::All, service.transient_instances()),
            ] {
                if count == 0 {
                    continue;
                }
                let instance = self
                    .select_one(pool.pool(kind), kind, service)
                    .map_err(|source| AdviseError::Selection {
                        service: service.name.clone(),
                        source,
                    })?;
                debug!(
                    region = %pool.region,
                    service = %service.name,
                    instance = %instance.id,
                    pool = %kind,
                    count,
                    "selected instance"
                );
                advice.record(&service.name, instance, count);
            }
        }

        info!(
            region = %pool.region,
            services = services.len(),
            instances = advice.instances.len(),
            hourly_cost = advice.hourly_cost(),
            "region advice complete"
        );
        Ok(advice)
    }
}
