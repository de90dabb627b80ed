//! Advice output handed to serialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use spotgrid_core::{Instance, InstanceId, RegionCode, ServiceName};

/// Bidirectional service ↔ instance bindings.
///
/// `services_to_instances[s]` holds one id per drawn instance, so its
/// length is the number of instances advised for `s`. Each service is
/// listed once under every instance it uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignments {
    pub services_to_instances: BTreeMap<ServiceName, Vec<InstanceId>>,
    pub instances_to_services: BTreeMap<InstanceId, Vec<ServiceName>>,
}

impl Assignments {
    /// Record one drawn instance for a service, keeping both maps in step.
    pub fn assign(&mut self, service: &str, instance: &str) {
        self.services_to_instances
            .entry(service.to_string())
            .or_default()
            .push(instance.to_string());

        let services = self
            .instances_to_services
            .entry(instance.to_string())
            .or_default();
        if !services.iter().any(|s| s == service) {
            services.push(service.to_string());
        }
    }

    /// Number of instances drawn for a service.
    pub fn draws(&self, service: &str) -> usize {
        self.services_to_instances
            .get(service)
            .map_or(0, Vec::len)
    }

    /// True when `i ∈ services_to_instances[s] ⟺ s ∈ instances_to_services[i]`.
    pub fn is_consistent(&self) -> bool {
        let forward = self.services_to_instances.iter().all(|(s, ids)| {
            ids.iter().all(|i| {
                self.instances_to_services
                    .get(i)
                    .is_some_and(|services| services.contains(s))
            })
        });
        let backward = self.instances_to_services.iter().all(|(i, services)| {
            services.iter().all(|s| {
                self.services_to_instances
                    .get(s)
                    .is_some_and(|ids| ids.contains(i))
            })
        });
        forward && backward
    }
}

/// Advice for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAdvice {
    pub region: RegionCode,
    /// Region score from the configured scorer. Lower is better.
    pub score: f64,
    /// Every instance referenced by `assignments`, by id.
    pub instances: BTreeMap<InstanceId, Instance>,
    pub assignments: Assignments,
}

impl RegionAdvice {
    pub fn new(region: impl Into<RegionCode>) -> Self {
        Self {
            region: region.into(),
            score: 0.0,
            instances: BTreeMap::new(),
            assignments: Assignments::default(),
        }
    }

    /// Record `count` draws of `instance` for `service`.
    pub fn record(&mut self, service: &str, instance: &Instance, count: u32) {
        if count == 0 {
            return;
        }
        for _ in 0..count {
            self.assignments.assign(service, &instance.id);
        }
        self.instances
            .entry(instance.id.clone())
            .or_insert_with(|| instance.clone());
    }

    /// Hourly cost of every drawn instance.
    pub fn hourly_cost(&self) -> f64 {
        self.draws()
            .map(|(instance, count)| instance.price_per_hour * count as f64)
            .sum()
    }

    /// Each advised instance with how many times it was drawn overall.
    pub fn draws(&self) -> impl Iterator<Item = (&Instance, usize)> + '_ {
        self.instances.values().map(|instance| {
            let count = self
                .assignments
                .services_to_instances
                .values()
                .flatten()
                .filter(|id| **id == instance.id)
                .count();
            (instance, count)
        })
    }
}
