//! Domain types for SpotGrid.
//!
//! These types describe the compute offerings in a catalog, the workloads
//! that need instances, and the user-facing preference weights. All of
//! them are serializable so catalogs and requests can be read from JSON
//! or TOML.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};

/// Unique identifier for an offering within a catalog snapshot.
pub type InstanceId = String;

/// Unique name of a service within an advice request.
pub type ServiceName = String;

/// Cloud region code, e.g. `us-east-1`.
pub type RegionCode = String;

// ── Instance ───────────────────────────────────────────────────────

/// Whether an offering can be revoked by the provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Stable, on-demand capacity.
    #[default]
    Permanent,
    /// Revocable (spot) capacity: cheaper, but may be reclaimed.
    Transient,
}

impl Lifecycle {
    pub fn label(&self) -> &'static str {
        match self {
            Lifecycle::Permanent => "permanent",
            Lifecycle::Transient => "transient",
        }
    }
}

/// One purchasable compute offering.
///
/// Offerings are immutable once fetched from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instance {
    pub id: InstanceId,
    /// Instance type name, e.g. `m5.large`.
    pub name: String,
    pub memory_gb: f64,
    pub vcpu: f64,
    pub region: RegionCode,
    /// Availability zone, e.g. `us-east-1a`.
    #[serde(default)]
    pub az: String,
    #[serde(default)]
    pub os: String,
    pub price_per_hour: f64,
    /// Probability the offering is reclaimed; zero for permanent offerings.
    #[serde(default)]
    pub revocation_probability: f64,
    #[serde(default)]
    pub lifecycle: Lifecycle,
}

impl Instance {
    /// Check the numeric invariants of an offering.
    pub fn validate(&self) -> ValidationResult<()> {
        let fail = |reason: String| {
            Err(ValidationError::Instance {
                id: self.id.clone(),
                reason,
            })
        };

        if self.id.is_empty() {
            return fail("id must not be empty".to_string());
        }
        if !self.memory_gb.is_finite() || self.memory_gb < 0.0 {
            return fail(format!("memory_gb must be >= 0, got {}", self.memory_gb));
        }
        if !self.vcpu.is_finite() || self.vcpu <= 0.0 {
            return fail(format!("vcpu must be > 0, got {}", self.vcpu));
        }
        if !self.price_per_hour.is_finite() || self.price_per_hour < 0.0 {
            return fail(format!(
                "price_per_hour must be >= 0, got {}",
                self.price_per_hour
            ));
        }
        if !(0.0..=1.0).contains(&self.revocation_probability) {
            return fail(format!(
                "revocation_probability must be within [0, 1], got {}",
                self.revocation_probability
            ));
        }
        if self.lifecycle == Lifecycle::Permanent && self.revocation_probability != 0.0 {
            return fail("permanent offerings cannot be revoked".to_string());
        }
        Ok(())
    }

    pub fn is_transient(&self) -> bool {
        self.lifecycle == Lifecycle::Transient
    }
}

// ── Service ────────────────────────────────────────────────────────

/// A workload's instance requirements.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub name: ServiceName,
    /// Memory floor per instance, in GB.
    pub min_memory: f64,
    /// vCPU count beyond which extra cores add nothing.
    pub max_vcpu: f64,
    /// Instances that must come from permanent capacity.
    pub min_instances: u32,
    /// Total instances, permanent plus transient.
    pub total_instances: u32,
}

impl Service {
    /// Number of instances that may be drawn from transient capacity.
    pub fn transient_instances(&self) -> u32 {
        self.total_instances.saturating_sub(self.min_instances)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        let fail = |reason: String| {
            Err(ValidationError::Service {
                name: self.name.clone(),
                reason,
            })
        };

        if self.name.is_empty() {
            return fail("name must not be empty".to_string());
        }
        if !self.min_memory.is_finite() || self.min_memory < 0.0 {
            return fail(format!("min_memory must be >= 0, got {}", self.min_memory));
        }
        if !self.max_vcpu.is_finite() || self.max_vcpu <= 0.0 {
            return fail(format!("max_vcpu must be > 0, got {}", self.max_vcpu));
        }
        if self.min_instances > self.total_instances {
            return fail(format!(
                "min_instances ({}) exceeds total_instances ({})",
                self.min_instances, self.total_instances
            ));
        }
        Ok(())
    }
}

/// Validate every service and reject duplicate names.
pub fn validate_services(services: &[Service]) -> ValidationResult<()> {
    let mut seen = HashSet::new();
    for service in services {
        service.validate()?;
        if !seen.insert(service.name.as_str()) {
            return Err(ValidationError::DuplicateService(service.name.clone()));
        }
    }
    Ok(())
}

/// Order services by decreasing memory floor.
///
/// The advisor processes services in the order it is given; callers use
/// this so the most constrained requirements are satisfied first. The sort
/// is stable, so services with equal floors keep their request order.
pub fn order_by_memory_demand(services: &mut [Service]) {
    services.sort_by(|a, b| b.min_memory.total_cmp(&a.min_memory));
}

// ── Weights ────────────────────────────────────────────────────────

/// User-facing preference strengths. All values are non-negative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdvisorWeights {
    /// Preference for cheaper offerings.
    pub price: f64,
    /// Preference for offerings that are unlikely to be revoked.
    pub availability: f64,
    /// Preference for offerings with more vCPUs.
    pub performance: f64,
}

impl Default for AdvisorWeights {
    fn default() -> Self {
        Self {
            price: 1.0,
            availability: 0.0,
            performance: 0.0,
        }
    }
}

impl AdvisorWeights {
    pub fn validate(&self) -> ValidationResult<()> {
        for (name, value) in [
            ("price", self.price),
            ("availability", self.availability),
            ("performance", self.performance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::Weight { name, value });
            }
        }
        Ok(())
    }
}
