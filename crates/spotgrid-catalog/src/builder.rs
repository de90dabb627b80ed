//! Grouping offerings into per-region pools.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use spotgrid_core::{Instance, RegionCode};
use spotgrid_engine::{Catalog, RegionPool};
use tracing::info;

use crate::error::{CatalogError, CatalogResult};

/// Validate offerings and group them into region pools.
///
/// Offerings keep their source order within each region.
pub fn build_catalog(instances: Vec<Instance>) -> CatalogResult<Catalog> {
    let mut seen = HashSet::new();
    let mut by_region: BTreeMap<RegionCode, Vec<Instance>> = BTreeMap::new();

    for instance in instances {
        instance.validate()?;
        if !seen.insert(instance.id.clone()) {
            return Err(CatalogError::DuplicateInstance(instance.id));
        }
        by_region
            .entry(instance.region.clone())
            .or_default()
            .push(instance);
    }

    let catalog: Catalog = by_region
        .into_iter()
        .map(|(region, instances)| {
            let pool = RegionPool::from_instances(region.clone(), instances);
            (region, pool)
        })
        .collect();

    info!(
        regions = catalog.len(),
        offerings = seen.len(),
        "built catalog"
    );
    Ok(catalog)
}

/// Per-region overview of a catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub region: RegionCode,
    pub permanent: usize,
    pub transient: usize,
    pub min_price_per_hour: f64,
    pub max_price_per_hour: f64,
    pub max_memory_gb: f64,
}

/// Summarise every region of a catalog, in region order.
pub fn summarize(catalog: &Catalog) -> Vec<RegionSummary> {
    catalog
        .values()
        .filter_map(|pool| {
            let aggregates = pool.all.aggregates.as_ref()?;
            let max_memory_gb = pool
                .all
                .instances
                .iter()
                .map(|i| i.memory_gb)
                .fold(0.0, f64::max);
            Some(RegionSummary {
                region: pool.region.clone(),
                permanent: pool.permanent.len(),
                transient: pool.all.len() - pool.permanent.len(),
                min_price_per_hour: aggregates.price_per_hour.min,
                max_price_per_hour: aggregates.price_per_hour.max,
                max_memory_gb,
            })
        })
        .collect()
}
