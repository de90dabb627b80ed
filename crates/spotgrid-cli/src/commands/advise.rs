use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use regex::Regex;
use spotgrid_catalog::{JsonFileSource, SnapshotCache};
use spotgrid_core::{
    AdviceRequest, AdvisorWeights, Service, SpotgridConfig, order_by_memory_demand,
    validate_services,
};
use spotgrid_engine::{
    Advisor, FleetAdvice, FleetOptions, advise_across_regions_concurrently, scorer_for,
};
use tokio::sync::watch;
use tracing::info;

/// Everything an advisory run needs, resolved from config and flags.
#[derive(Debug)]
struct Plan {
    config: SpotgridConfig,
    services: Vec<Service>,
    weights: AdvisorWeights,
    catalog_path: PathBuf,
}

fn plan(config_path: &str, request: Option<&str>, catalog: Option<&str>) -> anyhow::Result<Plan> {
    let config = SpotgridConfig::from_file(Path::new(config_path))
        .with_context(|| format!("loading {config_path}"))?;

    let (mut services, weights) = match request {
        Some(path) => {
            let request = AdviceRequest::from_file(Path::new(path))
                .with_context(|| format!("loading request {path}"))?;
            let weights = request.weights.unwrap_or_else(|| config.weights.clone());
            (request.services, weights)
        }
        None => (config.services.clone(), config.weights.clone()),
    };

    if services.is_empty() {
        bail!("no services to advise; add [[services]] to {config_path} or pass --request");
    }
    weights.validate()?;
    validate_services(&services)?;
    order_by_memory_demand(&mut services);

    let catalog_path = catalog
        .map(PathBuf::from)
        .or_else(|| {
            config
                .catalog
                .as_ref()
                .and_then(|c| c.path.as_ref())
                .map(PathBuf::from)
        })
        .context("no catalog configured; set [catalog].path or pass --catalog")?;

    Ok(Plan {
        config,
        services,
        weights,
        catalog_path,
    })
}

async fn run(plan: Plan, cancel: watch::Receiver<bool>) -> anyhow::Result<FleetAdvice> {
    // Each run fetches once; `ttl` applies to long-lived embedders.
    let ttl = plan.config.catalog_ttl().unwrap_or(Duration::ZERO);
    let cache = SnapshotCache::new(JsonFileSource::new(&plan.catalog_path), ttl);
    let snapshot = cache.snapshot()?;

    let region_filter = plan
        .config
        .region_filter()
        .map(Regex::new)
        .transpose()
        .context("invalid [advisor].region_filter")?;
    let options = FleetOptions {
        deadline: plan.config.deadline(),
        region_filter,
    };

    info!(
        services = plan.services.len(),
        regions = snapshot.catalog.len(),
        scoring = ?plan.config.region_scoring(),
        "starting advisory"
    );

    let fleet = advise_across_regions_concurrently(
        Arc::clone(&snapshot.catalog),
        Arc::from(plan.services),
        Advisor::new(&plan.weights),
        Arc::from(scorer_for(plan.config.region_scoring())),
        options,
        cancel,
    )
    .await;
    Ok(fleet)
}

pub async fn advise(
    config_path: &str,
    request: Option<&str>,
    catalog: Option<&str>,
    format: &str,
) -> anyhow::Result<()> {
    let plan = plan(config_path, request, catalog)?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling advisory");
            let _ = cancel_tx.send(true);
        }
    });

    let fleet = run(plan, cancel_rx).await?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&fleet)?);
        }
        _ => {
            println!("{}", crate::report::format_advice(&fleet));
        }
    }

    if fleet.chosen_region.is_none() {
        bail!("no region can host every service");
    }
    Ok(())
}
