//! Multi-region advisory — one advisor run per region, then a winner.
//!
//! Regions share no mutable state, so the concurrent variant runs one
//! blocking worker per region and collects results as they finish. A
//! region either completes or is reported as a failure; an infeasible
//! service in one region never affects the others.

use std::collections::{BTreeMap, BTreeSet};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use regex::Regex;
use serde::{Deserialize, Serialize};
use spotgrid_core::{RegionCode, Service};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::advice::RegionAdvice;
use crate::advisor::Advisor;
use crate::error::{AdviseError, AdviseResult};
use crate::pool::{Catalog, RegionPool};
use crate::region_score::RegionScorer;

/// Why a region produced no advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum RegionFailure {
    /// A service cannot be satisfied by the region's catalog.
    #[error("{0}")]
    Infeasible(String),
    #[error("{0}")]
    Failed(String),
    #[error("cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    TimedOut,
}

impl From<&AdviseError> for RegionFailure {
    fn from(err: &AdviseError) -> Self {
        match err {
            AdviseError::Cancelled(_) => RegionFailure::Cancelled,
            err if err.is_infeasible() => RegionFailure::Infeasible(err.to_string()),
            err => RegionFailure::Failed(err.to_string()),
        }
    }
}

/// Knobs for a multi-region run.
#[derive(Debug, Clone, Default)]
pub struct FleetOptions {
    /// Give up on regions still running after this long.
    pub deadline: Option<Duration>,
    /// Only advise regions whose code matches.
    pub region_filter: Option<Regex>,
}

/// Advice for every region plus the winning region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetAdvice {
    pub regions: BTreeMap<RegionCode, RegionAdvice>,
    pub failures: BTreeMap<RegionCode, RegionFailure>,
    /// Lowest-scoring region; ties go to the smallest region code.
    pub chosen_region: Option<RegionCode>,
    pub scorer: String,
}

impl FleetAdvice {
    fn new(scorer: &str) -> Self {
        Self {
            regions: BTreeMap::new(),
            failures: BTreeMap::new(),
            chosen_region: None,
            scorer: scorer.to_string(),
        }
    }

    pub fn chosen(&self) -> Option<&RegionAdvice> {
        self.chosen_region.as_ref().and_then(|r| self.regions.get(r))
    }

    fn choose_region(&mut self) {
        let mut best: Option<&RegionAdvice> = None;
        for advice in self.regions.values() {
            if best.is_none_or(|b| advice.score.total_cmp(&b.score).is_lt()) {
                best = Some(advice);
            }
        }
        self.chosen_region = best.map(|b| b.region.clone());
    }

    fn finish(mut self) -> Self {
        self.choose_region();
        info!(
            regions = self.regions.len(),
            failures = self.failures.len(),
            chosen = self.chosen_region.as_deref().unwrap_or("none"),
            scorer = %self.scorer,
            "fleet advice complete"
        );
        self
    }
}

fn selected<'c>(
    catalog: &'c Catalog,
    filter: Option<&'c Regex>,
) -> impl Iterator<Item = (&'c RegionCode, &'c RegionPool)> + 'c {
    catalog
        .iter()
        .filter(move |(region, _)| filter.is_none_or(|re| re.is_match(region)))
}

fn advise_and_score(
    advisor: &Advisor,
    scorer: &dyn RegionScorer,
    pool: &RegionPool,
    services: &[Service],
    should_stop: impl Fn() -> bool,
) -> AdviseResult<RegionAdvice> {
    let mut advice = advisor.advise_for_region_until(pool, services, should_stop)?;
    advice.score = scorer.score(&advice, pool, advisor.weights());
    debug!(region = %pool.region, score = advice.score, "scored region");
    Ok(advice)
}

/// Advise every region one after another.
pub fn advise_across_regions(
    catalog: &Catalog,
    services: &[Service],
    advisor: &Advisor,
    scorer: &dyn RegionScorer,
    options: &FleetOptions,
) -> FleetAdvice {
    let started = Instant::now();
    let expired = || options.deadline.is_some_and(|d| started.elapsed() >= d);

    let mut fleet = FleetAdvice::new(scorer.name());
    for (region, pool) in selected(catalog, options.region_filter.as_ref()) {
        match advise_and_score(advisor, scorer, pool, services, expired) {
            Ok(advice) => {
                fleet.regions.insert(region.clone(), advice);
            }
            Err(AdviseError::Cancelled(_)) => {
                fleet.failures.insert(region.clone(), RegionFailure::TimedOut);
            }
            Err(err) => {
                warn!(region = %region, error = %err, "region advice failed");
                fleet.failures.insert(region.clone(), RegionFailure::from(&err));
            }
        }
    }
    fleet.finish()
}

async fn sleep_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Advise every region concurrently, one blocking worker per region.
///
/// Each worker reads its own region pool from the shared, read-only
/// catalog. When the deadline passes or `cancel` turns `true`, workers
/// are told to stop, finished regions are kept, and unfinished regions
/// are reported as [`RegionFailure::TimedOut`] or
/// [`RegionFailure::Cancelled`].
pub async fn advise_across_regions_concurrently(
    catalog: Arc<Catalog>,
    services: Arc<[Service]>,
    advisor: Advisor,
    scorer: Arc<dyn RegionScorer>,
    options: FleetOptions,
    mut cancel: watch::Receiver<bool>,
) -> FleetAdvice {
    // A deadline too far out to represent is no deadline.
    let deadline = options
        .deadline
        .and_then(|d| tokio::time::Instant::now().checked_add(d));
    let stop = Arc::new(AtomicBool::new(false));

    let mut fleet = FleetAdvice::new(scorer.name());
    let mut pending = BTreeSet::new();
    let mut workers = JoinSet::new();

    for (region, _) in selected(&catalog, options.region_filter.as_ref()) {
        pending.insert(region.clone());

        let region = region.clone();
        let catalog = Arc::clone(&catalog);
        let services = Arc::clone(&services);
        let advisor = advisor.clone();
        let scorer = Arc::clone(&scorer);
        let stop = Arc::clone(&stop);
        workers.spawn_blocking(move || {
            let pool = &catalog[&region];
            let result = catch_unwind(AssertUnwindSafe(|| {
                advise_and_score(&advisor, scorer.as_ref(), pool, &services, || {
                    stop.load(Ordering::Relaxed)
                })
            }))
            .map_err(|_| RegionFailure::Failed("region worker panicked".to_string()))
            .and_then(|result| result.map_err(|err| RegionFailure::from(&err)));
            (region, result)
        });
    }

    let mut cancel_open = true;
    let mut interrupted = None;
    loop {
        if *cancel.borrow() {
            interrupted = Some(RegionFailure::Cancelled);
            break;
        }
        if deadline.is_some_and(|d| tokio::time::Instant::now() >= d) {
            interrupted = Some(RegionFailure::TimedOut);
            break;
        }

        let joined = tokio::select! {
            biased;
            changed = cancel.changed(), if cancel_open => {
                // A dropped sender can no longer cancel us.
                cancel_open = changed.is_ok();
                continue;
            }
            _ = sleep_until(deadline) => continue,
            joined = workers.join_next() => joined,
        };

        match joined {
            None => break,
            Some(Ok((region, outcome))) => {
                pending.remove(&region);
                match outcome {
                    Ok(advice) => {
                        fleet.regions.insert(region, advice);
                    }
                    Err(failure) => {
                        warn!(region = %region, error = %failure, "region advice failed");
                        fleet.failures.insert(region, failure);
                    }
                }
            }
            Some(Err(err)) => {
                warn!(error = %err, "region worker did not complete");
            }
        }
    }

    if let Some(reason) = &interrupted {
        stop.store(true, Ordering::Relaxed);
        workers.abort_all();
        info!(
            unfinished = pending.len(),
            reason = %reason,
            "fleet advice interrupted"
        );
    }
    for region in pending {
        let failure = interrupted
            .clone()
            .unwrap_or_else(|| RegionFailure::Failed("region worker did not report".to_string()));
        fleet.failures.insert(region, failure);
    }

    fleet.finish()
}
