//! Ranking the advice of different regions.
//!
//! Scores follow the same convention as instance scores: lower is better.
//! How regions should be compared is still a product decision, so the
//! default scorer is a placeholder that ranks every region equally.

use spotgrid_core::config::RegionScoring;

use crate::advice::RegionAdvice;
use crate::pool::RegionPool;
use crate::sort::{SortWeights, weighted_score};

/// Strategy for scoring a region's advice.
pub trait RegionScorer: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, advice: &RegionAdvice, pool: &RegionPool, weights: &SortWeights) -> f64;
}

/// Scores every region `0.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderScorer;

impl RegionScorer for PlaceholderScorer {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn score(&self, _advice: &RegionAdvice, _pool: &RegionPool, _weights: &SortWeights) -> f64 {
        0.0
    }
}

/// Scores a region by the hourly cost of everything it was advised.
#[derive(Debug, Clone, Copy, Default)]
pub struct HourlyCostScorer;

impl RegionScorer for HourlyCostScorer {
    fn name(&self) -> &'static str {
        "hourly-cost"
    }

    fn score(&self, advice: &RegionAdvice, _pool: &RegionPool, _weights: &SortWeights) -> f64 {
        advice.hourly_cost()
    }
}

/// Sums the weighted score of every drawn instance against the
/// statistics of the region's full pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedSumScorer;

impl RegionScorer for WeightedSumScorer {
    fn name(&self) -> &'static str {
        "weighted-sum"
    }

    fn score(&self, advice: &RegionAdvice, pool: &RegionPool, weights: &SortWeights) -> f64 {
        let Some(aggregates) = &pool.all.aggregates else {
            return 0.0;
        };
        advice
            .draws()
            .map(|(instance, count)| weighted_score(instance, aggregates, weights) * count as f64)
            .sum()
    }
}

/// Build the scorer selected in configuration.
pub fn scorer_for(scoring: RegionScoring) -> Box<dyn RegionScorer> {
    match scoring {
        RegionScoring::Placeholder => Box::new(PlaceholderScorer),
        RegionScoring::HourlyCost => Box::new(HourlyCostScorer),
        RegionScoring::WeightedSum => Box::new(WeightedSumScorer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotgrid_core::{Instance, Lifecycle};

    fn make(id: &str, vcpu: f64, price: f64) -> Instance {
        Instance {
            id: id.to_string(),
            name: id.to_string(),
            memory_gb: 8.0,
            vcpu,
            region: "eu-central-1".to_string(),
            az: "eu-central-1a".to_string(),
            os: "linux".to_string(),
            price_per_hour: price,
            revocation_probability: 0.0,
            lifecycle: Lifecycle::Permanent,
        }
    }

    fn setup() -> (RegionPool, RegionAdvice) {
        let cheap = make("cheap", 2.0, 0.1);
        let pricey = make("pricey", 8.0, 0.5);
        let pool = RegionPool::from_instances("eu-central-1", vec![cheap.clone(), pricey.clone()]);

        let mut advice = RegionAdvice::new("eu-central-1");
        advice.record("api", &cheap, 2);
        advice.record("batch", &pricey, 1);
        (pool, advice)
    }

    fn price_weights() -> SortWeights {
        SortWeights {
            vcpu: 0.0,
            revocation_probability: 0.0,
            price: 1.0,
        }
    }

    #[test]
    fn placeholder_is_constant() {
        let (pool, advice) = setup();
        assert_eq!(PlaceholderScorer.score(&advice, &pool, &price_weights()), 0.0);
    }

    #[test]
    fn hourly_cost_sums_draws() {
        let (pool, advice) = setup();
        let score = HourlyCostScorer.score(&advice, &pool, &price_weights());
        assert!((score - 0.7).abs() < 1e-12);
    }

    #[test]
    fn weighted_sum_counts_every_draw() {
        let (pool, advice) = setup();
        // cheap normalises to 0, pricey to 1.
        assert_eq!(WeightedSumScorer.score(&advice, &pool, &price_weights()), 1.0);
    }

    #[test]
    fn scorer_for_config() {
        assert_eq!(scorer_for(RegionScoring::Placeholder).name(), "placeholder");
        assert_eq!(scorer_for(RegionScoring::HourlyCost).name(), "hourly-cost");
        assert_eq!(scorer_for(RegionScoring::WeightedSum).name(), "weighted-sum");
    }
}
