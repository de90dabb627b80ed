//! Range sorts over candidate pools.
//!
//! Every sort is stable and ascending, and touches only `pool[range]`.
//! Weighted sorts rank by a composite score where lower is better, so
//! the best candidate of a sorted range is always at `range.start`.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use spotgrid_core::{AdvisorWeights, Instance};

use crate::aggregates::{Aggregates, Metric};
use crate::error::{EngineError, EngineResult};

/// Signed scoring coefficients.
///
/// A negative weight means larger values of that dimension are preferred.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SortWeights {
    pub vcpu: f64,
    pub revocation_probability: f64,
    pub price: f64,
}

impl SortWeights {
    /// Translate user preferences into scoring coefficients.
    ///
    /// Performance rewards more vCPUs, so its sign is flipped. Availability
    /// and price penalise revocation probability and cost directly.
    pub fn from_preferences(preferences: &AdvisorWeights) -> Self {
        Self {
            vcpu: -preferences.performance,
            revocation_probability: preferences.availability,
            price: preferences.price,
        }
    }
}

impl From<&AdvisorWeights> for SortWeights {
    fn from(preferences: &AdvisorWeights) -> Self {
        Self::from_preferences(preferences)
    }
}

/// What to sort a range by.
#[derive(Debug, Clone, Copy)]
pub enum SortKey<'a> {
    /// A single numeric dimension.
    Metric(Metric),
    Region,
    Os,
    Weighted {
        aggregates: &'a Aggregates,
        weights: SortWeights,
    },
    /// Weighted score with the vCPU term capped at `max_vcpu`.
    WeightedWithVcpuLimit {
        aggregates: &'a Aggregates,
        weights: SortWeights,
        max_vcpu: f64,
    },
}

impl From<Metric> for SortKey<'_> {
    fn from(metric: Metric) -> Self {
        SortKey::Metric(metric)
    }
}

/// Composite score of an offering. Lower is better.
pub fn weighted_score(instance: &Instance, aggregates: &Aggregates, weights: &SortWeights) -> f64 {
    score_with_vcpu(instance, instance.vcpu, aggregates, weights)
}

/// Composite score where vCPUs beyond `max_vcpu` neither help nor hurt.
pub fn weighted_score_with_vcpu_limiter(
    instance: &Instance,
    aggregates: &Aggregates,
    weights: &SortWeights,
    max_vcpu: f64,
) -> f64 {
    let vcpu = if instance.vcpu >= max_vcpu {
        max_vcpu
    } else {
        instance.vcpu
    };
    score_with_vcpu(instance, vcpu, aggregates, weights)
}

fn score_with_vcpu(
    instance: &Instance,
    vcpu: f64,
    aggregates: &Aggregates,
    weights: &SortWeights,
) -> f64 {
    weights.vcpu * aggregates.normalise_vcpu(vcpu)
        + weights.revocation_probability
            * aggregates.normalise_revocation_probability(instance.revocation_probability)
        + weights.price * aggregates.normalise_price_per_hour(instance.price_per_hour)
}

/// Sort `pool[range]` ascending by `key`, in place and stable.
///
/// Weighted scores are computed once per element.
pub fn sort_range<T: Borrow<Instance>>(
    pool: &mut [T],
    range: Range<usize>,
    key: &SortKey<'_>,
) -> EngineResult<()> {
    if range.start > range.end || range.end > pool.len() {
        return Err(EngineError::InvalidRange {
            start: range.start,
            end: range.end,
            len: pool.len(),
        });
    }

    let slice = &mut pool[range];
    match *key {
        SortKey::Metric(metric) => slice.sort_by(|a, b| {
            metric.of(a.borrow()).total_cmp(&metric.of(b.borrow()))
        }),
        SortKey::Region => slice.sort_by(|a, b| a.borrow().region.cmp(&b.borrow().region)),
        SortKey::Os => slice.sort_by(|a, b| a.borrow().os.cmp(&b.borrow().os)),
        SortKey::Weighted {
            aggregates,
            weights,
        } => slice.sort_by_cached_key(|i| {
            TotalScore(weighted_score(i.borrow(), aggregates, &weights))
        }),
        SortKey::WeightedWithVcpuLimit {
            aggregates,
            weights,
            max_vcpu,
        } => slice.sort_by_cached_key(|i| {
            TotalScore(weighted_score_with_vcpu_limiter(
                i.borrow(),
                aggregates,
                &weights,
                max_vcpu,
            ))
        }),
    }
    Ok(())
}

/// Score ordered by `f64::total_cmp`, usable as a sort key.
struct TotalScore(f64);

impl PartialEq for TotalScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TotalScore {}

impl PartialOrd for TotalScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TotalScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotgrid_core::Lifecycle;

    fn make(id: &str, mem: f64, vcpu: f64, price: f64, revoc: f64) -> Instance {
        Instance {
            id: id.to_string(),
            name: id.to_string(),
            memory_gb: mem,
            vcpu,
            region: "us-east-1".to_string(),
            az: "us-east-1a".to_string(),
            os: "linux".to_string(),
            price_per_hour: price,
            revocation_probability: revoc,
            lifecycle: Lifecycle::Transient,
        }
    }

    fn pool() -> Vec<Instance> {
        vec![
            make("c", 16.0, 8.0, 0.05, 0.3),
            make("a", 4.0, 2.0, 0.01, 0.1),
            make("b", 8.0, 4.0, 0.02, 0.05),
        ]
    }

    fn ids<T: Borrow<Instance>>(pool: &[T]) -> Vec<&str> {
        pool.iter().map(|i| i.borrow().id.as_str()).collect()
    }

    fn weights(price: f64, availability: f64, performance: f64) -> SortWeights {
        SortWeights::from_preferences(&AdvisorWeights {
            price,
            availability,
            performance,
        })
    }

    #[test]
    fn preference_sign_convention() {
        let w = weights(1.0, 2.0, 3.0);
        assert_eq!(w.price, 1.0);
        assert_eq!(w.revocation_probability, 2.0);
        assert_eq!(w.vcpu, -3.0);
    }

    #[test]
    fn sorts_by_each_metric() {
        let mut p = pool();
        sort_range(&mut p, 0..3, &Metric::Memory.into()).unwrap();
        assert_eq!(ids(&p), ["a", "b", "c"]);

        sort_range(&mut p, 0..3, &Metric::RevocationProbability.into()).unwrap();
        assert_eq!(ids(&p), ["b", "a", "c"]);

        sort_range(&mut p, 0..3, &Metric::Price.into()).unwrap();
        assert_eq!(ids(&p), ["a", "b", "c"]);
    }

    #[test]
    fn sorts_by_region_and_os() {
        let mut p = pool();
        p[0].region = "us-west-2".to_string();
        p[1].region = "eu-west-1".to_string();
        p[2].os = "windows".to_string();

        sort_range(&mut p, 0..3, &SortKey::Region).unwrap();
        assert_eq!(ids(&p), ["a", "b", "c"]);

        sort_range(&mut p, 0..3, &SortKey::Os).unwrap();
        assert_eq!(ids(&p), ["a", "c", "b"]);
    }

    #[test]
    fn sorts_only_the_requested_range() {
        let mut p = pool();
        sort_range(&mut p, 1..3, &Metric::Memory.into()).unwrap();
        assert_eq!(ids(&p), ["c", "a", "b"]);

        sort_range(&mut p, 0..2, &Metric::Memory.into()).unwrap();
        assert_eq!(ids(&p), ["a", "c", "b"]);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let mut p = vec![
            make("x", 8.0, 2.0, 0.02, 0.0),
            make("y", 4.0, 2.0, 0.02, 0.0),
            make("z", 8.0, 2.0, 0.02, 0.0),
        ];
        sort_range(&mut p, 0..3, &Metric::Memory.into()).unwrap();
        assert_eq!(ids(&p), ["y", "x", "z"]);

        let agg = Aggregates::compute(&p).unwrap();
        let key = SortKey::Weighted {
            aggregates: &agg,
            weights: weights(1.0, 1.0, 1.0),
        };
        sort_range(&mut p, 0..3, &key).unwrap();
        assert_eq!(ids(&p), ["y", "x", "z"]);
    }

    #[test]
    fn rejects_out_of_bounds_range() {
        let mut p = pool();
        assert_eq!(
            sort_range(&mut p, 1..4, &SortKey::Os),
            Err(EngineError::InvalidRange {
                start: 1,
                end: 4,
                len: 3
            })
        );
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = 2..1;
        assert!(sort_range(&mut p, reversed, &SortKey::Os).is_err());
        assert!(sort_range(&mut p, 3..3, &SortKey::Os).is_ok());
    }

    #[test]
    fn price_weight_ranks_cheapest_first() {
        let mut p = pool();
        let agg = Aggregates::compute(&p).unwrap();
        let key = SortKey::Weighted {
            aggregates: &agg,
            weights: weights(1.0, 0.0, 0.0),
        };
        sort_range(&mut p, 0..3, &key).unwrap();
        assert_eq!(ids(&p), ["a", "b", "c"]);
    }

    #[test]
    fn performance_weight_ranks_most_vcpu_first() {
        let mut p = pool();
        let agg = Aggregates::compute(&p).unwrap();
        let key = SortKey::Weighted {
            aggregates: &agg,
            weights: weights(0.0, 0.0, 1.0),
        };
        sort_range(&mut p, 0..3, &key).unwrap();
        assert_eq!(ids(&p), ["c", "b", "a"]);
    }

    #[test]
    fn availability_weight_ranks_least_revocable_first() {
        let mut p = pool();
        let agg = Aggregates::compute(&p).unwrap();
        let key = SortKey::Weighted {
            aggregates: &agg,
            weights: weights(0.0, 1.0, 0.0),
        };
        sort_range(&mut p, 0..3, &key).unwrap();
        assert_eq!(ids(&p), ["b", "a", "c"]);
    }

    #[test]
    fn vcpu_limiter_flattens_scores_beyond_ceiling() {
        let p = pool();
        let agg = Aggregates::compute(&p).unwrap();
        let w = weights(0.0, 0.0, 1.0);

        // b (4 vCPU) and c (8 vCPU) both reach a ceiling of 4.
        let b = weighted_score_with_vcpu_limiter(&p[2], &agg, &w, 4.0);
        let c = weighted_score_with_vcpu_limiter(&p[0], &agg, &w, 4.0);
        assert_eq!(b, c);

        // Below the ceiling the limiter is the plain score.
        let a = weighted_score_with_vcpu_limiter(&p[1], &agg, &w, 4.0);
        assert_eq!(a, weighted_score(&p[1], &agg, &w));
        assert!(a > b);
    }

    #[test]
    fn vcpu_limiter_is_monotone_then_constant() {
        let p = pool();
        let agg = Aggregates::compute(&p).unwrap();
        let max_vcpu = 6.0;

        let penalise_vcpu = SortWeights {
            vcpu: 1.0,
            revocation_probability: 0.5,
            price: 0.5,
        };
        for w in [weights(0.0, 0.0, 1.0), penalise_vcpu] {
            let mut sample = make("sample", 8.0, 1.0, 0.03, 0.1);
            let mut previous: Option<f64> = None;
            let mut capped = Vec::new();

            for step in 1..=16 {
                sample.vcpu = step as f64 * 0.5;
                let score = weighted_score_with_vcpu_limiter(&sample, &agg, &w, max_vcpu);
                if sample.vcpu >= max_vcpu {
                    capped.push(score);
                } else if let Some(prev) = previous {
                    // Direction follows the sign of the vCPU weight.
                    if w.vcpu < 0.0 {
                        assert!(score <= prev);
                    } else {
                        assert!(score >= prev);
                    }
                }
                previous = Some(score);
            }

            assert!(capped.len() > 1);
            assert!(capped.windows(2).all(|pair| pair[0] == pair[1]));
        }
    }

    #[test]
    fn weighted_limit_sort_prefers_cheaper_once_ceiling_reached() {
        let mut p = pool();
        let agg = Aggregates::compute(&p).unwrap();
        let key = SortKey::WeightedWithVcpuLimit {
            aggregates: &agg,
            weights: weights(1.0, 0.0, 1.0),
            max_vcpu: 4.0,
        };
        sort_range(&mut p, 0..3, &key).unwrap();
        // c's extra cores count only up to 4, which no longer offsets its price.
        assert_eq!(ids(&p), ["b", "a", "c"]);
    }

    #[test]
    fn sorts_borrowed_pools() {
        let owned = pool();
        let mut refs: Vec<&Instance> = owned.iter().collect();
        sort_range(&mut refs, 0..3, &Metric::Vcpu.into()).unwrap();
        assert_eq!(ids(&refs), ["a", "b", "c"]);
        assert_eq!(ids(&owned), ["c", "a", "b"]);
    }
}
