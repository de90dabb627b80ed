//! Human-readable output.

use spotgrid_catalog::RegionSummary;
use spotgrid_engine::{FleetAdvice, RegionAdvice};

pub fn format_advice(fleet: &FleetAdvice) -> String {
    let mut out = String::new();

    let chosen = fleet.chosen();
    let region = fleet.chosen_region.as_deref().unwrap_or("none");

    out.push_str("\n╔══════════════════════════════════════════╗\n");
    out.push_str("║  SpotGrid Instance Advice                ║\n");
    out.push_str("╠══════════════════════════════════════════╣\n");
    out.push_str(&format!("║  Region:   {:<29}║\n", region));
    out.push_str(&format!("║  Scorer:   {:<29}║\n", fleet.scorer));
    if let Some(advice) = chosen {
        let cost = format!("${:.4}/h", advice.hourly_cost());
        out.push_str(&format!("║  Cost:     {:<29}║\n", cost));
    }
    out.push_str("╚══════════════════════════════════════════╝\n\n");

    if let Some(advice) = chosen {
        format_services(&mut out, advice);
    }

    let advised = fleet.regions.len();
    let failed = fleet.failures.len();
    out.push_str(&format!("Regions ({advised} advised, {failed} failed):\n"));
    for advice in fleet.regions.values() {
        let marker = if Some(&advice.region) == fleet.chosen_region.as_ref() {
            "★"
        } else {
            "✅"
        };
        out.push_str(&format!(
            "  {marker} {:<16} score {:<10.4} ${:.4}/h\n",
            advice.region,
            advice.score,
            advice.hourly_cost()
        ));
    }
    for (region, failure) in &fleet.failures {
        out.push_str(&format!("  ❌ {region:<16} {failure}\n"));
    }

    out
}

fn format_services(out: &mut String, advice: &RegionAdvice) {
    out.push_str("Services:\n\n");
    for (service, ids) in &advice.assignments.services_to_instances {
        out.push_str(&format!("  • {service} ({} instances)\n", ids.len()));
        // Permanent draws precede transient ones, so equal ids are adjacent.
        for run in ids.chunk_by(|a, b| a == b) {
            let Some(instance) = advice.instances.get(&run[0]) else {
                continue;
            };
            out.push_str(&format!(
                "      {} × {:<20} {:<12} {:<9} {:>6} GB {:>4} vCPU  ${:.4}/h\n",
                run.len(),
                instance.id,
                instance.name,
                instance.lifecycle.label(),
                instance.memory_gb,
                instance.vcpu,
                instance.price_per_hour
            ));
        }
    }
    out.push('\n');
}

pub fn format_summary(summaries: &[RegionSummary]) -> String {
    let mut out = String::new();

    out.push_str(&format!("Catalog ({} regions):\n\n", summaries.len()));
    out.push_str(&format!(
        "  {:<16} {:>9} {:>9} {:>21} {:>9}\n",
        "REGION", "PERMANENT", "TRANSIENT", "PRICE/H", "MAX GB"
    ));
    for s in summaries {
        let range = format!("${:.4}–${:.4}", s.min_price_per_hour, s.max_price_per_hour);
        out.push_str(&format!(
            "  {:<16} {:>9} {:>9} {:>21} {:>9}\n",
            s.region, s.permanent, s.transient, range, s.max_memory_gb
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotgrid_core::{AdvisorWeights, Instance, Lifecycle, Service};
    use spotgrid_engine::{Advisor, Catalog, PlaceholderScorer, RegionPool, advise_across_regions};

    fn make(id: &str, region: &str, memory_gb: f64, lifecycle: Lifecycle, price: f64) -> Instance {
        Instance {
            id: id.to_string(),
            name: "m5.large".to_string(),
            memory_gb,
            vcpu: 2.0,
            region: region.to_string(),
            az: format!("{region}a"),
            os: "linux".to_string(),
            price_per_hour: price,
            revocation_probability: if lifecycle == Lifecycle::Transient { 0.1 } else { 0.0 },
            lifecycle,
        }
    }

    fn fleet() -> FleetAdvice {
        let catalog: Catalog = [
            ("eu-west-1", vec![make("small", "eu-west-1", 2.0, Lifecycle::Permanent, 0.02)]),
            (
                "us-east-1",
                vec![
                    make("od", "us-east-1", 8.0, Lifecycle::Permanent, 0.096),
                    make("spot", "us-east-1", 8.0, Lifecycle::Transient, 0.03),
                ],
            ),
        ]
        .into_iter()
        .map(|(region, instances)| {
            (region.to_string(), RegionPool::from_instances(region, instances))
        })
        .collect();
        let services = [Service {
            name: "web".to_string(),
            min_memory: 4.0,
            max_vcpu: 2.0,
            min_instances: 1,
            total_instances: 3,
        }];
        advise_across_regions(
            &catalog,
            &services,
            &Advisor::new(&AdvisorWeights::default()),
            &PlaceholderScorer,
            &Default::default(),
        )
    }

    #[test]
    fn advice_report_lists_draws_and_failures() {
        let text = format_advice(&fleet());
        assert!(text.contains("Region:   us-east-1"));
        assert!(text.contains("web (3 instances)"));
        assert!(text.contains("1 × od"));
        assert!(text.contains("2 × spot"));
        assert!(text.contains("1 advised, 1 failed"));
        assert!(text.contains("❌ eu-west-1"));
    }

    #[test]
    fn summary_report_has_one_row_per_region() {
        let text = format_summary(&[RegionSummary {
            region: "us-east-1".to_string(),
            permanent: 3,
            transient: 2,
            min_price_per_hour: 0.01,
            max_price_per_hour: 0.5,
            max_memory_gb: 64.0,
        }]);
        assert!(text.contains("Catalog (1 regions)"));
        assert!(text.contains("us-east-1"));
        assert!(text.contains("$0.0100–$0.5000"));
    }
}
