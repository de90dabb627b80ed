//! spotgrid.toml configuration parser.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{AdvisorWeights, Service};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotgridConfig {
    #[serde(default)]
    pub weights: AdvisorWeights,
    pub advisor: Option<AdvisorConfig>,
    pub catalog: Option<CatalogConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisorConfig {
    pub region_scoring: Option<RegionScoring>,
    /// Overall deadline for a multi-region advisory, e.g. "30s".
    pub deadline: Option<String>,
    /// Only advise regions whose code matches this regex.
    pub region_filter: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to a JSON catalog file.
    pub path: Option<String>,
    /// How long a fetched catalog snapshot stays fresh, e.g. "1h".
    ///
    /// Only matters to processes that keep a snapshot cache across
    /// requests. The `spotgrid` binary loads the catalog once per run.
    pub ttl: Option<String>,
}

/// How regions are ranked against each other. Lower scores win.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RegionScoring {
    /// Every region scores the same; the first region code wins.
    #[default]
    Placeholder,
    /// Total hourly cost of the region's assignment.
    HourlyCost,
    /// Sum of the weighted scores of every drawn instance.
    WeightedSum,
}

/// Services and weights for one advice run, loaded from TOML or JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceRequest {
    pub services: Vec<Service>,
    pub weights: Option<AdvisorWeights>,
}

impl SpotgridConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SpotgridConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn region_scoring(&self) -> RegionScoring {
        self.advisor
            .as_ref()
            .and_then(|a| a.region_scoring)
            .unwrap_or_default()
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.advisor
            .as_ref()
            .and_then(|a| a.deadline.as_deref())
            .and_then(parse_duration)
    }

    pub fn region_filter(&self) -> Option<&str> {
        self.advisor.as_ref().and_then(|a| a.region_filter.as_deref())
    }

    pub fn catalog_ttl(&self) -> Option<Duration> {
        self.catalog
            .as_ref()
            .and_then(|c| c.ttl.as_deref())
            .and_then(parse_duration)
    }

    /// Scaffold a spotgrid.toml with one example service.
    pub fn scaffold(catalog_path: &str) -> Self {
        SpotgridConfig {
            weights: AdvisorWeights::default(),
            advisor: Some(AdvisorConfig {
                region_scoring: Some(RegionScoring::Placeholder),
                deadline: Some("30s".to_string()),
                region_filter: None,
            }),
            catalog: Some(CatalogConfig {
                path: Some(catalog_path.to_string()),
                ttl: None,
            }),
            services: vec![Service {
                name: "web".to_string(),
                min_memory: 4.0,
                max_vcpu: 4.0,
                min_instances: 1,
                total_instances: 3,
            }],
        }
    }
}

impl AdviceRequest {
    /// Load a request, choosing the format from the file extension.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let request = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => toml::from_str(&content)?,
        };
        Ok(request)
    }
}

/// Parse "30s", "5m", "2h" or a bare number of seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let secs = if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>().ok()?
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok()?.checked_mul(60)?
    } else if let Some(hours) = s.strip_suffix('h') {
        hours.parse::<u64>().ok()?.checked_mul(3600)?
    } else {
        s.parse::<u64>().ok()?
    };
    Some(Duration::from_secs(secs))
}
