//! Offering sources.
//!
//! A source returns the flat list of offerings for every region. Fetching
//! from a provider's pricing API is left to other implementations of
//! [`CatalogSource`]; the ones here read what such a fetcher produced.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use spotgrid_core::Instance;
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};

/// Something that can produce catalog offerings.
pub trait CatalogSource: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    fn fetch(&self) -> CatalogResult<Vec<Instance>>;
}

/// On-disk layout: either `{"instances": [...]}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Wrapped { instances: Vec<Instance> },
    Bare(Vec<Instance>),
}

/// Reads offerings from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    name: String,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("file://{}", path.display());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> CatalogResult<Vec<Instance>> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| CatalogError::Read {
            path: self.path.clone(),
            source,
        })?;
        let file: CatalogFile =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
                path: self.path.clone(),
                source,
            })?;
        let instances = match file {
            CatalogFile::Wrapped { instances } | CatalogFile::Bare(instances) => instances,
        };
        debug!(source = %self.name, count = instances.len(), "read catalog offerings");
        Ok(instances)
    }
}

/// Serves a fixed list of offerings.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    instances: Vec<Instance>,
}

impl StaticSource {
    pub fn new(instances: Vec<Instance>) -> Self {
        Self { instances }
    }
}

impl CatalogSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(&self) -> CatalogResult<Vec<Instance>> {
        Ok(self.instances.clone())
    }
}
