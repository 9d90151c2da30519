//! Resource Catalog - immutable table of known model/engine variants
//!
//! The catalog is constructed once at startup (from the built-in table or an
//! override file) and injected wherever it is needed. There is deliberately
//! no global registry instance; callers and tests build their own.

mod registry;
mod types;

pub use types::{CatalogError, HardwareClass, ModelSpec, Quantization};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Sentinel baseline id appended to every fallback hierarchy.
///
/// Not a catalog row: it names the built-in generator that needs no model
/// artifacts, no GPU and no external tools, so it is always assumed
/// available.
pub const BASELINE_ID: &str = "mock";

/// Catalog bootstrap options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Load an alternate catalog from this JSON file instead of the
    /// built-in table (used by tests and deployments with custom models)
    pub override_path: Option<PathBuf>,
}

/// Immutable, in-memory table of [`ModelSpec`] entries.
///
/// Insertion order is preserved; the selection engine relies on it as the
/// final deterministic tie-break.
#[derive(Debug)]
pub struct ResourceCatalog {
    specs: Vec<ModelSpec>,
    index: HashMap<String, usize>,
}

impl ResourceCatalog {
    /// Build a catalog from explicit specs, validating each entry
    pub fn new(specs: Vec<ModelSpec>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            spec.validate()?;
            if index.insert(spec.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateId(spec.id.clone()));
            }
        }
        Ok(Self { specs, index })
    }

    /// Catalog with the built-in model table
    pub fn builtin() -> Self {
        let specs = registry::builtin_specs();
        // The built-in table is validated by tests; construct directly
        let index = specs
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        Self { specs, index }
    }

    /// Build a catalog according to config: the built-in table, or an
    /// alternate JSON file when `override_path` is set
    pub fn load(config: &CatalogConfig) -> Result<Self> {
        match &config.override_path {
            None => Ok(Self::builtin()),
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read catalog override: {}", path.display()))?;
                let specs: Vec<ModelSpec> = serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse catalog override: {}", path.display()))?;
                let catalog = Self::new(specs)
                    .with_context(|| format!("Invalid catalog override: {}", path.display()))?;
                info!(
                    "Loaded catalog override from {} ({} specs)",
                    path.display(),
                    catalog.len()
                );
                Ok(catalog)
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ModelSpec> {
        self.index.get(id).map(|&i| &self.specs[i])
    }

    /// Iterate specs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ModelSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// All variants that can run without a GPU
    pub fn cpu_compatible(&self) -> Vec<&ModelSpec> {
        self.specs.iter().filter(|s| s.is_cpu_compatible()).collect()
    }

    /// Variants within an on-disk size range (inclusive)
    pub fn within_size(&self, min_gb: f64, max_gb: f64) -> Vec<&ModelSpec> {
        self.specs
            .iter()
            .filter(|s| s.size_gb >= min_gb && s.size_gb <= max_gb)
            .collect()
    }

    pub fn by_class(&self, class: HardwareClass) -> Vec<&ModelSpec> {
        self.specs
            .iter()
            .filter(|s| s.hardware_class == class)
            .collect()
    }
}
