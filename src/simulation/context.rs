//! Shared read-mostly state handed to every system

use std::path::Path;

use crate::career::catalog::CareerCatalog;
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::economy::catalog::ResourceCatalog;
use crate::economy::conversion::ConversionTable;

/// Configuration and catalogs, immutable during a run
#[derive(Debug, Clone)]
pub struct SimContext {
    pub config: SimulationConfig,
    pub resources: ResourceCatalog,
    pub conversions: ConversionTable,
    pub careers: CareerCatalog,
}

impl SimContext {
    /// Built-in catalogs with the given configuration
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            resources: ResourceCatalog::with_defaults(),
            conversions: ConversionTable::with_defaults(),
            careers: CareerCatalog::with_defaults(),
        }
    }

    pub fn with_careers(mut self, careers: CareerCatalog) -> Self {
        self.careers = careers;
        self
    }

    /// Replace the built-in careers with a TOML catalog
    pub fn load_careers(self, path: impl AsRef<Path>) -> Result<Self> {
        let careers = CareerCatalog::load_from_toml(path.as_ref())?;
        Ok(self.with_careers(careers))
    }
}

impl Default for SimContext {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}
