use thiserror::Error;

use crate::career::catalog::CatalogLoadError;
use crate::city::building::{BuildingError, BuildingId};
use crate::core::config::ConfigError;
use crate::core::types::AgentId;
use crate::economy::conversion::ConversionError;
use crate::economy::trade::TradeError;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("Building not found: {0:?}")]
    BuildingNotFound(BuildingId),

    #[error("Unknown career: {0}")]
    UnknownCareer(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Trade rejected: {0}")]
    Trade(#[from] TradeError),

    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Building error: {0}")]
    Building(#[from] BuildingError),

    #[error("Catalog load error: {0}")]
    CatalogLoad(#[from] CatalogLoadError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
