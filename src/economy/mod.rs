//! Economy layer - resources, inventories, conversion and the market

pub mod catalog;
pub mod conversion;
pub mod inventory;
pub mod market;
pub mod trade;

pub use catalog::{ResourceCatalog, ResourceDefinition, ResourceTier, ResourceType};
pub use conversion::{
    can_convert, convert_resources, ConversionError, ConversionOutcome, ConversionRule,
    ConversionTable,
};
pub use inventory::{Inventory, ResourceEntry};
pub use market::{Market, MarketEntry};
pub use trade::{
    collect_intents, execute_trade, match_intents, TradeError, TradeIntent, TradeMatch,
    TradeReceipt, TradeSide,
};
