//! Trade execution and intent matching

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::AgentId;
use crate::economy::catalog::ResourceType;
use crate::economy::inventory::Inventory;
use crate::economy::market::Market;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradeError {
    #[error("trade amount must be positive, got {0}")]
    InvalidAmount(f32),

    #[error("{0:?} is not tradable")]
    NotTradable(ResourceType),

    #[error("seller holds {have:.1} {resource:?}, needs {need:.1}")]
    SellerLacksStock { resource: ResourceType, have: f32, need: f32 },

    #[error("buyer holds {have:.2} money, needs {need:.2}")]
    BuyerLacksFunds { have: f32, need: f32 },

    #[error("buyer has no room for {0:?}")]
    BuyerLacksCapacity(ResourceType),

    #[error("seller has no room for the payment")]
    SellerLacksCapacity,
}

/// A completed trade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub resource: ResourceType,
    pub amount: f32,
    pub unit_price: f32,
    pub total: f32,
}

/// Move `amount` of `resource` from seller to buyer at the market price
///
/// Either both sides of the exchange happen or neither does. A successful
/// trade is booked in the market, which re-prices the resource.
pub fn execute_trade(
    seller: &mut Inventory,
    buyer: &mut Inventory,
    market: &mut Market,
    resource: ResourceType,
    amount: f32,
) -> Result<TradeReceipt, TradeError> {
    if !(amount > 0.0) {
        return Err(TradeError::InvalidAmount(amount));
    }
    if !resource.is_tradable() {
        return Err(TradeError::NotTradable(resource));
    }

    let unit_price = market.price(resource);
    let total = unit_price * amount;

    let stock = seller.get(resource);
    if stock < amount {
        return Err(TradeError::SellerLacksStock { resource, have: stock, need: amount });
    }
    let funds = buyer.get(ResourceType::Money);
    if funds < total {
        return Err(TradeError::BuyerLacksFunds { have: funds, need: total });
    }
    if buyer.space_for(resource) < amount {
        return Err(TradeError::BuyerLacksCapacity(resource));
    }
    if seller.space_for(ResourceType::Money) < total {
        return Err(TradeError::SellerLacksCapacity);
    }

    let quality = seller.entry(resource).quality;
    seller.remove(resource, amount);
    buyer.add_with_quality(resource, amount, quality);
    buyer.remove(ResourceType::Money, total);
    seller.add(ResourceType::Money, total);
    market.record_trade(resource, amount);

    Ok(TradeReceipt { resource, amount, unit_price, total })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// An agent's wish to buy or sell, derived from its stock levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub agent: AgentId,
    pub resource: ResourceType,
    pub side: TradeSide,
    pub amount: f32,
}

/// Stock thresholds that turn into trade intents
#[derive(Debug, Clone, Copy)]
pub struct StockPolicy {
    pub resource: ResourceType,
    /// Buy up to this level when below it
    pub low_water: f32,
    /// Sell down to this level when above it
    pub high_water: f32,
}

/// Consumables agents keep a stock of
pub const STOCK_POLICIES: [StockPolicy; 3] = [
    StockPolicy { resource: ResourceType::Food, low_water: 20.0, high_water: 60.0 },
    StockPolicy { resource: ResourceType::Water, low_water: 20.0, high_water: 60.0 },
    StockPolicy { resource: ResourceType::Energy, low_water: 5.0, high_water: 30.0 },
];

/// Derive buy/sell intents from one agent's inventory
pub fn collect_intents(agent: AgentId, inventory: &Inventory) -> Vec<TradeIntent> {
    STOCK_POLICIES
        .iter()
        .filter_map(|policy| {
            let held = inventory.get(policy.resource);
            if held < policy.low_water {
                Some(TradeIntent {
                    agent,
                    resource: policy.resource,
                    side: TradeSide::Buy,
                    amount: policy.low_water - held,
                })
            } else if held > policy.high_water {
                Some(TradeIntent {
                    agent,
                    resource: policy.resource,
                    side: TradeSide::Sell,
                    amount: held - policy.high_water,
                })
            } else {
                None
            }
        })
        .collect()
}

/// A proposed trade between two agents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeMatch {
    pub seller: AgentId,
    pub buyer: AgentId,
    pub resource: ResourceType,
    pub amount: f32,
}

/// Greedily pair sellers with buyers per resource, both in id order
pub fn match_intents(intents: &[TradeIntent]) -> Vec<TradeMatch> {
    let mut matches = Vec::new();

    for resource in ResourceType::ALL {
        let mut sellers: Vec<(AgentId, f32)> = intents
            .iter()
            .filter(|i| i.resource == resource && i.side == TradeSide::Sell)
            .map(|i| (i.agent, i.amount))
            .collect();
        let mut buyers: Vec<(AgentId, f32)> = intents
            .iter()
            .filter(|i| i.resource == resource && i.side == TradeSide::Buy)
            .map(|i| (i.agent, i.amount))
            .collect();
        sellers.sort_by_key(|(id, _)| *id);
        buyers.sort_by_key(|(id, _)| *id);

        let (mut s, mut b) = (0, 0);
        while s < sellers.len() && b < buyers.len() {
            let amount = sellers[s].1.min(buyers[b].1);
            if sellers[s].0 != buyers[b].0 && amount > 0.0 {
                matches.push(TradeMatch {
                    seller: sellers[s].0,
                    buyer: buyers[b].0,
                    resource,
                    amount,
                });
            }
            sellers[s].1 -= amount;
            buyers[b].1 -= amount;
            if sellers[s].1 <= 0.0 {
                s += 1;
            }
            if buyers[b].1 <= 0.0 {
                b += 1;
            }
        }
    }

    matches
}
