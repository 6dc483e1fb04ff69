//! Shared market - one price book per resource type
//!
//! Prices react to the supply/demand ratio on every update:
//!
//! `price = max(price + (1 - supply / (demand + ε)) * volatility, 0.01)`
//!
//! Trades move supply and demand, and a periodic drift pass adds noise
//! while pulling both back toward a baseline so the books stay bounded.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::EPSILON;
use crate::economy::catalog::{ResourceCatalog, ResourceType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketEntry {
    pub resource: ResourceType,
    pub price: f32,
    pub supply: f32,
    pub demand: f32,
    pub volatility: f32,
    history: VecDeque<f32>,
}

impl MarketEntry {
    pub const MIN_PRICE: f32 = 0.01;
    pub const HISTORY_LEN: usize = 100;
    pub const BASELINE: f32 = 100.0;

    pub fn new(resource: ResourceType, price: f32, volatility: f32) -> Self {
        Self {
            resource,
            price: price.max(Self::MIN_PRICE),
            supply: Self::BASELINE,
            demand: Self::BASELINE,
            volatility,
            history: VecDeque::with_capacity(Self::HISTORY_LEN),
        }
    }

    /// Re-price from the current supply/demand ratio
    pub fn update_price(&mut self) {
        let ratio = self.supply / (self.demand + EPSILON);
        self.price = (self.price + (1.0 - ratio) * self.volatility).max(Self::MIN_PRICE);
        self.history.push_back(self.price);
        while self.history.len() > Self::HISTORY_LEN {
            self.history.pop_front();
        }
    }

    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().copied()
    }
}

/// All price books
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    entries: Vec<MarketEntry>,
}

impl Market {
    /// Fraction of the gap to baseline closed by each drift pass
    const REVERSION: f32 = 0.1;
    /// Largest random supply/demand step per drift pass
    const DRIFT: f32 = 10.0;

    /// Initial prices at base value, supply and demand at baseline
    pub fn new(catalog: &ResourceCatalog, volatility: f32) -> Self {
        Self {
            entries: ResourceType::ALL
                .iter()
                .map(|r| MarketEntry::new(*r, catalog.base_value(*r), volatility))
                .collect(),
        }
    }

    pub fn entry(&self, resource: ResourceType) -> &MarketEntry {
        &self.entries[resource.index()]
    }

    pub fn entry_mut(&mut self, resource: ResourceType) -> &mut MarketEntry {
        &mut self.entries[resource.index()]
    }

    pub fn price(&self, resource: ResourceType) -> f32 {
        self.entry(resource).price
    }

    /// Book a completed trade of `amount` units and re-price
    pub fn record_trade(&mut self, resource: ResourceType, amount: f32) {
        let entry = self.entry_mut(resource);
        entry.supply += amount;
        entry.demand = (entry.demand - amount).max(0.0);
        entry.update_price();
    }

    /// Book units bought out of the market's supply and re-price
    pub fn record_purchase(&mut self, resource: ResourceType, amount: f32) {
        let amount = amount.max(0.0);
        let entry = self.entry_mut(resource);
        entry.supply = (entry.supply - amount).max(0.0);
        entry.demand += amount;
        entry.update_price();
    }

    /// Register unmet demand without a trade
    pub fn record_demand(&mut self, resource: ResourceType, amount: f32) {
        let entry = self.entry_mut(resource);
        entry.demand += amount.max(0.0);
    }

    /// Stochastic supply/demand drift followed by a price update
    pub fn drift<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for entry in self.entries.iter_mut().filter(|e| e.resource.is_tradable()) {
            let supply_step = rng.gen_range(-Self::DRIFT..=Self::DRIFT);
            let demand_step = rng.gen_range(-Self::DRIFT..=Self::DRIFT);
            entry.supply += supply_step + (MarketEntry::BASELINE - entry.supply) * Self::REVERSION;
            entry.demand += demand_step + (MarketEntry::BASELINE - entry.demand) * Self::REVERSION;
            entry.supply = entry.supply.max(0.0);
            entry.demand = entry.demand.max(0.0);
            entry.update_price();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarketEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn market() -> Market {
        Market::new(&ResourceCatalog::with_defaults(), 0.1)
    }

    #[test]
    fn test_initial_prices_at_base_value() {
        let m = market();
        assert_eq!(m.price(ResourceType::Food), 10.0);
        assert_eq!(m.price(ResourceType::Medicine), 50.0);
        assert_eq!(m.entry(ResourceType::Food).supply, 100.0);
    }

    #[test]
    fn test_excess_demand_raises_price() {
        let mut entry = MarketEntry::new(ResourceType::Food, 10.0, 0.1);
        entry.supply = 50.0;
        entry.demand = 100.0;
        entry.update_price();
        assert!(entry.price > 10.0);
    }

    #[test]
    fn test_excess_supply_lowers_price_with_floor() {
        let mut entry = MarketEntry::new(ResourceType::Food, 0.05, 1.0);
        entry.supply = 1000.0;
        entry.demand = 0.0;
        entry.update_price();
        assert_eq!(entry.price, MarketEntry::MIN_PRICE);
    }

    #[test]
    fn test_purchase_offsets_sale() {
        let mut m = market();
        let price = m.price(ResourceType::ProcessedFood);

        m.record_trade(ResourceType::ProcessedFood, 5.0);
        assert!(m.price(ResourceType::ProcessedFood) < price);

        m.record_purchase(ResourceType::ProcessedFood, 5.0);
        let entry = m.entry(ResourceType::ProcessedFood);
        assert_eq!(entry.supply, MarketEntry::BASELINE);
        assert_eq!(entry.demand, MarketEntry::BASELINE);
    }

    #[test]
    fn test_history_bounded() {
        let mut entry = MarketEntry::new(ResourceType::Food, 10.0, 0.1);
        for _ in 0..250 {
            entry.update_price();
        }
        assert_eq!(entry.history().count(), MarketEntry::HISTORY_LEN);
    }

    #[test]
    fn test_drift_stays_bounded() {
        let mut m = market();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..10_000 {
            m.drift(&mut rng);
        }
        for entry in m.iter().filter(|e| e.resource.is_tradable()) {
            assert!(entry.supply >= 0.0 && entry.supply < 250.0, "supply {}", entry.supply);
            assert!(entry.demand >= 0.0 && entry.demand < 250.0, "demand {}", entry.demand);
            assert!(entry.price >= MarketEntry::MIN_PRICE);
            assert!(entry.price.is_finite());
        }
    }

    #[test]
    fn test_trade_moves_books() {
        let mut m = market();
        m.record_trade(ResourceType::Wood, 30.0);
        let entry = m.entry(ResourceType::Wood);
        assert_eq!(entry.supply, 130.0);
        assert_eq!(entry.demand, 70.0);
        assert!(entry.price < 15.0);
    }
}
