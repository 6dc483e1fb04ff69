//! Integration tests for the economy layer
//!
//! - Inventories never go negative or past their caps
//! - All-or-nothing consumption
//! - Trades either settle completely or leave both sides untouched
//! - Market prices stay positive under any sequence of trades and drift

use civitas::economy::catalog::{ResourceCatalog, ResourceType};
use civitas::economy::inventory::Inventory;
use civitas::economy::market::Market;
use civitas::economy::trade::{execute_trade, TradeError};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn resource_strategy() -> impl Strategy<Value = ResourceType> {
    (0..ResourceType::COUNT).prop_map(|i| ResourceType::ALL[i])
}

// ============================================================================
// Inventory
// ============================================================================

proptest! {
    #[test]
    fn inventory_stays_within_bounds(
        ops in prop::collection::vec((resource_strategy(), any::<bool>(), 0.0f32..2000.0), 0..60)
    ) {
        let catalog = ResourceCatalog::with_defaults();
        let mut inventory = Inventory::new(&catalog).with_total_capacity(3000.0);

        for (resource, adding, amount) in ops {
            if adding {
                let added = inventory.add(resource, amount);
                prop_assert!(added >= 0.0 && added <= amount + 1e-3);
            } else {
                let removed = inventory.remove(resource, amount);
                prop_assert!(removed >= 0.0 && removed <= amount + 1e-3);
            }
            for r in ResourceType::ALL {
                prop_assert!(inventory.get(r) >= 0.0);
                prop_assert!(inventory.get(r) <= inventory.capacity(r) + 1e-3);
            }
            prop_assert!(inventory.total_goods() <= 3000.0 + 1e-2);
        }
    }

    #[test]
    fn consume_is_all_or_nothing(start in 0.0f32..500.0, want in 0.0f32..1000.0) {
        let catalog = ResourceCatalog::with_defaults();
        let mut inventory = Inventory::new(&catalog);
        inventory.add(ResourceType::Food, start);
        let before = inventory.get(ResourceType::Food);

        if inventory.consume(ResourceType::Food, want) {
            prop_assert!(want <= before + 1e-3);
            prop_assert!((inventory.get(ResourceType::Food) - (before - want)).abs() < 1e-2);
        } else {
            prop_assert_eq!(inventory.get(ResourceType::Food), before);
        }
    }
}

// ============================================================================
// Trade
// ============================================================================

proptest! {
    #[test]
    fn trade_settles_completely_or_not_at_all(
        stock in 0.0f32..100.0,
        money in 0.0f32..2000.0,
        amount in 0.0f32..150.0,
    ) {
        let catalog = ResourceCatalog::with_defaults();
        let mut market = Market::new(&catalog, 0.1);
        let mut seller = Inventory::new(&catalog);
        let mut buyer = Inventory::new(&catalog);
        seller.add(ResourceType::Food, stock);
        buyer.add(ResourceType::Money, money);

        let goods_before = seller.get(ResourceType::Food) + buyer.get(ResourceType::Food);
        let money_before = seller.get(ResourceType::Money) + buyer.get(ResourceType::Money);
        let snapshot = (seller.clone(), buyer.clone());

        match execute_trade(&mut seller, &mut buyer, &mut market, ResourceType::Food, amount) {
            Ok(receipt) => {
                let goods_after = seller.get(ResourceType::Food) + buyer.get(ResourceType::Food);
                let money_after = seller.get(ResourceType::Money) + buyer.get(ResourceType::Money);
                prop_assert!((goods_after - goods_before).abs() < 1e-2);
                prop_assert!((money_after - money_before).abs() < 1e-1);
                prop_assert!((buyer.get(ResourceType::Food) - receipt.amount).abs() < 1e-3);
            }
            Err(_) => {
                prop_assert_eq!(seller.get(ResourceType::Food), snapshot.0.get(ResourceType::Food));
                prop_assert_eq!(seller.get(ResourceType::Money), snapshot.0.get(ResourceType::Money));
                prop_assert_eq!(buyer.get(ResourceType::Food), snapshot.1.get(ResourceType::Food));
                prop_assert_eq!(buyer.get(ResourceType::Money), snapshot.1.get(ResourceType::Money));
            }
        }
    }

    #[test]
    fn prices_stay_positive(
        trades in prop::collection::vec((resource_strategy(), 0.0f32..500.0), 0..40),
        seed in any::<u64>(),
    ) {
        let catalog = ResourceCatalog::with_defaults();
        let mut market = Market::new(&catalog, 0.5);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for (resource, amount) in trades {
            market.record_trade(resource, amount);
            market.drift(&mut rng);
        }
        for entry in market.iter() {
            prop_assert!(entry.price > 0.0 && entry.price.is_finite());
        }
    }
}

#[test]
fn money_cannot_be_traded() {
    let catalog = ResourceCatalog::with_defaults();
    let mut market = Market::new(&catalog, 0.1);
    let mut seller = Inventory::new(&catalog);
    let mut buyer = Inventory::new(&catalog);
    seller.add(ResourceType::Money, 100.0);

    let result = execute_trade(&mut seller, &mut buyer, &mut market, ResourceType::Money, 10.0);
    assert_eq!(result, Err(TradeError::NotTradable(ResourceType::Money)));
    assert_eq!(seller.get(ResourceType::Money), 100.0);
}

#[test]
fn broke_buyer_changes_nothing() {
    let catalog = ResourceCatalog::with_defaults();
    let mut market = Market::new(&catalog, 0.1);
    let mut seller = Inventory::new(&catalog);
    let mut buyer = Inventory::new(&catalog);
    seller.add(ResourceType::Tools, 5.0);
    let price_before = market.price(ResourceType::Tools);

    let result = execute_trade(&mut seller, &mut buyer, &mut market, ResourceType::Tools, 2.0);
    assert!(matches!(result, Err(TradeError::BuyerLacksFunds { .. })));
    assert_eq!(seller.get(ResourceType::Tools), 5.0);
    assert_eq!(buyer.get(ResourceType::Tools), 0.0);
    assert_eq!(market.price(ResourceType::Tools), price_before);
}
