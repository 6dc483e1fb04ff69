//! Inventory - bounded resource storage held by agents and buildings

use serde::{Deserialize, Serialize};

use crate::economy::catalog::{ResourceCatalog, ResourceType};

/// One ledger line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub quantity: f32,
    /// Value multiplier, 1.0 = standard
    pub quality: f32,
}

impl Default for ResourceEntry {
    fn default() -> Self {
        Self { quantity: 0.0, quality: 1.0 }
    }
}

impl ResourceEntry {
    /// Base value times quality
    pub fn unit_value(&self, base_value: f32) -> f32 {
        base_value * self.quality
    }
}

/// Resources held by a single owner
///
/// Every type has its own cap. An optional total capacity additionally
/// bounds the sum of all goods (money excluded), which is how buildings
/// model a warehouse of fixed size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    entries: [ResourceEntry; ResourceType::COUNT],
    caps: [f32; ResourceType::COUNT],
    total_capacity: Option<f32>,
}

impl Inventory {
    /// Per-type caps taken from the catalog
    pub fn new(catalog: &ResourceCatalog) -> Self {
        Self::with_caps(catalog.storage_caps())
    }

    pub fn with_caps(caps: [f32; ResourceType::COUNT]) -> Self {
        Self {
            entries: [ResourceEntry::default(); ResourceType::COUNT],
            caps,
            total_capacity: None,
        }
    }

    /// Bound the combined quantity of all goods
    pub fn with_total_capacity(mut self, capacity: f32) -> Self {
        self.total_capacity = Some(capacity);
        self
    }

    /// Current amount of a resource
    pub fn get(&self, resource: ResourceType) -> f32 {
        self.entries[resource.index()].quantity
    }

    pub fn entry(&self, resource: ResourceType) -> &ResourceEntry {
        &self.entries[resource.index()]
    }

    pub fn capacity(&self, resource: ResourceType) -> f32 {
        self.caps[resource.index()]
    }

    pub fn set_capacity(&mut self, resource: ResourceType, capacity: f32) {
        let i = resource.index();
        self.caps[i] = capacity.max(0.0);
        self.entries[i].quantity = self.entries[i].quantity.min(self.caps[i]);
    }

    /// Combined quantity of all goods (money excluded)
    pub fn total_goods(&self) -> f32 {
        ResourceType::ALL
            .iter()
            .filter(|r| **r != ResourceType::Money)
            .map(|r| self.get(*r))
            .sum()
    }

    /// Room left for `resource` under both the per-type and total caps
    pub fn space_for(&self, resource: ResourceType) -> f32 {
        let per_type = (self.capacity(resource) - self.get(resource)).max(0.0);
        match self.total_capacity {
            Some(total) if resource != ResourceType::Money => {
                per_type.min((total - self.total_goods()).max(0.0))
            }
            _ => per_type,
        }
    }

    /// Add resources, returns amount actually added
    ///
    /// Anything above the available space is discarded.
    pub fn add(&mut self, resource: ResourceType, amount: f32) -> f32 {
        if !(amount > 0.0) {
            return 0.0;
        }
        let added = amount.min(self.space_for(resource));
        self.entries[resource.index()].quantity += added;
        added
    }

    /// Add goods of a given quality, blending quality by quantity
    pub fn add_with_quality(&mut self, resource: ResourceType, amount: f32, quality: f32) -> f32 {
        let before = self.get(resource);
        let added = self.add(resource, amount);
        if added > 0.0 {
            let entry = &mut self.entries[resource.index()];
            entry.quality = (entry.quality * before + quality * added) / (before + added);
        }
        added
    }

    /// Remove resources, returns amount actually removed
    pub fn remove(&mut self, resource: ResourceType, amount: f32) -> f32 {
        if !(amount > 0.0) {
            return 0.0;
        }
        let entry = &mut self.entries[resource.index()];
        let removed = amount.min(entry.quantity);
        entry.quantity -= removed;
        removed
    }

    pub fn has(&self, resource: ResourceType, amount: f32) -> bool {
        self.get(resource) >= amount
    }

    /// Remove exactly `amount` or nothing at all
    pub fn consume(&mut self, resource: ResourceType, amount: f32) -> bool {
        if !self.has(resource, amount) {
            return false;
        }
        self.remove(resource, amount);
        true
    }

    /// Check if the inventory has enough of all required materials
    pub fn has_materials(&self, requirements: &[(ResourceType, f32)]) -> bool {
        let mut needed = [0.0f32; ResourceType::COUNT];
        for (res, amount) in requirements {
            needed[res.index()] += amount;
        }
        ResourceType::ALL
            .iter()
            .all(|r| self.get(*r) >= needed[r.index()])
    }

    /// Consume all materials or none
    pub fn consume_materials(&mut self, requirements: &[(ResourceType, f32)]) -> bool {
        if !self.has_materials(requirements) {
            return false;
        }
        for (res, amount) in requirements {
            self.remove(*res, *amount);
        }
        true
    }

    /// Passive loss of perishable goods over `dt`
    pub fn deteriorate(&mut self, catalog: &ResourceCatalog, dt: f32) {
        for resource in ResourceType::ALL {
            let rate = catalog.get(resource).deterioration_rate;
            if rate > 0.0 {
                let entry = &mut self.entries[resource.index()];
                let loss = entry.quantity * rate * dt / 100.0;
                entry.quantity = (entry.quantity - loss).max(0.0);
            }
        }
    }

    /// Market value of everything held
    pub fn value(&self, catalog: &ResourceCatalog) -> f32 {
        ResourceType::ALL
            .iter()
            .map(|r| self.get(*r) * self.entry(*r).unit_value(catalog.base_value(*r)))
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, &ResourceEntry)> {
        ResourceType::ALL.into_iter().zip(self.entries.iter())
    }

    /// Non-empty ledger lines
    pub fn snapshot(&self) -> Vec<(ResourceType, f32)> {
        self.iter()
            .filter(|(_, e)| e.quantity > 0.0)
            .map(|(r, e)| (r, e.quantity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory() -> Inventory {
        Inventory::new(&ResourceCatalog::with_defaults())
    }

    #[test]
    fn test_inventory_add_remove() {
        let mut inv = inventory();
        inv.set_capacity(ResourceType::Wood, 50.0);

        assert_eq!(inv.add(ResourceType::Wood, 30.0), 30.0);
        assert_eq!(inv.get(ResourceType::Wood), 30.0);

        // Can't exceed capacity
        assert_eq!(inv.add(ResourceType::Wood, 30.0), 20.0);
        assert_eq!(inv.get(ResourceType::Wood), 50.0);

        assert_eq!(inv.remove(ResourceType::Wood, 20.0), 20.0);
        assert_eq!(inv.get(ResourceType::Wood), 30.0);

        // Removing more than held empties the slot
        assert_eq!(inv.remove(ResourceType::Wood, 100.0), 30.0);
        assert_eq!(inv.get(ResourceType::Wood), 0.0);
    }

    #[test]
    fn test_total_capacity_shared() {
        let mut inv = inventory().with_total_capacity(100.0);
        assert_eq!(inv.add(ResourceType::Food, 70.0), 70.0);
        assert_eq!(inv.add(ResourceType::Water, 70.0), 30.0);
        // Money is not stored goods
        assert_eq!(inv.add(ResourceType::Money, 500.0), 500.0);
    }

    #[test]
    fn test_consume_is_all_or_nothing() {
        let mut inv = inventory();
        inv.add(ResourceType::Food, 5.0);
        assert!(!inv.consume(ResourceType::Food, 10.0));
        assert_eq!(inv.get(ResourceType::Food), 5.0);
        assert!(inv.consume(ResourceType::Food, 5.0));
        assert_eq!(inv.get(ResourceType::Food), 0.0);
    }

    #[test]
    fn test_consume_materials() {
        let mut inv = inventory();
        inv.add(ResourceType::Metal, 50.0);
        inv.add(ResourceType::Wood, 30.0);

        let requirements = vec![(ResourceType::Metal, 20.0), (ResourceType::Wood, 10.0)];
        assert!(inv.consume_materials(&requirements));
        assert_eq!(inv.get(ResourceType::Metal), 30.0);
        assert_eq!(inv.get(ResourceType::Wood), 20.0);

        let too_much = vec![(ResourceType::Metal, 10.0), (ResourceType::Wood, 100.0)];
        assert!(!inv.consume_materials(&too_much));
        assert_eq!(inv.get(ResourceType::Metal), 30.0, "Failed consume must not touch stock");
    }

    #[test]
    fn test_duplicate_requirements_summed() {
        let mut inv = inventory();
        inv.add(ResourceType::Food, 15.0);
        let requirements = vec![(ResourceType::Food, 10.0), (ResourceType::Food, 10.0)];
        assert!(!inv.has_materials(&requirements));
    }

    #[test]
    fn test_deterioration() {
        let catalog = ResourceCatalog::with_defaults();
        let mut inv = inventory();
        inv.add(ResourceType::Food, 100.0);
        inv.add(ResourceType::Stone, 100.0);
        inv.deteriorate(&catalog, 10.0);
        // Food: 100 * 0.1 * 10 / 100 = 1
        assert!((inv.get(ResourceType::Food) - 99.0).abs() < 1e-4);
        assert_eq!(inv.get(ResourceType::Stone), 100.0);
    }

    #[test]
    fn test_quality_blends() {
        let mut inv = inventory();
        inv.add_with_quality(ResourceType::Tools, 10.0, 1.0);
        inv.add_with_quality(ResourceType::Tools, 10.0, 2.0);
        assert!((inv.entry(ResourceType::Tools).quality - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_negative_amounts_ignored() {
        let mut inv = inventory();
        inv.add(ResourceType::Food, 10.0);
        assert_eq!(inv.add(ResourceType::Food, -5.0), 0.0);
        assert_eq!(inv.remove(ResourceType::Food, -5.0), 0.0);
        assert_eq!(inv.get(ResourceType::Food), 10.0);
    }
}
