//! Resource catalog - static properties of every resource type

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    Food,
    Water,
    Energy,
    RawMaterial,
    Wood,
    Stone,
    Metal,
    ProcessedFood,
    ProcessedMaterial,
    Tools,
    Medicine,
    Clothes,
    Entertainment,
    Culture,
    Knowledge,
    Money,
}

impl ResourceType {
    pub const COUNT: usize = 16;

    pub const ALL: [ResourceType; Self::COUNT] = [
        ResourceType::Food,
        ResourceType::Water,
        ResourceType::Energy,
        ResourceType::RawMaterial,
        ResourceType::Wood,
        ResourceType::Stone,
        ResourceType::Metal,
        ResourceType::ProcessedFood,
        ResourceType::ProcessedMaterial,
        ResourceType::Tools,
        ResourceType::Medicine,
        ResourceType::Clothes,
        ResourceType::Entertainment,
        ResourceType::Culture,
        ResourceType::Knowledge,
        ResourceType::Money,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Money is the medium of exchange, not a traded good
    pub fn is_tradable(self) -> bool {
        self != ResourceType::Money
    }
}

/// Processing tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceTier {
    Basic,
    Processed,
    Advanced,
    Spiritual,
}

/// Static properties of one resource type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub resource: ResourceType,
    pub tier: ResourceTier,
    pub base_value: f32,
    /// Percent of the stored quantity lost per unit of time
    pub deterioration_rate: f32,
    pub storable: bool,
    /// Per-holder storage cap
    pub max_storage: f32,
    /// Units consumed to produce one unit in a building
    pub components: Vec<(ResourceType, f32)>,
}

/// Definitions for every resource type, indexed by [`ResourceType`]
#[derive(Debug, Clone)]
pub struct ResourceCatalog {
    definitions: Vec<ResourceDefinition>,
}

impl Default for ResourceCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ResourceCatalog {
    pub fn with_defaults() -> Self {
        use ResourceTier::*;
        use ResourceType::*;

        let def = |resource, tier, base_value, deterioration_rate, max_storage, components| {
            ResourceDefinition {
                resource,
                tier,
                base_value,
                deterioration_rate,
                storable: true,
                max_storage,
                components,
            }
        };

        let mut definitions = vec![
            def(Food, Basic, 10.0, 0.1, 1000.0, vec![]),
            def(Water, Basic, 5.0, 0.05, 2000.0, vec![]),
            def(Energy, Basic, 25.0, 0.2, 1000.0, vec![]),
            def(RawMaterial, Basic, 12.0, 0.0, 5000.0, vec![]),
            def(Wood, Basic, 15.0, 0.01, 5000.0, vec![]),
            def(Stone, Basic, 20.0, 0.0, 10000.0, vec![]),
            def(Metal, Basic, 30.0, 0.0, 5000.0, vec![]),
            def(ProcessedFood, Processed, 25.0, 0.15, 500.0, vec![(Food, 1.0)]),
            def(ProcessedMaterial, Processed, 35.0, 0.0, 2000.0, vec![(RawMaterial, 1.0)]),
            def(Tools, Processed, 40.0, 0.005, 500.0, vec![(Metal, 1.0), (Wood, 1.0)]),
            def(Medicine, Advanced, 50.0, 0.02, 200.0, vec![(Water, 1.0), (Energy, 1.0)]),
            def(Clothes, Processed, 35.0, 0.01, 500.0, vec![(RawMaterial, 1.0)]),
            def(Entertainment, Spiritual, 80.0, 0.5, 200.0, vec![]),
            def(Culture, Spiritual, 300.0, 0.0, 200.0, vec![]),
            def(Knowledge, Spiritual, 200.0, 0.0, f32::MAX, vec![]),
            def(Money, Basic, 1.0, 0.0, 1.0e12, vec![]),
        ];
        // Services cannot be stockpiled by agents for long
        definitions[Entertainment.index()].storable = false;

        debug_assert!(definitions
            .iter()
            .enumerate()
            .all(|(i, d)| d.resource.index() == i));

        Self { definitions }
    }

    pub fn get(&self, resource: ResourceType) -> &ResourceDefinition {
        &self.definitions[resource.index()]
    }

    pub fn base_value(&self, resource: ResourceType) -> f32 {
        self.get(resource).base_value
    }

    pub fn components(&self, resource: ResourceType) -> &[(ResourceType, f32)] {
        &self.get(resource).components
    }

    /// Per-type storage caps in index order
    pub fn storage_caps(&self) -> [f32; ResourceType::COUNT] {
        ResourceType::ALL.map(|r| self.get(r).max_storage)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.definitions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_type() {
        let catalog = ResourceCatalog::with_defaults();
        for resource in ResourceType::ALL {
            assert_eq!(catalog.get(resource).resource, resource);
        }
    }

    #[test]
    fn test_processed_food_needs_food() {
        let catalog = ResourceCatalog::with_defaults();
        assert_eq!(
            catalog.components(ResourceType::ProcessedFood),
            &[(ResourceType::Food, 1.0)]
        );
        assert!(catalog.components(ResourceType::Food).is_empty());
    }

    #[test]
    fn test_money_not_tradable() {
        assert!(!ResourceType::Money.is_tradable());
        assert!(ResourceType::Food.is_tradable());
    }
}
