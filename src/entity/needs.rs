//! Needs that drive agent behavior
//!
//! Each need holds a satisfaction value in `[min, max]` that decays over
//! time. Urgency weighs how depleted the need is by its priority. Pressure
//! (`max - value`) is what the facility-seeking thresholds are compared to.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Need categories tracked for every agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NeedType {
    Food,
    Sleep,
    Entertainment,
    Social,
    Health,
    Culture,
}

impl NeedType {
    pub const COUNT: usize = 6;

    pub const ALL: [NeedType; Self::COUNT] = [
        NeedType::Food,
        NeedType::Sleep,
        NeedType::Entertainment,
        NeedType::Social,
        NeedType::Health,
        NeedType::Culture,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Satisfaction lost per unit of time. Food decays fastest.
    pub fn decay_rate(self) -> f32 {
        match self {
            NeedType::Food => 0.5,
            NeedType::Sleep => 0.3,
            NeedType::Entertainment => 0.2,
            NeedType::Social => 0.15,
            NeedType::Health => 0.05,
            NeedType::Culture => 0.1,
        }
    }

    pub fn priority(self) -> f32 {
        match self {
            NeedType::Food => 1.0,
            NeedType::Sleep => 0.9,
            NeedType::Entertainment => 0.5,
            NeedType::Social => 0.6,
            NeedType::Health => 0.8,
            NeedType::Culture => 0.4,
        }
    }
}

/// A single need
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Need {
    pub kind: NeedType,
    pub value: f32,
    pub min: f32,
    pub max: f32,
    pub decay_rate: f32,
    pub priority: f32,
}

impl Need {
    pub const MIN: f32 = 0.0;
    pub const MAX: f32 = 100.0;
    /// Normalized value at or below which a need counts as critical
    pub const CRITICAL: f32 = 0.2;

    /// A fully satisfied need with the per-type rates
    pub fn new(kind: NeedType) -> Self {
        Self {
            kind,
            value: Self::MAX,
            min: Self::MIN,
            max: Self::MAX,
            decay_rate: kind.decay_rate(),
            priority: kind.priority(),
        }
    }

    /// Decay over `dt`, never below `min`
    pub fn update(&mut self, dt: f32) {
        self.value = (self.value - self.decay_rate * dt).max(self.min);
    }

    /// Restore by `amount`, never above `max`
    pub fn satisfy(&mut self, amount: f32) {
        self.value = (self.value + amount).min(self.max);
    }

    pub fn normalized(&self) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 1.0;
        }
        ((self.value - self.min) / span).clamp(0.0, 1.0)
    }

    /// `(1 - normalized) * priority`
    pub fn urgency(&self) -> f32 {
        (1.0 - self.normalized()) * self.priority
    }

    /// How far the need is from fully satisfied
    pub fn pressure(&self) -> f32 {
        self.max - self.value
    }

    pub fn is_critical(&self) -> bool {
        self.normalized() <= Self::CRITICAL
    }

    /// Set the value from a pressure reading, clamped into range
    pub fn set_pressure(&mut self, pressure: f32) {
        self.value = (self.max - pressure).clamp(self.min, self.max);
    }
}

/// The full set of needs of one agent, indexed by [`NeedType`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Needs {
    needs: [Need; NeedType::COUNT],
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            needs: NeedType::ALL.map(Need::new),
        }
    }
}

impl Needs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: NeedType) -> &Need {
        &self.needs[kind.index()]
    }

    pub fn get_mut(&mut self, kind: NeedType) -> &mut Need {
        &mut self.needs[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Need> {
        self.needs.iter()
    }

    /// Decay every need (called each tick)
    pub fn update(&mut self, dt: f32) {
        for need in &mut self.needs {
            need.update(dt);
        }
    }

    pub fn satisfy(&mut self, kind: NeedType, amount: f32) {
        self.get_mut(kind).satisfy(amount);
    }

    /// Most urgent need; ties resolve to the earlier need type
    pub fn most_urgent(&self) -> &Need {
        let mut best = &self.needs[0];
        for need in &self.needs[1..] {
            if OrderedFloat(need.urgency()) > OrderedFloat(best.urgency()) {
                best = need;
            }
        }
        best
    }

    pub fn critical(&self) -> impl Iterator<Item = NeedType> + '_ {
        self.needs.iter().filter(|n| n.is_critical()).map(|n| n.kind)
    }
}
