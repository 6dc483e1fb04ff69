//! Ideology vector and diffusion rules

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IdeologyAxis {
    Conservative,
    Liberal,
    Socialist,
    Capitalist,
    Environmentalist,
    Technocrat,
    Humanitarian,
}

impl IdeologyAxis {
    pub const COUNT: usize = 7;

    pub const ALL: [IdeologyAxis; Self::COUNT] = [
        IdeologyAxis::Conservative,
        IdeologyAxis::Liberal,
        IdeologyAxis::Socialist,
        IdeologyAxis::Capitalist,
        IdeologyAxis::Environmentalist,
        IdeologyAxis::Technocrat,
        IdeologyAxis::Humanitarian,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Positions on every axis, each in `[0, 100]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ideology {
    axes: [f32; IdeologyAxis::COUNT],
}

impl Default for Ideology {
    fn default() -> Self {
        Self {
            axes: [50.0; IdeologyAxis::COUNT],
        }
    }
}

impl Ideology {
    pub const MIN: f32 = 0.0;
    pub const MAX: f32 = 100.0;
    /// Largest random step per axis per unit of time
    pub const DRIFT: f32 = 0.1;
    /// Fraction of the gap closed per exchange at full influence
    pub const EXCHANGE_RATE: f32 = 0.1;

    pub fn new(axes: [f32; IdeologyAxis::COUNT]) -> Self {
        Self {
            axes: axes.map(|v| v.clamp(Self::MIN, Self::MAX)),
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut axes = [0.0; IdeologyAxis::COUNT];
        for v in &mut axes {
            *v = rng.gen_range(Self::MIN..=Self::MAX);
        }
        Self { axes }
    }

    pub fn get(&self, axis: IdeologyAxis) -> f32 {
        self.axes[axis.index()]
    }

    pub fn set(&mut self, axis: IdeologyAxis, value: f32) {
        self.axes[axis.index()] = value.clamp(Self::MIN, Self::MAX);
    }

    pub fn values(&self) -> &[f32; IdeologyAxis::COUNT] {
        &self.axes
    }

    /// Mean of `1 - |a - b| / 100` over all axes, in `[0, 1]`
    pub fn alignment(&self, other: &Ideology) -> f32 {
        let total: f32 = self
            .axes
            .iter()
            .zip(other.axes.iter())
            .map(|(a, b)| 1.0 - (a - b).abs() / Self::MAX)
            .sum();
        total / IdeologyAxis::COUNT as f32
    }

    /// Uniform random walk of at most `DRIFT * dt` per axis
    pub fn drift<R: Rng + ?Sized>(&mut self, rng: &mut R, dt: f32) {
        let step = Self::DRIFT * dt;
        if step <= 0.0 {
            return;
        }
        for v in &mut self.axes {
            *v = (*v + rng.gen_range(-step..=step)).clamp(Self::MIN, Self::MAX);
        }
    }

    /// Move toward `theirs` by `their_influence / 100 * EXCHANGE_RATE`
    ///
    /// `theirs` must be the peer's position before the exchange started so
    /// both sides update from the same snapshot.
    pub fn absorb(&mut self, theirs: &Ideology, their_influence: f32) {
        let t = (their_influence.clamp(0.0, 100.0) / 100.0) * Self::EXCHANGE_RATE;
        for (mine, other) in self.axes.iter_mut().zip(theirs.axes.iter()) {
            *mine = (*mine + (other - *mine) * t).clamp(Self::MIN, Self::MAX);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_alignment_extremes() {
        let a = Ideology::new([0.0; IdeologyAxis::COUNT]);
        let b = Ideology::new([100.0; IdeologyAxis::COUNT]);
        assert!((a.alignment(&a) - 1.0).abs() < 1e-6);
        assert!(a.alignment(&b).abs() < 1e-6);
    }

    #[test]
    fn test_absorb_moves_toward_peer() {
        let mut mine = Ideology::new([40.0; IdeologyAxis::COUNT]);
        let theirs = Ideology::new([60.0; IdeologyAxis::COUNT]);
        mine.absorb(&theirs, 100.0);
        // lerp(40, 60, 0.1) = 42
        assert!((mine.get(IdeologyAxis::Liberal) - 42.0).abs() < 1e-4);
    }

    #[test]
    fn test_absorb_without_influence_is_noop() {
        let mut mine = Ideology::new([40.0; IdeologyAxis::COUNT]);
        let theirs = Ideology::new([60.0; IdeologyAxis::COUNT]);
        mine.absorb(&theirs, 0.0);
        assert_eq!(mine.get(IdeologyAxis::Socialist), 40.0);
    }

    #[test]
    fn test_drift_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut ideology = Ideology::new([0.0, 100.0, 0.0, 100.0, 50.0, 0.05, 99.95]);
        for _ in 0..1000 {
            ideology.drift(&mut rng, 1.0);
        }
        assert!(ideology.values().iter().all(|v| (0.0..=100.0).contains(v)));
    }
}
