//! The particle entity: one physics body plus simulation-level behavior.
//!
//! A particle couples a [`BodyHandle`] to its group and carries the
//! random-motion behavior the engine drives every frame: a one-shot
//! velocity seed at creation and a per-tick thermal kick whose magnitude
//! tracks the live temperature parameter.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::group::Group;
use crate::physics::{BodyDef, BodyHandle, PhysicsWorld};

/// Index of a particle in the simulation arena. Stable until reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u32);

// Fixture constants shared by all particles regardless of group.
const FRICTION: f32 = 0.1;
const RESTITUTION: f32 = 0.8;
const LINEAR_DAMPING: f32 = 0.1;

/// A simulated particle. Owns exactly one body for its whole lifetime;
/// the body is released only during a full simulation reset.
#[derive(Clone, Debug)]
pub struct Particle {
    /// Index into the simulation's group table.
    pub group: usize,
    /// The owned physics body.
    pub body: BodyHandle,
}

impl Particle {
    /// Create the particle's body and couple to it.
    ///
    /// Sleeping is disabled so the particle always stays eligible for
    /// forces and contacts.
    pub fn create<W: PhysicsWorld + ?Sized>(
        world: &mut W,
        group_index: usize,
        group: &Group,
        position: Vec2,
    ) -> Self {
        let body = world.create_body(&BodyDef {
            position,
            radius: group.radius,
            mass: group.mass,
            friction: FRICTION,
            restitution: RESTITUTION,
            linear_damping: LINEAR_DAMPING,
            allow_sleep: false,
        });
        Self {
            group: group_index,
            body,
        }
    }

    /// One-shot velocity seed: speed from `Normal(mean, spread)`, heading
    /// uniform in `[0, 2π)`. Not an ongoing force.
    pub fn seed_random_velocity<W, R>(&self, world: &mut W, mean: f32, spread: f32, rng: &mut R)
    where
        W: PhysicsWorld + ?Sized,
        R: Rng + ?Sized,
    {
        let speed = gauss(mean, spread, rng);
        let heading = rng.gen_range(0.0..TAU);
        world.set_linear_velocity(
            self.body,
            Vec2::new(speed * heading.cos(), speed * heading.sin()),
        );
    }

    /// Apply one frame's thermal kick: a random-magnitude force in a
    /// random direction at the body's center of mass.
    ///
    /// `spread` defaults to `mean / 10`. A mean of exactly zero applies
    /// nothing at all, avoiding a draw from a degenerate distribution.
    pub fn apply_thermal_kick<W, R>(
        &self,
        world: &mut W,
        mean: f32,
        spread: Option<f32>,
        rng: &mut R,
    ) where
        W: PhysicsWorld + ?Sized,
        R: Rng + ?Sized,
    {
        if mean == 0.0 {
            return;
        }
        let spread = spread.unwrap_or(mean / 10.0);
        let magnitude = gauss(mean, spread, rng);
        let heading = rng.gen_range(0.0..TAU);
        world.apply_force_to_center(
            self.body,
            Vec2::new(magnitude * heading.cos(), magnitude * heading.sin()),
        );
    }
}

/// Normal draw that collapses to the mean when the spread is degenerate.
pub(crate) fn gauss<R: Rng + ?Sized>(mean: f32, spread: f32, rng: &mut R) -> f32 {
    match Normal::new(mean, spread) {
        Ok(dist) => dist.sample(rng),
        Err(_) => mean,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_gauss_degenerate_spread_returns_mean() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(gauss(5.0, 0.0, &mut rng), 5.0);
        assert_eq!(gauss(5.0, -1.0, &mut rng), 5.0);
    }

    #[test]
    fn test_gauss_tracks_mean() {
        let mut rng = SmallRng::seed_from_u64(2);
        let samples: f32 = (0..2000).map(|_| gauss(10.0, 1.0, &mut rng)).sum();
        let mean = samples / 2000.0;
        assert!((mean - 10.0).abs() < 0.2, "sample mean was {mean}");
    }
}
