//! Simulation controller: per-frame orchestration and reset.
//!
//! One logical tick is one pass through a fixed phase order:
//!
//! 1. consume the reset trigger and ingest configuration (rotation-lock
//!    edges raise the rebuild-all flag here);
//! 2. one maintenance pass over the bond index, after which the
//!    rebuild-all flag is spent and expired bonds are dropped;
//! 3. thermal kick for every particle at the live temperature;
//! 4. one fixed physics step, unless paused;
//! 5. contact reaction over the events that step produced.
//!
//! Phases 2 and 3 never mutate each other's state, but both must complete
//! before the physics step — that ordering is a correctness requirement.

use std::collections::HashMap;

use glam::Vec2;
use rand::Rng;

use crate::bond::{BondIndex, BondKey, BondTick};
use crate::config::{ConfigSource, Tunables};
use crate::group::{build_groups, validate_groups, Group};
use crate::particle::{Particle, ParticleId};
use crate::physics::{BodyHandle, ContactEvent, PhysicsWorld};
use crate::placement::{place_group, Region};

const DEFAULT_TICKS_PER_SECOND: f32 = 60.0;
const DEFAULT_MAX_PLACE_TRIES: u32 = 50;
const DEFAULT_SEED_SPEED_MEAN: f32 = 5.0;
const DEFAULT_SEED_SPEED_SPREAD: f32 = 0.25;
/// Interval of the periodic bond census in simulated seconds.
const BOND_CENSUS_SECS: f32 = 5.0;

/// The self-assembly simulation.
///
/// Owns the physics world, the group table, the particle arena, and the
/// bond index. Configure with the `with_*` chain, call [`reset`] once to
/// populate, then [`step`] every frame.
///
/// ```ignore
/// let mut sim = Simulation::new(world, Region::new(min, max))
///     .with_ticks_per_second(60.0)
///     .with_max_place_tries(50);
/// sim.reset(&config, &mut rng);
/// loop {
///     sim.step(&mut config, &mut rng);
/// }
/// ```
///
/// [`reset`]: Simulation::reset
/// [`step`]: Simulation::step
pub struct Simulation<W: PhysicsWorld> {
    world: W,
    region: Region,
    ticks_per_second: f32,
    max_place_tries: u32,
    seed_speed_mean: f32,
    seed_speed_spread: f32,
    tunables: Tunables,
    groups: Vec<Group>,
    particles: Vec<Particle>,
    body_index: HashMap<BodyHandle, ParticleId>,
    bonds: BondIndex,
    frame: u64,
}

impl<W: PhysicsWorld> Simulation<W> {
    /// Create an empty simulation over `world`, placing into `region`.
    pub fn new(world: W, region: Region) -> Self {
        Self {
            world,
            region,
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            max_place_tries: DEFAULT_MAX_PLACE_TRIES,
            seed_speed_mean: DEFAULT_SEED_SPEED_MEAN,
            seed_speed_spread: DEFAULT_SEED_SPEED_SPREAD,
            tunables: Tunables::default(),
            groups: Vec::new(),
            particles: Vec::new(),
            body_index: HashMap::new(),
            bonds: BondIndex::new(),
            frame: 0,
        }
    }

    /// Set the fixed tick rate (default 60).
    pub fn with_ticks_per_second(mut self, ticks_per_second: f32) -> Self {
        self.ticks_per_second = ticks_per_second;
        self
    }

    /// Set the placement retry budget per particle (default 50).
    pub fn with_max_place_tries(mut self, max_tries: u32) -> Self {
        self.max_place_tries = max_tries;
        self
    }

    /// Set the one-shot velocity seed distribution applied at placement
    /// (default mean 5.0, spread 0.25).
    pub fn with_seed_speed(mut self, mean: f32, spread: f32) -> Self {
        self.seed_speed_mean = mean;
        self.seed_speed_spread = spread;
        self
    }

    /// Advance the simulation by one tick.
    pub fn step<C, R>(&mut self, config: &mut C, rng: &mut R)
    where
        C: ConfigSource + ?Sized,
        R: Rng + ?Sized,
    {
        if config.take_reset() {
            self.reset(config, rng);
        }
        self.tunables.ingest(config, self.ticks_per_second);
        self.world
            .set_gravity(Vec2::new(self.tunables.gravity_x, 0.0));

        self.maintain_bonds(rng);

        let mean = self.tunables.thermal_force_mean;
        for particle in &self.particles {
            particle.apply_thermal_kick(&mut self.world, mean, None, rng);
        }

        if !self.tunables.paused {
            self.world.step(1.0 / self.ticks_per_second);
        }

        for event in self.world.drain_contacts() {
            self.react_to_contact(event);
        }

        self.frame += 1;
        let census = (BOND_CENSUS_SECS * self.ticks_per_second) as u64;
        if census > 0 && self.frame % census == 0 {
            log::debug!("{} live bonds after {} ticks", self.bonds.len(), self.frame);
        }
    }

    /// Tear everything down and rebuild from the current configuration:
    /// destroy every joint and particle body, rebuild the group table,
    /// and re-place every group with fresh seeded velocities.
    pub fn reset<C, R>(&mut self, config: &C, rng: &mut R)
    where
        C: ConfigSource + ?Sized,
        R: Rng + ?Sized,
    {
        // Joints go before their bodies; implementations are not assumed
        // to cascade the destruction.
        let joints: Vec<_> = self.bonds.iter().filter_map(|bond| bond.joint()).collect();
        for joint in joints {
            self.world.destroy_joint(joint);
        }
        self.bonds.clear();

        for particle in &self.particles {
            self.world.destroy_body(particle.body);
        }
        self.particles.clear();
        self.body_index.clear();

        self.groups = build_groups(&config.group_rows());
        for error in validate_groups(&self.groups) {
            log::warn!("{error}");
        }

        for group_index in 0..self.groups.len() {
            let positions = {
                let group = &self.groups[group_index];
                let world = &self.world;
                match place_group(
                    group,
                    &self.region,
                    |aabb| world.overlaps_aabb(aabb),
                    rng,
                    self.max_place_tries,
                ) {
                    Ok(positions) => positions,
                    Err(error) => {
                        log::warn!("{error}");
                        error.into_placed()
                    }
                }
            };

            let placed = positions.len();
            for position in positions {
                let id = ParticleId(self.particles.len() as u32);
                let particle = Particle::create(
                    &mut self.world,
                    group_index,
                    &self.groups[group_index],
                    position,
                );
                particle.seed_random_velocity(
                    &mut self.world,
                    self.seed_speed_mean,
                    self.seed_speed_spread,
                    rng,
                );
                self.body_index.insert(particle.body, id);
                self.particles.push(particle);
            }
            log::info!(
                "placed {} particles for group {}",
                placed,
                self.groups[group_index].id
            );
        }
        self.frame = 0;
    }

    /// One maintenance pass over every live bond.
    fn maintain_bonds<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let rebuild_all = self.tunables.take_force_rebuild();

        let mut expired = Vec::new();
        for bond in self.bonds.iter_mut() {
            let (a, b) = bond.key.members();
            let bodies = (
                self.particles[a.0 as usize].body,
                self.particles[b.0 as usize].body,
            );
            if bond.tick(&mut self.world, bodies, &self.tunables, rebuild_all, rng)
                == BondTick::Expired
            {
                expired.push(bond.key);
            }
        }
        for key in expired {
            self.bonds.remove(key);
        }
    }

    /// Decide whether a begin-contact event starts a new bond.
    fn react_to_contact(&mut self, event: ContactEvent) {
        let (Some(&a), Some(&b)) = (
            self.body_index.get(&event.body_a),
            self.body_index.get(&event.body_b),
        ) else {
            // Not a tracked particle on both sides (a wall, say).
            return;
        };
        if a == b {
            return;
        }

        let group_a = &self.groups[self.particles[a.0 as usize].group];
        let group_b = &self.groups[self.particles[b.0 as usize].group];
        // Single-direction check: the side the engine reported first
        // consults its compatibility list against the other's id.
        if !Group::can_join(group_a, group_b) {
            return;
        }

        // No-op when the pair already holds a bond.
        self.bonds
            .insert_pending(BondKey::new(a, b), Some(event.point));
    }

    // ========== Accessors ==========

    #[inline]
    pub fn world(&self) -> &W {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    #[inline]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Resolve a body back to its particle, if it is one.
    #[inline]
    pub fn particle_of_body(&self, body: BodyHandle) -> Option<ParticleId> {
        self.body_index.get(&body).copied()
    }

    #[inline]
    pub fn bonds(&self) -> &BondIndex {
        &self.bonds
    }

    #[inline]
    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    #[inline]
    pub fn region(&self) -> Region {
        self.region
    }

    #[inline]
    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    /// Ticks advanced since the last reset.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
