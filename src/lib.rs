//! # sabe
//!
//! Stochastic bonding and dissociation for 2D particle simulations.
//!
//! Particles belong to configured groups. When two particles from
//! mutually compatible groups collide, a bond forms as a distance joint
//! in the underlying physics engine. Every live bond then rolls an
//! independent per-tick dissociation check, derived exactly from a
//! percent-per-second rate, and a broken bond leaves both particles in a
//! cooldown before they fully separate.
//!
//! The physics engine and the configuration store sit behind the
//! [`PhysicsWorld`] and [`ConfigSource`] traits; this crate owns the
//! bonding rules, not the integrator or the UI.
//!
//! ## Example
//!
//! ```ignore
//! use sabe::prelude::*;
//!
//! let world = MyBox2dWorld::new();
//! let mut config = MyConfigStore::load("sim.toml")?;
//! let mut rng = rand::thread_rng();
//!
//! let mut sim = Simulation::new(world, Region::new(Vec2::ZERO, Vec2::new(51.2, 38.4)))
//!     .with_ticks_per_second(60.0);
//! sim.reset(&config, &mut rng);
//!
//! loop {
//!     sim.step(&mut config, &mut rng);
//! }
//! ```

pub mod bond;
pub mod config;
pub mod error;
pub mod group;
pub mod particle;
pub mod physics;
pub mod placement;
pub mod simulation;

pub use bond::{dissociation_probability_per_tick, Bond, BondIndex, BondKey, BondState};
pub use config::{keys, ConfigSource, Tunables};
pub use error::{ConfigError, PlacementError};
pub use group::{build_groups, validate_groups, Group, GroupRow};
pub use particle::{Particle, ParticleId};
pub use physics::{
    Aabb, BodyDef, BodyHandle, ContactEvent, DistanceJointDef, JointHandle, PhysicsWorld,
};
pub use placement::{place_group, Region};
pub use simulation::Simulation;

/// One-stop import for downstream hosts.
pub mod prelude {
    pub use crate::bond::{Bond, BondIndex, BondKey, BondState};
    pub use crate::config::{ConfigSource, Tunables};
    pub use crate::group::{Group, GroupRow};
    pub use crate::particle::{Particle, ParticleId};
    pub use crate::physics::{
        Aabb, BodyDef, BodyHandle, ContactEvent, DistanceJointDef, JointHandle, PhysicsWorld,
    };
    pub use crate::placement::Region;
    pub use crate::simulation::Simulation;
    pub use glam::Vec2;
}
