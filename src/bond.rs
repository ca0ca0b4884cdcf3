//! Bond lifecycle: the per-pair state machine and the shared bond index.
//!
//! A bond relates exactly two particles. It starts `Pending` when a
//! qualifying contact is observed, materializes an engine joint on the
//! next maintenance pass (`Active`), stochastically dissociates into
//! `Cooldown`, and is removed from the index once the cooldown expires —
//! at which point the pair may bond again on a future contact.
//!
//! Bonds are stored once, in a [`BondIndex`] keyed by the canonical
//! unordered pair, which serves simultaneously as the global iteration
//! list and as each member's bond map.

use std::collections::HashMap;

use glam::Vec2;
use rand::Rng;

use crate::config::Tunables;
use crate::particle::ParticleId;
use crate::physics::{BodyHandle, DistanceJointDef, JointHandle, PhysicsWorld};

/// Convert a dissociation rate in percent-per-second into the per-tick
/// Bernoulli probability.
///
/// `p = 1 − exp(ln(1 − rate/100) / ticks_per_second)`
///
/// This is the exact discretization of a continuous exponential decay:
/// surviving `ticks_per_second` draws at probability `p` leaves exactly
/// `1 − rate/100` of bonds intact per second. The naive
/// `rate / 100 / ticks_per_second` is not equivalent.
///
/// Callers are responsible for keeping `0 ≤ rate < 100` and
/// `ticks_per_second > 0`; the configuration layer rejects anything else.
pub fn dissociation_probability_per_tick(rate_percent_per_second: f32, ticks_per_second: f32) -> f32 {
    1.0 - ((1.0 - rate_percent_per_second / 100.0).ln() / ticks_per_second).exp()
}

/// Canonical identity of an unordered particle pair.
///
/// The smaller id is always stored first, so `(a, b)` and `(b, a)` map to
/// the same key and a pair can never hold more than one bond.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BondKey {
    a: ParticleId,
    b: ParticleId,
}

impl BondKey {
    /// Build the canonical key for a pair. The two ids must differ.
    pub fn new(x: ParticleId, y: ParticleId) -> Self {
        debug_assert_ne!(x, y, "a particle cannot bond with itself");
        if x < y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    /// The two members, smaller id first.
    #[inline]
    pub fn members(&self) -> (ParticleId, ParticleId) {
        (self.a, self.b)
    }

    /// Whether `id` is one of the two members.
    #[inline]
    pub fn involves(&self, id: ParticleId) -> bool {
        self.a == id || self.b == id
    }
}

/// Lifecycle state of a bond.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BondState {
    /// Contact observed; no joint exists yet.
    Pending,
    /// Joint materialized and live.
    Active,
    /// Joint destroyed; the pair stays registered (and unbondable) until
    /// the remaining ticks run out.
    Cooldown { ticks_remaining: u32 },
}

/// Outcome of one maintenance tick for a single bond.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum BondTick {
    Keep,
    /// Cooldown ran out; remove the bond from the index.
    Expired,
}

/// A bond between two particles.
#[derive(Clone, Debug)]
pub struct Bond {
    /// Canonical member pair.
    pub key: BondKey,
    /// Current lifecycle state.
    pub state: BondState,
    /// Contact point reported when the bond formed, used as the joint
    /// anchor while rotation is locked.
    pub contact_point: Option<Vec2>,
    /// The owned engine constraint, present only while `Active`.
    joint: Option<JointHandle>,
}

impl Bond {
    pub(crate) fn pending(key: BondKey, contact_point: Option<Vec2>) -> Self {
        Self {
            key,
            state: BondState::Pending,
            contact_point,
            joint: None,
        }
    }

    /// The engine joint currently backing this bond, if any.
    #[inline]
    pub fn joint(&self) -> Option<JointHandle> {
        self.joint
    }

    /// Drive the state machine by one maintenance tick.
    ///
    /// `bodies` are the members' body handles in key order. `rebuild_all`
    /// is the consumed global flag: while set, every surviving Active
    /// joint is torn down and recreated under the current tunables.
    pub(crate) fn tick<W, R>(
        &mut self,
        world: &mut W,
        bodies: (BodyHandle, BodyHandle),
        tunables: &Tunables,
        rebuild_all: bool,
        rng: &mut R,
    ) -> BondTick
    where
        W: PhysicsWorld + ?Sized,
        R: Rng + ?Sized,
    {
        match &mut self.state {
            BondState::Pending => {
                self.joint = Some(make_joint(world, bodies, self.contact_point, tunables));
                self.state = BondState::Active;
                BondTick::Keep
            }
            BondState::Active => {
                // Keep the joint's spring in sync with the live stiffness.
                if let Some(joint) = self.joint {
                    world.set_joint_frequency(joint, tunables.stiffness);
                    world.enable_joint_spring(joint, tunables.stiffness > 0.0);
                }

                let r: f32 = rng.gen();
                if r < tunables.dissociation_probability {
                    if let Some(joint) = self.joint.take() {
                        world.destroy_joint(joint);
                    }
                    // Damp both members so separation does not inject energy.
                    world.set_linear_velocity(bodies.0, Vec2::ZERO);
                    world.set_linear_velocity(bodies.1, Vec2::ZERO);
                    if tunables.cooldown_ticks == 0 {
                        return BondTick::Expired;
                    }
                    self.state = BondState::Cooldown {
                        ticks_remaining: tunables.cooldown_ticks,
                    };
                } else if rebuild_all {
                    if let Some(joint) = self.joint.take() {
                        world.destroy_joint(joint);
                    }
                    self.joint = Some(make_joint(world, bodies, self.contact_point, tunables));
                }
                BondTick::Keep
            }
            BondState::Cooldown { ticks_remaining } => {
                *ticks_remaining = ticks_remaining.saturating_sub(1);
                if *ticks_remaining == 0 {
                    BondTick::Expired
                } else {
                    BondTick::Keep
                }
            }
        }
    }
}

/// Materialize a distance joint for a bond under the current tunables.
///
/// Anchors sit at the bodies' centers of mass, or both at the recorded
/// contact point while rotation is locked. Contact-point anchoring keeps
/// collision between the joined bodies enabled, since the bodies must not
/// pass through each other around the shared anchor. A stiffness of zero
/// disables the spring outright rather than requesting a 0 Hz spring.
fn make_joint<W: PhysicsWorld + ?Sized>(
    world: &mut W,
    bodies: (BodyHandle, BodyHandle),
    contact_point: Option<Vec2>,
    tunables: &Tunables,
) -> JointHandle {
    let (anchor_a, anchor_b) = match (tunables.rotation_locked, contact_point) {
        (true, Some(point)) => (point, point),
        _ => (
            world.center_of_mass(bodies.0),
            world.center_of_mass(bodies.1),
        ),
    };

    let joint = world.create_distance_joint(&DistanceJointDef {
        body_a: bodies.0,
        body_b: bodies.1,
        anchor_a,
        anchor_b,
        collide_connected: tunables.rotation_locked || tunables.stiffness > 0.0,
        frequency_hz: tunables.stiffness,
        damping_ratio: 1.0,
    });
    if tunables.stiffness == 0.0 {
        world.enable_joint_spring(joint, false);
    }
    joint
}

/// The single shared registry of live bonds.
///
/// Keyed by [`BondKey`], so pair uniqueness is structural: inserting a
/// bond for an already-bonded pair is a no-op.
#[derive(Default)]
pub struct BondIndex {
    bonds: HashMap<BondKey, Bond>,
}

impl BondIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new Pending bond for the pair. Returns `false` (and
    /// changes nothing) when the pair already holds a live bond — the
    /// duplicate-contact guard.
    pub fn insert_pending(&mut self, key: BondKey, contact_point: Option<Vec2>) -> bool {
        if self.bonds.contains_key(&key) {
            return false;
        }
        self.bonds.insert(key, Bond::pending(key, contact_point));
        true
    }

    /// Whether the pair currently holds a live bond (any state).
    #[inline]
    pub fn contains(&self, key: BondKey) -> bool {
        self.bonds.contains_key(&key)
    }

    #[inline]
    pub fn get(&self, key: BondKey) -> Option<&Bond> {
        self.bonds.get(&key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bonds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bonds.is_empty()
    }

    /// Iterate all live bonds. No ordering guarantee; no bond update may
    /// depend on another bond's state.
    pub fn iter(&self) -> impl Iterator<Item = &Bond> {
        self.bonds.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Bond> {
        self.bonds.values_mut()
    }

    /// All live bonds a particle participates in.
    pub fn bonds_of(&self, id: ParticleId) -> impl Iterator<Item = &Bond> + '_ {
        self.bonds.values().filter(move |b| b.key.involves(id))
    }

    pub(crate) fn remove(&mut self, key: BondKey) -> Option<Bond> {
        self.bonds.remove(&key)
    }

    pub(crate) fn clear(&mut self) {
        self.bonds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_conversion_reference_value() {
        // 25 %/s at 60 Hz is the default operating point.
        let p = dissociation_probability_per_tick(25.0, 60.0);
        assert!((p - 0.00478).abs() < 1e-4, "p was {p}");
    }

    #[test]
    fn test_rate_conversion_round_trip() {
        for &rate in &[0.0, 1.0, 10.0, 25.0, 50.0, 99.0] {
            for &tps in &[30.0, 60.0, 144.0] {
                let p = dissociation_probability_per_tick(rate, tps);
                assert!((0.0..1.0).contains(&p), "rate {rate} tps {tps} gave p {p}");

                // Surviving tps draws must leave 1 - rate/100 intact.
                let survival = (1.0 - p).powf(tps);
                assert!(
                    (survival - (1.0 - rate / 100.0)).abs() < 1e-4,
                    "rate {rate} tps {tps}: survival {survival}"
                );
            }
        }
    }

    #[test]
    fn test_zero_rate_never_dissociates() {
        assert_eq!(dissociation_probability_per_tick(0.0, 60.0), 0.0);
    }

    #[test]
    fn test_bond_key_is_canonical() {
        let ab = BondKey::new(ParticleId(3), ParticleId(7));
        let ba = BondKey::new(ParticleId(7), ParticleId(3));

        assert_eq!(ab, ba);
        assert_eq!(ab.members(), (ParticleId(3), ParticleId(7)));
        assert!(ab.involves(ParticleId(3)));
        assert!(ab.involves(ParticleId(7)));
        assert!(!ab.involves(ParticleId(4)));
    }

    #[test]
    fn test_index_rejects_duplicate_pair() {
        let mut index = BondIndex::new();
        let key = BondKey::new(ParticleId(0), ParticleId(1));

        assert!(index.insert_pending(key, None));
        assert!(!index.insert_pending(key, Some(Vec2::ZERO)));
        // Same pair observed from the other side is still a duplicate.
        assert!(!index.insert_pending(BondKey::new(ParticleId(1), ParticleId(0)), None));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_bonds_of_sees_membership_from_both_sides() {
        let mut index = BondIndex::new();
        index.insert_pending(BondKey::new(ParticleId(0), ParticleId(1)), None);
        index.insert_pending(BondKey::new(ParticleId(1), ParticleId(2)), None);

        assert_eq!(index.bonds_of(ParticleId(0)).count(), 1);
        assert_eq!(index.bonds_of(ParticleId(1)).count(), 2);
        assert_eq!(index.bonds_of(ParticleId(2)).count(), 1);
        assert_eq!(index.bonds_of(ParticleId(3)).count(), 0);
    }
}
