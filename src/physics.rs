//! The rigid-body engine boundary.
//!
//! The bond engine never integrates motion or resolves collisions itself.
//! It issues commands to, and reads state from, an external physics engine
//! through the [`PhysicsWorld`] trait: body creation, distance joints,
//! AABB overlap queries, and begin-contact events.
//!
//! Implement this trait over your engine of choice (any Box2D-style 2D
//! engine has a direct mapping); tests ship a scripted in-memory world.

use glam::Vec2;

/// Opaque handle to a dynamic body owned by the physics engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u64);

/// Opaque handle to a distance-joint constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JointHandle(pub u64);

/// Parameters for a circular dynamic body.
#[derive(Clone, Copy, Debug)]
pub struct BodyDef {
    pub position: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    /// Particles must always stay eligible for forces and contacts.
    pub allow_sleep: bool,
}

/// Parameters for a distance-joint constraint between two bodies.
#[derive(Clone, Copy, Debug)]
pub struct DistanceJointDef {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub anchor_a: Vec2,
    pub anchor_b: Vec2,
    /// Whether the joined bodies keep colliding with each other.
    pub collide_connected: bool,
    /// Spring frequency in Hz. A rigid joint disables the spring instead
    /// of using 0 Hz; see [`PhysicsWorld::enable_joint_spring`].
    pub frequency_hz: f32,
    pub damping_ratio: f32,
}

/// A begin-contact notification produced during [`PhysicsWorld::step`].
///
/// `body_a` is whichever body the engine reports first; the contact
/// reaction's compatibility check is taken from its side.
#[derive(Clone, Copy, Debug)]
pub struct ContactEvent {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// First point of the contact manifold, in world coordinates.
    pub point: Vec2,
}

/// An axis-aligned bounding box in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Bounding box of a circle at `center` with radius `radius`.
    #[inline]
    pub fn from_circle(center: Vec2, radius: f32) -> Self {
        let half = Vec2::splat(radius);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Whether two boxes overlap (touching edges count as overlap).
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Commands and queries the bond engine needs from a rigid-body engine.
///
/// All calls are synchronous. Contact events generated by [`step`] are
/// buffered by the implementation and handed over once through
/// [`drain_contacts`] — the queue-drain rendering of a begin-contact
/// callback.
///
/// [`step`]: PhysicsWorld::step
/// [`drain_contacts`]: PhysicsWorld::drain_contacts
pub trait PhysicsWorld {
    /// Create a circular dynamic body and return its handle.
    fn create_body(&mut self, def: &BodyDef) -> BodyHandle;

    /// Destroy a body. Joints attached to it must not be used afterwards.
    fn destroy_body(&mut self, body: BodyHandle);

    /// Overwrite a body's linear velocity.
    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2);

    /// Apply an instantaneous force at the body's center of mass.
    fn apply_force_to_center(&mut self, body: BodyHandle, force: Vec2);

    /// Current world-space center of mass of a body.
    fn center_of_mass(&self, body: BodyHandle) -> Vec2;

    /// Create a distance joint and return its handle.
    fn create_distance_joint(&mut self, def: &DistanceJointDef) -> JointHandle;

    /// Update the spring frequency of an existing joint.
    fn set_joint_frequency(&mut self, joint: JointHandle, hz: f32);

    /// Enable or disable the spring of an existing joint. Disabled means
    /// the joint acts as a rigid, un-sprung constraint.
    fn enable_joint_spring(&mut self, joint: JointHandle, enabled: bool);

    /// Destroy a joint.
    fn destroy_joint(&mut self, joint: JointHandle);

    /// Whether any fixture overlaps the given box.
    fn overlaps_aabb(&self, aabb: &Aabb) -> bool;

    /// Set the world gravity vector.
    fn set_gravity(&mut self, gravity: Vec2);

    /// Advance the world by one fixed timestep of `dt` seconds.
    fn step(&mut self, dt: f32);

    /// Hand over the begin-contact events recorded since the last drain.
    fn drain_contacts(&mut self) -> Vec<ContactEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_circle() {
        let aabb = Aabb::from_circle(Vec2::new(1.0, 2.0), 0.5);
        assert_eq!(aabb.min, Vec2::new(0.5, 1.5));
        assert_eq!(aabb.max, Vec2::new(1.5, 2.5));
    }

    #[test]
    fn test_aabb_intersects() {
        let a = Aabb::from_circle(Vec2::ZERO, 1.0);
        let b = Aabb::from_circle(Vec2::new(1.5, 0.0), 1.0);
        let c = Aabb::from_circle(Vec2::new(5.0, 5.0), 1.0);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_aabb_touching_edges_count() {
        let a = Aabb::from_circle(Vec2::ZERO, 1.0);
        let b = Aabb::from_circle(Vec2::new(2.0, 0.0), 1.0);
        assert!(a.intersects(&b));
    }
}
