//! Non-overlapping particle placement.
//!
//! Classic rejection sampling with a bounded retry budget: sample a
//! uniform position in the region, expand it to an AABB by the group
//! radius, and accept the first candidate that neither the physics world
//! nor the batch placed so far overlaps. A region too dense to take the
//! next particle fails loudly for the whole group instead of silently
//! under-populating forever.
//!
//! The generator is pure over the injected RNG and overlap query, so a
//! fixed seed reproduces a placement exactly.

use glam::Vec2;
use rand::Rng;

use crate::error::PlacementError;
use crate::group::Group;
use crate::physics::Aabb;

/// The rectangular region particles are placed into.
///
/// `min` must be strictly below `max` on both axes.
#[derive(Clone, Copy, Debug)]
pub struct Region {
    pub min: Vec2,
    pub max: Vec2,
}

impl Region {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        debug_assert!(min.x < max.x && min.y < max.y, "degenerate region");
        Self { min, max }
    }

    /// Uniform sample inside the region.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            rng.gen_range(self.min.x..self.max.x),
            rng.gen_range(self.min.y..self.max.y),
        )
    }
}

/// Place `group.target_count` non-overlapping positions inside `region`.
///
/// `query` answers whether anything in the physics world overlaps a
/// candidate box; positions accepted earlier in this call are checked
/// internally, since their bodies do not exist yet. Each particle gets at
/// most `max_tries` samples; exhausting the budget aborts the whole group
/// with [`PlacementError::Saturated`], carrying the partial result.
pub fn place_group<R, F>(
    group: &Group,
    region: &Region,
    mut query: F,
    rng: &mut R,
    max_tries: u32,
) -> Result<Vec<Vec2>, PlacementError>
where
    R: Rng + ?Sized,
    F: FnMut(&Aabb) -> bool,
{
    let mut placed: Vec<Vec2> = Vec::with_capacity(group.target_count as usize);
    let mut accepted: Vec<Aabb> = Vec::with_capacity(group.target_count as usize);

    'particles: for _ in 0..group.target_count {
        for _ in 0..max_tries {
            let candidate = region.sample(rng);
            let aabb = Aabb::from_circle(candidate, group.radius);

            let blocked = query(&aabb) || accepted.iter().any(|prior| prior.intersects(&aabb));
            if !blocked {
                accepted.push(aabb);
                placed.push(candidate);
                continue 'particles;
            }
        }
        return Err(PlacementError::Saturated {
            group_id: group.id,
            placed,
            requested: group.target_count,
        });
    }

    Ok(placed)
}
