//! Particle groups (species) and the registry that builds them.
//!
//! A group fixes the physical properties of its particles — radius, mass,
//! a display color tag — plus the set of group ids it may bond with and a
//! target population. Groups are built once from configuration rows and
//! never mutated afterwards.
//!
//! # Compatibility is directional
//!
//! [`Group::can_join`] checks only `a`'s compatibility list against `b`'s
//! id. A contact between particles of groups A and B is gated by whichever
//! side the engine reports first, not by a mutual check. Deliberate; see
//! DESIGN.md before "fixing" it.

use std::collections::HashSet;

use crate::error::ConfigError;

/// One particle species. Immutable after creation.
#[derive(Clone, Debug)]
pub struct Group {
    /// Fixture radius, meters. Must be positive.
    pub radius: f32,
    /// Body mass, kilograms. Must be positive.
    pub mass: f32,
    /// Opaque display tag; the core never interprets it.
    pub color: String,
    /// Unique within a run.
    pub id: u32,
    /// Group ids this group's particles may bond with. May include `id`
    /// itself (self-compatible groups bond with their own kind).
    pub compatible_with: HashSet<u32>,
    /// Number of particles to place for this group.
    pub target_count: u32,
}

impl Group {
    /// Whether a particle of group `a` may start a bond with one of
    /// group `b`. Directional: only `a.compatible_with` is consulted.
    #[inline]
    pub fn can_join(a: &Group, b: &Group) -> bool {
        a.compatible_with.contains(&b.id)
    }
}

/// A raw configuration row describing one group, as delivered by the
/// configuration boundary: `(radius, mass, color_tag, group_id,
/// connection_ids_csv, particle_count)`.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupRow {
    pub radius: f32,
    pub mass: f32,
    pub color: String,
    pub group_id: u32,
    /// Delimited list of compatible group ids, e.g. `"0, 2,5"`.
    pub connection_ids: String,
    pub particle_count: u32,
}

/// Build [`Group`] records from configuration rows, in row order.
///
/// Non-integer tokens in a connection list are dropped with a warning,
/// never a failure.
pub fn build_groups(rows: &[GroupRow]) -> Vec<Group> {
    rows.iter()
        .map(|row| Group {
            radius: row.radius,
            mass: row.mass,
            color: row.color.clone(),
            id: row.group_id,
            compatible_with: parse_connection_ids(row.group_id, &row.connection_ids),
            target_count: row.particle_count,
        })
        .collect()
}

/// Report compatibility entries that reference an id no group defines.
///
/// Dangling ids are vacuously incompatible at runtime; they are returned
/// here so the caller can flag them as configuration errors.
pub fn validate_groups(groups: &[Group]) -> Vec<ConfigError> {
    let known: HashSet<u32> = groups.iter().map(|g| g.id).collect();
    let mut errors = Vec::new();
    for group in groups {
        for &id in &group.compatible_with {
            if !known.contains(&id) {
                errors.push(ConfigError::DanglingCompatibility {
                    group_id: group.id,
                    missing_id: id,
                });
            }
        }
    }
    errors
}

fn parse_connection_ids(group_id: u32, csv: &str) -> HashSet<u32> {
    let mut ids = HashSet::new();
    for token in csv.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match token.parse::<u32>() {
            Ok(id) => {
                ids.insert(id);
            }
            Err(_) => {
                log::warn!(
                    "group {}: dropping non-integer connection id {:?}",
                    group_id,
                    token
                );
            }
        }
    }
    ids
}
