//! Error types for the bond engine.
//!
//! The core has no fatal runtime errors: dense regions and malformed
//! configuration both degrade locally. These types exist so callers can
//! log the condition with full context and continue.

use std::fmt;

use glam::Vec2;

/// Errors produced by the placement generator.
#[derive(Debug)]
pub enum PlacementError {
    /// The region was too dense to place another particle within the
    /// retry budget. Placement for the whole group stops; the positions
    /// found before saturation are carried so the caller can keep them.
    Saturated {
        group_id: u32,
        placed: Vec<Vec2>,
        requested: u32,
    },
}

impl PlacementError {
    /// Recover the positions placed before the failure.
    pub fn into_placed(self) -> Vec<Vec2> {
        match self {
            PlacementError::Saturated { placed, .. } => placed,
        }
    }
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::Saturated {
                group_id,
                placed,
                requested,
            } => write!(
                f,
                "placement saturated for group {}: placed {} of {} particles before running out of room",
                group_id,
                placed.len(),
                requested
            ),
        }
    }
}

impl std::error::Error for PlacementError {}

/// Configuration problems worth surfacing to the operator.
///
/// None of these abort the run; dangling ids are vacuously incompatible
/// at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A group's compatibility list references an id no group defines.
    DanglingCompatibility { group_id: u32, missing_id: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::DanglingCompatibility {
                group_id,
                missing_id,
            } => write!(
                f,
                "group {} lists compatible group {} which is not defined",
                group_id, missing_id
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturated_display_and_recovery() {
        let err = PlacementError::Saturated {
            group_id: 3,
            placed: vec![Vec2::ZERO, Vec2::ONE],
            requested: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("group 3"));
        assert!(msg.contains("2 of 10"));
        assert_eq!(err.into_placed().len(), 2);
    }

    #[test]
    fn test_dangling_display() {
        let err = ConfigError::DanglingCompatibility {
            group_id: 0,
            missing_id: 7,
        };
        assert!(err.to_string().contains("group 7"));
    }
}
