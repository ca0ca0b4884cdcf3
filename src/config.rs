//! The configuration boundary and the live tunables derived from it.
//!
//! The presentation layer (GUI widgets, files, network — the engine does
//! not care) exposes a flat key → value mapping through [`ConfigSource`].
//! Every value crosses the boundary as a string or boolean and is parsed
//! defensively here: non-numeric or out-of-range input is logged and the
//! previous valid value retained, never propagated as a crash.
//!
//! [`Tunables`] is the engine-side snapshot of those parameters, refreshed
//! once per frame by the simulation controller and read by the bond
//! lifecycle and the particle entities.

use crate::bond::dissociation_probability_per_tick;
use crate::group::GroupRow;

/// Canonical parameter names read from a [`ConfigSource`].
pub mod keys {
    /// Bond dissociation rate, percent per second, `0 ≤ rate < 100`.
    pub const DISSOCIATION_RATE: &str = "dissociation_rate";
    /// Re-bond cooldown after dissociation, seconds, `≥ 0`.
    pub const BOND_COOLDOWN: &str = "bond_cooldown";
    /// Bond spring frequency in Hz, `≥ 0`; `0` means a rigid joint.
    pub const BOND_STIFFNESS: &str = "bond_stiffness";
    /// Background-force x component.
    pub const GRAVITY_X: &str = "gravity_x";
    /// Thermal force mean on a 0–100 scale.
    pub const TEMPERATURE: &str = "temperature";
    /// When false, joints anchor at the contact point and lock rotation.
    pub const ALLOW_ROTATION: &str = "allow_rotation";
    /// Freezes the physics step while true.
    pub const PAUSED: &str = "paused";
}

/// A live key → value configuration mapping.
///
/// `value` and `flag` return `None` when the parameter is not currently
/// set, which leaves the engine's previous value untouched.
pub trait ConfigSource {
    /// Raw string value of a named numeric parameter.
    fn value(&self, key: &str) -> Option<String>;

    /// Current state of a named boolean parameter.
    fn flag(&self, key: &str) -> Option<bool>;

    /// Current group definitions, in display order.
    fn group_rows(&self) -> Vec<GroupRow>;

    /// Consume the reset trigger. Defaults to never firing; interactive
    /// sources return `true` exactly once per operator request.
    fn take_reset(&mut self) -> bool {
        false
    }
}

/// Process-wide simulation parameters, derived from configuration once
/// per frame.
///
/// Defaults: 25 %/s dissociation at 60 ticks/s, 10-tick cooldown, 1 Hz
/// bonds, temperature 5, rotation free.
#[derive(Clone, Debug)]
pub struct Tunables {
    /// Bond spring frequency, Hz. `0.0` disables the spring (rigid joint).
    pub stiffness: f32,
    /// Anchor joints at the contact point instead of body centers.
    pub rotation_locked: bool,
    /// Per-tick Bernoulli probability of an Active bond dissociating.
    pub dissociation_probability: f32,
    /// Ticks a dissociated pair stays unbondable.
    pub cooldown_ticks: u32,
    /// Mean of the per-frame thermal kick.
    pub thermal_force_mean: f32,
    /// Background-force x component pushed into the physics world.
    pub gravity_x: f32,
    /// Freezes the physics step while true.
    pub paused: bool,
    /// Raised on a rotation-lock edge; consumed after one maintenance
    /// pass has rebuilt every Active joint.
    force_rebuild_all: bool,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            stiffness: 1.0,
            rotation_locked: false,
            dissociation_probability: dissociation_probability_per_tick(25.0, 60.0),
            cooldown_ticks: 10,
            thermal_force_mean: 5.0,
            gravity_x: 0.0,
            paused: false,
            force_rebuild_all: false,
        }
    }
}

impl Tunables {
    /// Pull the current configuration, keeping the previous value for any
    /// field that is absent, unparseable, or out of range.
    pub fn ingest<C: ConfigSource + ?Sized>(&mut self, config: &C, ticks_per_second: f32) {
        if let Some(rate) = parse_f32(config, keys::DISSOCIATION_RATE) {
            if (0.0..100.0).contains(&rate) && ticks_per_second > 0.0 {
                self.dissociation_probability =
                    dissociation_probability_per_tick(rate, ticks_per_second);
            } else {
                log::warn!(
                    "{} = {} out of range, keeping previous value",
                    keys::DISSOCIATION_RATE,
                    rate
                );
            }
        }

        if let Some(seconds) = parse_f32(config, keys::BOND_COOLDOWN) {
            if seconds >= 0.0 {
                self.cooldown_ticks = (seconds * ticks_per_second).round() as u32;
            } else {
                log::warn!(
                    "{} = {} out of range, keeping previous value",
                    keys::BOND_COOLDOWN,
                    seconds
                );
            }
        }

        if let Some(stiffness) = parse_f32(config, keys::BOND_STIFFNESS) {
            if stiffness >= 0.0 {
                self.stiffness = stiffness;
            } else {
                log::warn!(
                    "{} = {} out of range, keeping previous value",
                    keys::BOND_STIFFNESS,
                    stiffness
                );
            }
        }

        if let Some(gravity) = parse_f32(config, keys::GRAVITY_X) {
            self.gravity_x = gravity;
        }

        if let Some(temperature) = parse_f32(config, keys::TEMPERATURE) {
            if (0.0..=100.0).contains(&temperature) {
                self.thermal_force_mean = temperature;
            } else {
                log::warn!(
                    "{} = {} out of range, keeping previous value",
                    keys::TEMPERATURE,
                    temperature
                );
            }
        }

        if let Some(allow) = config.flag(keys::ALLOW_ROTATION) {
            let locked = !allow;
            if locked != self.rotation_locked {
                self.rotation_locked = locked;
                self.force_rebuild_all = true;
            }
        }

        if let Some(paused) = config.flag(keys::PAUSED) {
            self.paused = paused;
        }
    }

    /// Whether a rebuild-all pass is due this frame.
    #[inline]
    pub fn rebuild_all_raised(&self) -> bool {
        self.force_rebuild_all
    }

    /// Consume the rebuild-all flag for this frame's maintenance pass.
    pub(crate) fn take_force_rebuild(&mut self) -> bool {
        std::mem::take(&mut self.force_rebuild_all)
    }
}

/// Parse a numeric field, logging rejects. Non-finite values count as
/// parse failures.
fn parse_f32<C: ConfigSource + ?Sized>(config: &C, key: &str) -> Option<f32> {
    let raw = config.value(key)?;
    match raw.trim().parse::<f32>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            log::warn!("{} = {:?} is not a number, keeping previous value", key, raw);
            None
        }
    }
}
