//! Traversal tuning configuration.
//!
//! All vertical-movement parameters are grouped here for easy tuning.
//! Values are metric (meters, seconds) unless otherwise noted. The fall
//! damage and thrust constants are game-feel numbers, not derived from
//! anything physical - treat them as freely re-tunable.

use serde::{Deserialize, Serialize};

use super::jetpack::JetpackConfig;
use super::mantle::MantleConfig;

/// Configuration for the vertical movement controller.
///
/// Leaf-system tuning lives in the embedded [`JetpackConfig`] and
/// [`MantleConfig`]; the fields here belong to the orchestrator itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalConfig {
    // ========================================================================
    // Gravity and Jumping
    // ========================================================================
    /// Gravity acceleration (meters/second²).
    pub gravity: f32,

    /// Terminal fall speed magnitude (meters/second).
    pub terminal_velocity: f32,

    /// Upward velocity applied on jump (meters/second).
    pub jump_velocity: f32,

    /// Grace window after leaving the ground during which a jump request
    /// still succeeds (seconds).
    pub coyote_time: f32,

    // ========================================================================
    // Ground Probing
    // ========================================================================
    /// Downward probe length from the probe origin (meters).
    pub ground_probe_distance: f32,

    /// Contact is reported when the probe hit is within this distance.
    pub ground_tolerance: f32,

    /// Minimum surface normal Y to be considered ground (cos of max slope).
    /// 0.7 ≈ 45 degrees.
    pub min_ground_normal: f32,

    // ========================================================================
    // Landing
    // ========================================================================
    /// Impact speed above which a landing deals fall damage (meters/second).
    pub fall_damage_threshold: f32,

    /// Damage per meter/second of impact speed past the threshold.
    pub fall_damage_scale: f32,

    /// Impact speed above which the landing camera dip triggers.
    pub hard_landing_speed: f32,

    /// Camera dip magnitude on a hard landing, scaled by impact speed.
    pub landing_bob_scale: f32,

    /// How fast the landing camera dip decays (per second).
    pub landing_bob_decay: f32,

    // ========================================================================
    // Air Control
    // ========================================================================
    /// Lateral speed multiplier the host applies while airborne
    /// (1.0 is applied while grounded).
    pub air_control: f32,

    // ========================================================================
    // Leaf Systems
    // ========================================================================
    /// Jetpack tuning.
    pub jetpack: JetpackConfig,

    /// Mantle tuning.
    pub mantle: MantleConfig,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            // Gravity and jumping
            gravity: 18.0,             // Heavier than real (9.8) for game feel
            terminal_velocity: 40.0,
            jump_velocity: 6.5,        // Gives ~1.2m jump height
            coyote_time: 0.15,

            // Ground probing
            ground_probe_distance: 2.0,
            ground_tolerance: 0.1,     // 10cm
            min_ground_normal: 0.7,    // ~45 degree max slope

            // Landing
            fall_damage_threshold: 12.0,
            fall_damage_scale: 4.0,
            hard_landing_speed: 8.0,
            landing_bob_scale: 0.02,
            landing_bob_decay: 6.0,

            // Air control
            air_control: 0.3,

            // Leaf systems
            jetpack: JetpackConfig::default(),
            mantle: MantleConfig::default(),
        }
    }
}

impl TraversalConfig {
    /// A "floaty arcade" preset with generous coyote time and soft landings.
    pub fn arcade() -> Self {
        Self {
            gravity: 14.0,
            jump_velocity: 7.5,
            coyote_time: 0.25,
            fall_damage_threshold: 18.0,
            air_control: 0.5,
            ..Default::default()
        }
    }

    /// A "heavy" preset with punishing falls and little air control.
    pub fn heavy() -> Self {
        Self {
            gravity: 24.0,
            jump_velocity: 5.5,
            coyote_time: 0.1,
            fall_damage_threshold: 9.0,
            fall_damage_scale: 6.0,
            air_control: 0.1,
            ..Default::default()
        }
    }

    /// Fall damage for a landing at `impact_speed` (positive, m/s).
    ///
    /// Zero below the threshold, then scales linearly with the excess.
    pub fn fall_damage(&self, impact_speed: f32) -> f32 {
        let excess = impact_speed - self.fall_damage_threshold;
        if excess > 0.0 {
            excess * self.fall_damage_scale
        } else {
            0.0
        }
    }
}
