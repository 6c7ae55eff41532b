//! Traversal mode and observable state.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::probe::SurfaceKind;

/// The composite vertical-motion mode, owned solely by the controller.
///
/// At most one mode is authoritative over vertical displacement each
/// frame. The leaf systems never store an "is active" flag of their own;
/// this enum is the single source of truth, which makes the
/// mantling/jetpacking mutual exclusion structural rather than a runtime
/// invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TraversalMode {
    /// Standing on walkable ground.
    #[default]
    Grounded,

    /// Airborne after a jump impulse, still under gravity.
    Jumping,

    /// Airborne without a jump (walked off a ledge, boost ended, ...).
    Falling,

    /// The mantle system owns vertical displacement.
    Mantling,

    /// The jetpack system owns vertical displacement.
    Jetpacking,
}

impl TraversalMode {
    /// Whether gravity integration applies in this mode.
    #[inline]
    pub fn under_gravity(self) -> bool {
        matches!(
            self,
            TraversalMode::Grounded | TraversalMode::Jumping | TraversalMode::Falling
        )
    }

    /// Whether the player is airborne (not grounded, not scripted).
    #[inline]
    pub fn airborne(self) -> bool {
        matches!(self, TraversalMode::Jumping | TraversalMode::Falling)
    }
}

/// Ground probe result for the current frame.
///
/// Ephemeral - recomputed every tick, never stored across frames.
#[derive(Debug, Clone, Copy)]
pub struct GroundInfo {
    /// Distance from the probe origin down to the surface.
    pub distance: f32,

    /// Surface classification, used only to pick landing cues.
    pub surface: SurfaceKind,

    /// Slope normal at the contact point.
    pub normal: Vec3,
}

/// Additive camera offsets produced by the traversal systems.
///
/// The host composes these onto the player-driven look rotation; they
/// never replace it. All fields are zero when nothing is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraAnimation {
    /// Pitch offset in radians (negative = dip downward).
    pub pitch_offset: f32,

    /// Roll offset in radians.
    pub roll_offset: f32,

    /// Shake amplitude in radians; the host turns this into jitter.
    pub shake_amplitude: f32,
}

impl CameraAnimation {
    /// True when every offset is zero.
    pub fn is_identity(&self) -> bool {
        self.pitch_offset == 0.0 && self.roll_offset == 0.0 && self.shake_amplitude == 0.0
    }
}

/// Observable vertical state snapshot.
///
/// Built on demand by the controller; the mutually exclusive activity
/// flags are derived from [`TraversalMode`], so they can never drift
/// out of sync with it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VerticalState {
    /// True when the downward probe reports contact within tolerance.
    pub is_grounded: bool,

    /// Signed vertical speed (meters/second); negative is falling.
    pub velocity_y: f32,

    /// Airborne due to a jump impulse.
    pub is_jumping: bool,

    /// Mantling a ledge. Never true together with `is_jetpacking`.
    pub is_mantling: bool,

    /// Boosting on the jetpack. Never true together with `is_mantling`.
    pub is_jetpacking: bool,

    /// Normalized jetpack fuel in `[0, 1]`.
    pub jetpack_fuel: f32,

    /// Seconds left in the coyote window; positive means a jump request
    /// still succeeds while airborne.
    pub coyote_time_remaining: f32,

    /// Transient camera-dip magnitude from the last hard landing,
    /// decaying toward zero.
    pub landing_bob_offset: f32,
}
