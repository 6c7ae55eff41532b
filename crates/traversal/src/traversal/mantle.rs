//! Ledge detection and scripted mantling.
//!
//! Detection never runs continuously - the orchestrator (or host) asks
//! for it explicitly during a fall. If a qualifying ledge is found the
//! system plays out a fixed-duration phase chain, owning vertical
//! displacement during the climb, and ends with the player standing on
//! the ledge top.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::events::{EventHub, TraversalEvent};
use crate::probe::GroundProbe;

/// Forward inset past the wall face when probing down for the ledge top.
/// Keeps the top probe behind the lip rather than grazing it.
const LEDGE_INSET: f32 = 0.15;

/// Vertical margin above the climbable band for the top probe origin.
const TOP_PROBE_MARGIN: f32 = 0.05;

/// Mantle state machine phase.
///
/// The non-idle phases run on fixed durations; `progress` advances with
/// `dt`, clamps to `[0, 1]`, and resets to 0 on every phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MantlePhase {
    /// Nothing in progress.
    #[default]
    Idle,

    /// Reach window right after a ledge was found.
    Detecting,

    /// Hands on the lip; camera tilts toward the ledge.
    Grabbing,

    /// Vertical displacement from grab height up to the ledge top.
    Climbing,
}

/// Mantle tuning. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MantleConfig {
    /// Lowest climbable ledge height above the probe origin (meters).
    pub min_ledge_height: f32,

    /// Highest climbable ledge height above the probe origin (meters).
    pub max_ledge_height: f32,

    /// How far ahead the wall probe reaches (meters).
    pub forward_reach: f32,

    /// Minimum surface normal Y for a ledge top to count as horizontal.
    pub min_up_normal: f32,

    /// Clear space required above the ledge top (meters).
    pub headroom: f32,

    /// Duration of the detecting phase (seconds).
    pub detect_secs: f32,

    /// Duration of the grabbing phase (seconds).
    pub grab_secs: f32,

    /// Duration of the climbing phase (seconds).
    pub climb_secs: f32,

    /// Post-mantle cooldown preventing immediate re-chaining (seconds).
    pub cooldown_secs: f32,

    /// Peak camera pitch offset during the mantle (radians, applied
    /// downward).
    pub camera_pitch: f32,

    /// Peak camera roll offset during the mantle (radians).
    pub camera_roll: f32,
}

impl Default for MantleConfig {
    fn default() -> Self {
        Self {
            min_ledge_height: 0.5,
            max_ledge_height: 2.2,   // Just above standing reach
            forward_reach: 1.0,
            min_up_normal: 0.7,      // ~45 degree max ledge slope
            headroom: 1.0,
            detect_secs: 0.08,
            grab_secs: 0.25,
            climb_secs: 0.45,
            cooldown_secs: 0.4,
            camera_pitch: 0.35,      // ~20 degrees
            camera_roll: 0.08,
        }
    }
}

/// A detected ledge, valid for the lifetime of one mantle attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LedgeInfo {
    /// Ledge top point in world space.
    pub position: Vec3,

    /// Height of the ledge top above the probe origin at detection time.
    pub height: f32,

    /// Surface normal of the ledge top.
    pub normal: Vec3,
}

/// Result of advancing the mantle state machine for one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct MantleUpdate {
    /// Vertical displacement to apply to the player this frame.
    pub vertical_delta: f32,

    /// True on the frame the mantle completed and returned to idle.
    pub finished: bool,
}

/// Additive camera tilt produced by the mantle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MantleCameraOffset {
    /// Pitch offset in radians (negative = toward the ledge).
    pub pitch: f32,
    /// Roll offset in radians.
    pub roll: f32,
}

/// Mantle system: request-driven ledge detection plus a time-driven
/// grab-and-climb phase chain.
#[derive(Debug)]
pub struct MantleSystem {
    config: MantleConfig,
    phase: MantlePhase,
    /// Phase progress in `[0, 1]`.
    progress: f32,
    ledge: Option<LedgeInfo>,
    cooldown_remaining: f32,
    /// Vertical displacement already handed out during the climb.
    climbed: f32,
}

impl MantleSystem {
    /// Create a mantle system in the idle phase.
    pub fn new(config: MantleConfig) -> Self {
        Self {
            config,
            phase: MantlePhase::Idle,
            progress: 0.0,
            ledge: None,
            cooldown_remaining: 0.0,
            climbed: 0.0,
        }
    }

    /// Create a mantle system with default tuning.
    pub fn with_default_config() -> Self {
        Self::new(MantleConfig::default())
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> MantlePhase {
        self.phase
    }

    /// Whether a mantle is in progress.
    #[inline]
    pub fn is_mantling(&self) -> bool {
        self.phase != MantlePhase::Idle
    }

    /// Whether the post-mantle cooldown is still running.
    pub fn on_cooldown(&self) -> bool {
        self.cooldown_remaining > 0.0
    }

    /// Progress of the current phase in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// The ledge being mantled, if any.
    pub fn ledge(&self) -> Option<&LedgeInfo> {
        self.ledge.as_ref()
    }

    /// The tuning this system was built with.
    pub fn config(&self) -> &MantleConfig {
        &self.config
    }

    /// Try to find and grab a climbable ledge ahead of `position`.
    ///
    /// Fails (returns `false`, no state change) if a mantle is already in
    /// progress, the post-mantle cooldown is running, or no qualifying
    /// ledge exists within the climbable band.
    pub fn try_mantle(
        &mut self,
        position: Vec3,
        forward: Vec3,
        probe: &dyn GroundProbe,
        events: &mut EventHub,
    ) -> bool {
        if self.is_mantling() || self.on_cooldown() {
            return false;
        }

        let Some(ledge) = self.detect_ledge(position, forward, probe) else {
            return false;
        };

        log::debug!(
            "mantle start: ledge at {:?} height {:.2}",
            ledge.position,
            ledge.height
        );

        self.ledge = Some(ledge);
        self.progress = 0.0;
        self.climbed = 0.0;
        self.set_phase(MantlePhase::Detecting, events);
        true
    }

    /// Advance the phase chain by `dt` seconds.
    ///
    /// While climbing, the returned `vertical_delta` is the only vertical
    /// displacement the player receives - the caller must not also apply
    /// gravity.
    pub fn update(&mut self, dt: f32, events: &mut EventHub) -> MantleUpdate {
        if self.phase == MantlePhase::Idle {
            self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
            return MantleUpdate::default();
        }

        let duration = self.phase_duration(self.phase);
        self.progress = if duration > 0.0 {
            (self.progress + dt / duration).min(1.0)
        } else {
            1.0
        };

        let mut update = MantleUpdate::default();

        if self.phase == MantlePhase::Climbing {
            update.vertical_delta = self.climb_step();
        }

        if self.progress >= 1.0 {
            match self.phase {
                MantlePhase::Detecting => self.set_phase(MantlePhase::Grabbing, events),
                MantlePhase::Grabbing => self.set_phase(MantlePhase::Climbing, events),
                MantlePhase::Climbing => {
                    self.ledge = None;
                    self.climbed = 0.0;
                    self.cooldown_remaining = self.config.cooldown_secs;
                    self.set_phase(MantlePhase::Idle, events);
                    update.finished = true;
                }
                MantlePhase::Idle => unreachable!("idle handled above"),
            }
            self.progress = 0.0;
        }

        update
    }

    /// Additive camera tilt, non-zero only while a mantle is in progress.
    pub fn camera_offset(&self) -> MantleCameraOffset {
        let envelope = match self.phase {
            MantlePhase::Idle => 0.0,
            // Ramp in while reaching, hold through the grab, ease back
            // out as the climb finishes.
            MantlePhase::Detecting => self.progress,
            MantlePhase::Grabbing => 1.0,
            MantlePhase::Climbing => 1.0 - self.progress,
        };

        MantleCameraOffset {
            pitch: -self.config.camera_pitch * envelope,
            roll: self.config.camera_roll * envelope,
        }
    }

    /// Force idle, clearing ledge state, progress and cooldown.
    pub fn reset(&mut self, events: &mut EventHub) {
        self.ledge = None;
        self.progress = 0.0;
        self.climbed = 0.0;
        self.cooldown_remaining = 0.0;
        self.set_phase(MantlePhase::Idle, events);
    }

    // ========================================================================
    // Detection
    // ========================================================================

    /// Probe forward-and-up for a horizontal surface inside the
    /// climbable band.
    fn detect_ledge(
        &self,
        position: Vec3,
        forward: Vec3,
        probe: &dyn GroundProbe,
    ) -> Option<LedgeInfo> {
        let ahead = Vec3::new(forward.x, 0.0, forward.z);
        if ahead.length_squared() < 0.0001 {
            return None;
        }
        let ahead = ahead.normalize();

        // A ledge implies a wall: probe forward at the bottom of the band.
        let wall_origin = position + Vec3::Y * self.config.min_ledge_height;
        let wall = probe.cast_ray(wall_origin, ahead, self.config.forward_reach)?;

        // Probe down from above the band, just past the lip, for the top.
        let band_top = self.config.max_ledge_height + TOP_PROBE_MARGIN;
        let top_origin =
            position + Vec3::Y * band_top + ahead * (wall.distance + LEDGE_INSET);
        let top_reach = band_top - self.config.min_ledge_height;
        let top = probe.cast_ray(top_origin, Vec3::NEG_Y, top_reach)?;

        // Must be a near-horizontal surface inside the band.
        if top.normal.y < self.config.min_up_normal {
            return None;
        }
        let height = top.point.y - position.y;
        if height < self.config.min_ledge_height || height > self.config.max_ledge_height {
            return None;
        }

        // Enough clearance above the ledge top to stand up into.
        let headroom_origin = top.point + Vec3::Y * TOP_PROBE_MARGIN;
        if probe
            .cast_ray(headroom_origin, Vec3::Y, self.config.headroom)
            .is_some()
        {
            return None;
        }

        Some(LedgeInfo {
            position: top.point,
            height,
            normal: top.normal,
        })
    }

    // ========================================================================
    // Climb Displacement
    // ========================================================================

    /// Eased displacement step for the current climb progress.
    fn climb_step(&mut self) -> f32 {
        let Some(ledge) = self.ledge else {
            return 0.0;
        };

        let eased_total = ledge.height * ease_out(self.progress);
        let delta = eased_total - self.climbed;
        self.climbed = eased_total;
        delta
    }

    fn phase_duration(&self, phase: MantlePhase) -> f32 {
        match phase {
            MantlePhase::Idle => 0.0,
            MantlePhase::Detecting => self.config.detect_secs,
            MantlePhase::Grabbing => self.config.grab_secs,
            MantlePhase::Climbing => self.config.climb_secs,
        }
    }

    fn set_phase(&mut self, phase: MantlePhase, events: &mut EventHub) {
        if self.phase != phase {
            log::debug!("mantle phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            events.emit(TraversalEvent::MantlePhaseChanged { phase });
        }
    }
}

/// Cubic ease-out: fast start, gentle arrival at the ledge top.
fn ease_out(p: f32) -> f32 {
    let inv = 1.0 - p.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

// ============================================================================
// Tests
// ============================================================================
