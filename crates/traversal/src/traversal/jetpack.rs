//! Jetpack fuel-gauge state machine.
//!
//! Produces a short, cooldown-gated thrust vector while boosting,
//! independent of ground state. Every boost ends through one internal
//! transition function, whether it ran out of fuel, hit the duration cap,
//! or was stopped explicitly, so the cooldown/recharge split can never
//! diverge between exit paths.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::events::{EventHub, TraversalEvent};

/// Jetpack state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JetpackPhase {
    /// Full fuel or idle with enough fuel; a boost may start.
    #[default]
    Ready,

    /// Actively thrusting and draining fuel.
    Boosting,

    /// Post-depletion lockout; no regen until the timer expires.
    Cooldown,

    /// Waiting out the regen delay, then refilling linearly.
    /// A boost may start from here if enough fuel has returned.
    Recharging,
}

/// Jetpack tuning. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JetpackConfig {
    /// Tank capacity. Fuel is clamped to `[0, max_fuel]` at all times.
    pub max_fuel: f32,

    /// Fuel drained per second while boosting.
    pub consumption_rate: f32,

    /// Fuel restored per second while recharging (after the delay).
    pub regen_rate: f32,

    /// Minimum fuel required for `try_boost` to succeed.
    pub min_activation_fuel: f32,

    /// Lockout after a fully depleted boost (seconds).
    pub cooldown_secs: f32,

    /// Pause before regen starts once recharging begins (seconds).
    pub regen_delay_secs: f32,

    /// Hard cap on a single boost (seconds).
    pub max_boost_secs: f32,

    /// Upward climb rate while boosting (meters/second).
    pub vertical_thrust: f32,

    /// Horizontal push along the movement-input direction (meters/second).
    pub horizontal_thrust: f32,

    /// Camera shake amplitude while boosting (radians).
    pub shake_intensity: f32,
}

impl Default for JetpackConfig {
    fn default() -> Self {
        Self {
            max_fuel: 1.0,
            consumption_rate: 0.4,   // ~2.5s of thrust on a full tank
            regen_rate: 0.25,        // ~4s to refill
            min_activation_fuel: 0.15,
            cooldown_secs: 1.5,
            regen_delay_secs: 1.0,
            max_boost_secs: 1.2,
            vertical_thrust: 9.0,
            horizontal_thrust: 4.0,
            shake_intensity: 0.008,
        }
    }
}

/// Jetpack system: fuel economy plus a four-phase state machine.
///
/// Pure simulation - all side effects go through the [`EventHub`] passed
/// into each mutating call (thruster particles, HUD fuel gauge, looping
/// audio start/stop are external subscribers).
#[derive(Debug)]
pub struct JetpackSystem {
    config: JetpackConfig,
    phase: JetpackPhase,
    fuel: f32,
    boost_elapsed: f32,
    cooldown_remaining: f32,
    regen_delay_remaining: f32,
}

impl JetpackSystem {
    /// Create a jetpack with a full tank, ready to boost.
    pub fn new(config: JetpackConfig) -> Self {
        let fuel = config.max_fuel;
        Self {
            config,
            phase: JetpackPhase::Ready,
            fuel,
            boost_elapsed: 0.0,
            cooldown_remaining: 0.0,
            regen_delay_remaining: 0.0,
        }
    }

    /// Create a jetpack with default tuning.
    pub fn with_default_config() -> Self {
        Self::new(JetpackConfig::default())
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> JetpackPhase {
        self.phase
    }

    /// Whether a boost is currently active.
    #[inline]
    pub fn is_boosting(&self) -> bool {
        self.phase == JetpackPhase::Boosting
    }

    /// Current fuel level in `[0, max_fuel]`.
    #[inline]
    pub fn fuel(&self) -> f32 {
        self.fuel
    }

    /// Current fuel as a fraction of capacity in `[0, 1]`.
    pub fn fuel_fraction(&self) -> f32 {
        if self.config.max_fuel > 0.0 {
            self.fuel / self.config.max_fuel
        } else {
            0.0
        }
    }

    /// The tuning this system was built with.
    pub fn config(&self) -> &JetpackConfig {
        &self.config
    }

    /// Camera shake amplitude for the current frame.
    pub fn shake_amplitude(&self) -> f32 {
        if self.is_boosting() {
            self.config.shake_intensity
        } else {
            0.0
        }
    }

    /// Try to start a boost.
    ///
    /// Succeeds only from `Ready` or `Recharging` with at least
    /// `min_activation_fuel` in the tank. A `false` return is the normal
    /// "not now" signal - no state changes, nothing is emitted.
    pub fn try_boost(&mut self, events: &mut EventHub) -> bool {
        let phase_ok = matches!(self.phase, JetpackPhase::Ready | JetpackPhase::Recharging);
        if !phase_ok || self.fuel < self.config.min_activation_fuel {
            log::debug!(
                "boost refused: phase={:?} fuel={:.2} min={:.2}",
                self.phase,
                self.fuel,
                self.config.min_activation_fuel
            );
            return false;
        }

        self.boost_elapsed = 0.0;
        self.regen_delay_remaining = 0.0;
        self.set_phase(JetpackPhase::Boosting, events);
        events.emit(TraversalEvent::BoostStarted);
        true
    }

    /// End an active boost early. No-op unless boosting.
    pub fn stop_boost(&mut self, events: &mut EventHub) {
        if self.phase == JetpackPhase::Boosting {
            self.end_boost(events);
        }
    }

    /// Advance the state machine by `dt` seconds.
    ///
    /// Returns the thrust vector for this frame: a fixed vertical climb
    /// rate plus a horizontal component along `move_input` (the host-set
    /// movement-input direction), or zero when not boosting.
    pub fn update(&mut self, dt: f32, move_input: Vec3, events: &mut EventHub) -> Vec3 {
        match self.phase {
            JetpackPhase::Ready => Vec3::ZERO,

            JetpackPhase::Boosting => {
                self.set_fuel(self.fuel - self.config.consumption_rate * dt, events);
                self.boost_elapsed += dt;

                // Thrust still applies across the frame that depletes the tank.
                let thrust = self.current_thrust(move_input);

                if self.fuel <= 0.0 || self.boost_elapsed >= self.config.max_boost_secs {
                    self.end_boost(events);
                }

                thrust
            }

            JetpackPhase::Cooldown => {
                self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
                if self.cooldown_remaining == 0.0 {
                    self.regen_delay_remaining = self.config.regen_delay_secs;
                    self.set_phase(JetpackPhase::Recharging, events);
                }
                Vec3::ZERO
            }

            JetpackPhase::Recharging => {
                let mut budget = dt;
                if self.regen_delay_remaining > 0.0 {
                    let waited = budget.min(self.regen_delay_remaining);
                    self.regen_delay_remaining -= waited;
                    budget -= waited;
                }
                if self.regen_delay_remaining <= 0.0 && budget > 0.0 {
                    self.set_fuel(self.fuel + self.config.regen_rate * budget, events);
                    if self.fuel >= self.config.max_fuel {
                        self.set_phase(JetpackPhase::Ready, events);
                    }
                }
                Vec3::ZERO
            }
        }
    }

    /// Force-fill the tank and return to `Ready`, from any phase.
    ///
    /// Used for fuel pickups. Unlike [`reset`](Self::reset) this does not
    /// route an active boost through the end-of-boost path.
    pub fn refuel(&mut self, events: &mut EventHub) {
        self.boost_elapsed = 0.0;
        self.cooldown_remaining = 0.0;
        self.regen_delay_remaining = 0.0;
        self.set_fuel(self.config.max_fuel, events);
        self.set_phase(JetpackPhase::Ready, events);
    }

    /// Respawn reset: stop any active boost, then refill.
    pub fn reset(&mut self, events: &mut EventHub) {
        if self.phase == JetpackPhase::Boosting {
            events.emit(TraversalEvent::BoostEnded);
        }
        self.refuel(events);
    }

    /// Single exit path for every boost termination.
    ///
    /// Empty tank goes to `Cooldown`, remaining fuel goes straight to
    /// `Recharging`.
    fn end_boost(&mut self, events: &mut EventHub) {
        events.emit(TraversalEvent::BoostEnded);

        if self.fuel <= 0.0 {
            self.cooldown_remaining = self.config.cooldown_secs;
            self.set_phase(JetpackPhase::Cooldown, events);
        } else {
            self.regen_delay_remaining = self.config.regen_delay_secs;
            self.set_phase(JetpackPhase::Recharging, events);
        }
    }

    fn current_thrust(&self, move_input: Vec3) -> Vec3 {
        let mut thrust = Vec3::Y * self.config.vertical_thrust;

        // Directional boost: lean in whatever direction the player is
        // already steering.
        let lateral = Vec3::new(move_input.x, 0.0, move_input.z);
        if lateral.length_squared() > 0.0001 {
            thrust += lateral.normalize() * self.config.horizontal_thrust;
        }

        thrust
    }

    fn set_phase(&mut self, phase: JetpackPhase, events: &mut EventHub) {
        if self.phase != phase {
            log::debug!("jetpack phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            events.emit(TraversalEvent::JetpackPhaseChanged { phase });
        }
    }

    fn set_fuel(&mut self, fuel: f32, events: &mut EventHub) {
        let clamped = fuel.clamp(0.0, self.config.max_fuel);
        if clamped != self.fuel {
            self.fuel = clamped;
            events.emit(TraversalEvent::FuelChanged {
                fuel: self.fuel,
                max_fuel: self.config.max_fuel,
            });
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
