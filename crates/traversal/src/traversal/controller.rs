//! Vertical movement controller.
//!
//! The orchestrator over jumping, mantling and jetpack boosts. It owns
//! gravity integration, ground detection, coyote-time jump arbitration
//! and landing classification, and delegates vertical displacement to
//! whichever sub-mode currently holds authority. Exactly one
//! displacement source is authoritative per frame: gravity and sub-mode
//! displacement are never summed.
//!
//! # Example
//!
//! ```ignore
//! let mut controller = TraversalController::with_default_config();
//!
//! // Each simulation tick:
//! controller.set_move_input(wish_direction);
//! let dy = controller.update(dt, position, forward, &world);
//! position.y += dy;
//! ```

use glam::Vec3;

use super::config::TraversalConfig;
use super::events::{EventHub, TraversalEvent};
use super::jetpack::JetpackSystem;
use super::mantle::MantleSystem;
use super::state::{CameraAnimation, GroundInfo, TraversalMode, VerticalState};
use crate::probe::GroundProbe;

/// Upper bound on a single integration step; spikes beyond this are
/// clamped so a hitch can't explode velocity or drain the fuel tank.
const MAX_FRAME_DT: f32 = 0.066;

/// The downward probe starts slightly above the feet so a coplanar
/// origin doesn't slip through the floor.
const GROUND_PROBE_LIFT: f32 = 0.05;

/// Orchestrator for all vertical motion of the player.
///
/// Owned by the player session, one per player, recreated state on
/// [`reset`](Self::reset). The world is reached only through the
/// [`GroundProbe`] passed into [`update`](Self::update) and
/// [`try_mantle`](Self::try_mantle).
#[derive(Debug)]
pub struct TraversalController {
    config: TraversalConfig,
    jetpack: JetpackSystem,
    mantle: MantleSystem,
    events: EventHub,

    mode: TraversalMode,
    velocity_y: f32,
    coyote_remaining: f32,
    landing_bob: f32,
    move_input: Vec3,
    /// Thrust from the most recent jetpack frame; the horizontal part is
    /// queried by the host's lateral movement code.
    boost_thrust: Vec3,
}

impl TraversalController {
    /// Create a controller in the grounded rest state.
    pub fn new(config: TraversalConfig) -> Self {
        let jetpack = JetpackSystem::new(config.jetpack.clone());
        let mantle = MantleSystem::new(config.mantle.clone());
        let coyote_remaining = config.coyote_time;

        Self {
            config,
            jetpack,
            mantle,
            events: EventHub::new(),
            mode: TraversalMode::Grounded,
            velocity_y: 0.0,
            coyote_remaining,
            landing_bob: 0.0,
            move_input: Vec3::ZERO,
            boost_thrust: Vec3::ZERO,
        }
    }

    /// Create a controller with default tuning.
    pub fn with_default_config() -> Self {
        Self::new(TraversalConfig::default())
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Current composite mode.
    #[inline]
    pub fn mode(&self) -> TraversalMode {
        self.mode
    }

    /// Whether the player is standing on walkable ground.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.mode == TraversalMode::Grounded
    }

    /// Normalized jetpack fuel in `[0, 1]`, for the HUD gauge.
    pub fn fuel(&self) -> f32 {
        self.jetpack.fuel_fraction()
    }

    /// The jetpack sub-system (read-only).
    pub fn jetpack(&self) -> &JetpackSystem {
        &self.jetpack
    }

    /// The mantle sub-system (read-only).
    pub fn mantle(&self) -> &MantleSystem {
        &self.mantle
    }

    /// The tuning this controller was built with.
    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Lateral speed multiplier for the host's horizontal movement code:
    /// 1.0 on the ground, the configured fraction while airborne.
    ///
    /// Never applied internally to anything the controller owns.
    pub fn air_control_multiplier(&self) -> f32 {
        if self.is_grounded() {
            1.0
        } else {
            self.config.air_control
        }
    }

    /// Horizontal jetpack push for the current frame (zero X/Z unless a
    /// directional boost is active). The host adds this to its lateral
    /// velocity.
    pub fn horizontal_boost(&self) -> Vec3 {
        Vec3::new(self.boost_thrust.x, 0.0, self.boost_thrust.z)
    }

    /// Snapshot of the observable vertical state.
    ///
    /// The activity flags are derived from the mode enum, so
    /// `is_mantling && is_jetpacking` can never be observed.
    pub fn state(&self) -> VerticalState {
        VerticalState {
            is_grounded: self.mode == TraversalMode::Grounded,
            velocity_y: self.velocity_y,
            is_jumping: self.mode == TraversalMode::Jumping,
            is_mantling: self.mode == TraversalMode::Mantling,
            is_jetpacking: self.mode == TraversalMode::Jetpacking,
            jetpack_fuel: self.jetpack.fuel_fraction(),
            coyote_time_remaining: self.coyote_remaining,
            landing_bob_offset: self.landing_bob,
        }
    }

    /// Union of all active camera offsets: mantle tilt, jetpack shake
    /// and the decaying landing dip. Additive over player look input.
    pub fn camera_animation(&self) -> CameraAnimation {
        let tilt = self.mantle.camera_offset();
        CameraAnimation {
            pitch_offset: tilt.pitch - self.landing_bob,
            roll_offset: tilt.roll,
            shake_amplitude: self.jetpack.shake_amplitude(),
        }
    }

    /// Register an event subscriber (HUD, audio, statistics, ...).
    pub fn subscribe(&mut self, sink: impl FnMut(&TraversalEvent) + 'static) {
        self.events.subscribe(sink);
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Whether a jump request would currently succeed: on the ground, or
    /// airborne within the coyote window. Never while a scripted
    /// sub-mode holds authority.
    pub fn can_jump(&self) -> bool {
        match self.mode {
            TraversalMode::Grounded => true,
            TraversalMode::Jumping | TraversalMode::Falling => self.coyote_remaining > 0.0,
            TraversalMode::Mantling | TraversalMode::Jetpacking => false,
        }
    }

    /// Request a jump impulse. Returns `false` without state change when
    /// the guard fails; that is the expected "not now" outcome.
    pub fn request_jump(&mut self) -> bool {
        if !self.can_jump() {
            return false;
        }

        self.velocity_y = self.config.jump_velocity;
        self.coyote_remaining = 0.0;
        self.mode = TraversalMode::Jumping;
        self.events.emit(TraversalEvent::Jumped);
        true
    }

    /// Request a jetpack boost. Refused while mantling; otherwise
    /// forwarded to the jetpack, and the mode flips only if the leaf
    /// accepts.
    pub fn try_jetpack(&mut self) -> bool {
        if self.mode == TraversalMode::Mantling {
            return false;
        }
        if !self.jetpack.try_boost(&mut self.events) {
            return false;
        }

        self.mode = TraversalMode::Jetpacking;
        true
    }

    /// Request a mantle. Only honored while airborne under gravity (a
    /// boost or an active mantle keeps authority); otherwise forwarded
    /// to the mantle system, and the mode flips only if a ledge was
    /// found.
    pub fn try_mantle(&mut self, position: Vec3, forward: Vec3, probe: &dyn GroundProbe) -> bool {
        if !self.mode.airborne() {
            return false;
        }
        if !self.mantle.try_mantle(position, forward, probe, &mut self.events) {
            return false;
        }

        // The mantle owns vertical motion from here; drop any fall speed.
        self.velocity_y = 0.0;
        self.mode = TraversalMode::Mantling;
        true
    }

    /// Release the boost button: stop thrusting and fall naturally.
    /// No-op unless a boost is active.
    pub fn stop_jetpack(&mut self) {
        if self.mode == TraversalMode::Jetpacking {
            self.jetpack.stop_boost(&mut self.events);
            self.boost_thrust = Vec3::ZERO;
            self.mode = TraversalMode::Falling;
        }
    }

    /// Force-stop any active sub-mode (death, scripted interruptions).
    /// Leaves the player grounded if already grounded, otherwise falling.
    pub fn cancel_movement(&mut self) {
        self.jetpack.stop_boost(&mut self.events);
        self.mantle.reset(&mut self.events);
        self.boost_thrust = Vec3::ZERO;

        if self.mode != TraversalMode::Grounded {
            self.mode = TraversalMode::Falling;
        }
    }

    /// Teleport/respawn escape hatch: snap to the grounded rest state
    /// without landing classification.
    pub fn force_ground(&mut self) {
        self.jetpack.stop_boost(&mut self.events);
        self.mantle.reset(&mut self.events);
        self.boost_thrust = Vec3::ZERO;
        self.velocity_y = 0.0;
        self.coyote_remaining = self.config.coyote_time;
        self.mode = TraversalMode::Grounded;
    }

    /// Respawn reset: grounded, still, full tank, everything idle.
    /// Idempotent.
    pub fn reset(&mut self) {
        self.jetpack.reset(&mut self.events);
        self.mantle.reset(&mut self.events);
        self.mode = TraversalMode::Grounded;
        self.velocity_y = 0.0;
        self.coyote_remaining = self.config.coyote_time;
        self.landing_bob = 0.0;
        self.move_input = Vec3::ZERO;
        self.boost_thrust = Vec3::ZERO;
    }

    /// Set the host's current movement-input direction, used only to add
    /// a horizontal component to jetpack thrust.
    pub fn set_move_input(&mut self, direction: Vec3) {
        self.move_input = direction;
    }

    // ========================================================================
    // Per-frame Update
    // ========================================================================

    /// Advance vertical motion by one tick and return the vertical delta
    /// the host applies to the player position.
    ///
    /// `position` is the probe origin (feet); `forward` is the facing
    /// direction (used for logging/symmetry with `try_mantle`; detection
    /// itself never runs here).
    pub fn update(
        &mut self,
        dt: f32,
        position: Vec3,
        _forward: Vec3,
        probe: &dyn GroundProbe,
    ) -> f32 {
        // A bad dt must not leak into velocity or fuel state.
        if !dt.is_finite() || dt <= 0.0 {
            log::debug!("skipping frame with invalid dt {}", dt);
            return 0.0;
        }
        let dt = dt.min(MAX_FRAME_DT);

        // Landing dip decays regardless of mode.
        self.landing_bob *= (1.0 - self.config.landing_bob_decay * dt).max(0.0);

        // Leaf timers (cooldowns, regen, mantle cooldown) always run;
        // their displacement outputs only matter in the matching mode.
        self.boost_thrust = self.jetpack.update(dt, self.move_input, &mut self.events);
        let mantle_update = self.mantle.update(dt, &mut self.events);

        // Sub-mode delegation comes before gravity: at most one vertical
        // displacement source per frame.
        match self.mode {
            TraversalMode::Mantling => {
                if mantle_update.finished {
                    self.velocity_y = 0.0;
                    self.mode = TraversalMode::Falling;
                }
                mantle_update.vertical_delta
            }

            TraversalMode::Jetpacking => {
                if self.jetpack.is_boosting() {
                    self.velocity_y = self.boost_thrust.y;
                    self.velocity_y * dt
                } else {
                    // Boost expired inside the leaf update this frame;
                    // carry the final thrust step, then fall.
                    self.mode = TraversalMode::Falling;
                    self.boost_thrust.y * dt
                }
            }

            TraversalMode::Grounded | TraversalMode::Jumping | TraversalMode::Falling => {
                self.integrate_gravity(dt, position, probe)
            }
        }
    }

    // ========================================================================
    // Gravity Path
    // ========================================================================

    fn integrate_gravity(&mut self, dt: f32, position: Vec3, probe: &dyn GroundProbe) -> f32 {
        self.velocity_y -= self.config.gravity * dt;
        if self.velocity_y < -self.config.terminal_velocity {
            self.velocity_y = -self.config.terminal_velocity;
        }

        let fall_step = self.velocity_y * dt;

        // Rising players can't ground; don't re-stick right after a jump.
        // The probe must cover at least this frame's fall step, or a
        // clamped frame at terminal velocity can step past thin geometry.
        let ground = if self.velocity_y <= 0.0 {
            self.probe_ground(position, -fall_step, probe)
        } else {
            None
        };

        if let Some(info) = ground {
            let contact = info.distance <= self.config.ground_tolerance
                || info.distance <= -fall_step;
            if contact {
                if self.mode != TraversalMode::Grounded {
                    self.classify_landing(&info);
                }
                self.velocity_y = 0.0;
                self.coyote_remaining = self.config.coyote_time;
                self.mode = TraversalMode::Grounded;
                // Settle exactly onto the surface.
                return -info.distance;
            }
        }

        // Airborne: tick coyote time, flip jump arcs over into falling.
        if self.mode == TraversalMode::Grounded {
            log::debug!("left ground, coyote window {}s", self.config.coyote_time);
            self.mode = TraversalMode::Falling;
        } else if self.mode == TraversalMode::Jumping && self.velocity_y <= 0.0 {
            self.mode = TraversalMode::Falling;
        }
        self.coyote_remaining = (self.coyote_remaining - dt).max(0.0);

        fall_step
    }

    /// Downward probe from the feet, reaching at least `min_reach`
    /// meters. Steep surfaces don't count as ground.
    fn probe_ground(
        &self,
        position: Vec3,
        min_reach: f32,
        probe: &dyn GroundProbe,
    ) -> Option<GroundInfo> {
        let origin = position + Vec3::Y * GROUND_PROBE_LIFT;
        let max_distance = self.config.ground_probe_distance.max(min_reach) + GROUND_PROBE_LIFT;

        let hit = probe.cast_ray(origin, Vec3::NEG_Y, max_distance)?;
        if hit.normal.y < self.config.min_ground_normal {
            return None;
        }

        Some(GroundInfo {
            distance: hit.distance - GROUND_PROBE_LIFT,
            surface: hit.surface,
            normal: hit.normal,
        })
    }

    /// Probe results are already in hand; classify the impact and notify.
    fn classify_landing(&mut self, info: &GroundInfo) {
        let impact_speed = -self.velocity_y;

        let damage = self.config.fall_damage(impact_speed);
        if damage > 0.0 {
            self.events.emit(TraversalEvent::FallDamage { amount: damage });
        }

        if impact_speed > self.config.hard_landing_speed {
            self.landing_bob = impact_speed * self.config.landing_bob_scale;
        }

        self.events.emit(TraversalEvent::Landed {
            impact_speed,
            surface: info.surface,
        });
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbeWorld, SurfaceKind};
    use crate::traversal::jetpack::JetpackPhase;
    use crate::traversal::mantle::MantlePhase;
    use std::cell::RefCell;
    use std::rc::Rc;

    const FRAME: f32 = 0.016;

    fn flat_world() -> ProbeWorld {
        let mut world = ProbeWorld::new();
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(100.0, 0.5, 100.0),
            SurfaceKind::Hard,
        );
        world
    }

    fn empty_world() -> ProbeWorld {
        ProbeWorld::new()
    }

    /// Run one frame against a position on the flat floor.
    fn tick(controller: &mut TraversalController, world: &ProbeWorld, pos: &mut Vec3) {
        let dy = controller.update(FRAME, *pos, Vec3::X, world);
        pos.y += dy;
    }

    fn grounded_controller(world: &ProbeWorld) -> (TraversalController, Vec3) {
        let mut controller = TraversalController::with_default_config();
        let mut pos = Vec3::new(0.0, 0.0, 0.0);
        tick(&mut controller, world, &mut pos);
        assert!(controller.is_grounded());
        (controller, pos)
    }

    fn event_log(controller: &mut TraversalController) -> Rc<RefCell<Vec<TraversalEvent>>> {
        let events: Rc<RefCell<Vec<TraversalEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        controller.subscribe(move |e| sink.borrow_mut().push(*e));
        events
    }

    // ========================================================================
    // Grounding and Gravity
    // ========================================================================

    #[test]
    fn test_starts_grounded_on_flat_floor() {
        let world = flat_world();
        let (controller, _) = grounded_controller(&world);
        assert_eq!(controller.mode(), TraversalMode::Grounded);
        assert_eq!(controller.state().velocity_y, 0.0);
    }

    #[test]
    fn test_falls_in_empty_world() {
        let world = empty_world();
        let mut controller = TraversalController::with_default_config();
        let mut pos = Vec3::new(0.0, 10.0, 0.0);

        tick(&mut controller, &world, &mut pos);
        assert_eq!(controller.mode(), TraversalMode::Falling);
        assert!(pos.y < 10.0);
    }

    #[test]
    fn test_fall_speed_capped_at_terminal_velocity() {
        let world = empty_world();
        let mut controller = TraversalController::with_default_config();
        let mut pos = Vec3::new(0.0, 1000.0, 0.0);

        for _ in 0..1000 {
            tick(&mut controller, &world, &mut pos);
        }

        let terminal = controller.config().terminal_velocity;
        assert_eq!(controller.state().velocity_y, -terminal);
    }

    #[test]
    fn test_terminal_fall_lands_on_thin_geometry() {
        // One clamped frame at terminal velocity covers more ground than
        // the resting probe length; the probe has to stretch with the
        // fall step or thin surfaces get stepped past.
        let mut world = ProbeWorld::new();
        world.add_box(
            Vec3::new(0.0, -0.05, 0.0),
            Vec3::new(5.0, 0.05, 5.0),
            SurfaceKind::Metal,
        );

        let mut controller = TraversalController::with_default_config();
        let events = event_log(&mut controller);

        // Reach terminal velocity over open air.
        let empty = empty_world();
        let mut pos = Vec3::new(0.0, 1000.0, 0.0);
        for _ in 0..100 {
            pos.y += controller.update(MAX_FRAME_DT, pos, Vec3::X, &empty);
        }
        let terminal = controller.config().terminal_velocity;
        assert_eq!(controller.state().velocity_y, -terminal);

        // Feet 2.5m above the pad: one max-length frame would fall past it.
        pos = Vec3::new(0.0, 2.5, 0.0);
        pos.y += controller.update(MAX_FRAME_DT, pos, Vec3::X, &world);

        assert!(controller.is_grounded(), "stepped past the pad");
        assert!(pos.y.abs() < 1e-3, "should settle on the pad, y={}", pos.y);
        let landed = events.borrow().iter().any(|e| {
            matches!(
                e,
                TraversalEvent::Landed {
                    surface: SurfaceKind::Metal,
                    ..
                }
            )
        });
        assert!(landed);
    }

    #[test]
    fn test_invalid_dt_is_skipped() {
        let world = flat_world();
        let (mut controller, pos) = grounded_controller(&world);

        let before = controller.state();
        assert_eq!(controller.update(f32::NAN, pos, Vec3::X, &world), 0.0);
        assert_eq!(controller.update(-0.5, pos, Vec3::X, &world), 0.0);
        assert_eq!(controller.update(0.0, pos, Vec3::X, &world), 0.0);
        let after = controller.state();

        assert_eq!(before.velocity_y, after.velocity_y);
        assert_eq!(before.jetpack_fuel, after.jetpack_fuel);
    }

    #[test]
    fn test_landing_emits_event_with_surface() {
        let mut world = ProbeWorld::new();
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(100.0, 0.5, 100.0),
            SurfaceKind::Metal,
        );

        let mut controller = TraversalController::with_default_config();
        let events = event_log(&mut controller);
        let mut pos = Vec3::new(0.0, 2.0, 0.0);

        for _ in 0..200 {
            tick(&mut controller, &world, &mut pos);
            if controller.is_grounded() {
                break;
            }
        }
        assert!(controller.is_grounded());

        let landed = events.borrow().iter().any(|e| {
            matches!(
                e,
                TraversalEvent::Landed {
                    surface: SurfaceKind::Metal,
                    ..
                }
            )
        });
        assert!(landed, "expected a Landed event with the metal surface");
    }

    #[test]
    fn test_soft_landing_deals_no_damage() {
        let world = flat_world();
        let mut controller = TraversalController::with_default_config();
        let events = event_log(&mut controller);
        // Low drop: impact far below the damage threshold.
        let mut pos = Vec3::new(0.0, 0.5, 0.0);

        for _ in 0..200 {
            tick(&mut controller, &world, &mut pos);
        }
        assert!(controller.is_grounded());

        let damaged = events
            .borrow()
            .iter()
            .any(|e| matches!(e, TraversalEvent::FallDamage { .. }));
        assert!(!damaged);
    }

    #[test]
    fn test_hard_landing_deals_scaled_damage_and_bobs_camera() {
        let world = flat_world();
        let mut controller = TraversalController::with_default_config();
        let events = event_log(&mut controller);
        // Threshold is 12 m/s at 18 m/s²: ~4m of fall. Drop from 8m.
        let mut pos = Vec3::new(0.0, 8.0, 0.0);

        let mut saw_bob = false;
        for _ in 0..400 {
            tick(&mut controller, &world, &mut pos);
            if controller.state().landing_bob_offset > 0.0 {
                saw_bob = true;
            }
            if controller.is_grounded() {
                break;
            }
        }
        assert!(controller.is_grounded());

        let damage = events.borrow().iter().find_map(|e| match e {
            TraversalEvent::FallDamage { amount } => Some(*amount),
            _ => None,
        });
        let damage = damage.expect("an 8m drop should exceed the threshold");
        assert!(damage > 0.0);
        assert!(saw_bob, "hard landing should set the camera dip");

        // Velocity resets exactly on the contact frame
        assert_eq!(controller.state().velocity_y, 0.0);
    }

    #[test]
    fn test_landing_bob_decays() {
        let world = flat_world();
        let mut controller = TraversalController::with_default_config();
        let mut pos = Vec3::new(0.0, 8.0, 0.0);

        for _ in 0..400 {
            tick(&mut controller, &world, &mut pos);
            if controller.is_grounded() {
                break;
            }
        }
        let right_after = controller.state().landing_bob_offset;
        assert!(right_after > 0.0);

        for _ in 0..120 {
            tick(&mut controller, &world, &mut pos);
        }
        assert!(controller.state().landing_bob_offset < right_after * 0.1);
    }

    #[test]
    fn test_steep_slope_is_not_ground() {
        let mut world = ProbeWorld::new();
        // A thin wall the probe ray grazes from the side: its side
        // normal is horizontal, so it must not count as ground.
        world.add_box(
            Vec3::new(0.0, -2.0, 0.0),
            Vec3::new(0.001, 2.0, 100.0),
            SurfaceKind::Hard,
        );

        let mut controller = TraversalController::with_default_config();
        let mut pos = Vec3::new(0.0, 1.0, 0.0);
        for _ in 0..10 {
            tick(&mut controller, &world, &mut pos);
        }
        // Probe hits the top face of the sliver or nothing; either way a
        // vertical-normal requirement keeps a wall side from grounding.
        // Landing is permitted only on top faces (normal.y >= 0.7).
        if controller.is_grounded() {
            // If it grounded, it must have been on the sliver's top face.
            assert!(pos.y >= -0.01);
        }
    }

    // ========================================================================
    // Jumping and Coyote Time
    // ========================================================================

    #[test]
    fn test_jump_from_ground() {
        let world = flat_world();
        let (mut controller, mut pos) = grounded_controller(&world);
        let events = event_log(&mut controller);

        assert!(controller.can_jump());
        assert!(controller.request_jump());
        assert_eq!(controller.mode(), TraversalMode::Jumping);
        assert!(controller.state().velocity_y > 0.0);
        assert!(events
            .borrow()
            .iter()
            .any(|e| matches!(e, TraversalEvent::Jumped)));

        // Rises on the next frame
        let y0 = pos.y;
        tick(&mut controller, &world, &mut pos);
        assert!(pos.y > y0);
    }

    #[test]
    fn test_jump_rearms_after_landing() {
        let world = flat_world();
        let (mut controller, mut pos) = grounded_controller(&world);

        assert!(controller.request_jump());
        assert!(!controller.request_jump(), "coyote consumed by the jump");

        // Ride the arc back down
        for _ in 0..400 {
            tick(&mut controller, &world, &mut pos);
            if controller.is_grounded() {
                break;
            }
        }
        assert!(controller.is_grounded());
        assert!(controller.request_jump());
    }

    #[test]
    fn test_coyote_window_allows_late_jump() {
        let world = empty_world();
        let mut controller = TraversalController::with_default_config();
        let mut pos = Vec3::new(0.0, 10.0, 0.0);

        // Walk off: first airborne frame starts the window.
        tick(&mut controller, &world, &mut pos);
        assert_eq!(controller.mode(), TraversalMode::Falling);
        assert!(controller.state().coyote_time_remaining > 0.0);
        assert!(controller.can_jump());
        assert!(controller.request_jump());
    }

    #[test]
    fn test_coyote_window_expires() {
        let world = empty_world();
        let mut controller = TraversalController::with_default_config();
        let mut pos = Vec3::new(0.0, 100.0, 0.0);

        let window = controller.config().coyote_time;
        let frames = (window / FRAME).ceil() as usize + 2;
        for _ in 0..frames {
            tick(&mut controller, &world, &mut pos);
        }

        assert_eq!(controller.state().coyote_time_remaining, 0.0);
        assert!(!controller.can_jump());
        assert!(!controller.request_jump());
    }

    #[test]
    fn test_no_jump_while_mantling() {
        let world = mantle_world();
        let mut controller = TraversalController::with_default_config();
        let mut pos = Vec3::new(1.0, 3.0, 0.0);

        // Fall, then grab the ledge.
        for _ in 0..60 {
            tick(&mut controller, &world, &mut pos);
            if controller.try_mantle(pos, Vec3::X, &world) {
                break;
            }
        }
        assert_eq!(controller.mode(), TraversalMode::Mantling);
        assert!(!controller.can_jump());
        assert!(!controller.request_jump());
        assert_eq!(controller.mode(), TraversalMode::Mantling);
    }

    // ========================================================================
    // Jetpack Arbitration
    // ========================================================================

    #[test]
    fn test_jetpack_lifts_player() {
        let world = flat_world();
        let (mut controller, mut pos) = grounded_controller(&world);

        assert!(controller.try_jetpack());
        assert_eq!(controller.mode(), TraversalMode::Jetpacking);

        let y0 = pos.y;
        for _ in 0..10 {
            tick(&mut controller, &world, &mut pos);
        }
        assert!(pos.y > y0, "boost should lift the player");
        assert!(controller.fuel() < 1.0, "boost should drain fuel");
    }

    #[test]
    fn test_jetpack_expiry_returns_to_falling_then_ground() {
        let world = flat_world();
        let (mut controller, mut pos) = grounded_controller(&world);

        controller.try_jetpack();
        // Run well past the boost duration cap and back down.
        for _ in 0..2000 {
            tick(&mut controller, &world, &mut pos);
            if controller.is_grounded() && !controller.jetpack().is_boosting() {
                break;
            }
        }

        assert!(controller.is_grounded());
        assert_ne!(controller.jetpack().phase(), JetpackPhase::Boosting);
    }

    #[test]
    fn test_directional_boost_exposes_horizontal_push() {
        let world = flat_world();
        let (mut controller, mut pos) = grounded_controller(&world);

        controller.set_move_input(Vec3::new(0.0, 0.0, 1.0));
        controller.try_jetpack();
        tick(&mut controller, &world, &mut pos);

        let push = controller.horizontal_boost();
        assert!(push.z > 0.0);
        assert_eq!(push.y, 0.0);
    }

    #[test]
    fn test_boost_release_falls_naturally() {
        let world = flat_world();
        let (mut controller, mut pos) = grounded_controller(&world);

        controller.try_jetpack();
        for _ in 0..10 {
            tick(&mut controller, &world, &mut pos);
        }
        let fuel_at_release = controller.fuel();

        controller.stop_jetpack();
        assert_eq!(controller.mode(), TraversalMode::Falling);
        assert!(!controller.jetpack().is_boosting());

        tick(&mut controller, &world, &mut pos);
        assert_eq!(controller.horizontal_boost(), Vec3::ZERO);
        assert!(controller.fuel() >= fuel_at_release, "no drain after release");
    }

    #[test]
    fn test_mantle_blocked_during_jetpack() {
        let world = mantle_world();
        let mut controller = TraversalController::with_default_config();
        let mut pos = Vec3::new(1.0, 3.0, 0.0);
        tick(&mut controller, &world, &mut pos);

        assert!(controller.try_jetpack());
        let phase_before = controller.mantle().phase();

        assert!(!controller.try_mantle(pos, Vec3::X, &world));
        assert_eq!(controller.mantle().phase(), phase_before);
        assert_eq!(controller.mode(), TraversalMode::Jetpacking);
    }

    #[test]
    fn test_jetpack_blocked_during_mantle() {
        let world = mantle_world();
        let mut controller = TraversalController::with_default_config();
        let mut pos = Vec3::new(1.0, 3.0, 0.0);

        for _ in 0..60 {
            tick(&mut controller, &world, &mut pos);
            if controller.try_mantle(pos, Vec3::X, &world) {
                break;
            }
        }
        assert_eq!(controller.mode(), TraversalMode::Mantling);

        assert!(!controller.try_jetpack());
        assert_eq!(controller.mode(), TraversalMode::Mantling);
        assert_ne!(controller.jetpack().phase(), JetpackPhase::Boosting);
    }

    #[test]
    fn test_exclusion_flags_never_both_set() {
        let world = mantle_world();
        let mut controller = TraversalController::with_default_config();
        let mut pos = Vec3::new(1.0, 3.0, 0.0);

        for i in 0..400 {
            if i % 7 == 0 {
                controller.try_jetpack();
            }
            if i % 11 == 0 {
                controller.try_mantle(pos, Vec3::X, &world);
            }
            tick(&mut controller, &world, &mut pos);

            let state = controller.state();
            assert!(
                !(state.is_mantling && state.is_jetpacking),
                "frame {}: both sub-modes active",
                i
            );
        }
    }

    // ========================================================================
    // Mantle Integration
    // ========================================================================

    /// Floor at y=0 plus a 1.2m ledge with its face at x=1.5.
    fn mantle_world() -> ProbeWorld {
        let mut world = flat_world();
        world.add_box(
            Vec3::new(2.0, 0.6, 0.0),
            Vec3::new(0.5, 0.6, 2.0),
            SurfaceKind::Hard,
        );
        world
    }

    #[test]
    fn test_mantle_not_honored_while_grounded() {
        let world = mantle_world();
        let mut controller = TraversalController::with_default_config();
        let mut pos = Vec3::new(1.0, 0.0, 0.0);
        tick(&mut controller, &world, &mut pos);
        assert!(controller.is_grounded());

        assert!(!controller.try_mantle(pos, Vec3::X, &world));
    }

    #[test]
    fn test_mantle_carries_player_to_ledge_top() {
        let world = mantle_world();
        let mut controller = TraversalController::with_default_config();
        // Jump in front of the ledge, then grab it on the way down.
        let mut pos = Vec3::new(1.0, 0.0, 0.0);
        tick(&mut controller, &world, &mut pos);
        assert!(controller.request_jump());

        let mut mantled = false;
        for _ in 0..600 {
            tick(&mut controller, &world, &mut pos);
            if !mantled && controller.try_mantle(pos, Vec3::X, &world) {
                mantled = true;
            }
            if mantled && controller.mantle().phase() == MantlePhase::Idle {
                break;
            }
        }
        assert!(mantled, "should have found the ledge");

        // The climb displaced the player up to (roughly) the ledge top.
        assert!(
            pos.y > 1.0,
            "expected the player near the 1.2m ledge top, got y={}",
            pos.y
        );
    }

    #[test]
    fn test_gravity_suspended_while_mantling() {
        let world = mantle_world();
        let mut controller = TraversalController::with_default_config();
        let mut pos = Vec3::new(1.0, 3.0, 0.0);

        for _ in 0..60 {
            tick(&mut controller, &world, &mut pos);
            if controller.try_mantle(pos, Vec3::X, &world) {
                break;
            }
        }
        assert_eq!(controller.mode(), TraversalMode::Mantling);

        // Every frame of the mantle moves the player up or not at all.
        while controller.mode() == TraversalMode::Mantling {
            let dy = controller.update(FRAME, pos, Vec3::X, &world);
            assert!(dy >= 0.0, "mantle must never apply gravity");
            pos.y += dy;
        }
    }

    // ========================================================================
    // Cancel / Force-ground / Reset
    // ========================================================================

    #[test]
    fn test_cancel_clears_all_sub_modes_same_tick() {
        let world = flat_world();
        let (mut controller, _) = grounded_controller(&world);

        assert!(controller.try_jetpack());
        controller.cancel_movement();

        let state = controller.state();
        assert!(!controller.jetpack().is_boosting());
        assert!(!controller.mantle().is_mantling());
        assert!(!state.is_jetpacking);
        assert!(!state.is_mantling);
    }

    #[test]
    fn test_cancel_mid_mantle_never_resumes() {
        let world = mantle_world();
        let mut controller = TraversalController::with_default_config();
        let mut pos = Vec3::new(1.0, 3.0, 0.0);

        for _ in 0..60 {
            tick(&mut controller, &world, &mut pos);
            if controller.try_mantle(pos, Vec3::X, &world) {
                break;
            }
        }
        assert_eq!(controller.mode(), TraversalMode::Mantling);

        controller.cancel_movement();
        assert_eq!(controller.mode(), TraversalMode::Falling);
        assert_eq!(controller.mantle().phase(), MantlePhase::Idle);
        assert!(controller.mantle().ledge().is_none());

        // Subsequent frames fall normally; the climb never continues.
        let y0 = pos.y;
        for _ in 0..10 {
            tick(&mut controller, &world, &mut pos);
        }
        assert!(pos.y < y0);
    }

    #[test]
    fn test_force_ground_is_an_escape_hatch() {
        let world = empty_world();
        let mut controller = TraversalController::with_default_config();
        let mut pos = Vec3::new(0.0, 50.0, 0.0);

        for _ in 0..30 {
            tick(&mut controller, &world, &mut pos);
        }
        controller.try_jetpack();

        controller.force_ground();
        assert!(controller.is_grounded());
        assert_eq!(controller.state().velocity_y, 0.0);
        assert!(!controller.jetpack().is_boosting());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let world = flat_world();
        let (mut controller, mut pos) = grounded_controller(&world);

        controller.try_jetpack();
        for _ in 0..20 {
            tick(&mut controller, &world, &mut pos);
        }

        controller.reset();
        let first = controller.state();

        controller.reset();
        controller.reset();
        let third = controller.state();

        assert_eq!(first.is_grounded, third.is_grounded);
        assert_eq!(first.velocity_y, third.velocity_y);
        assert_eq!(first.jetpack_fuel, third.jetpack_fuel);
        assert_eq!(first.coyote_time_remaining, third.coyote_time_remaining);
        assert!(first.is_grounded);
        assert_eq!(first.jetpack_fuel, 1.0);
    }

    // ========================================================================
    // Camera and Air Control
    // ========================================================================

    #[test]
    fn test_air_control_multiplier() {
        let world = flat_world();
        let (mut controller, _) = grounded_controller(&world);
        assert_eq!(controller.air_control_multiplier(), 1.0);

        controller.request_jump();
        let airborne = controller.air_control_multiplier();
        assert!(airborne < 1.0);
        assert_eq!(airborne, controller.config().air_control);
    }

    #[test]
    fn test_camera_animation_unions_sources() {
        let world = flat_world();
        let (mut controller, mut pos) = grounded_controller(&world);

        // Nothing active: identity.
        assert!(controller.camera_animation().is_identity());

        // Jetpack shake while boosting.
        controller.try_jetpack();
        tick(&mut controller, &world, &mut pos);
        assert!(controller.camera_animation().shake_amplitude > 0.0);
    }

    #[test]
    fn test_camera_includes_landing_dip() {
        let world = flat_world();
        let mut controller = TraversalController::with_default_config();
        let mut pos = Vec3::new(0.0, 8.0, 0.0);

        for _ in 0..400 {
            tick(&mut controller, &world, &mut pos);
            if controller.is_grounded() {
                break;
            }
        }

        let anim = controller.camera_animation();
        assert!(
            anim.pitch_offset < 0.0,
            "landing dip should pitch the camera down"
        );
    }
}
