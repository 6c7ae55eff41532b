//! Local play session - the fixed-tick game loop.
//!
//! Drives one player's traversal controller against a static probe
//! world. The loop is deterministic: the same input sequence always
//! produces the same trajectory, so it can be replayed or run headless
//! in tests.

use aetherfall_traversal::{ProbeWorld, SurfaceKind, TraversalConfig};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::input::{InputTracker, PlayerInput};
use crate::player::Player;

/// Session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Simulation tick rate (ticks per second).
    pub tick_rate: u32,

    /// Ground movement speed (m/s).
    pub move_speed: f32,

    /// Vertical traversal tuning.
    pub traversal: TraversalConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            move_speed: 5.0,
            traversal: TraversalConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Get the time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}

/// A running play session.
#[derive(Debug)]
pub struct Session {
    /// Current frame/tick number.
    pub frame: u64,

    /// Session configuration.
    pub config: SessionConfig,

    /// Static level geometry for traversal queries.
    pub world: ProbeWorld,

    /// The local player.
    pub player: Player,

    spawn_position: Vec3,
    tracker: InputTracker,
}

impl Session {
    /// Create a session with the given config, level and spawn point.
    pub fn new(config: SessionConfig, world: ProbeWorld, spawn: Vec3) -> Self {
        let player = Player::new(1, "Player".to_string(), spawn, config.traversal.clone());

        Self {
            frame: 0,
            config,
            world,
            player,
            spawn_position: spawn,
            tracker: InputTracker::new(),
        }
    }

    /// Create a session with default configuration and the test arena.
    pub fn test() -> Self {
        Self::new(
            SessionConfig::default(),
            Self::test_arena(),
            Vec3::new(0.0, 0.0, 0.0),
        )
    }

    /// Flat floor, a mantleable 1.2m platform with its face at x=4,
    /// and a metal landing pad.
    fn test_arena() -> ProbeWorld {
        let mut world = ProbeWorld::new();
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            SurfaceKind::Hard,
        );
        world.add_box(
            Vec3::new(5.0, 0.6, 0.0),
            Vec3::new(1.0, 0.6, 3.0),
            SurfaceKind::Hard,
        );
        world.add_box(
            Vec3::new(-6.0, 0.05, 0.0),
            Vec3::new(2.0, 0.05, 2.0),
            SurfaceKind::Metal,
        );
        world
    }

    /// Advance the session by one tick.
    pub fn tick(&mut self, input: &PlayerInput) {
        let dt = self.config.delta_time();
        let intents = self.tracker.intents(input);

        let wish = input.wish_direction(self.player.yaw);
        let forward = self.player.forward_direction();
        self.player.traversal.set_move_input(wish);

        // Button-driven requests, then auto-mantle: falling into a
        // ledge with forward held grabs it without a dedicated button.
        if intents.jump {
            self.player.traversal.request_jump();
        }
        if intents.start_boost {
            self.player.traversal.try_jetpack();
        }
        if intents.stop_boost {
            self.player.traversal.stop_jetpack();
        }
        if input.movement.forward {
            self.player
                .traversal
                .try_mantle(self.player.position, forward, &self.world);
        }

        // Vertical authority belongs to the controller; the session only
        // applies the delta it returns.
        let dy = self
            .player
            .traversal
            .update(dt, self.player.position, forward, &self.world);

        let lateral = wish * self.config.move_speed * self.player.traversal.air_control_multiplier()
            + self.player.traversal.horizontal_boost();

        self.player.position += lateral * dt;
        self.player.position.y += dy;

        if self.player.apply_pending_damage() > 0.0 && !self.player.is_alive() {
            log::debug!("lethal landing on frame {}", self.frame);
            self.player.respawn(self.spawn_position);
        }

        self.frame += 1;
    }
}

// ============================================================================
// Tests
// ============================================================================
