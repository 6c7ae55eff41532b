//! Player entity and state.

use std::cell::RefCell;
use std::rc::Rc;

use aetherfall_traversal::{TraversalConfig, TraversalController, TraversalEvent};
use glam::Vec3;

/// Unique identifier for entities.
pub type EntityId = u32;

/// A player in the game.
///
/// Owns its movement controller; fall damage flows from the
/// controller's event stream into the health pool once per tick.
#[derive(Debug)]
pub struct Player {
    /// Unique player ID.
    pub id: EntityId,

    /// Player name/handle.
    pub name: String,

    /// World position (feet).
    pub position: Vec3,

    /// Facing yaw in radians (0 = +X).
    pub yaw: f32,

    /// Vertical movement controller.
    pub traversal: TraversalController,

    /// Current health (0 = dead).
    pub health: f32,

    /// Maximum health.
    pub max_health: f32,

    /// Deaths this session.
    pub deaths: u32,

    /// Fall damage accumulated by the event subscriber since the last
    /// drain.
    pending_damage: Rc<RefCell<f32>>,
}

impl Player {
    /// Create a new player at the given spawn position.
    pub fn new(id: EntityId, name: String, spawn_position: Vec3, config: TraversalConfig) -> Self {
        let mut traversal = TraversalController::new(config);

        let pending_damage = Rc::new(RefCell::new(0.0f32));
        let sink = Rc::clone(&pending_damage);
        traversal.subscribe(move |event| {
            if let TraversalEvent::FallDamage { amount } = event {
                *sink.borrow_mut() += amount;
            }
        });

        Self {
            id,
            name,
            position: spawn_position,
            yaw: 0.0,
            traversal,
            health: 100.0,
            max_health: 100.0,
            deaths: 0,
            pending_damage,
        }
    }

    /// Get the player's forward direction (horizontal only).
    #[inline]
    pub fn forward_direction(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin())
    }

    /// Check if the player is alive.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Check if the player is on the ground.
    #[inline]
    pub fn on_ground(&self) -> bool {
        self.traversal.is_grounded()
    }

    /// Apply fall damage gathered by the event subscriber this tick.
    ///
    /// Returns the damage applied. A lethal landing stops all active
    /// movement.
    pub fn apply_pending_damage(&mut self) -> f32 {
        let amount = std::mem::take(&mut *self.pending_damage.borrow_mut());
        if amount <= 0.0 || !self.is_alive() {
            return 0.0;
        }

        self.take_damage(amount);
        amount
    }

    /// Apply damage to the player.
    pub fn take_damage(&mut self, amount: f32) {
        if !self.is_alive() {
            return;
        }

        self.health = (self.health - amount).max(0.0);
        if self.health <= 0.0 {
            self.die();
        }
    }

    fn die(&mut self) {
        self.deaths += 1;
        self.traversal.cancel_movement();
        log::debug!("player {} died", self.id);
    }

    /// Respawn the player at a new position with full health and an
    /// idle, grounded controller.
    pub fn respawn(&mut self, position: Vec3) {
        self.health = self.max_health;
        self.position = position;
        self.traversal.reset();
        *self.pending_damage.borrow_mut() = 0.0;
    }
}
