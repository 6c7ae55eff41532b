//! Player input handling.
//!
//! This module converts raw input (keyboard, mouse, gamepad) into
//! traversal intents for the movement controller. Jump and mantle fire
//! on the press edge; the jetpack boosts for as long as its button is
//! held.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Raw player input for a single frame.
///
/// This is the input format received from the client input system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement keys pressed.
    pub movement: MovementInput,

    /// Mouse delta this frame (pixels).
    pub mouse_delta: (f32, f32),

    /// Action buttons pressed.
    pub actions: ActionInput,

    /// Frame number this input was generated.
    pub frame: u32,
}

/// Movement key states.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Action button states.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActionInput {
    pub jump: bool,
    pub jetpack: bool,
}

/// Per-frame traversal requests derived from button edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalIntents {
    /// Jump was pressed this frame.
    pub jump: bool,

    /// Boost button went down this frame.
    pub start_boost: bool,

    /// Boost button came up this frame.
    pub stop_boost: bool,
}

impl PlayerInput {
    /// World-space movement wish direction for the given facing yaw
    /// (radians, 0 = +X). Diagonals are normalized so they are not
    /// faster than cardinal movement.
    pub fn wish_direction(&self, yaw: f32) -> Vec3 {
        let mut forward_move = 0.0f32;
        let mut right_move = 0.0f32;

        if self.movement.forward {
            forward_move += 1.0;
        }
        if self.movement.backward {
            forward_move -= 1.0;
        }
        if self.movement.right {
            right_move += 1.0;
        }
        if self.movement.left {
            right_move -= 1.0;
        }

        let magnitude = (forward_move.powi(2) + right_move.powi(2)).sqrt();
        if magnitude > 1.0 {
            forward_move /= magnitude;
            right_move /= magnitude;
        }

        let forward = Vec3::new(yaw.cos(), 0.0, yaw.sin());
        let right = Vec3::new(-yaw.sin(), 0.0, yaw.cos());
        forward * forward_move + right * right_move
    }

    /// Check if any movement input is active.
    pub fn has_movement(&self) -> bool {
        self.movement.forward
            || self.movement.backward
            || self.movement.left
            || self.movement.right
    }
}

/// Tracks button states across frames so presses and releases fire
/// exactly once.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputTracker {
    previous: ActionInput,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare this frame's buttons against the last frame's and
    /// advance the tracker.
    pub fn intents(&mut self, input: &PlayerInput) -> TraversalIntents {
        let intents = TraversalIntents {
            jump: input.actions.jump && !self.previous.jump,
            start_boost: input.actions.jetpack && !self.previous.jetpack,
            stop_boost: !input.actions.jetpack && self.previous.jetpack,
        };
        self.previous = input.actions;
        intents
    }
}
