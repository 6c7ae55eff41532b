//! Aetherfall game host layer.
//!
//! A thin, deterministic host around the traversal crate: input-to-intent
//! translation, the player entity, and a fixed-tick local session.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Session                           │
//! │  ┌────────┐   ┌─────────────────────┐   ┌─────────────┐  │
//! │  │ Input  │──►│ TraversalController │──►│ Player      │  │
//! │  │ edges  │   │ (vertical delta)    │   │ (position,  │  │
//! │  └────────┘   └─────────────────────┘   │  health)    │  │
//! │                                         └─────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`input`]: raw input and button-edge tracking
//! - [`player`]: player entity, health, fall-damage wiring
//! - [`session`]: the fixed-tick game loop

pub mod input;
pub mod player;
pub mod session;

pub use input::{ActionInput, InputTracker, MovementInput, PlayerInput, TraversalIntents};
pub use player::{EntityId, Player};
pub use session::{Session, SessionConfig};

// Re-export traversal types for convenience
pub use aetherfall_traversal::{
    GroundProbe, ProbeWorld, SurfaceKind, TraversalConfig, TraversalController, TraversalEvent,
    TraversalMode, VerticalState,
};
