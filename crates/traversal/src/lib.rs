//! First-person vertical traversal for Aetherfall.
//!
//! Everything that decides how the player moves along the vertical axis
//! lives here: gravity and landing, jump arbitration with coyote time,
//! ledge mantling, and jetpack boosts. The crate is deterministic and
//! headless; the world is reached through the [`probe::GroundProbe`]
//! trait, so it runs identically in the client, the server simulation
//! and tests.
//!
//! - [`probe`]: ray queries against static level geometry
//! - [`traversal`]: the sub-mode state machines and their controller
//!
//! The entry point is [`TraversalController`]: feed it a tick, a
//! position and a probe, apply the vertical delta it returns.

pub mod probe;
pub mod traversal;

pub use probe::{GroundProbe, ProbeHit, ProbeWorld, SurfaceKind};
pub use traversal::{
    CameraAnimation, EventHub, JetpackConfig, JetpackPhase, JetpackSystem, LedgeInfo,
    MantleConfig, MantlePhase, MantleSystem, TraversalConfig, TraversalController,
    TraversalEvent, TraversalMode, VerticalState,
};
