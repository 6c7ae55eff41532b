//! Vertical traversal: jumping, mantling, jetpack boosts, and the
//! controller that arbitrates between them.

pub mod config;
pub mod controller;
pub mod events;
pub mod jetpack;
pub mod mantle;
pub mod state;

pub use config::TraversalConfig;
pub use controller::TraversalController;
pub use events::{EventHub, TraversalEvent};
pub use jetpack::{JetpackConfig, JetpackPhase, JetpackSystem};
pub use mantle::{LedgeInfo, MantleConfig, MantlePhase, MantleSystem};
pub use state::{CameraAnimation, GroundInfo, TraversalMode, VerticalState};
