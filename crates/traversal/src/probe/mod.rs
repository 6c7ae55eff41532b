//! World probing for grounding and ledge detection.
//!
//! The controller treats the scene as an opaque collaborator reached
//! through the [`GroundProbe`] trait. [`ProbeWorld`] is the parry3d-backed
//! implementation used by the host and by integration tests.

mod surface;
mod world;

pub use surface::SurfaceKind;
pub use world::{GroundProbe, ProbeHit, ProbeWorld};
