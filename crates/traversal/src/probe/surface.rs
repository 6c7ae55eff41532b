//! Surface classification for probe hits.
//!
//! The traversal core never plays audio or spawns decals itself; it only
//! reports what kind of surface was contacted so the host can pick the
//! right external cue.

use serde::{Deserialize, Serialize};

/// What kind of surface a probe ray contacted.
///
/// Used purely to select landing sounds, footstep cues and impact decals
/// by the host. Has no effect on physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SurfaceKind {
    /// Concrete, rock, generic level geometry.
    #[default]
    Hard,

    /// Dirt, grass, sand - muffled landing cues.
    Soft,

    /// Gratings, hull plating - metallic clang cues.
    Metal,
}

impl SurfaceKind {
    /// Whether a hard landing on this surface should produce an impact decal.
    pub fn leaves_decal(self) -> bool {
        !matches!(self, SurfaceKind::Soft)
    }
}
