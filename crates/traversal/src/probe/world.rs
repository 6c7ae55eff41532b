//! Probe world containing static level geometry.
//!
//! The traversal controller never talks to the renderer's scene graph
//! directly; it sees the world only through the [`GroundProbe`] trait, a
//! pure synchronous ray query. [`ProbeWorld`] is the standard
//! implementation backed by parry3d shapes.

use glam::Vec3;
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::query::Ray;
use parry3d::shape::SharedShape;

use super::surface::SurfaceKind;

/// Result of a probe ray query.
#[derive(Debug, Clone, Copy)]
pub struct ProbeHit {
    /// Distance from the ray origin to the impact point.
    pub distance: f32,

    /// Impact point in world space.
    pub point: Vec3,

    /// Surface normal at the impact point, pointing away from the surface.
    pub normal: Vec3,

    /// Surface classification of what was hit.
    pub surface: SurfaceKind,
}

/// A pure ray query against walkable level geometry.
///
/// The trait is the seam between the traversal core and the rendering
/// engine: production code implements it against the real scene, tests
/// implement it with synthetic geometry. Implementations must be
/// side-effect free; the controller may probe several times per frame.
pub trait GroundProbe {
    /// Cast a ray and return the nearest hit within `max_distance`.
    ///
    /// `direction` must be normalized. Returns `None` if nothing was hit.
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<ProbeHit>;
}

/// A piece of probe geometry in the world.
#[derive(Clone)]
struct ProbeBrush {
    /// The collision shape.
    shape: SharedShape,
    /// Position and orientation in world space.
    transform: Isometry<Real>,
    /// Surface classification for audio/decal cues.
    surface: SurfaceKind,
}

/// Static probe geometry, queried by ray casts.
///
/// Immutable after construction. Levels register their walkable geometry
/// here once at load time; the traversal controller then probes it every
/// frame for grounding and ledge detection.
#[derive(Default)]
pub struct ProbeWorld {
    brushes: Vec<ProbeBrush>,
}

impl ProbeWorld {
    /// Create an empty probe world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an axis-aligned box to the world.
    ///
    /// # Arguments
    ///
    /// * `center` - Center position of the box in world space
    /// * `half_extents` - Half-size in each axis (x, y, z)
    /// * `surface` - Surface classification for landing cues
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, surface: SurfaceKind) {
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        let transform = Isometry::translation(center.x, center.y, center.z);

        self.brushes.push(ProbeBrush {
            shape,
            transform,
            surface,
        });
    }

    /// Number of brushes registered.
    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }
}

impl std::fmt::Debug for ProbeWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeWorld")
            .field("brushes", &self.brushes.len())
            .finish()
    }
}

impl GroundProbe for ProbeWorld {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<ProbeHit> {
        let ray = Ray::new(
            Point::new(origin.x, origin.y, origin.z),
            Vector::new(direction.x, direction.y, direction.z),
        );

        let mut best: Option<ProbeHit> = None;

        for brush in &self.brushes {
            let Some(hit) =
                brush
                    .shape
                    .cast_ray_and_get_normal(&brush.transform, &ray, max_distance, true)
            else {
                continue;
            };

            if best.as_ref().map_or(true, |b| hit.time_of_impact < b.distance) {
                let point = origin + direction * hit.time_of_impact;
                best = Some(ProbeHit {
                    distance: hit.time_of_impact,
                    point,
                    normal: Vec3::new(hit.normal.x, hit.normal.y, hit.normal.z),
                    surface: brush.surface,
                });
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_floor() -> ProbeWorld {
        let mut world = ProbeWorld::new();
        // Floor top surface at y=0
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            SurfaceKind::Hard,
        );
        world
    }

    #[test]
    fn test_downward_ray_hits_floor() {
        let world = flat_floor();

        let hit = world
            .cast_ray(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 10.0)
            .expect("should hit floor");

        assert!((hit.distance - 2.0).abs() < 1e-4);
        assert!(hit.normal.y > 0.99, "floor normal should point up");
        assert_eq!(hit.surface, SurfaceKind::Hard);
    }

    #[test]
    fn test_ray_misses_beyond_max_distance() {
        let world = flat_floor();

        let hit = world.cast_ray(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 1.0);
        assert!(hit.is_none());
    }

    #[test]
    fn test_nearest_brush_wins() {
        let mut world = flat_floor();
        // Metal platform above the floor
        world.add_box(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(2.0, 0.25, 2.0),
            SurfaceKind::Metal,
        );

        let hit = world
            .cast_ray(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, 20.0)
            .expect("should hit platform");

        assert_eq!(hit.surface, SurfaceKind::Metal);
        assert!((hit.point.y - 1.25).abs() < 1e-3);
    }

    #[test]
    fn test_horizontal_ray_hits_wall() {
        let mut world = ProbeWorld::new();
        world.add_box(
            Vec3::new(3.0, 1.0, 0.0),
            Vec3::new(0.5, 1.0, 2.0),
            SurfaceKind::Hard,
        );

        let hit = world
            .cast_ray(Vec3::new(0.0, 1.0, 0.0), Vec3::X, 10.0)
            .expect("should hit wall");

        assert!((hit.distance - 2.5).abs() < 1e-3);
        assert!(hit.normal.x < -0.99, "wall normal faces the ray origin");
    }

    #[test]
    fn test_empty_world_never_hits() {
        let world = ProbeWorld::new();
        assert!(world.cast_ray(Vec3::ZERO, Vec3::NEG_Y, 100.0).is_none());
    }
}
