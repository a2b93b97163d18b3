use std::sync::Arc;

use crate::math::{Coord, Point3, Vec3};
use crate::nodes::Material;

/// Everything a shading node or the integrator needs about a surface
/// intersection. Built by the instance layer, which is responsible for
/// transforming local-space polygon/sphere hits into world space and
/// resolving the textured uv (spec §3/§4.3).
pub struct HitRecord {
    pub t: f64,
    pub point: Point3,
    /// Shading normal, oriented to face the incoming ray.
    pub normal: Vec3,
    pub geometric_normal: Vec3,
    /// Incoming ray direction, not reversed — matches `incident.direction`
    /// in the shaders this is ported from.
    pub incident: Vec3,
    pub uv: Coord,
    pub front_face: bool,
    pub material: Arc<Material>,
}

impl HitRecord {
    /// Flips `normal` to oppose `incident` and records which side was hit,
    /// following the textbook "always shade from the outside" convention.
    pub fn face_forward(geometric_normal: Vec3, incident: Vec3) -> (Vec3, bool) {
        let front_face = incident.dot(geometric_normal) < 0.0;
        let normal = if front_face {
            geometric_normal
        } else {
            -geometric_normal
        };
        (normal, front_face)
    }
}
