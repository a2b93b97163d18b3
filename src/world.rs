use std::sync::Arc;

use crate::camera::Camera;
use crate::geometry::{Bvh, Primitive};
use crate::hdr::HdrEnvironment;
use crate::hit::HitRecord;
use crate::instance::Instance;
use crate::math::{Color, Ray, Sampler};
use crate::nodes::NodeGraph;

/// Background radiance when a ray escapes the scene: either a sampled HDR
/// equirectangular environment, or the teacher's linear sky gradient
/// evaluated by `0.5·(dir.y+1)` lerp between a horizon and zenith color
/// (spec §4.5).
pub enum Background {
    Gradient { horizon: Color, zenith: Color },
    Hdr(Arc<HdrEnvironment>),
}

impl Background {
    pub fn sample(&self, ray: &Ray) -> Color {
        match self {
            Background::Gradient { horizon, zenith } => {
                let dir = ray.direction.normalized();
                let t = 0.5 * (dir.y + 1.0);
                horizon.lerp(*zenith, t)
            }
            Background::Hdr(env) => env.sample(ray.direction),
        }
    }
}

/// Everything the integrator needs to trace a frame: the top-level BVH over
/// placed instances, the shading node graph every material references into,
/// the camera, and the background model. Owning the vertex buffers/meshes/
/// spheres here (rather than through process-wide globals) is what makes
/// `World` safely shareable read-only across render threads (spec §9).
pub struct World {
    pub camera: Camera,
    pub nodes: NodeGraph,
    pub background: Background,
    top_level: Bvh<Instance>,
}

impl World {
    pub fn new(instances: Vec<Instance>, camera: Camera, nodes: NodeGraph, background: Background) -> Self {
        Self {
            camera,
            nodes,
            background,
            top_level: Bvh::build(instances),
        }
    }

    /// Nearest-hit query against every instance in the scene. `sampler` is
    /// threaded through as the top-level BVH's `Primitive::Ctx` so volume
    /// instances can draw their free-flight sample inline with traversal.
    pub fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64, sampler: &mut Sampler) -> Option<HitRecord> {
        self.top_level
            .intersect(ray, t_min, t_max, sampler)
            .map(|(_, _, hit)| hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;
    use crate::geometry::Sphere;
    use crate::instance::InstanceKind;
    use crate::math::{Matrix4, Point3, Vec3};
    use crate::nodes::{BsdfNode, ColorNodeId, Material};

    fn sphere_world() -> World {
        let mut nodes = NodeGraph::new();
        let bsdf = nodes.intern_bsdf(BsdfNode::Diffuse { color: ColorNodeId::NONE });
        let material = Arc::new(Material { bsdf, emission: None });
        let sphere = Arc::new(Sphere::new(1.0, material));
        let instance = Instance::new(InstanceKind::SphereSolid(sphere), Matrix4::identity());
        let camera = Camera::new(&CameraConfig::default());
        World::new(
            vec![instance],
            camera,
            nodes,
            Background::Gradient {
                horizon: Color::new(1.0, 1.0, 1.0),
                zenith: Color::new(0.5, 0.7, 1.0),
            },
        )
    }

    #[test]
    fn ray_through_sphere_hits() {
        let world = sphere_world();
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::unit_z());
        let mut sampler = Sampler::new(0, 0);
        let hit = world.intersect(&ray, 0.001, f64::INFINITY, &mut sampler);
        assert!(hit.is_some());
    }

    #[test]
    fn missed_ray_falls_back_to_background() {
        let world = sphere_world();
        let ray = Ray::new(Point3::new(50.0, 50.0, -5.0), Vec3::unit_z());
        let mut sampler = Sampler::new(0, 0);
        assert!(world.intersect(&ray, 0.001, f64::INFINITY, &mut sampler).is_none());
        let bg = world.background.sample(&ray);
        assert!(bg.x >= 0.0 && bg.y >= 0.0 && bg.z >= 0.0);
    }
}
