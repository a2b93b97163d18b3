use crate::math::{Color, Ray, Sampler};
use crate::world::World;

/// Ray-spawn epsilon nudging bounce rays off the surface they originate
/// from, preventing immediate self-intersection (shadow acne).
const RAY_EPSILON: f64 = 1e-4;

/// Bounce depth at which Russian roulette termination kicks in (spec §4.5).
const ROULETTE_START_DEPTH: u32 = 2;

/// Iterative Monte Carlo path tracer. Unlike the teacher's recursive
/// `trace_ray`, this walks the bounce loop with an explicit `throughput`
/// accumulator so depth isn't bounded by native call-stack recursion and
/// Russian roulette can terminate a path without unwinding anything (spec
/// §4.5).
pub struct Integrator<'a> {
    pub world: &'a World,
    pub max_depth: u32,
}

impl<'a> Integrator<'a> {
    pub fn new(world: &'a World, max_depth: u32) -> Self {
        Self { world, max_depth }
    }

    /// Traces one path starting from `ray`, returning the estimated
    /// radiance. NaN/Inf components are clamped to zero before being
    /// folded into the running total (spec §4.5 "no single sample may
    /// poison the frame").
    pub fn trace(&self, primary_ray: Ray, sampler: &mut Sampler) -> Color {
        // `bounces = 0` means no intersection is attempted at all — every
        // ray returns only the background (spec §8 boundary behavior).
        if self.max_depth == 0 {
            return self.world.background.sample(&primary_ray).clamp_finite();
        }

        let mut ray = primary_ray;
        let mut radiance = Color::zero();
        let mut throughput = Color::ones();

        for depth in 0..self.max_depth {
            let hit = match self.world.intersect(&ray, RAY_EPSILON, f64::INFINITY, sampler) {
                Some(hit) => hit,
                None => {
                    radiance += throughput.hadamard(self.world.background.sample(&ray));
                    break;
                }
            };

            if let Some(emission_id) = hit.material.emission {
                let emitted = self.world.nodes.eval_color(emission_id, &hit);
                radiance += throughput.hadamard(emitted);
            }

            let sample = self.world.nodes.sample_bsdf(hit.material.bsdf, sampler, &hit);
            throughput = throughput.hadamard(sample.color);

            if depth >= ROULETTE_START_DEPTH {
                let survive = throughput.max_component().clamp(0.05, 1.0);
                if sampler.next_dim() > survive {
                    break;
                }
                throughput = throughput / survive;
            }

            if throughput.near_zero() {
                break;
            }

            ray = Ray::new(hit.point, sample.out).nudged(RAY_EPSILON);
        }

        radiance.clamp_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Camera, CameraConfig};
    use crate::geometry::Sphere;
    use crate::instance::{Instance, InstanceKind};
    use crate::math::{Matrix4, Point3, Vec3};
    use crate::nodes::{BsdfNode, ColorNode, ColorNodeId, Material, NodeGraph};
    use crate::world::{Background, World};
    use std::sync::Arc;

    fn emissive_sphere_world() -> World {
        let mut nodes = NodeGraph::new();
        let white = nodes.intern_color(ColorNode::Constant(Color::ones()));
        let bsdf = nodes.intern_bsdf(BsdfNode::Diffuse { color: ColorNodeId::NONE });
        let material = Arc::new(Material {
            bsdf,
            emission: Some(white),
        });
        let sphere = Arc::new(Sphere::new(1.0, material));
        let instance = Instance::new(InstanceKind::SphereSolid(sphere), Matrix4::identity());
        let camera = Camera::new(&CameraConfig::default());
        World::new(
            vec![instance],
            camera,
            nodes,
            Background::Gradient {
                horizon: Color::zero(),
                zenith: Color::zero(),
            },
        )
    }

    #[test]
    fn ray_hitting_emissive_sphere_returns_positive_radiance() {
        let world = emissive_sphere_world();
        let integrator = Integrator::new(&world, 8);
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::unit_z());
        let mut sampler = Sampler::new(0, 0);
        let color = integrator.trace(ray, &mut sampler);
        assert!(color.x > 0.0);
    }

    #[test]
    fn ray_missing_everything_returns_background() {
        let world = emissive_sphere_world();
        let integrator = Integrator::new(&world, 8);
        let ray = Ray::new(Point3::new(50.0, 50.0, -5.0), Vec3::unit_z());
        let mut sampler = Sampler::new(0, 0);
        let color = integrator.trace(ray, &mut sampler);
        assert_eq!(color, Color::zero());
    }

    #[test]
    fn zero_bounces_skips_intersection_entirely() {
        let world = emissive_sphere_world();
        let integrator = Integrator::new(&world, 0);
        // Points straight at the emissive sphere, but with zero bounces the
        // hit must never be tested — result is pure background (black here).
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::unit_z());
        let mut sampler = Sampler::new(0, 0);
        assert_eq!(integrator.trace(ray, &mut sampler), Color::zero());
    }

    #[test]
    fn result_is_always_finite() {
        let world = emissive_sphere_world();
        let integrator = Integrator::new(&world, 32);
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::unit_z());
        let mut sampler = Sampler::new(1, 7);
        let color = integrator.trace(ray, &mut sampler);
        assert!(color.x.is_finite() && color.y.is_finite() && color.z.is_finite());
    }
}
