use crate::math::{Point3, Ray, Vec3};
use std::sync::Arc;

use crate::nodes::Material;

/// A sphere in object-local space — always centered at the origin, per
/// spec §3 ("`center_object_space=0`"). World placement comes entirely
/// from the owning instance's composite transform.
pub struct Sphere {
    pub radius: f64,
    pub material: Arc<Material>,
    /// Numerically derived epsilon, computed once at scene-build time from
    /// the world-space bbox diagonal, used to push ray origins off the
    /// surface before re-intersecting (avoids self-shadowing acne).
    pub ray_offset: f64,
}

pub struct SphereHit {
    pub t: f64,
    pub normal: Vec3,
}

impl Sphere {
    pub fn new(radius: f64, material: Arc<Material>) -> Self {
        Self {
            radius,
            material,
            ray_offset: 0.0,
        }
    }

    /// Analytic ray/sphere intersection against a sphere centered at the
    /// origin. Returns the nearest root within `[t_min, t_max]`.
    pub fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<SphereHit> {
        let oc = ray.origin - Point3::zero();
        let a = ray.direction.length_squared();
        let half_b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        let mut root = (-half_b - sqrtd) / a;
        if root < t_min || root > t_max {
            root = (-half_b + sqrtd) / a;
            if root < t_min || root > t_max {
                return None;
            }
        }

        let point = ray.at(root);
        let normal = (point - Point3::zero()) / self.radius;
        Some(SphereHit { t: root, normal })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Arena, BsdfNode, HashConsTable};

    fn test_material() -> Arc<Material> {
        let mut arena = Arena::new();
        let mut table = HashConsTable::new();
        let bsdf = BsdfNode::Diffuse {
            color: crate::nodes::ColorNodeId::NONE,
        }
        .intern(&mut arena, &mut table);
        Arc::new(Material { bsdf, emission: None })
    }

    #[test]
    fn ray_through_center_hits_both_sides() {
        let sphere = Sphere::new(1.0, test_material());
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::unit_z());
        let hit = sphere.intersect(&ray, 0.001, f64::INFINITY).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-9);
    }

    #[test]
    fn ray_missing_sphere_reports_none() {
        let sphere = Sphere::new(1.0, test_material());
        let ray = Ray::new(Point3::new(5.0, 5.0, -5.0), Vec3::unit_z());
        assert!(sphere.intersect(&ray, 0.001, f64::INFINITY).is_none());
    }
}
