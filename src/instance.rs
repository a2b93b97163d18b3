use std::f64::consts::PI;
use std::sync::Arc;

use crate::geometry::{Aabb, Point3, Primitive, Sphere};
use crate::hit::HitRecord;
use crate::math::{Coord, Matrix4, Ray, Sampler, Vec3};
use crate::mesh::Mesh;
use crate::nodes::Material;

/// Which object-kind and solid/volume behavior an instance wraps,
/// dispatched via `match` rather than a vtable (spec §9's explicit
/// redesign away from the original's function-pointer-per-variant
/// scheme in `datatypes/instance.c`).
pub enum InstanceKind {
    SphereSolid(Arc<Sphere>),
    SphereVolume(Arc<Sphere>, f64),
    MeshSolid(Arc<Mesh>),
    MeshVolume(Arc<Mesh>, f64),
}

/// A placed, transformed object. The object itself lives in canonical
/// local space (sphere at the origin, radius 1; mesh in its authored
/// coordinates) — `composite_transform` maps it into world space (spec
/// §4.3's "Observable effect of instance transform").
pub struct Instance {
    pub kind: InstanceKind,
    pub composite_transform: Matrix4,
    world_bbox: Aabb,
}

impl Instance {
    pub fn new(kind: InstanceKind, composite_transform: Matrix4) -> Self {
        let local_bbox = match &kind {
            InstanceKind::SphereSolid(s) | InstanceKind::SphereVolume(s, _) => {
                let r = Vec3::splat(s.radius);
                Aabb::new(Point3::zero() - r, Point3::zero() + r)
            }
            InstanceKind::MeshSolid(m) | InstanceKind::MeshVolume(m, _) => m.bbox(),
        };
        let world_bbox = local_bbox.transformed(|p| composite_transform.transform_point(p));
        Self {
            kind,
            composite_transform,
            world_bbox,
        }
    }

    fn ray_offset(&self) -> f64 {
        match &self.kind {
            InstanceKind::SphereSolid(s) | InstanceKind::SphereVolume(s, _) => s.ray_offset,
            InstanceKind::MeshSolid(m) | InstanceKind::MeshVolume(m, _) => m.ray_offset,
        }
    }

    fn intersect_solid(&self, local_ray: &Ray, t_min: f64, t_max: f64) -> Option<(f64, HitRecord)> {
        match &self.kind {
            InstanceKind::SphereSolid(sphere) => {
                let hit = sphere.intersect(local_ray, t_min, t_max)?;
                Some((hit.t, self.build_sphere_hit(local_ray, &hit, Arc::clone(&sphere.material))))
            }
            InstanceKind::MeshSolid(mesh) => {
                let hit = mesh.intersect(local_ray, t_min, t_max)?;
                Some((hit.t, self.build_mesh_hit(local_ray, &hit)))
            }
            _ => None,
        }
    }

    /// Samples the volume as described by spec §4.3: intersect both the
    /// entry and exit of the object, then reject/accept by an
    /// exponential free-flight distance against the segment length.
    fn intersect_volume(
        &self,
        local_ray: &Ray,
        t_min: f64,
        t_max: f64,
        density: f64,
        sampler: &mut Sampler,
    ) -> Option<(f64, HitRecord)> {
        let (entry, material) = match &self.kind {
            InstanceKind::SphereVolume(sphere, _) => {
                let hit = sphere.intersect(local_ray, t_min, t_max)?;
                (hit.t, Arc::clone(&sphere.material))
            }
            InstanceKind::MeshVolume(mesh, _) => {
                let hit = mesh.intersect(local_ray, t_min, t_max)?;
                (hit.t, hit.material)
            }
            _ => return None,
        };

        let past_entry = entry + 1e-6;
        let exit = match &self.kind {
            InstanceKind::SphereVolume(sphere, _) => sphere.intersect(local_ray, past_entry, t_max).map(|h| h.t),
            InstanceKind::MeshVolume(mesh, _) => mesh.intersect(local_ray, past_entry, t_max).map(|h| h.t),
            _ => None,
        }?;

        let distance_inside = exit - entry;
        if distance_inside <= 0.0 {
            return None;
        }
        let xi: f64 = sampler.next_dim().max(1e-12);
        let hit_distance = -(1.0 / density) * xi.ln();
        if hit_distance >= distance_inside {
            return None;
        }

        let t = entry + hit_distance;
        let local_point = local_ray.at(t);
        let world_point = self.composite_transform.transform_point(local_point);
        // Normal is arbitrary for a volume scatter — only the isotropic
        // BSDF is meaningful here, and it ignores it (spec §4.3).
        Some((
            t,
            HitRecord {
                t,
                point: world_point,
                normal: Vec3::unit_y(),
                geometric_normal: Vec3::unit_y(),
                incident: local_ray.direction,
                uv: Coord::zero(),
                front_face: true,
                material,
            },
        ))
    }

    fn build_sphere_hit(
        &self,
        local_ray: &Ray,
        hit: &crate::geometry::SphereHit,
        material: Arc<Material>,
    ) -> HitRecord {
        let local_point = local_ray.at(hit.t);
        let world_point = self.composite_transform.transform_point(local_point);
        let world_normal = self.composite_transform.transform_normal(hit.normal);
        let (shading_normal, front_face) = HitRecord::face_forward(world_normal, local_ray.direction);

        // Spherical UV: u = 1 - (atan2(z,x)+pi)/(2pi), v = (asin(y)+pi/2)/pi (spec §4.3).
        let n = hit.normal;
        let u = 1.0 - (n.z.atan2(n.x) + PI) / (2.0 * PI);
        let v = (n.y.clamp(-1.0, 1.0).asin() + PI / 2.0) / PI;

        HitRecord {
            t: hit.t,
            point: world_point,
            normal: shading_normal,
            geometric_normal: world_normal,
            incident: local_ray.direction,
            uv: Coord::new(u.rem_euclid(1.0), v.rem_euclid(1.0)),
            front_face,
            material,
        }
    }

    fn build_mesh_hit(&self, local_ray: &Ray, hit: &crate::mesh::MeshHit) -> HitRecord {
        let local_point = local_ray.at(hit.t);
        let world_point = self.composite_transform.transform_point(local_point);
        let world_geometric = self.composite_transform.transform_normal(hit.geometric_normal);
        let world_shading = self.composite_transform.transform_normal(hit.shading_normal);
        let (shading_normal, front_face) = HitRecord::face_forward(world_shading, local_ray.direction);

        HitRecord {
            t: hit.t,
            point: world_point,
            normal: shading_normal,
            geometric_normal: world_geometric,
            incident: local_ray.direction,
            uv: hit.uv,
            front_face,
            material: Arc::clone(&hit.material),
        }
    }

    pub fn bbox(&self) -> Aabb {
        self.world_bbox
    }
}

impl Primitive for Instance {
    type Hit = HitRecord;
    type Ctx = Sampler;

    fn bbox(&self) -> Aabb {
        self.world_bbox
    }

    /// Transforms the ray into object space, nudges it by the instance's
    /// `ray_offset`, dispatches by kind, and transforms the hit back to
    /// world space. The top-level BVH threads a `&mut Sampler` through as
    /// `Ctx` so volume variants can draw their free-flight distance.
    fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64, sampler: &mut Sampler) -> Option<(f64, HitRecord)> {
        let local_ray = self
            .composite_transform
            .transform_ray_inv(*ray)
            .nudged(self.ray_offset());
        match &self.kind {
            InstanceKind::SphereSolid(_) | InstanceKind::MeshSolid(_) => {
                self.intersect_solid(&local_ray, t_min, t_max)
            }
            InstanceKind::SphereVolume(_, density) => {
                self.intersect_volume(&local_ray, t_min, t_max, *density, sampler)
            }
            InstanceKind::MeshVolume(_, density) => {
                self.intersect_volume(&local_ray, t_min, t_max, *density, sampler)
            }
        }
    }
}
