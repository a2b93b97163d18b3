use super::vertex_buffer::VertexBuffer;
use crate::math::{Coord, Ray, Vec3};

/// A triangle. Indices are absolute into the owning `World`'s vertex
/// buffer (spec §3) — `has_normals` distinguishes a polygon authored
/// with per-vertex shading normals from one that should fall back to
/// the flat face normal.
#[derive(Debug, Clone)]
pub struct Polygon {
    pub vertex_index: [u32; 3],
    pub normal_index: [u32; 3],
    pub uv_index: [u32; 3],
    pub material_index: u32,
    pub has_normals: bool,
}

/// Result of a successful ray/triangle intersection, in the *barycentric*
/// uv space (spec §3: "Barycentric uv is stored"). The instance layer is
/// responsible for the second pass that blends vertex UVs into textured
/// UV coordinates.
pub struct PolyHit {
    pub t: f64,
    pub barycentric: Coord,
    pub geometric_normal: Vec3,
    pub shading_normal: Vec3,
}

impl Polygon {
    /// Möller–Trumbore ray/triangle intersection.
    pub fn intersect(&self, vb: &VertexBuffer, ray: &Ray, t_min: f64, t_max: f64) -> Option<PolyHit> {
        let v0 = vb.position(self.vertex_index[0] as usize);
        let v1 = vb.position(self.vertex_index[1] as usize);
        let v2 = vb.position(self.vertex_index[2] as usize);

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < 1e-10 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if t < t_min || t > t_max {
            return None;
        }

        let geometric_normal = edge1.cross(edge2).normalized();
        let shading_normal = if self.has_normals {
            let n0 = vb.normal(self.normal_index[0] as usize);
            let n1 = vb.normal(self.normal_index[1] as usize);
            let n2 = vb.normal(self.normal_index[2] as usize);
            let w = 1.0 - u - v;
            (n0 * w + n1 * u + n2 * v).normalized()
        } else {
            geometric_normal
        };

        Some(PolyHit {
            t,
            barycentric: Coord::new(u, v),
            geometric_normal,
            shading_normal,
        })
    }

    /// Blends the three vertex UVs by this polygon's stored barycentric
    /// hit coordinates, matching `instance.c`'s `getTexMapMesh`: texture
    /// UV = u·v1tex + v·v2tex + w·v3tex where w = 1-u-v.
    pub fn textured_uv(&self, vb: &VertexBuffer, barycentric: Coord) -> Coord {
        if vb.uv_count() == 0 || self.uv_index[0] == u32::MAX {
            return Coord::new(-1.0, -1.0);
        }
        let u = barycentric.u;
        let v = barycentric.v;
        let w = 1.0 - u - v;
        let uv0 = vb.uv(self.uv_index[0] as usize);
        let uv1 = vb.uv(self.uv_index[1] as usize);
        let uv2 = vb.uv(self.uv_index[2] as usize);
        uv1 * u + uv2 * v + uv0 * w
    }

    pub fn vertex_positions<'a>(&self, vb: &'a VertexBuffer) -> [crate::math::Point3; 3] {
        [
            vb.position(self.vertex_index[0] as usize),
            vb.position(self.vertex_index[1] as usize),
            vb.position(self.vertex_index[2] as usize),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point3;

    fn unit_triangle_buffer() -> VertexBuffer {
        let mut vb = VertexBuffer::new();
        vb.push_position(Point3::new(0.0, 0.0, 0.0));
        vb.push_position(Point3::new(1.0, 0.0, 0.0));
        vb.push_position(Point3::new(0.0, 1.0, 0.0));
        vb
    }

    #[test]
    fn ray_through_triangle_center_hits() {
        let vb = unit_triangle_buffer();
        let poly = Polygon {
            vertex_index: [0, 1, 2],
            normal_index: [0, 0, 0],
            uv_index: [u32::MAX, 0, 0],
            material_index: 0,
            has_normals: false,
        };
        let ray = Ray::new(Point3::new(0.2, 0.2, -1.0), Vec3::unit_z());
        let hit = poly.intersect(&vb, &ray, 0.0, f64::INFINITY);
        assert!(hit.is_some());
        assert!((hit.unwrap().t - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ray_outside_triangle_misses() {
        let vb = unit_triangle_buffer();
        let poly = Polygon {
            vertex_index: [0, 1, 2],
            normal_index: [0, 0, 0],
            uv_index: [u32::MAX, 0, 0],
            material_index: 0,
            has_normals: false,
        };
        let ray = Ray::new(Point3::new(5.0, 5.0, -1.0), Vec3::unit_z());
        assert!(poly.intersect(&vb, &ray, 0.0, f64::INFINITY).is_none());
    }
}
