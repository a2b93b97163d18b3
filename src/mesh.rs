use std::sync::Arc;

use crate::geometry::{Aabb, Bvh, Polygon, PolyHit, Primitive, VertexBuffer};
use crate::math::Ray;
use crate::nodes::Material;

/// One triangle plus the shared vertex buffer it indexes into — the unit
/// the bottom-level BVH is built over. Wrapping the buffer reference
/// alongside the polygon lets `Polygon::intersect` (which needs the
/// buffer to resolve its vertex indices) satisfy the context-free
/// `Primitive` trait.
struct MeshTriangle {
    polygon: Polygon,
    vertex_buffer: Arc<VertexBuffer>,
}

impl Primitive for MeshTriangle {
    type Hit = PolyHit;
    type Ctx = ();

    fn bbox(&self) -> Aabb {
        let [a, b, c] = self.polygon.vertex_positions(&self.vertex_buffer);
        let mut bbox = Aabb::empty();
        bbox.grow(a);
        bbox.grow(b);
        bbox.grow(c);
        bbox
    }

    fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64, _ctx: &mut ()) -> Option<(f64, PolyHit)> {
        self.polygon
            .intersect(&self.vertex_buffer, ray, t_min, t_max)
            .map(|hit| (hit.t, hit))
    }
}

/// A triangle mesh: shared vertex data, a per-face material table, and a
/// bottom-level BVH over its own triangles. Meshes own `Arc<Vec<Material>>`
/// instead of patching materials onto shared global arrays the way the
/// original mutates `g_materials` in place (spec §9 design note).
pub struct Mesh {
    pub name: String,
    pub materials: Arc<Vec<Arc<Material>>>,
    pub ray_offset: f64,
    bvh: Bvh<MeshTriangle>,
}

pub struct MeshHit {
    pub t: f64,
    pub geometric_normal: crate::math::Vec3,
    pub shading_normal: crate::math::Vec3,
    pub uv: crate::math::Coord,
    pub material: Arc<Material>,
}

impl Mesh {
    pub fn build(
        name: String,
        polygons: Vec<Polygon>,
        vertex_buffer: Arc<VertexBuffer>,
        materials: Vec<Arc<Material>>,
        ray_offset: f64,
    ) -> Self {
        let triangles: Vec<MeshTriangle> = polygons
            .into_iter()
            .map(|polygon| MeshTriangle {
                polygon,
                vertex_buffer: Arc::clone(&vertex_buffer),
            })
            .collect();
        Self {
            name,
            materials: Arc::new(materials),
            ray_offset,
            bvh: Bvh::build(triangles),
        }
    }

    pub fn bbox(&self) -> Aabb {
        self.bvh.bbox()
    }

    pub fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<MeshHit> {
        let (prim_idx, t, hit) = self.bvh.intersect(ray, t_min, t_max, &mut ())?;
        let material_index = self.triangle_material_index(prim_idx);
        let vb = self.vertex_buffer_of(prim_idx);
        let uv = self.polygon_of(prim_idx).textured_uv(vb, hit.barycentric);
        Some(MeshHit {
            t,
            geometric_normal: hit.geometric_normal,
            shading_normal: hit.shading_normal,
            uv,
            material: Arc::clone(&self.materials[material_index as usize]),
        })
    }

    fn triangle_material_index(&self, prim_idx: u32) -> u32 {
        self.polygon_of(prim_idx).material_index
    }

    fn polygon_of(&self, prim_idx: u32) -> &Polygon {
        &self.bvh_primitive(prim_idx).polygon
    }

    fn vertex_buffer_of(&self, prim_idx: u32) -> &VertexBuffer {
        &self.bvh_primitive(prim_idx).vertex_buffer
    }

    fn bvh_primitive(&self, prim_idx: u32) -> &MeshTriangle {
        self.bvh.primitive(prim_idx)
    }
}
