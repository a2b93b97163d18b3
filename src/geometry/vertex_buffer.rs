use crate::math::{Coord, Point3, Vec3};

/// Process-wide-in-spirit, but actually `World`-scoped, parallel arrays of
/// positions, shading normals, and texture coordinates. Meshes store index
/// offsets into these; polygon vertex/normal/uv indices are absolute.
///
/// Replacing the original's global `g_vertices`/`g_normals`/`g_textureCoords`
/// with a buffer owned by `World` (spec §9 design note) means a renderer can
/// build, render, and tear down multiple scenes in the same process without
/// any of them clobbering shared mutable statics.
#[derive(Debug, Default)]
pub struct VertexBuffer {
    positions: Vec<Point3>,
    normals: Vec<Vec3>,
    uvs: Vec<Coord>,
}

impl VertexBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_position(&mut self, p: Point3) -> usize {
        self.positions.push(p);
        self.positions.len() - 1
    }

    pub fn push_normal(&mut self, n: Vec3) -> usize {
        self.normals.push(n);
        self.normals.len() - 1
    }

    pub fn push_uv(&mut self, c: Coord) -> usize {
        self.uvs.push(c);
        self.uvs.len() - 1
    }

    #[inline]
    pub fn position(&self, index: usize) -> Point3 {
        self.positions[index]
    }

    #[inline]
    pub fn normal(&self, index: usize) -> Vec3 {
        self.normals[index]
    }

    #[inline]
    pub fn uv(&self, index: usize) -> Coord {
        self.uvs[index]
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn normal_count(&self) -> usize {
        self.normals.len()
    }

    pub fn uv_count(&self) -> usize {
        self.uvs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_stable_once_pushed() {
        let mut vb = VertexBuffer::new();
        let a = vb.push_position(Point3::new(1.0, 0.0, 0.0));
        let b = vb.push_position(Point3::new(2.0, 0.0, 0.0));
        assert_eq!(vb.position(a), Point3::new(1.0, 0.0, 0.0));
        assert_eq!(vb.position(b), Point3::new(2.0, 0.0, 0.0));
    }
}
