use super::arena::Arena;
use super::bsdf::{BsdfNode, BsdfSample};
use super::color::ColorNode;
use super::consed::HashConsTable;
use super::ids::{BsdfNodeId, ColorNodeId, ValueNodeId, VectorNodeId};
use super::value::ValueNode;
use super::vector::VectorNode;
use crate::hit::HitRecord;
use crate::math::{Color, Coord, Sampler, Vec3};

/// Owns every node arena and hash-cons table for one scene. A `NONE` id
/// resolves to one of the cached defaults below, so callers never need to
/// special-case "no child supplied" themselves (spec §4.4: "Defaults when
/// a child is null: color→black, roughness→0, IOR→1.45").
pub struct NodeGraph {
    pub colors: Arena<ColorNode>,
    pub values: Arena<ValueNode>,
    pub vectors: Arena<VectorNode>,
    pub bsdfs: Arena<BsdfNode>,
    pub(super) color_table: HashConsTable,
    pub(super) value_table: HashConsTable,
    pub(super) vector_table: HashConsTable,
    pub(super) bsdf_table: HashConsTable,
    pub default_black: ColorNodeId,
    pub default_white: ColorNodeId,
    pub default_ior: f64,
}

impl NodeGraph {
    pub fn new() -> Self {
        let mut colors = Arena::new();
        let mut color_table = HashConsTable::new();
        let default_black = ColorNodeId(color_table.intern(&mut colors, ColorNode::Constant(Color::zero())));
        let default_white = ColorNodeId(color_table.intern(&mut colors, ColorNode::Constant(Color::ones())));
        Self {
            colors,
            values: Arena::new(),
            vectors: Arena::new(),
            bsdfs: Arena::new(),
            color_table,
            value_table: HashConsTable::new(),
            vector_table: HashConsTable::new(),
            bsdf_table: HashConsTable::new(),
            default_black,
            default_white,
            default_ior: 1.45,
        }
    }

    /// Resolves `id` to `default_black` when it's `NONE`, matching the
    /// construction-time fallback spec §4.4 describes.
    pub fn eval_color(&self, id: ColorNodeId, hit: &HitRecord) -> Color {
        let id = if id.is_none() { self.default_black } else { id };
        self.colors.get(id.0).eval(self, hit)
    }

    pub fn eval_value(&self, id: ValueNodeId, hit: &HitRecord) -> f64 {
        if id.is_none() {
            return 0.0;
        }
        self.values.get(id.0).eval(self, hit)
    }

    pub fn eval_vector(&self, id: VectorNodeId, hit: &HitRecord) -> (Vec3, Coord) {
        if id.is_none() {
            return (Vec3::zero(), hit.uv);
        }
        self.vectors.get(id.0).eval(self, hit)
    }

    pub fn sample_bsdf(&self, id: BsdfNodeId, sampler: &mut Sampler, hit: &HitRecord) -> BsdfSample {
        self.bsdfs.get(id.0).sample(self, sampler, hit)
    }

    pub fn intern_color(&mut self, node: ColorNode) -> ColorNodeId {
        node.intern(&mut self.colors, &mut self.color_table)
    }

    pub fn intern_value(&mut self, node: ValueNode) -> ValueNodeId {
        node.intern(&mut self.values, &mut self.value_table)
    }

    pub fn intern_vector(&mut self, node: VectorNode) -> VectorNodeId {
        node.intern(&mut self.vectors, &mut self.vector_table)
    }

    pub fn intern_bsdf(&mut self, node: BsdfNode) -> BsdfNodeId {
        node.intern(&mut self.bsdfs, &mut self.bsdf_table)
    }
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_black_and_white_are_distinct() {
        let graph = NodeGraph::new();
        assert_ne!(graph.default_black, graph.default_white);
    }
}
