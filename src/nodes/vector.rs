use super::arena::Arena;
use super::consed::{fnv_f64, fnv_init, fnv_u32, Consed, HashConsTable};
use super::graph::NodeGraph;
use super::ids::VectorNodeId;
use crate::hit::HitRecord;
use crate::math::{Coord, Vec3};

/// Ported verbatim from `nodes/converter/vecmath.h`'s `vecOp` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VecOp {
    Add,
    Subtract,
    Multiply,
    Average,
    Dot,
    Cross,
    Normalize,
    Reflect,
    Length,
}

/// A node that evaluates to `(Vec3, Coord)`, mirroring the original's
/// `vectorValue { v, c }` (`nodes/vectornode.h`) — the coordinate
/// component rides alongside the vector so a downstream `ColorNode` can
/// still resolve a texture uv after a vector transform.
#[derive(Clone)]
pub enum VectorNode {
    Constant(Vec3),
    /// The interpolated shading normal at the hit point.
    NormalIn,
    /// The incoming ray direction at the hit point.
    IncidentIn,
    Arithmetic {
        op: VecOp,
        a: VectorNodeId,
        b: VectorNodeId,
    },
}

impl VectorNode {
    pub fn intern(self, arena: &mut Arena<VectorNode>, table: &mut HashConsTable) -> VectorNodeId {
        VectorNodeId(table.intern(arena, self))
    }

    pub fn eval(&self, graph: &NodeGraph, hit: &HitRecord) -> (Vec3, Coord) {
        match self {
            VectorNode::Constant(v) => (*v, hit.uv),
            VectorNode::NormalIn => (hit.normal, hit.uv),
            VectorNode::IncidentIn => (hit.incident, hit.uv),
            VectorNode::Arithmetic { op, a, b } => {
                let (av, _) = graph.eval_vector(*a, hit);
                let (bv, _) = graph.eval_vector(*b, hit);
                let v = match op {
                    VecOp::Add => av + bv,
                    VecOp::Subtract => av - bv,
                    VecOp::Multiply => av.hadamard(bv),
                    VecOp::Average => (av + bv) * 0.5,
                    VecOp::Dot => Vec3::splat(av.dot(bv)),
                    VecOp::Cross => av.cross(bv),
                    VecOp::Normalize => av.normalized(),
                    VecOp::Reflect => av.reflect(bv),
                    VecOp::Length => Vec3::splat(av.length()),
                };
                (v, hit.uv)
            }
        }
    }
}

impl Consed for VectorNode {
    fn content_hash(&self) -> u32 {
        let h = fnv_init();
        match self {
            VectorNode::Constant(v) => {
                let h = fnv_u32(h, 0);
                fnv_f64(fnv_f64(fnv_f64(h, v.x), v.y), v.z)
            }
            VectorNode::NormalIn => fnv_u32(h, 1),
            VectorNode::IncidentIn => fnv_u32(h, 2),
            VectorNode::Arithmetic { op, a, b } => {
                let h = fnv_u32(h, 3);
                let h = fnv_u32(h, *op as u32);
                fnv_u32(fnv_u32(h, a.0), b.0)
            }
        }
    }

    fn content_eq(&self, other: &Self) -> bool {
        use VectorNode::*;
        match (self, other) {
            (Constant(a), Constant(b)) => a == b,
            (NormalIn, NormalIn) => true,
            (IncidentIn, IncidentIn) => true,
            (
                Arithmetic {
                    op: o1,
                    a: a1,
                    b: b1,
                },
                Arithmetic {
                    op: o2,
                    a: a2,
                    b: b2,
                },
            ) => o1 == o2 && a1 == a2 && b1 == b2,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_dedupe_by_value() {
        let mut arena = Arena::new();
        let mut table = HashConsTable::new();
        let a = VectorNode::Constant(Vec3::new(1.0, 2.0, 3.0)).intern(&mut arena, &mut table);
        let b = VectorNode::Constant(Vec3::new(1.0, 2.0, 3.0)).intern(&mut arena, &mut table);
        assert_eq!(a, b);
    }
}
