use super::arena::Arena;
use super::consed::{fnv_f64, fnv_init, fnv_u32, Consed, HashConsTable};
use super::graph::NodeGraph;
use super::ids::{ColorNodeId, ValueNodeId};
use crate::hit::HitRecord;

/// Scalar arithmetic ops available to a [`ValueNode::Arithmetic`] node.
/// Not directly ported from a single original file (no standalone
/// `valuenode.c` ships in the retrieval pack) — modeled on
/// `nodes/converter/vecmath.h`'s `vecOp` enum, restricted to the
/// component-wise subset that's meaningful for a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// A node that evaluates to a single `f64`. `CombineRgb`'s three channel
/// inputs are `ValueNode`s (`combinergb.h`); `FromColorChannel` is the
/// reverse direction, extracting a channel back out of a `ColorNode` so a
/// texture can drive roughness or a mix factor.
#[derive(Clone)]
pub enum ValueNode {
    Constant(f64),
    FromColorChannel { input: ColorNodeId, channel: u8 },
    Arithmetic {
        op: ValueOp,
        a: ValueNodeId,
        b: ValueNodeId,
    },
}

impl ValueNode {
    pub fn intern(self, arena: &mut Arena<ValueNode>, table: &mut HashConsTable) -> ValueNodeId {
        ValueNodeId(table.intern(arena, self))
    }

    pub fn eval(&self, graph: &NodeGraph, hit: &HitRecord) -> f64 {
        match self {
            ValueNode::Constant(v) => *v,
            ValueNode::FromColorChannel { input, channel } => {
                let c = graph.eval_color(*input, hit);
                match channel {
                    0 => c.x,
                    1 => c.y,
                    _ => c.z,
                }
            }
            ValueNode::Arithmetic { op, a, b } => {
                let a = graph.eval_value(*a, hit);
                let b = graph.eval_value(*b, hit);
                match op {
                    ValueOp::Add => a + b,
                    ValueOp::Subtract => a - b,
                    ValueOp::Multiply => a * b,
                    ValueOp::Divide => a / b,
                }
            }
        }
    }
}

impl Consed for ValueNode {
    fn content_hash(&self) -> u32 {
        let h = fnv_init();
        match self {
            ValueNode::Constant(v) => fnv_f64(fnv_u32(h, 0), *v),
            ValueNode::FromColorChannel { input, channel } => {
                let h = fnv_u32(h, 1);
                fnv_u32(fnv_u32(h, input.0), *channel as u32)
            }
            ValueNode::Arithmetic { op, a, b } => {
                let h = fnv_u32(h, 2);
                let h = fnv_u32(h, *op as u32);
                fnv_u32(fnv_u32(h, a.0), b.0)
            }
        }
    }

    fn content_eq(&self, other: &Self) -> bool {
        use ValueNode::*;
        match (self, other) {
            (Constant(a), Constant(b)) => a == b,
            (
                FromColorChannel {
                    input: i1,
                    channel: c1,
                },
                FromColorChannel {
                    input: i2,
                    channel: c2,
                },
            ) => i1 == i2 && c1 == c2,
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
        let a = ValueNode::Constant(0.5).intern(&mut arena, &mut table);
        let b = ValueNode::Constant(0.5).intern(&mut arena, &mut table);
        assert_eq!(a, b);
    }
}
