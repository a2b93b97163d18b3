use std::sync::Arc;

use super::arena::Arena;
use super::consed::{fnv_bool, fnv_f64, fnv_init, Consed, HashConsTable};
use super::graph::NodeGraph;
use super::ids::{ColorNodeId, ValueNodeId};
use crate::hit::HitRecord;
use crate::math::Color;
use crate::texture::ImageTexture;

/// Evaluates to a `Color` at a hit point. Variants port `texturenode.c`
/// (constant/image/checkerboard) and `textures/gradient.c`
/// (up/down hemispheric blend); `CombineRgb` ports
/// `nodes/converter/combinergb.h`.
#[derive(Clone)]
pub enum ColorNode {
    Constant(Color),
    ImageTexture {
        texture: Arc<ImageTexture>,
        /// `texturenode.c`'s `SRGB_TRANSFORM` option bit: convert the
        /// sampled texel back to linear before it enters shading.
        srgb_transform: bool,
    },
    /// UV-mapped checkerboard (`mappedCheckerBoard`): uses the polygon's
    /// textured uv, sines of `scale·(u,v)`.
    CheckerboardUv {
        a: ColorNodeId,
        b: ColorNodeId,
        scale: f64,
    },
    /// Axis-aligned fallback (`unmappedCheckerBoard`) for surfaces without
    /// texture coordinates: sines of `scale·hit.point`.
    CheckerboardWorld {
        a: ColorNodeId,
        b: ColorNodeId,
        scale: f64,
    },
    /// Hemispheric blend by `0.5·(normal.y + 1)`, ported from
    /// `textures/gradient.c`.
    Gradient { down: Color, up: Color },
    Grayscale { input: ColorNodeId },
    CombineRgb {
        r: ValueNodeId,
        g: ValueNodeId,
        b: ValueNodeId,
    },
}

impl ColorNode {
    pub fn intern(self, arena: &mut Arena<ColorNode>, table: &mut HashConsTable) -> ColorNodeId {
        ColorNodeId(table.intern(arena, self))
    }

    pub fn eval(&self, graph: &NodeGraph, hit: &HitRecord) -> Color {
        match self {
            ColorNode::Constant(c) => *c,
            ColorNode::ImageTexture {
                texture,
                srgb_transform,
            } => {
                let mut c = texture.get_pixel(hit.uv.u, hit.uv.v, true);
                if *srgb_transform {
                    c = crate::math::from_srgb(c);
                }
                c
            }
            ColorNode::CheckerboardUv { a, b, scale } => {
                let sines = (scale * hit.uv.u).sin() * (scale * hit.uv.v).sin();
                graph.eval_color(if sines < 0.0 { *a } else { *b }, hit)
            }
            ColorNode::CheckerboardWorld { a, b, scale } => {
                let p = hit.point;
                let sines = (scale * p.x).sin() * (scale * p.y).sin() * (scale * p.z).sin();
                graph.eval_color(if sines < 0.0 { *a } else { *b }, hit)
            }
            ColorNode::Gradient { down, up } => {
                let t = 0.5 * (hit.normal.y + 1.0);
                *down * (1.0 - t) + *up * t
            }
            ColorNode::Grayscale { input } => {
                let c = graph.eval_color(*input, hit);
                let luma = 0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z;
                Color::new(luma, luma, luma)
            }
            ColorNode::CombineRgb { r, g, b } => Color::new(
                graph.eval_value(*r, hit),
                graph.eval_value(*g, hit),
                graph.eval_value(*b, hit),
            ),
        }
    }
}

impl Consed for ColorNode {
    fn content_hash(&self) -> u32 {
        let h = fnv_init();
        match self {
            ColorNode::Constant(c) => {
                let h = fnv_u32(h, 0);
                fnv_f64(fnv_f64(fnv_f64(h, c.x), c.y), c.z)
            }
            ColorNode::ImageTexture {
                texture,
                srgb_transform,
            } => {
                let h = fnv_u32(h, 1);
                let h = fnv_u32(h, Arc::as_ptr(texture) as *const () as usize as u32);
                fnv_bool(h, *srgb_transform)
            }
            ColorNode::CheckerboardUv { a, b, scale } => {
                let h = fnv_u32(h, 2);
                fnv_f64(fnv_u32(fnv_u32(h, a.0), b.0), *scale)
            }
            ColorNode::CheckerboardWorld { a, b, scale } => {
                let h = fnv_u32(h, 3);
                fnv_f64(fnv_u32(fnv_u32(h, a.0), b.0), *scale)
            }
            ColorNode::Gradient { down, up } => {
                let h = fnv_u32(h, 4);
                let h = fnv_f64(fnv_f64(fnv_f64(h, down.x), down.y), down.z);
                fnv_f64(fnv_f64(fnv_f64(h, up.x), up.y), up.z)
            }
            ColorNode::Grayscale { input } => fnv_u32(fnv_u32(h, 5), input.0),
            ColorNode::CombineRgb { r, g, b } => {
                let h = fnv_u32(h, 6);
                fnv_u32(fnv_u32(fnv_u32(h, r.0), g.0), b.0)
            }
        }
    }

    fn content_eq(&self, other: &Self) -> bool {
        use ColorNode::*;
        match (self, other) {
            (Constant(a), Constant(b)) => a == b,
            (
                ImageTexture {
                    texture: ta,
                    srgb_transform: sa,
                },
                ImageTexture {
                    texture: tb,
                    srgb_transform: sb,
                },
            ) => Arc::ptr_eq(ta, tb) && sa == sb,
            (
                CheckerboardUv {
                    a: a1,
                    b: b1,
                    scale: s1,
                },
                CheckerboardUv {
                    a: a2,
                    b: b2,
                    scale: s2,
                },
            ) => a1 == a2 && b1 == b2 && s1 == s2,
            (
                CheckerboardWorld {
                    a: a1,
                    b: b1,
                    scale: s1,
                },
                CheckerboardWorld {
                    a: a2,
                    b: b2,
                    scale: s2,
                },
            ) => a1 == a2 && b1 == b2 && s1 == s2,
            (Gradient { down: d1, up: u1 }, Gradient { down: d2, up: u2 }) => d1 == d2 && u1 == u2,
            (Grayscale { input: i1 }, Grayscale { input: i2 }) => i1 == i2,
            (
                CombineRgb {
                    r: r1,
                    g: g1,
                    b: b1,
                },
                CombineRgb {
                    r: r2,
                    g: g2,
                    b: b2,
                },
            ) => r1 == r2 && g1 == g2 && b1 == b2,
            _ => false,
        }
    }
}

fn fnv_u32(h: u32, v: u32) -> u32 {
    super::consed::fnv_u32(h, v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_constant_twice_dedupes() {
        let mut arena = Arena::new();
        let mut table = HashConsTable::new();
        let a = ColorNode::Constant(Color::new(1.0, 0.0, 0.0)).intern(&mut arena, &mut table);
        let b = ColorNode::Constant(Color::new(1.0, 0.0, 0.0)).intern(&mut arena, &mut table);
        assert_eq!(a, b);
    }

    #[test]
    fn interning_different_constants_does_not_dedupe() {
        let mut arena = Arena::new();
        let mut table = HashConsTable::new();
        let a = ColorNode::Constant(Color::new(1.0, 0.0, 0.0)).intern(&mut arena, &mut table);
        let b = ColorNode::Constant(Color::new(0.0, 1.0, 0.0)).intern(&mut arena, &mut table);
        assert_ne!(a, b);
    }
}
