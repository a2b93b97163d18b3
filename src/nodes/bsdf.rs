use super::arena::Arena;
use super::consed::{fnv_f64, fnv_init, fnv_u32, Consed, HashConsTable};
use super::graph::NodeGraph;
use super::ids::{BsdfNodeId, ColorNodeId};
use crate::hit::HitRecord;
use crate::math::{Color, Sampler, Vec3};

/// Result of sampling a BSDF: an outgoing direction and the color to
/// multiply into the path's running throughput. No explicit pdf is
/// returned — per spec §4.4.1 the sampling distribution is implicitly
/// the throughput weight, unlike the original's `bsdfSample.pdf` field
/// (always left at its default and never read by `pathtrace.c`).
pub struct BsdfSample {
    pub out: Vec3,
    pub color: Color,
}

/// All six BSDFs named in spec §4.4.1, plus `Isotropic` (`isotropic.c`).
/// Emissive behavior is not a variant here — see [`super::material::Material`].
#[derive(Clone)]
pub enum BsdfNode {
    Diffuse {
        color: ColorNodeId,
    },
    Metal {
        color: ColorNodeId,
        roughness: ColorNodeId,
    },
    Glass {
        color: ColorNodeId,
        roughness: ColorNodeId,
        ior: u64, // f64 bits, so the node is structurally Eq/Hash-able
    },
    Plastic {
        color: ColorNodeId,
        roughness: ColorNodeId,
        ior: u64,
    },
    Transparent {
        color: ColorNodeId,
    },
    Isotropic {
        color: ColorNodeId,
    },
    Mix {
        a: BsdfNodeId,
        b: BsdfNodeId,
        factor: ColorNodeId,
    },
}

fn schlick(cosine: f64, ior: f64) -> f64 {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

impl BsdfNode {
    pub fn glass(color: ColorNodeId, roughness: ColorNodeId, ior: f64) -> Self {
        BsdfNode::Glass {
            color,
            roughness,
            ior: ior.to_bits(),
        }
    }

    pub fn plastic(color: ColorNodeId, roughness: ColorNodeId, ior: f64) -> Self {
        BsdfNode::Plastic {
            color,
            roughness,
            ior: ior.to_bits(),
        }
    }

    pub fn intern(self, arena: &mut Arena<BsdfNode>, table: &mut HashConsTable) -> BsdfNodeId {
        BsdfNodeId(table.intern(arena, self))
    }

    pub fn sample(&self, graph: &NodeGraph, sampler: &mut Sampler, hit: &HitRecord) -> BsdfSample {
        match self {
            BsdfNode::Diffuse { color } => {
                let out = (hit.normal + sampler.random_on_unit_sphere()).normalized();
                BsdfSample {
                    out,
                    color: graph.eval_color(*color, hit),
                }
            }
            BsdfNode::Metal { color, roughness } => {
                let normalized_incident = hit.incident.normalized();
                let mut reflected = normalized_incident.reflect(hit.normal);
                let rough = graph.eval_color(*roughness, hit).x;
                if rough > 0.0 {
                    reflected = reflected + sampler.random_on_unit_sphere() * rough;
                }
                BsdfSample {
                    out: reflected,
                    color: graph.eval_color(*color, hit),
                }
            }
            BsdfNode::Glass {
                color,
                roughness,
                ior,
            } => {
                let ior = f64::from_bits(*ior);
                let incident = hit.incident;
                let n = hit.geometric_normal;
                let (outward_normal, ni_over_nt, cosine) = if incident.dot(n) > 0.0 {
                    (-n, ior, ior * incident.dot(n) / incident.length())
                } else {
                    (n, 1.0 / ior, -(incident.dot(n) / incident.length()))
                };

                let refracted = incident.refract(outward_normal, ni_over_nt);
                let reflect_probability = match refracted {
                    Some(_) => schlick(cosine, ior),
                    None => 1.0,
                };

                let mut reflected = incident.reflect(n);
                let mut refracted = refracted.unwrap_or(reflected);

                let rough = graph.eval_color(*roughness, hit).x;
                if rough > 0.0 {
                    let fuzz = sampler.random_on_unit_sphere() * rough;
                    reflected = reflected + fuzz;
                    refracted = refracted + fuzz;
                }

                let out = if sampler.next_dim() < reflect_probability {
                    reflected
                } else {
                    refracted
                };
                BsdfSample {
                    out,
                    color: graph.eval_color(*color, hit),
                }
            }
            BsdfNode::Plastic {
                color,
                roughness,
                ior,
            } => {
                let ior = f64::from_bits(*ior);
                let n = hit.geometric_normal;
                let cosine = -(hit.incident.normalized().dot(n));
                let reflect_probability = schlick(cosine.abs(), ior);

                if sampler.next_dim() < reflect_probability {
                    let mut reflected = hit.incident.normalized().reflect(n);
                    let rough = graph.eval_color(*roughness, hit).x;
                    if rough > 0.0 {
                        reflected = reflected + sampler.random_on_unit_sphere() * rough;
                    }
                    BsdfSample {
                        out: reflected,
                        color: Color::ones(),
                    }
                } else {
                    let out = (hit.normal + sampler.random_on_unit_sphere()).normalized();
                    BsdfSample {
                        out,
                        color: graph.eval_color(*color, hit),
                    }
                }
            }
            BsdfNode::Transparent { color } => BsdfSample {
                out: hit.incident,
                color: graph.eval_color(*color, hit),
            },
            BsdfNode::Isotropic { color } => BsdfSample {
                out: sampler.random_on_unit_sphere().normalized(),
                color: graph.eval_color(*color, hit),
            },
            BsdfNode::Mix { a, b, factor } => {
                let t = graph.eval_color(*factor, hit).x;
                let chosen = if sampler.next_dim() < t {
                    graph.bsdfs.get(a.0)
                } else {
                    graph.bsdfs.get(b.0)
                };
                chosen.sample(graph, sampler, hit)
            }
        }
    }
}

impl Consed for BsdfNode {
    fn content_hash(&self) -> u32 {
        let h = fnv_init();
        match self {
            BsdfNode::Diffuse { color } => fnv_u32(fnv_u32(h, 0), color.0),
            BsdfNode::Metal { color, roughness } => {
                let h = fnv_u32(h, 1);
                fnv_u32(fnv_u32(h, color.0), roughness.0)
            }
            BsdfNode::Glass {
                color,
                roughness,
                ior,
            } => {
                let h = fnv_u32(h, 2);
                let h = fnv_u32(fnv_u32(h, color.0), roughness.0);
                fnv_f64(h, f64::from_bits(*ior))
            }
            BsdfNode::Plastic {
                color,
                roughness,
                ior,
            } => {
                let h = fnv_u32(h, 3);
                let h = fnv_u32(fnv_u32(h, color.0), roughness.0);
                fnv_f64(h, f64::from_bits(*ior))
            }
            BsdfNode::Transparent { color } => fnv_u32(fnv_u32(h, 4), color.0),
            BsdfNode::Isotropic { color } => fnv_u32(fnv_u32(h, 5), color.0),
            BsdfNode::Mix { a, b, factor } => {
                let h = fnv_u32(h, 6);
                fnv_u32(fnv_u32(fnv_u32(h, a.0), b.0), factor.0)
            }
        }
    }

    fn content_eq(&self, other: &Self) -> bool {
        use BsdfNode::*;
        match (self, other) {
            (Diffuse { color: c1 }, Diffuse { color: c2 }) => c1 == c2,
            (
                Metal {
                    color: c1,
                    roughness: r1,
                },
                Metal {
                    color: c2,
                    roughness: r2,
                },
            ) => c1 == c2 && r1 == r2,
            (
                Glass {
                    color: c1,
                    roughness: r1,
                    ior: i1,
                },
                Glass {
                    color: c2,
                    roughness: r2,
                    ior: i2,
                },
            ) => c1 == c2 && r1 == r2 && i1 == i2,
            (
                Plastic {
                    color: c1,
                    roughness: r1,
                    ior: i1,
                },
                Plastic {
                    color: c2,
                    roughness: r2,
                    ior: i2,
                },
            ) => c1 == c2 && r1 == r2 && i1 == i2,
            (Transparent { color: c1 }, Transparent { color: c2 }) => c1 == c2,
            (Isotropic { color: c1 }, Isotropic { color: c2 }) => c1 == c2,
            (
                Mix {
                    a: a1,
                    b: b1,
                    factor: f1,
                },
                Mix {
                    a: a2,
                    b: b2,
                    factor: f2,
                },
            ) => a1 == a2 && b1 == b2 && f1 == f2,
            _ => false,
        }
    }
}
