use super::ids::{BsdfNodeId, ColorNodeId};

/// A surface's shading description: a BSDF to scatter rays, plus an
/// optional emissive color sampled once per hit by the integrator (spec
/// §4.5). Emission is a side-channel field rather than a BSDF variant that
/// returns zero-throughput — same observable contract, simpler
/// representation (see spec §4.4's note on this deviation).
pub struct Material {
    pub bsdf: BsdfNodeId,
    pub emission: Option<ColorNodeId>,
}
