use std::f64::consts::PI;

use crate::math::{Color, Vec3};
use crate::texture::ImageTexture;

/// An equirectangular HDR environment map plus the yaw offset applied
/// before sampling. The per-ray azimuth is divided by 4 before the offset
/// is added — `pathtrace.c`'s `getHDRI` wart (`phi = atan2(z,x)/4 +
/// offset`, wrapping every 90° instead of every 360°) — preserved behind a
/// named constant rather than silently "fixed", per spec §9's open
/// question on the `phi/4` divisor.
pub struct HdrEnvironment {
    texture: ImageTexture,
    offset_radians: f64,
}

/// Named so the wart is visible at the call site rather than buried in an
/// inline literal (spec §9).
pub const HDR_PHI_DIVISOR: f64 = 4.0;

impl HdrEnvironment {
    pub fn new(texture: ImageTexture, offset_degrees: f64) -> Self {
        Self {
            texture,
            offset_radians: offset_degrees.to_radians(),
        }
    }

    /// Samples the map along `direction`, reproducing `pathtrace.c`'s
    /// `getHDRI` exactly: `phi = atan2(z,x)/4 + offset`, `theta =
    /// acos(-y)`, `u = theta/pi`, `v = phi/(pi/2)`, both wrapped into
    /// `[0,1)`, and `x = v*width`, `y = u*height` — the u/v names don't
    /// line up with the texture's own x/y axes, but that's what the
    /// source does.
    pub fn sample(&self, direction: Vec3) -> Color {
        let d = direction.normalized();
        let phi = d.z.atan2(d.x) / HDR_PHI_DIVISOR + self.offset_radians;
        let theta = (-d.y).clamp(-1.0, 1.0).acos();
        let u = (theta / PI).rem_euclid(1.0);
        let v = (phi / (PI / 2.0)).rem_euclid(1.0);
        self.texture.get_pixel(v, u, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_stays_in_valid_range() {
        let mut tex = ImageTexture::new_float32(8, 4, 3);
        for y in 0..4 {
            for x in 0..8 {
                tex.set_pixel(x, y, Color::new(2.0, 1.5, 1.0), 1.0);
            }
        }
        let env = HdrEnvironment::new(tex, 0.0);
        let c = env.sample(Vec3::new(0.0, 1.0, 0.0));
        assert!(c.x >= 0.0 && c.y >= 0.0 && c.z >= 0.0);
    }

    #[test]
    fn offset_degrees_converted_to_radians() {
        let tex = ImageTexture::new_float32(4, 2, 3);
        let env = HdrEnvironment::new(tex, 180.0);
        assert!((env.offset_radians - PI).abs() < 1e-9);
    }

    #[test]
    fn per_ray_phi_uses_the_divisor() {
        let tex = ImageTexture::new_float32(4, 2, 3);
        let env = HdrEnvironment::new(tex, 0.0);
        // atan2(1,0)/4 = (pi/2)/4 = pi/8, so v = (pi/8)/(pi/2) = 0.25
        let d = Vec3::new(0.0, 0.0, 1.0);
        let _ = env.sample(d);
        let phi = d.z.atan2(d.x) / HDR_PHI_DIVISOR;
        assert!((phi - std::f64::consts::FRAC_PI_8).abs() < 1e-9);
    }
}
