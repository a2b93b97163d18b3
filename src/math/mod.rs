mod matrix;
mod sampler;
mod vector;

pub use matrix::{Matrix4, TransformKind};
pub use sampler::Sampler;
pub use vector::{Color, Coord, Point3, Ray, Vec3};

/// Triangular-filter remap of a uniform `[0,1)` sample: `sign(2u-1)·(1-√|2u-1|)`.
/// Used by the camera for subpixel jitter (spec §4.6) so samples cluster
/// toward pixel centers rather than spreading uniformly across the pixel.
pub fn triangular(u: f64) -> f64 {
    let orig = 2.0 * u - 1.0;
    if orig.abs() < 1e-12 {
        return 0.0;
    }
    let sign = if orig >= 0.0 { 1.0 } else { -1.0 };
    sign * (1.0 - orig.abs().sqrt())
}

/// Piecewise linear-to-sRGB transfer function (spec §4.8): linear below
/// `0.0031308`, `1.055·x^(1/2.4) - 0.055` above.
fn to_srgb_component(c: f64) -> f64 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Inverse of [`to_srgb_component`] — used when ingesting sRGB-encoded
/// texture data back into the renderer's linear working space.
fn from_srgb_component(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn to_srgb(c: Color) -> Color {
    Color::new(
        to_srgb_component(c.x),
        to_srgb_component(c.y),
        to_srgb_component(c.z),
    )
}

pub fn from_srgb(c: Color) -> Color {
    Color::new(
        from_srgb_component(c.x),
        from_srgb_component(c.y),
        from_srgb_component(c.z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangular_is_zero_at_midpoint() {
        assert!(triangular(0.5).abs() < 1e-12);
    }

    #[test]
    fn triangular_stays_in_unit_range() {
        for i in 0..100 {
            let u = i as f64 / 100.0;
            let t = triangular(u);
            assert!((-1.0..=1.0).contains(&t));
        }
    }

    #[test]
    fn srgb_round_trips() {
        let c = Color::new(0.2, 0.5, 0.9);
        let back = from_srgb(to_srgb(c));
        assert!((back.x - c.x).abs() < 1e-9);
        assert!((back.y - c.y).abs() < 1e-9);
        assert!((back.z - c.z).abs() < 1e-9);
    }
}
