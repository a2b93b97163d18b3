use crate::math::{triangular, Point3, Ray, Sampler, Vec3};

/// A thin-lens camera model with configurable field of view, aspect ratio,
/// focus distance, and aperture size. Builds the same orthonormal basis the
/// teacher's camera does (`w` points back at the eye, `u` right, `v` up),
/// but draws its depth-of-field jitter and subpixel offset from the
/// deterministic [`Sampler`] instead of a `rand::RngCore`, and biases
/// subpixel placement with [`triangular`] rather than uniform jitter
/// (ported from `camera.c`'s `triangleDistribution`).
pub struct Camera {
    origin: Point3,
    lower_left: Point3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    lens_radius: f64,
}

/// Whether the camera re-derives its focal length the way the original's
/// `camera.c` does — a hardcoded 35mm-equivalent sensor independent of the
/// computed viewport width — or derives aperture directly from the
/// viewport's own sensor width. Default preserves the original's behavior
/// for compatibility (spec §9 open question).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Camera35mmCompat {
    Enabled,
    Disabled,
}

pub struct CameraConfig {
    pub look_from: Point3,
    pub look_at: Point3,
    pub vup: Vec3,
    pub fov_degrees: f64,
    pub aspect_ratio: f64,
    /// Aperture diameter. Ignored (recomputed from `fstops`) when `fstops`
    /// is non-zero and `compat` is enabled.
    pub aperture: f64,
    pub fstops: f64,
    pub focus_dist: f64,
    pub compat: Camera35mmCompat,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            look_from: Point3::new(0.0, 1.0, 3.0),
            look_at: Point3::zero(),
            vup: Vec3::unit_y(),
            fov_degrees: 40.0,
            aspect_ratio: 16.0 / 9.0,
            aperture: 0.0,
            fstops: 0.0,
            focus_dist: 3.0,
            compat: Camera35mmCompat::Enabled,
        }
    }
}

/// 35mm-equivalent sensor width in meters, matching `camera.c`'s hardcoded
/// `0.036`.
const COMPAT_SENSOR_WIDTH: f64 = 0.036;

impl Camera {
    /// Constructs the camera from configuration. The orthonormal basis is:
    ///   w = normalize(look_from - look_at)   (points backward, away from scene)
    ///   u = normalize(vup × w)               (points right)
    ///   v = w × u                             (points up, orthogonal to both)
    pub fn new(config: &CameraConfig) -> Self {
        let theta = config.fov_degrees.to_radians();
        let h = (theta / 2.0).tan();
        // FOV is horizontal: sensor width comes from it directly, and the
        // height follows from the aspect ratio (spec §4.6 step 2).
        let viewport_width = 2.0 * h;
        let viewport_height = viewport_width / config.aspect_ratio;

        let w = (config.look_from - config.look_at).normalized();
        let u = config.vup.cross(w).normalized();
        let v = w.cross(u);

        let horizontal = u * viewport_width * config.focus_dist;
        let vertical = v * viewport_height * config.focus_dist;
        let lower_left = config.look_from - horizontal / 2.0 - vertical / 2.0 - w * config.focus_dist;

        let aperture = match config.compat {
            // `focalLength = 0.5 * 0.036 / tan(0.5*FOV)`, independent of the
            // viewport width computed above — the original's own wart,
            // preserved here when fstops is in use (spec §4.6, §9).
            Camera35mmCompat::Enabled if config.fstops != 0.0 => {
                let focal_length = 0.5 * COMPAT_SENSOR_WIDTH / (theta / 2.0).tan();
                focal_length / config.fstops
            }
            _ => config.aperture,
        };

        Camera {
            origin: config.look_from,
            lower_left,
            horizontal,
            vertical,
            u,
            v,
            lens_radius: aperture / 2.0,
        }
    }

    /// Generates a primary ray for pixel `(px, py)` within an image of size
    /// `(width, height)`, drawing subpixel jitter (triangular-filtered) and
    /// lens offset (polar unit-disc) from `sampler`.
    pub fn get_ray(&self, px: f64, py: f64, width: f64, height: f64, sampler: &mut Sampler) -> Ray {
        let jitter_x = triangular(sampler.next_dim());
        let jitter_y = triangular(sampler.next_dim());
        let s = (px + 0.5 + jitter_x) / width;
        let t = (py + 0.5 + jitter_y) / height;

        let offset = if self.lens_radius > 0.0 {
            let (dx, dy) = sampler.random_coord_on_unit_disc();
            self.u * (dx * self.lens_radius) + self.v * (dy * self.lens_radius)
        } else {
            Vec3::zero()
        };

        Ray::new(
            self.origin + offset,
            self.lower_left + self.horizontal * s + self.vertical * t - self.origin - offset,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_pixel_points_roughly_at_look_at() {
        let config = CameraConfig {
            look_from: Point3::new(0.0, 0.0, 5.0),
            look_at: Point3::zero(),
            vup: Vec3::unit_y(),
            fov_degrees: 40.0,
            aspect_ratio: 1.0,
            aperture: 0.0,
            fstops: 0.0,
            focus_dist: 5.0,
            compat: Camera35mmCompat::Disabled,
        };
        let camera = Camera::new(&config);
        let mut sampler = Sampler::new(0, 0);
        let ray = camera.get_ray(0.0, 0.0, 1.0, 1.0, &mut sampler);
        // direction should point roughly toward -z (away from origin, toward look_at)
        assert!(ray.direction.normalized().z < 0.0);
    }

    #[test]
    fn zero_aperture_produces_no_lens_offset() {
        let config = CameraConfig {
            aperture: 0.0,
            fstops: 0.0,
            compat: Camera35mmCompat::Disabled,
            ..Default::default()
        };
        let camera = Camera::new(&config);
        assert_eq!(camera.lens_radius, 0.0);
    }

    #[test]
    fn fstops_compat_derives_nonzero_aperture() {
        let config = CameraConfig {
            fstops: 2.8,
            compat: Camera35mmCompat::Enabled,
            ..Default::default()
        };
        let camera = Camera::new(&config);
        assert!(camera.lens_radius > 0.0);
    }
}
