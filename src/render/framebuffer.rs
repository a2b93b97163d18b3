use crate::math::{to_srgb, Color};

/// One pixel's running statistics: the Welford-style incremental mean
/// (`running += (new - running)/k`) plus a sample count, preferred over the
/// naive `(old*(k-1)+new)/k` form for numerical stability over many samples
/// (spec §4.7/§9 design note).
#[derive(Debug, Clone, Copy, Default)]
struct PixelAccumulator {
    running: Color,
    count: u32,
}

impl PixelAccumulator {
    fn add_sample(&mut self, sample: Color) {
        self.count += 1;
        self.running += (sample - self.running) / self.count as f64;
    }
}

/// A linear-space float framebuffer that workers write into tile-by-tile
/// without any cross-tile locking, since each pixel belongs to exactly one
/// tile (spec §5's "render buffer partitioned by tile and lock-free").
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pixels: Vec<PixelAccumulator>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![PixelAccumulator::default(); (width * height) as usize],
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Accumulates one more path-traced sample into pixel `(x, y)`.
    /// `&mut self` is fine even though workers run concurrently: each
    /// worker owns a disjoint set of tiles, never overlapping pixel ranges.
    pub fn accumulate(&mut self, x: u32, y: u32, sample: Color) {
        let idx = self.index(x, y);
        self.pixels[idx].add_sample(sample);
    }

    pub fn mean(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)].running
    }

    pub fn sample_count(&self, x: u32, y: u32) -> u32 {
        self.pixels[self.index(x, y)].count
    }

    /// Tone-maps the whole buffer to 8-bit sRGB, row-major top-to-bottom,
    /// `channels` bytes per pixel (3 = RGB, 4 = RGBA with alpha forced
    /// opaque — spec §4.8's "alpha opaque unless texture declares alpha").
    pub fn to_srgb8(&self, channels: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * channels);
        for p in &self.pixels {
            let c = to_srgb(p.running).saturate();
            let (r, g, b) = c.to_rgb8();
            out.push(r);
            out.push(g);
            out.push(b);
            if channels == 4 {
                out.push(255);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_average_converges_to_constant_sample() {
        let mut fb = Framebuffer::new(1, 1);
        for _ in 0..100 {
            fb.accumulate(0, 0, Color::new(0.5, 0.5, 0.5));
        }
        let m = fb.mean(0, 0);
        assert!((m.x - 0.5).abs() < 1e-9);
        assert_eq!(fb.sample_count(0, 0), 100);
    }

    #[test]
    fn running_average_of_two_distinct_samples_is_their_mean() {
        let mut fb = Framebuffer::new(1, 1);
        fb.accumulate(0, 0, Color::zero());
        fb.accumulate(0, 0, Color::ones());
        let m = fb.mean(0, 0);
        assert!((m.x - 0.5).abs() < 1e-9);
    }

    #[test]
    fn to_srgb8_output_has_expected_length() {
        let fb = Framebuffer::new(4, 3);
        assert_eq!(fb.to_srgb8(3).len(), 4 * 3 * 3);
        assert_eq!(fb.to_srgb8(4).len(), 4 * 3 * 4);
    }
}
