use crate::math::Color;

/// Sample precision, ported from `datatypes/image/texture.h`'s `precision`
/// enum: 8-bit images stay byte-packed, HDR sources keep full float
/// precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Byte8,
    Float32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colorspace {
    Linear,
    Srgb,
}

enum Pixels {
    Byte8(Vec<u8>),
    Float32(Vec<f32>),
}

/// A loaded image (diffuse/roughness/normal map, or HDR environment),
/// ported from `datatypes/image/texture.c`. Row-major with `(0,0)` at the
/// bottom-left, matching the original's `height - 1 - y` flip on every
/// access.
pub struct ImageTexture {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub precision: Precision,
    pub colorspace: Colorspace,
    pub has_alpha: bool,
    data: Pixels,
}

impl ImageTexture {
    pub fn new_byte8(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            precision: Precision::Byte8,
            colorspace: Colorspace::Srgb,
            has_alpha: channels > 3,
            data: Pixels::Byte8(vec![0u8; width * height * channels]),
        }
    }

    pub fn new_float32(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            precision: Precision::Float32,
            colorspace: Colorspace::Linear,
            has_alpha: channels > 3,
            data: Pixels::Float32(vec![0.0f32; width * height * channels]),
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, c: Color, alpha: f64) {
        let flipped_y = self.height - (y + 1);
        let base = (x + flipped_y * self.width) * self.channels;
        match &mut self.data {
            Pixels::Byte8(buf) => {
                buf[base] = (c.x * 255.0).min(255.0) as u8;
                buf[base + 1] = (c.y * 255.0).min(255.0) as u8;
                buf[base + 2] = (c.z * 255.0).min(255.0) as u8;
                if self.has_alpha {
                    buf[base + 3] = (alpha * 255.0).min(255.0) as u8;
                }
            }
            Pixels::Float32(buf) => {
                buf[base] = c.x as f32;
                buf[base + 1] = c.y as f32;
                buf[base + 2] = c.z as f32;
                if self.has_alpha {
                    buf[base + 3] = alpha as f32;
                }
            }
        }
    }

    fn pixel_internal(&self, x: i64, y: i64) -> Color {
        let x = x.rem_euclid(self.width as i64) as usize;
        let y = y.rem_euclid(self.height as i64) as usize;
        let flipped_y = (self.height - 1) - y;
        let base = (x + flipped_y * self.width) * self.channels;
        match &self.data {
            Pixels::Byte8(buf) => {
                if self.channels == 1 {
                    let v = buf[base] as f64 / 255.0;
                    Color::new(v, v, v)
                } else {
                    Color::new(
                        buf[base] as f64 / 255.0,
                        buf[base + 1] as f64 / 255.0,
                        buf[base + 2] as f64 / 255.0,
                    )
                }
            }
            Pixels::Float32(buf) => {
                if self.channels == 1 {
                    let v = buf[base] as f64;
                    Color::new(v, v, v)
                } else {
                    Color::new(buf[base] as f64, buf[base + 1] as f64, buf[base + 2] as f64)
                }
            }
        }
    }

    /// `filtered=false`: `x, y` are raw pixel indices, nearest sample.
    /// `filtered=true`: `x, y` are `[0,1)` uv coordinates, bilinear
    /// filtered across the four nearest texels — ported from
    /// `texture.c`'s `textureGetPixel`, the "confusing API" the original's
    /// own comment flags (the semantics of `x`/`y` really do change with
    /// the flag).
    pub fn get_pixel(&self, x: f64, y: f64, filtered: bool) -> Color {
        if !filtered {
            return self.pixel_internal(x as i64, y as i64);
        }
        let x = x * self.width as f64;
        let y = y * self.height as f64;
        let xcopy = x - 0.5;
        let ycopy = y - 0.5;
        let xint = xcopy.floor() as i64;
        let yint = ycopy.floor() as i64;
        let tx = xcopy - xint as f64;
        let ty = ycopy - yint as f64;

        let top_left = self.pixel_internal(xint, yint);
        let top_right = self.pixel_internal(xint + 1, yint);
        let bot_left = self.pixel_internal(xint, yint + 1);
        let bot_right = self.pixel_internal(xint + 1, yint + 1);
        top_left.lerp(top_right, tx).lerp(bot_left.lerp(bot_right, tx), ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips_nearest() {
        let mut tex = ImageTexture::new_byte8(4, 4, 3);
        tex.set_pixel(1, 1, Color::new(1.0, 0.0, 0.0), 1.0);
        let c = tex.get_pixel(1.0, 1.0, false);
        assert!((c.x - 1.0).abs() < 1e-2);
    }

    #[test]
    fn filtered_sample_stays_in_range() {
        let mut tex = ImageTexture::new_byte8(4, 4, 3);
        for y in 0..4 {
            for x in 0..4 {
                tex.set_pixel(x, y, Color::new(0.5, 0.5, 0.5), 1.0);
            }
        }
        let c = tex.get_pixel(0.33, 0.66, true);
        assert!((c.x - 0.5).abs() < 1e-2);
    }
}
