use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgb};

use crate::error::{RenderError, Result};
use crate::render::Framebuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Bmp,
}

impl ImageFormat {
    fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Bmp => "bmp",
        }
    }
}

/// Writes `fb` to `base_path` with `_<suffix>` appended before the
/// extension when `suffix` is `Some` — used for the graceful-abort partial
/// image, named by completed pass count (spec §7/§6:
/// `outputFileName_count.ext`).
pub fn write_framebuffer(
    fb: &Framebuffer,
    base_path: &Path,
    format: ImageFormat,
    suffix: Option<u32>,
) -> Result<PathBuf> {
    let path = suffixed_path(base_path, format, suffix);
    let bytes = fb.to_srgb8(3);
    let image: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_raw(fb.width, fb.height, bytes)
        .ok_or_else(|| RenderError::inconsistent("framebuffer byte count does not match its dimensions"))?;
    image.save(&path).map_err(|source| RenderError::WriteFailure {
        path: path.clone(),
        source: std::io::Error::new(std::io::ErrorKind::Other, source),
    })?;
    Ok(path)
}

fn suffixed_path(base_path: &Path, format: ImageFormat, suffix: Option<u32>) -> PathBuf {
    let stem = base_path.file_stem().and_then(|s| s.to_str()).unwrap_or("render");
    let dir = base_path.parent().unwrap_or_else(|| Path::new("."));
    let name = match suffix {
        Some(count) => format!("{stem}_{count}.{}", format.extension()),
        None => format!("{stem}.{}", format.extension()),
    };
    dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_is_appended_before_extension() {
        let path = suffixed_path(Path::new("/tmp/out.png"), ImageFormat::Png, Some(7));
        assert_eq!(path, Path::new("/tmp/out_7.png"));
    }

    #[test]
    fn no_suffix_leaves_name_unchanged() {
        let path = suffixed_path(Path::new("/tmp/out.png"), ImageFormat::Bmp, None);
        assert_eq!(path, Path::new("/tmp/out.bmp"));
    }
}
