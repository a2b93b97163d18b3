//! Scene ingestion: the JSON scene document (spec §6), Wavefront OBJ mesh
//! geometry, and MTL material libraries.

pub mod json;
pub mod mtl;
pub mod obj;

use std::path::Path;

use crate::error::{RenderError, Result};
use crate::render::RenderConfig;
use crate::texture::ImageTexture;
use crate::world::World;

pub use json::{build_world, load, OutputConfig, SceneDocument};

/// Loads a `.hdr` equirectangular environment map into a float32 texture.
fn load_hdr(path: &Path) -> Result<ImageTexture> {
    let dynamic = image::open(path).map_err(|_| RenderError::InputNotFound { path: path.to_path_buf() })?;
    let rgb = dynamic.to_rgb32f();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let mut texture = ImageTexture::new_float32(width, height, 3);
    for y in 0..height {
        for x in 0..width {
            let px = rgb.get_pixel(x as u32, y as u32);
            texture.set_pixel(
                x,
                y,
                crate::math::Color::new(px[0] as f64, px[1] as f64, px[2] as f64),
                1.0,
            );
        }
    }
    Ok(texture)
}

/// Parses the scene file at `path` and builds a renderable world plus the
/// render/output settings it specifies. The entry point the CLI calls.
pub fn load_scene(path: &Path) -> Result<(World, RenderConfig, OutputConfig)> {
    let doc = load(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    build_world(&doc, base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn minimal_scene_file_builds_a_world() {
        let json = r#"{
            "camera": { "FOV": 60.0, "aperture": 0.0, "focalDistance": 1.0, "transforms": [] },
            "scene": {
                "outputFilePath": ".", "outputFileName": "out", "count": 0,
                "width": 4, "height": 4, "fileType": "png",
                "ambientColor": { "down": {"r":0.1,"g":0.1,"b":0.1}, "up": {"r":0.5,"g":0.5,"b":1.0} },
                "primitives": [
                    { "type": "sphere", "pos": {"X":0.0,"Y":0.0,"Z":-3.0}, "radius": 1.0,
                      "material": { "albedo": {"r":0.8,"g":0.2,"b":0.2}, "materialType": "diffuse" } }
                ],
                "meshes": []
            }
        }"#;
        let path = std::env::temp_dir().join(format!("scene_io_mod_test_{}.json", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(json.as_bytes()).unwrap();

        let (_world, config, output) = load_scene(&path).unwrap();
        assert_eq!(config.width, 4);
        assert_eq!(output.path.file_name().unwrap(), "out");
        std::fs::remove_file(path).ok();
    }
}
