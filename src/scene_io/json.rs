use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::camera::{Camera, Camera35mmCompat, CameraConfig};
use crate::error::{RenderError, Result};
use crate::geometry::Sphere;
use crate::image_io::ImageFormat;
use crate::instance::{Instance, InstanceKind};
use crate::math::{Color, Matrix4, Point3, Vec3};
use crate::nodes::{BsdfNode, ColorNode, ColorNodeId, Material, NodeGraph};
use crate::render::{RenderConfig, TileOrder};
use crate::world::{Background, World};

use super::mtl;
use super::obj;

#[derive(Deserialize, Debug, Clone)]
pub struct ColorJson {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default)]
    pub a: Option<f64>,
}

impl From<&ColorJson> for Color {
    fn from(c: &ColorJson) -> Self {
        Color::new(c.r, c.g, c.b)
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TransformJson {
    RotateX { degrees: f64 },
    RotateY { degrees: f64 },
    RotateZ { degrees: f64 },
    Translate { x: f64, y: f64, z: f64 },
    Scale { x: f64, y: f64, z: f64 },
    ScaleUniform { scale: f64 },
}

impl TransformJson {
    fn to_matrix(&self) -> Matrix4 {
        match self {
            TransformJson::RotateX { degrees } => Matrix4::rotate_x(degrees.to_radians()),
            TransformJson::RotateY { degrees } => Matrix4::rotate_y(degrees.to_radians()),
            TransformJson::RotateZ { degrees } => Matrix4::rotate_z(degrees.to_radians()),
            TransformJson::Translate { x, y, z } => Matrix4::translate(*x, *y, *z),
            TransformJson::Scale { x, y, z } => Matrix4::scale(*x, *y, *z),
            TransformJson::ScaleUniform { scale } => Matrix4::scale_uniform(*scale),
        }
    }
}

fn compose_transforms(list: &[TransformJson]) -> Matrix4 {
    list.iter()
        .fold(Matrix4::identity(), |acc, t| acc.then(&t.to_matrix()))
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct MaterialJson {
    pub albedo: Option<ColorJson>,
    #[serde(default)]
    pub roughness: f64,
    #[serde(default)]
    pub specularity: f64,
    #[serde(default)]
    pub metalness: f64,
    #[serde(default)]
    pub anisotropy: f64,
    #[serde(default = "default_ior")]
    pub ior: f64,
    #[serde(default)]
    pub material_type: Option<String>,
}

fn default_ior() -> f64 {
    1.45
}

impl MaterialJson {
    fn build(&self, nodes: &mut NodeGraph) -> Arc<Material> {
        let albedo = self
            .albedo
            .as_ref()
            .map(|c| nodes.intern_color(ColorNode::Constant(c.into())))
            .unwrap_or(ColorNodeId::NONE);
        let roughness = nodes.intern_color(ColorNode::Constant(Color::splat(self.roughness)));

        let kind = self.material_type.as_deref().unwrap_or("diffuse");
        let bsdf = match kind {
            "metal" => BsdfNode::Metal { color: albedo, roughness },
            "glass" => BsdfNode::glass(albedo, roughness, self.ior),
            "plastic" => BsdfNode::plastic(albedo, roughness, self.ior),
            "transparent" => BsdfNode::Transparent { color: albedo },
            "isotropic" => BsdfNode::Isotropic { color: albedo },
            _ => BsdfNode::Diffuse { color: albedo },
        };
        let bsdf = nodes.intern_bsdf(bsdf);
        Arc::new(Material { bsdf, emission: None })
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SphereJson {
    pub pos: PosJson,
    pub radius: f64,
    #[serde(default)]
    pub material: MaterialJson,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PosJson {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Z")]
    pub z: f64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MeshJson {
    pub file_name: String,
    #[serde(default)]
    pub transforms: Vec<TransformJson>,
    #[serde(default)]
    pub material: MaterialJson,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AmbientColorJson {
    pub down: ColorJson,
    pub up: ColorJson,
    #[serde(default)]
    pub hdr: Option<String>,
    #[serde(default)]
    pub offset: Option<f64>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RendererJson {
    #[serde(default = "default_threads")]
    pub thread_count: usize,
    #[serde(default = "default_samples")]
    pub sample_count: u32,
    #[serde(default = "default_bounces")]
    pub bounces: u32,
    #[serde(default = "default_tile")]
    pub tile_width: u32,
    #[serde(default = "default_tile")]
    pub tile_height: u32,
    #[serde(default)]
    pub tile_order: TileOrderJson,
    #[serde(default = "default_true")]
    pub antialiasing: bool,
}

fn default_threads() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
}
fn default_samples() -> u32 {
    64
}
fn default_bounces() -> u32 {
    12
}
fn default_tile() -> u32 {
    32
}
fn default_true() -> bool {
    true
}

#[derive(Deserialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub enum TileOrderJson {
    #[default]
    Normal,
    Random,
    TopToBottom,
    FromMiddle,
    ToMiddle,
}

impl From<TileOrderJson> for TileOrder {
    fn from(t: TileOrderJson) -> Self {
        match t {
            TileOrderJson::Normal => TileOrder::Normal,
            TileOrderJson::Random => TileOrder::Random,
            TileOrderJson::TopToBottom => TileOrder::TopToBottom,
            TileOrderJson::FromMiddle => TileOrder::FromMiddle,
            TileOrderJson::ToMiddle => TileOrder::ToMiddle,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CameraJson {
    #[serde(rename = "FOV", default = "default_fov")]
    pub fov: f64,
    #[serde(default)]
    pub aperture: f64,
    #[serde(default = "default_focus")]
    pub focal_distance: f64,
    #[serde(default)]
    pub transforms: Vec<TransformJson>,
}

fn default_fov() -> f64 {
    60.0
}
fn default_focus() -> f64 {
    1.0
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OutputSceneJson {
    pub output_file_path: String,
    pub output_file_name: String,
    #[serde(default)]
    pub count: u32,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_file_type")]
    pub file_type: String,
    pub ambient_color: AmbientColorJson,
    #[serde(default)]
    pub primitives: Vec<SphereJson>,
    #[serde(default)]
    pub meshes: Vec<MeshJson>,
}

fn default_file_type() -> String {
    "png".to_string()
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DisplayJson {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub is_fullscreen: bool,
    #[serde(default)]
    pub is_borderless: bool,
    #[serde(default = "default_window_scale")]
    pub window_scale: f64,
}

fn default_window_scale() -> f64 {
    1.0
}

#[derive(Deserialize, Debug, Clone)]
pub struct SceneDocument {
    #[serde(default = "default_renderer")]
    pub renderer: RendererJson,
    #[serde(default)]
    pub display: DisplayJson,
    pub camera: CameraJson,
    pub scene: OutputSceneJson,
}

fn default_renderer() -> RendererJson {
    RendererJson {
        thread_count: default_threads(),
        sample_count: default_samples(),
        bounces: default_bounces(),
        tile_width: default_tile(),
        tile_height: default_tile(),
        tile_order: TileOrderJson::default(),
        antialiasing: true,
    }
}

/// Parses the JSON document at `path` into a [`SceneDocument`] (spec §6).
pub fn load(path: &Path) -> Result<SceneDocument> {
    let text = std::fs::read_to_string(path).map_err(|_| RenderError::InputNotFound { path: path.to_path_buf() })?;
    serde_json::from_str(&text).map_err(|e| RenderError::malformed_at(e.to_string(), path.display().to_string()))
}

pub struct OutputConfig {
    pub path: PathBuf,
    pub format: ImageFormat,
}

/// Builds the renderable [`World`] plus render/output settings from a parsed
/// document. `base_dir` resolves mesh `fileName`s relative to the scene
/// file's own directory (spec §6).
pub fn build_world(doc: &SceneDocument, base_dir: &Path) -> Result<(World, RenderConfig, OutputConfig)> {
    let mut nodes = NodeGraph::new();
    let mut instances = Vec::new();

    for sphere_json in &doc.scene.primitives {
        let material = sphere_json.material.build(&mut nodes);
        let mut sphere = Sphere::new(sphere_json.radius, material);
        sphere.ray_offset = sphere_json.radius * 1e-4;
        let transform = Matrix4::translate(sphere_json.pos.x, sphere_json.pos.y, sphere_json.pos.z);
        instances.push(Instance::new(InstanceKind::SphereSolid(Arc::new(sphere)), transform));
    }

    for mesh_json in &doc.scene.meshes {
        let mesh_path = base_dir.join(&mesh_json.file_name);
        let material = mesh_json.material.build(&mut nodes);
        let mesh = obj::load_mesh(&mesh_path, material, &mut nodes)?;
        let transform = compose_transforms(&mesh_json.transforms);
        instances.push(Instance::new(InstanceKind::MeshSolid(Arc::new(mesh)), transform));
    }

    // An empty `primitives`/`meshes` list is a valid, intentionally blank
    // scene (spec §8 scenario 1); `instances` is simply left empty.

    let ambient = &doc.scene.ambient_color;
    let background = match &ambient.hdr {
        Some(hdr_path) => {
            let env = crate::hdr::HdrEnvironment::new(
                super::load_hdr(&base_dir.join(hdr_path))?,
                ambient.offset.unwrap_or(0.0),
            );
            Background::Hdr(Arc::new(env))
        }
        None => Background::Gradient {
            horizon: (&ambient.down).into(),
            zenith: (&ambient.up).into(),
        },
    };

    let mut camera_config = CameraConfig {
        fov_degrees: doc.camera.fov.clamp(0.0, 180.0),
        aperture: doc.camera.aperture,
        focus_dist: doc.camera.focal_distance,
        aspect_ratio: doc.scene.width as f64 / doc.scene.height.max(1) as f64,
        compat: Camera35mmCompat::Enabled,
        ..CameraConfig::default()
    };
    let camera_transform = compose_transforms(&doc.camera.transforms);
    camera_config.look_from = camera_transform.transform_point(Point3::zero());
    camera_config.look_at = camera_transform.transform_point(Point3::new(0.0, 0.0, -1.0));
    if camera_transform.is_rotation() || camera_transform.is_translate() {
        camera_config.vup = camera_transform.transform_dir(Vec3::unit_y());
    }
    let camera = Camera::new(&camera_config);

    let world = World::new(instances, camera, nodes, background);

    let render_config = RenderConfig {
        width: doc.scene.width,
        height: doc.scene.height,
        samples_per_pixel: doc.renderer.sample_count,
        max_depth: doc.renderer.bounces,
        thread_count: doc.renderer.thread_count,
        tile_size: doc.renderer.tile_width.max(1),
        tile_order: doc.renderer.tile_order.into(),
    };

    let format = match doc.scene.file_type.as_str() {
        "bmp" => ImageFormat::Bmp,
        _ => ImageFormat::Png,
    };
    let output = OutputConfig {
        path: PathBuf::from(&doc.scene.output_file_path).join(&doc.scene.output_file_name),
        format,
    };

    Ok((world, render_config, output))
}

pub(crate) fn material_from_mtl(entry: &mtl::MtlMaterial, nodes: &mut NodeGraph) -> Arc<Material> {
    let albedo = nodes.intern_color(ColorNode::Constant(entry.diffuse));
    let roughness_value = 1.0 - entry.specular_exponent.min(1000.0) / 1000.0;
    let roughness = nodes.intern_color(ColorNode::Constant(Color::splat(roughness_value)));

    let bsdf = if entry.dissolve < 1.0 {
        BsdfNode::glass(albedo, roughness, entry.ior)
    } else if entry.specular_exponent > 500.0 {
        BsdfNode::Metal { color: albedo, roughness }
    } else {
        BsdfNode::Diffuse { color: albedo }
    };
    let bsdf = nodes.intern_bsdf(bsdf);
    Arc::new(Material { bsdf, emission: None })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_document_parses() {
        let json = r#"{
            "camera": { "FOV": 90.0, "aperture": 0.0, "focalDistance": 1.0, "transforms": [] },
            "scene": {
                "outputFilePath": ".", "outputFileName": "out", "count": 0,
                "width": 1, "height": 1, "fileType": "png",
                "ambientColor": { "down": {"r":0.0,"g":0.0,"b":0.0}, "up": {"r":1.0,"g":1.0,"b":1.0} },
                "primitives": [], "meshes": []
            }
        }"#;
        let doc: SceneDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.scene.width, 1);
        assert_eq!(doc.renderer.sample_count, default_samples());
    }

    #[test]
    fn transform_list_composes_in_order() {
        let transforms = vec![TransformJson::Translate { x: 1.0, y: 0.0, z: 0.0 }, TransformJson::ScaleUniform { scale: 2.0 }];
        let m = compose_transforms(&transforms);
        let p = m.transform_point(Point3::zero());
        assert!((p.x - 2.0).abs() < 1e-9);
    }
}
