use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{RenderError, Result};
use crate::geometry::{Polygon, VertexBuffer};
use crate::math::{Coord, Point3, Vec3};
use crate::mesh::Mesh;
use crate::nodes::{Material, NodeGraph};

use super::mtl;

/// Resolves a Wavefront `f` index: 1-based positive, or negative meaning
/// "relative to the end of the list so far" (spec §6).
fn resolve_index(raw: i64, count: usize) -> Result<u32> {
    let idx = if raw < 0 {
        count as i64 + raw
    } else {
        raw - 1
    };
    if idx < 0 || idx as usize >= count {
        return Err(RenderError::malformed("face index out of range"));
    }
    Ok(idx as u32)
}

struct FaceVertex {
    v: i64,
    vt: Option<i64>,
    vn: Option<i64>,
}

fn parse_face_token(tok: &str) -> Result<FaceVertex> {
    let mut parts = tok.split('/');
    let v = parts
        .next()
        .ok_or_else(|| RenderError::malformed("empty face token"))?
        .parse::<i64>()
        .map_err(|_| RenderError::malformed("non-numeric vertex index"))?;
    let vt = match parts.next() {
        Some("") | None => None,
        Some(s) => Some(s.parse::<i64>().map_err(|_| RenderError::malformed("non-numeric uv index"))?),
    };
    let vn = match parts.next() {
        Some("") | None => None,
        Some(s) => Some(s.parse::<i64>().map_err(|_| RenderError::malformed("non-numeric normal index"))?),
    };
    Ok(FaceVertex { v, vt, vn })
}

/// Parses an OBJ file into a [`Mesh`], resolving any `mtllib`/`usemtl`
/// directives against the sibling `.mtl` file and interning each named
/// material into `nodes`. Faces that never see a `usemtl` directive use
/// `default_material` (spec §6: the JSON scene's own `material` block
/// covers meshes with no embedded material table).
pub fn load_mesh(
    path: &Path,
    default_material: Arc<Material>,
    nodes: &mut NodeGraph,
) -> Result<Mesh> {
    let text = std::fs::read_to_string(path).map_err(|_| RenderError::InputNotFound { path: path.to_path_buf() })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut vb = VertexBuffer::new();
    let mut polygons = Vec::new();
    let mut materials: Vec<Arc<Material>> = vec![default_material];
    let mut material_names: HashMap<String, u32> = HashMap::new();
    let mut current_material: u32 = 0;
    let mut mtl_entries: HashMap<String, mtl::MtlMaterial> = HashMap::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let keyword = tokens.next().unwrap_or("");
        let rest: Vec<&str> = tokens.collect();

        let at = || format!("{}:{}", path.display(), line_no + 1);

        match keyword {
            "v" => {
                let p = parse_vec3(&rest, &at)?;
                vb.push_position(Point3::new(p.x, p.y, p.z));
            }
            "vn" => {
                let n = parse_vec3(&rest, &at)?;
                vb.push_normal(n.normalized());
            }
            "vt" => {
                if rest.len() < 2 {
                    return Err(RenderError::malformed_at("vt needs u and v", at()));
                }
                let u: f64 = rest[0].parse().map_err(|_| RenderError::malformed_at("bad vt u", at()))?;
                let v: f64 = rest[1].parse().map_err(|_| RenderError::malformed_at("bad vt v", at()))?;
                vb.push_uv(Coord::new(u, v));
            }
            "f" => {
                if rest.len() < 3 {
                    return Err(RenderError::malformed_at("face needs at least 3 vertices", at()));
                }
                let verts: Vec<FaceVertex> = rest
                    .iter()
                    .map(|t| parse_face_token(t))
                    .collect::<Result<Vec<_>>>()?;
                // Fan-triangulate polygons with more than 3 vertices.
                for i in 1..verts.len() - 1 {
                    let tri = [&verts[0], &verts[i], &verts[i + 1]];
                    let vertex_index = [
                        resolve_index(tri[0].v, vb.position_count())?,
                        resolve_index(tri[1].v, vb.position_count())?,
                        resolve_index(tri[2].v, vb.position_count())?,
                    ];
                    let has_normals = tri.iter().all(|t| t.vn.is_some());
                    let normal_index = if has_normals {
                        [
                            resolve_index(tri[0].vn.unwrap(), vb.normal_count())?,
                            resolve_index(tri[1].vn.unwrap(), vb.normal_count())?,
                            resolve_index(tri[2].vn.unwrap(), vb.normal_count())?,
                        ]
                    } else {
                        [0, 0, 0]
                    };
                    let has_uvs = tri.iter().all(|t| t.vt.is_some());
                    let uv_index = if has_uvs {
                        [
                            resolve_index(tri[0].vt.unwrap(), vb.uv_count())?,
                            resolve_index(tri[1].vt.unwrap(), vb.uv_count())?,
                            resolve_index(tri[2].vt.unwrap(), vb.uv_count())?,
                        ]
                    } else {
                        [u32::MAX, u32::MAX, u32::MAX]
                    };
                    polygons.push(Polygon {
                        vertex_index,
                        normal_index,
                        uv_index,
                        material_index: current_material,
                        has_normals,
                    });
                }
            }
            "mtllib" => {
                if let Some(name) = rest.first() {
                    let mtl_path = base_dir.join(name);
                    mtl_entries.extend(mtl::parse(&mtl_path)?);
                }
            }
            "usemtl" => {
                if let Some(name) = rest.first() {
                    current_material = *material_names.entry(name.to_string()).or_insert_with(|| {
                        let material = match mtl_entries.get(*name) {
                            Some(entry) => super::json::material_from_mtl(entry, nodes),
                            None => Arc::clone(&materials[0]),
                        };
                        materials.push(material);
                        (materials.len() - 1) as u32
                    });
                }
            }
            "o" | "g" | "s" => {}
            _ => {}
        }
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh")
        .to_string();

    Ok(Mesh::build(name, polygons, Arc::new(vb), materials, 1e-4))
}

fn parse_vec3(rest: &[&str], at: &dyn Fn() -> String) -> Result<Vec3> {
    if rest.len() < 3 {
        return Err(RenderError::malformed_at("expected 3 components", at()));
    }
    let x: f64 = rest[0].parse().map_err(|_| RenderError::malformed_at("bad x", at()))?;
    let y: f64 = rest[1].parse().map_err(|_| RenderError::malformed_at("bad y", at()))?;
    let z: f64 = rest[2].parse().map_err(|_| RenderError::malformed_at("bad z", at()))?;
    Ok(Vec3::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("scene_io_obj_test_{}.obj", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn default_material() -> Arc<Material> {
        let mut nodes = NodeGraph::new();
        let bsdf = nodes.intern_bsdf(crate::nodes::BsdfNode::Diffuse {
            color: crate::nodes::ColorNodeId::NONE,
        });
        Arc::new(Material { bsdf, emission: None })
    }

    #[test]
    fn triangle_face_parses() {
        let path = write_temp("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let mut nodes = NodeGraph::new();
        let mesh = load_mesh(&path, default_material(), &mut nodes).unwrap();
        assert!(mesh.bbox().max.x >= 1.0);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn quad_face_triangulates_into_two() {
        let path = write_temp("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n");
        let mut nodes = NodeGraph::new();
        let mesh = load_mesh(&path, default_material(), &mut nodes).unwrap();
        assert!(mesh.bbox().max.x >= 1.0 && mesh.bbox().max.y >= 1.0);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn negative_relative_indices_resolve() {
        let path = write_temp("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n");
        let mut nodes = NodeGraph::new();
        let mesh = load_mesh(&path, default_material(), &mut nodes);
        assert!(mesh.is_ok());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_reports_input_not_found() {
        let mut nodes = NodeGraph::new();
        let err = load_mesh(Path::new("/nonexistent/missing.obj"), default_material(), &mut nodes).unwrap_err();
        assert!(matches!(err, RenderError::InputNotFound { .. }));
    }
}
