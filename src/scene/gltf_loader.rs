//! glTF 2.0 import (`.gltf` and `.glb`) through the `gltf` crate.
//!
//! Buffers are read up front. Images are not: a file image becomes a
//! [`TextureRef`] that the model loads later, and embedded images are decoded
//! one at a time, so a broken image only costs its texture.

use std::borrow::Cow;
use std::path::Path;

use fxhash::FxHashMap;
use glam::{Mat4, Vec2, Vec3};

use super::{
    ImportedScene, MaterialData, MeshData, SceneNode, TextureRef, TextureSource, model_directory,
    smooth_normals,
};
use crate::error::Result;
use crate::render::Vertex;

pub(super) fn load(path: &Path) -> Result<ImportedScene> {
    let gltf::Gltf { document, blob } = gltf::Gltf::open(path)?;
    let directory = model_directory(path);
    let buffers = gltf::import_buffers(&document, Some(directory.as_path()), blob)?;

    // one glTF mesh holds several primitives, each becomes a MeshData
    let mut meshes = Vec::new();
    let mut primitives_of_mesh = Vec::with_capacity(document.meshes().len());
    for mesh in document.meshes() {
        let mut indices = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "{}: skipping {:?} primitive in mesh {}",
                    path.display(),
                    primitive.mode(),
                    mesh.index()
                );
                continue;
            }
            let name = match mesh.name() {
                Some(name) => format!("{}.{}", name, primitive.index()),
                None => format!("mesh{}.{}", mesh.index(), primitive.index()),
            };
            if let Some(data) = convert_primitive(name, &primitive, &buffers) {
                indices.push(meshes.len());
                meshes.push(data);
            }
        }
        primitives_of_mesh.push(indices);
    }

    let mut images = ImageResolver::new(&directory, &buffers);
    let materials = document
        .materials()
        .map(|material| convert_material(&material, &mut images))
        .collect();

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut root = SceneNode::new(stem);
    match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => {
            root.children = scene
                .nodes()
                .map(|node| convert_node(&node, &primitives_of_mesh))
                .collect();
        }
        None => log::warn!("{}: file has no scene", path.display()),
    }

    Ok(ImportedScene {
        root,
        meshes,
        materials,
        directory,
    })
}

fn convert_node(node: &gltf::Node, primitives_of_mesh: &[Vec<usize>]) -> SceneNode {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node{}", node.index()));
    let mut scene_node = SceneNode::new(name);
    scene_node.transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        scene_node.meshes = primitives_of_mesh
            .get(mesh.index())
            .cloned()
            .unwrap_or_default();
    }
    scene_node.children = node
        .children()
        .map(|child| convert_node(&child, primitives_of_mesh))
        .collect();
    scene_node
}

fn convert_primitive(
    name: String,
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> Option<MeshData> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

    let Some(positions) = reader.read_positions() else {
        log::warn!("Primitive {} has no positions", name);
        return None;
    };
    let positions: Vec<Vec3> = positions.map(Vec3::from_array).collect();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let normals: Vec<Vec3> = match reader.read_normals() {
        Some(normals) => normals.map(Vec3::from_array).collect(),
        None => smooth_normals(&positions, &indices),
    };
    let tex_coords: Vec<Vec2> = reader
        .read_tex_coords(0)
        .map(|uvs| uvs.into_f32().map(Vec2::from_array).collect())
        .unwrap_or_default();

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            Vertex::new(
                position,
                normals.get(i).copied().unwrap_or(Vec3::ZERO),
                tex_coords.get(i).copied().unwrap_or(Vec2::ZERO),
            )
        })
        .collect();

    Some(MeshData {
        name,
        vertices,
        indices,
        material: primitive.material().index(),
    })
}

/// glTF materials are PBR; only the base colour map has a Phong counterpart.
fn convert_material(material: &gltf::Material, images: &mut ImageResolver) -> MaterialData {
    let diffuse = material
        .pbr_metallic_roughness()
        .base_color_texture()
        .and_then(|info| images.resolve(&info.texture().source()));

    MaterialData {
        name: material
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("material{}", material.index().unwrap_or(0))),
        diffuse: diffuse.into_iter().collect(),
        specular: Vec::new(),
        shininess: None,
    }
}

/// Turns glTF images into texture references, each image at most once.
struct ImageResolver<'a> {
    directory: &'a Path,
    buffers: &'a [gltf::buffer::Data],
    resolved: FxHashMap<usize, Option<TextureRef>>,
}

impl<'a> ImageResolver<'a> {
    fn new(directory: &'a Path, buffers: &'a [gltf::buffer::Data]) -> Self {
        Self {
            directory,
            buffers,
            resolved: FxHashMap::default(),
        }
    }

    fn resolve(&mut self, image: &gltf::Image) -> Option<TextureRef> {
        if let Some(resolved) = self.resolved.get(&image.index()) {
            return resolved.clone();
        }
        let resolved = self.convert(image);
        self.resolved.insert(image.index(), resolved.clone());
        resolved
    }

    fn convert(&self, image: &gltf::Image) -> Option<TextureRef> {
        if let gltf::image::Source::Uri { uri, .. } = image.source() {
            if !uri.starts_with("data:") {
                return Some(TextureRef::file(&decode_uri(uri)));
            }
        }

        let data = match gltf::image::Data::from_source(
            image.source(),
            Some(self.directory),
            self.buffers,
        ) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Image {} could not be decoded: {}", image.index(), e);
                return None;
            }
        };
        let Some(rgba) = to_rgba8(data.format, &data.pixels) else {
            log::warn!("Image {} has unsupported format {:?}", image.index(), data.format);
            return None;
        };
        Some(TextureRef {
            key: format!("#image{}", image.index()),
            source: TextureSource::Pixels {
                width: data.width,
                height: data.height,
                rgba,
            },
        })
    }
}

/// Relative URIs are percent-encoded; file names are not.
fn decode_uri(uri: &str) -> Cow<'_, str> {
    urlencoding::decode(uri).unwrap_or(Cow::Borrowed(uri))
}

/// Expands 8-bit images to RGBA8. Other bit depths are not supported.
fn to_rgba8(format: gltf::image::Format, pixels: &[u8]) -> Option<Vec<u8>> {
    use gltf::image::Format;

    let rgba = match format {
        Format::R8G8B8A8 => pixels.to_vec(),
        Format::R8G8B8 => pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R8 => pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        _ => return None,
    };
    Some(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    // one triangle (0,0,0) (1,0,0) (0,1,0) under a translated parent node
    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "Parent", "translation": [0.0, 0.0, -2.0], "children": [1] },
            { "name": "Tri", "mesh": 0 }
        ],
        "meshes": [{
            "name": "Triangle",
            "primitives": [{ "attributes": { "POSITION": 0 }, "material": 0 }]
        }],
        "materials": [{ "name": "Plain" }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [1.0, 1.0, 0.0]
        }],
        "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
        "buffers": [{
            "byteLength": 36,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
        }]
    }"#;

    // the triangle with a base colour texture pointing at `uri`
    fn textured_triangle(uri: &str) -> String {
        let mut value: serde_json::Value = serde_json::from_str(TRIANGLE_GLTF).unwrap();
        value["images"] = serde_json::json!([{ "uri": uri }]);
        value["textures"] = serde_json::json!([{ "source": 0 }]);
        value["materials"] = serde_json::json!([{
            "name": "Textured",
            "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } }
        }]);
        value.to_string()
    }

    fn load_text(name: &str, text: &str) -> Result<ImportedScene> {
        let dir = std::env::temp_dir().join(format!(
            "learnopengl-gltf-{}-{}",
            std::process::id(),
            name
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{name}.gltf"));
        std::fs::write(&path, text).unwrap();

        let result = load(&path);
        std::fs::remove_dir_all(&dir).unwrap();
        result
    }

    #[test]
    fn imports_node_tree_and_bakes_on_flatten() {
        let scene = load_text("triangle", TRIANGLE_GLTF).unwrap();

        assert_eq!(scene.root.name, "triangle");
        assert_eq!(scene.root.children[0].name, "Parent");
        assert_eq!(scene.root.children[0].children[0].meshes, vec![0]);

        let mesh = &scene.meshes[0];
        assert_eq!(mesh.name, "Triangle.0");
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.material, Some(0));
        assert!(mesh.vertices.iter().all(|v| (v.normal - Vec3::Z).length() < 1e-6));

        assert_eq!(scene.materials[0].name, "Plain");
        assert!(scene.materials[0].diffuse.is_empty());

        let flat = scene.flatten();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].vertices[1].position, Vec3::new(1.0, 0.0, -2.0));
    }

    #[test]
    fn missing_image_file_keeps_the_mesh() {
        let scene = load_text("missing", &textured_triangle("missing.png")).unwrap();

        let flat = scene.flatten();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].vertices.len(), 3);
        assert_eq!(
            scene.materials[0].diffuse,
            vec![TextureRef::file("missing.png")]
        );
    }

    #[test]
    fn image_uris_are_percent_decoded() {
        let scene = load_text("spaced", &textured_triangle("my%20tex.png")).unwrap();

        let diffuse = &scene.materials[0].diffuse[0];
        assert_eq!(diffuse.key, "my tex.png");
        assert_eq!(
            diffuse.source,
            TextureSource::File(std::path::PathBuf::from("my tex.png"))
        );
        assert_eq!(decode_uri("plain.png"), "plain.png");
        assert_eq!(decode_uri("bad%ff.png"), "bad%ff.png");
    }

    #[test]
    fn broken_embedded_image_is_skipped() {
        let text = textured_triangle("data:image/png;base64,AAAA");
        let scene = load_text("embedded", &text).unwrap();

        assert_eq!(scene.meshes.len(), 1);
        assert!(scene.materials[0].diffuse.is_empty());
    }

    #[test]
    fn expands_eight_bit_formats() {
        use gltf::image::Format;

        assert_eq!(
            to_rgba8(Format::R8G8B8, &[1, 2, 3, 4, 5, 6]),
            Some(vec![1, 2, 3, 255, 4, 5, 6, 255])
        );
        assert_eq!(to_rgba8(Format::R8, &[9]), Some(vec![9, 9, 9, 255]));
        assert_eq!(to_rgba8(Format::R8G8, &[7, 128]), Some(vec![7, 7, 7, 128]));
        assert_eq!(to_rgba8(Format::R16, &[0, 0]), None);
    }
}
