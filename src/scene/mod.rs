//! Format-independent model import.
//!
//! Importers turn a file into an [`ImportedScene`]: a node tree referencing
//! shared meshes and materials. [`ImportedScene::flatten`] walks the tree and
//! hands back one [`FlatMesh`] per mesh instance with its world transform baked
//! into the vertices, ready to be uploaded.

mod gltf_loader;
mod obj;

use std::path::{Path, PathBuf};

use glam::{Mat3, Mat4, Vec3};

use crate::abs::TextureKind;
use crate::error::{Error, Result};
use crate::render::Vertex;

/// Where the pixels of a texture come from.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    /// A file, relative to [`ImportedScene::directory`].
    File(PathBuf),
    /// Pixels embedded in the model file, already expanded to RGBA8.
    Pixels {
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    },
}

/// A texture used by a material. Equal keys mean the same texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureRef {
    pub key: String,
    pub source: TextureSource,
}

impl TextureRef {
    /// A file reference; the key is the path with `/` separators.
    pub fn file(path: &str) -> Self {
        let normalized = path.trim().replace('\\', "/");
        Self {
            key: normalized.clone(),
            source: TextureSource::File(PathBuf::from(normalized)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub diffuse: Vec<TextureRef>,
    pub specular: Vec<TextureRef>,
    pub shininess: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Transform relative to the parent node.
    pub transform: Mat4,
    /// Indices into [`ImportedScene::meshes`].
    pub meshes: Vec<usize>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Mat4::IDENTITY,
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedScene {
    pub root: SceneNode,
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialData>,
    /// Directory of the model file; file textures are relative to it.
    pub directory: PathBuf,
}

/// One mesh instance in world space.
#[derive(Debug, Clone)]
pub struct FlatMesh<'a> {
    pub name: &'a str,
    pub vertices: Vec<Vertex>,
    pub indices: &'a [u32],
    /// Diffuse maps first, then specular maps, each in material order.
    pub textures: Vec<(TextureKind, &'a TextureRef)>,
}

/// Imports a model, picking the importer from the file extension.
pub fn import(path: &Path) -> Result<ImportedScene> {
    log::info!("Loading model: {}", path.display());
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let scene = match extension.as_deref() {
        Some("obj") => obj::load(path)?,
        Some("gltf" | "glb") => gltf_loader::load(path)?,
        _ => return Err(Error::UnsupportedFormat(path.display().to_string())),
    };
    log::debug!(
        "{}: {} meshes, {} materials",
        path.display(),
        scene.meshes.len(),
        scene.materials.len()
    );
    Ok(scene)
}

/// Directory that relative texture paths of `path` are resolved against.
pub fn model_directory(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

impl ImportedScene {
    /// Collects every mesh instance, depth-first: a node's own meshes come
    /// before those of its children.
    pub fn flatten(&self) -> Vec<FlatMesh<'_>> {
        let mut out = Vec::new();
        self.flatten_node(&self.root, Mat4::IDENTITY, &mut out);
        out
    }

    fn flatten_node<'a>(&'a self, node: &'a SceneNode, parent: Mat4, out: &mut Vec<FlatMesh<'a>>) {
        let world = parent * node.transform;

        for &index in &node.meshes {
            let Some(mesh) = self.meshes.get(index) else {
                log::warn!("Node {} references missing mesh {}", node.name, index);
                continue;
            };
            out.push(FlatMesh {
                name: &mesh.name,
                vertices: bake_transform(&mesh.vertices, world),
                indices: &mesh.indices,
                textures: self.textures_of(mesh),
            });
        }

        for child in &node.children {
            self.flatten_node(child, world, out);
        }
    }

    fn textures_of(&self, mesh: &MeshData) -> Vec<(TextureKind, &TextureRef)> {
        let Some(material) = mesh.material.and_then(|i| self.materials.get(i)) else {
            return Vec::new();
        };
        material
            .diffuse
            .iter()
            .map(|t| (TextureKind::Diffuse, t))
            .chain(material.specular.iter().map(|t| (TextureKind::Specular, t)))
            .collect()
    }
}

fn bake_transform(vertices: &[Vertex], transform: Mat4) -> Vec<Vertex> {
    if transform == Mat4::IDENTITY {
        return vertices.to_vec();
    }
    let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();
    vertices
        .iter()
        .map(|v| Vertex {
            position: transform.transform_point3(v.position),
            normal: (normal_matrix * v.normal).normalize_or_zero(),
            tex_coords: v.tex_coords,
        })
        .collect()
}

/// Per-vertex normals averaged from the faces around each vertex, weighted by
/// face area. Vertices on no (or only degenerate) faces get a zero normal.
pub fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        // the cross product's length is twice the triangle area
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals.iter().map(|n| n.normalize_or_zero()).collect()
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    fn triangle(name: &str, material: Option<usize>) -> MeshData {
        MeshData {
            name: name.to_string(),
            vertices: vec![
                Vertex::new(Vec3::ZERO, Vec3::Z, Vec2::ZERO),
                Vertex::new(Vec3::X, Vec3::Z, Vec2::X),
                Vertex::new(Vec3::Y, Vec3::Z, Vec2::Y),
            ],
            indices: vec![0, 1, 2],
            material,
        }
    }

    fn scene() -> ImportedScene {
        let mut root = SceneNode::new("root");
        root.meshes = vec![0];

        let mut child = SceneNode::new("child");
        child.transform = Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0));
        child.meshes = vec![1];

        let mut grandchild = SceneNode::new("grandchild");
        grandchild.transform = Mat4::from_scale(Vec3::splat(2.0));
        grandchild.meshes = vec![2, 0];
        child.children.push(grandchild);

        let sibling = {
            let mut node = SceneNode::new("sibling");
            node.meshes = vec![3];
            node
        };
        root.children = vec![child, sibling];

        ImportedScene {
            root,
            meshes: vec![
                triangle("a", Some(0)),
                triangle("b", None),
                triangle("c", Some(0)),
                triangle("d", Some(7)),
            ],
            materials: vec![MaterialData {
                name: "mat".to_string(),
                diffuse: vec![TextureRef::file("d1.png"), TextureRef::file("d2.png")],
                specular: vec![TextureRef::file("s1.png")],
                shininess: None,
            }],
            directory: PathBuf::from("models"),
        }
    }

    #[test]
    fn flatten_is_depth_first_with_own_meshes_first() {
        let scene = scene();
        let names: Vec<_> = scene.flatten().iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["a", "b", "c", "a", "d"]);
    }

    #[test]
    fn flatten_bakes_world_transforms() {
        let scene = scene();
        let flat = scene.flatten();

        assert_eq!(flat[0].vertices, scene.meshes[0].vertices);
        assert_eq!(flat[1].vertices[1].position, Vec3::new(1.0, 0.0, -2.0));
        // grandchild: translate(parent) * scale(2)
        assert_eq!(flat[2].vertices[1].position, Vec3::new(2.0, 0.0, -2.0));
        assert!((flat[2].vertices[0].normal - Vec3::Z).length() < 1e-6);
        assert_eq!(flat[2].indices, &[0, 1, 2]);
    }

    #[test]
    fn flatten_orders_textures_diffuse_then_specular() {
        let scene = scene();
        let flat = scene.flatten();
        let textures: Vec<_> = flat[0]
            .textures
            .iter()
            .map(|(kind, t)| (*kind, t.key.as_str()))
            .collect();
        assert_eq!(
            textures,
            vec![
                (TextureKind::Diffuse, "d1.png"),
                (TextureKind::Diffuse, "d2.png"),
                (TextureKind::Specular, "s1.png"),
            ]
        );
        assert!(flat[1].textures.is_empty());
        // dangling material index
        assert!(flat[4].textures.is_empty());
    }

    #[test]
    fn non_uniform_scale_keeps_normals_perpendicular() {
        let mut scene = scene();
        scene.root.transform = Mat4::from_scale(Vec3::new(1.0, 4.0, 1.0));
        scene.meshes[0].vertices[0].normal = Vec3::new(1.0, 1.0, 0.0).normalize();

        let flat = scene.flatten();
        let normal = flat[0].vertices[0].normal;
        assert!((normal.length() - 1.0).abs() < 1e-5);
        // the surface tangent (1, -1, 0) becomes (1, -4, 0) under the scale
        assert!(normal.dot(Vec3::new(1.0, -4.0, 0.0)).abs() < 1e-5);
    }

    #[test]
    fn smooth_normals_average_adjacent_faces() {
        // two triangles folded along the x axis: one in the XY plane, one in XZ
        let positions = [
            Vec3::ZERO,
            Vec3::X,
            Vec3::Y,
            Vec3::NEG_Z,
            Vec3::new(5.0, 5.0, 5.0),
        ];
        let indices = [0, 1, 2, 0, 1, 3];
        let normals = smooth_normals(&positions, &indices);

        assert!((normals[2] - Vec3::Z).length() < 1e-6);
        assert!((normals[3] - Vec3::Y).length() < 1e-6);
        let shared = Vec3::new(0.0, 1.0, 1.0).normalize();
        assert!((normals[0] - shared).length() < 1e-6);
        assert!((normals[1] - shared).length() < 1e-6);
        assert_eq!(normals[4], Vec3::ZERO);
    }

    #[test]
    fn smooth_normals_ignore_degenerate_triangles() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.0, 0.0)];
        let normals = smooth_normals(&positions, &[0, 1, 2]);
        assert!(normals.iter().all(|n| *n == Vec3::ZERO));
    }

    #[test]
    fn file_refs_normalise_separators() {
        let texture = TextureRef::file(" textures\\diffuse.png");
        assert_eq!(texture.key, "textures/diffuse.png");
        assert_eq!(
            texture.source,
            TextureSource::File(PathBuf::from("textures/diffuse.png"))
        );
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = import(Path::new("model.fbx")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
        assert!(matches!(
            import(Path::new("no_extension")),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn model_directory_is_parent() {
        assert_eq!(
            model_directory(Path::new("assets/models/backpack.obj")),
            PathBuf::from("assets/models")
        );
        assert_eq!(model_directory(Path::new("cube.obj")), PathBuf::from(""));
    }
}
