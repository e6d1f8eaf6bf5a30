//! Wavefront OBJ import through `tobj`.

use std::path::Path;

use glam::{Vec2, Vec3};

use super::{ImportedScene, MaterialData, MeshData, SceneNode, TextureRef, model_directory, smooth_normals};
use crate::error::Result;
use crate::render::Vertex;

pub(super) fn load(path: &Path) -> Result<ImportedScene> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )?;

    let materials = materials.unwrap_or_else(|e| {
        log::warn!("{}: no materials loaded ({})", path.display(), e);
        Vec::new()
    });

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut root = SceneNode::new(stem);

    let mut meshes = Vec::with_capacity(models.len());
    for (index, model) in models.into_iter().enumerate() {
        let mut node = SceneNode::new(model.name.clone());
        node.meshes.push(index);
        root.children.push(node);
        meshes.push(convert_mesh(model, materials.len()));
    }

    Ok(ImportedScene {
        root,
        meshes,
        materials: materials.iter().map(convert_material).collect(),
        directory: model_directory(path),
    })
}

fn convert_mesh(model: tobj::Model, material_count: usize) -> MeshData {
    let mesh = model.mesh;
    let positions: Vec<Vec3> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0], p[1], p[2]))
        .collect();

    let normals: Vec<Vec3> = if mesh.normals.len() == mesh.positions.len() {
        mesh.normals
            .chunks_exact(3)
            .map(|n| Vec3::new(n[0], n[1], n[2]))
            .collect()
    } else {
        smooth_normals(&positions, &mesh.indices)
    };

    let vertices = positions
        .iter()
        .zip(&normals)
        .enumerate()
        .map(|(i, (&position, &normal))| {
            // OBJ puts v = 0 at the bottom of the image, GL samples row 0 first
            let tex_coords = match (mesh.texcoords.get(i * 2), mesh.texcoords.get(i * 2 + 1)) {
                (Some(&u), Some(&v)) => Vec2::new(u, 1.0 - v),
                _ => Vec2::ZERO,
            };
            Vertex::new(position, normal, tex_coords)
        })
        .collect();

    MeshData {
        name: model.name,
        vertices,
        indices: mesh.indices,
        material: mesh.material_id.filter(|&id| id < material_count),
    }
}

fn convert_material(material: &tobj::Material) -> MaterialData {
    let texture = |name: &Option<String>| {
        name.as_deref()
            .filter(|n| !n.trim().is_empty())
            .map(TextureRef::file)
            .into_iter()
            .collect::<Vec<_>>()
    };

    MaterialData {
        name: material.name.clone(),
        diffuse: texture(&material.diffuse_texture),
        specular: texture(&material.specular_texture),
        shininess: material.shininess,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::abs::TextureKind;
    use crate::scene::TextureSource;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!(
                "learnopengl-obj-{}-{}",
                name,
                std::process::id()
            ));
            std::fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn write(&self, name: &str, contents: &str) -> PathBuf {
            let path = self.0.join(name);
            std::fs::write(&path, contents).unwrap();
            path
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    const QUAD_OBJ: &str = "\
mtllib quad.mtl
o Quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
usemtl Painted
f 1/1 2/2 3/3 4/4
o Bare
v 0 0 1
v 1 0 1
v 0 1 1
f 5 6 7
";

    const QUAD_MTL: &str = "\
newmtl Painted
Ns 32
map_Kd textures\\paint.png
map_Ks spec.png
";

    #[test]
    fn imports_objects_as_child_nodes() {
        let dir = TempDir::new("nodes");
        dir.write("quad.mtl", QUAD_MTL);
        let path = dir.write("quad.obj", QUAD_OBJ);

        let scene = load(&path).unwrap();
        assert_eq!(scene.root.name, "quad");
        let children: Vec<_> = scene.root.children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(children, vec!["Quad", "Bare"]);
        assert_eq!(scene.directory, dir.0);

        // the quad is triangulated
        assert_eq!(scene.meshes[0].indices.len(), 6);
        assert_eq!(scene.meshes[0].vertices.len(), 4);
        assert_eq!(scene.meshes[0].material, Some(0));
    }

    #[test]
    fn flips_v_and_generates_normals() {
        let dir = TempDir::new("uv");
        dir.write("quad.mtl", QUAD_MTL);
        let path = dir.write("quad.obj", QUAD_OBJ);

        let scene = load(&path).unwrap();
        let quad = &scene.meshes[0];
        let top_right = quad
            .vertices
            .iter()
            .find(|v| v.position == Vec3::new(1.0, 1.0, 0.0))
            .unwrap();
        assert_eq!(top_right.tex_coords, Vec2::new(1.0, 0.0));
        assert!(quad.vertices.iter().all(|v| (v.normal - Vec3::Z).length() < 1e-6));

        // no texture coordinates at all
        assert!(scene.meshes[1].vertices.iter().all(|v| v.tex_coords == Vec2::ZERO));
    }

    #[test]
    fn reads_material_textures() {
        let dir = TempDir::new("mtl");
        dir.write("quad.mtl", QUAD_MTL);
        let path = dir.write("quad.obj", QUAD_OBJ);

        let scene = load(&path).unwrap();
        let material = &scene.materials[0];
        assert_eq!(material.name, "Painted");
        assert_eq!(material.shininess, Some(32.0));
        assert_eq!(material.diffuse[0].key, "textures/paint.png");
        assert_eq!(
            material.specular[0].source,
            TextureSource::File(PathBuf::from("spec.png"))
        );

        let flat = scene.flatten();
        let kinds: Vec<_> = flat[0].textures.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(kinds, vec![TextureKind::Diffuse, TextureKind::Specular]);
    }

    #[test]
    fn missing_mtl_still_loads_geometry() {
        let dir = TempDir::new("nomtl");
        let path = dir.write("quad.obj", QUAD_OBJ);

        let scene = load(&path).unwrap();
        assert!(scene.materials.is_empty());
        assert_eq!(scene.meshes.len(), 2);
        assert!(scene.meshes.iter().all(|m| m.material.is_none()));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new("missing");
        assert!(load(&dir.0.join("nothing.obj")).is_err());
    }
}
