//! Models loaded from disk and drawn with the `model` shader.

use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use fxhash::FxHashMap;
use glam::Mat4;
use glow::HasContext;

use crate::abs::{Mesh, ShaderProgram, Texture2D, TextureKind};
use crate::error::Result;
use crate::scene::{self, ImportedScene, TextureRef, TextureSource};

/// Loads each texture once and hands out shared references afterwards.
/// A failed load is remembered too, so it is reported once per key.
pub struct TextureCache<T> {
    entries: FxHashMap<String, Option<Rc<T>>>,
}

impl<T> Default for TextureCache<T> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<T> TextureCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `key`, running `load` on the first request only.
    /// A load error is logged and `None` is returned for that key from then on.
    pub fn get_or_load<E: fmt::Display>(
        &mut self,
        key: &str,
        load: impl FnOnce() -> std::result::Result<T, E>,
    ) -> Option<Rc<T>> {
        if let Some(entry) = self.entries.get(key) {
            return entry.clone();
        }
        let entry = match load() {
            Ok(value) => Some(Rc::new(value)),
            Err(e) => {
                log::error!("Texture {}: {}", key, e);
                None
            }
        };
        self.entries.insert(key.to_string(), entry.clone());
        entry
    }

    /// Number of textures that loaded.
    pub fn loaded(&self) -> usize {
        self.entries.values().filter(|entry| entry.is_some()).count()
    }
}

/// The kinds the model shader samples that `kinds` has no texture for.
pub fn missing_kinds(kinds: &[TextureKind]) -> Vec<TextureKind> {
    [TextureKind::Diffuse, TextureKind::Specular]
        .into_iter()
        .filter(|kind| !kinds.contains(kind))
        .collect()
}

/// 1x1 textures bound in place of a missing map: white diffuse, black specular.
struct FallbackTextures {
    diffuse: Rc<Texture2D>,
    specular: Rc<Texture2D>,
}

impl FallbackTextures {
    fn new(gl: &Arc<glow::Context>) -> Result<Self> {
        Ok(Self {
            diffuse: Rc::new(Texture2D::from_rgba(gl, 1, 1, &[255, 255, 255, 255])?),
            specular: Rc::new(Texture2D::from_rgba(gl, 1, 1, &[0, 0, 0, 255])?),
        })
    }

    fn for_kind(&self, kind: TextureKind) -> MeshTexture {
        let texture = match kind {
            TextureKind::Diffuse => &self.diffuse,
            TextureKind::Specular => &self.specular,
        };
        MeshTexture {
            kind,
            texture: Rc::clone(texture),
        }
    }
}

/// Sampler uniform names for a mesh's textures, in order. Each kind is
/// numbered from 1: `material.texture_diffuse1`, `material.texture_diffuse2`,
/// `material.texture_specular1`...
pub fn sampler_uniforms(kinds: &[TextureKind]) -> Vec<String> {
    let mut diffuse = 0;
    let mut specular = 0;
    kinds
        .iter()
        .map(|kind| {
            let counter = match kind {
                TextureKind::Diffuse => &mut diffuse,
                TextureKind::Specular => &mut specular,
            };
            *counter += 1;
            format!("material.{}{}", kind.uniform_stem(), counter)
        })
        .collect()
}

/// A texture bound to one sampler of a mesh.
pub struct MeshTexture {
    pub kind: TextureKind,
    pub texture: Rc<Texture2D>,
}

/// One drawable part of a model.
pub struct ModelMesh {
    mesh: Mesh,
    textures: Vec<MeshTexture>,
    samplers: Vec<String>,
    vertex_count: usize,
}

impl ModelMesh {
    pub fn new(mesh: Mesh, textures: Vec<MeshTexture>, vertex_count: usize) -> Self {
        let kinds: Vec<_> = textures.iter().map(|t| t.kind).collect();
        Self {
            mesh,
            samplers: sampler_uniforms(&kinds),
            textures,
            vertex_count,
        }
    }

    /// Binds each texture to its own unit, points the matching sampler at it
    /// and draws. `program` must be in use.
    pub fn draw(&self, gl: &glow::Context, program: &ShaderProgram) {
        for (unit, (texture, sampler)) in self.textures.iter().zip(&self.samplers).enumerate() {
            texture.texture.bind(unit as u32);
            program.set_uniform(sampler, unit as i32);
        }
        self.mesh.draw();
        unsafe {
            gl.active_texture(glow::TEXTURE0);
        }
    }
}

/// Counts shown in the stats panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelStats {
    pub meshes: usize,
    pub textures: usize,
    pub vertices: usize,
    pub triangles: usize,
}

pub struct Model {
    gl: Arc<glow::Context>,
    meshes: Vec<ModelMesh>,
    texture_count: usize,
    pub transform: Mat4,
}

impl Model {
    /// A model with nothing to draw.
    pub fn empty(gl: &Arc<glow::Context>) -> Self {
        Self {
            gl: Arc::clone(gl),
            meshes: Vec::new(),
            texture_count: 0,
            transform: Mat4::IDENTITY,
        }
    }

    pub fn load(gl: &Arc<glow::Context>, path: &Path) -> Result<Self> {
        let scene = scene::import(path)?;
        Self::from_scene(gl, &scene)
    }

    /// Uploads every mesh instance of `scene`. Textures are shared between
    /// meshes; one that fails to load is logged once and left out. A mesh
    /// without a diffuse or specular map gets a 1x1 fallback for it.
    pub fn from_scene(gl: &Arc<glow::Context>, scene: &ImportedScene) -> Result<Self> {
        let mut cache = TextureCache::new();
        let fallback = FallbackTextures::new(gl)?;
        let mut meshes = Vec::new();

        for flat in scene.flatten() {
            let mesh = Mesh::indexed(gl, &flat.vertices, flat.indices, glow::TRIANGLES)?;

            let mut textures = Vec::with_capacity(flat.textures.len());
            for (kind, reference) in flat.textures {
                if let Some(texture) =
                    cache.get_or_load(&reference.key, || load_texture(gl, &scene.directory, reference))
                {
                    textures.push(MeshTexture { kind, texture });
                }
            }
            let kinds: Vec<_> = textures.iter().map(|t| t.kind).collect();
            textures.extend(missing_kinds(&kinds).into_iter().map(|kind| fallback.for_kind(kind)));

            meshes.push(ModelMesh::new(mesh, textures, flat.vertices.len()));
        }

        log::info!(
            "Model ready: {} meshes, {} textures",
            meshes.len(),
            cache.loaded()
        );
        Ok(Self {
            gl: Arc::clone(gl),
            meshes,
            texture_count: cache.loaded(),
            transform: Mat4::IDENTITY,
        })
    }

    /// Draws every mesh; sets the `model` uniform from [`Model::transform`].
    /// `program` must be in use.
    pub fn draw(&self, program: &ShaderProgram) {
        program.set_uniform("model", self.transform);
        for mesh in &self.meshes {
            mesh.draw(&self.gl, program);
        }
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            meshes: self.meshes.len(),
            textures: self.texture_count,
            vertices: self.meshes.iter().map(|m| m.vertex_count).sum(),
            triangles: self.meshes.iter().map(|m| m.mesh.element_count() / 3).sum(),
        }
    }
}

fn load_texture(gl: &Arc<glow::Context>, directory: &Path, reference: &TextureRef) -> Result<Texture2D> {
    match &reference.source {
        TextureSource::File(path) => {
            let full: PathBuf = directory.join(path);
            Texture2D::from_file(gl, &full, false)
        }
        TextureSource::Pixels {
            width,
            height,
            rgba,
        } => Texture2D::from_rgba(gl, *width, *height, rgba),
    }
}
