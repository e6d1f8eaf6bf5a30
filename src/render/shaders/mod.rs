//! GLSL programs used by the demos.
//!
//! Sources are compiled into the binary. Passing a shader directory reads
//! `<dir>/<name>/vert.glsl` and `<dir>/<name>/frag.glsl` from disk instead.

use std::path::Path;
use std::sync::Arc;

use crate::abs::ShaderProgram;
use crate::error::Result;

/// Vertex and fragment source of one program.
pub struct ShaderSource {
    pub name: &'static str,
    pub vertex: &'static str,
    pub fragment: &'static str,
}

macro_rules! embedded {
    ($name:literal) => {
        ShaderSource {
            name: $name,
            vertex: include_str!(concat!($name, "/vert.glsl")),
            fragment: include_str!(concat!($name, "/frag.glsl")),
        }
    };
}

pub const BASIC: ShaderSource = embedded!("basic");
pub const TEXTURED: ShaderSource = embedded!("textured");
pub const MODEL: ShaderSource = embedded!("model");
pub const LIGHT_CUBE: ShaderSource = embedded!("light_cube");
pub const UI: ShaderSource = embedded!("ui");

/// Compiles and links `source`, or its on-disk counterpart under `shader_dir`.
pub fn load_program(
    gl: &Arc<glow::Context>,
    shader_dir: Option<&Path>,
    source: &ShaderSource,
) -> Result<ShaderProgram> {
    match shader_dir {
        Some(dir) => {
            let dir = dir.join(source.name);
            log::debug!("Loading shader {} from {}", source.name, dir.display());
            ShaderProgram::from_files(gl, &dir.join("vert.glsl"), &dir.join("frag.glsl"))
        }
        None => {
            log::debug!("Compiling embedded shader {}", source.name);
            ShaderProgram::from_sources(gl, source.vertex, source.fragment)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_sources_target_glsl_330_core() {
        for source in [&BASIC, &TEXTURED, &MODEL, &LIGHT_CUBE, &UI] {
            assert!(source.vertex.starts_with("#version 330 core"), "{}", source.name);
            assert!(source.fragment.starts_with("#version 330 core"), "{}", source.name);
        }
    }

    #[test]
    fn model_shader_declares_the_light_rig() {
        for name in ["view_pos", "dir_light", "point_lights[NR_POINT_LIGHTS]", "spot_light", "material"] {
            assert!(MODEL.fragment.contains(name), "missing {name}");
        }
        assert!(MODEL.fragment.contains(&format!(
            "#define NR_POINT_LIGHTS {}",
            crate::render::lighting::POINT_LIGHT_COUNT
        )));
    }
}
