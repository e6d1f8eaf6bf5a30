//! User settings, read from a JSON file.
//!
//! Every field has a default, so a settings file only needs the keys it wants
//! to change:
//!
//! ```json
//! { "demo": "viewport", "model": { "path": "assets/models/glb/helmet.glb" } }
//! ```

use std::path::{Path, PathBuf};

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::demos::DemoKind;
use crate::error::{Error, Result};

const CONFIG_DIR_NAME: &str = "learnopengl";
const CONFIG_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub maximized: bool,
    pub fullscreen: bool,
    pub vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "LearnOpenGL".to_string(),
            width: 1280,
            height: 720,
            maximized: true,
            fullscreen: false,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub path: PathBuf,
    pub scale: f32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("assets/models/obj/backpack/backpack.obj"),
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: [f32; 3],
    pub speed: f32,
    pub sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 5.0],
            speed: crate::camera::SPEED,
            sensitivity: crate::camera::SENSITIVITY,
        }
    }
}

impl CameraSettings {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub clear_color: [f32; 4],
    pub offscreen_width: u32,
    pub offscreen_height: u32,
    pub wireframe: bool,
    /// Read shaders from `<dir>/<name>/{vert,frag}.glsl` instead of the embedded copies.
    pub shader_dir: Option<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_color: [0.1, 0.1, 0.1, 1.0],
            offscreen_width: 1280,
            offscreen_height: 720,
            wireframe: false,
            shader_dir: None,
        }
    }
}

impl RenderSettings {
    pub fn clear_color(&self) -> Vec4 {
        Vec4::from_array(self.clear_color)
    }

    pub fn offscreen_size(&self) -> (u32, u32) {
        (self.offscreen_width.max(1), self.offscreen_height.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `error`, `warn`, `info`, `debug` or `trace`. `RUST_LOG` wins when set.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub demo: DemoKind,
    pub assets_dir: PathBuf,
    pub model: ModelSettings,
    pub camera: CameraSettings,
    pub render: RenderSettings,
    pub log: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            demo: DemoKind::default(),
            assets_dir: PathBuf::from("assets"),
            model: ModelSettings::default(),
            camera: CameraSettings::default(),
            render: RenderSettings::default(),
            log: LogSettings::default(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from the per-user config file, or falls
    /// back to the defaults when neither exists.
    ///
    /// An explicit path that cannot be read is an error; a missing per-user
    /// file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match Self::user_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// `<config dir>/learnopengl/settings.json`, if the platform has a config dir.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Resolves a path relative to the assets directory.
    pub fn asset(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.assets_dir.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.window.title, "LearnOpenGL");
        assert_eq!((settings.window.width, settings.window.height), (1280, 720));
        assert_eq!(settings.camera.position(), Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(settings.render.offscreen_size(), (1280, 720));
        assert_eq!(settings.log.level, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let settings = Settings::from_json(
            r#"{
                "demo": "viewport",
                "window": { "vsync": false },
                "model": { "path": "models/cube.obj" },
                "render": { "offscreen_width": 0, "shader_dir": "shaders" }
            }"#,
        )
        .unwrap();
        assert_eq!(settings.demo, DemoKind::Viewport);
        assert!(!settings.window.vsync);
        assert!(settings.window.maximized);
        assert_eq!(settings.model.path, PathBuf::from("models/cube.obj"));
        assert_eq!(settings.model.scale, 1.0);
        assert_eq!(settings.render.offscreen_size(), (1, 720));
        assert_eq!(settings.render.shader_dir, Some(PathBuf::from("shaders")));
    }

    #[test]
    fn unknown_demo_is_rejected() {
        assert!(Settings::from_json(r#"{ "demo": "shadows" }"#).is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("learnopengl-settings-does-not-exist.json");
        assert!(matches!(
            Settings::load(Some(&path)),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn invalid_file_reports_config_error() {
        let path = std::env::temp_dir().join(format!(
            "learnopengl-settings-invalid-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ \"window\": 3 }").unwrap();
        let result = Settings::load(Some(&path));
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn asset_paths_are_relative_to_assets_dir() {
        let settings = Settings::default();
        assert_eq!(
            settings.asset("textures/container.jpg"),
            PathBuf::from("assets/textures/container.jpg")
        );
    }
}
