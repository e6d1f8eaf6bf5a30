//! Global logger built on `fern`.
//!
//! Lines look like `[12:04:33.120 INFO  learnopengl::demos] Switched to model`
//! and go to stdout and, when configured, to a log file as well.

use std::str::FromStr;

use log::LevelFilter;

use crate::config::LogSettings;
use crate::error::{Error, Result};

/// Picks the level from `RUST_LOG` when it holds a plain level name, otherwise
/// from the settings, falling back to `info`.
pub fn resolve_level(settings: &LogSettings, env: Option<&str>) -> LevelFilter {
    env.and_then(|value| LevelFilter::from_str(value.trim()).ok())
        .or_else(|| LevelFilter::from_str(settings.level.trim()).ok())
        .unwrap_or(LevelFilter::Info)
}

/// Installs the global logger. Call once, early in `main`.
pub fn init(settings: &LogSettings) -> Result<()> {
    let env = std::env::var("RUST_LOG").ok();
    let level = resolve_level(settings, env.as_deref());

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        // the glTF and image decoders are chatty at debug level
        .level_for("gltf", LevelFilter::Warn)
        .level_for("png", LevelFilter::Warn)
        .chain(std::io::stdout());

    if let Some(path) = &settings.file {
        let file = fern::log_file(path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        dispatch = dispatch.chain(file);
    }

    dispatch
        .apply()
        .map_err(|e| Error::Platform(format!("logger already installed: {e}")))?;

    log::debug!("Logging initialised at {}", level);
    Ok(())
}
