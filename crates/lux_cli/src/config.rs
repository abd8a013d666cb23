//! Camera configuration layering: scene defaults, then the JSON file, then
//! command line flags.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use lux_renderer::CameraConfig;
use serde_json::Value;

use crate::cli::Args;

/// Load a camera configuration from a JSON file on top of `base`.
///
/// Fields missing from the file keep their value from `base`.
pub fn load_camera_config(path: &Path, base: &CameraConfig) -> Result<CameraConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let overrides: Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    merge_camera_config(base, overrides)
        .with_context(|| format!("Invalid settings in config file {}", path.display()))
}

/// Overlay the fields of a JSON object onto a configuration.
fn merge_camera_config(base: &CameraConfig, overrides: Value) -> Result<CameraConfig> {
    let Value::Object(fields) = overrides else {
        bail!("expected a JSON object with camera settings");
    };

    let mut merged = serde_json::to_value(base)?;
    if let Value::Object(target) = &mut merged {
        target.extend(fields);
    }
    Ok(serde_json::from_value(merged)?)
}

/// Apply command line overrides on top of a configuration.
pub fn apply_overrides(mut config: CameraConfig, args: &Args) -> CameraConfig {
    if let Some(width) = args.width {
        config.image_width = width;
    }
    if let Some(samples) = args.samples {
        config.sample_size = samples;
    }
    if let Some(max_depth) = args.max_depth {
        config.max_depth = max_depth;
    }
    config
}

/// Build the final, validated camera configuration for a render.
pub fn resolve_camera_config(args: &Args, scene_camera: CameraConfig) -> Result<CameraConfig> {
    let base = match &args.config {
        Some(path) => {
            log::info!("Loading camera config from {}", path.display());
            load_camera_config(path, &scene_camera)?
        }
        None => scene_camera,
    };

    let config = apply_overrides(base, args);
    config.validate().context("Invalid camera configuration")?;
    log::debug!("Camera config: {:?}", config);
    Ok(config)
}
