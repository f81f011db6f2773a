use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use spectacle_vision::FitParams;
use std::path::{Path, PathBuf};

pub static CONFIG_PATH: Lazy<&'static Path> = Lazy::new(|| {
    Path::new(
        option_env!("SPECTACLE_CONFIG_PATH").unwrap_or("/usr/local/etc/spectacle/config.toml"),
    )
});

pub static OVERLAY_PATH: Lazy<&'static Path> = Lazy::new(|| {
    Path::new(
        option_env!("SPECTACLE_OVERLAY_PATH").unwrap_or("/usr/local/etc/spectacle/glasses.png"),
    )
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub camera: String,
    /// Overlay graphic (PNG with transparency).
    pub overlay: PathBuf,
    pub fit_multiplier: f32,
    pub vertical_offset: f32,
    /// Draw markers on the tracked keypoints.
    pub debug: bool,
    pub marker_radius: u32,
}

impl Default for Config {
    fn default() -> Self {
        let fit = FitParams::default();
        Self {
            camera: "/dev/video0".to_string(),
            overlay: OVERLAY_PATH.to_path_buf(),
            fit_multiplier: fit.fit_multiplier,
            vertical_offset: fit.vertical_offset,
            debug: false,
            marker_radius: 2,
        }
    }
}

impl Config {
    pub fn fit_params(&self) -> FitParams {
        FitParams {
            fit_multiplier: self.fit_multiplier,
            vertical_offset: self.vertical_offset,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or(&CONFIG_PATH);
    if !path.exists() {
        log::debug!("no config at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<()> {
    let path = path.unwrap_or(&CONFIG_PATH);
    let data = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data).with_context(|| format!("writing config {}", path.display()))?;
    Ok(())
}
