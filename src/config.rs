//! Room configuration.
//!
//! Every field has a default, so an empty file (or no file at all) gives the
//! stock room:
//!
//! ```toml
//! [assets]
//! root = "static"
//! model = "models/Room/bakedmodel.glb"
//! load_timeout_secs = 30.0
//!
//! [camera]
//! fov = 75.0
//! position = [2.0, 2.0, 2.0]
//!
//! [display]
//! clear_color = "#010101"
//! pixel_density_cap = 2.0
//! ```

use crate::error::{SceneError, SceneResult};
use crate::scene::{material::Color, DuplicatePolicy};
use serde::Deserialize;
use std::{path::Path, path::PathBuf, time::Duration};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub baked: String,
    pub venom: String,
    pub curtain1: String,
    pub curtain2: String,
    pub floor: String,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            baked: "baked.jpg".into(),
            venom: "venom.jpg".into(),
            curtain1: "curtain1.jpg".into(),
            curtain2: "curtain2.jpg".into(),
            floor: "floor3.jpg".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub root: PathBuf,
    pub model: String,
    pub textures: TextureConfig,
    /// No timeout when unset.
    pub load_timeout_secs: Option<f32>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("static"),
            model: "models/Room/bakedmodel.glb".into(),
            textures: TextureConfig::default(),
            load_timeout_secs: None,
        }
    }
}

impl AssetConfig {
    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_secs
            .and_then(|secs| Duration::try_from_secs_f32(secs).ok())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub damping: bool,
    pub damping_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 100.0,
            position: [2.0, 2.0, 2.0],
            target: [0.0, 0.75, 0.0],
            damping: true,
            damping_factor: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub pixel_density_cap: f32,
    pub clear_color: Color,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            pixel_density_cap: 2.0,
            clear_color: Color::from_hex(0x010101),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    pub duplicates: DuplicatePolicy,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Clip to loop once the model is in; nothing plays when unset.
    pub autoplay: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub assets: AssetConfig,
    pub camera: CameraConfig,
    pub display: DisplayConfig,
    pub binding: BindingConfig,
    pub animation: AnimationConfig,
}

impl RoomConfig {
    pub fn from_toml(content: &str) -> SceneResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| SceneError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> SceneResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SceneError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml(&content)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> SceneResult<()> {
        let camera = &self.camera;
        if !(camera.fov > 0.0 && camera.fov < 180.0) {
            return Err(SceneError::Config(format!(
                "camera.fov must be in (0, 180), got {}",
                camera.fov
            )));
        }
        if !(camera.near > 0.0 && camera.near < camera.far && camera.far.is_finite()) {
            return Err(SceneError::Config(format!(
                "camera clip range {}..{} is empty",
                camera.near, camera.far
            )));
        }
        if !(0.0..=1.0).contains(&camera.damping_factor) {
            return Err(SceneError::Config(
                "camera.damping_factor must be in [0, 1]".into(),
            ));
        }
        if self.display.width == 0 || self.display.height == 0 {
            return Err(SceneError::Config("display size must be non-zero".into()));
        }
        let cap = self.display.pixel_density_cap;
        if !(cap.is_finite() && cap > 0.0) {
            return Err(SceneError::Config(
                "display.pixel_density_cap must be positive".into(),
            ));
        }
        if let Some(secs) = self.assets.load_timeout_secs {
            if !(secs.is_finite() && secs > 0.0) || Duration::try_from_secs_f32(secs).is_err() {
                return Err(SceneError::Config(format!(
                    "assets.load_timeout_secs must be a positive number of seconds, got {secs}"
                )));
            }
        }
        Ok(())
    }
}
