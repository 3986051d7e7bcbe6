//! Scene and display configuration
//!
//! [`SceneConfig`] is read from a TOML file at startup; the running app keeps
//! a [`DisplayToggles`] snapshot that the overlay and keyboard edit and the
//! render loop reads once per tick.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, scene::SceneVariant};

/// How object materials are rasterised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Normal,
    Wireframe,
}

impl RenderMode {
    pub fn is_wireframe(&self) -> bool {
        matches!(self, RenderMode::Wireframe)
    }

    pub fn toggled(&self) -> Self {
        match self {
            RenderMode::Normal => RenderMode::Wireframe,
            RenderMode::Wireframe => RenderMode::Normal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Strike Scene".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Startup configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub variant: SceneVariant,
    pub show_stats: bool,
    pub render_mode: RenderMode,
    pub auto_rotate: bool,
    /// Key light intensity; each variant has its own default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_intensity: Option<f32>,
    pub object_count: usize,
    pub animation_speed: f32,
    pub auto_strike: bool,
    /// Fixed RNG seed for reproducible scenes
    pub seed: Option<u64>,
    pub window: WindowConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            variant: SceneVariant::default(),
            show_stats: true,
            render_mode: RenderMode::Normal,
            auto_rotate: true,
            light_intensity: None,
            object_count: 8,
            animation_speed: 1.0,
            auto_strike: false,
            seed: None,
            window: WindowConfig::default(),
        }
    }
}

impl SceneConfig {
    pub const LIGHT_INTENSITY: (f32, f32) = (0.1, 3.0);
    pub const OBJECT_COUNT: (usize, usize) = (3, 20);
    pub const ANIMATION_SPEED: (f32, f32) = (0.1, 3.0);

    pub fn default_for(variant: SceneVariant) -> Self {
        Self {
            variant,
            ..Default::default()
        }
    }

    /// Key light intensity for `variant`, unless the file pinned one
    pub fn light_intensity_for(&self, variant: SceneVariant) -> f32 {
        self.light_intensity
            .unwrap_or_else(|| variant.default_light_intensity())
    }

    /// Loads a TOML file and clamps every value into range
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: SceneConfig = toml::from_str(&contents)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config.sanitized())
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()));
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn sanitized(mut self) -> Self {
        let (lo, hi) = Self::LIGHT_INTENSITY;
        let fallback = self.variant.default_light_intensity();
        self.light_intensity = self.light_intensity.map(|v| clamp_or(v, lo, hi, fallback));
        let (lo, hi) = Self::ANIMATION_SPEED;
        self.animation_speed = clamp_or(self.animation_speed, lo, hi, 1.0);
        let (lo, hi) = Self::OBJECT_COUNT;
        self.object_count = self.object_count.clamp(lo, hi);
        self.window.width = self.window.width.max(1);
        self.window.height = self.window.height.max(1);
        self
    }

    pub fn toggles(&self) -> DisplayToggles {
        DisplayToggles {
            show_stats: self.show_stats,
            render_mode: self.render_mode,
            auto_rotate: self.auto_rotate,
            light_intensity: self.light_intensity_for(self.variant),
            object_count: self.object_count,
            animation_speed: self.animation_speed,
            auto_strike: self.auto_strike,
        }
    }
}

fn clamp_or(value: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        log::warn!("Replacing non-finite config value with {fallback}");
        fallback
    }
}

/// Global toggles read once per tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayToggles {
    pub show_stats: bool,
    pub render_mode: RenderMode,
    pub auto_rotate: bool,
    pub light_intensity: f32,
    pub object_count: usize,
    pub animation_speed: f32,
    pub auto_strike: bool,
}

impl Default for DisplayToggles {
    fn default() -> Self {
        SceneConfig::default().toggles()
    }
}

impl DisplayToggles {
    pub fn toggle_wireframe(&mut self) {
        self.render_mode = self.render_mode.toggled();
    }

    pub fn set_object_count(&mut self, count: usize) {
        let (lo, hi) = SceneConfig::OBJECT_COUNT;
        self.object_count = count.clamp(lo, hi);
    }
}
