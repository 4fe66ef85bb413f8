//! Shared configuration for the mask editor
//!
//! This crate is the single source of truth for brush defaults, overlay
//! appearance, mask output and the upload service endpoint. Every value
//! has a default; a JSON file and `MASKPAINT_*` environment variables can
//! override them.

use std::path::Path;

use painting::{
    clears_alpha_threshold, BrushSettings, BrushShape, MaskFormat, MaskSettings, RenderSettings,
    ResampleStrategy, StrokeMode, DEFAULT_BRUSH_SIZE, DRAW_PAINT_ALPHA, DRAW_PAINT_COLOR,
    LIVE_SEGMENT_ALPHA, MASK_ALPHA_THRESHOLD, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Default container width in CSS pixels
pub const DEFAULT_CONTAINER_WIDTH: u32 = 800;

/// Default container height in CSS pixels
pub const DEFAULT_CONTAINER_HEIGHT: u32 = 600;

/// Default API root of the image/mask service
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Mask saves give up after this long
pub const DEFAULT_SAVE_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Area the image is displayed in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Container width in CSS pixels
    pub container_width: u32,
    /// Container height in CSS pixels
    pub container_height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            container_width: DEFAULT_CONTAINER_WIDTH,
            container_height: DEFAULT_CONTAINER_HEIGHT,
        }
    }
}

impl DisplayConfig {
    pub fn new(container_width: u32, container_height: u32) -> Self {
        Self {
            container_width,
            container_height,
        }
    }

    pub fn width_f32(&self) -> f32 {
        self.container_width as f32
    }

    pub fn height_f32(&self) -> f32 {
        self.container_height as f32
    }
}

/// Brush the editor starts with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    pub size: f32,
    pub mode: StrokeMode,
    pub shape: BrushShape,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_BRUSH_SIZE,
            mode: StrokeMode::Draw,
            shape: BrushShape::Round,
        }
    }
}

impl BrushConfig {
    pub fn to_settings(&self) -> BrushSettings {
        BrushSettings::new(self.mode, self.size, self.shape)
    }
}

/// Overlay appearance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub draw_alpha: f32,
    pub live_segment_alpha: f32,
    pub antialias: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            draw_alpha: DRAW_PAINT_ALPHA,
            live_segment_alpha: LIVE_SEGMENT_ALPHA,
            antialias: true,
        }
    }
}

impl RenderConfig {
    pub fn to_settings(&self) -> RenderSettings {
        RenderSettings {
            draw_color: DRAW_PAINT_COLOR,
            draw_alpha: self.draw_alpha,
            live_segment_alpha: self.live_segment_alpha,
            antialias: self.antialias,
        }
    }
}

/// Upload service endpoint and timeouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// API root, without a trailing slash
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub save_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            save_timeout_secs: DEFAULT_SAVE_TIMEOUT_SECS,
        }
    }
}

/// Top-level editor configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub display: DisplayConfig,
    pub brush: BrushConfig,
    pub render: RenderConfig,
    pub mask: MaskSettings,
    pub service: ServiceConfig,
}

impl EditorConfig {
    /// Defaults overridden by `MASKPAINT_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON file, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_json_str(&text)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (an environment in production, a map
    /// in tests). Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(size) = parse_var::<f32>(&lookup, "MASKPAINT_BRUSH_SIZE") {
            self.brush.size = size;
        }
        if let Some(alpha) = parse_var::<f32>(&lookup, "MASKPAINT_DRAW_ALPHA") {
            self.render.draw_alpha = alpha;
        }
        if let Some(antialias) = parse_var::<bool>(&lookup, "MASKPAINT_ANTIALIAS") {
            self.render.antialias = antialias;
        }
        match lookup("MASKPAINT_MASK_FORMAT").as_deref() {
            Some("png") => self.mask.format = MaskFormat::Png,
            Some("jpeg") | Some("jpg") => self.mask.format = MaskFormat::Jpeg,
            Some(other) => warn!("EditorConfig: ignoring MASKPAINT_MASK_FORMAT={}", other),
            None => {}
        }
        match lookup("MASKPAINT_RESAMPLE").as_deref() {
            Some("nearest") => self.mask.strategy = ResampleStrategy::Nearest,
            Some("draw_and_sample") => self.mask.strategy = ResampleStrategy::DrawAndSample,
            Some("replay") => self.mask.strategy = ResampleStrategy::Replay,
            Some(other) => warn!("EditorConfig: ignoring MASKPAINT_RESAMPLE={}", other),
            None => {}
        }
        if let Some(url) = lookup("MASKPAINT_API_URL") {
            self.service.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "MASKPAINT_SAVE_TIMEOUT_SECS") {
            self.service.save_timeout_secs = secs;
        }
        if let Some(value) = lookup("MASKPAINT_CONTAINER") {
            match parse_size(&value) {
                Some((w, h)) => self.display = DisplayConfig::new(w, h),
                None => warn!("EditorConfig: ignoring MASKPAINT_CONTAINER={}", value),
            }
        }
    }

    /// Check ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE).contains(&self.brush.size) {
            return Err(ConfigError::Invalid(format!(
                "brush size {} outside {}..={}",
                self.brush.size, MIN_BRUSH_SIZE, MAX_BRUSH_SIZE
            )));
        }
        for (name, alpha) in [
            ("draw_alpha", self.render.draw_alpha),
            ("live_segment_alpha", self.render.live_segment_alpha),
        ] {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(ConfigError::Invalid(format!("{} {} outside 0..=1", name, alpha)));
            }
        }
        // Overlay paint has to survive thresholding, live segments included
        let live = self.render.draw_alpha * self.render.live_segment_alpha;
        for (name, alpha) in [("draw_alpha", self.render.draw_alpha), ("live segment opacity", live)] {
            if !clears_alpha_threshold(alpha) {
                return Err(ConfigError::Invalid(format!(
                    "{} {} is too faint to reach the mask (alpha threshold {})",
                    name, alpha, MASK_ALPHA_THRESHOLD
                )));
            }
        }
        if self.display.container_width == 0 || self.display.container_height == 0 {
            return Err(ConfigError::Invalid("container has a zero side".to_string()));
        }
        if self.service.base_url.is_empty() {
            return Err(ConfigError::Invalid("empty service base_url".to_string()));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("EditorConfig: ignoring unparseable {}={}", key, raw);
            None
        }
    }
}

/// "800x600" -> (800, 600)
fn parse_size(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.trim().split_once(['x', 'X'])?;
    let w = w.trim().parse().ok().filter(|w: &u32| *w > 0)?;
    let h = h.trim().parse().ok().filter(|h: &u32| *h > 0)?;
    Some((w, h))
}
