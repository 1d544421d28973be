// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Renderer configuration.
//!
//! `RenderConfig` is read from TOML once at startup and kept in a global
//! `OnceLock`, every field has a default so an empty file is valid:
//!
//! ```toml
//! width = 640
//! height = 400
//! pixel_format = "rgb555"
//! shape_format = "three_do"
//! palette_format = "three_do"
//! max_shape_depth = 32
//! screenshot_dir = "shots"
//! log_level = "debug"
//! ```

use crate::render::page::PixelFormat;
use crate::render::palette::PaletteFormat;
use crate::render::shape::{ShapeFormat, DEFAULT_MAX_DEPTH};
use crate::{GFX_H, GFX_W};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

// ============================================================================
// Render Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Page width in pixels
    pub width: usize,
    /// Page height in pixels
    pub height: usize,
    pub pixel_format: PixelFormat,
    pub shape_format: ShapeFormat,
    pub palette_format: PaletteFormat,
    /// Nested shape groups allowed before a shape is abandoned
    pub max_shape_depth: usize,
    /// Directory receiving screenshot-N.png
    pub screenshot_dir: String,
    pub log_level: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: GFX_W,
            height: GFX_H,
            pixel_format: PixelFormat::Clut,
            shape_format: ShapeFormat::Generic,
            palette_format: PaletteFormat::Amiga,
            max_shape_depth: DEFAULT_MAX_DEPTH,
            screenshot_dir: ".".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, String> {
        let cfg: RenderConfig =
            toml::from_str(s).map_err(|e| format!("Invalid render config: {}", e))?;
        if cfg.width == 0 || cfg.height == 0 {
            return Err(format!("Invalid page size {}x{}", cfg.width, cfg.height));
        }
        Ok(cfg)
    }

    pub fn to_toml_string(&self) -> Result<String, String> {
        toml::to_string(self).map_err(|e| e.to_string())
    }

    /// `log_level` as a filter, unknown names fall back to Info
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }
}

/// Reads a TOML config file
pub fn load_render_config<P: AsRef<Path>>(path: P) -> Result<RenderConfig, String> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config '{}': {}", path.display(), e))?;
    RenderConfig::from_toml_str(&text)
}

/// Global render configuration - initialized once at startup
pub static RENDER_CONFIG: OnceLock<RenderConfig> = OnceLock::new();

/// Initialize the global render configuration
///
/// Later calls are ignored.
pub fn init_render_config(cfg: RenderConfig) {
    let _ = RENDER_CONFIG.set(cfg);
}

/// Get a reference to the global render configuration
///
/// If not initialized, returns the default 320x200 indexed configuration.
pub fn get_render_config() -> &'static RenderConfig {
    RENDER_CONFIG.get_or_init(RenderConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(RenderConfig::from_toml_str("").unwrap(), RenderConfig::default());
    }

    #[test]
    fn toml_fields() {
        let cfg = RenderConfig::from_toml_str(
            r#"
width = 640
height = 400
pixel_format = "rgb555"
shape_format = "three_do"
palette_format = "ega"
log_level = "debug"
"#,
        )
        .unwrap();
        assert_eq!((cfg.width, cfg.height), (640, 400));
        assert_eq!(cfg.pixel_format, PixelFormat::Rgb555);
        assert_eq!(cfg.shape_format, ShapeFormat::ThreeDo);
        assert_eq!(cfg.palette_format, PaletteFormat::Ega);
        assert_eq!(cfg.max_shape_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(cfg.level_filter(), LevelFilter::Debug);
    }

    #[test]
    fn bad_configs_are_rejected() {
        assert!(RenderConfig::from_toml_str("width = 0").is_err());
        assert!(RenderConfig::from_toml_str("pixel_format = \"rgba\"").is_err());
        let cfg = RenderConfig {
            log_level: "loud".to_string(),
            ..Default::default()
        };
        assert_eq!(cfg.level_filter(), LevelFilter::Info);
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = RenderConfig {
            width: 960,
            screenshot_dir: "shots".to_string(),
            ..Default::default()
        };
        let text = cfg.to_toml_string().unwrap();
        assert_eq!(RenderConfig::from_toml_str(&text).unwrap(), cfg);
    }

    #[test]
    fn global_config_defaults() {
        let cfg = get_render_config();
        assert!(cfg.width > 0 && cfg.height > 0);
    }
}
