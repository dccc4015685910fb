//! Ink configuration system
//!
//! This crate provides centralized configuration for the ink pipeline,
//! loading settings from `ink.toml` with environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// The file is not valid TOML for [`InkConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// What to do with geometry that was cut short by the length budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IncompleteDrawStrategy {
    /// Discard the unfinished contour.
    None,
    /// Keep the truncated geometry as is.
    #[default]
    Full,
    /// Fade the alpha of the affected render groups.
    Fade,
}

impl IncompleteDrawStrategy {
    fn parse(val: &str) -> Option<Self> {
        match val.to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "full" => Some(Self::Full),
            "fade" => Some(Self::Fade),
            _ => None,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InkConfig {
    /// Canvas build settings
    pub canvas: CanvasConfig,
    /// Tessellation backend settings
    pub tessellation: TessellationConfig,
}

/// Canvas configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Device pixels per content point. Drives curve density and pixel hinting.
    pub pixels_per_point: f32,
    /// Extra density knob applied on top of the arc length when flattening curves
    pub curve_multiplier: f32,
    /// Convert triangle lists into strips and indexed elements after a build
    pub convert_triangles_into_strips: bool,
    /// Distance past the length budget over which a fade runs out
    pub over_draw_allowance: f32,
    /// Strategy for fills cut short by the length budget
    pub incomplete_fill: IncompleteDrawStrategy,
    /// Strategy for strokes cut short by the length budget
    pub incomplete_stroke: IncompleteDrawStrategy,
}

/// Tessellation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellationConfig {
    /// Lyon tessellation tolerance
    pub tolerance: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            pixels_per_point: 1.0,
            curve_multiplier: 1.0,
            convert_triangles_into_strips: false,
            over_draw_allowance: 0.0,
            incomplete_fill: IncompleteDrawStrategy::Full,
            incomplete_stroke: IncompleteDrawStrategy::Full,
        }
    }
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self { tolerance: 0.1 }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|val| val == "1" || val.eq_ignore_ascii_case("true"))
}

fn env_f32(name: &str) -> Option<f32> {
    std::env::var(name).ok().and_then(|val| val.parse::<f32>().ok())
}

impl InkConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from `ink.toml` in the current directory,
    /// or return the defaults if it is missing or invalid
    pub fn load_or_default() -> Self {
        Self::load_from_file("ink.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Some(ppp) = env_f32("INK_PIXELS_PER_POINT") {
            self.canvas.pixels_per_point = ppp;
        }
        if let Some(mult) = env_f32("INK_CURVE_MULTIPLIER") {
            self.canvas.curve_multiplier = mult;
        }
        if let Some(flag) = env_flag("INK_CONVERT_STRIPS") {
            self.canvas.convert_triangles_into_strips = flag;
        }
        if let Some(allowance) = env_f32("INK_OVER_DRAW_ALLOWANCE") {
            self.canvas.over_draw_allowance = allowance;
        }
        if let Some(strategy) = std::env::var("INK_INCOMPLETE_FILL")
            .ok()
            .and_then(|val| IncompleteDrawStrategy::parse(&val))
        {
            self.canvas.incomplete_fill = strategy;
        }
        if let Some(strategy) = std::env::var("INK_INCOMPLETE_STROKE")
            .ok()
            .and_then(|val| IncompleteDrawStrategy::parse(&val))
        {
            self.canvas.incomplete_stroke = strategy;
        }

        if let Some(tol) = env_f32("LYON_TOLERANCE") {
            self.tessellation.tolerance = tol;
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from ink.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
