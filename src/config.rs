//! Editor configuration.
//!
//! Handles loading, validating, and merging `voxedit.toml`. Stock defaults
//! are the base layer; a user file overrides any subset of keys on top.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [history]
//! capacity = 50             # Undo entries kept beyond the original image
//!
//! [parser]
//! min_confidence = 0.75     # Similarity a fuzzy match must exceed (0 < x <= 1)
//! max_edit_distance = 3     # Hard cap on typos absorbed per phrase
//!
//! [zoom]
//! step = 1.25               # Factor per zoom in / zoom out
//! min = 0.1
//! max = 10.0
//! fit_margin = 0.95         # Fit leaves a 5% border inside the viewport
//!
//! [load]
//! max_dimension = 2048      # Downscale larger images at load (0 = never)
//!
//! [session]
//! recent_commands = 15
//! recent_files = 10
//!
//! [processing]
//! max_threads = 4           # Worker threads for pixel kernels (omit for all cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse, so override just the values you want:
//!
//! ```toml
//! [history]
//! capacity = 200
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::catalog::phrases::MatchPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "voxedit.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::Io(_) => "io",
            ConfigError::Toml(_) => "toml",
            ConfigError::Serialize(_) => "serialize",
            ConfigError::Validation(_) => "validation",
        }
    }
}

/// Editor configuration loaded from `voxedit.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Undo/redo history bound.
    pub history: HistoryConfig,
    /// Command matching tolerance.
    pub parser: ParserConfig,
    /// Zoom step and limits.
    pub zoom: ZoomConfig,
    /// Load-time downscaling.
    pub load: LoadConfig,
    /// Recent command and file lists.
    pub session: SessionConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl EditorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.capacity == 0 {
            return Err(ConfigError::Validation(
                "history.capacity must be at least 1".into(),
            ));
        }
        let confidence = self.parser.min_confidence;
        if !(confidence > 0.0 && confidence <= 1.0) {
            return Err(ConfigError::Validation(
                "parser.min_confidence must be in (0, 1]".into(),
            ));
        }
        if !(self.zoom.step > 1.0) {
            return Err(ConfigError::Validation(
                "zoom.step must be greater than 1".into(),
            ));
        }
        if !(self.zoom.min > 0.0 && self.zoom.min < self.zoom.max) {
            return Err(ConfigError::Validation(
                "zoom.min must be positive and below zoom.max".into(),
            ));
        }
        if !(self.zoom.fit_margin > 0.0 && self.zoom.fit_margin <= 1.0) {
            return Err(ConfigError::Validation(
                "zoom.fit_margin must be in (0, 1]".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Maximum entries beyond the original image. Oldest are evicted first.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    pub min_confidence: f32,
    pub max_edit_distance: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let policy = MatchPolicy::default();
        Self {
            min_confidence: policy.min_confidence,
            max_edit_distance: policy.max_edit_distance,
        }
    }
}

impl ParserConfig {
    pub fn policy(&self) -> MatchPolicy {
        MatchPolicy {
            min_confidence: self.min_confidence,
            max_edit_distance: self.max_edit_distance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZoomConfig {
    /// Multiplicative factor per zoom in / zoom out.
    pub step: f32,
    pub min: f32,
    pub max: f32,
    /// Fraction of the viewport a fitted image may fill.
    pub fit_margin: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            step: crate::catalog::ZOOM_STEP,
            min: 0.1,
            max: 10.0,
            fit_margin: 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// Longest edge allowed at load; larger images are downscaled. 0 disables.
    pub max_dimension: u32,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            max_dimension: 2048,
        }
    }
}

impl LoadConfig {
    /// The limit as the codec expects it.
    pub fn limit(&self) -> Option<u32> {
        (self.max_dimension > 0).then_some(self.max_dimension)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub recent_commands: usize,
    pub recent_files: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            recent_commands: 15,
            recent_files: 10,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum worker threads for pixel kernels.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_threads
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(EditorConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `voxedit.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(None);
    }
    read_raw(&config_path).map(Some)
}

fn read_raw(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<EditorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: EditorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `voxedit.toml` in the given directory, falling back to
/// stock defaults when there is none.
pub fn load_config(dir: &Path) -> Result<EditorConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Load config from an explicit file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<EditorConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = read_raw(path)?;
    resolve_config(base, Some(overlay))
}

/// Returns a fully-commented stock `voxedit.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# voxedit configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as voxedit.toml in the directory given to --config.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# History
# ---------------------------------------------------------------------------
[history]
# Undo steps kept beyond the original image. When exceeded, the oldest
# edits are dropped silently; the original image is always kept.
capacity = 50

# ---------------------------------------------------------------------------
# Command parser
# ---------------------------------------------------------------------------
[parser]
# Similarity a misheard phrase must exceed to match a known command
# (0 < x <= 1). 0.75 lets "brihgtness" through but not "edit" for "exit".
min_confidence = 0.75
# Upper bound on typos absorbed in one phrase, whatever its length.
max_edit_distance = 3

# ---------------------------------------------------------------------------
# Zoom
# ---------------------------------------------------------------------------
[zoom]
# Factor applied per "zoom in" / "zoom out" (1.25 = 25%).
step = 1.25
min = 0.1
max = 10.0
# "fit" scales the image to this fraction of the viewport.
fit_margin = 0.95

# ---------------------------------------------------------------------------
# Loading
# ---------------------------------------------------------------------------
[load]
# Images whose longest edge exceeds this are downscaled when loaded.
# Set to 0 to always load at full size.
max_dimension = 2048

# ---------------------------------------------------------------------------
# Session
# ---------------------------------------------------------------------------
[session]
# How many recent utterances and recently opened files to remember.
recent_commands = 15
recent_files = 10

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Worker threads for filters and adjustments.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}
