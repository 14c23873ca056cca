//! Sticker configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by a user config file in the config directory (the current
//! directory unless `--config-dir` says otherwise).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [sticker]
//! dimensions = [618, 408, 300]  # Square edge sizes, largest first
//! max_file_size_bytes = 512000  # Hard budget for the sticker file
//! description_max_chars = 256   # Longest accepted description
//!
//! [lossless]
//! shrink_factor = 0.1           # Fraction of each axis removed per PNG retry
//!
//! [lossy]
//! initial_quality = 90          # First JPEG quality tried (1-100)
//! quality_step = 5              # Quality removed per JPEG retry
//!
//! [output]
//! temp_dir = "/tmp/stickers"    # Where sticker files go (omit for system temp)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [sticker]
//! max_file_size_bytes = 300000
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StickerConfig {
    /// Sticker geometry and limits.
    pub sticker: StickerSection,
    /// PNG retry settings.
    pub lossless: LosslessConfig,
    /// JPEG retry settings.
    pub lossy: LossyConfig,
    /// Where files are written.
    pub output: OutputConfig,
}

impl StickerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dims = &self.sticker.dimensions;
        if dims.is_empty() {
            return Err(ConfigError::Validation(
                "sticker.dimensions must not be empty".into(),
            ));
        }
        if dims.contains(&0) {
            return Err(ConfigError::Validation(
                "sticker.dimensions values must be non-zero".into(),
            ));
        }
        if dims.windows(2).any(|w| w[0] <= w[1]) {
            return Err(ConfigError::Validation(
                "sticker.dimensions must be ordered largest to smallest".into(),
            ));
        }
        let f = self.lossless.shrink_factor;
        if !(f > 0.0 && f < 1.0) {
            return Err(ConfigError::Validation(
                "lossless.shrink_factor must be between 0 and 1 (exclusive)".into(),
            ));
        }
        if !(1..=100).contains(&self.lossy.initial_quality) {
            return Err(ConfigError::Validation(
                "lossy.initial_quality must be 1-100".into(),
            ));
        }
        if !(1..=100).contains(&self.lossy.quality_step) {
            return Err(ConfigError::Validation(
                "lossy.quality_step must be 1-100".into(),
            ));
        }
        Ok(())
    }
}

/// Sticker geometry and limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StickerSection {
    /// Preferred square edge sizes in pixels, largest first.
    pub dimensions: Vec<u32>,
    /// Maximum size of the sticker file in bytes.
    pub max_file_size_bytes: u64,
    /// Maximum description length in characters.
    pub description_max_chars: usize,
}

impl Default for StickerSection {
    fn default() -> Self {
        Self {
            dimensions: vec![618, 408, 300],
            max_file_size_bytes: 500 * 1024,
            description_max_chars: 256,
        }
    }
}

/// Lossless (PNG) retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LosslessConfig {
    /// Fraction of each axis removed on every retry.
    pub shrink_factor: f64,
}

impl Default for LosslessConfig {
    fn default() -> Self {
        Self { shrink_factor: 0.1 }
    }
}

/// Lossy (JPEG) retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LossyConfig {
    /// Quality of the first attempt (1 = worst, 100 = best).
    pub initial_quality: u32,
    /// Quality removed on every retry.
    pub quality_step: u32,
}

impl Default for LossyConfig {
    fn default() -> Self {
        Self {
            initial_quality: 90,
            quality_step: 5,
        }
    }
}

/// Output location settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory for sticker files. When absent, the system temp dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<String>,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(StickerConfig::default())?)
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

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<StickerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: StickerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<StickerConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# stickerfit Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Only the keys you want to override are needed.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Sticker geometry and limits
# ---------------------------------------------------------------------------
[sticker]
# Preferred square edge sizes in pixels, largest first. The first size that
# fits inside the source on both axes is used; smaller sources keep their
# native size.
dimensions = [618, 408, 300]

# Hard upper bound on the sticker file size, in bytes (500 KiB).
max_file_size_bytes = 512000

# Longest description accepted, in characters.
description_max_chars = 256

# ---------------------------------------------------------------------------
# Lossless (PNG) stickers - used when the image has transparency
# ---------------------------------------------------------------------------
[lossless]
# Fraction of each axis removed every time the file is still too large.
shrink_factor = 0.1

# ---------------------------------------------------------------------------
# Lossy (JPEG) stickers - used for opaque images
# ---------------------------------------------------------------------------
[lossy]
# JPEG quality of the first attempt (1 = worst, 100 = best).
initial_quality = 90

# Quality removed every time the file is still too large.
quality_step = 5

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Directory for sticker files.
# Omit or comment out to use the system temp directory.
# temp_dir = "/tmp/stickers"
"##
}
