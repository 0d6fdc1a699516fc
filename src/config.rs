//! Pipeline configuration.
//!
//! Loaded from an optional `sizegate.toml`. The file is sparse: stock defaults
//! are the base layer and any keys present in the file override them. Unknown
//! keys are rejected to catch typos early.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! max_bytes = 5242880                     # Ceiling per output file (5 MiB)
//! quality = 85                            # Re-encode quality, 1-100
//! bounding_box = [1920, 1080]             # Resize stage fits inside width x height
//! compressed_dir = "compressed_images"    # Under the target directory
//! incompatible_dir = "incompatible_originals"
//! sweep = true                            # Recursive leftover pass after the main pass
//! ```
//!
//! The defaults are exactly the historical fixed constants, so a run without a
//! config file behaves like one with every key spelled out.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::imaging::{BoundingBox, Quality};

/// 5 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILENAME: &str = "sizegate.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings for one pipeline run. Read-only once the run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Maximum acceptable size in bytes for a routed file.
    pub max_bytes: u64,
    /// Encoding quality for both reduction stages (1 = worst, 100 = best).
    pub quality: u8,
    /// `[width, height]` box the resize stage fits images into.
    pub bounding_box: [u32; 2],
    /// Name of the folder under the target that receives compliant files.
    pub compressed_dir: String,
    /// Name of the folder under the target that receives originals that could not be reduced.
    pub incompatible_dir: String,
    /// Run the recursive leftover sweep after the main pass.
    pub sweep: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            quality: 85,
            bounding_box: [1920, 1080],
            compressed_dir: "compressed_images".to_string(),
            incompatible_dir: "incompatible_originals".to_string(),
            sweep: true,
        }
    }
}

impl PipelineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "max_bytes must be greater than 0".into(),
            ));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation("quality must be 1-100".into()));
        }
        if self.bounding_box[0] == 0 || self.bounding_box[1] == 0 {
            return Err(ConfigError::Validation(
                "bounding_box values must be non-zero".into(),
            ));
        }
        for (key, name) in [
            ("compressed_dir", &self.compressed_dir),
            ("incompatible_dir", &self.incompatible_dir),
        ] {
            if name.is_empty() || name == "." || name == ".." {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a plain folder name"
                )));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(ConfigError::Validation(format!(
                    "{key} must not contain path separators"
                )));
            }
        }
        if self.compressed_dir == self.incompatible_dir {
            return Err(ConfigError::Validation(
                "compressed_dir and incompatible_dir must differ".into(),
            ));
        }
        Ok(())
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.bounding_box[0], self.bounding_box[1])
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PipelineConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
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

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<PipelineConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Load `sizegate.toml` from `dir`, falling back to stock defaults when absent.
pub fn load_config(dir: &Path) -> Result<PipelineConfig, ConfigError> {
    let path = dir.join(CONFIG_FILENAME);
    if !path.exists() {
        return resolve_config(None);
    }
    load_config_file(&path)
}

/// Returns a fully-commented stock `sizegate.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# sizegate configuration
# ======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Maximum size in bytes for any file placed in the compressed folder.
max_bytes = 5242880

# Encoding quality for the compress and resize stages (1 = worst, 100 = best).
quality = 85

# The resize stage shrinks images to fit inside this [width, height] box,
# preserving aspect ratio. Images already inside the box keep their size.
bounding_box = [1920, 1080]

# Folder names created under the target directory.
compressed_dir = "compressed_images"
incompatible_dir = "incompatible_originals"

# After the main pass, walk the target tree and move any image still over
# max_bytes into the incompatible folder (no compression attempted).
sweep = true
"##
}
