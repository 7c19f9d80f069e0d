//! Application configuration: TOML-based, platform-aware paths.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::hardware::{DeviceConfig, DeviceType};
use crate::led::LedMode;

/// Header comment prepended to saved config files.
const CONFIG_HEADER: &str = "# trackled configuration\n\n";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Tracker model, e.g. "GS06". Only GS06 and GS08 drive the power LED.
    #[serde(default = "default_device_type")]
    pub device_type: String,

    /// Initial GSM LED mode: "on", "off" or "flash".
    #[serde(default = "default_mode")]
    pub gsm_mode: String,

    /// Initial GPS LED mode: "on", "off" or "flash".
    #[serde(default = "default_mode")]
    pub gps_mode: String,
}

fn default_device_type() -> String {
    "GS06".into()
}

fn default_mode() -> String {
    "flash".into()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            device_type: default_device_type(),
            gsm_mode: default_mode(),
            gps_mode: default_mode(),
        }
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The `device_type` field is empty or whitespace-only.
    EmptyDeviceType,
    /// A mode field could not be parsed (`field` is `"gsm_mode"` or `"gps_mode"`).
    InvalidMode { field: &'static str, reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyDeviceType => write!(f, "Device type cannot be empty"),
            ValidationError::InvalidMode { field, reason } => {
                write!(f, "Invalid {field}: {reason}")
            }
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("trackled"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from disk, or return defaults if not found.
    pub fn load() -> Self {
        let (config, warnings) = Self::load_with_warnings();
        for w in &warnings {
            log::warn!("{w}");
        }
        config
    }

    /// Save config to an arbitrary path atomically (write to temp file, then rename).
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let contents = format!("{CONFIG_HEADER}{serialized}");
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result
            }
        }
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Parsed GSM mode.
    pub fn gsm_mode(&self) -> crate::error::Result<LedMode> {
        self.gsm_mode
            .parse()
            .map_err(|e| crate::TrackledError::Config(format!("gsm_mode: {e}")))
    }

    /// Parsed GPS mode.
    pub fn gps_mode(&self) -> crate::error::Result<LedMode> {
        self.gps_mode
            .parse()
            .map_err(|e| crate::TrackledError::Config(format!("gps_mode: {e}")))
    }

    /// Validate the entire config, collecting all errors.
    ///
    /// An unrecognised but non-empty `device_type` is valid: it simply has no
    /// power LED.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.device_type.trim().is_empty() {
            errors.push(ValidationError::EmptyDeviceType);
        }

        for (field, value) in [("gsm_mode", &self.gsm_mode), ("gps_mode", &self.gps_mode)] {
            if let Err(reason) = value.parse::<LedMode>() {
                errors.push(ValidationError::InvalidMode { field, reason });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl DeviceConfig for Config {
    fn device_type(&self) -> DeviceType {
        DeviceType::parse(&self.device_type)
    }
}
