//! Externally settable LED mode (GSM and GPS only).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target behavior for the GSM and GPS LEDs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedMode {
    #[serde(rename = "off", alias = "steady-off")]
    SteadyOff,
    #[serde(rename = "on", alias = "steady-on")]
    SteadyOn,
    #[default]
    #[serde(rename = "flash")]
    Flash,
}

impl LedMode {
    /// The level a steady mode holds the LED at, `None` for [`LedMode::Flash`].
    pub fn steady_level(self) -> Option<bool> {
        match self {
            LedMode::SteadyOff => Some(false),
            LedMode::SteadyOn => Some(true),
            LedMode::Flash => None,
        }
    }
}

impl fmt::Display for LedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedMode::SteadyOff => write!(f, "off"),
            LedMode::SteadyOn => write!(f, "on"),
            LedMode::Flash => write!(f, "flash"),
        }
    }
}

impl FromStr for LedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "steady-off" => Ok(LedMode::SteadyOff),
            "on" | "steady-on" => Ok(LedMode::SteadyOn),
            "flash" => Ok(LedMode::Flash),
            other => Err(format!(
                "unknown LED mode \"{other}\" (expected on, off or flash)"
            )),
        }
    }
}
