//! Data models module
//!
//! Defines the core data structures shared by the backend and the CLI:
//! - TimePeriod: Day/Night settings profiles
//! - LocationProvider / AdjustmentMethod: string-encoded settings enums
//! - RedshiftState: lifecycle of the external adjustment process
//! - Gamma: per-channel gamma correction
//! - SettingsSnapshot: every readable setting at once
//! - BackendError / ParseError: error taxonomy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    AUTO_LOCATION_PROVIDER, DEFAULT_DAY_TEMPERATURE, DEFAULT_GAMMA, DEFAULT_NIGHT_TEMPERATURE,
    GAMMA_MAX, GAMMA_MIN, KEY_BRIGHTNESS_DAY, KEY_BRIGHTNESS_NIGHT, KEY_GAMMA_DAY,
    KEY_GAMMA_NIGHT, KEY_TEMP_DAY, KEY_TEMP_NIGHT, MANUAL_LOCATION_PROVIDER,
};

/// Time-of-day settings profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Day,
    Night,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 2] = [TimePeriod::Day, TimePeriod::Night];

    pub fn temperature_key(self) -> &'static str {
        match self {
            TimePeriod::Day => KEY_TEMP_DAY,
            TimePeriod::Night => KEY_TEMP_NIGHT,
        }
    }

    pub fn brightness_key(self) -> &'static str {
        match self {
            TimePeriod::Day => KEY_BRIGHTNESS_DAY,
            TimePeriod::Night => KEY_BRIGHTNESS_NIGHT,
        }
    }

    pub fn gamma_key(self) -> &'static str {
        match self {
            TimePeriod::Day => KEY_GAMMA_DAY,
            TimePeriod::Night => KEY_GAMMA_NIGHT,
        }
    }

    /// Temperature used when the stored value is missing or out of range
    pub fn default_temperature(self) -> f64 {
        match self {
            TimePeriod::Day => DEFAULT_DAY_TEMPERATURE,
            TimePeriod::Night => DEFAULT_NIGHT_TEMPERATURE,
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimePeriod::Day => write!(f, "day"),
            TimePeriod::Night => write!(f, "night"),
        }
    }
}

/// Where the adjustment tool gets its location from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationProvider {
    /// Geolocation service
    #[default]
    Auto,
    /// Fixed latitude/longitude from the manual group
    Manual,
}

impl LocationProvider {
    /// Only the exact string "manual" selects the manual provider
    pub fn from_config_value(value: &str) -> Self {
        if value == MANUAL_LOCATION_PROVIDER {
            LocationProvider::Manual
        } else {
            LocationProvider::Auto
        }
    }

    pub fn as_config_value(self) -> &'static str {
        match self {
            LocationProvider::Auto => AUTO_LOCATION_PROVIDER,
            LocationProvider::Manual => MANUAL_LOCATION_PROVIDER,
        }
    }
}

impl FromStr for LocationProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" | "automatic" => Ok(LocationProvider::Auto),
            "manual" => Ok(LocationProvider::Manual),
            other => Err(format!("unknown location provider '{}'", other)),
        }
    }
}

impl fmt::Display for LocationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationProvider::Auto => write!(f, "auto"),
            LocationProvider::Manual => write!(f, "manual"),
        }
    }
}

/// Display gamma mechanism used by the adjustment tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentMethod {
    /// Let the tool pick; encoded as absence of the key
    #[default]
    Auto,
    Randr,
    Vidmode,
}

impl AdjustmentMethod {
    /// Unknown values fall back to automatic selection
    pub fn from_config_value(value: &str) -> Self {
        match value {
            "randr" => AdjustmentMethod::Randr,
            "vidmode" => AdjustmentMethod::Vidmode,
            _ => AdjustmentMethod::Auto,
        }
    }

    /// `None` means the key must be removed
    pub fn as_config_value(self) -> Option<&'static str> {
        match self {
            AdjustmentMethod::Auto => None,
            AdjustmentMethod::Randr => Some("randr"),
            AdjustmentMethod::Vidmode => Some("vidmode"),
        }
    }
}

impl FromStr for AdjustmentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(AdjustmentMethod::Auto),
            "randr" => Ok(AdjustmentMethod::Randr),
            "vidmode" => Ok(AdjustmentMethod::Vidmode),
            other => Err(format!("unknown adjustment method '{}'", other)),
        }
    }
}

impl fmt::Display for AdjustmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustmentMethod::Auto => write!(f, "auto"),
            AdjustmentMethod::Randr => write!(f, "randr"),
            AdjustmentMethod::Vidmode => write!(f, "vidmode"),
        }
    }
}

/// Lifecycle of the external adjustment process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RedshiftState {
    /// Neither started nor stopped yet in this run
    #[default]
    Undefined,
    Stopped,
    Running,
}

/// Per-channel gamma correction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gamma {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Gamma {
    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    /// Same value on all three channels
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value)
    }

    pub fn is_valid_channel(value: f64) -> bool {
        (GAMMA_MIN..=GAMMA_MAX).contains(&value)
    }

    /// Parse the "R:G:B" form as stored in the settings file.
    ///
    /// The delimiter and field count are strict; each channel that does not
    /// parse or lies outside the valid range falls back to the neutral value.
    pub fn from_channels(value: &str) -> Result<Self, ParseError> {
        if !value.contains(':') {
            return Err(ParseError::MissingDelimiter(value.to_string()));
        }

        let parts: Vec<&str> = value.split(':').collect();
        if parts.len() != 3 {
            return Err(ParseError::FieldCount(parts.len()));
        }

        let channel = |part: &str| match part.trim().parse::<f64>() {
            Ok(v) if Self::is_valid_channel(v) => v,
            _ => DEFAULT_GAMMA,
        };

        Ok(Self::new(channel(parts[0]), channel(parts[1]), channel(parts[2])))
    }

    /// The "R:G:B" form written to the settings file, one decimal per channel
    pub fn to_config_value(&self) -> String {
        format!("{:.1}:{:.1}:{:.1}", self.red, self.green, self.blue)
    }
}

impl Default for Gamma {
    fn default() -> Self {
        Self::uniform(DEFAULT_GAMMA)
    }
}

/// Accepts either a single scalar or "R:G:B"; every number must parse.
impl FromStr for Gamma {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| ParseError::InvalidNumber(part.to_string()))
        };

        if !s.contains(':') {
            return number(s).map(Gamma::uniform);
        }

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(ParseError::FieldCount(parts.len()));
        }

        Ok(Gamma::new(number(parts[0])?, number(parts[1])?, number(parts[2])?))
    }
}

impl fmt::Display for Gamma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_config_value())
    }
}

/// Every setting readable through the backend, for display and JSON output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    /// Path of the settings file the values were read from
    pub config_path: PathBuf,
    pub temperature_day: f64,
    pub temperature_night: f64,
    pub brightness_day: f64,
    pub brightness_night: f64,
    /// Absent when the stored value is missing or malformed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma_day: Option<Gamma>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma_night: Option<Gamma>,
    pub location_provider: LocationProvider,
    pub latitude: f64,
    pub longitude: f64,
    pub adjustment_method: AdjustmentMethod,
    pub smooth_transition: bool,
    pub autostart: bool,
}

/// Failures surfaced by backend operations that touch the filesystem or
/// spawn processes. Getters never produce these.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Filesystem error at {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not spawn {program}: {source}")]
    Process {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl BackendError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BackendError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Malformed stored values. Getters degrade these to defaults.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("missing ':' delimiter in {0:?}")]
    MissingDelimiter(String),

    #[error("expected 3 fields, found {0}")]
    FieldCount(usize),

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("malformed line {line}: {content:?}")]
    MalformedLine { line: usize, content: String },
}
