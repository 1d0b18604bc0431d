//! redshift backend
//!
//! Reads and writes the redshift settings file and drives the `redshift`
//! process. The settings file is loaded eagerly on construction; changes
//! stay in memory until `apply_changes`.

use std::fs::{self, OpenOptions};
use std::io;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use log::{debug, info, warn};

use crate::backend::autostart::{AutostartChange, AutostartEntry, LauncherDescriptor};
use crate::backend::keyfile::{parse_double, KeyFile};
use crate::backend::process::ProcessSupervisor;
use crate::backend::Backend;
use crate::constants::{
    AUTOSTART_DIR_NAME, BRIGHTNESS_MAX, BRIGHTNESS_MIN, CONFIG_FILE_NAME, DEFAULT_BRIGHTNESS,
    DEFAULT_SETTINGS_GROUP, GAMMA_MAX, GAMMA_MIN, KEY_ADJUSTMENT_METHOD, KEY_FADE, KEY_LATITUDE,
    KEY_LOCATION_PROVIDER, KEY_LONGITUDE, LEGACY_CONFIG_FILE_NAME, MANUAL_SETTINGS_GROUP,
    REDSHIFT_PROGRAM, TEMPERATURE_MAX, TEMPERATURE_MIN,
};
use crate::models::{
    AdjustmentMethod, BackendError, Gamma, LocationProvider, RedshiftState, TimePeriod,
};

/// Filesystem locations used by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct BackendPaths {
    /// Settings file passed to redshift with `-c`
    pub config_path: PathBuf,
    /// Directory holding the login launcher
    pub autostart_dir: PathBuf,
}

impl BackendPaths {
    /// Default locations, with optional overrides
    pub fn resolve(config_path: Option<PathBuf>, autostart_dir: Option<PathBuf>) -> Self {
        Self {
            config_path: config_path.unwrap_or_else(default_config_path),
            autostart_dir: autostart_dir.unwrap_or_else(default_autostart_dir),
        }
    }
}

/// `~/.redshiftgtk` if it already exists, else `$XDG_CONFIG_HOME/redshift.conf`
pub fn default_config_path() -> PathBuf {
    if let Some(legacy) = dirs::home_dir().map(|home| home.join(LEGACY_CONFIG_FILE_NAME)) {
        if legacy.exists() {
            return legacy;
        }
    }
    config_base().join(CONFIG_FILE_NAME)
}

/// `$XDG_CONFIG_HOME/autostart`
pub fn default_autostart_dir() -> PathBuf {
    config_base().join(AUTOSTART_DIR_NAME)
}

fn config_base() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| {
        warn!("Could not find the user config directory, using the working directory");
        PathBuf::from(".")
    })
}

/// Settings-file and process backend for redshift
#[derive(Debug)]
pub struct RedshiftWrapper {
    config: KeyFile,
    config_path: PathBuf,
    autostart: AutostartEntry,
    process: ProcessSupervisor,
}

impl RedshiftWrapper {
    /// Backend on the default paths, launching `redshift` from PATH
    pub fn new() -> Self {
        Self::open(
            BackendPaths::resolve(None, None),
            ProcessSupervisor::new(REDSHIFT_PROGRAM),
        )
    }

    /// Backend on explicit paths and process settings. The settings file is
    /// created if absent and loaded; failures are logged and leave an empty
    /// store in effect.
    pub fn open(paths: BackendPaths, process: ProcessSupervisor) -> Self {
        let mut wrapper = Self {
            config: KeyFile::new(),
            config_path: paths.config_path,
            autostart: AutostartEntry::new(&paths.autostart_dir),
            process,
        };

        if let Err(e) = wrapper.load_config() {
            warn!("Using default settings: {}", e);
        }
        wrapper
    }

    /// Point the backend at another settings file without reloading
    pub fn set_config_path(&mut self, path: impl Into<PathBuf>) {
        self.config_path = path.into();
    }

    /// Replace the in-memory store with the contents of the settings file,
    /// creating an empty file first if needed
    pub fn load_config(&mut self) -> Result<(), BackendError> {
        ensure_file(&self.config_path)
            .map_err(|e| BackendError::filesystem(&self.config_path, e))?;
        self.config = KeyFile::load(&self.config_path)
            .map_err(|e| BackendError::filesystem(&self.config_path, e))?;
        debug!("Loaded settings from {}", self.config_path.display());
        Ok(())
    }

    pub fn autostart_entry(&self) -> &AutostartEntry {
        &self.autostart
    }

    pub fn pid(&self) -> Option<u32> {
        self.process.pid()
    }

    /// Check whether the adjustment process exited on its own
    pub fn poll_exit(&mut self) -> Option<ExitStatus> {
        self.process.poll_exit()
    }

    fn double_in_range(
        &self,
        group: &str,
        key: &str,
        range: RangeInclusive<f64>,
        default: f64,
    ) -> f64 {
        match self.config.get_double(group, key) {
            Some(value) if range.contains(&value) => value,
            Some(value) => {
                debug!("{} = {} is out of range, using {}", key, value, default);
                default
            }
            None => {
                debug!("{} is missing or not a number, using {}", key, default);
                default
            }
        }
    }
}

impl Default for RedshiftWrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for RedshiftWrapper {
    fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn start(&mut self) -> Result<(), BackendError> {
        self.process.start(&self.config_path)
    }

    fn stop(&mut self) {
        self.process.stop();
    }

    fn state(&self) -> RedshiftState {
        self.process.state()
    }

    fn get_temperature(&self, period: TimePeriod) -> f64 {
        self.double_in_range(
            DEFAULT_SETTINGS_GROUP,
            period.temperature_key(),
            TEMPERATURE_MIN..=TEMPERATURE_MAX,
            period.default_temperature(),
        )
    }

    fn set_temperature(&mut self, period: TimePeriod, temperature: f64) {
        self.config
            .set_double(DEFAULT_SETTINGS_GROUP, period.temperature_key(), temperature);
    }

    fn get_location_provider(&self) -> LocationProvider {
        match self.config.get_string(DEFAULT_SETTINGS_GROUP, KEY_LOCATION_PROVIDER) {
            Some(provider) => LocationProvider::from_config_value(&provider),
            None => {
                debug!("{} is missing, using auto", KEY_LOCATION_PROVIDER);
                LocationProvider::Auto
            }
        }
    }

    fn set_location_provider(&mut self, provider: LocationProvider) {
        self.config.set_string(
            DEFAULT_SETTINGS_GROUP,
            KEY_LOCATION_PROVIDER,
            provider.as_config_value(),
        );
    }

    fn get_latitude(&self) -> f64 {
        self.config
            .get_double(MANUAL_SETTINGS_GROUP, KEY_LATITUDE)
            .unwrap_or_else(|| {
                debug!("{} is missing or not a number, using 0", KEY_LATITUDE);
                0.0
            })
    }

    fn set_latitude(&mut self, latitude: f64) {
        self.config
            .set(MANUAL_SETTINGS_GROUP, KEY_LATITUDE, format!("{:.2}", latitude));
    }

    fn get_longitude(&self) -> f64 {
        self.config
            .get_double(MANUAL_SETTINGS_GROUP, KEY_LONGITUDE)
            .unwrap_or_else(|| {
                debug!("{} is missing or not a number, using 0", KEY_LONGITUDE);
                0.0
            })
    }

    fn set_longitude(&mut self, longitude: f64) {
        self.config
            .set(MANUAL_SETTINGS_GROUP, KEY_LONGITUDE, format!("{:.2}", longitude));
    }

    fn get_brightness(&self, period: TimePeriod) -> f64 {
        self.double_in_range(
            DEFAULT_SETTINGS_GROUP,
            period.brightness_key(),
            BRIGHTNESS_MIN..=BRIGHTNESS_MAX,
            DEFAULT_BRIGHTNESS,
        )
    }

    fn set_brightness(&mut self, period: TimePeriod, brightness: f64) {
        self.config.set(
            DEFAULT_SETTINGS_GROUP,
            period.brightness_key(),
            format!("{:.1}", brightness),
        );
    }

    fn get_gamma(&self, period: TimePeriod) -> Option<Gamma> {
        let key = period.gamma_key();
        let Some(value) = self.config.get(DEFAULT_SETTINGS_GROUP, key) else {
            debug!("{} is missing", key);
            return None;
        };

        // Single scalar form applies to every channel
        if let Some(gamma) = parse_double(value) {
            if (GAMMA_MIN..=GAMMA_MAX).contains(&gamma) {
                return Some(Gamma::uniform(gamma));
            }
            debug!("{} = {} is out of range", key, gamma);
            return None;
        }

        match Gamma::from_channels(value) {
            Ok(gamma) => Some(gamma),
            Err(e) => {
                debug!("{} is malformed: {}", key, e);
                None
            }
        }
    }

    fn set_gamma(&mut self, period: TimePeriod, red: f64, green: f64, blue: f64) {
        self.config.set(
            DEFAULT_SETTINGS_GROUP,
            period.gamma_key(),
            Gamma::new(red, green, blue).to_config_value(),
        );
    }

    fn get_adjustment_method(&self) -> AdjustmentMethod {
        match self.config.get_string(DEFAULT_SETTINGS_GROUP, KEY_ADJUSTMENT_METHOD) {
            Some(method) => AdjustmentMethod::from_config_value(&method),
            None => AdjustmentMethod::Auto,
        }
    }

    fn set_adjustment_method(&mut self, method: AdjustmentMethod) {
        match method.as_config_value() {
            Some(value) => {
                self.config
                    .set_string(DEFAULT_SETTINGS_GROUP, KEY_ADJUSTMENT_METHOD, value)
            }
            None => {
                self.config
                    .remove_key(DEFAULT_SETTINGS_GROUP, KEY_ADJUSTMENT_METHOD);
            }
        }
    }

    fn get_smooth_transition(&self) -> bool {
        match self.config.get_double(DEFAULT_SETTINGS_GROUP, KEY_FADE) {
            Some(fade) => fade != 0.0,
            None => {
                debug!("{} is missing or not a number, using off", KEY_FADE);
                false
            }
        }
    }

    fn set_smooth_transition(&mut self, transition: bool) {
        self.config
            .set_integer(DEFAULT_SETTINGS_GROUP, KEY_FADE, i64::from(transition));
    }

    fn get_autostart(&self) -> bool {
        self.autostart.is_enabled()
    }

    fn set_autostart(&mut self, enabled: bool) -> Result<AutostartChange, BackendError> {
        let descriptor = LauncherDescriptor::new(self.process.program(), &self.config_path);
        self.autostart.set_enabled(enabled, &descriptor)
    }

    fn apply_changes(&mut self) -> Result<(), BackendError> {
        ensure_file(&self.config_path)
            .map_err(|e| BackendError::filesystem(&self.config_path, e))?;
        self.config
            .save(&self.config_path)
            .map_err(|e| BackendError::filesystem(&self.config_path, e))?;

        info!("Saved settings to {}", self.config_path.display());
        Ok(())
    }
}

/// Create an empty file (and its parent directories) unless it already exists
fn ensure_file(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}
