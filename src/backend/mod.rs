//! Settings backends
//!
//! This module provides typed access to the adjustment tool's settings:
//! - `Backend`: the interface consumed by front-ends
//! - `redshift`: the redshift implementation (settings file + process)
//! - `keyfile`: INI-like settings store
//! - `process`: adjustment process lifecycle
//! - `autostart`: login launcher management
//!
//! Further backends are additional `Backend` implementations chosen at
//! construction time.

pub mod autostart;
pub mod keyfile;
pub mod process;
pub mod redshift;

use std::path::Path;

use crate::backend::autostart::AutostartChange;
use crate::models::{
    AdjustmentMethod, BackendError, Gamma, LocationProvider, RedshiftState, SettingsSnapshot,
    TimePeriod,
};

/// Typed settings access plus adjustment process control.
///
/// Getters never fail: missing or invalid stored values resolve to
/// documented defaults. Setters only touch in-memory state until
/// [`Backend::apply_changes`] persists them.
pub trait Backend {
    /// Settings file the backend reads and writes
    fn config_path(&self) -> &Path;

    /// Stop any running instance, then launch the adjustment tool
    fn start(&mut self) -> Result<(), BackendError>;
    /// Best-effort termination; always ends in `RedshiftState::Stopped`
    fn stop(&mut self);
    fn state(&self) -> RedshiftState;

    /// Kelvin in [1000, 12000]; default 6500 (day) / 4500 (night)
    fn get_temperature(&self, period: TimePeriod) -> f64;
    /// Stored as given; validation happens on read
    fn set_temperature(&mut self, period: TimePeriod, temperature: f64);

    fn get_location_provider(&self) -> LocationProvider;
    fn set_location_provider(&mut self, provider: LocationProvider);

    fn get_latitude(&self) -> f64;
    fn set_latitude(&mut self, latitude: f64);
    fn get_longitude(&self) -> f64;
    fn set_longitude(&mut self, longitude: f64);

    /// In [0.1, 1.0]; default 1.0
    fn get_brightness(&self, period: TimePeriod) -> f64;
    fn set_brightness(&mut self, period: TimePeriod, brightness: f64);

    /// `None` when no usable value is stored
    fn get_gamma(&self, period: TimePeriod) -> Option<Gamma>;
    fn set_gamma(&mut self, period: TimePeriod, red: f64, green: f64, blue: f64);

    fn get_adjustment_method(&self) -> AdjustmentMethod;
    /// `Auto` removes the setting entirely
    fn set_adjustment_method(&mut self, method: AdjustmentMethod);

    fn get_smooth_transition(&self) -> bool;
    fn set_smooth_transition(&mut self, transition: bool);

    fn get_autostart(&self) -> bool;
    fn set_autostart(&mut self, enabled: bool) -> Result<AutostartChange, BackendError>;

    /// Persist in-memory settings to the settings file
    fn apply_changes(&mut self) -> Result<(), BackendError>;
}

/// Read every setting through the getters
pub fn snapshot(backend: &dyn Backend) -> SettingsSnapshot {
    SettingsSnapshot {
        config_path: backend.config_path().to_path_buf(),
        temperature_day: backend.get_temperature(TimePeriod::Day),
        temperature_night: backend.get_temperature(TimePeriod::Night),
        brightness_day: backend.get_brightness(TimePeriod::Day),
        brightness_night: backend.get_brightness(TimePeriod::Night),
        gamma_day: backend.get_gamma(TimePeriod::Day),
        gamma_night: backend.get_gamma(TimePeriod::Night),
        location_provider: backend.get_location_provider(),
        latitude: backend.get_latitude(),
        longitude: backend.get_longitude(),
        adjustment_method: backend.get_adjustment_method(),
        smooth_transition: backend.get_smooth_transition(),
        autostart: backend.get_autostart(),
    }
}
