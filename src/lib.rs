//! redshift-settings - settings backend for the redshift colour-temperature tool
//!
//! This library exposes the typed settings backend, the redshift process
//! supervisor, autostart management and the radial slider interaction model
//! used by front-ends to edit temperatures.

pub mod backend;
pub mod constants;
pub mod models;
pub mod slider;

pub use backend::redshift::{BackendPaths, RedshiftWrapper};
pub use backend::Backend;
pub use models::{
    AdjustmentMethod, BackendError, Gamma, LocationProvider, RedshiftState, SettingsSnapshot,
    TimePeriod,
};
pub use slider::RadialSlider;
