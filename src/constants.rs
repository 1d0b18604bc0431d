//! Global constants for redshift-settings
//!
//! Centralized location for application-wide constants

/// Application identifier, used for the launcher file name
pub const APP_ID: &str = "redshift-settings";

/// Name written into the launcher descriptor
pub const LAUNCHER_NAME: &str = "RedshiftSettingsAutostart";

/// Settings file name under the XDG config directory
pub const CONFIG_FILE_NAME: &str = "redshift.conf";

/// Historical settings file name under the home directory
pub const LEGACY_CONFIG_FILE_NAME: &str = ".redshiftgtk";

/// Autostart directory name under the XDG config directory
pub const AUTOSTART_DIR_NAME: &str = "autostart";

/// Executable launched by default (resolved through PATH)
pub const REDSHIFT_PROGRAM: &str = "redshift";

/// Process names killed unconditionally on stop
pub const KILL_PROCESS_NAMES: &[&str] = &["redshift", "redshift-gtk"];

/// Adjustment methods reset explicitly on stop
pub const RESET_METHODS: &[&str] = &["randr", "vidmode"];

// Settings groups
pub const DEFAULT_SETTINGS_GROUP: &str = "redshift";
pub const MANUAL_SETTINGS_GROUP: &str = "manual";
pub const DESKTOP_ENTRY_GROUP: &str = "Desktop Entry";

// Settings keys
pub const KEY_TEMP_DAY: &str = "temp-day";
pub const KEY_TEMP_NIGHT: &str = "temp-night";
pub const KEY_BRIGHTNESS_DAY: &str = "brightness-day";
pub const KEY_BRIGHTNESS_NIGHT: &str = "brightness-night";
pub const KEY_GAMMA_DAY: &str = "gamma-day";
pub const KEY_GAMMA_NIGHT: &str = "gamma-night";
pub const KEY_LOCATION_PROVIDER: &str = "location-provider";
pub const KEY_ADJUSTMENT_METHOD: &str = "adjustment-method";
pub const KEY_FADE: &str = "fade";
pub const KEY_LATITUDE: &str = "lat";
pub const KEY_LONGITUDE: &str = "lon";

// Launcher descriptor keys
pub const KEY_HIDDEN: &str = "Hidden";
pub const KEY_AUTOSTART_ENABLED: &str = "X-GNOME-Autostart-enabled";

/// Valid temperature domain in Kelvin
pub const TEMPERATURE_MIN: f64 = 1000.0;
pub const TEMPERATURE_MAX: f64 = 12000.0;
pub const DEFAULT_DAY_TEMPERATURE: f64 = 6500.0;
pub const DEFAULT_NIGHT_TEMPERATURE: f64 = 4500.0;

pub const BRIGHTNESS_MIN: f64 = 0.1;
pub const BRIGHTNESS_MAX: f64 = 1.0;
pub const DEFAULT_BRIGHTNESS: f64 = 1.0;

pub const GAMMA_MIN: f64 = 0.1;
pub const GAMMA_MAX: f64 = 1.0;
pub const DEFAULT_GAMMA: f64 = 1.0;

/// Location provider string written for automatic geolocation
pub const AUTO_LOCATION_PROVIDER: &str = "geoclue2";
pub const MANUAL_LOCATION_PROVIDER: &str = "manual";

// Radial slider geometry
pub const SLIDER_MIN_WIDGET_SIZE: f64 = 64.0;
pub const SLIDER_MAX_WIDGET_SIZE: f64 = 512.0;
pub const SLIDER_DEFAULT_WIDGET_SIZE: f64 = 256.0;

/// Largest angle change (degrees) a single pointer motion may cause
pub const SLIDER_DEFAULT_MAX_JUMP: f64 = 200.0;
