//! Output formatting module
//!
//! Human-readable and JSON renderings of a settings snapshot.

use anyhow::Result;
use redshift_settings::{Gamma, LocationProvider, SettingsSnapshot};

/// Format a snapshot as aligned human-readable lines
pub fn format_human(snapshot: &SettingsSnapshot) -> String {
    let mut lines = vec![
        format!("Settings file:      {}", snapshot.config_path.display()),
        format!(
            "Temperature:        day {} K, night {} K",
            snapshot.temperature_day, snapshot.temperature_night
        ),
        format!(
            "Brightness:         day {:.1}, night {:.1}",
            snapshot.brightness_day, snapshot.brightness_night
        ),
        format!(
            "Gamma:              day {}, night {}",
            gamma_text(snapshot.gamma_day),
            gamma_text(snapshot.gamma_night)
        ),
    ];

    lines.push(match snapshot.location_provider {
        LocationProvider::Manual => format!(
            "Location:           manual ({:.2}, {:.2})",
            snapshot.latitude, snapshot.longitude
        ),
        LocationProvider::Auto => "Location:           auto".to_string(),
    });
    lines.push(format!("Adjustment method:  {}", snapshot.adjustment_method));
    lines.push(format!("Smooth transition:  {}", on_off(snapshot.smooth_transition)));
    lines.push(format!("Autostart:          {}", on_off(snapshot.autostart)));

    lines.join("\n")
}

/// Format a snapshot as pretty-printed JSON
pub fn format_json(snapshot: &SettingsSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

fn gamma_text(gamma: Option<Gamma>) -> String {
    gamma.map_or_else(|| "(unset)".to_string(), |g| g.to_string())
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
