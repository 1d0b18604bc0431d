//! CLI argument parsing and validation module
//!
//! Handles command-line interface using clap, including:
//! - Settings file and autostart directory overrides
//! - Settings changes for `set` and `start`
//! - Output format selection (human/JSON)
//! - Verbosity

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use redshift_settings::constants::{REDSHIFT_PROGRAM, TEMPERATURE_MAX, TEMPERATURE_MIN};
use redshift_settings::{AdjustmentMethod, Backend, Gamma, LocationProvider, TimePeriod};

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub autostart_dir: Option<PathBuf>,
    /// Adjustment program to launch
    pub program: String,
    pub verbosity: u8,
    pub command: CliCommand,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Show { json: bool },
    Set(SettingsChanges),
    /// Stop, apply the changes, relaunch and supervise
    Start(SettingsChanges),
    Stop,
    /// `None` reports the current state
    Autostart(Option<bool>),
}

/// Settings given on the command line; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsChanges {
    pub temperature_day: Option<f64>,
    pub temperature_night: Option<f64>,
    pub brightness_day: Option<f64>,
    pub brightness_night: Option<f64>,
    pub gamma_day: Option<Gamma>,
    pub gamma_night: Option<Gamma>,
    pub location_provider: Option<LocationProvider>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub adjustment_method: Option<AdjustmentMethod>,
    pub smooth_transition: Option<bool>,
}

impl SettingsChanges {
    pub fn is_empty(&self) -> bool {
        *self == SettingsChanges::default()
    }

    /// Push every given value through the backend setters
    pub fn apply_to(&self, backend: &mut dyn Backend) {
        if let Some(temperature) = self.temperature_day {
            backend.set_temperature(TimePeriod::Day, temperature);
        }
        if let Some(temperature) = self.temperature_night {
            backend.set_temperature(TimePeriod::Night, temperature);
        }
        if let Some(brightness) = self.brightness_day {
            backend.set_brightness(TimePeriod::Day, brightness);
        }
        if let Some(brightness) = self.brightness_night {
            backend.set_brightness(TimePeriod::Night, brightness);
        }
        if let Some(gamma) = self.gamma_day {
            backend.set_gamma(TimePeriod::Day, gamma.red, gamma.green, gamma.blue);
        }
        if let Some(gamma) = self.gamma_night {
            backend.set_gamma(TimePeriod::Night, gamma.red, gamma.green, gamma.blue);
        }
        if let Some(provider) = self.location_provider {
            backend.set_location_provider(provider);
        }
        if let Some(latitude) = self.latitude {
            backend.set_latitude(latitude);
        }
        if let Some(longitude) = self.longitude {
            backend.set_longitude(longitude);
        }
        if let Some(method) = self.adjustment_method {
            backend.set_adjustment_method(method);
        }
        if let Some(fade) = self.smooth_transition {
            backend.set_smooth_transition(fade);
        }
    }
}

/// Parse command line arguments and return configuration
pub fn parse_args() -> Result<CliArgs> {
    let matches = build_command().get_matches();
    from_matches(&matches)
}

pub fn build_command() -> Command {
    Command::new("redshift-settings")
        .version(concat!(
            env!("REDSHIFT_SETTINGS_VERSION"),
            " (",
            env!("GIT_HASH"),
            ")"
        ))
        .about("Manage redshift colour temperature settings")
        .long_about(
            "Read and edit the redshift settings file, control the redshift process \
             and manage launching it at login.",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Settings file to use")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("autostart-dir")
                .long("autostart-dir")
                .value_name("DIR")
                .help("Directory holding the login launcher")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("redshift")
                .long("redshift")
                .value_name("PROGRAM")
                .help("redshift executable to launch")
                .default_value(REDSHIFT_PROGRAM)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log output (-v info, -vv debug)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("show").about("Print the current settings").arg(
                Arg::new("json")
                    .short('j')
                    .long("json")
                    .help("Output in JSON format")
                    .action(ArgAction::SetTrue),
            ),
        )
        .subcommand(settings_args(
            Command::new("set").about("Change settings and save them"),
        ))
        .subcommand(settings_args(
            Command::new("start")
                .about("Apply settings, then run redshift until interrupted"),
        ))
        .subcommand(Command::new("stop").about("Stop every running redshift instance"))
        .subcommand(
            Command::new("autostart")
                .about("Show or change whether redshift starts at login")
                .arg(
                    Arg::new("state")
                        .value_name("on|off")
                        .help("Enable or disable autostart")
                        .value_parser(parse_switch),
                ),
        )
}

fn settings_args(command: Command) -> Command {
    command
        .arg(number_arg("temp-day", "KELVIN", "Day colour temperature"))
        .arg(number_arg("temp-night", "KELVIN", "Night colour temperature"))
        .arg(number_arg("brightness-day", "LEVEL", "Day brightness (0.1-1.0)"))
        .arg(number_arg("brightness-night", "LEVEL", "Night brightness (0.1-1.0)"))
        .arg(
            Arg::new("gamma-day")
                .long("gamma-day")
                .value_name("R:G:B")
                .help("Day gamma, a single value or one per channel")
                .value_parser(|s: &str| s.parse::<Gamma>().map_err(|e| e.to_string())),
        )
        .arg(
            Arg::new("gamma-night")
                .long("gamma-night")
                .value_name("R:G:B")
                .help("Night gamma, a single value or one per channel")
                .value_parser(|s: &str| s.parse::<Gamma>().map_err(|e| e.to_string())),
        )
        .arg(
            Arg::new("location")
                .long("location")
                .value_name("auto|manual")
                .help("Location provider")
                .value_parser(|s: &str| s.parse::<LocationProvider>()),
        )
        .arg(
            number_arg("lat", "DEGREES", "Manual latitude").allow_negative_numbers(true),
        )
        .arg(
            number_arg("lon", "DEGREES", "Manual longitude").allow_negative_numbers(true),
        )
        .arg(
            Arg::new("method")
                .long("method")
                .value_name("auto|randr|vidmode")
                .help("Adjustment method")
                .value_parser(|s: &str| s.parse::<AdjustmentMethod>()),
        )
        .arg(
            Arg::new("fade")
                .long("fade")
                .value_name("on|off")
                .help("Smooth transition between day and night")
                .value_parser(parse_switch),
        )
}

fn number_arg(name: &'static str, value_name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name(value_name)
        .help(help)
        .value_parser(value_parser!(f64))
}

fn parse_switch(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("expected on or off, got '{}'", other)),
    }
}

/// Convert clap matches into `CliArgs`
pub fn from_matches(matches: &ArgMatches) -> Result<CliArgs> {
    let command = match matches.subcommand() {
        Some(("show", sub)) => CliCommand::Show {
            json: sub.get_flag("json"),
        },
        Some(("set", sub)) => {
            let changes = settings_changes(sub)?;
            if changes.is_empty() {
                return Err(anyhow!("No settings given; see 'set --help'"));
            }
            CliCommand::Set(changes)
        }
        Some(("start", sub)) => CliCommand::Start(settings_changes(sub)?),
        Some(("stop", _)) => CliCommand::Stop,
        Some(("autostart", sub)) => CliCommand::Autostart(sub.get_one::<bool>("state").copied()),
        _ => return Err(anyhow!("No command given")),
    };

    Ok(CliArgs {
        config_path: matches.get_one::<PathBuf>("config").cloned(),
        autostart_dir: matches.get_one::<PathBuf>("autostart-dir").cloned(),
        program: matches
            .get_one::<String>("redshift")
            .cloned()
            .unwrap_or_else(|| REDSHIFT_PROGRAM.to_string()),
        verbosity: matches.get_count("verbose"),
        command,
    })
}

fn settings_changes(matches: &ArgMatches) -> Result<SettingsChanges> {
    let changes = SettingsChanges {
        temperature_day: matches.get_one::<f64>("temp-day").copied(),
        temperature_night: matches.get_one::<f64>("temp-night").copied(),
        brightness_day: matches.get_one::<f64>("brightness-day").copied(),
        brightness_night: matches.get_one::<f64>("brightness-night").copied(),
        gamma_day: matches.get_one::<Gamma>("gamma-day").copied(),
        gamma_night: matches.get_one::<Gamma>("gamma-night").copied(),
        location_provider: matches.get_one::<LocationProvider>("location").copied(),
        latitude: matches.get_one::<f64>("lat").copied(),
        longitude: matches.get_one::<f64>("lon").copied(),
        adjustment_method: matches.get_one::<AdjustmentMethod>("method").copied(),
        smooth_transition: matches.get_one::<bool>("fade").copied(),
    };

    for temperature in [changes.temperature_day, changes.temperature_night]
        .into_iter()
        .flatten()
    {
        if !(TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&temperature) {
            return Err(anyhow!(
                "Temperature {} K is outside {}-{} K",
                temperature,
                TEMPERATURE_MIN,
                TEMPERATURE_MAX
            ));
        }
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs> {
        let matches = build_command().try_get_matches_from(args)?;
        from_matches(&matches)
    }

    #[test]
    fn test_show_defaults() {
        let args = parse(&["redshift-settings", "show"]).unwrap();
        assert_eq!(args.command, CliCommand::Show { json: false });
        assert_eq!(args.program, "redshift");
        assert_eq!(args.config_path, None);
        assert_eq!(args.verbosity, 0);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&[
            "redshift-settings",
            "show",
            "--json",
            "--config",
            "/tmp/r.conf",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.command, CliCommand::Show { json: true });
        assert_eq!(args.config_path, Some(PathBuf::from("/tmp/r.conf")));
        assert_eq!(args.verbosity, 2);
    }

    #[test]
    fn test_set_collects_changes() {
        let args = parse(&[
            "redshift-settings",
            "set",
            "--temp-day",
            "6000",
            "--gamma-night",
            "0.3:0.2:0.1",
            "--location",
            "manual",
            "--lat",
            "-33.9",
            "--method",
            "vidmode",
            "--fade",
            "off",
        ])
        .unwrap();

        let CliCommand::Set(changes) = args.command else {
            panic!("expected set");
        };
        assert_eq!(changes.temperature_day, Some(6000.0));
        assert_eq!(changes.gamma_night, Some(Gamma::new(0.3, 0.2, 0.1)));
        assert_eq!(changes.location_provider, Some(LocationProvider::Manual));
        assert_eq!(changes.latitude, Some(-33.9));
        assert_eq!(changes.adjustment_method, Some(AdjustmentMethod::Vidmode));
        assert_eq!(changes.smooth_transition, Some(false));
        assert_eq!(changes.brightness_day, None);
    }

    #[test]
    fn test_set_without_changes_is_rejected() {
        assert!(parse(&["redshift-settings", "set"]).is_err());
    }

    #[test]
    fn test_start_accepts_no_changes() {
        let args = parse(&["redshift-settings", "start"]).unwrap();
        assert_eq!(args.command, CliCommand::Start(SettingsChanges::default()));
    }

    #[test]
    fn test_temperature_outside_range_is_rejected() {
        assert!(parse(&["redshift-settings", "set", "--temp-night", "500"]).is_err());
    }

    #[test]
    fn test_malformed_gamma_is_rejected() {
        assert!(parse(&["redshift-settings", "set", "--gamma-day", "0.5:0.5"]).is_err());
        assert!(parse(&["redshift-settings", "set", "--gamma-day", "bright"]).is_err());
    }

    #[test]
    fn test_autostart_state() {
        let args = parse(&["redshift-settings", "autostart"]).unwrap();
        assert_eq!(args.command, CliCommand::Autostart(None));

        let args = parse(&["redshift-settings", "autostart", "on"]).unwrap();
        assert_eq!(args.command, CliCommand::Autostart(Some(true)));

        assert!(parse(&["redshift-settings", "autostart", "maybe"]).is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(parse(&["redshift-settings"]).is_err());
    }
}
