//! Integration tests for the redshift settings backend
//!
//! Each test works on a private copy of `tests/fixtures/redshift.conf`.

use std::fs;
use std::path::{Path, PathBuf};

use redshift_settings::backend::autostart::AutostartChange;
use redshift_settings::backend::process::ProcessSupervisor;
use redshift_settings::backend::snapshot;
use redshift_settings::{
    AdjustmentMethod, Backend, BackendPaths, Gamma, LocationProvider, RedshiftState,
    RedshiftWrapper, TimePeriod,
};
use tempfile::{tempdir, TempDir};

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("redshift.conf")
}

fn paths_in(dir: &TempDir) -> BackendPaths {
    BackendPaths {
        config_path: dir.path().join("redshift.conf"),
        autostart_dir: dir.path().join("autostart"),
    }
}

fn harmless_process() -> ProcessSupervisor {
    ProcessSupervisor::new("true").with_kill_names(Vec::<String>::new())
}

/// Backend over a fresh copy of the fixture
fn setup() -> (TempDir, RedshiftWrapper) {
    let dir = tempdir().unwrap();
    fs::copy(fixture_path(), dir.path().join("redshift.conf")).unwrap();
    let backend = RedshiftWrapper::open(paths_in(&dir), harmless_process());
    (dir, backend)
}

fn reopen(dir: &TempDir) -> RedshiftWrapper {
    RedshiftWrapper::open(paths_in(dir), harmless_process())
}

#[test]
fn test_get_config_path() {
    let (dir, backend) = setup();
    assert_eq!(backend.config_path(), dir.path().join("redshift.conf").as_path());
}

#[test]
fn test_set_config_path() {
    let (_dir, mut backend) = setup();
    backend.set_config_path("/path/to/config");
    assert_eq!(backend.config_path(), Path::new("/path/to/config"));
}

#[test]
fn test_get_temperature() {
    let (_dir, backend) = setup();
    assert_eq!(backend.get_temperature(TimePeriod::Day), 5500.0);
    assert_eq!(backend.get_temperature(TimePeriod::Night), 4500.0);
}

#[test]
fn test_set_temperature() {
    let (_dir, mut backend) = setup();
    backend.set_temperature(TimePeriod::Day, 6500.0);
    backend.set_temperature(TimePeriod::Night, 3500.0);
    assert_eq!(backend.get_temperature(TimePeriod::Day), 6500.0);
    assert_eq!(backend.get_temperature(TimePeriod::Night), 3500.0);
}

#[test]
fn test_location_provider() {
    let (_dir, mut backend) = setup();
    assert_eq!(backend.get_location_provider(), LocationProvider::Manual);

    backend.set_location_provider(LocationProvider::Auto);
    assert_eq!(backend.get_location_provider(), LocationProvider::Auto);
}

#[test]
fn test_latitude_and_longitude() {
    let (_dir, mut backend) = setup();
    assert_eq!(backend.get_latitude(), 45.38);
    assert_eq!(backend.get_longitude(), 20.38);

    backend.set_latitude(14.33);
    backend.set_longitude(25.12);
    assert_eq!(backend.get_latitude(), 14.33);
    assert_eq!(backend.get_longitude(), 25.12);
}

#[test]
fn test_coordinates_are_stored_with_two_decimals() {
    let (dir, mut backend) = setup();
    backend.set_latitude(51.507351);
    backend.apply_changes().unwrap();

    let content = fs::read_to_string(dir.path().join("redshift.conf")).unwrap();
    assert!(content.contains("lat=51.51\n"));
    assert_eq!(backend.get_latitude(), 51.51);
}

#[test]
fn test_brightness() {
    let (_dir, mut backend) = setup();
    assert_eq!(backend.get_brightness(TimePeriod::Day), 0.8);
    assert_eq!(backend.get_brightness(TimePeriod::Night), 0.9);

    backend.set_brightness(TimePeriod::Day, 0.1);
    backend.set_brightness(TimePeriod::Night, 0.2);
    assert_eq!(backend.get_brightness(TimePeriod::Day), 0.1);
    assert_eq!(backend.get_brightness(TimePeriod::Night), 0.2);
}

#[test]
fn test_brightness_out_of_range_falls_back() {
    let (_dir, mut backend) = setup();
    backend.set_brightness(TimePeriod::Day, 1.5);
    backend.set_brightness(TimePeriod::Night, 0.0);
    assert_eq!(backend.get_brightness(TimePeriod::Day), 1.0);
    assert_eq!(backend.get_brightness(TimePeriod::Night), 1.0);
}

#[test]
fn test_get_gamma() {
    let (_dir, backend) = setup();
    assert_eq!(backend.get_gamma(TimePeriod::Day), Some(Gamma::new(0.1, 0.2, 0.3)));
    assert_eq!(backend.get_gamma(TimePeriod::Night), Some(Gamma::new(0.4, 0.5, 0.6)));
}

#[test]
fn test_set_gamma() {
    let (_dir, mut backend) = setup();
    backend.set_gamma(TimePeriod::Day, 0.6, 0.5, 0.4);
    backend.set_gamma(TimePeriod::Night, 0.3, 0.2, 0.1);
    assert_eq!(backend.get_gamma(TimePeriod::Day), Some(Gamma::new(0.6, 0.5, 0.4)));
    assert_eq!(backend.get_gamma(TimePeriod::Night), Some(Gamma::new(0.3, 0.2, 0.1)));
}

#[test]
fn test_gamma_channel_out_of_range_falls_back_per_channel() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("redshift.conf"),
        "[redshift]\ngamma-day=0.5:7:0.7\ngamma-night=0.5:0.6\n",
    )
    .unwrap();
    let backend = reopen(&dir);

    assert_eq!(backend.get_gamma(TimePeriod::Day), Some(Gamma::new(0.5, 1.0, 0.7)));
    assert_eq!(backend.get_gamma(TimePeriod::Night), None);
}

#[test]
fn test_adjustment_method() {
    let (dir, mut backend) = setup();
    assert_eq!(backend.get_adjustment_method(), AdjustmentMethod::Randr);

    backend.set_adjustment_method(AdjustmentMethod::Vidmode);
    assert_eq!(backend.get_adjustment_method(), AdjustmentMethod::Vidmode);

    backend.set_adjustment_method(AdjustmentMethod::Auto);
    assert_eq!(backend.get_adjustment_method(), AdjustmentMethod::Auto);
    backend.apply_changes().unwrap();

    let content = fs::read_to_string(dir.path().join("redshift.conf")).unwrap();
    assert!(!content.contains("adjustment-method"));
}

#[test]
fn test_smooth_transition() {
    let (_dir, mut backend) = setup();
    assert!(backend.get_smooth_transition());

    backend.set_smooth_transition(false);
    assert!(!backend.get_smooth_transition());
}

#[test]
fn test_apply_changes_persists_and_keeps_comments() {
    let (dir, mut backend) = setup();
    backend.set_temperature(TimePeriod::Night, 3500.0);
    backend.set_location_provider(LocationProvider::Auto);
    backend.set_smooth_transition(false);
    backend.apply_changes().unwrap();

    let reloaded = reopen(&dir);
    assert_eq!(reloaded.get_temperature(TimePeriod::Night), 3500.0);
    assert_eq!(reloaded.get_temperature(TimePeriod::Day), 5500.0);
    assert_eq!(reloaded.get_location_provider(), LocationProvider::Auto);
    assert!(!reloaded.get_smooth_transition());

    let content = fs::read_to_string(dir.path().join("redshift.conf")).unwrap();
    assert!(content.starts_with("; Global settings for redshift\n[redshift]\n"));
    assert!(content.contains("location-provider=geoclue2\n"));
    assert!(content.contains("fade=0\n"));
}

#[test]
fn test_changes_without_apply_are_not_persisted() {
    let (dir, mut backend) = setup();
    backend.set_temperature(TimePeriod::Day, 3000.0);

    let reloaded = reopen(&dir);
    assert_eq!(reloaded.get_temperature(TimePeriod::Day), 5500.0);
}

#[test]
fn test_missing_settings_file_is_created_with_parents() {
    let dir = tempdir().unwrap();
    let paths = BackendPaths {
        config_path: dir.path().join("a").join("b").join("redshift.conf"),
        autostart_dir: dir.path().join("autostart"),
    };
    let mut backend = RedshiftWrapper::open(paths.clone(), harmless_process());
    assert!(paths.config_path.exists());
    assert_eq!(backend.get_temperature(TimePeriod::Day), 6500.0);

    backend.set_temperature(TimePeriod::Day, 5000.0);
    backend.apply_changes().unwrap();
    let content = fs::read_to_string(&paths.config_path).unwrap();
    assert_eq!(content, "[redshift]\ntemp-day=5000\n");
}

#[test]
fn test_unparseable_values_fall_back_to_defaults() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("redshift.conf"),
        "[redshift]\ntemp-day=warm\nbrightness-night=\nfade=yes\nlocation-provider=Manual\n\
         adjustment-method=wayland\n[manual]\nlat=north\n",
    )
    .unwrap();
    let backend = reopen(&dir);

    assert_eq!(backend.get_temperature(TimePeriod::Day), 6500.0);
    assert_eq!(backend.get_brightness(TimePeriod::Night), 1.0);
    assert!(!backend.get_smooth_transition());
    assert_eq!(backend.get_location_provider(), LocationProvider::Auto);
    assert_eq!(backend.get_adjustment_method(), AdjustmentMethod::Auto);
    assert_eq!(backend.get_latitude(), 0.0);
}

#[test]
fn test_autostart_round_trip() {
    let (dir, mut backend) = setup();
    assert!(!backend.get_autostart());

    match backend.set_autostart(true).unwrap() {
        AutostartChange::Creating(write) => assert!(write.wait()),
        other => panic!("expected a new launcher, got {:?}", other),
    }
    assert!(backend.get_autostart());

    let launcher = fs::read_to_string(backend.autostart_entry().path()).unwrap();
    let expected_exec = format!("Exec=true -c {}\n", dir.path().join("redshift.conf").display());
    assert!(launcher.contains(&expected_exec));

    let change = backend.set_autostart(false).unwrap();
    assert!(matches!(change, AutostartChange::Toggled));
    assert!(!backend.get_autostart());
    assert!(backend.autostart_entry().path().exists());
}

#[test]
fn test_start_and_stop() {
    let (_dir, mut backend) = setup();
    assert_eq!(backend.state(), RedshiftState::Undefined);

    backend.start().unwrap();
    assert_eq!(backend.state(), RedshiftState::Running);

    backend.stop();
    assert_eq!(backend.state(), RedshiftState::Stopped);
    assert_eq!(backend.pid(), None);
}

#[test]
fn test_start_failure_reports_process_error() {
    let dir = tempdir().unwrap();
    let mut backend = RedshiftWrapper::open(
        paths_in(&dir),
        ProcessSupervisor::new("/nonexistent/redshift").with_kill_names(Vec::<String>::new()),
    );

    assert!(backend.start().is_err());
    assert_eq!(backend.state(), RedshiftState::Stopped);
}

#[test]
fn test_snapshot_through_trait_object() {
    let (_dir, backend) = setup();
    let backend: Box<dyn Backend> = Box::new(backend);
    let snapshot = snapshot(backend.as_ref());

    assert_eq!(snapshot.temperature_day, 5500.0);
    assert_eq!(snapshot.brightness_night, 0.9);
    assert_eq!(snapshot.location_provider, LocationProvider::Manual);
    assert_eq!(snapshot.adjustment_method, AdjustmentMethod::Randr);
    assert!(snapshot.smooth_transition);
    assert!(!snapshot.autostart);
}
