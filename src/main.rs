#![forbid(unsafe_code)]

mod cli;
mod logging;
mod output;

use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use redshift_settings::backend::autostart::AutostartChange;
use redshift_settings::backend::process::ProcessSupervisor;
use redshift_settings::backend::snapshot;
use redshift_settings::constants::KILL_PROCESS_NAMES;
use redshift_settings::{Backend, BackendPaths, RedshiftWrapper};

use cli::{CliCommand, SettingsChanges};
use logging::LogLevel;

/// How often `start` checks for signals and for redshift exiting
const POLL_INTERVAL: Duration = Duration::from_millis(200);

fn main() {
    if let Err(e) = try_main() {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = cli::parse_args()?;
    logging::init(LogLevel::from_verbosity(args.verbosity))?;

    let paths = BackendPaths::resolve(args.config_path, args.autostart_dir);
    let mut backend = RedshiftWrapper::open(paths, supervisor_for(&args.program));

    match args.command {
        CliCommand::Show { json } => {
            let snapshot = snapshot(&backend);
            if json {
                println!("{}", output::format_json(&snapshot)?);
            } else {
                println!("{}", output::format_human(&snapshot));
            }
            Ok(())
        }
        CliCommand::Set(changes) => {
            changes.apply_to(&mut backend);
            backend.apply_changes().context("Failed to save settings")?;
            println!("✅ Settings saved to {}", backend.config_path().display());
            Ok(())
        }
        CliCommand::Start(changes) => run(&mut backend, &changes),
        CliCommand::Stop => {
            backend.stop();
            println!("✅ redshift stopped");
            Ok(())
        }
        CliCommand::Autostart(None) => {
            let entry = backend.autostart_entry();
            println!(
                "Autostart: {} ({})",
                if backend.get_autostart() { "on" } else { "off" },
                entry.path().display()
            );
            Ok(())
        }
        CliCommand::Autostart(Some(enabled)) => set_autostart(&mut backend, enabled),
    }
}

/// Strays are only killed by name when the program is a known redshift binary
fn supervisor_for(program: &str) -> ProcessSupervisor {
    let supervisor = ProcessSupervisor::new(program);
    let known = Path::new(program)
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| KILL_PROCESS_NAMES.contains(&name));

    if known {
        supervisor
    } else {
        supervisor.with_kill_names(Vec::<String>::new())
    }
}

/// Stop, reconfigure, persist and relaunch; then supervise until a signal
/// arrives or redshift exits on its own.
fn run(backend: &mut RedshiftWrapper, changes: &SettingsChanges) -> Result<()> {
    let interrupted = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, interrupted.clone())
        .context("Failed to register SIGINT handler")?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, interrupted.clone())
        .context("Failed to register SIGTERM handler")?;

    backend.stop();
    if !changes.is_empty() {
        changes.apply_to(&mut *backend);
        backend.apply_changes().context("Failed to save settings")?;
    }

    backend.start().context("Failed to start redshift")?;
    match backend.pid() {
        Some(pid) => println!("🚀 redshift running (PID: {})", pid),
        None => println!("🚀 redshift running"),
    }

    let exit = supervise(backend, &interrupted);
    backend.stop();

    match exit {
        None => {
            println!("✅ redshift stopped");
            Ok(())
        }
        Some(status) if status.success() => {
            println!("✅ redshift exited");
            Ok(())
        }
        Some(status) => Err(anyhow!("redshift exited with {}", status)),
    }
}

/// `None` when interrupted, otherwise the exit status of redshift
fn supervise(backend: &mut RedshiftWrapper, interrupted: &AtomicBool) -> Option<ExitStatus> {
    loop {
        if interrupted.load(Ordering::Relaxed) {
            return None;
        }
        if let Some(status) = backend.poll_exit() {
            return Some(status);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn set_autostart(backend: &mut RedshiftWrapper, enabled: bool) -> Result<()> {
    let change = backend
        .set_autostart(enabled)
        .context("Failed to update autostart")?;

    if let AutostartChange::Creating(write) = change {
        if !write.wait() {
            bail!(
                "Could not write launcher {}",
                backend.autostart_entry().path().display()
            );
        }
    }

    println!("✅ Autostart {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}
