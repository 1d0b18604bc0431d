//! Desktop autostart integration
//!
//! Handles launcher descriptor generation, enable/disable inspection and
//! in-place toggling of `$XDG_CONFIG_HOME/autostart/<app>.desktop`.
//! New descriptors are written off the caller's thread; the returned
//! [`LauncherWrite`] can be awaited or dropped.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};

use crate::backend::keyfile::KeyFile;
use crate::constants::{
    APP_ID, DESKTOP_ENTRY_GROUP, KEY_AUTOSTART_ENABLED, KEY_HIDDEN, LAUNCHER_NAME,
};
use crate::models::BackendError;

/// Launcher descriptor contents
#[derive(Debug, Clone, PartialEq)]
pub struct LauncherDescriptor {
    /// Display name of the entry
    pub name: String,
    /// Command line run at login
    pub exec: String,
    /// `true` disables the entry
    pub hidden: bool,
    /// Desktop-specific enable flag
    pub autostart_enabled: bool,
}

impl LauncherDescriptor {
    /// Descriptor that runs `<program> -c <config_path>` at login
    pub fn new(program: &str, config_path: &Path) -> Self {
        Self {
            name: LAUNCHER_NAME.to_string(),
            exec: format!("{} -c {}", program, quote_exec_arg(&config_path.to_string_lossy())),
            hidden: false,
            autostart_enabled: true,
        }
    }

    /// Generate the `.desktop` file content
    pub fn generate(&self) -> String {
        let mut file = KeyFile::new();
        file.set_string(DESKTOP_ENTRY_GROUP, "Name", &self.name);
        file.set(DESKTOP_ENTRY_GROUP, "Exec", self.exec.as_str());
        file.set(DESKTOP_ENTRY_GROUP, "Type", "Application");
        file.set_bool(DESKTOP_ENTRY_GROUP, KEY_HIDDEN, self.hidden);
        file.set_bool(DESKTOP_ENTRY_GROUP, KEY_AUTOSTART_ENABLED, self.autostart_enabled);
        file.to_string()
    }
}

/// Outcome of [`AutostartEntry::set_enabled`]
#[derive(Debug)]
pub enum AutostartChange {
    /// Nothing to do (disabling without a launcher file)
    Unchanged,
    /// Existing launcher flags were rewritten in place
    Toggled,
    /// A new launcher is being written in the background
    Creating(LauncherWrite),
}

/// Handle to a launcher file being written in the background.
///
/// On failure the partially written file is removed and the error logged.
#[derive(Debug)]
pub struct LauncherWrite {
    handle: JoinHandle<bool>,
}

impl LauncherWrite {
    /// Block until the write finishes; returns whether the file was written
    pub fn wait(self) -> bool {
        self.handle.join().unwrap_or(false)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Location of the launcher file for this application
#[derive(Debug, Clone, PartialEq)]
pub struct AutostartEntry {
    path: PathBuf,
}

impl AutostartEntry {
    /// Launcher file inside `autostart_dir`
    pub fn new(autostart_dir: &Path) -> Self {
        Self {
            path: autostart_dir.join(format!("{}.desktop", APP_ID)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Enabled when the file exists and is not disabled by its flags.
    /// `Hidden` takes precedence over the desktop-specific flag. A file that
    /// exists but cannot be read counts as enabled.
    pub fn is_enabled(&self) -> bool {
        if !self.path.exists() {
            return false;
        }

        let file = match KeyFile::load(&self.path) {
            Ok(file) => file,
            Err(e) => {
                debug!("Could not read {}: {}", self.path.display(), e);
                return true;
            }
        };

        if let Some(hidden) = file.get_bool(DESKTOP_ENTRY_GROUP, KEY_HIDDEN) {
            return !hidden;
        }
        file.get_bool(DESKTOP_ENTRY_GROUP, KEY_AUTOSTART_ENABLED)
            .unwrap_or(true)
    }

    /// Enable or disable autostart.
    ///
    /// An existing file only gets its flags toggled. A missing file is
    /// created (parent directory first) when enabling; disabling without
    /// a file is a no-op.
    pub fn set_enabled(
        &self,
        enabled: bool,
        descriptor: &LauncherDescriptor,
    ) -> Result<AutostartChange, BackendError> {
        if self.path.exists() {
            self.toggle(enabled)?;
            return Ok(AutostartChange::Toggled);
        }

        if !enabled {
            return Ok(AutostartChange::Unchanged);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| BackendError::filesystem(parent, e))?;
        }

        let path = self.path.clone();
        let content = descriptor.generate();
        let handle = thread::spawn(move || write_new_launcher(&path, &content));
        Ok(AutostartChange::Creating(LauncherWrite { handle }))
    }

    fn toggle(&self, enabled: bool) -> Result<(), BackendError> {
        let mut file =
            KeyFile::load(&self.path).map_err(|e| BackendError::filesystem(&self.path, e))?;
        file.set_bool(DESKTOP_ENTRY_GROUP, KEY_HIDDEN, !enabled);
        file.set_bool(DESKTOP_ENTRY_GROUP, KEY_AUTOSTART_ENABLED, enabled);
        file.save(&self.path)
            .map_err(|e| BackendError::filesystem(&self.path, e))?;

        info!(
            "Autostart {} in {}",
            if enabled { "enabled" } else { "disabled" },
            self.path.display()
        );
        Ok(())
    }
}

fn write_new_launcher(path: &Path, content: &str) -> bool {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!("Could not create launcher {}: {}", path.display(), e);
            return false;
        }
    };

    if let Err(e) = file.write_all(content.as_bytes()).and_then(|_| file.sync_all()) {
        warn!("Could not write launcher {}: {}", path.display(), e);
        drop(file);
        let _ = fs::remove_file(path);
        return false;
    }

    info!("Autostart launcher created at {}", path.display());
    true
}

/// Quote an Exec argument when it contains characters the launcher
/// format treats specially.
fn quote_exec_arg(arg: &str) -> String {
    let needs_quotes = arg
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | '$' | '`'));
    if !needs_quotes {
        return arg.to_string();
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if matches!(c, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
