//! Lifecycle of the external adjustment process
//!
//! At most one adjustment process is tracked at a time. Stopping is
//! best-effort and goes through several channels so that no adjustment
//! lingers even when the tracked handle is stale:
//! - SIGTERM to the tracked child
//! - SIGKILL to every process with a known adjustment-tool name
//! - `<program> -x` for each adjustment method, resetting the gamma ramps
//!
//! None of these are awaited; helper processes are reaped lazily.

use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};

use log::{debug, info, warn};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use sysinfo::{PidExt, ProcessExt, System, SystemExt};

use crate::constants::{KILL_PROCESS_NAMES, RESET_METHODS};
use crate::models::{BackendError, RedshiftState};

/// Owns the adjustment process handle and its state machine
#[derive(Debug)]
pub struct ProcessSupervisor {
    /// Executable launched on start and used for reset commands
    program: String,
    /// Process names killed unconditionally on stop
    kill_names: Vec<String>,
    /// Methods passed to `-m` for the reset commands (plain `-x` always runs)
    reset_methods: Vec<String>,
    /// Currently tracked adjustment process
    child: Option<Child>,
    /// Stopped children and reset helpers not yet reaped
    pending: Vec<Child>,
    state: RedshiftState,
}

impl ProcessSupervisor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            kill_names: KILL_PROCESS_NAMES.iter().map(|s| s.to_string()).collect(),
            reset_methods: RESET_METHODS.iter().map(|s| s.to_string()).collect(),
            child: None,
            pending: Vec::new(),
            state: RedshiftState::Undefined,
        }
    }

    /// Replace the list of process names killed on stop
    pub fn with_kill_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kill_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn state(&self) -> RedshiftState {
        self.state
    }

    /// PID of the tracked process, if one is running
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// Launch `<program> -P -c <config_path>`, stopping any previous instance first
    pub fn start(&mut self, config_path: &Path) -> Result<(), BackendError> {
        if self.state != RedshiftState::Stopped {
            self.stop();
        }

        let child = Command::new(&self.program)
            .arg("-P")
            .arg("-c")
            .arg(config_path)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| BackendError::Process {
                program: self.program.clone(),
                source,
            })?;

        info!(
            "Started {} (pid {}) with {}",
            self.program,
            child.id(),
            config_path.display()
        );
        self.child = Some(child);
        self.state = RedshiftState::Running;
        Ok(())
    }

    /// Terminate through every channel; always lands on `Stopped`
    pub fn stop(&mut self) {
        self.reap_pending();

        let tracked = self.child.take();
        let tracked_pid = tracked.as_ref().map(Child::id);
        if let Some(child) = tracked {
            self.terminate(child);
        }

        self.kill_by_name(tracked_pid);
        self.reset_gamma();

        self.state = RedshiftState::Stopped;
        info!("Stopped {}", self.program);
    }

    /// Check whether the tracked process has exited on its own
    pub fn poll_exit(&mut self) -> Option<ExitStatus> {
        let status = match self.child.as_mut()?.try_wait() {
            Ok(status) => status?,
            Err(e) => {
                warn!("Could not query {}: {}", self.program, e);
                return None;
            }
        };

        self.child = None;
        self.state = RedshiftState::Stopped;
        info!("{} exited with {}", self.program, status);
        Some(status)
    }

    fn terminate(&mut self, mut child: Child) {
        let pid = child.id();
        if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            debug!("SIGTERM to {} failed ({}), killing", pid, e);
            let _ = child.kill();
        }
        self.pending.push(child);
    }

    fn kill_by_name(&self, spare: Option<u32>) {
        if self.kill_names.is_empty() {
            return;
        }

        let own_pid = std::process::id();
        let mut system = System::new();
        system.refresh_processes();

        for (pid, process) in system.processes() {
            let pid = pid.as_u32();
            if pid == own_pid || Some(pid) == spare {
                continue;
            }
            if self.kill_names.iter().any(|name| name == process.name()) {
                debug!("Killing stray {} (pid {})", process.name(), pid);
                process.kill_with(sysinfo::Signal::Kill);
            }
        }
    }

    fn reset_gamma(&mut self) {
        let mut commands = vec![vec!["-x".to_string()]];
        commands.extend(
            self.reset_methods
                .iter()
                .map(|method| vec!["-x".to_string(), "-m".to_string(), method.clone()]),
        );

        for args in commands {
            let spawned = Command::new(&self.program)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();

            match spawned {
                Ok(child) => self.pending.push(child),
                Err(e) => debug!("Reset {} {:?} failed: {}", self.program, args, e),
            }
        }
    }

    fn reap_pending(&mut self) {
        self.pending
            .retain_mut(|child| !matches!(child.try_wait(), Ok(Some(_)) | Err(_)));
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        if let Some(child) = self.child.take() {
            self.terminate(child);
        }
        self.reap_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn harmless(program: &str) -> ProcessSupervisor {
        ProcessSupervisor::new(program).with_kill_names(Vec::<String>::new())
    }

    #[test]
    fn test_initial_state_is_undefined() {
        let supervisor = harmless("true");
        assert_eq!(supervisor.state(), RedshiftState::Undefined);
        assert_eq!(supervisor.pid(), None);
    }

    #[test]
    fn test_stop_always_lands_on_stopped() {
        let mut supervisor = harmless("true");
        supervisor.stop();
        assert_eq!(supervisor.state(), RedshiftState::Stopped);
        supervisor.stop();
        assert_eq!(supervisor.state(), RedshiftState::Stopped);
    }

    #[test]
    fn test_start_tracks_new_process() {
        let mut supervisor = harmless("true");
        supervisor.start(Path::new("/tmp/redshift.conf")).unwrap();
        assert_eq!(supervisor.state(), RedshiftState::Running);
        assert!(supervisor.pid().is_some());
    }

    #[test]
    fn test_restart_replaces_tracked_process() {
        let mut supervisor = harmless("true");
        supervisor.start(Path::new("/tmp/redshift.conf")).unwrap();
        let first = supervisor.pid();
        supervisor.start(Path::new("/tmp/redshift.conf")).unwrap();

        assert_eq!(supervisor.state(), RedshiftState::Running);
        assert_ne!(supervisor.pid(), first);
    }

    #[test]
    fn test_spawn_failure_is_process_error() {
        let mut supervisor = harmless("/nonexistent/redshift-binary");
        let err = supervisor.start(Path::new("/tmp/redshift.conf")).unwrap_err();

        assert!(matches!(err, BackendError::Process { .. }));
        assert_eq!(supervisor.state(), RedshiftState::Stopped);
        assert_eq!(supervisor.pid(), None);
    }

    #[test]
    fn test_poll_exit_detects_finished_process() {
        let mut supervisor = harmless("true");
        supervisor.start(Path::new("/tmp/redshift.conf")).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut status = None;
        while status.is_none() && Instant::now() < deadline {
            status = supervisor.poll_exit();
            std::thread::sleep(Duration::from_millis(10));
        }

        assert!(status.is_some());
        assert_eq!(supervisor.state(), RedshiftState::Stopped);
        assert_eq!(supervisor.pid(), None);
    }
}
