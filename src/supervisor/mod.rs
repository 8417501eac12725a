//! ProcessSupervisor - Capture Worker Lifecycle
//!
//! ## Responsibilities
//!
//! - Spawn worker processes (external interpreter + script) with output
//!   streams captured
//! - Liveness probe by null signal; a zombie counts as dead for scheduling
//! - Idempotent hard kill with a fixed grace period
//!
//! No operation returns an error across the public boundary: failures
//! degrade to `None`/`false` and are logged, the caller branches on the
//! result.

use chrono::{DateTime, Utc};
use nix::sys::signal::{kill as send_signal, Signal};
use nix::unistd::Pid;
use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, RwLock};

/// Grace period between SIGKILL and the confirmation probe
const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Last observed state of a managed process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Stopped,
    Unknown,
}

/// Record of a spawned worker. Dropped once the process is confirmed
/// stopped.
#[derive(Debug, Clone)]
pub struct ManagedProcess {
    pub pid: u32,
    pub command: String,
    pub started_at: DateTime<Utc>,
    pub last_known_state: ProcessState,
}

/// Supervisor for spawned capture workers
pub struct ProcessSupervisor {
    registry: RwLock<HashMap<u32, ManagedProcess>>,
    /// Child handles kept so the captured output pipes stay open; a handle
    /// is dropped (and the child reaped) when its record is dropped.
    handles: Mutex<HashMap<u32, Child>>,
    grace_period: Duration,
}

impl ProcessSupervisor {
    pub fn new() -> Self {
        Self::with_grace_period(DEFAULT_GRACE_PERIOD)
    }

    /// Grace period injection for tests
    pub fn with_grace_period(grace_period: Duration) -> Self {
        Self {
            registry: RwLock::new(HashMap::new()),
            handles: Mutex::new(HashMap::new()),
            grace_period,
        }
    }

    /// Spawn a worker process with stdout/stderr captured. Returns the pid,
    /// or `None` if the launch failed (logged, never raised).
    pub async fn spawn(&self, program: &str, args: &[String]) -> Option<u32> {
        let command_line = if args.is_empty() {
            program.to_string()
        } else {
            format!("{} {}", program, args.join(" "))
        };
        tracing::info!(command = %command_line, "Spawning worker process");

        let spawned = Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        match spawned {
            Ok(child) => {
                let Some(pid) = child.id() else {
                    tracing::error!(command = %command_line, "Worker exited before pid was read");
                    return None;
                };
                self.registry.write().await.insert(
                    pid,
                    ManagedProcess {
                        pid,
                        command: command_line,
                        started_at: Utc::now(),
                        last_known_state: ProcessState::Running,
                    },
                );
                self.handles.lock().await.insert(pid, child);
                tracing::info!(pid, "Worker process spawned");
                Some(pid)
            }
            Err(e) => {
                tracing::error!(command = %command_line, error = %e, "Unable to spawn worker");
                None
            }
        }
    }

    /// Probe whether a process is running. A signal-delivery error means
    /// not running; so does a terminated-but-unreaped (zombie) process.
    pub async fn check_liveness(&self, pid: u32) -> bool {
        let alive = send_signal(Pid::from_raw(pid as i32), None).is_ok() && !is_zombie(pid);
        self.note_state(pid, alive).await;
        if !alive {
            self.drop_record(pid).await;
        }
        alive
    }

    /// Kill a process. Idempotent: an already-stopped pid returns `true`
    /// immediately with no grace delay. Otherwise a single SIGKILL is sent
    /// (no graceful-terminate step), the grace period elapses, and `true`
    /// is returned only if the process is confirmed stopped.
    pub async fn kill(&self, pid: u32) -> bool {
        if !self.check_liveness(pid).await {
            tracing::info!(pid, "Process already stopped");
            return true;
        }

        tracing::info!(pid, "Killing process");
        if let Err(e) = send_signal(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            tracing::error!(pid, error = %e, "Unable to deliver SIGKILL");
            return false;
        }

        tokio::time::sleep(self.grace_period).await;

        let stopped = !self.check_liveness(pid).await;
        if stopped {
            tracing::info!(pid, "Process confirmed stopped");
        } else {
            tracing::error!(pid, "Process still running after grace period");
        }
        stopped
    }

    /// Snapshot of a managed process record, if still tracked
    pub async fn get(&self, pid: u32) -> Option<ManagedProcess> {
        self.registry.read().await.get(&pid).cloned()
    }

    async fn note_state(&self, pid: u32, alive: bool) {
        if let Some(record) = self.registry.write().await.get_mut(&pid) {
            record.last_known_state = if alive {
                ProcessState::Running
            } else {
                ProcessState::Stopped
            };
        }
    }

    /// Drop the record and reap the child once confirmed stopped
    async fn drop_record(&self, pid: u32) {
        self.registry.write().await.remove(&pid);
        if let Some(mut child) = self.handles.lock().await.remove(&pid) {
            let _ = child.wait().await;
        }
    }
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

/// A zombie has terminated but not been reaped; it counts as dead for
/// scheduling even though the OS still lists the pid.
fn is_zombie(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => {
            // state is the first field after the parenthesized comm,
            // which may itself contain spaces and parentheses
            stat.rsplit_once(')')
                .and_then(|(_, rest)| rest.split_whitespace().next())
                .map(|state| state == "Z")
                .unwrap_or(false)
        }
        // stat unreadable while the signal probe succeeded: exited between
        // the two checks
        Err(_) => true,
    }
}
