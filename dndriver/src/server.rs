//! Lifetime of the automation endpoint's own process (WinAppDriver.exe).

use crate::AutomationError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use sysinfo::{ProcessesToUpdate, System};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, instrument, warn};

/// Guard for an automation server this program may have started.
///
/// A server found already running is left alone. One started here is killed
/// by [`AutomationServer::shutdown`], or when the guard is dropped on any
/// other path out of the run.
#[derive(Debug)]
pub struct AutomationServer {
    path: PathBuf,
    child: Option<Child>,
}

impl AutomationServer {
    /// Start the server at `path` with `args` unless a process with that
    /// executable is already running.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn ensure_running(
        path: impl AsRef<Path>,
        args: &[String],
    ) -> Result<Self, AutomationError> {
        let path = path.as_ref().to_path_buf();
        if is_running(&path) {
            info!("Automation server already running");
            return Ok(Self { path, child: None });
        }

        let mut child = Command::new(&path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AutomationError::Process(format!("Failed to start {}: {e}", path.display()))
            })?;

        info!(pid = ?child.id(), "Automation server started");
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_output(stdout, false));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_output(stderr, true));
        }

        Ok(Self {
            path,
            child: Some(child),
        })
    }

    /// Whether this guard started the process (and will stop it)
    pub fn launched(&self) -> bool {
        self.child.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Process id of a server started here
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// Stop the server if it was started here. Failures are only logged.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub async fn shutdown(mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        match child.kill().await {
            Ok(()) => info!("Automation server stopped"),
            Err(e) => warn!("Failed to stop automation server: {}", e),
        }
    }
}

/// True when some running process was started from `path`
pub fn is_running(path: &Path) -> bool {
    // process tables hold absolute, resolved paths
    let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);
    system
        .processes()
        .values()
        .filter_map(|process| process.exe())
        .any(|exe| same_executable(exe, &path))
}

#[cfg(target_os = "windows")]
fn same_executable(a: &Path, b: &Path) -> bool {
    // canonical paths carry the verbatim prefix, process paths do not
    let plain = |p: &Path| p.to_string_lossy().trim_start_matches(r"\\?\").to_string();
    plain(a).eq_ignore_ascii_case(&plain(b))
}

#[cfg(not(target_os = "windows"))]
fn same_executable(a: &Path, b: &Path) -> bool {
    a == b
}

async fn forward_output<R: AsyncRead + Unpin>(reader: R, is_stderr: bool) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if is_stderr => warn!(target: "automation_server", "{}", line),
            Ok(Some(line)) => info!(target: "automation_server", "{}", line),
            Ok(None) => break,
            Err(e) => {
                debug!("Stopped reading automation server output: {}", e);
                break;
            }
        }
    }
}
