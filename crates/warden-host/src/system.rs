//! Live process host backed by `sysinfo`

use std::sync::Mutex;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tracing::debug;

use crate::{HostError, HostResult, ProcessHost, ProcessInfo};

/// Process host that enumerates and terminates real processes.
pub struct SystemHost {
    system: Mutex<System>,
}

impl SystemHost {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessHost for SystemHost {
    fn processes(&self) -> Vec<ProcessInfo> {
        let mut system = match self.system.lock() {
            Ok(system) => system,
            Err(_) => return Vec::new(),
        };

        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_exe(UpdateKind::OnlyIfNotSet),
        );

        system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessInfo {
                pid: pid.as_u32(),
                name: process.name().to_string_lossy().into_owned(),
                exe: process.exe().map(|path| path.to_path_buf()),
            })
            .collect()
    }

    fn terminate(&self, pid: u32) -> HostResult<()> {
        let mut system = self
            .system
            .lock()
            .map_err(|_| HostError::Internal("host lock poisoned".into()))?;

        let target = Pid::from_u32(pid);
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[target]),
            false,
            ProcessRefreshKind::nothing(),
        );

        let Some(process) = system.process(target) else {
            return Err(HostError::ProcessGone(pid));
        };

        if process.kill() {
            debug!(pid, "Termination signal sent");
            Ok(())
        } else {
            Err(HostError::TerminateFailed(pid))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_includes_current_process() {
        let host = SystemHost::new();
        let own_pid = std::process::id();

        let processes = host.processes();
        assert!(processes.iter().any(|p| p.pid == own_pid));
    }

    #[test]
    fn terminating_unknown_pid_reports_gone() {
        let host = SystemHost::new();

        // PIDs near u32::MAX are not valid on any supported platform.
        let result = host.terminate(u32::MAX - 1);
        assert!(matches!(result, Err(HostError::ProcessGone(_))));
    }
}
