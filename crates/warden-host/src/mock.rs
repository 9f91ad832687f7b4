//! Mock process host for testing

use std::sync::Mutex;

use crate::{HostError, HostResult, ProcessHost, ProcessInfo};

/// Mock host with a settable process list for unit/integration testing
pub struct MockHost {
    processes: Mutex<Vec<ProcessInfo>>,
    killed: Mutex<Vec<u32>>,
    fail_kill: Mutex<bool>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            processes: Mutex::new(Vec::new()),
            killed: Mutex::new(Vec::new()),
            fail_kill: Mutex::new(false),
        }
    }

    pub fn with_processes(processes: Vec<ProcessInfo>) -> Self {
        let host = Self::new();
        *host.processes.lock().unwrap() = processes;
        host
    }

    /// Replace the simulated process list (e.g. to relaunch after a kill).
    pub fn set_processes(&self, processes: Vec<ProcessInfo>) {
        *self.processes.lock().unwrap() = processes;
    }

    /// Configure terminate to fail.
    pub fn set_fail_kill(&self, fail: bool) {
        *self.fail_kill.lock().unwrap() = fail;
    }

    /// PIDs that were successfully terminated, in order.
    pub fn killed_pids(&self) -> Vec<u32> {
        self.killed.lock().unwrap().clone()
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessHost for MockHost {
    fn processes(&self) -> Vec<ProcessInfo> {
        self.processes.lock().unwrap().clone()
    }

    fn terminate(&self, pid: u32) -> HostResult<()> {
        if *self.fail_kill.lock().unwrap() {
            return Err(HostError::TerminateFailed(pid));
        }

        let mut processes = self.processes.lock().unwrap();
        match processes.iter().position(|p| p.pid == pid) {
            Some(idx) => {
                processes.remove(idx);
                self.killed.lock().unwrap().push(pid);
                Ok(())
            }
            None => Err(HostError::ProcessGone(pid)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminate_removes_process() {
        let host = MockHost::with_processes(vec![ProcessInfo::new(100, "game")]);

        host.terminate(100).unwrap();
        assert!(host.processes().is_empty());
        assert_eq!(host.killed_pids(), vec![100]);
    }

    #[test]
    fn terminate_unknown_pid_reports_gone() {
        let host = MockHost::new();
        assert!(matches!(host.terminate(42), Err(HostError::ProcessGone(42))));
    }

    #[test]
    fn terminate_failure_injection() {
        let host = MockHost::with_processes(vec![ProcessInfo::new(100, "game")]);
        host.set_fail_kill(true);

        assert!(matches!(
            host.terminate(100),
            Err(HostError::TerminateFailed(100))
        ));
        // The process stays alive for the next cycle to retry.
        assert_eq!(host.processes().len(), 1);
    }
}
