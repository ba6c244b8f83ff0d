//! Process resource introspection.
//!
//! # Responsibilities
//! - Report live task count, resident memory and logical CPU count
//! - Stay behind a trait so probes can be driven by fixed numbers in tests

use std::sync::Mutex;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Version of the compiler that built this binary, captured by `build.rs`.
pub const RUSTC_VERSION: &str = env!("BUILD_RUSTC_VERSION");

/// Runtime label reported alongside resource counters.
pub const RUNTIME_VERSION: &str = concat!("rust-", env!("BUILD_RUSTC_VERSION"), " tokio");

/// Point-in-time resource counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemSnapshot {
    /// Live tokio tasks (one per in-flight request plus background work).
    pub active_workers: usize,
    /// Resident memory of this process in MiB.
    pub memory_mb: u64,
    /// Logical CPUs available to the process.
    pub num_cpu: usize,
}

pub trait SystemIntrospector: Send + Sync {
    fn snapshot(&self) -> SystemSnapshot;

    fn runtime_version(&self) -> String {
        RUNTIME_VERSION.to_string()
    }
}

/// Reads counters from the tokio runtime and the OS process table.
pub struct RuntimeIntrospector {
    system: Mutex<System>,
    pid: Option<Pid>,
}

impl RuntimeIntrospector {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    fn memory_mb(&self) -> u64 {
        let Some(pid) = self.pid else {
            return 0;
        };
        let Ok(mut system) = self.system.lock() else {
            return 0;
        };
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        system
            .process(pid)
            .map(|p| p.memory() / 1024 / 1024)
            .unwrap_or(0)
    }
}

impl Default for RuntimeIntrospector {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemIntrospector for RuntimeIntrospector {
    fn snapshot(&self) -> SystemSnapshot {
        let active_workers = tokio::runtime::Handle::try_current()
            .map(|h| h.metrics().num_alive_tasks())
            .unwrap_or(0);
        let num_cpu = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        SystemSnapshot {
            active_workers,
            memory_mb: self.memory_mb(),
            num_cpu,
        }
    }
}

/// Always reports the same counters.
#[derive(Debug, Clone, Copy)]
pub struct FixedIntrospector(pub SystemSnapshot);

impl SystemIntrospector for FixedIntrospector {
    fn snapshot(&self) -> SystemSnapshot {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runtime_snapshot_is_plausible() {
        let snapshot = RuntimeIntrospector::new().snapshot();
        assert!(snapshot.num_cpu >= 1);
        assert!(snapshot.memory_mb < 1024 * 1024);
    }

    #[test]
    fn outside_runtime_reports_zero_workers() {
        let snapshot = RuntimeIntrospector::new().snapshot();
        assert_eq!(snapshot.active_workers, 0);
    }

    #[test]
    fn runtime_version_label() {
        let fixed = FixedIntrospector(SystemSnapshot {
            active_workers: 1,
            memory_mb: 1,
            num_cpu: 1,
        });
        assert!(fixed.runtime_version().starts_with("rust-"));
    }

    #[test]
    fn runtime_version_names_the_building_compiler() {
        assert_ne!(RUSTC_VERSION, env!("CARGO_PKG_RUST_VERSION"));
        assert!(RUSTC_VERSION == "unknown" || RUSTC_VERSION.starts_with("1."));
        assert_eq!(RUNTIME_VERSION, format!("rust-{} tokio", RUSTC_VERSION));
    }
}
