//! # Kernel Errors
//!
//! Every expected failure of the kernel is a [`KernelError`] variant. There are
//! three groups:
//!
//! - **Configuration** (`NotIdle`, `DuplicateModule`, `NotFound`,
//!   `UnknownDependency`): the caller fixes the registration and retries.
//! - **Structural** (`CyclicDependency`): found when the worker sorts the graph.
//!   The kernel returns to `Idle` and no hook runs.
//! - **Worker** (`StoppedDuringStartup`, `WorkerLost`, `WorkerFailed`,
//!   `GraceExceeded`): problems observed while coordinating with the worker.

use crate::status::Status;
use std::time::Duration;

/// Errors that can occur within the kernel itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KernelError {
    #[error("Kernel is not idle (status: {0})")]
    NotIdle(Status),
    #[error("Module already registered: {0}")]
    DuplicateModule(String),
    #[error("Module not found: {0}")]
    NotFound(String),
    #[error("Dependency '{dependency}' of module '{module}' not found")]
    UnknownDependency { module: String, dependency: String },
    #[error("Cyclic dependency between modules: {}", modules.join(", "))]
    CyclicDependency { modules: Vec<String> },
    #[error("Kernel was stopped before startup completed")]
    StoppedDuringStartup,
    #[error("Worker exited without reporting startup")]
    WorkerLost,
    #[error("Worker task failed: {0}")]
    WorkerFailed(String),
    #[error("Shutdown grace period of {0:?} exceeded")]
    GraceExceeded(Duration),
}

impl KernelError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            KernelError::NotIdle(_) => "kernel_not_idle",
            KernelError::DuplicateModule(_) => "module_duplicate",
            KernelError::NotFound(_) => "module_not_found",
            KernelError::UnknownDependency { .. } => "dependency_unknown",
            KernelError::CyclicDependency { .. } => "dependency_cycle",
            KernelError::StoppedDuringStartup => "startup_stopped",
            KernelError::WorkerLost => "worker_lost",
            KernelError::WorkerFailed(_) => "worker_failed",
            KernelError::GraceExceeded(_) => "shutdown_grace_exceeded",
        }
    }
}
