//! # Kernel Status
//!
//! The kernel moves through three states:
//!
//! ```text
//! Idle ──start()──► Starting ──worker init done──► Running
//!  ▲                   │                              │
//!  └──graph invalid────┘                              │
//!  └──────────────────────────stop()──────────────────┘
//! ```
//!
//! [`StatusCell`] is the only value shared between the controller and the
//! worker. Every read and write goes through a single atomic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a [`Kernel`](crate::Kernel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    /// No worker is running. The registry may be mutated.
    #[default]
    Idle,
    /// A worker has been launched and is validating the graph or running `init`.
    Starting,
    /// Every module has been initialised and tick passes are running.
    Running,
}

impl Status {
    /// Returns `true` if the registry may be mutated.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns `true` while a worker owns the current run.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Starting | Self::Running)
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Starting => 1,
            Self::Running => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Starting,
            2 => Self::Running,
            _ => Self::Idle,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
        };
        f.write_str(label)
    }
}

/// Atomic tri-state shared between the controller and the worker.
#[derive(Debug, Default)]
pub struct StatusCell {
    inner: AtomicU8,
}

impl StatusCell {
    pub fn new(status: Status) -> Self {
        Self {
            inner: AtomicU8::new(status.as_u8()),
        }
    }

    pub fn load(&self) -> Status {
        Status::from_u8(self.inner.load(Ordering::Acquire))
    }

    pub fn store(&self, status: Status) {
        self.inner.store(status.as_u8(), Ordering::Release);
    }

    /// Moves from `from` to `to` only if the current state is `from`.
    ///
    /// On failure returns the state that was observed instead.
    pub fn transition(&self, from: Status, to: Status) -> Result<(), Status> {
        self.inner
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(Status::from_u8)
    }
}
