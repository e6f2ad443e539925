//! # Module Kernel
//!
//! An in-process orchestrator for named, interdependent modules. You register
//! modules together with the names of the modules they depend on. The kernel
//! computes a dependency-respecting order and runs every module through
//! `init` → repeated `tick` → `halt` on one dedicated worker task.
//!
//! ## Architecture Overview
//!
//! ```text
//! Registry ──► DependencyGraph ──► topological_order ──► worker
//!  (add/remove)   (resolve names)     (Kahn, stable)       (init → tick… → halt)
//! ```
//!
//! 1. **Module layer** ([`Module`]): the three hooks, each a no-op by default.
//! 2. **Graph layer** ([`graph`], [`sort`]): validates the registry and orders it.
//! 3. **Runtime layer** ([`Kernel`]): the Idle / Starting / Running state
//!    machine and the worker that drives the hooks.
//!
//! ## Ordering guarantees
//!
//! - init order is a topological order. Ties break by registration order.
//! - Every tick pass runs the modules in that same order.
//! - halt order is the exact reverse of init order.
//!
//! ## Concurrency Model
//!
//! - One worker task per run. `start` refuses to launch a second one.
//! - The registry is mutated only while `Idle`, through `&mut Kernel`. The
//!   worker reads the snapshot it captured at start time.
//! - The status is one atomic shared by both sides. The controller waits for
//!   startup on a oneshot channel.
//! - Cancellation is cooperative. `stop` is observed between tick passes,
//!   never inside a hook.
//!
//! ## Testing
//!
//! The [`mock`] module provides a [`RecordingModule`](mock::RecordingModule)
//! that writes every hook call into a shared log.

pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod kernel;
pub mod mock;
pub mod module;
pub mod sort;
pub mod status;
pub mod tracing;

mod registry;
mod worker;

// Re-export core types for convenience
pub use config::KernelConfig;
pub use context::KernelContext;
pub use error::KernelError;
pub use graph::{DependencyGraph, DependencySpec, VertexId};
pub use kernel::Kernel;
pub use module::{Module, ModuleHandle};
pub use sort::topological_order;
pub use status::{Status, StatusCell};
