//! # Module Trait
//!
//! The `Module` trait is the contract every unit managed by the [`Kernel`](crate::Kernel)
//! implements: a stable name plus three lifecycle hooks.
//!
//! # Provided Methods (Hooks)
//! All hooks have a default implementation that does nothing:
//! - [`Module::init`]: called once per run, in dependency order, before the first tick.
//! - [`Module::tick`]: called once per tick pass while the kernel is running.
//! - [`Module::halt`]: called once per run, in reverse dependency order.
//!
//! Hooks have no error channel. A module that fails to initialise is expected
//! to degrade on its own (e.g. by doing nothing in `tick`). The kernel offers
//! no fault isolation between modules.
//!
//! # Context
//! Modules do not keep a pointer back to the kernel. Each hook receives a
//! [`KernelContext`] instead, which exposes the few things a module may do
//! with its kernel: read the status, request a stop, inspect the run order.

use crate::context::KernelContext;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A named unit with `init` / `tick` / `halt` lifecycle hooks.
///
/// # Hanging hooks
/// The worker awaits each hook to completion before calling the next one. A
/// hook that never returns stalls the whole tick pass. The kernel then never
/// notices `stop()` and never reaches the halt phase. There is no timeout or
/// hard cancel.
///
/// ```rust
/// use async_trait::async_trait;
/// use module_kernel::{Kernel, KernelContext, Module};
///
/// struct Counter { ticks: u64 }
///
/// #[async_trait]
/// impl Module for Counter {
///     fn name(&self) -> &str { "counter" }
///
///     async fn tick(&mut self, ctx: &KernelContext) {
///         self.ticks += 1;
///         if self.ticks == 3 {
///             ctx.request_stop();
///         }
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let mut kernel = Kernel::new();
///     kernel.add(Counter { ticks: 0 }, Vec::<String>::new()).unwrap();
///     kernel.start().await.unwrap();
///     kernel.shutdown().await.unwrap();
/// }
/// ```
#[async_trait]
pub trait Module: Send + 'static {
    /// Stable identity, unique within a kernel.
    fn name(&self) -> &str;

    async fn init(&mut self, _ctx: &KernelContext) {}

    async fn tick(&mut self, _ctx: &KernelContext) {}

    async fn halt(&mut self, _ctx: &KernelContext) {}
}

/// Shared handle to a registered module.
///
/// The worker locks a module only while one of its hooks runs, so a handle
/// returned by [`Kernel::find`](crate::Kernel::find) can be inspected between hooks.
pub type ModuleHandle = Arc<Mutex<dyn Module>>;

pub(crate) fn into_handle<M: Module>(module: M) -> ModuleHandle {
    Arc::new(Mutex::new(module))
}
