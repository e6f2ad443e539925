//! # Kernel
//!
//! The controller side of the orchestrator: owns the registry, the shared
//! status and the handle of the single worker task.
//!
//! ## Threads of control
//! - **Controller**: whoever holds the `Kernel` and calls `add` / `remove` /
//!   `find` / `start` / `stop` / `status`. Mutation needs `&mut self`, so there
//!   is never more than one.
//! - **Worker**: the tokio task spawned by [`Kernel::start`]. It only reads the
//!   registry snapshot taken at start time and never touches the registry.
//!
//! ## Stop semantics
//! [`Kernel::stop`] is fire-and-forget. It flips the status to `Idle`, and the
//! worker notices between two tick passes, so halts may still be running
//! when `stop` returns. Use [`Kernel::shutdown`] to wait for the halt phase.
//!
//! ```rust
//! use async_trait::async_trait;
//! use module_kernel::{Kernel, Module, Status};
//!
//! struct Storage;
//! struct Network;
//!
//! #[async_trait]
//! impl Module for Storage { fn name(&self) -> &str { "storage" } }
//! #[async_trait]
//! impl Module for Network { fn name(&self) -> &str { "network" } }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut kernel = Kernel::new();
//!     kernel.add(Network, ["storage"]).unwrap();
//!     kernel.add(Storage, Vec::<String>::new()).unwrap();
//!     assert_eq!(kernel.schedule().unwrap(), vec!["storage", "network"]);
//!
//!     kernel.start().await.unwrap();
//!     assert_eq!(kernel.status(), Status::Running);
//!
//!     kernel.shutdown().await.unwrap();
//!     assert_eq!(kernel.status(), Status::Idle);
//! }
//! ```

use crate::config::KernelConfig;
use crate::error::KernelError;
use crate::graph::{DependencyGraph, DependencySpec};
use crate::module::{into_handle, Module, ModuleHandle};
use crate::registry::Registry;
use crate::sort::sorted_names;
use crate::status::{Status, StatusCell};
use crate::worker;
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};

pub struct Kernel {
    config: KernelConfig,
    registry: Registry,
    status: Arc<StatusCell>,
    worker: Option<JoinHandle<()>>,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    pub fn new() -> Self {
        Self::with_config(KernelConfig::default())
    }

    pub fn with_config(config: KernelConfig) -> Self {
        debug!(kernel = %config.name, "Kernel created");
        Self {
            config,
            registry: Registry::new(),
            status: Arc::new(StatusCell::new(Status::Idle)),
            worker: None,
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Registers `module` with the names of the modules it depends on.
    ///
    /// # Errors
    /// - [`KernelError::NotIdle`] if a run is in progress.
    /// - [`KernelError::DuplicateModule`] if the name is taken; the existing
    ///   registration is left untouched.
    ///
    /// Unknown dependency names are accepted here and reported by `start`.
    pub fn add<M, I, S>(&mut self, module: M, dependencies: I) -> Result<(), KernelError>
    where
        M: Module,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let status = self.status.load();
        if !status.is_idle() {
            error!(module = module.name(), %status, "Cannot add module: kernel is not idle");
            return Err(KernelError::NotIdle(status));
        }

        let spec = DependencySpec::new(module.name(), dependencies);
        let name = spec.name.clone();
        if let Err(e) = self.registry.insert(spec, into_handle(module)) {
            warn!(module = %name, "Module already added");
            return Err(e);
        }
        debug!(module = %name, size = self.registry.len(), "Module added");
        Ok(())
    }

    /// Unregisters a module and hands its handle back to the caller.
    ///
    /// The relative order of the remaining modules is not preserved.
    pub fn remove(&mut self, name: &str) -> Result<ModuleHandle, KernelError> {
        let status = self.status.load();
        if !status.is_idle() {
            error!(module = name, %status, "Cannot remove module: kernel is not idle");
            return Err(KernelError::NotIdle(status));
        }

        match self.registry.remove(name) {
            Some(entry) => {
                debug!(module = name, size = self.registry.len(), "Module removed");
                Ok(entry.module)
            }
            None => {
                warn!(module = name, "Module not found");
                Err(KernelError::NotFound(name.to_string()))
            }
        }
    }

    /// Read-only lookup, valid in any state.
    pub fn find(&self, name: &str) -> Option<ModuleHandle> {
        self.registry.find(name).map(|e| e.module.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Registered module names, in registry order.
    pub fn names(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Computes the init order of the current registry without starting.
    pub fn schedule(&self) -> Result<Vec<String>, KernelError> {
        let graph = DependencyGraph::build(&self.registry.specs())?;
        sorted_names(&graph)
    }

    /// Launches the worker and waits until it is `Running` or has given up.
    ///
    /// Returns `Ok(())` iff the kernel is now `Running`. A worker left over
    /// from a previous `stop()` is joined first, so its halts always complete
    /// before the next run's inits.
    ///
    /// # Errors
    /// - [`KernelError::NotIdle`] if a run is already starting or running.
    ///   No second worker is spawned.
    /// - [`KernelError::UnknownDependency`] / [`KernelError::CyclicDependency`]
    ///   if the graph is invalid; no hook has run and the status is `Idle`.
    /// - [`KernelError::StoppedDuringStartup`] if a stop arrived while modules
    ///   were initialising; the worker halts them and exits.
    pub async fn start(&mut self) -> Result<(), KernelError> {
        let status = self.status.load();
        if !status.is_idle() {
            warn!(%status, "Kernel already started");
            return Err(KernelError::NotIdle(status));
        }

        if let Some(previous) = self.worker.take() {
            debug!("Waiting for previous worker to finish halting");
            join_worker(previous).await?;
        }

        if let Err(observed) = self.status.transition(Status::Idle, Status::Starting) {
            return Err(KernelError::NotIdle(observed));
        }
        info!(kernel = %self.config.name, modules = self.registry.len(), "Kernel starting");

        let (started, startup) = oneshot::channel();
        let span = info_span!("kernel", name = %self.config.name);
        let handle = tokio::spawn(
            worker::run(
                self.registry.snapshot(),
                self.status.clone(),
                self.config.clone(),
                started,
            )
            .instrument(span),
        );
        self.worker = Some(handle);

        match startup.await {
            Ok(Ok(())) => {
                info!(kernel = %self.config.name, "Kernel running");
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                self.status.store(Status::Idle);
                error!("Worker exited without reporting startup");
                Err(KernelError::WorkerLost)
            }
        }
    }

    /// Requests the worker to stop after the current tick pass. Does not wait.
    pub fn stop(&self) {
        self.status.store(Status::Idle);
        debug!(kernel = %self.config.name, "Stop requested");
    }

    pub fn status(&self) -> Status {
        self.status.load()
    }

    /// Requests stop and waits until every module has been halted.
    ///
    /// # Errors
    /// - [`KernelError::GraceExceeded`] if `shutdown_grace` is set and the
    ///   halt phase did not finish in time. The worker keeps running and a
    ///   later `shutdown` waits for it again.
    /// - [`KernelError::WorkerFailed`] if the worker task panicked.
    pub async fn shutdown(&mut self) -> Result<(), KernelError> {
        info!(kernel = %self.config.name, "Shutting down kernel...");
        self.stop();

        let Some(mut handle) = self.worker.take() else {
            return Ok(());
        };

        if let Some(grace) = self.config.shutdown_grace() {
            match tokio::time::timeout(grace, &mut handle).await {
                Ok(joined) => worker_result(joined)?,
                Err(_) => {
                    error!(?grace, "Worker did not halt within grace period");
                    self.worker = Some(handle);
                    return Err(KernelError::GraceExceeded(grace));
                }
            }
        } else {
            join_worker(handle).await?;
        }

        info!(kernel = %self.config.name, "Kernel shutdown complete.");
        Ok(())
    }
}

impl Drop for Kernel {
    /// Requests stop and waits for the worker to finish its halt phase.
    ///
    /// Waiting needs a multi-thread runtime (`block_in_place`). On a
    /// current-thread runtime, or with no runtime at all, the worker is left
    /// detached and its halts are lost if the runtime ends first; call
    /// [`Kernel::shutdown`] there instead.
    fn drop(&mut self) {
        let Some(handle) = self.worker.take() else {
            return;
        };
        self.stop();
        if handle.is_finished() {
            return;
        }

        let runtime = match Handle::try_current() {
            Ok(runtime) if runtime.runtime_flavor() == RuntimeFlavor::MultiThread => runtime,
            _ => {
                error!(
                    kernel = %self.config.name,
                    "Kernel dropped outside a multi-thread runtime; halts may be lost"
                );
                return;
            }
        };

        let grace = self.config.shutdown_grace();
        tokio::task::block_in_place(|| {
            runtime.block_on(async move {
                match grace {
                    Some(grace) => match tokio::time::timeout(grace, handle).await {
                        Ok(joined) => {
                            let _ = worker_result(joined);
                        }
                        Err(_) => error!(?grace, "Worker did not halt within grace period"),
                    },
                    None => {
                        let _ = join_worker(handle).await;
                    }
                }
            })
        });
        debug!(kernel = %self.config.name, "Kernel dropped after worker exit");
    }
}

async fn join_worker(handle: JoinHandle<()>) -> Result<(), KernelError> {
    worker_result(handle.await)
}

fn worker_result(joined: Result<(), tokio::task::JoinError>) -> Result<(), KernelError> {
    joined.map_err(|e| {
        error!(error = %e, "Worker task failed");
        KernelError::WorkerFailed(e.to_string())
    })
}
