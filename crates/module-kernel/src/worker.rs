//! # Kernel Worker
//!
//! The body of the task spawned by [`Kernel::start`](crate::Kernel::start).
//! One run goes through these steps:
//!
//! 1. Build the dependency graph from the registry snapshot.
//! 2. Sort it. On either failure the status drops back to `Idle`, the error
//!    goes out on the startup signal and the worker exits.
//! 3. `init` every module in order.
//! 4. `Starting → Running`, then fire the startup signal.
//! 5. Tick passes until the status is no longer `Running`.
//! 6. `halt` every module in reverse order.
//!
//! The startup signal is a oneshot channel fired exactly once. The controller
//! blocks on it instead of polling the status.

use crate::config::KernelConfig;
use crate::context::KernelContext;
use crate::error::KernelError;
use crate::graph::DependencyGraph;
use crate::module::ModuleHandle;
use crate::registry::Entry;
use crate::sort::topological_order;
use crate::status::{Status, StatusCell};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Oneshot sender the worker uses to report the outcome of startup.
pub(crate) type StartupSignal = oneshot::Sender<Result<(), KernelError>>;

struct Scheduled {
    name: String,
    module: ModuleHandle,
}

fn schedule(entries: Vec<Entry>) -> Result<Vec<Scheduled>, KernelError> {
    let specs: Vec<_> = entries.iter().map(|e| e.spec.clone()).collect();
    let graph = DependencyGraph::build(&specs)?;
    let order = topological_order(&graph)?;

    let mut slots: Vec<Option<Entry>> = entries.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|vertex| slots[vertex.index()].take())
        .map(|entry| Scheduled {
            name: entry.spec.name,
            module: entry.module,
        })
        .collect())
}

pub(crate) async fn run(
    entries: Vec<Entry>,
    status: Arc<StatusCell>,
    config: KernelConfig,
    started: StartupSignal,
) {
    info!(modules = entries.len(), "Worker started");

    let order = match schedule(entries) {
        Ok(order) => order,
        Err(e) => {
            status.store(Status::Idle);
            warn!(error = %e, label = e.as_label(), "Startup aborted");
            let _ = started.send(Err(e));
            return;
        }
    };

    let names: Vec<String> = order.iter().map(|m| m.name.clone()).collect();
    debug!(order = ?names, "Scheduled order");
    let ctx = KernelContext::new(&config.name, status.clone(), names);

    for scheduled in &order {
        debug!(module = %scheduled.name, "init");
        scheduled.module.lock().await.init(&ctx).await;
    }

    let mut passes: u64 = 0;
    match status.transition(Status::Starting, Status::Running) {
        Ok(()) => {
            debug!("Status: running");
            let _ = started.send(Ok(()));

            while status.load() == Status::Running {
                for scheduled in &order {
                    scheduled.module.lock().await.tick(&ctx).await;
                }
                passes += 1;
                match config.pass_interval() {
                    Some(interval) => tokio::time::sleep(interval).await,
                    None => tokio::task::yield_now().await,
                }
            }
        }
        Err(observed) => {
            warn!(%observed, "Stopped during startup; skipping tick loop");
            let _ = started.send(Err(KernelError::StoppedDuringStartup));
        }
    }

    for scheduled in order.iter().rev() {
        debug!(module = %scheduled.name, "halt");
        scheduled.module.lock().await.halt(&ctx).await;
    }

    info!(passes, "Worker finished");
}
