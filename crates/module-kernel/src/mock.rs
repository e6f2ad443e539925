//! # Test Doubles
//!
//! [`RecordingModule`] implements [`Module`] by writing every hook call into a
//! shared [`HookLog`]. It lets tests assert on exact init / tick / halt ordering
//! without writing a bespoke module each time.
//!
//! ```rust
//! use module_kernel::mock::{Hook, HookLog, RecordingModule};
//! use module_kernel::Kernel;
//!
//! #[tokio::main]
//! async fn main() {
//!     let log = HookLog::new();
//!     let mut kernel = Kernel::new();
//!     kernel.add(RecordingModule::new("a", &log), Vec::<String>::new()).unwrap();
//!     kernel.add(RecordingModule::new("b", &log), ["a"]).unwrap();
//!
//!     kernel.start().await.unwrap();
//!     kernel.shutdown().await.unwrap();
//!
//!     assert_eq!(log.modules_for(Hook::Init), vec!["a", "b"]);
//!     assert_eq!(log.modules_for(Hook::Halt), vec!["b", "a"]);
//! }
//! ```

use crate::context::KernelContext;
use crate::module::Module;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Init,
    Tick,
    Halt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookEvent {
    pub module: String,
    pub hook: Hook,
}

/// Shared, append-only record of hook calls.
#[derive(Clone, Debug, Default)]
pub struct HookLog {
    events: Arc<Mutex<Vec<HookEvent>>>,
}

impl HookLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HookEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, module: &str, hook: Hook) {
        self.lock().push(HookEvent {
            module: module.to_string(),
            hook,
        });
    }

    pub fn events(&self) -> Vec<HookEvent> {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Module names in the order they received `hook`.
    pub fn modules_for(&self, hook: Hook) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|e| e.hook == hook)
            .map(|e| e.module.clone())
            .collect()
    }

    pub fn count(&self, module: &str, hook: Hook) -> usize {
        self.lock()
            .iter()
            .filter(|e| e.hook == hook && e.module == module)
            .count()
    }

    /// Polls until `module` has received `hook` at least `n` times.
    ///
    /// Returns `false` if that did not happen within `timeout`.
    pub async fn wait_for(&self, module: &str, hook: Hook, n: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.count(module, hook) >= n {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

/// A module that records its hook calls.
pub struct RecordingModule {
    name: String,
    log: HookLog,
    ticks: u64,
    stop_after: Option<u64>,
    stop_in_init: bool,
    stall_tick: Option<Duration>,
}

impl RecordingModule {
    pub fn new(name: impl Into<String>, log: &HookLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
            ticks: 0,
            stop_after: None,
            stop_in_init: false,
            stall_tick: None,
        }
    }

    /// Requests a kernel stop from inside `tick` once `ticks` ticks have run.
    pub fn stop_after(mut self, ticks: u64) -> Self {
        self.stop_after = Some(ticks);
        self
    }

    /// Requests a kernel stop from inside `init`, before the kernel is running.
    pub fn stop_in_init(mut self) -> Self {
        self.stop_in_init = true;
        self
    }

    /// Makes every `tick` sleep for `duration` after recording it.
    pub fn stall_tick(mut self, duration: Duration) -> Self {
        self.stall_tick = Some(duration);
        self
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[async_trait]
impl Module for RecordingModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn init(&mut self, ctx: &KernelContext) {
        self.log.record(&self.name, Hook::Init);
        if self.stop_in_init {
            ctx.request_stop();
        }
    }

    async fn tick(&mut self, ctx: &KernelContext) {
        self.ticks += 1;
        self.log.record(&self.name, Hook::Tick);
        if self.stop_after == Some(self.ticks) {
            ctx.request_stop();
        }
        if let Some(duration) = self.stall_tick {
            tokio::time::sleep(duration).await;
        }
    }

    async fn halt(&mut self, _ctx: &KernelContext) {
        self.log.record(&self.name, Hook::Halt);
    }
}
