use async_trait::async_trait;
use module_kernel::{KernelContext, Module};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

pub const CLOCK: &str = "clock";

/// Advances a shared counter once per tick pass.
pub struct Clock {
    now: Arc<AtomicU64>,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Read side of the counter, handed to modules that depend on the clock.
    pub fn source(&self) -> Arc<AtomicU64> {
        self.now.clone()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for Clock {
    fn name(&self) -> &str {
        CLOCK
    }

    async fn init(&mut self, ctx: &KernelContext) {
        self.now.store(0, Ordering::Release);
        info!(kernel = ctx.kernel_name(), "Clock reset");
    }

    async fn tick(&mut self, _ctx: &KernelContext) {
        self.now.fetch_add(1, Ordering::AcqRel);
    }

    async fn halt(&mut self, _ctx: &KernelContext) {
        info!(now = self.now.load(Ordering::Acquire), "Clock halted");
    }
}
