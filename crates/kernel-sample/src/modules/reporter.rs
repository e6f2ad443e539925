use super::sensor::Reading;
use async_trait::async_trait;
use module_kernel::{KernelContext, Module};
use tokio::sync::{mpsc, oneshot};
use tracing::info;

pub const REPORTER: &str = "reporter";

/// What the reporter saw before it asked the kernel to stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub readings: usize,
    pub first_clock: u64,
    pub last_clock: u64,
    /// `true` if every reading's clock was >= the previous one.
    pub monotonic: bool,
}

/// Collects readings and stops the kernel once it has `target` of them.
pub struct Reporter {
    readings: mpsc::Receiver<Reading>,
    target: usize,
    seen: Vec<Reading>,
    done: Option<oneshot::Sender<Summary>>,
}

impl Reporter {
    pub fn new(
        readings: mpsc::Receiver<Reading>,
        target: usize,
        done: oneshot::Sender<Summary>,
    ) -> Self {
        Self {
            readings,
            target,
            seen: Vec::with_capacity(target),
            done: Some(done),
        }
    }

    fn summary(&self) -> Summary {
        Summary {
            readings: self.seen.len(),
            first_clock: self.seen.first().map_or(0, |r| r.clock),
            last_clock: self.seen.last().map_or(0, |r| r.clock),
            monotonic: self.seen.windows(2).all(|w| w[0].clock <= w[1].clock),
        }
    }
}

#[async_trait]
impl Module for Reporter {
    fn name(&self) -> &str {
        REPORTER
    }

    async fn tick(&mut self, ctx: &KernelContext) {
        while self.seen.len() < self.target {
            match self.readings.try_recv() {
                Ok(reading) => self.seen.push(reading),
                Err(_) => break,
            }
        }

        if self.seen.len() >= self.target {
            if let Some(done) = self.done.take() {
                let summary = self.summary();
                info!(
                    readings = summary.readings,
                    last_clock = summary.last_clock,
                    "Target reached"
                );
                let _ = done.send(summary);
                ctx.request_stop();
            }
        }
    }

    async fn halt(&mut self, _ctx: &KernelContext) {
        info!(readings = self.seen.len(), "Reporter halted");
    }
}
