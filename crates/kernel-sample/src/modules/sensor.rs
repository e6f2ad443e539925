use async_trait::async_trait;
use module_kernel::{KernelContext, Module};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

pub const SENSOR: &str = "sensor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub sequence: u64,
    pub clock: u64,
}

/// Samples the clock every tick and pushes the value downstream.
///
/// The channel is bounded. A reading that does not fit is dropped and
/// counted; the sensor never waits inside `tick`.
pub struct Sensor {
    clock: Arc<AtomicU64>,
    readings: mpsc::Sender<Reading>,
    sequence: u64,
    dropped: u64,
}

impl Sensor {
    pub fn new(clock: Arc<AtomicU64>, readings: mpsc::Sender<Reading>) -> Self {
        Self {
            clock,
            readings,
            sequence: 0,
            dropped: 0,
        }
    }
}

#[async_trait]
impl Module for Sensor {
    fn name(&self) -> &str {
        SENSOR
    }

    async fn init(&mut self, _ctx: &KernelContext) {
        self.sequence = 0;
        self.dropped = 0;
    }

    async fn tick(&mut self, _ctx: &KernelContext) {
        let reading = Reading {
            sequence: self.sequence,
            clock: self.clock.load(Ordering::Acquire),
        };
        self.sequence += 1;
        if self.readings.try_send(reading).is_err() {
            self.dropped += 1;
            debug!(sequence = reading.sequence, "Reading dropped");
        }
    }

    async fn halt(&mut self, _ctx: &KernelContext) {
        info!(sampled = self.sequence, dropped = self.dropped, "Sensor halted");
    }
}
