//! # System Lifecycle
//!
//! [`SampleSystem`] is the embedding side of the kernel: it creates the sample
//! modules, wires their shared state, registers them with their dependency
//! names and drives one run from start to shutdown.
//!
//! ## Wiring
//!
//! Modules are created first and connected through plain values (an atomic
//! counter, an `mpsc` channel). Only then are they handed to the kernel, which
//! decides the order from the declared dependencies, not from the order of
//! the `add` calls.
//!
//! ## Shutdown
//!
//! The reporter stops the kernel itself once it has enough readings. `run`
//! waits for its summary and then calls [`Kernel::shutdown`] so every module
//! is halted before it returns.

use crate::modules::clock::CLOCK;
use crate::modules::sensor::SENSOR;
use crate::modules::{Clock, Reporter, Sensor, Summary};
use module_kernel::{Kernel, KernelConfig, KernelError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub kernel: KernelConfig,
    /// Readings the reporter collects before stopping the kernel.
    pub readings: usize,
    pub channel_capacity: usize,
    /// Upper bound on how long `run` waits for the reporter.
    pub timeout_ms: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            kernel: KernelConfig::default()
                .with_name("sample")
                .with_pass_interval(Duration::from_millis(1)),
            readings: 10,
            channel_capacity: 64,
            timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error(transparent)]
    Kernel(#[from] KernelError),
    #[error("Reporter did not finish within {0:?}")]
    Timeout(Duration),
    #[error("Reporter dropped before reporting")]
    ReporterDropped,
}

pub struct SampleSystem {
    pub kernel: Kernel,
    done: oneshot::Receiver<Summary>,
    timeout: Duration,
}

impl SampleSystem {
    /// Creates the modules and registers them.
    ///
    /// The reporter is added first on purpose: the kernel still runs the clock
    /// before the sensor and the sensor before the reporter.
    pub fn new(config: SampleConfig) -> Result<Self, SampleError> {
        let (readings_tx, readings_rx) = mpsc::channel(config.channel_capacity.max(1));
        let (done_tx, done_rx) = oneshot::channel();

        let clock = Clock::new();
        let sensor = Sensor::new(clock.source(), readings_tx);
        let reporter = Reporter::new(readings_rx, config.readings, done_tx);

        let mut kernel = Kernel::with_config(config.kernel);
        kernel.add(reporter, [SENSOR])?;
        kernel.add(sensor, [CLOCK])?;
        kernel.add(clock, Vec::<String>::new())?;

        Ok(Self {
            kernel,
            done: done_rx,
            timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    /// Starts the kernel, waits for the reporter's summary and shuts down.
    pub async fn run(mut self) -> Result<Summary, SampleError> {
        info!(order = ?self.kernel.schedule()?, "Starting sample system");
        self.kernel.start().await?;

        let outcome = match tokio::time::timeout(self.timeout, self.done).await {
            Ok(Ok(summary)) => Ok(summary),
            Ok(Err(_)) => Err(SampleError::ReporterDropped),
            Err(_) => Err(SampleError::Timeout(self.timeout)),
        };

        if let Err(e) = self.kernel.shutdown().await {
            error!(error = %e, "Kernel shutdown failed");
            return Err(e.into());
        }
        info!("Sample system stopped");
        outcome
    }
}
