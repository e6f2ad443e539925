//! # Kernel configuration.
//!
//! [`KernelConfig`] holds the few knobs of a [`Kernel`](crate::Kernel). It is
//! serde-friendly so an embedding application can load it from its own config
//! file.
//!
//! ## Sentinel values
//! - `pass_interval_ms = None` → cooperative yield between tick passes
//! - `shutdown_grace_ms = None` → `shutdown()` waits for the worker without limit

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Name used in the worker span and in log fields.
    pub name: String,

    /// Pause between two tick passes, in milliseconds.
    pub pass_interval_ms: Option<u64>,

    /// Maximum time `shutdown()` waits for the halt phase, in milliseconds.
    pub shutdown_grace_ms: Option<u64>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            name: "kernel".to_string(),
            pass_interval_ms: None,
            shutdown_grace_ms: None,
        }
    }
}

impl KernelConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_pass_interval(mut self, interval: Duration) -> Self {
        self.pass_interval_ms = Some(duration_ms(interval));
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace_ms = Some(duration_ms(grace));
        self
    }

    pub fn pass_interval(&self) -> Option<Duration> {
        self.pass_interval_ms.map(Duration::from_millis)
    }

    pub fn shutdown_grace(&self) -> Option<Duration> {
        self.shutdown_grace_ms.map(Duration::from_millis)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
