//! # Kernel Context
//!
//! The capability handle passed into every [`Module`](crate::Module) hook. It is
//! built by the worker at the start of each run and is cheap to clone.

use crate::status::{Status, StatusCell};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct KernelContext {
    kernel_name: Arc<str>,
    status: Arc<StatusCell>,
    order: Arc<[String]>,
}

impl KernelContext {
    pub(crate) fn new(kernel_name: &str, status: Arc<StatusCell>, order: Vec<String>) -> Self {
        Self {
            kernel_name: Arc::from(kernel_name),
            status,
            order: order.into(),
        }
    }

    pub fn kernel_name(&self) -> &str {
        &self.kernel_name
    }

    pub fn status(&self) -> Status {
        self.status.load()
    }

    /// Same as [`Kernel::stop`](crate::Kernel::stop): the run ends after the current tick pass.
    pub fn request_stop(&self) {
        debug!(kernel = %self.kernel_name, "Stop requested by module");
        self.status.store(Status::Idle);
    }

    /// Module names of the current run, in init order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| n == name)
    }
}
