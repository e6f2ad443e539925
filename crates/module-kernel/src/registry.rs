//! # Module Registry
//!
//! A single `Vec<Entry>` owns every registered module together with its
//! dependency names. Keeping both in one record means the module list and the
//! dependency list cannot disagree.
//!
//! The registry knows nothing about the kernel's status. [`Kernel`](crate::Kernel)
//! refuses to call the mutating methods unless it is `Idle`.

use crate::error::KernelError;
use crate::graph::DependencySpec;
use crate::module::ModuleHandle;

#[derive(Clone)]
pub(crate) struct Entry {
    pub(crate) spec: DependencySpec,
    pub(crate) module: ModuleHandle,
}

#[derive(Default)]
pub(crate) struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(
        &mut self,
        spec: DependencySpec,
        module: ModuleHandle,
    ) -> Result<(), KernelError> {
        if self.contains(&spec.name) {
            return Err(KernelError::DuplicateModule(spec.name));
        }
        self.entries.push(Entry { spec, module });
        Ok(())
    }

    /// Removes by swapping with the last entry; the order of the rest is not kept.
    pub(crate) fn remove(&mut self, name: &str) -> Option<Entry> {
        let index = self.position(name)?;
        Some(self.entries.swap_remove(index))
    }

    pub(crate) fn find(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.spec.name == name)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.spec.name.clone()).collect()
    }

    pub(crate) fn specs(&self) -> Vec<DependencySpec> {
        self.entries.iter().map(|e| e.spec.clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the current entries for the worker. Modules are shared, not cloned.
    pub(crate) fn snapshot(&self) -> Vec<Entry> {
        self.entries.clone()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.spec.name == name)
    }
}
