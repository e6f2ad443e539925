//! # Dependency Graph
//!
//! Turns the registered [`DependencySpec`]s into a directed graph where an edge
//! `A → B` means "A must be initialised before B" (B declared A as a dependency).
//!
//! Vertices live in an arena: a [`VertexId`] is the position of the spec in the
//! input slice, and adjacency lists store ids rather than references. Growing
//! the arena never invalidates an edge.
//!
//! Construction fails fast on the first dependency name that does not resolve
//! to a registered module.

use crate::error::KernelError;
use std::collections::{HashMap, HashSet};
use tracing::{debug, error};

/// A module name plus the names of the modules it depends on.
///
/// The order of `dependencies` is irrelevant and duplicates are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub name: String,
    pub dependencies: Vec<String>,
}

impl DependencySpec {
    pub fn new<I, S>(name: impl Into<String>, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
        }
    }
}

/// Index of a vertex in the graph arena (equal to the registration index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub(crate) usize);

impl VertexId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Vertex {
    name: String,
    /// Modules that must wait for this one.
    dependents: Vec<VertexId>,
    /// Modules this one waits for.
    dependencies: Vec<VertexId>,
}

/// Validated dependency graph over a set of registered modules.
#[derive(Debug)]
pub struct DependencyGraph {
    vertices: Vec<Vertex>,
    edges: usize,
}

impl DependencyGraph {
    /// Builds the graph, resolving every declared dependency by name.
    ///
    /// # Errors
    ///
    /// - [`KernelError::DuplicateModule`] if two specs share a name.
    /// - [`KernelError::UnknownDependency`] for the first name that does not
    ///   match any spec.
    pub fn build(specs: &[DependencySpec]) -> Result<Self, KernelError> {
        let mut lookup: HashMap<&str, VertexId> = HashMap::with_capacity(specs.len());
        let mut vertices = Vec::with_capacity(specs.len());

        for (index, spec) in specs.iter().enumerate() {
            if lookup.insert(spec.name.as_str(), VertexId(index)).is_some() {
                error!(module = %spec.name, "Duplicate module in dependency graph");
                return Err(KernelError::DuplicateModule(spec.name.clone()));
            }
            vertices.push(Vertex {
                name: spec.name.clone(),
                dependents: Vec::new(),
                dependencies: Vec::new(),
            });
        }

        let mut edges = 0;
        for (index, spec) in specs.iter().enumerate() {
            let dependent = VertexId(index);
            let mut resolved = HashSet::with_capacity(spec.dependencies.len());
            for name in &spec.dependencies {
                let Some(&dependency) = lookup.get(name.as_str()) else {
                    error!(module = %spec.name, dependency = %name, "Dependency not found");
                    return Err(KernelError::UnknownDependency {
                        module: spec.name.clone(),
                        dependency: name.clone(),
                    });
                };
                if !resolved.insert(dependency) {
                    continue;
                }
                debug!(dependency = %name, module = %spec.name, "Adding dependency edge");
                vertices[dependency.0].dependents.push(dependent);
                vertices[dependent.0].dependencies.push(dependency);
                edges += 1;
            }
        }

        Ok(Self { vertices, edges })
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> {
        (0..self.vertices.len()).map(VertexId)
    }

    pub fn name(&self, vertex: VertexId) -> &str {
        &self.vertices[vertex.0].name
    }

    /// Vertices that declared `vertex` as a dependency.
    pub fn dependents(&self, vertex: VertexId) -> &[VertexId] {
        &self.vertices[vertex.0].dependents
    }

    /// Vertices that `vertex` declared as dependencies.
    pub fn dependencies_of(&self, vertex: VertexId) -> &[VertexId] {
        &self.vertices[vertex.0].dependencies
    }

    pub fn find(&self, name: &str) -> Option<VertexId> {
        self.vertices
            .iter()
            .position(|v| v.name == name)
            .map(VertexId)
    }
}
