//! # Observability & Tracing
//!
//! The kernel reports through the `tracing` crate and leaves rendering to the
//! embedding application. [`setup_tracing`] is a ready-made subscriber for
//! binaries and tests.
//!
//! ## Levels
//!
//! - `debug`: dependency edges, the computed order, per-module `init`/`halt`,
//!   stop requests
//! - `info`: kernel starting / running / shut down, worker started / finished
//! - `warn`: duplicate add, remove of a missing module, aborted startup
//! - `error`: unresolved dependency, cycle, mutation while not idle
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run -p kernel-sample
//! RUST_LOG=module_kernel=debug cargo test
//! ```
//!
//! The worker runs inside a `kernel{name=...}` span, so every line it emits
//! carries the kernel name.

/// Installs a compact fmt subscriber filtered by `RUST_LOG`.
///
/// Calling it again (e.g. from several tests) is a no-op.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
