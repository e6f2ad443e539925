//! # Kernel Sample
//!
//! A small embedding of `module-kernel`: three interdependent modules and the
//! lifecycle code that runs them.
//!
//! - **[modules]**: [`Clock`](modules::Clock), [`Sensor`](modules::Sensor) and
//!   [`Reporter`](modules::Reporter).
//! - **[lifecycle]**: [`SampleSystem`](lifecycle::SampleSystem) wires and runs them.

pub mod lifecycle;
pub mod modules;
