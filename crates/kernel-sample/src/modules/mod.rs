//! Sample modules wired together by [`SampleSystem`](crate::lifecycle::SampleSystem).
//!
//! ```text
//! clock ──► sensor ──► reporter
//! ```

pub mod clock;
pub mod reporter;
pub mod sensor;

pub use clock::Clock;
pub use reporter::{Reporter, Summary};
pub use sensor::{Reading, Sensor};
