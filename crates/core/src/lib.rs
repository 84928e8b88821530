#![forbid(unsafe_code)]

//! Domain core for the academy learning client: the content catalog model,
//! per-lesson progress with merge semantics, the quiz and scenario engines,
//! and the gating policy. No I/O lives here.

pub mod error;
pub mod gating;
pub mod model;
pub mod quiz;
pub mod scenario;
pub mod time;

pub use error::Error;
pub use time::Clock;
