#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod scoring;
pub mod shaping;
pub mod time;

pub use error::Error;
pub use scoring::{PolicyKind, Score, ScoringPolicy};
pub use shaping::shape;
pub use time::Clock;
