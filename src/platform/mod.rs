//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (`performance.now()` or a monotonic clock)
//! - Input mapping from keys and virtual buttons

pub mod input;
pub mod time;

pub use input::{Control, InputMapper};
pub use time::now_ms;
