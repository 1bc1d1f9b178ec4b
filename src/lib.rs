//! Climb the Hill - a vertical platformer against the clock
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, generation, scoring)
//! - `session`: Frame substepping, run clock and event delivery for one run
//! - `presentation`: Sound/HUD sink and run summary consumer traits
//! - `camera`: Follow camera answering the simulation's viewport queries
//! - `platform`: Browser/native time and input mapping
//! - `submission`: Score payload validation and rate limiting
//! - `tuning`: Data-driven game balance

pub mod camera;
pub mod platform;
pub mod presentation;
pub mod session;
pub mod sim;
pub mod submission;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use camera::FollowCamera;
pub use presentation::{LogSink, PresentationSink, RunSummaryConsumer};
pub use session::Session;
pub use tuning::{Tuning, TuningError};

/// Game loop constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz so fast falls do not tunnel)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the loop will simulate (seconds); longer stalls are cut
    pub const MAX_FRAME_DT: f32 = 0.1;
}
