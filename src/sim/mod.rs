//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies; effects leave as events

pub mod body;
pub mod event;
pub mod generation;
pub mod platform;
pub mod player;
pub mod scoring;
pub mod state;
pub mod tick;
pub mod viewport;

pub use body::{Aabb, Body, ContactSide, Touching};
pub use event::{EndReason, GameEvent, Hud, RunSummary, SoundEffect};
pub use generation::{Cluster, Generator};
pub use platform::{BreakStage, Collectible, Platform, PlatformKind, PlatformKindTag};
pub use player::{JumpKind, Player};
pub use scoring::{Progress, display_height, raw_height};
pub use state::{GameState, RunPhase};
pub use tick::{TickInput, check_termination, cleanup, clock, tick};
pub use viewport::{FixedView, Viewport};
