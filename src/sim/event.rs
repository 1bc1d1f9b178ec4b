//! Events emitted by the simulation
//!
//! The simulation never calls into presentation code. Ticks push events into
//! `GameState::events`; the session drains them into the presentation sink.

use serde::{Deserialize, Serialize};

use super::platform::PlatformKindTag;

/// Named sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    Jump,
    DoubleJump,
    Land,
    Boost,
    Collect,
    /// Per-kind thud when a platform is landed on
    PlatformLand(PlatformKindTag),
    PlatformBreak,
    /// Score gained, pitched by the amount
    Score(u64),
    Milestone { major: bool },
    GameOver,
}

/// Display values pushed to the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub score: u64,
    /// Displayed height (meters)
    pub height: f32,
    /// Seconds left in the run
    pub time_remaining: f32,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    TimeUp,
    /// Fell far below the starting area
    Fell,
    Aborted,
}

/// Final stats, frozen when the run ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub max_height: f32,
    pub items_collected: u32,
    /// The climb has no win condition
    pub victory: bool,
    pub reason: EndReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted { seed: u64 },
    Sound(SoundEffect),
    Hud(Hud),
    ScoreChanged {
        score: u64,
        points: u64,
        platform_index: Option<i32>,
    },
    HeightMilestone { meters: u32, major: bool },
    FallWarning { visible: bool },
    BackdropChanged { band: u8 },
    PlatformBroken { id: u32 },
    RunEnded(RunSummary),
}
