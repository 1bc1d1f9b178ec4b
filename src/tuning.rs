//! Data-driven game balance
//!
//! Every gameplay constant lives here so a run can be rebalanced from JSON
//! without touching the simulation. Each section is `#[serde(default)]`, so a
//! file only needs the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating tuning
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Player movement and jump feel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Horizontal speed while a direction is held (px/s)
    pub move_speed: f32,
    /// Per-tick velocity multiplier when no direction is held
    pub friction: f32,
    /// Upward speed of a first jump (px/s, applied as -Y)
    pub jump_force: f32,
    /// Fraction of `jump_force` used by the air jump
    pub double_jump_factor: f32,
    /// Total jumps available per airtime, the first included
    pub max_jumps: u8,
    /// Grace window after walking off a ledge (seconds)
    pub coyote_time: f32,
    /// How long an early jump press is remembered (seconds)
    pub jump_buffer_time: f32,
    /// Vertical velocity multiplier when jump is released while rising
    pub release_damping: f32,
    /// Jump force multiplier when jumping off a bouncy platform
    pub bounce_jump_multiplier: f32,
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            move_speed: 200.0,
            friction: 0.8,
            jump_force: 500.0,
            double_jump_factor: 0.8,
            max_jumps: 2,
            coyote_time: 0.15,
            jump_buffer_time: 0.1,
            release_damping: 0.5,
            bounce_jump_multiplier: 2.0,
            gravity: 800.0,
            width: 16.0,
            height: 16.0,
        }
    }
}

/// Platform sizes and per-kind behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformTuning {
    pub width: f32,
    pub height: f32,
    /// Moving platform speed (px/s)
    pub move_speed: f32,
    /// Moving platform travel each side of its spawn X (px)
    pub move_distance: f32,
    /// Time a breakable platform holds after being landed on (seconds)
    pub break_delay: f32,
    /// Time a broken platform lingers before removal (seconds)
    pub break_cleanup_delay: f32,
    /// Upward speed applied when landing on a bouncy platform (px/s)
    pub bounce_force: f32,
    /// Debounce window between landing reactions on one platform (seconds)
    pub landing_cooldown: f32,
}

impl Default for PlatformTuning {
    fn default() -> Self {
        Self {
            width: 64.0,
            height: 16.0,
            move_speed: 60.0,
            move_distance: 120.0,
            break_delay: 0.8,
            break_cleanup_delay: 0.3,
            bounce_force: 700.0,
            landing_cooldown: 0.5,
        }
    }
}

/// Procedural cluster generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationTuning {
    pub min_cluster_size: u32,
    pub max_cluster_size: u32,
    /// Full width of the horizontal offset distribution around a cluster center
    pub spread_x: f32,
    /// Maximum downward jitter of a platform inside its cluster
    pub jitter_y: f32,
    /// Playfield X bounds that platform centers are clamped to
    pub min_x: f32,
    pub max_x: f32,
    /// Leftmost cluster center X
    pub center_min_x: f32,
    /// Range added to `center_min_x` for a cluster center
    pub center_span_x: f32,
    /// Vertical distance between consecutive clusters
    pub cluster_spacing: f32,
    /// Generate while the frontier is closer than this above the view top
    pub generation_threshold: f32,
    /// Frontier Y before the initial clusters are placed
    pub initial_frontier_y: f32,
    /// Initial cluster centers, generated before the first tick
    pub initial_clusters: Vec<(f32, f32)>,
    /// Altitude (meters) at which the high band kicks in
    pub high_altitude: f32,
    /// Cumulative draw thresholds below `high_altitude`
    pub low_moving_chance: f32,
    /// Cumulative draw thresholds at or above `high_altitude`
    pub high_moving_chance: f32,
    pub high_breakable_chance: f32,
    pub high_bouncy_chance: f32,
    /// Independent per-platform collectible probability
    pub collectible_chance: f32,
    /// Collectible height above its platform center (px)
    pub collectible_lift: f32,
}

impl Default for GenerationTuning {
    fn default() -> Self {
        Self {
            min_cluster_size: 2,
            max_cluster_size: 4,
            spread_x: 400.0,
            jitter_y: 60.0,
            min_x: 50.0,
            max_x: 430.0,
            center_min_x: 120.0,
            center_span_x: 240.0,
            cluster_spacing: 80.0,
            generation_threshold: 200.0,
            initial_frontier_y: 500.0,
            initial_clusters: vec![(240.0, 500.0), (180.0, 350.0), (300.0, 200.0)],
            high_altitude: 70.0,
            low_moving_chance: 0.2,
            high_moving_chance: 0.3,
            high_breakable_chance: 0.5,
            high_bouncy_chance: 0.6,
            collectible_chance: 0.3,
            collectible_lift: 16.0,
        }
    }
}

/// World geometry and reference points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub width: f32,
    /// Top and bottom of the physics world
    pub top: f32,
    pub bottom: f32,
    /// Visible height of the viewport
    pub view_height: f32,
    /// Y of the ground reference platform; height 0 m
    pub ground_y: f32,
    pub start_platform_y: f32,
    pub player_start: (f32, f32),
    pub pixels_per_meter: f32,
    /// Extra distance below the view before entities are removed
    pub cleanup_margin: f32,
    pub collectible_size: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: 480.0,
            top: -10_000.0,
            bottom: 10_000.0,
            view_height: 800.0,
            ground_y: 700.0,
            start_platform_y: 630.0,
            player_start: (240.0, 600.0),
            pixels_per_meter: 10.0,
            cleanup_margin: 0.0,
            collectible_size: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    pub platform_unit: u64,
    pub item_unit: u64,
    /// Meters between milestone notifications
    pub milestone_interval: f32,
    /// Meters between major milestones
    pub major_milestone_interval: f32,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            platform_unit: 50,
            item_unit: 100,
            milestone_interval: 500.0,
            major_milestone_interval: 1000.0,
        }
    }
}

/// Run timing and termination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunTuning {
    /// Run length (seconds)
    pub duration: f32,
    /// Period of the slow clock (milliseconds)
    pub clock_interval_ms: f64,
    /// Raw height (meters, may be negative) that ends the run
    pub fall_limit: f32,
    /// Displayed height at or below which the fall warning shows
    pub fall_warning_height: f32,
    /// Heights (meters) at which the backdrop switches to the next band
    pub backdrop_bands: Vec<f32>,
}

impl Default for RunTuning {
    fn default() -> Self {
        Self {
            duration: 60.0,
            clock_interval_ms: 100.0,
            fall_limit: -10.0,
            fall_warning_height: 1.0,
            backdrop_bands: vec![100.0, 250.0],
        }
    }
}

/// Follow camera feel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Fraction of the remaining distance covered per frame
    pub lerp: f32,
    /// How far below the view center the player is kept (px)
    pub follow_offset: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            lerp: 0.2,
            follow_offset: 100.0,
        }
    }
}

/// Complete balance sheet for a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub platform: PlatformTuning,
    pub generation: GenerationTuning,
    pub world: WorldTuning,
    pub scoring: ScoringTuning,
    pub run: RunTuning,
    pub camera: CameraTuning,
}

impl Tuning {
    /// Parse tuning from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let p = &self.player;
        let g = &self.generation;
        let w = &self.world;

        if p.max_jumps == 0 {
            return Err(invalid("player.max_jumps", "must allow at least one jump"));
        }
        if p.jump_force <= 0.0 || p.gravity <= 0.0 {
            return Err(invalid("player.jump_force", "jump force and gravity must be positive"));
        }
        if !(0.0..=1.0).contains(&p.friction) {
            return Err(invalid("player.friction", "must be within [0, 1]"));
        }
        if g.min_cluster_size == 0 || g.min_cluster_size > g.max_cluster_size {
            return Err(invalid(
                "generation.min_cluster_size",
                "must be at least 1 and not exceed max_cluster_size",
            ));
        }
        if g.min_x >= g.max_x || g.max_x > w.width {
            return Err(invalid("generation.min_x", "playfield bounds must fit the world width"));
        }
        if g.cluster_spacing <= 0.0 {
            return Err(invalid("generation.cluster_spacing", "must be positive"));
        }
        let chances = [
            g.low_moving_chance,
            g.high_moving_chance,
            g.high_breakable_chance,
            g.high_bouncy_chance,
            g.collectible_chance,
        ];
        if chances.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(invalid("generation", "probabilities must be within [0, 1]"));
        }
        if g.high_moving_chance > g.high_breakable_chance
            || g.high_breakable_chance > g.high_bouncy_chance
        {
            return Err(invalid("generation.high_moving_chance", "high band thresholds must be cumulative"));
        }
        if w.pixels_per_meter <= 0.0 {
            return Err(invalid("world.pixels_per_meter", "must be positive"));
        }
        if w.top >= w.bottom {
            return Err(invalid("world.top", "must be above world.bottom"));
        }
        if self.run.duration <= 0.0 || self.run.clock_interval_ms <= 0.0 {
            return Err(invalid("run.duration", "duration and clock interval must be positive"));
        }
        if self.camera.lerp <= 0.0 || self.camera.lerp > 1.0 {
            return Err(invalid("camera.lerp", "must be within (0, 1]"));
        }
        if self.scoring.milestone_interval <= 0.0 {
            return Err(invalid("scoring.milestone_interval", "must be positive"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &'static str) -> TuningError {
    TuningError::Invalid { field, reason }
}
