//! Run state and world construction
//!
//! `GameState` is the explicit context for one run: it owns the tuning, the
//! seeded RNG, every entity and the progression counters. Only `sim` code
//! inserts or removes entities.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::event::{EndReason, GameEvent, RunSummary, SoundEffect};
use super::generation::{Cluster, Generator};
use super::platform::{Collectible, GROUND_INDEX, Platform, PlatformKindTag, START_INDEX};
use super::player::Player;
use super::scoring::Progress;
use super::viewport::Viewport;
use crate::tuning::Tuning;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// World built, waiting for `start`
    Initializing,
    Running,
    /// Terminal; a new run needs a new state
    Over,
}

/// Wall-clock countdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunClock {
    /// Wall-clock time the run started (ms)
    pub started_at_ms: f64,
    /// Seconds left, recomputed from elapsed wall-clock time
    pub remaining: f32,
    /// Last time the slow clock ran (ms)
    pub last_clock_ms: f64,
}

/// Complete state of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub tuning: Tuning,
    pub phase: RunPhase,
    pub player: Player,
    /// Platforms, sorted by id
    pub platforms: Vec<Platform>,
    /// Collectibles, sorted by id
    pub collectibles: Vec<Collectible>,
    pub generator: Generator,
    pub progress: Progress,
    pub clock: RunClock,
    /// Frozen stats once the run is over
    pub summary: Option<RunSummary>,
    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Build the starting world: player, ground and start platforms, and the
    /// initial clusters.
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        debug_assert!(tuning.validate().is_ok(), "tuning must be validated before use");

        let (sx, sy) = tuning.world.player_start;
        let player = Player::new(Vec2::new(sx, sy), &tuning.player);
        let generator = Generator::new(&tuning.generation);
        let remaining = tuning.run.duration;

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            phase: RunPhase::Initializing,
            player,
            platforms: Vec::new(),
            collectibles: Vec::new(),
            generator,
            progress: Progress::new(),
            clock: RunClock {
                started_at_ms: 0.0,
                remaining,
                last_clock_ms: 0.0,
            },
            summary: None,
            events: Vec::new(),
            next_id: 1,
        };
        state.build_initial_world();
        state
    }

    fn build_initial_world(&mut self) {
        // Ground and start platforms sit under the player's start column
        let x = self.tuning.world.player_start.0;
        let (ground_y, start_y) = (self.tuning.world.ground_y, self.tuning.world.start_platform_y);
        self.spawn_platform(Vec2::new(x, ground_y), PlatformKindTag::Normal, GROUND_INDEX);
        self.spawn_platform(Vec2::new(x, start_y), PlatformKindTag::Normal, START_INDEX);

        let centers = self.tuning.generation.initial_clusters.clone();
        for (x, y) in centers {
            let cluster = self.generator.generate_cluster(
                Vec2::new(x, y),
                &mut self.rng,
                &self.tuning.generation,
                &self.tuning.world,
            );
            self.insert_cluster(cluster);
        }
        log::info!(
            "world ready: {} platforms, {} collectibles (seed {})",
            self.platforms.len(),
            self.collectibles.len(),
            self.seed
        );
    }

    /// Move from Initializing to Running; the countdown starts at `now_ms`
    pub fn start(&mut self, now_ms: f64) {
        if self.phase != RunPhase::Initializing {
            log::warn!("start ignored: run is {:?}", self.phase);
            return;
        }
        self.phase = RunPhase::Running;
        self.clock.started_at_ms = now_ms;
        self.clock.last_clock_ms = now_ms;
        self.clock.remaining = self.tuning.run.duration;
        self.events.push(GameEvent::RunStarted { seed: self.seed });
        log::info!("run started (seed {}, {}s)", self.seed, self.tuning.run.duration);
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    pub fn is_over(&self) -> bool {
        self.phase == RunPhase::Over
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Extend the world upward if the camera has caught up with the
    /// generation frontier. Returns true when a cluster was added.
    pub fn extend_world(&mut self, view: &impl Viewport) -> bool {
        let cluster = self.generator.maybe_generate(
            view,
            &mut self.rng,
            &self.tuning.generation,
            &self.tuning.world,
        );
        match cluster {
            Some(cluster) => {
                self.insert_cluster(cluster);
                true
            }
            None => false,
        }
    }

    pub fn spawn_platform(&mut self, pos: Vec2, kind: PlatformKindTag, index: i32) -> u32 {
        let id = self.next_entity_id();
        self.platforms.push(Platform::new(
            id,
            pos,
            kind,
            index,
            &self.tuning.platform,
            &self.tuning.generation,
        ));
        id
    }

    pub fn spawn_collectible(&mut self, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let size = Vec2::splat(self.tuning.world.collectible_size);
        self.collectibles.push(Collectible { id, pos, size });
        id
    }

    pub fn insert_cluster(&mut self, cluster: Cluster) {
        for spawn in cluster.platforms {
            debug_assert!(spawn.index > START_INDEX, "generated index collides with a sentinel");
            self.spawn_platform(spawn.pos, spawn.kind, spawn.index);
        }
        for pos in cluster.collectibles {
            self.spawn_collectible(pos);
        }
    }

    pub fn platform(&self, id: u32) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn platform_mut(&mut self, id: u32) -> Option<&mut Platform> {
        self.platforms.iter_mut().find(|p| p.id == id)
    }

    /// Remove a platform; a missing id is a no-op
    pub fn remove_platform(&mut self, id: u32) -> bool {
        let before = self.platforms.len();
        self.platforms.retain(|p| p.id != id);
        self.platforms.len() != before
    }

    /// Pick up a collectible.
    ///
    /// Returns false (and changes nothing) if it is already gone, so duplicate
    /// overlap reports count once.
    pub fn collect_item(&mut self, id: u32) -> bool {
        let Some(slot) = self.collectibles.iter().position(|c| c.id == id) else {
            return false;
        };
        self.collectibles.remove(slot);
        self.progress.record_item(&self.tuning.scoring);
        self.events.push(GameEvent::Sound(SoundEffect::Collect));
        self.events.push(GameEvent::ScoreChanged {
            score: self.progress.score,
            points: self.tuning.scoring.item_unit,
            platform_index: None,
        });
        self.events
            .push(GameEvent::Sound(SoundEffect::Score(self.tuning.scoring.item_unit)));
        log::debug!(
            "item collected ({} total), score {}",
            self.progress.items_collected,
            self.progress.score
        );
        true
    }

    /// Record a landing on a platform index and announce a new high
    pub fn reach_platform(&mut self, index: i32) {
        let previous = self.progress.score;
        if self.progress.record_platform(index, &self.tuning.scoring) {
            let points = self.progress.score.saturating_sub(previous);
            self.events.push(GameEvent::ScoreChanged {
                score: self.progress.score,
                points,
                platform_index: Some(index),
            });
            self.events.push(GameEvent::Sound(SoundEffect::Score(points)));
            log::debug!("new highest platform {index}, score {}", self.progress.score);
        }
    }

    /// Enter Over, freezing the summary. Only the first call has any effect.
    pub fn end_run(&mut self, reason: EndReason) {
        if self.phase == RunPhase::Over {
            return;
        }
        self.phase = RunPhase::Over;
        let summary = RunSummary {
            score: self.progress.score,
            max_height: self.progress.max_height,
            items_collected: self.progress.items_collected,
            victory: false,
            reason,
        };
        self.summary = Some(summary);
        self.events.push(GameEvent::Sound(SoundEffect::GameOver));
        self.events.push(GameEvent::RunEnded(summary));
        log::info!(
            "run over ({:?}): score {}, max height {:.1}m, items {}",
            reason,
            summary.score,
            summary.max_height,
            summary.items_collected
        );
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.platforms.sort_by_key(|p| p.id);
        self.collectibles.sort_by_key(|c| c.id);
    }
}
