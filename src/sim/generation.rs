//! Procedural platform generation
//!
//! Clusters of 2-4 platforms are laid out above the current frontier whenever
//! the camera gets close to it. All randomness comes from the run's seeded
//! RNG, so the same seed lays out the same climb.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::platform::PlatformKindTag;
use super::scoring::raw_height;
use super::viewport::Viewport;
use crate::tuning::{GenerationTuning, WorldTuning};

/// One platform to be spawned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformSpawn {
    pub pos: Vec2,
    pub kind: PlatformKindTag,
    pub index: i32,
}

/// A batch of platforms (and their collectibles) at a similar height
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub center: Vec2,
    pub platforms: Vec<PlatformSpawn>,
    pub collectibles: Vec<Vec2>,
}

/// Generation frontier and index counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generator {
    /// Y of the highest cluster center generated so far
    pub frontier_y: f32,
    /// Index the next generated platform receives
    pub next_index: i32,
}

impl Generator {
    pub fn new(tuning: &GenerationTuning) -> Self {
        Self {
            frontier_y: tuning.initial_frontier_y,
            next_index: 1,
        }
    }

    /// True when the frontier is closer than the threshold above the view
    pub fn needs_cluster(&self, view: &impl Viewport, tuning: &GenerationTuning) -> bool {
        view.scroll_y() - self.frontier_y < tuning.generation_threshold
    }

    /// Emit the next cluster if the camera has caught up with the frontier
    pub fn maybe_generate<R: Rng>(
        &mut self,
        view: &impl Viewport,
        rng: &mut R,
        tuning: &GenerationTuning,
        world: &WorldTuning,
    ) -> Option<Cluster> {
        if !self.needs_cluster(view, tuning) {
            return None;
        }
        let center = Vec2::new(
            tuning.center_min_x + rng.random::<f32>() * tuning.center_span_x,
            self.frontier_y - tuning.cluster_spacing,
        );
        Some(self.generate_cluster(center, rng, tuning, world))
    }

    /// Lay out one cluster around `center` and advance the frontier
    pub fn generate_cluster<R: Rng>(
        &mut self,
        center: Vec2,
        rng: &mut R,
        tuning: &GenerationTuning,
        world: &WorldTuning,
    ) -> Cluster {
        let count = rng.random_range(tuning.min_cluster_size..=tuning.max_cluster_size);
        let altitude = raw_height(center.y, world);

        let mut platforms = Vec::with_capacity(count as usize);
        let mut collectibles = Vec::new();
        for _ in 0..count {
            let offset_x = (rng.random::<f32>() - 0.5) * tuning.spread_x;
            let offset_y = rng.random::<f32>() * tuning.jitter_y;
            let pos = Vec2::new(
                (center.x + offset_x).clamp(tuning.min_x, tuning.max_x),
                center.y + offset_y,
            );
            let kind = choose_kind(altitude, rng.random::<f32>(), tuning);

            let index = self.next_index;
            self.next_index += 1;
            platforms.push(PlatformSpawn { pos, kind, index });

            if rng.random::<f32>() < tuning.collectible_chance {
                collectibles.push(Vec2::new(pos.x, pos.y - tuning.collectible_lift));
            }
        }

        self.frontier_y = self.frontier_y.min(center.y);
        log::debug!(
            "cluster at ({:.0}, {:.0}): {} platforms, {} collectibles, next index {}",
            center.x,
            center.y,
            platforms.len(),
            collectibles.len(),
            self.next_index
        );

        Cluster {
            center,
            platforms,
            collectibles,
        }
    }
}

/// Pick a platform kind from the altitude band and one uniform draw in [0, 1)
pub fn choose_kind(altitude: f32, draw: f32, tuning: &GenerationTuning) -> PlatformKindTag {
    if altitude > tuning.high_altitude {
        if draw < tuning.high_moving_chance {
            PlatformKindTag::Moving
        } else if draw < tuning.high_breakable_chance {
            PlatformKindTag::Breakable
        } else if draw < tuning.high_bouncy_chance {
            PlatformKindTag::Bouncy
        } else {
            PlatformKindTag::Normal
        }
    } else if draw < tuning.low_moving_chance {
        PlatformKindTag::Moving
    } else {
        PlatformKindTag::Normal
    }
}
