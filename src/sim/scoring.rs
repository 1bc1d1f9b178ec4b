//! Scoring and progression
//!
//! The score is never accumulated. It is recomputed from the highest platform
//! index reached and the number of items collected whenever either changes.

use serde::{Deserialize, Serialize};

use crate::tuning::{RunTuning, ScoringTuning, WorldTuning};

/// Progression counters for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Progress {
    pub score: u64,
    /// Highest platform index landed on; starts at the start platform
    pub highest_platform_index: i32,
    pub items_collected: u32,
    /// Displayed height (meters, never negative)
    pub height: f32,
    pub max_height: f32,
    /// Milestones already announced (count of intervals crossed)
    pub milestones_reached: u32,
    pub backdrop_band: u8,
    pub fall_warning: bool,
}

/// A height milestone crossed this update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub meters: u32,
    pub major: bool,
}

impl Progress {
    pub fn new() -> Self {
        Self {
            backdrop_band: 1,
            ..Default::default()
        }
    }

    /// Score as a pure function of progression state
    pub fn compute_score(&self, units: &ScoringTuning) -> u64 {
        self.highest_platform_index.max(0) as u64 * units.platform_unit
            + self.items_collected as u64 * units.item_unit
    }

    fn recompute(&mut self, units: &ScoringTuning) {
        self.score = self.compute_score(units);
    }

    /// Record a landing on the platform with `index`.
    ///
    /// Returns true when it was a new highest platform and the score changed.
    pub fn record_platform(&mut self, index: i32, units: &ScoringTuning) -> bool {
        if index <= self.highest_platform_index {
            return false;
        }
        self.highest_platform_index = index;
        self.recompute(units);
        true
    }

    pub fn record_item(&mut self, units: &ScoringTuning) {
        self.items_collected += 1;
        self.recompute(units);
    }

    /// Update displayed height from the player's Y; returns any milestones
    /// crossed for the first time.
    pub fn update_height(
        &mut self,
        player_y: f32,
        world: &WorldTuning,
        units: &ScoringTuning,
    ) -> Vec<Milestone> {
        self.height = display_height(player_y, world);
        self.max_height = self.max_height.max(self.height);

        let crossed = (self.height / units.milestone_interval).floor() as u32;
        let mut milestones = Vec::new();
        while self.milestones_reached < crossed {
            self.milestones_reached += 1;
            let meters = (self.milestones_reached as f32 * units.milestone_interval) as u32;
            let major = units.major_milestone_interval > 0.0
                && (meters as f32 % units.major_milestone_interval) == 0.0;
            milestones.push(Milestone { meters, major });
        }
        milestones
    }

    /// Backdrop band for the current height; `Some` when it changed
    pub fn update_backdrop(&mut self, run: &RunTuning) -> Option<u8> {
        let band = 1 + run
            .backdrop_bands
            .iter()
            .filter(|&&threshold| self.height >= threshold)
            .count() as u8;
        (band != self.backdrop_band).then(|| {
            self.backdrop_band = band;
            band
        })
    }

    /// Fall warning visibility; `Some` when it toggled
    pub fn update_fall_warning(&mut self, run: &RunTuning) -> Option<bool> {
        let visible = self.height <= run.fall_warning_height;
        (visible != self.fall_warning).then(|| {
            self.fall_warning = visible;
            visible
        })
    }
}

/// Height relative to the ground reference, unclamped (negative below it)
pub fn raw_height(player_y: f32, world: &WorldTuning) -> f32 {
    (world.ground_y - player_y) / world.pixels_per_meter
}

/// Height shown to the player
pub fn display_height(player_y: f32, world: &WorldTuning) -> f32 {
    raw_height(player_y, world).max(0.0)
}
