//! Follow camera
//!
//! Smoothly tracks the player vertically and answers the simulation's
//! [`Viewport`] queries. The simulation never moves the camera itself.

use crate::sim::Viewport;
use crate::tuning::Tuning;

/// Lerping vertical follow camera clamped to the world bounds
#[derive(Debug, Clone, PartialEq)]
pub struct FollowCamera {
    scroll_y: f32,
    view_height: f32,
    lerp: f32,
    follow_offset: f32,
    min_scroll: f32,
    max_scroll: f32,
}

impl FollowCamera {
    /// Camera already settled on the player's start position
    pub fn new(tuning: &Tuning) -> Self {
        let mut camera = Self {
            scroll_y: 0.0,
            view_height: tuning.world.view_height,
            lerp: tuning.camera.lerp,
            follow_offset: tuning.camera.follow_offset,
            min_scroll: tuning.world.top,
            max_scroll: (tuning.world.bottom - tuning.world.view_height).max(tuning.world.top),
        };
        camera.snap_to(tuning.world.player_start.1);
        camera
    }

    /// Scroll position that would put the player at the follow point
    pub fn target_for(&self, player_y: f32) -> f32 {
        (player_y - self.follow_offset - self.view_height / 2.0).clamp(self.min_scroll, self.max_scroll)
    }

    /// Move part of the way toward the player; call once per frame
    pub fn follow(&mut self, player_y: f32) {
        let target = self.target_for(player_y);
        self.scroll_y += (target - self.scroll_y) * self.lerp;
    }

    pub fn snap_to(&mut self, player_y: f32) {
        self.scroll_y = self.target_for(player_y);
    }
}

impl Viewport for FollowCamera {
    fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    fn view_height(&self) -> f32 {
        self.view_height
    }
}
