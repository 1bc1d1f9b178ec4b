//! Player movement model
//!
//! Input and timers are applied here; solid collision is resolved by the tick
//! against the platform set, which then reports back through
//! [`Player::update_grounding`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Aabb, Body, Touching};
use super::event::{GameEvent, SoundEffect};
use super::tick::TickInput;
use crate::tuning::PlayerTuning;

/// Which kind of jump was executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    /// From the ground or inside the coyote window
    Ground,
    /// Spent an extra air jump
    Air,
}

/// The climber
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub grounded: bool,
    pub max_jumps: u8,
    /// Jumps left before touching ground again, in [0, max_jumps]
    pub jumps_remaining: u8,
    /// Seconds left in the coyote window
    pub coyote_timer: f32,
    /// Seconds left on a buffered jump press
    pub jump_buffer_timer: f32,
    /// Contact flags from the last collision pass
    pub touching: Touching,
    /// Left the ground by jumping or bouncing; suppresses the coyote window
    pub launched: bool,
    jump_was_held: bool,
}

impl Player {
    pub fn new(pos: Vec2, tuning: &PlayerTuning) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: Vec2::new(tuning.width, tuning.height),
            grounded: false,
            max_jumps: tuning.max_jumps,
            jumps_remaining: tuning.max_jumps,
            coyote_timer: 0.0,
            jump_buffer_timer: 0.0,
            touching: Touching::default(),
            launched: false,
            jump_was_held: false,
        }
    }

    /// Apply one tick of input: horizontal control, jump release damping,
    /// buffering and jump execution, then timer countdown.
    ///
    /// `bounce_support` is only queried when a ground jump executes; it must
    /// report whether the player is standing on a bouncy platform right now.
    pub fn apply_input(
        &mut self,
        input: &TickInput,
        dt: f32,
        tuning: &PlayerTuning,
        bounce_support: impl FnOnce(&Aabb) -> bool,
        events: &mut Vec<GameEvent>,
    ) -> Option<JumpKind> {
        if input.left {
            self.vel.x = -tuning.move_speed;
        } else if input.right {
            self.vel.x = tuning.move_speed;
        } else {
            self.vel.x *= tuning.friction;
        }

        // Short hop: releasing jump while rising cuts the ascent once
        if self.jump_was_held && !input.jump_held && self.vel.y < 0.0 {
            self.vel.y *= tuning.release_damping;
        }
        self.jump_was_held = input.jump_held;

        if input.jump_pressed {
            self.jump_buffer_timer = tuning.jump_buffer_time;
        }

        let mut executed = None;
        if self.jump_buffer_timer > 0.0 && self.can_jump() {
            let multiplier = if self.can_ground_jump() && bounce_support(&self.bounds()) {
                tuning.bounce_jump_multiplier
            } else {
                1.0
            };
            executed = self.jump(tuning, multiplier, events);
            self.jump_buffer_timer = 0.0;
            // Released before the jump started (a tap, or a buffered press):
            // it is already a short hop
            if executed.is_some() && !input.jump_held {
                self.vel.y *= tuning.release_damping;
            }
        }

        self.tick_timers(dt);
        executed
    }

    fn can_ground_jump(&self) -> bool {
        self.grounded || self.coyote_timer > 0.0
    }

    fn can_jump(&self) -> bool {
        self.can_ground_jump() || self.jumps_remaining > 0
    }

    /// Execute a jump if one is available. `multiplier` scales a ground jump.
    pub fn jump(
        &mut self,
        tuning: &PlayerTuning,
        multiplier: f32,
        events: &mut Vec<GameEvent>,
    ) -> Option<JumpKind> {
        if self.can_ground_jump() {
            self.vel.y = -tuning.jump_force * multiplier;
            self.jumps_remaining = self.max_jumps.saturating_sub(1);
            self.coyote_timer = 0.0;
            self.launched = true;
            events.push(GameEvent::Sound(SoundEffect::Jump));
            log::trace!("jump (x{multiplier}) at {:?}", self.pos);
            Some(JumpKind::Ground)
        } else if self.jumps_remaining > 0 {
            self.vel.y = -tuning.jump_force * tuning.double_jump_factor;
            self.jumps_remaining -= 1;
            events.push(GameEvent::Sound(SoundEffect::DoubleJump));
            log::trace!("air jump, {} left", self.jumps_remaining);
            Some(JumpKind::Air)
        } else {
            None
        }
    }

    /// Count down the coyote and buffer windows
    pub fn tick_timers(&mut self, dt: f32) {
        self.coyote_timer = (self.coyote_timer - dt).max(0.0);
        self.jump_buffer_timer = (self.jump_buffer_timer - dt).max(0.0);
    }

    /// Integrate gravity into vertical velocity. Positions are moved by the
    /// tick so each axis can be resolved separately.
    pub fn apply_gravity(&mut self, dt: f32, gravity: f32) {
        self.vel.y += gravity * dt;
    }

    /// React to the ground contact found by the last collision pass
    pub fn update_grounding(&mut self, touching_down: bool, tuning: &PlayerTuning, events: &mut Vec<GameEvent>) {
        let was_grounded = self.grounded;
        self.grounded = touching_down;

        if self.grounded {
            if !was_grounded {
                self.launched = false;
                events.push(GameEvent::Sound(SoundEffect::Land));
            }
            self.jumps_remaining = self.max_jumps;
        } else if was_grounded {
            if self.launched {
                self.launched = false;
            } else {
                self.coyote_timer = tuning.coyote_time;
            }
        }
    }

    /// Launch upward from a bouncy platform; refills jumps
    pub fn boost(&mut self, force: f32, events: &mut Vec<GameEvent>) {
        self.vel.y = -force;
        self.jumps_remaining = self.max_jumps;
        self.launched = true;
        events.push(GameEvent::Sound(SoundEffect::Boost));
        log::debug!("boosted at {:?}", self.pos);
    }
}

impl Body for Player {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn size(&self) -> Vec2 {
        self.size
    }
}
