//! Platforms and collectibles
//!
//! Per-kind behavior (moving, breakable, bouncy) is plain state advanced by
//! the tick. Deferred effects are countdowns stored on the entity, so removing
//! an entity also drops anything it was waiting on.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use crate::tuning::{GenerationTuning, PlatformTuning};

/// Index reserved for the ground reference platform
pub const GROUND_INDEX: i32 = -1;
/// Index reserved for the start platform
pub const START_INDEX: i32 = 0;

/// Kind without its sub-state (used by generation and sound cues)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformKindTag {
    Normal,
    Moving,
    Breakable,
    Bouncy,
}

/// Stage of a breakable platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BreakStage {
    Intact,
    /// Landed on; breaks when the timer runs out
    Cracking { remaining: f32 },
    /// Broken and non-collidable; removed when the timer runs out
    Falling { remaining: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlatformKind {
    Normal,
    Moving {
        left_bound: f32,
        right_bound: f32,
        /// +1.0 moving right, -1.0 moving left
        direction: f32,
        speed: f32,
    },
    Breakable { stage: BreakStage },
    Bouncy { bounce_force: f32 },
}

impl PlatformKind {
    pub fn tag(&self) -> PlatformKindTag {
        match self {
            PlatformKind::Normal => PlatformKindTag::Normal,
            PlatformKind::Moving { .. } => PlatformKindTag::Moving,
            PlatformKind::Breakable { .. } => PlatformKindTag::Breakable,
            PlatformKind::Bouncy { .. } => PlatformKindTag::Bouncy,
        }
    }
}

/// What a breakable platform did during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakProgress {
    Unchanged,
    /// Crack timer ran out; the platform stopped colliding
    Broke,
    /// Trailing delay done; remove the platform
    Expired,
}

/// A platform entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: PlatformKind,
    /// Generation-order progression index
    pub index: i32,
    /// Takes part in collisions
    pub active: bool,
    /// Seconds until landing reactions fire again
    pub landing_cooldown: f32,
}

impl Platform {
    /// Build a platform of the given kind at `pos`.
    ///
    /// Moving bounds are the spawn X ± the travel distance, clamped to the
    /// playfield.
    pub fn new(
        id: u32,
        pos: Vec2,
        tag: PlatformKindTag,
        index: i32,
        tuning: &PlatformTuning,
        playfield: &GenerationTuning,
    ) -> Self {
        let kind = match tag {
            PlatformKindTag::Normal => PlatformKind::Normal,
            PlatformKindTag::Moving => PlatformKind::Moving {
                left_bound: (pos.x - tuning.move_distance).max(playfield.min_x),
                right_bound: (pos.x + tuning.move_distance).min(playfield.max_x),
                direction: 1.0,
                speed: tuning.move_speed,
            },
            PlatformKindTag::Breakable => PlatformKind::Breakable {
                stage: BreakStage::Intact,
            },
            PlatformKindTag::Bouncy => PlatformKind::Bouncy {
                bounce_force: tuning.bounce_force,
            },
        };
        Self {
            id,
            pos,
            size: Vec2::new(tuning.width, tuning.height),
            kind,
            index,
            active: true,
            landing_cooldown: 0.0,
        }
    }

    pub fn tag(&self) -> PlatformKindTag {
        self.kind.tag()
    }

    /// Slide a moving platform; snaps to and reverses at each bound
    pub fn step_motion(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        if let PlatformKind::Moving {
            left_bound,
            right_bound,
            ref mut direction,
            speed,
        } = self.kind
        {
            let new_x = self.pos.x + speed * dt * *direction;
            if new_x <= left_bound && *direction < 0.0 {
                *direction = 1.0;
                self.pos.x = left_bound;
            } else if new_x >= right_bound && *direction > 0.0 {
                *direction = -1.0;
                self.pos.x = right_bound;
            } else {
                self.pos.x = new_x;
            }
        }
    }

    /// Count down the landing debounce and any break timers
    pub fn step_timers(&mut self, dt: f32, tuning: &PlatformTuning) -> BreakProgress {
        self.landing_cooldown = (self.landing_cooldown - dt).max(0.0);

        let PlatformKind::Breakable { ref mut stage } = self.kind else {
            return BreakProgress::Unchanged;
        };
        match *stage {
            BreakStage::Intact => BreakProgress::Unchanged,
            BreakStage::Cracking { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    *stage = BreakStage::Falling {
                        remaining: tuning.break_cleanup_delay,
                    };
                    self.active = false;
                    BreakProgress::Broke
                } else {
                    *stage = BreakStage::Cracking { remaining };
                    BreakProgress::Unchanged
                }
            }
            BreakStage::Falling { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    BreakProgress::Expired
                } else {
                    *stage = BreakStage::Falling { remaining };
                    BreakProgress::Unchanged
                }
            }
        }
    }

    /// Start the break sequence; later landings do not restart it
    pub fn start_breaking(&mut self, delay: f32) -> bool {
        match self.kind {
            PlatformKind::Breakable {
                stage: ref mut stage @ BreakStage::Intact,
            } => {
                *stage = BreakStage::Cracking { remaining: delay };
                true
            }
            _ => false,
        }
    }

    /// Whether landing reactions may fire now
    pub fn accepts_landing(&self) -> bool {
        self.active && self.landing_cooldown <= 0.0
    }
}

impl Body for Platform {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn collidable(&self) -> bool {
        self.active
    }
}

/// A pickup floating above a platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
}

impl Body for Collectible {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    /// Picked up by overlap, never solid
    fn collidable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn moving_at(x: f32) -> Platform {
        Platform::new(
            1,
            Vec2::new(x, 0.0),
            PlatformKindTag::Moving,
            1,
            &PlatformTuning::default(),
            &GenerationTuning::default(),
        )
    }

    fn bounds(p: &Platform) -> (f32, f32, f32) {
        match p.kind {
            PlatformKind::Moving {
                left_bound,
                right_bound,
                direction,
                ..
            } => (left_bound, right_bound, direction),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_moving_bounds_clamped_to_playfield() {
        let p = moving_at(100.0);
        let (left, right, _) = bounds(&p);
        assert_eq!(left, 50.0);
        assert_eq!(right, 220.0);
    }

    #[test]
    fn test_moving_snaps_and_reverses_once() {
        let mut p = moving_at(400.0);
        let (_, right, _) = bounds(&p);
        assert_eq!(right, 430.0);

        // One big step overshoots: snap exactly, flip once
        p.step_motion(1.0);
        assert_eq!(p.pos.x, right);
        assert_eq!(bounds(&p).2, -1.0);

        // Next step moves away from the bound, no second flip
        p.step_motion(0.1);
        assert_eq!(bounds(&p).2, -1.0);
        assert!(p.pos.x < right);
    }

    #[test]
    fn test_breakable_lifecycle() {
        let t = PlatformTuning::default();
        let mut p = Platform::new(
            3,
            Vec2::ZERO,
            PlatformKindTag::Breakable,
            4,
            &t,
            &GenerationTuning::default(),
        );
        assert_eq!(p.step_timers(1.0, &t), BreakProgress::Unchanged);
        assert!(p.start_breaking(t.break_delay));
        assert!(!p.start_breaking(t.break_delay), "landing again must not restart");

        assert_eq!(p.step_timers(0.5, &t), BreakProgress::Unchanged);
        assert!(p.active);
        assert_eq!(p.step_timers(0.31, &t), BreakProgress::Broke);
        assert!(!p.active);
        assert!(!p.collidable());
        assert_eq!(p.step_timers(0.1, &t), BreakProgress::Unchanged);
        assert_eq!(p.step_timers(0.21, &t), BreakProgress::Expired);
    }

    #[test]
    fn test_landing_cooldown() {
        let t = PlatformTuning::default();
        let mut p = moving_at(200.0);
        assert!(p.accepts_landing());
        p.landing_cooldown = t.landing_cooldown;
        assert!(!p.accepts_landing());
        p.step_timers(0.49, &t);
        assert!(!p.accepts_landing());
        p.step_timers(0.02, &t);
        assert!(p.accepts_landing());
    }

    proptest! {
        #[test]
        fn prop_moving_platform_stays_in_bounds(
            spawn in 50.0f32..430.0,
            steps in proptest::collection::vec(0.0f32..0.5, 1..200),
        ) {
            let mut p = moving_at(spawn);
            let (left, right, _) = bounds(&p);
            for dt in steps {
                let before = bounds(&p).2;
                p.step_motion(dt);
                let (_, _, after) = bounds(&p);
                prop_assert!(p.pos.x >= left && p.pos.x <= right);
                // A direction flip only happens exactly at a bound
                if before != after {
                    prop_assert!(p.pos.x == left || p.pos.x == right);
                }
            }
        }
    }
}
