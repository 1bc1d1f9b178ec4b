//! Axis-aligned bodies and contact resolution
//!
//! Every entity is a centered box. The player is the only dynamic body; it is
//! resolved against static platforms one axis at a time, which is enough to
//! tell a landing from above apart from side and head contacts.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Tolerance for "resting on" checks (px)
pub const CONTACT_EPSILON: f32 = 1.0;

/// Centered axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.center.x - self.half.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.center.x + self.half.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y - self.half.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y + self.half.y
    }

    /// Strict overlap: boxes that only share an edge do not overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.left() < other.right() && self.right() > other.left()
    }

    /// True when this box sits on top of `other` (horizontal overlap, bottom on its top)
    pub fn rests_on(&self, other: &Aabb) -> bool {
        self.overlaps_x(other) && (self.bottom() - other.top()).abs() <= CONTACT_EPSILON
    }
}

/// Which sides of a body touched something during the last resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Touching {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// How the dynamic body met a static one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactSide {
    /// Dynamic body came down onto the static body's top
    Top,
    /// Dynamic body hit the static body's underside
    Bottom,
    Left,
    Right,
}

/// Capability shared by every simulated entity
pub trait Body {
    fn position(&self) -> Vec2;
    fn size(&self) -> Vec2;
    /// Whether the body currently takes part in solid collisions
    fn collidable(&self) -> bool {
        true
    }

    fn bounds(&self) -> Aabb {
        Aabb::new(self.position(), self.size())
    }
}

/// Push `mover` out of `solid` along X after a horizontal move.
///
/// The mover leaves through the side it overlaps least; velocity only breaks
/// a tie. Returns the side of `solid` that was hit, if any.
pub fn resolve_x(mover: &mut Aabb, vel: &mut Vec2, solid: &Aabb) -> Option<ContactSide> {
    if !mover.overlaps(solid) {
        return None;
    }
    let into_left = mover.right() - solid.left();
    let into_right = solid.right() - mover.left();
    let push_left = if into_left == into_right {
        vel.x > 0.0 || (vel.x == 0.0 && mover.center.x < solid.center.x)
    } else {
        into_left < into_right
    };
    let side = if push_left {
        mover.center.x = solid.left() - mover.half.x;
        ContactSide::Left
    } else {
        mover.center.x = solid.right() + mover.half.x;
        ContactSide::Right
    };
    vel.x = 0.0;
    Some(side)
}

/// Push `mover` out of `solid` along Y after a vertical move.
///
/// `prev` is the mover's box before the vertical move. Only a mover that was
/// at or above the solid's top and is falling counts as landing on top.
pub fn resolve_y(mover: &mut Aabb, vel: &mut Vec2, prev: &Aabb, solid: &Aabb) -> Option<ContactSide> {
    if !mover.overlaps(solid) {
        return None;
    }
    if vel.y >= 0.0 && prev.bottom() <= solid.top() + CONTACT_EPSILON {
        mover.center.y = solid.top() - mover.half.y;
        vel.y = 0.0;
        return Some(ContactSide::Top);
    }
    if vel.y < 0.0 && prev.top() >= solid.bottom() - CONTACT_EPSILON {
        mover.center.y = solid.bottom() + mover.half.y;
        vel.y = 0.0;
        return Some(ContactSide::Bottom);
    }
    // Deep overlap (e.g. a moving platform slid into us): separate sideways,
    // never as a landing
    if mover.center.x < solid.center.x {
        mover.center.x = solid.left() - mover.half.x;
        Some(ContactSide::Left)
    } else {
        mover.center.x = solid.right() + mover.half.x;
        Some(ContactSide::Right)
    }
}
