//! Camera queries consumed by the simulation
//!
//! The simulation only reads where the view is; following the player and
//! smoothing belong to whoever implements this.

/// Read-only view of the camera
pub trait Viewport {
    /// World Y of the top edge of the view
    fn scroll_y(&self) -> f32;
    /// Visible height in world pixels
    fn view_height(&self) -> f32;

    /// World Y of the bottom edge of the view
    fn bottom(&self) -> f32 {
        self.scroll_y() + self.view_height()
    }
}

/// A camera that stays where it is put
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedView {
    pub scroll_y: f32,
    pub height: f32,
}

impl Viewport for FixedView {
    fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    fn view_height(&self) -> f32 {
        self.height
    }
}
