//! Block geometry
//!
//! A block is an axis-aligned rectangle snapshotted from a page element when the
//! game starts. Coordinates are viewport-relative (scroll already subtracted).

use serde::{Deserialize, Serialize};

/// Opaque reference to the presentation element behind a block.
///
/// The simulation never interprets it; it is handed back in destroy events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockHandle(pub u32);

/// Axis-aligned rectangle (left <= right, top <= bottom is not enforced)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Build from a top-left corner and a size
    pub fn from_origin_size(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(left, left + width, top, top + height)
    }

    /// Inclusive overlap with a square of side `size` whose top-left corner is (x, y).
    ///
    /// Touching edges count as overlap. Corners are treated as square, not round.
    #[inline]
    pub fn overlaps_square(&self, x: f64, y: f64, size: f64) -> bool {
        x + size >= self.left && x <= self.right && y + size >= self.top && y <= self.bottom
    }

    /// Whether an element with this rectangle may become a block: its top edge must
    /// be on screen and above the bottom `band_margin` pixels, leaving room for play.
    #[inline]
    pub fn in_play_band(&self, viewport_height: f64, band_margin: f64) -> bool {
        self.top >= 0.0 && self.top < viewport_height - band_margin
    }
}

/// A destructible block in the active collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub handle: BlockHandle,
    pub rect: Rect,
}

impl Block {
    pub fn new(handle: BlockHandle, rect: Rect) -> Self {
        Self { handle, rect }
    }
}
