//! Fit and alignment: bounding box of the slot set, uniform fit scale, and
//! anchor-based initial offset.
//!
//! These run at mount, on resize, and when the slot set's bounds change. They
//! never run per frame.

#[cfg(test)]
#[path = "align_test.rs"]
mod align_test;

use crate::config::Anchor;
use crate::slot::Slot;

/// World-space bounding box of a slot set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.min_x + self.width() / 2.0
    }

    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.min_y + self.height() / 2.0
    }
}

/// Bounding box of every slot, each sized with the defaults when it omits `w`/`h`.
///
/// An empty slot set yields `(0, 0, world_w, world_h)` so downstream math never
/// sees infinities.
#[must_use]
pub fn compute_bounds(slots: &[Slot], default_w: f64, default_h: f64, world_w: f64, world_h: f64) -> Bounds {
    if slots.is_empty() {
        return Bounds { min_x: 0.0, min_y: 0.0, max_x: world_w, max_y: world_h };
    }

    let mut bounds = Bounds {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };
    for slot in slots {
        bounds.min_x = bounds.min_x.min(slot.x);
        bounds.min_y = bounds.min_y.min(slot.y);
        bounds.max_x = bounds.max_x.max(slot.x + slot.width_or(default_w));
        bounds.max_y = bounds.max_y.max(slot.y + slot.height_or(default_h));
    }
    bounds
}

/// Uniform scale that fits the world into the canvas while preserving aspect ratio.
///
/// Falls back to `1.0` when either world extent is not positive.
#[must_use]
pub fn fit_scale(canvas_w: f64, canvas_h: f64, world_w: f64, world_h: f64) -> f64 {
    if world_w <= 0.0 || world_h <= 0.0 {
        return 1.0;
    }
    (canvas_w / world_w).min(canvas_h / world_h)
}

/// Offset that places `bounds` on the canvas according to `anchor` at `scale`.
#[must_use]
pub fn apply_alignment(anchor: Anchor, bounds: &Bounds, canvas_w: f64, canvas_h: f64, scale: f64) -> (f64, f64) {
    match anchor {
        Anchor::Center => (
            canvas_w / 2.0 - bounds.center_x() * scale,
            canvas_h / 2.0 - bounds.center_y() * scale,
        ),
        Anchor::LeftTop => (-bounds.min_x * scale, -bounds.min_y * scale),
        Anchor::LeftBottom => (-bounds.min_x * scale, canvas_h - bounds.max_y * scale),
        Anchor::RightTop => (canvas_w - bounds.max_x * scale, -bounds.min_y * scale),
        Anchor::RightBottom => (canvas_w - bounds.max_x * scale, canvas_h - bounds.max_y * scale),
    }
}
