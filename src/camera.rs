#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::slot::Slot;

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl ScreenRect {
    #[must_use]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Normalized rectangle spanning two corner points in any order.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            w: (b.x - a.x).abs(),
            h: (b.y - a.y).abs(),
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Closed containment test: edges count as inside.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }

    /// Closed intersection test: touching edges count as intersecting.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.right() < other.x || self.x > other.right() || self.bottom() < other.y || self.y > other.bottom())
    }

    /// Shift by the diagonal layer offset: right and up by `z * unit` pixels.
    #[must_use]
    pub fn layered(self, z: i64, unit: f64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let offset = z as f64 * unit;
        Self { x: self.x + offset, y: self.y - offset, ..self }
    }
}

/// Pan/scale state mapping world coordinates onto the surface.
///
/// `offset_x` / `offset_y` are in CSS pixels. `scale_x` and `scale_y` are
/// always equal; they are kept as separate fields so the mapping reads the
/// same on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { offset_x: 0.0, offset_y: 0.0, scale_x: 1.0, scale_y: 1.0 }
    }
}

impl Camera {
    /// Set the uniform scale on both axes.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale_x = scale;
        self.scale_y = scale;
    }

    /// The uniform scale factor.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale_x
    }

    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.offset_x) / self.scale_x,
            y: (screen.y - self.offset_y) / self.scale_y,
        }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.scale_x + self.offset_x,
            y: world.y * self.scale_y + self.offset_y,
        }
    }

    /// Map a slot's world rectangle to screen pixels, substituting the default size.
    #[must_use]
    pub fn slot_to_screen(&self, slot: &Slot, default_w: f64, default_h: f64) -> ScreenRect {
        let origin = self.world_to_screen(Point::new(slot.x, slot.y));
        ScreenRect {
            x: origin.x,
            y: origin.y,
            w: slot.width_or(default_w) * self.scale_x,
            h: slot.height_or(default_h) * self.scale_y,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale_x
    }
}
