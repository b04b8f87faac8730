#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use std::cmp::Reverse;

use crate::camera::{Camera, Point, ScreenRect};
use crate::slot::Slot;

/// Geometry inputs shared by every screen-space slot query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotGeometry {
    /// Width for slots without `w`.
    pub default_w: f64,
    /// Height for slots without `h`.
    pub default_h: f64,
    /// Screen pixels of diagonal shift per layer.
    pub layer_z_offset: f64,
}

impl SlotGeometry {
    /// Screen rectangle of `slot` including its layer shift.
    #[must_use]
    pub fn screen_rect(&self, camera: &Camera, slot: &Slot) -> ScreenRect {
        camera
            .slot_to_screen(slot, self.default_w, self.default_h)
            .layered(slot.layer(), self.layer_z_offset)
    }
}

/// Return the topmost slot whose layered screen rectangle contains `screen_pt`.
///
/// Slots are visited highest layer first; equal layers keep host order, so the
/// earlier slot wins a tie. The snapshot is re-sorted on every call because
/// layers may change between calls.
#[must_use]
pub fn hit_test<'a>(screen_pt: Point, slots: &'a [Slot], camera: &Camera, geometry: &SlotGeometry) -> Option<&'a Slot> {
    let mut ordered: Vec<&Slot> = slots.iter().collect();
    ordered.sort_by_key(|s| Reverse(s.layer()));
    ordered
        .into_iter()
        .find(|slot| geometry.screen_rect(camera, slot).contains(screen_pt))
}
