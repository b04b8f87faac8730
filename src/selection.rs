//! Marquee multi-selection and the selected-id set.
//!
//! DESIGN
//! ======
//! The marquee lives in screen space: its corners are raw pointer positions,
//! normalized on read, and slots are tested with the same layered screen
//! rectangles the hit-tester uses. Every qualifying move recomputes the set
//! from scratch, so the result never depends on the path the pointer took.
//!
//! The selected set keeps insertion order so intents report ids in the order
//! they were picked. Ids are weak: a removed slot's id may linger until the
//! next recompute, and lookups simply skip it.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use std::collections::HashSet;

use crate::camera::{Camera, Point, ScreenRect};
use crate::consts::{DASH_CYCLE_PX, DASH_STEP_INTERVAL_MS, DASH_STEP_PX, MIN_MARQUEE_PX};
use crate::hit::SlotGeometry;
use crate::slot::{Slot, SlotId};

/// Marquee gesture state plus the committed multi-selection.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    is_selecting: bool,
    start: Point,
    current: Point,
    selected: IdSet,
    base: IdSet,
    dash_offset: f64,
    last_dash_ms: f64,
}

impl SelectionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Marquee gesture ---

    /// Begin a marquee at `pt`. With `extend`, the current selection is kept
    /// and the marquee result is added to it.
    pub fn start(&mut self, pt: Point, extend: bool, now_ms: f64) {
        self.is_selecting = true;
        self.start = pt;
        self.current = pt;
        self.base = if extend { self.selected.clone() } else { IdSet::default() };
        self.dash_offset = 0.0;
        self.last_dash_ms = now_ms;
    }

    /// Move the marquee's free corner and recompute the selection.
    ///
    /// Returns the new id list when the selection was recomputed. A marquee
    /// under the minimum size leaves the previous result untouched and returns
    /// `None`.
    pub fn update(&mut self, pt: Point, slots: &[Slot], camera: &Camera, geometry: &SlotGeometry) -> Option<Vec<SlotId>> {
        if !self.is_selecting {
            return None;
        }
        self.current = pt;

        let rect = self.rect()?;
        if is_degenerate(&rect) {
            return None;
        }

        self.selected = self.base.clone();
        for slot in slots {
            if slot.is_header {
                continue;
            }
            if geometry.screen_rect(camera, slot).intersects(&rect) {
                self.selected.insert(&slot.id);
            }
        }
        Some(self.selected.to_vec())
    }

    /// Finish the marquee. A degenerate marquee clears the selection and
    /// returns `Some(empty)`; otherwise the selection stands and `None` is
    /// returned. Stops the dash animation either way.
    pub fn end(&mut self) -> Option<Vec<SlotId>> {
        if !self.is_selecting {
            return None;
        }
        let cleared = self.rect().is_some_and(|r| is_degenerate(&r));
        if cleared {
            self.selected.clear();
        }
        self.is_selecting = false;
        self.base.clear();
        self.dash_offset = 0.0;
        cleared.then(Vec::new)
    }

    /// Normalized marquee rectangle while selecting.
    #[must_use]
    pub fn rect(&self) -> Option<ScreenRect> {
        self.is_selecting.then(|| ScreenRect::from_corners(self.start, self.current))
    }

    #[must_use]
    pub fn is_selecting(&self) -> bool {
        self.is_selecting
    }

    // --- Marching ants ---

    /// Step the dash phase if enough time has passed. Returns `true` when it moved.
    pub fn advance_dash(&mut self, now_ms: f64) -> bool {
        if !self.is_selecting {
            self.dash_offset = 0.0;
            return false;
        }
        if now_ms - self.last_dash_ms < DASH_STEP_INTERVAL_MS {
            return false;
        }
        self.dash_offset += DASH_STEP_PX;
        if self.dash_offset >= DASH_CYCLE_PX {
            self.dash_offset = 0.0;
        }
        self.last_dash_ms = now_ms;
        true
    }

    #[must_use]
    pub fn dash_offset(&self) -> f64 {
        self.dash_offset
    }

    // --- Set operations ---

    /// Add `id`. Returns `false` if it was already selected.
    pub fn add(&mut self, id: &SlotId) -> bool {
        self.selected.insert(id)
    }

    /// Remove `id`. Returns `false` if it was not selected.
    pub fn remove(&mut self, id: &SlotId) -> bool {
        self.selected.remove(id)
    }

    /// Flip `id`'s membership. Returns `true` if it is now selected.
    pub fn toggle(&mut self, id: &SlotId) -> bool {
        if self.remove(id) {
            false
        } else {
            self.selected.insert(id)
        }
    }

    /// Replace the selection with every non-header slot.
    pub fn select_all(&mut self, slots: &[Slot]) {
        self.selected.clear();
        for slot in slots.iter().filter(|s| !s.is_header) {
            self.selected.insert(&slot.id);
        }
    }

    /// Drop the selection and abandon any marquee in progress.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.base.clear();
        self.is_selecting = false;
        self.dash_offset = 0.0;
    }

    #[must_use]
    pub fn contains(&self, id: &SlotId) -> bool {
        self.selected.contains(id)
    }

    /// Selected ids in insertion order.
    #[must_use]
    pub fn ids(&self) -> &[SlotId] {
        &self.selected.order
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected slots in host order. Stale ids are skipped.
    #[must_use]
    pub fn selected_slots<'a>(&self, slots: &'a [Slot]) -> Vec<&'a Slot> {
        slots.iter().filter(|s| self.contains(&s.id)).collect()
    }
}

fn is_degenerate(rect: &ScreenRect) -> bool {
    rect.w < MIN_MARQUEE_PX || rect.h < MIN_MARQUEE_PX
}

/// Insertion-ordered set of ids with constant-time membership.
#[derive(Debug, Clone, Default)]
struct IdSet {
    order: Vec<SlotId>,
    members: HashSet<SlotId>,
}

impl IdSet {
    fn insert(&mut self, id: &SlotId) -> bool {
        if !self.members.insert(id.clone()) {
            return false;
        }
        self.order.push(id.clone());
        true
    }

    fn remove(&mut self, id: &SlotId) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        self.order.retain(|s| s != id);
        true
    }

    fn contains(&self, id: &SlotId) -> bool {
        self.members.contains(id)
    }

    fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn to_vec(&self) -> Vec<SlotId> {
        self.order.clone()
    }
}
