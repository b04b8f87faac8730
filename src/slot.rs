//! Slot model: warehouse storage positions and the per-frame slot list.
//!
//! This module defines the record the host hands to the engine (`Slot`), its
//! identity type (`SlotId`), and the read-only list wrapper the engine queries
//! (`SlotList`). Slots are replaced wholesale on every host update, so every
//! other module refers to them by id rather than by reference.
//!
//! Data flows into this layer from the host (JSON deserialization or direct
//! construction). Mutating operations never edit a `SlotList` in place; they
//! build a replacement copy and hand it back to the host as an intent.

#[cfg(test)]
#[path = "slot_test.rs"]
mod slot_test;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a slot. Hosts use either strings or integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotId {
    /// Integer identifier.
    Int(i64),
    /// String identifier.
    Str(String),
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for SlotId {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for SlotId {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for SlotId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

/// A warehouse slot as supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Unique identifier for this slot.
    pub id: SlotId,
    /// Left edge in world coordinates.
    pub x: f64,
    /// Top edge in world coordinates.
    pub y: f64,
    /// Width in world units; the configured default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    /// Height in world units; the configured default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    /// Layer index. Higher layers draw with a diagonal offset and win hit tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<i64>,
    /// Business status, mapped to a fill color through the status palette.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Text drawn inside the slot. Falls back to the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Explicit fill color; wins over the status palette.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Explicit border color; wins over hover styling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Explicit label color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    /// Header rows are drawn and hoverable but never selected.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_header: bool,
}

impl Slot {
    /// A bare slot at `(x, y)` with every optional field unset.
    #[must_use]
    pub fn new(id: impl Into<SlotId>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w: None,
            h: None,
            z: None,
            status: None,
            label: None,
            color: None,
            border_color: None,
            text_color: None,
            is_header: false,
        }
    }

    /// Builder-style size override.
    #[must_use]
    pub fn with_size(mut self, w: f64, h: f64) -> Self {
        self.w = Some(w);
        self.h = Some(h);
        self
    }

    /// Builder-style layer override.
    #[must_use]
    pub fn with_z(mut self, z: i64) -> Self {
        self.z = Some(z);
        self
    }

    /// Builder-style status override.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Builder-style header flag.
    #[must_use]
    pub fn header(mut self) -> Self {
        self.is_header = true;
        self
    }

    /// Width, substituting `default_w` when absent or zero.
    #[must_use]
    pub fn width_or(&self, default_w: f64) -> f64 {
        self.w.filter(|w| *w != 0.0).unwrap_or(default_w)
    }

    /// Height, substituting `default_h` when absent or zero.
    #[must_use]
    pub fn height_or(&self, default_h: f64) -> f64 {
        self.h.filter(|h| *h != 0.0).unwrap_or(default_h)
    }

    /// Layer index, zero when absent.
    #[must_use]
    pub fn layer(&self) -> i64 {
        self.z.unwrap_or(0)
    }

    /// Label text to draw: the explicit label, or the id.
    #[must_use]
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) if !label.is_empty() => label.clone(),
            _ => self.id.to_string(),
        }
    }
}

/// The slot list for the current frame, in host order.
#[derive(Debug, Clone, Default)]
pub struct SlotList {
    slots: Vec<Slot>,
}

impl SlotList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Replace every slot with a new host snapshot.
    pub fn replace(&mut self, slots: Vec<Slot>) {
        self.slots = slots;
    }

    /// Slots in host order.
    #[must_use]
    pub fn as_slice(&self) -> &[Slot] {
        &self.slots
    }

    /// Look up a slot by id. Stale ids resolve to `None`.
    #[must_use]
    pub fn get(&self, id: &SlotId) -> Option<&Slot> {
        self.slots.iter().find(|s| &s.id == id)
    }

    /// All slots carrying `status`.
    #[must_use]
    pub fn by_status(&self, status: &str) -> Vec<&Slot> {
        self.slots
            .iter()
            .filter(|s| s.status.as_deref() == Some(status))
            .collect()
    }

    /// Build a replacement copy with `edit` applied to every slot whose id is in `ids`.
    ///
    /// Returns `None` when no slot matched, so callers can skip emitting an update.
    pub fn copy_with<F>(&self, ids: &[SlotId], mut edit: F) -> Option<Vec<Slot>>
    where
        F: FnMut(&mut Slot),
    {
        let mut copy = self.slots.clone();
        let mut touched = false;
        for slot in &mut copy {
            if ids.contains(&slot.id) {
                edit(slot);
                touched = true;
            }
        }
        touched.then_some(copy)
    }

    /// Build a replacement copy without the slots whose ids are in `ids`.
    #[must_use]
    pub fn copy_without(&self, ids: &[SlotId]) -> Vec<Slot> {
        self.slots
            .iter()
            .filter(|s| !ids.contains(&s.id))
            .cloned()
            .collect()
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the list contains no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
