//! Performance layer: visibility culling, frame metering, and rate limiting.
//!
//! DESIGN
//! ======
//! Culling only ever feeds the render pass. Hit-testing, marquee selection,
//! and business queries always see the full slot list, so a culled slot is
//! never "missing" from the host's point of view.
//!
//! The rate limiters (`Debouncer`, `Throttle`, `FrameBatcher`) hold ids from
//! the injected [`Scheduler`] rather than closures; whoever receives the
//! frame or timer callback asks the limiter whether the id is still live.

#[cfg(test)]
#[path = "perf_test.rs"]
mod perf_test;

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::camera::Camera;
use crate::config::PerformanceConfig;
use crate::consts::{CULL_BUFFER_PX, FPS_WINDOW_MS};
use crate::hit::SlotGeometry;
use crate::schedule::{FrameId, Scheduler, TimerId};
use crate::slot::Slot;

// =============================================================================
// CULLING
// =============================================================================

/// Slots worth drawing for the current viewport.
///
/// Below the configured threshold (or with virtual rendering off) every slot is
/// returned in host order. Above it, the world viewport is padded by a constant
/// screen margin and only slots whose layered world rectangle touches it are kept.
#[must_use]
pub fn filter_visible<'a>(
    slots: &'a [Slot],
    camera: &Camera,
    viewport_w: f64,
    viewport_h: f64,
    geometry: &SlotGeometry,
    config: &PerformanceConfig,
) -> Vec<&'a Slot> {
    if !config.enable_virtual_render || slots.len() < config.virtual_render_threshold {
        return slots.iter().collect();
    }

    let left = -camera.offset_x / camera.scale_x;
    let top = -camera.offset_y / camera.scale_y;
    let right = (viewport_w - camera.offset_x) / camera.scale_x;
    let bottom = (viewport_h - camera.offset_y) / camera.scale_y;
    let buffer_x = CULL_BUFFER_PX / camera.scale_x;
    let buffer_y = CULL_BUFFER_PX / camera.scale_y;

    slots
        .iter()
        .filter(|slot| {
            #[allow(clippy::cast_precision_loss)]
            let shift = slot.layer() as f64 * geometry.layer_z_offset;
            let slot_left = slot.x + shift / camera.scale_x;
            let slot_top = slot.y - shift / camera.scale_y;
            let slot_right = slot_left + slot.width_or(geometry.default_w);
            let slot_bottom = slot_top + slot.height_or(geometry.default_h);
            !(slot_right < left - buffer_x
                || slot_left > right + buffer_x
                || slot_bottom < top - buffer_y
                || slot_top > bottom + buffer_y)
        })
        .collect()
}

// =============================================================================
// METERING
// =============================================================================

/// Rolling frames-per-second counter, recomputed once per second.
#[derive(Debug, Clone, Default)]
pub struct FpsMeter {
    fps: u32,
    frames: u32,
    window_start: Option<f64>,
}

impl FpsMeter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame at `now_ms`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn tick(&mut self, now_ms: f64) {
        let start = *self.window_start.get_or_insert(now_ms);
        let elapsed = now_ms - start;
        if elapsed >= FPS_WINDOW_MS {
            self.fps = (f64::from(self.frames) * 1000.0 / elapsed).round() as u32;
            self.frames = 0;
            self.window_start = Some(now_ms);
        }
        self.frames += 1;
    }

    /// Frames per second measured over the last complete window.
    #[must_use]
    pub fn fps(&self) -> u32 {
        self.fps
    }
}

/// Counters describing the most recent render passes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderStats {
    /// Render passes completed.
    pub render_count: u64,
    /// Duration of the last pass in milliseconds.
    pub last_render_ms: f64,
    /// Slots drawn in the last pass.
    pub visible_slots: usize,
    /// Slots in the list during the last pass.
    pub total_slots: usize,
}

impl RenderStats {
    /// Record a finished pass that began at `start_ms`.
    pub fn record_render(&mut self, start_ms: f64, end_ms: f64) {
        self.last_render_ms = end_ms - start_ms;
        self.render_count += 1;
    }

    /// Record the culling result of a pass.
    pub fn record_visible(&mut self, visible: usize, total: usize) {
        self.visible_slots = visible;
        self.total_slots = total;
    }
}

// =============================================================================
// RATE LIMITING
// =============================================================================

/// Trailing-edge debounce: only the last call within the window fires.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay_ms: f64,
    pending: Option<TimerId>,
}

impl Debouncer {
    #[must_use]
    pub fn new(delay_ms: f64) -> Self {
        Self { delay_ms, pending: None }
    }

    /// Restart the window, cancelling any pending timer.
    pub fn call<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) -> TimerId {
        if let Some(old) = self.pending.take() {
            scheduler.cancel_delay(old);
        }
        let id = scheduler.delay(self.delay_ms);
        self.pending = Some(id);
        id
    }

    /// Whether `id` is the live timer. Consumes it when it is.
    pub fn fire(&mut self, id: TimerId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Drop the pending timer, if any.
    pub fn cancel<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(id) = self.pending.take() {
            scheduler.cancel_delay(id);
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Leading-edge throttle: at most one pass per interval.
///
/// Callers that must not lose the last rejected call replay it after
/// [`Throttle::remaining`].
#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: f64,
    last: Option<f64>,
}

impl Throttle {
    #[must_use]
    pub fn new(interval_ms: f64) -> Self {
        Self { interval_ms, last: None }
    }

    /// Returns `true` and starts a new interval when the previous one has elapsed.
    pub fn try_acquire(&mut self, now_ms: f64) -> bool {
        match self.last {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last = Some(now_ms);
                true
            }
        }
    }

    /// Milliseconds until the next call would go through; zero when it would now.
    #[must_use]
    pub fn remaining(&self, now_ms: f64) -> f64 {
        self.last.map_or(0.0, |last| (last + self.interval_ms - now_ms).max(0.0))
    }

    /// Forget the last pass so the next call goes through.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Single-flight batcher that collects operations and flushes them on the next frame.
///
/// Adding an operation equal to one already pending is a no-op, so repeated
/// requests within a frame collapse into one.
#[derive(Debug, Clone)]
pub struct FrameBatcher<T> {
    pending: Vec<T>,
    frame: Option<FrameId>,
}

impl<T> Default for FrameBatcher<T> {
    fn default() -> Self {
        Self { pending: Vec::new(), frame: None }
    }
}

impl<T: PartialEq> FrameBatcher<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `op` and make sure a frame is requested.
    pub fn add<S: Scheduler + ?Sized>(&mut self, op: T, scheduler: &mut S) {
        if !self.pending.contains(&op) {
            self.pending.push(op);
        }
        if self.frame.is_none() {
            self.frame = Some(scheduler.request_frame());
        }
    }

    /// Take the queued operations if `id` is this batcher's frame.
    pub fn flush(&mut self, id: FrameId) -> Vec<T> {
        if self.frame != Some(id) {
            return Vec::new();
        }
        self.frame = None;
        std::mem::take(&mut self.pending)
    }

    /// Cancel the frame and drop queued operations.
    pub fn clear<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(id) = self.frame.take() {
            scheduler.cancel_frame(id);
        }
        self.pending.clear();
    }

    /// The frame this batcher is waiting on, if any.
    #[must_use]
    pub fn scheduled_frame(&self) -> Option<FrameId> {
        self.frame
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// =============================================================================
// CACHE
// =============================================================================

/// Fixed-capacity map that evicts the oldest *inserted* key when full.
///
/// Reads do not refresh a key's position, and overwriting an existing key keeps
/// its original position. A full cache evicts before every `insert`, including
/// overwrites.
#[derive(Debug, Clone)]
pub struct BoundedCache<K, V> {
    max_size: usize,
    entries: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K: Eq + Hash + Clone, V> BoundedCache<K, V> {
    /// Create a cache holding at most `max_size` entries (minimum one).
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self { max_size: max_size.max(1), entries: HashMap::new(), order: VecDeque::new() }
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: K, value: V) {
        if self.entries.len() >= self.max_size {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        if self.entries.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash + Clone, V> Default for BoundedCache<K, V> {
    fn default() -> Self {
        Self::new(crate::consts::DEFAULT_CACHE_SIZE)
    }
}
