use serde::Serialize;
use tracing::{debug, warn};

use crate::align::{self, Bounds};
use crate::camera::{Camera, Point};
use crate::config::{MapConfig, MenuItem};
use crate::consts::CLICK_DELAY_MS;
use crate::hit::{self, SlotGeometry};
use crate::input::{Button, ContextMenu, Cursor, InputState, Modifiers, PendingClick, UiState};
use crate::perf::{self, Debouncer, FpsMeter, FrameBatcher, RenderStats, Throttle};
use crate::render::{self, Frame};
use crate::schedule::{FrameId, ManualScheduler, Scheduler, TimerId};
use crate::selection::SelectionState;
use crate::slot::{Slot, SlotId, SlotList};
use crate::surface::{Surface, SurfaceError};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Intents returned from engine handlers for the host to process.
///
/// Serializes as `{"type": ..., "payload": ...}` for JavaScript hosts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Action {
    /// The slot under the pointer changed.
    HoverChanged(Option<Slot>),
    /// A slot was clicked once and the double-click window elapsed.
    Click(Slot),
    /// A slot was pressed twice within the double-click window.
    DoubleClick(Slot),
    /// The context menu opened on a slot at container coordinates.
    ContextMenuRequested { slot: Slot, x: f64, y: f64 },
    /// A context menu entry was chosen for a slot.
    MenuItemChosen { item: MenuItem, slot: Slot },
    /// The multi-selection changed; ids in selection order.
    SelectionChanged(Vec<SlotId>),
    /// Full replacement slot list the host should adopt.
    PositionsUpdated(Vec<Slot>),
    /// The pointer affordance changed.
    SetCursor(Cursor),
    /// Render now; only emitted when frame coalescing is disabled.
    RenderNeeded,
}

/// Work queued for the next animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameTask {
    Redraw,
    DashStep,
}

/// Core engine state: all logic that does not depend on a drawing surface.
///
/// Separated from `Engine` so it can be tested without a surface.
pub struct EngineCore<S: Scheduler = ManualScheduler> {
    pub slots: SlotList,
    pub config: MapConfig,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub selection: SelectionState,
    pub menu: Option<ContextMenu>,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
    pub scheduler: S,
    pub stats: RenderStats,
    pub fps: FpsMeter,
    pending_click: Option<PendingClick>,
    frames: FrameBatcher<FrameTask>,
    resize: Debouncer,
    pending_size: Option<(f64, f64, f64)>,
    hover_throttle: Throttle,
    pending_hover: Option<(Point, Modifiers)>,
    hover_timer: Option<TimerId>,
    last_bounds: Option<Bounds>,
}

impl Default for EngineCore<ManualScheduler> {
    fn default() -> Self {
        Self::new(MapConfig::default(), ManualScheduler::new())
    }
}

impl<S: Scheduler> EngineCore<S> {
    #[must_use]
    pub fn new(config: MapConfig, scheduler: S) -> Self {
        let perf = config.performance;
        Self {
            slots: SlotList::new(),
            config,
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            selection: SelectionState::new(),
            menu: None,
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
            scheduler,
            stats: RenderStats::default(),
            fps: FpsMeter::new(),
            pending_click: None,
            frames: FrameBatcher::new(),
            resize: Debouncer::new(perf.debounce_delay),
            pending_size: None,
            hover_throttle: Throttle::new(perf.throttle_delay),
            pending_hover: None,
            hover_timer: None,
            last_bounds: None,
        }
    }

    // --- Data inputs ---

    /// Replace the slot list with a new host snapshot.
    ///
    /// Re-aligns when the bounding box changed and requests a redraw.
    pub fn set_slots(&mut self, slots: Vec<Slot>) -> Vec<Action> {
        self.slots.replace(slots);
        let bounds = self.bounds();
        if self.last_bounds != Some(bounds) {
            self.realign();
        }
        let mut actions = Vec::new();
        self.request_redraw(&mut actions);
        actions
    }

    /// Replace the configuration, refit, and realign.
    pub fn set_config(&mut self, config: MapConfig) -> Vec<Action> {
        self.cancel_hover_replay();
        self.resize = Debouncer::new(config.performance.debounce_delay);
        self.hover_throttle = Throttle::new(config.performance.throttle_delay);
        self.config = config;
        self.refit();
        let mut actions = Vec::new();
        self.request_redraw(&mut actions);
        actions
    }

    // --- Viewport ---

    /// Apply new surface dimensions immediately and refit.
    ///
    /// A zero-size viewport is recorded but leaves the engine unready; every
    /// surface-dependent operation is a no-op until a real size arrives.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        self.viewport_width = width_css.max(0.0);
        self.viewport_height = height_css.max(0.0);
        self.dpr = if dpr > 0.0 { dpr } else { 1.0 };
        if !self.is_ready() {
            return Vec::new();
        }
        debug!(width = self.viewport_width, height = self.viewport_height, dpr = self.dpr, "viewport applied");
        self.refit();
        let mut actions = Vec::new();
        self.request_redraw(&mut actions);
        actions
    }

    /// Record a resize notification, debounced when configured.
    pub fn on_resize(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        if !self.config.performance.enable_debounce {
            return self.set_viewport(width_css, height_css, dpr);
        }
        self.pending_size = Some((width_css, height_css, dpr));
        self.resize.call(&mut self.scheduler);
        Vec::new()
    }

    /// Whether the surface has a usable size.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.viewport_width > 0.0 && self.viewport_height > 0.0
    }

    /// Reset the offset to the world origin.
    pub fn reset_view(&mut self) -> Vec<Action> {
        self.set_offset(0.0, 0.0)
    }

    /// Set the absolute offset in screen pixels.
    pub fn set_offset(&mut self, x: f64, y: f64) -> Vec<Action> {
        self.camera.offset_x = x;
        self.camera.offset_y = y;
        let mut actions = Vec::new();
        self.request_redraw(&mut actions);
        actions
    }

    /// The current offset in screen pixels.
    #[must_use]
    pub fn offset(&self) -> Point {
        Point::new(self.camera.offset_x, self.camera.offset_y)
    }

    /// Move the view by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Vec<Action> {
        self.set_offset(self.camera.offset_x + dx, self.camera.offset_y + dy)
    }

    /// Center the viewport on a world-space rectangle at the current scale.
    pub fn center_on_area(&mut self, x: f64, y: f64, width: f64, height: f64) -> Vec<Action> {
        let center_x = x + width / 2.0;
        let center_y = y + height / 2.0;
        self.set_offset(
            self.viewport_width / 2.0 - center_x * self.camera.scale_x,
            self.viewport_height / 2.0 - center_y * self.camera.scale_y,
        )
    }

    /// The uniform scale factor.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.camera.scale()
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        if !self.is_ready() || button != Button::Primary {
            return actions;
        }
        self.menu = None;

        // A press while a gesture is live (second touch, lost release) only ends that gesture.
        if self.input != InputState::Idle || self.selection.is_selecting() {
            self.end_gesture(&mut actions);
            return actions;
        }

        let hit = self.hit(screen_pt).cloned();

        if hit.is_none() && modifiers.selecting() && self.config.enable_selection {
            let now = self.scheduler.now_ms();
            self.selection.start(screen_pt, modifiers.shift, now);
            self.input = InputState::MarqueeSelecting;
            self.frames.add(FrameTask::DashStep, &mut self.scheduler);
            self.set_cursor(Cursor::Crosshair, &mut actions);
            debug!(x = screen_pt.x, y = screen_pt.y, extend = modifiers.shift, "marquee started");
            return actions;
        }

        match hit {
            Some(slot) if slot.is_header => {}
            Some(slot) => self.press_slot(slot, &mut actions),
            None if self.config.enable_pan => {
                self.input = InputState::Dragging { start: screen_pt, start_offset: self.offset() };
                self.set_cursor(Cursor::Grabbing, &mut actions);
                debug!(x = screen_pt.x, y = screen_pt.y, "drag started");
            }
            None => {}
        }
        actions
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        if !self.is_ready() {
            return actions;
        }

        match self.input {
            InputState::MarqueeSelecting if modifiers.selecting() => {
                let geometry = self.geometry();
                if let Some(ids) = self
                    .selection
                    .update(screen_pt, self.slots.as_slice(), &self.camera, &geometry)
                {
                    actions.push(Action::SelectionChanged(ids));
                }
                self.request_redraw(&mut actions);
                return actions;
            }
            InputState::Dragging { start, start_offset } => {
                self.camera.offset_x = start_offset.x + (screen_pt.x - start.x);
                self.camera.offset_y = start_offset.y + (screen_pt.y - start.y);
                self.request_redraw(&mut actions);
                return actions;
            }
            _ => {}
        }

        if self.config.performance.enable_throttle {
            let now = self.scheduler.now_ms();
            if !self.hover_throttle.try_acquire(now) {
                self.defer_hover(screen_pt, modifiers, now);
                return actions;
            }
        }
        self.cancel_hover_replay();
        self.apply_hover(screen_pt, modifiers, &mut actions);
        actions
    }

    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        self.end_gesture(&mut actions);
        actions
    }

    /// Pointer cancellation ends gestures exactly like a release.
    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.end_gesture(&mut actions);
        actions
    }

    /// Leaving the surface ends any gesture and clears hover.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.end_gesture(&mut actions);
        self.cancel_hover_replay();
        if self.ui.hover_id.take().is_some() {
            actions.push(Action::HoverChanged(None));
        }
        self.hover_throttle.reset();
        self.request_redraw(&mut actions);
        actions
    }

    // --- Context menu ---

    /// Open the context menu on the slot under `screen_pt`, if any.
    pub fn on_context_menu(&mut self, screen_pt: Point) -> Vec<Action> {
        let mut actions = Vec::new();
        if !self.config.enable_context_menu || !self.is_ready() {
            return actions;
        }
        let Some(slot) = self.hit(screen_pt).filter(|s| !s.is_header).cloned() else {
            return actions;
        };
        debug!(id = %slot.id, x = screen_pt.x, y = screen_pt.y, "context menu opened");
        self.menu = Some(ContextMenu { x: screen_pt.x, y: screen_pt.y, click: screen_pt, slot: slot.clone() });
        actions.push(Action::ContextMenuRequested { slot, x: screen_pt.x, y: screen_pt.y });
        actions
    }

    /// Reposition the open menu once the host has measured it.
    pub fn place_context_menu(&mut self, menu_w: f64, menu_h: f64) -> Option<&ContextMenu> {
        let (container_w, container_h) = (self.viewport_width, self.viewport_height);
        let menu = self.menu.as_mut()?;
        menu.place(menu_w, menu_h, container_w, container_h);
        Some(menu)
    }

    /// Report the chosen menu entry for the slot the menu was opened on, then close it.
    pub fn choose_menu_item(&mut self, key: &str) -> Vec<Action> {
        let mut actions = Vec::new();
        let Some(item) = self.config.context_menu_items.iter().find(|i| i.key == key).cloned() else {
            return actions;
        };
        if let Some(menu) = self.menu.take() {
            actions.push(Action::MenuItemChosen { item, slot: menu.slot });
        }
        actions
    }

    /// Close the context menu without choosing.
    pub fn hide_context_menu(&mut self) {
        self.menu = None;
    }

    // --- Selection ---

    pub fn add_to_selection(&mut self, id: &SlotId) -> Vec<Action> {
        self.selection.add(id);
        self.selection_changed()
    }

    pub fn remove_from_selection(&mut self, id: &SlotId) -> Vec<Action> {
        self.selection.remove(id);
        self.selection_changed()
    }

    pub fn toggle_selection(&mut self, id: &SlotId) -> Vec<Action> {
        self.selection.toggle(id);
        self.selection_changed()
    }

    /// Select every non-header slot.
    pub fn select_all(&mut self) -> Vec<Action> {
        self.selection.select_all(self.slots.as_slice());
        self.selection_changed()
    }

    /// Clear the selection and abandon any marquee in progress.
    pub fn clear_selection(&mut self) -> Vec<Action> {
        self.selection.clear();
        if self.input == InputState::MarqueeSelecting {
            self.input = InputState::Idle;
        }
        self.selection_changed()
    }

    /// Selected slots in host order.
    #[must_use]
    pub fn selected_slots(&self) -> Vec<&Slot> {
        self.selection.selected_slots(self.slots.as_slice())
    }

    /// Emit a replacement list without the selected slots.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        if self.selection.is_empty() {
            return Vec::new();
        }
        let remaining = self.slots.copy_without(self.selection.ids());
        self.selection.clear();
        let mut actions = vec![Action::PositionsUpdated(remaining), Action::SelectionChanged(Vec::new())];
        self.request_redraw(&mut actions);
        actions
    }

    /// Emit a replacement list with the selected slots recolored.
    pub fn change_selected_color(&mut self, color: &str) -> Vec<Action> {
        self.edit_selected(|slot| slot.color = Some(color.to_owned()))
    }

    /// Emit a replacement list with the selected slots' status changed.
    pub fn change_selected_status(&mut self, status: &str) -> Vec<Action> {
        self.edit_selected(|slot| slot.status = Some(status.to_owned()))
    }

    /// Emit a replacement list with the selected slots' border color changed.
    pub fn change_selected_border_color(&mut self, border_color: &str) -> Vec<Action> {
        self.edit_selected(|slot| slot.border_color = Some(border_color.to_owned()))
    }

    // --- Business queries ---

    /// Hand a replacement slot list to the host.
    #[must_use]
    pub fn update_slots(&self, slots: Vec<Slot>) -> Vec<Action> {
        vec![Action::PositionsUpdated(slots)]
    }

    /// Emit a copy with one slot's status changed. Empty when `id` is unknown.
    #[must_use]
    pub fn set_status(&self, id: &SlotId, status: &str) -> Vec<Action> {
        self.batch_update_status(std::slice::from_ref(id), status)
    }

    /// Emit a copy with every listed slot's status changed. Empty when none matched.
    #[must_use]
    pub fn batch_update_status(&self, ids: &[SlotId], status: &str) -> Vec<Action> {
        self.slots
            .copy_with(ids, |slot| slot.status = Some(status.to_owned()))
            .map(|copy| vec![Action::PositionsUpdated(copy)])
            .unwrap_or_default()
    }

    /// Set or clear the click-selected slot.
    pub fn select_slot(&mut self, id: Option<SlotId>) -> Vec<Action> {
        self.ui.selected_id = id;
        let mut actions = Vec::new();
        self.request_redraw(&mut actions);
        actions
    }

    #[must_use]
    pub fn selected_slot(&self) -> Option<&Slot> {
        self.ui.selected_id.as_ref().and_then(|id| self.slots.get(id))
    }

    #[must_use]
    pub fn hovered_slot(&self) -> Option<&Slot> {
        self.ui.hover_id.as_ref().and_then(|id| self.slots.get(id))
    }

    #[must_use]
    pub fn slots_by_status(&self, status: &str) -> Vec<&Slot> {
        self.slots.by_status(status)
    }

    #[must_use]
    pub fn slot_by_id(&self, id: &SlotId) -> Option<&Slot> {
        self.slots.get(id)
    }

    // --- Scheduler callbacks ---

    /// Handle an expired delay.
    pub fn on_timer(&mut self, id: TimerId) -> Vec<Action> {
        let mut actions = Vec::new();

        if self.pending_click.as_ref().is_some_and(|p| p.timer == id) {
            // A slot removed while the timer ran produces no click.
            if let Some(slot) = self.pending_click.take().and_then(|p| self.slots.get(&p.id).cloned()) {
                debug!(id = %slot.id, "click");
                self.ui.selected_id = Some(slot.id.clone());
                actions.push(Action::Click(slot));
                self.request_redraw(&mut actions);
            }
            return actions;
        }

        if self.hover_timer == Some(id) {
            self.hover_timer = None;
            if let Some((screen_pt, modifiers)) = self.pending_hover.take() {
                if self.is_ready() && self.input == InputState::Idle {
                    let now = self.scheduler.now_ms();
                    if self.hover_throttle.try_acquire(now) {
                        self.apply_hover(screen_pt, modifiers, &mut actions);
                    } else {
                        self.defer_hover(screen_pt, modifiers, now);
                    }
                }
            }
            return actions;
        }

        if self.resize.fire(id) {
            if let Some((w, h, dpr)) = self.pending_size.take() {
                actions = self.set_viewport(w, h, dpr);
            }
        }
        actions
    }

    /// Handle an animation frame. Returns `true` when a render pass should run.
    pub fn on_frame(&mut self, id: FrameId) -> bool {
        let tasks = self.frames.flush(id);
        if tasks.is_empty() {
            return false;
        }
        let now = self.scheduler.now_ms();
        let mut render = tasks.contains(&FrameTask::Redraw);
        if tasks.contains(&FrameTask::DashStep) {
            let stepped = self.selection.advance_dash(now);
            if self.selection.is_selecting() {
                render |= stepped;
                self.frames.add(FrameTask::DashStep, &mut self.scheduler);
            }
        }
        render
    }

    /// Draw the current state to `surface`, recording timing and culling stats.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the surface rejects a drawing call.
    pub fn render_to<Su: Surface + ?Sized>(&mut self, surface: &mut Su) -> Result<(), SurfaceError> {
        if !self.is_ready() {
            return Ok(());
        }
        let start = self.scheduler.now_ms();
        let geometry = self.geometry();
        let visible = perf::filter_visible(
            self.slots.as_slice(),
            &self.camera,
            self.viewport_width,
            self.viewport_height,
            &geometry,
            &self.config.performance,
        );
        let visible_count = visible.len();
        let frame = Frame {
            slots: &visible,
            config: &self.config,
            camera: &self.camera,
            ui: &self.ui,
            selection: &self.selection,
            viewport_w: self.viewport_width,
            viewport_h: self.viewport_height,
            dpr: self.dpr,
        };
        let result = render::draw(surface, &frame);

        let end = self.scheduler.now_ms();
        self.stats.record_visible(visible_count, self.slots.len());
        self.stats.record_render(start, end);
        self.fps.tick(end);
        result
    }

    /// Cancel every pending timer and frame and drop gesture state.
    pub fn teardown(&mut self) {
        if let Some(pending) = self.pending_click.take() {
            self.scheduler.cancel_delay(pending.timer);
        }
        self.frames.clear(&mut self.scheduler);
        self.resize.cancel(&mut self.scheduler);
        self.cancel_hover_replay();
        self.pending_size = None;
        self.selection.clear();
        self.input = InputState::Idle;
        self.menu = None;
    }

    // --- Queries ---

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Topmost slot under a screen point, against the full slot list.
    #[must_use]
    pub fn hit(&self, screen_pt: Point) -> Option<&Slot> {
        hit::hit_test(screen_pt, self.slots.as_slice(), &self.camera, &self.geometry())
    }

    /// Geometry inputs derived from the configuration.
    #[must_use]
    pub fn geometry(&self) -> SlotGeometry {
        SlotGeometry {
            default_w: self.config.default_w,
            default_h: self.config.default_h,
            layer_z_offset: self.config.layer_z_offset,
        }
    }

    /// Bounding box of the current slot list.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        align::compute_bounds(
            self.slots.as_slice(),
            self.config.default_w,
            self.config.default_h,
            self.config.width,
            self.config.height,
        )
    }

    // --- Internals ---

    fn refit(&mut self) {
        if !self.is_ready() {
            return;
        }
        let scale = align::fit_scale(
            self.viewport_width,
            self.viewport_height,
            self.config.width,
            self.config.height,
        );
        self.camera.set_scale(scale);
        self.realign();
    }

    fn realign(&mut self) {
        let bounds = self.bounds();
        self.last_bounds = Some(bounds);
        if !self.is_ready() {
            return;
        }
        let (x, y) = align::apply_alignment(
            self.config.align,
            &bounds,
            self.viewport_width,
            self.viewport_height,
            self.camera.scale(),
        );
        self.camera.offset_x = x;
        self.camera.offset_y = y;
    }

    fn press_slot(&mut self, slot: Slot, actions: &mut Vec<Action>) {
        if let Some(pending) = self.pending_click.take() {
            self.scheduler.cancel_delay(pending.timer);
            if pending.id == slot.id {
                debug!(id = %slot.id, "double click");
                actions.push(Action::DoubleClick(slot));
                return;
            }
        }
        let timer = self.scheduler.delay(CLICK_DELAY_MS);
        self.pending_click = Some(PendingClick { id: slot.id, timer });
    }

    fn end_gesture(&mut self, actions: &mut Vec<Action>) {
        match std::mem::take(&mut self.input) {
            InputState::Dragging { .. } => {
                self.set_cursor(Cursor::Default, actions);
                debug!(offset_x = self.camera.offset_x, offset_y = self.camera.offset_y, "drag ended");
            }
            InputState::MarqueeSelecting => {
                if let Some(ids) = self.selection.end() {
                    actions.push(Action::SelectionChanged(ids));
                }
                debug!(selected = self.selection.ids().len(), "marquee ended");
                self.request_redraw(actions);
            }
            InputState::Idle => {}
        }
        // The marquee ends with the gesture even if the input state lost track of it.
        if self.selection.is_selecting() {
            if let Some(ids) = self.selection.end() {
                actions.push(Action::SelectionChanged(ids));
            }
            self.request_redraw(actions);
        }
    }

    /// Hit-test under the pointer and publish hover and cursor changes.
    fn apply_hover(&mut self, screen_pt: Point, modifiers: Modifiers, actions: &mut Vec<Action>) {
        let hit = self.hit(screen_pt).cloned();
        let over_slot = hit.is_some();
        let hit_id = hit.as_ref().map(|s| s.id.clone());
        if self.ui.hover_id != hit_id {
            self.ui.hover_id = hit_id;
            actions.push(Action::HoverChanged(hit));
            self.request_redraw(actions);
        }
        self.update_hover_cursor(modifiers, over_slot, actions);
    }

    /// Keep the latest throttled move and replay it when the interval ends.
    fn defer_hover(&mut self, screen_pt: Point, modifiers: Modifiers, now: f64) {
        self.pending_hover = Some((screen_pt, modifiers));
        if self.hover_timer.is_none() {
            let wait = self.hover_throttle.remaining(now);
            self.hover_timer = Some(self.scheduler.delay(wait));
        }
    }

    fn cancel_hover_replay(&mut self) {
        self.pending_hover = None;
        if let Some(timer) = self.hover_timer.take() {
            self.scheduler.cancel_delay(timer);
        }
    }

    fn update_hover_cursor(&mut self, modifiers: Modifiers, over_slot: bool, actions: &mut Vec<Action>) {
        let cursor = if modifiers.selecting() && self.config.enable_selection {
            Cursor::Crosshair
        } else if self.config.enable_pan && !over_slot {
            Cursor::Grab
        } else if over_slot {
            Cursor::Pointer
        } else {
            Cursor::Default
        };
        self.set_cursor(cursor, actions);
    }

    fn set_cursor(&mut self, cursor: Cursor, actions: &mut Vec<Action>) {
        if self.ui.cursor != cursor {
            self.ui.cursor = cursor;
            actions.push(Action::SetCursor(cursor));
        }
    }

    fn selection_changed(&mut self) -> Vec<Action> {
        let mut actions = vec![Action::SelectionChanged(self.selection.ids().to_vec())];
        self.request_redraw(&mut actions);
        actions
    }

    fn edit_selected<F>(&mut self, edit: F) -> Vec<Action>
    where
        F: FnMut(&mut Slot),
    {
        if self.selection.is_empty() {
            return Vec::new();
        }
        let copy = self
            .slots
            .copy_with(self.selection.ids(), edit)
            .unwrap_or_else(|| self.slots.as_slice().to_vec());
        let mut actions = vec![
            Action::PositionsUpdated(copy),
            Action::SelectionChanged(self.selection.ids().to_vec()),
        ];
        self.request_redraw(&mut actions);
        actions
    }

    fn request_redraw(&mut self, actions: &mut Vec<Action>) {
        if self.config.performance.enable_raf_optimization {
            self.frames.add(FrameTask::Redraw, &mut self.scheduler);
        } else if !actions.contains(&Action::RenderNeeded) {
            actions.push(Action::RenderNeeded);
        }
    }
}

/// The full engine. Wraps `EngineCore` and owns the drawing surface once mounted.
pub struct Engine<Su: Surface, Sc: Scheduler = ManualScheduler> {
    surface: Option<Su>,
    pub core: EngineCore<Sc>,
}

impl<Su: Surface, Sc: Scheduler> Engine<Su, Sc> {
    /// Create an unmounted engine. Rendering is a no-op until [`Engine::mount`].
    #[must_use]
    pub fn new(config: MapConfig, scheduler: Sc) -> Self {
        Self { surface: None, core: EngineCore::new(config, scheduler) }
    }

    /// Attach the drawing surface.
    pub fn mount(&mut self, surface: Su) {
        self.surface = Some(surface);
    }

    /// Tear down scheduling state and detach the surface.
    pub fn unmount(&mut self) -> Option<Su> {
        self.core.teardown();
        self.surface.take()
    }

    #[must_use]
    pub fn surface(&self) -> Option<&Su> {
        self.surface.as_ref()
    }

    // --- Delegated inputs ---

    pub fn set_slots(&mut self, slots: Vec<Slot>) -> Vec<Action> {
        let actions = self.core.set_slots(slots);
        self.settle(actions)
    }

    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        let actions = self.core.set_viewport(width_css, height_css, dpr);
        self.settle(actions)
    }

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_pointer_down(screen_pt, button, modifiers);
        self.settle(actions)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_pointer_move(screen_pt, modifiers);
        self.settle(actions)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_pointer_up(screen_pt, button, modifiers);
        self.settle(actions)
    }

    pub fn set_config(&mut self, config: MapConfig) -> Vec<Action> {
        let actions = self.core.set_config(config);
        self.settle(actions)
    }

    pub fn on_resize(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        let actions = self.core.on_resize(width_css, height_css, dpr);
        self.settle(actions)
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        let actions = self.core.on_pointer_leave();
        self.settle(actions)
    }

    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        let actions = self.core.on_pointer_cancel();
        self.settle(actions)
    }

    pub fn on_context_menu(&mut self, screen_pt: Point) -> Vec<Action> {
        let actions = self.core.on_context_menu(screen_pt);
        self.settle(actions)
    }

    pub fn choose_menu_item(&mut self, key: &str) -> Vec<Action> {
        let actions = self.core.choose_menu_item(key);
        self.settle(actions)
    }

    // --- Delegated viewport operations ---

    pub fn reset_view(&mut self) -> Vec<Action> {
        let actions = self.core.reset_view();
        self.settle(actions)
    }

    pub fn set_offset(&mut self, x: f64, y: f64) -> Vec<Action> {
        let actions = self.core.set_offset(x, y);
        self.settle(actions)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Vec<Action> {
        let actions = self.core.pan_by(dx, dy);
        self.settle(actions)
    }

    pub fn center_on_area(&mut self, x: f64, y: f64, width: f64, height: f64) -> Vec<Action> {
        let actions = self.core.center_on_area(x, y, width, height);
        self.settle(actions)
    }

    // --- Delegated selection and batch edits ---

    pub fn add_to_selection(&mut self, id: &SlotId) -> Vec<Action> {
        let actions = self.core.add_to_selection(id);
        self.settle(actions)
    }

    pub fn remove_from_selection(&mut self, id: &SlotId) -> Vec<Action> {
        let actions = self.core.remove_from_selection(id);
        self.settle(actions)
    }

    pub fn toggle_selection(&mut self, id: &SlotId) -> Vec<Action> {
        let actions = self.core.toggle_selection(id);
        self.settle(actions)
    }

    pub fn select_all(&mut self) -> Vec<Action> {
        let actions = self.core.select_all();
        self.settle(actions)
    }

    pub fn clear_selection(&mut self) -> Vec<Action> {
        let actions = self.core.clear_selection();
        self.settle(actions)
    }

    pub fn select_slot(&mut self, id: Option<SlotId>) -> Vec<Action> {
        let actions = self.core.select_slot(id);
        self.settle(actions)
    }

    pub fn delete_selected(&mut self) -> Vec<Action> {
        let actions = self.core.delete_selected();
        self.settle(actions)
    }

    pub fn change_selected_color(&mut self, color: &str) -> Vec<Action> {
        let actions = self.core.change_selected_color(color);
        self.settle(actions)
    }

    pub fn change_selected_status(&mut self, status: &str) -> Vec<Action> {
        let actions = self.core.change_selected_status(status);
        self.settle(actions)
    }

    pub fn change_selected_border_color(&mut self, border_color: &str) -> Vec<Action> {
        let actions = self.core.change_selected_border_color(border_color);
        self.settle(actions)
    }

    pub fn on_timer(&mut self, id: TimerId) -> Vec<Action> {
        let actions = self.core.on_timer(id);
        self.settle(actions)
    }

    /// Handle an animation frame, rendering when the core asks for it.
    pub fn on_frame(&mut self, id: FrameId) {
        if self.core.on_frame(id) {
            self.render();
        }
    }

    // --- Render ---

    /// Draw the current state to the mounted surface. No-op when unmounted.
    pub fn render(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if let Err(e) = self.core.render_to(surface) {
            warn!(error = %e, "render pass failed");
        }
    }

    /// Render immediately for `RenderNeeded` and strip it from the returned intents.
    fn settle(&mut self, mut actions: Vec<Action>) -> Vec<Action> {
        if actions.contains(&Action::RenderNeeded) {
            actions.retain(|a| *a != Action::RenderNeeded);
            self.render();
        }
        actions
    }
}
