#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::config::{Anchor, PerformanceConfig};
use crate::surface::RecordingSurface;

// =============================================================
// Helpers
// =============================================================

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn no_modifiers() -> Modifiers {
    Modifiers::default()
}

fn ctrl_modifier() -> Modifiers {
    Modifiers { ctrl: true, ..Default::default() }
}

fn ctrl_shift_modifier() -> Modifiers {
    Modifiers { ctrl: true, shift: true, ..Default::default() }
}

/// 100x100 world, 8x8 default slots, hover throttle off.
fn test_config() -> MapConfig {
    MapConfig {
        width: 100.0,
        height: 100.0,
        default_w: 8.0,
        default_h: 8.0,
        context_menu_items: vec![MenuItem::new("lock", "Lock"), MenuItem::new("info", "Info")],
        performance: PerformanceConfig { enable_throttle: false, ..PerformanceConfig::default() },
        ..MapConfig::default()
    }
}

fn three_slots() -> Vec<Slot> {
    vec![
        Slot::new("A", 0.0, 0.0).with_size(8.0, 8.0),
        Slot::new("B", 10.0, 0.0).with_size(8.0, 8.0),
        Slot::new("C", 20.0, 0.0).with_size(8.0, 8.0),
    ]
}

/// Core on a 100x100 surface with the three-slot row, aligned at center.
///
/// Screen rects: A (36..44, 46..54), B (46..54, 46..54), C (56..64, 46..54).
fn core_with(config: MapConfig, slots: Vec<Slot>) -> EngineCore {
    let mut core = EngineCore::new(config, ManualScheduler::new());
    core.set_viewport(100.0, 100.0, 1.0);
    core.set_slots(slots);
    core
}

fn ready_core() -> EngineCore {
    core_with(test_config(), three_slots())
}

const ON_A: Point = Point { x: 40.0, y: 50.0 };
const ON_B: Point = Point { x: 50.0, y: 50.0 };
const EMPTY: Point = Point { x: 5.0, y: 5.0 };

fn press(core: &mut EngineCore, p: Point) -> Vec<Action> {
    let mut actions = core.on_pointer_down(p, Button::Primary, no_modifiers());
    actions.extend(core.on_pointer_up(p, Button::Primary, no_modifiers()));
    actions
}

fn advance(core: &mut EngineCore, ms: f64) -> Vec<Action> {
    let due = core.scheduler.advance(ms);
    due.into_iter().flat_map(|id| core.on_timer(id)).collect()
}

/// Run every requested frame; returns how many asked for a render.
fn run_frames(core: &mut EngineCore) -> usize {
    let frames = core.scheduler.take_frames();
    frames.into_iter().filter(|id| core.on_frame(*id)).count()
}

fn has_action<F>(actions: &[Action], pred: F) -> bool
where
    F: Fn(&Action) -> bool,
{
    actions.iter().any(pred)
}

fn clicks(actions: &[Action]) -> Vec<String> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::Click(slot) => Some(slot.id.to_string()),
            _ => None,
        })
        .collect()
}

fn double_clicks(actions: &[Action]) -> usize {
    actions.iter().filter(|a| matches!(a, Action::DoubleClick(_))).count()
}

fn last_selection(actions: &[Action]) -> Option<Vec<String>> {
    actions.iter().rev().find_map(|a| match a {
        Action::SelectionChanged(ids) => Some(ids.iter().map(ToString::to_string).collect()),
        _ => None,
    })
}

fn positions(actions: &[Action]) -> Option<&Vec<Slot>> {
    actions.iter().find_map(|a| match a {
        Action::PositionsUpdated(slots) => Some(slots),
        _ => None,
    })
}

// =============================================================
// EngineCore: construction and viewport
// =============================================================

#[test]
fn core_default_is_unready_identity() {
    let core: EngineCore = EngineCore::default();
    assert!(!core.is_ready());
    assert_eq!(core.camera(), Camera::default());
    assert_eq!(core.dpr, 1.0);
    assert!(core.slots.is_empty());
}

#[test]
fn center_alignment_worked_example() {
    let core = ready_core();
    assert!(approx_eq(core.scale(), 1.0));
    assert!(approx_eq(core.offset().x, 36.0));
    assert!(approx_eq(core.offset().y, 46.0));
}

#[test]
fn fit_scale_preserves_aspect() {
    let mut core = ready_core();
    core.set_viewport(50.0, 200.0, 2.0);
    assert!(approx_eq(core.scale(), 0.5));
    assert_eq!(core.camera.scale_x, core.camera.scale_y);
    assert_eq!(core.dpr, 2.0);
}

#[test]
fn left_top_anchor_pins_bounds_corner() {
    let config = MapConfig { align: Anchor::LeftTop, ..test_config() };
    let core = core_with(config, vec![Slot::new("A", 10.0, 20.0)]);
    assert!(approx_eq(core.offset().x, -10.0));
    assert!(approx_eq(core.offset().y, -20.0));
}

#[test]
fn zero_size_viewport_is_silent_noop() {
    let mut core = EngineCore::new(test_config(), ManualScheduler::new());
    assert!(core.set_viewport(0.0, 100.0, 1.0).is_empty());
    core.set_slots(three_slots());
    assert!(!core.is_ready());
    assert!(core.on_pointer_down(ON_A, Button::Primary, no_modifiers()).is_empty());
    assert!(core.on_pointer_move(ON_A, no_modifiers()).is_empty());
    assert_eq!(core.scheduler.pending_timers(), 0);
}

#[test]
fn resize_is_debounced() {
    let mut core = ready_core();
    assert!(core.on_resize(200.0, 200.0, 1.0).is_empty());
    core.scheduler.advance(100.0);
    assert!(core.on_resize(300.0, 300.0, 1.0).is_empty());
    assert_eq!(core.viewport_width, 100.0);

    advance(&mut core, 100.0);
    assert_eq!(core.viewport_width, 100.0);
    advance(&mut core, 50.0);
    assert_eq!(core.viewport_width, 300.0);
    assert!(approx_eq(core.scale(), 3.0));
}

#[test]
fn resize_applies_immediately_without_debounce() {
    let mut config = test_config();
    config.performance.enable_debounce = false;
    let mut core = core_with(config, three_slots());
    core.on_resize(200.0, 200.0, 1.0);
    assert_eq!(core.viewport_width, 200.0);
    assert!(approx_eq(core.scale(), 2.0));
}

#[test]
fn set_slots_realigns_only_when_bounds_change() {
    let mut core = ready_core();
    core.pan_by(7.0, 0.0);
    core.set_slots(three_slots());
    assert!(approx_eq(core.offset().x, 43.0));

    core.set_slots(vec![Slot::new("A", 0.0, 0.0).with_size(8.0, 8.0)]);
    assert!(approx_eq(core.offset().x, 46.0));
}

#[test]
fn viewport_operations() {
    let mut core = ready_core();
    core.reset_view();
    assert_eq!(core.offset(), pt(0.0, 0.0));
    core.set_offset(10.0, -4.0);
    core.pan_by(5.0, 5.0);
    assert_eq!(core.offset(), pt(15.0, 1.0));
    core.center_on_area(0.0, 0.0, 8.0, 8.0);
    assert_eq!(core.offset(), pt(46.0, 46.0));
}

// =============================================================
// EngineCore: hover and cursor
// =============================================================

#[test]
fn hover_enters_and_leaves_slot() {
    let mut core = ready_core();
    let actions = core.on_pointer_move(ON_A, no_modifiers());
    assert!(has_action(&actions, |a| matches!(a, Action::HoverChanged(Some(s)) if s.id == SlotId::from("A"))));
    assert!(has_action(&actions, |a| *a == Action::SetCursor(Cursor::Pointer)));
    assert_eq!(core.hovered_slot().map(|s| s.id.to_string()).as_deref(), Some("A"));

    let actions = core.on_pointer_move(EMPTY, no_modifiers());
    assert!(has_action(&actions, |a| *a == Action::HoverChanged(None)));
    assert!(has_action(&actions, |a| *a == Action::SetCursor(Cursor::Grab)));
}

#[test]
fn hover_reports_only_changes() {
    let mut core = ready_core();
    core.on_pointer_move(ON_A, no_modifiers());
    let actions = core.on_pointer_move(pt(41.0, 51.0), no_modifiers());
    assert!(!has_action(&actions, |a| matches!(a, Action::HoverChanged(_))));
}

#[test]
fn hover_is_throttled_when_enabled() {
    let mut config = test_config();
    config.performance.enable_throttle = true;
    let mut core = core_with(config, three_slots());

    core.on_pointer_move(ON_A, no_modifiers());
    let actions = core.on_pointer_move(ON_B, no_modifiers());
    assert!(actions.is_empty());

    core.scheduler.advance(16.0);
    let actions = core.on_pointer_move(ON_B, no_modifiers());
    assert!(has_action(&actions, |a| matches!(a, Action::HoverChanged(Some(s)) if s.id == SlotId::from("B"))));
}

#[test]
fn throttled_move_off_slot_replays_after_interval() {
    let mut config = test_config();
    config.performance.enable_throttle = true;
    let mut core = core_with(config, three_slots());

    core.on_pointer_move(ON_A, no_modifiers());
    assert_eq!(core.ui.hover_id, Some(SlotId::from("A")));

    core.scheduler.advance(5.0);
    assert!(core.on_pointer_move(pt(99.0, 99.0), no_modifiers()).is_empty());
    assert_eq!(core.ui.hover_id, Some(SlotId::from("A")));
    assert_eq!(core.scheduler.pending_timers(), 1);

    let actions = advance(&mut core, 1000.0);
    assert!(core.ui.hover_id.is_none());
    assert!(has_action(&actions, |a| *a == Action::HoverChanged(None)));
    assert!(has_action(&actions, |a| *a == Action::SetCursor(Cursor::Grab)));
    assert_eq!(core.scheduler.pending_timers(), 0);
}

#[test]
fn throttled_moves_replay_only_the_latest_point() {
    let mut config = test_config();
    config.performance.enable_throttle = true;
    let mut core = core_with(config, three_slots());

    core.on_pointer_move(EMPTY, no_modifiers());
    core.scheduler.advance(2.0);
    core.on_pointer_move(ON_A, no_modifiers());
    core.scheduler.advance(2.0);
    core.on_pointer_move(ON_B, no_modifiers());
    assert_eq!(core.scheduler.pending_timers(), 1);

    let actions = advance(&mut core, 20.0);
    assert_eq!(core.ui.hover_id, Some(SlotId::from("B")));
    let hovered: Vec<&Action> = actions.iter().filter(|a| matches!(a, Action::HoverChanged(_))).collect();
    assert_eq!(hovered.len(), 1);
}

#[test]
fn pointer_leave_drops_throttled_move() {
    let mut config = test_config();
    config.performance.enable_throttle = true;
    let mut core = core_with(config, three_slots());

    core.on_pointer_move(EMPTY, no_modifiers());
    core.scheduler.advance(5.0);
    core.on_pointer_move(ON_A, no_modifiers());
    core.on_pointer_leave();
    assert_eq!(core.scheduler.pending_timers(), 0);
    assert!(advance(&mut core, 100.0).is_empty());
    assert!(core.ui.hover_id.is_none());
}

#[test]
fn selection_modifier_shows_crosshair() {
    let mut core = ready_core();
    let actions = core.on_pointer_move(EMPTY, ctrl_modifier());
    assert!(has_action(&actions, |a| *a == Action::SetCursor(Cursor::Crosshair)));
}

#[test]
fn headers_are_hoverable_but_not_clickable() {
    let mut slots = three_slots();
    slots.push(Slot::new("H", 30.0, 0.0).with_size(8.0, 8.0).header());
    let mut core = core_with(test_config(), slots);
    let header_pt = core.camera.world_to_screen(pt(34.0, 4.0));

    let actions = core.on_pointer_move(header_pt, no_modifiers());
    assert!(has_action(&actions, |a| matches!(a, Action::HoverChanged(Some(s)) if s.is_header)));

    press(&mut core, header_pt);
    assert_eq!(core.scheduler.pending_timers(), 0);
    assert!(advance(&mut core, 500.0).is_empty());
}

// =============================================================
// EngineCore: click and double-click
// =============================================================

#[test]
fn single_click_fires_after_window() {
    let mut core = ready_core();
    let actions = press(&mut core, ON_A);
    assert!(clicks(&actions).is_empty());

    assert!(clicks(&advance(&mut core, 249.0)).is_empty());
    let actions = advance(&mut core, 1.0);
    assert_eq!(clicks(&actions), vec!["A"]);
    assert_eq!(core.ui.selected_id, Some(SlotId::from("A")));
    assert_eq!(core.selected_slot().map(|s| s.id.clone()), Some(SlotId::from("A")));

    assert!(advance(&mut core, 1000.0).is_empty());
}

#[test]
fn double_click_suppresses_click() {
    let mut core = ready_core();
    let mut actions = press(&mut core, ON_A);
    actions.extend(advance(&mut core, 100.0));
    actions.extend(press(&mut core, ON_A));
    actions.extend(advance(&mut core, 1000.0));

    assert_eq!(double_clicks(&actions), 1);
    assert!(clicks(&actions).is_empty());
    assert_eq!(core.scheduler.pending_timers(), 0);
}

#[test]
fn press_on_other_slot_restarts_window() {
    let mut core = ready_core();
    let mut actions = press(&mut core, ON_A);
    actions.extend(advance(&mut core, 100.0));
    actions.extend(press(&mut core, ON_B));
    actions.extend(advance(&mut core, 1000.0));

    assert_eq!(clicks(&actions), vec!["B"]);
    assert_eq!(double_clicks(&actions), 0);
}

#[test]
fn removed_slot_produces_no_click() {
    let mut core = ready_core();
    press(&mut core, ON_A);
    core.set_slots(vec![Slot::new("B", 10.0, 0.0).with_size(8.0, 8.0)]);
    assert!(clicks(&advance(&mut core, 300.0)).is_empty());
    assert!(core.ui.selected_id.is_none());
}

// =============================================================
// EngineCore: pan
// =============================================================

#[test]
fn drag_on_empty_space_pans() {
    let mut core = ready_core();
    let actions = core.on_pointer_down(EMPTY, Button::Primary, no_modifiers());
    assert!(has_action(&actions, |a| *a == Action::SetCursor(Cursor::Grabbing)));
    assert!(matches!(core.input, InputState::Dragging { .. }));

    core.on_pointer_move(pt(15.0, 0.0), no_modifiers());
    core.on_pointer_move(pt(25.0, 10.0), no_modifiers());
    assert_eq!(core.offset(), pt(56.0, 51.0));

    let actions = core.on_pointer_up(pt(25.0, 10.0), Button::Primary, no_modifiers());
    assert!(has_action(&actions, |a| *a == Action::SetCursor(Cursor::Default)));
    assert_eq!(core.input, InputState::Idle);
}

#[test]
fn pan_disabled_leaves_offset() {
    let config = MapConfig { enable_pan: false, ..test_config() };
    let mut core = core_with(config, three_slots());
    core.on_pointer_down(EMPTY, Button::Primary, no_modifiers());
    core.on_pointer_move(pt(50.0, 50.0), no_modifiers());
    assert_eq!(core.offset(), pt(36.0, 46.0));
    assert_eq!(core.input, InputState::Idle);
}

#[test]
fn secondary_button_does_not_pan() {
    let mut core = ready_core();
    core.on_pointer_down(EMPTY, Button::Secondary, no_modifiers());
    assert_eq!(core.input, InputState::Idle);
}

#[test]
fn pointer_leave_ends_drag_and_hover() {
    let mut core = ready_core();
    core.on_pointer_move(ON_A, no_modifiers());
    core.on_pointer_down(EMPTY, Button::Primary, no_modifiers());
    let actions = core.on_pointer_leave();
    assert_eq!(core.input, InputState::Idle);
    assert!(core.ui.hover_id.is_none());
    assert!(has_action(&actions, |a| *a == Action::HoverChanged(None)));
}

// =============================================================
// EngineCore: marquee selection
// =============================================================

#[test]
fn marquee_selects_covered_slots() {
    let mut core = ready_core();
    let actions = core.on_pointer_down(EMPTY, Button::Primary, ctrl_modifier());
    assert_eq!(core.input, InputState::MarqueeSelecting);
    assert!(has_action(&actions, |a| *a == Action::SetCursor(Cursor::Crosshair)));

    let actions = core.on_pointer_move(pt(50.0, 60.0), ctrl_modifier());
    assert_eq!(last_selection(&actions), Some(vec!["A".to_string(), "B".to_string()]));

    let actions = core.on_pointer_move(pt(70.0, 60.0), ctrl_modifier());
    assert_eq!(last_selection(&actions), Some(vec!["A".to_string(), "B".to_string(), "C".to_string()]));

    core.on_pointer_up(pt(70.0, 60.0), Button::Primary, ctrl_modifier());
    assert_eq!(core.input, InputState::Idle);
    assert_eq!(core.selected_slots().len(), 3);
}

#[test]
fn marquee_ignores_moves_without_modifier() {
    let mut core = ready_core();
    core.on_pointer_down(EMPTY, Button::Primary, ctrl_modifier());
    let actions = core.on_pointer_move(pt(70.0, 60.0), no_modifiers());
    assert!(last_selection(&actions).is_none());
}

#[test]
fn tiny_marquee_release_clears_selection() {
    let mut core = ready_core();
    core.add_to_selection(&"A".into());
    core.on_pointer_down(EMPTY, Button::Primary, ctrl_modifier());
    core.on_pointer_move(pt(7.0, 7.0), ctrl_modifier());
    let actions = core.on_pointer_up(pt(7.0, 7.0), Button::Primary, ctrl_modifier());
    assert_eq!(last_selection(&actions), Some(Vec::new()));
    assert!(core.selection.is_empty());
}

#[test]
fn shift_ctrl_marquee_extends_selection() {
    let mut core = ready_core();
    core.add_to_selection(&"C".into());
    core.on_pointer_down(EMPTY, Button::Primary, ctrl_shift_modifier());
    let actions = core.on_pointer_move(pt(45.0, 60.0), ctrl_shift_modifier());
    assert_eq!(last_selection(&actions), Some(vec!["C".to_string(), "A".to_string()]));
}

#[test]
fn marquee_disabled_falls_back_to_pan() {
    let config = MapConfig { enable_selection: false, ..test_config() };
    let mut core = core_with(config, three_slots());
    core.on_pointer_down(EMPTY, Button::Primary, ctrl_modifier());
    assert!(matches!(core.input, InputState::Dragging { .. }));
}

#[test]
fn marching_ants_animate_while_selecting() {
    let mut core = ready_core();
    run_frames(&mut core);
    core.on_pointer_down(EMPTY, Button::Primary, ctrl_modifier());
    core.on_pointer_move(pt(70.0, 60.0), ctrl_modifier());

    assert_eq!(run_frames(&mut core), 1);
    assert_eq!(core.selection.dash_offset(), 0.0);
    assert_eq!(core.scheduler.pending_frames(), 1);

    core.scheduler.advance(16.0);
    assert_eq!(run_frames(&mut core), 1);
    assert_eq!(core.selection.dash_offset(), 1.5);

    core.scheduler.advance(5.0);
    assert_eq!(run_frames(&mut core), 0);

    core.on_pointer_up(pt(70.0, 60.0), Button::Primary, ctrl_modifier());
    run_frames(&mut core);
    assert_eq!(core.selection.dash_offset(), 0.0);
    assert_eq!(core.scheduler.pending_frames(), 0);
}

#[test]
fn second_press_during_marquee_ends_it() {
    let mut core = ready_core();
    run_frames(&mut core);
    core.on_pointer_down(EMPTY, Button::Primary, ctrl_modifier());
    core.on_pointer_move(pt(70.0, 60.0), ctrl_modifier());

    let actions = core.on_pointer_down(pt(80.0, 80.0), Button::Primary, no_modifiers());
    assert_eq!(core.input, InputState::Idle);
    assert!(!core.selection.is_selecting());
    assert!(core.selection.rect().is_none());
    assert!(last_selection(&actions).is_none());
    assert_eq!(core.selected_slots().len(), 3);

    core.on_pointer_up(pt(80.0, 80.0), Button::Primary, no_modifiers());
    for _ in 0..5 {
        core.scheduler.advance(16.0);
        run_frames(&mut core);
    }
    assert_eq!(core.scheduler.pending_frames(), 0);
}

#[test]
fn second_press_during_drag_does_not_start_another_gesture() {
    let mut core = ready_core();
    core.on_pointer_down(EMPTY, Button::Primary, no_modifiers());
    assert!(matches!(core.input, InputState::Dragging { .. }));

    let actions = core.on_pointer_down(ON_A, Button::Primary, no_modifiers());
    assert_eq!(core.input, InputState::Idle);
    assert!(has_action(&actions, |a| *a == Action::SetCursor(Cursor::Default)));
    assert_eq!(core.scheduler.pending_timers(), 0);

    press(&mut core, ON_A);
    assert_eq!(clicks(&advance(&mut core, 250.0)), vec!["A".to_string()]);
}

// =============================================================
// EngineCore: redraw scheduling
// =============================================================

#[test]
fn redraws_coalesce_into_one_frame() {
    let mut core = ready_core();
    core.on_pointer_move(ON_A, no_modifiers());
    core.on_pointer_move(EMPTY, no_modifiers());
    core.pan_by(1.0, 1.0);
    assert_eq!(core.scheduler.pending_frames(), 1);
    assert_eq!(run_frames(&mut core), 1);
    assert_eq!(core.scheduler.pending_frames(), 0);
}

#[test]
fn render_needed_without_frame_coalescing() {
    let mut config = test_config();
    config.performance.enable_raf_optimization = false;
    let mut core = core_with(config, three_slots());
    let actions = core.pan_by(1.0, 0.0);
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(core.scheduler.pending_frames(), 0);
}

#[test]
fn foreign_frame_is_ignored() {
    let mut core = ready_core();
    assert!(!core.on_frame(FrameId(9_999)));
}

// =============================================================
// EngineCore: context menu
// =============================================================

#[test]
fn context_menu_opens_on_slot() {
    let mut core = ready_core();
    let actions = core.on_context_menu(ON_A);
    assert!(has_action(&actions, |a| matches!(
        a,
        Action::ContextMenuRequested { slot, x, y } if slot.id == SlotId::from("A") && *x == 40.0 && *y == 50.0
    )));
    assert!(core.menu.is_some());
}

#[test]
fn context_menu_ignores_empty_space_and_headers() {
    let mut slots = three_slots();
    slots.push(Slot::new("H", 30.0, 0.0).with_size(8.0, 8.0).header());
    let mut core = core_with(test_config(), slots);
    assert!(core.on_context_menu(EMPTY).is_empty());
    let header_pt = core.camera.world_to_screen(pt(34.0, 4.0));
    assert!(core.on_context_menu(header_pt).is_empty());
    assert!(core.menu.is_none());
}

#[test]
fn context_menu_disabled() {
    let config = MapConfig { enable_context_menu: false, ..test_config() };
    let mut core = core_with(config, three_slots());
    assert!(core.on_context_menu(ON_A).is_empty());
}

#[test]
fn choosing_item_reports_slot_and_closes() {
    let mut core = ready_core();
    core.on_context_menu(ON_B);
    let actions = core.choose_menu_item("lock");
    assert_eq!(
        actions,
        vec![Action::MenuItemChosen {
            item: MenuItem::new("lock", "Lock"),
            slot: Slot::new("B", 10.0, 0.0).with_size(8.0, 8.0),
        }]
    );
    assert!(core.menu.is_none());
    assert!(core.choose_menu_item("lock").is_empty());
}

#[test]
fn unknown_item_keeps_menu_open() {
    let mut core = ready_core();
    core.on_context_menu(ON_A);
    assert!(core.choose_menu_item("nope").is_empty());
    assert!(core.menu.is_some());
    core.hide_context_menu();
    assert!(core.menu.is_none());
}

#[test]
fn placed_menu_flips_inside_viewport() {
    let mut core = ready_core();
    core.on_context_menu(pt(60.0, 50.0));
    let menu = core.place_context_menu(50.0, 60.0).cloned().unwrap();
    assert_eq!((menu.x, menu.y), (10.0, 30.0));
}

#[test]
fn pointer_down_closes_menu() {
    let mut core = ready_core();
    core.on_context_menu(ON_A);
    core.on_pointer_down(EMPTY, Button::Primary, no_modifiers());
    assert!(core.menu.is_none());
}

// =============================================================
// EngineCore: selection and batch operations
// =============================================================

#[test]
fn selection_operations_emit_changes() {
    let mut core = ready_core();
    let actions = core.toggle_selection(&"B".into());
    assert_eq!(last_selection(&actions), Some(vec!["B".to_string()]));
    let actions = core.add_to_selection(&"A".into());
    assert_eq!(last_selection(&actions), Some(vec!["B".to_string(), "A".to_string()]));
    let actions = core.remove_from_selection(&"B".into());
    assert_eq!(last_selection(&actions), Some(vec!["A".to_string()]));
    let actions = core.clear_selection();
    assert_eq!(last_selection(&actions), Some(Vec::new()));
}

#[test]
fn select_all_skips_headers() {
    let mut slots = three_slots();
    slots.push(Slot::new("H", 30.0, 0.0).header());
    let mut core = core_with(test_config(), slots);
    let actions = core.select_all();
    assert_eq!(last_selection(&actions).map(|ids| ids.len()), Some(3));
}

#[test]
fn delete_selected_emits_copy_without() {
    let mut core = ready_core();
    core.add_to_selection(&"A".into());
    core.add_to_selection(&"C".into());
    let actions = core.delete_selected();

    let remaining = positions(&actions).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, SlotId::from("B"));
    assert_eq!(last_selection(&actions), Some(Vec::new()));
    // The host owns the data; the engine's list is untouched until set_slots.
    assert_eq!(core.slots.len(), 3);
}

#[test]
fn batch_ops_noop_on_empty_selection() {
    let mut core = ready_core();
    assert!(core.delete_selected().is_empty());
    assert!(core.change_selected_color("#000").is_empty());
    assert!(core.change_selected_status("full").is_empty());
    assert!(core.change_selected_border_color("#000").is_empty());
}

#[test]
fn change_selected_edits_only_selection() {
    let mut core = ready_core();
    core.add_to_selection(&"B".into());

    let actions = core.change_selected_status("locked");
    let slots = positions(&actions).unwrap();
    assert_eq!(slots[1].status.as_deref(), Some("locked"));
    assert!(slots[0].status.is_none());
    assert_eq!(last_selection(&actions), Some(vec!["B".to_string()]));

    let actions = core.change_selected_color("#123456");
    assert_eq!(positions(&actions).unwrap()[1].color.as_deref(), Some("#123456"));

    let actions = core.change_selected_border_color("#654321");
    assert_eq!(positions(&actions).unwrap()[1].border_color.as_deref(), Some("#654321"));
}

// =============================================================
// EngineCore: business queries
// =============================================================

#[test]
fn set_status_unknown_id_is_empty() {
    let core = ready_core();
    assert!(core.set_status(&"Z".into(), "full").is_empty());
}

#[test]
fn set_status_emits_copy() {
    let core = ready_core();
    let actions = core.set_status(&"C".into(), "full");
    assert_eq!(positions(&actions).unwrap()[2].status.as_deref(), Some("full"));
    assert!(core.slot_by_id(&"C".into()).unwrap().status.is_none());
}

#[test]
fn batch_update_status_edits_listed_ids() {
    let core = ready_core();
    let actions = core.batch_update_status(&["A".into(), "B".into(), "Z".into()], "empty");
    let slots = positions(&actions).unwrap();
    assert_eq!(slots.iter().filter(|s| s.status.as_deref() == Some("empty")).count(), 2);
}

#[test]
fn update_slots_hands_list_back() {
    let core = ready_core();
    let actions = core.update_slots(three_slots());
    assert_eq!(positions(&actions).map(Vec::len), Some(3));
}

#[test]
fn queries_by_status_and_id() {
    let mut slots = three_slots();
    slots[0].status = Some("full".into());
    slots[2].status = Some("full".into());
    let core = core_with(test_config(), slots);
    assert_eq!(core.slots_by_status("full").len(), 2);
    assert!(core.slot_by_id(&"B".into()).is_some());
    assert!(core.slot_by_id(&"Z".into()).is_none());
}

#[test]
fn select_slot_sets_and_clears() {
    let mut core = ready_core();
    core.select_slot(Some("C".into()));
    assert_eq!(core.selected_slot().map(|s| s.x), Some(20.0));
    core.select_slot(None);
    assert!(core.selected_slot().is_none());
}

// =============================================================
// EngineCore: teardown
// =============================================================

#[test]
fn teardown_cancels_pending_work() {
    let mut core = ready_core();
    press(&mut core, ON_A);
    core.on_resize(200.0, 200.0, 1.0);
    core.on_pointer_down(EMPTY, Button::Primary, ctrl_modifier());
    core.teardown();

    assert_eq!(core.scheduler.pending_timers(), 0);
    assert_eq!(core.scheduler.pending_frames(), 0);
    assert_eq!(core.input, InputState::Idle);
    assert!(advance(&mut core, 1000.0).is_empty());
}

// =============================================================
// Engine: rendering through a surface
// =============================================================

fn mounted_engine(config: MapConfig, slots: Vec<Slot>) -> Engine<RecordingSurface> {
    let mut engine = Engine::new(config, ManualScheduler::new());
    engine.mount(RecordingSurface::new());
    engine.set_viewport(100.0, 100.0, 1.0);
    engine.set_slots(slots);
    engine
}

fn flush_frames(engine: &mut Engine<RecordingSurface>) {
    let frames = engine.core.scheduler.take_frames();
    for id in frames {
        engine.on_frame(id);
    }
}

#[test]
fn engine_renders_once_per_frame() {
    let mut engine = mounted_engine(test_config(), three_slots());
    flush_frames(&mut engine);
    let surface = engine.surface().unwrap();
    assert_eq!(surface.clear_count(), 1);
    assert_eq!(surface.texts(), vec!["A", "B", "C"]);
    assert_eq!(engine.core.stats.render_count, 1);
    assert_eq!(engine.core.stats.visible_slots, 3);
}

#[test]
fn engine_renders_immediately_without_coalescing() {
    let mut config = test_config();
    config.performance.enable_raf_optimization = false;
    let mut engine = mounted_engine(config, three_slots());
    let before = engine.surface().unwrap().clear_count();
    let actions = engine.on_pointer_move(ON_A, no_modifiers());
    assert!(!actions.contains(&Action::RenderNeeded));
    assert_eq!(engine.surface().unwrap().clear_count(), before + 1);
}

#[test]
fn engine_batch_edit_renders_without_coalescing() {
    let mut config = test_config();
    config.performance.enable_raf_optimization = false;
    let mut engine = mounted_engine(config, three_slots());

    let actions = engine.add_to_selection(&"B".into());
    assert!(!actions.contains(&Action::RenderNeeded));
    let before = engine.surface().unwrap().clear_count();

    let actions = engine.delete_selected();
    assert!(!actions.contains(&Action::RenderNeeded));
    let remaining: Vec<String> = positions(&actions).unwrap().iter().map(|s| s.id.to_string()).collect();
    assert_eq!(remaining, vec!["A".to_string(), "C".to_string()]);
    assert_eq!(engine.surface().unwrap().clear_count(), before + 1);

    engine.set_slots(positions(&actions).unwrap().clone());
    assert_eq!(engine.core.stats.visible_slots, 2);
}

#[test]
fn engine_viewport_ops_render_without_coalescing() {
    let mut config = test_config();
    config.performance.enable_raf_optimization = false;
    let mut engine = mounted_engine(config, three_slots());
    let before = engine.surface().unwrap().clear_count();
    assert!(engine.pan_by(10.0, 0.0).is_empty());
    assert_eq!(engine.core.offset(), pt(46.0, 46.0));
    assert_eq!(engine.surface().unwrap().clear_count(), before + 1);
}

#[test]
fn engine_culls_large_slot_sets() {
    let slots: Vec<Slot> = (0..150)
        .map(|i| Slot::new(i64::from(i), f64::from(i) * 1000.0, 0.0))
        .collect();
    let config = MapConfig { width: 100.0, height: 100.0, align: Anchor::LeftTop, ..test_config() };
    let mut engine = mounted_engine(config, slots);
    flush_frames(&mut engine);
    assert_eq!(engine.core.stats.total_slots, 150);
    assert_eq!(engine.core.stats.visible_slots, 1);
}

#[test]
fn unmounted_engine_is_silent() {
    let mut engine: Engine<RecordingSurface> = Engine::new(test_config(), ManualScheduler::new());
    engine.set_viewport(100.0, 100.0, 1.0);
    engine.set_slots(three_slots());
    flush_frames(&mut engine);
    assert!(engine.surface().is_none());
    assert_eq!(engine.core.stats.render_count, 0);
}

#[test]
fn unmount_returns_surface_and_tears_down() {
    let mut engine = mounted_engine(test_config(), three_slots());
    engine.on_pointer_down(ON_A, Button::Primary, no_modifiers());
    let surface = engine.unmount();
    assert!(surface.is_some());
    assert_eq!(engine.core.scheduler.pending_timers(), 0);
    assert!(engine.surface().is_none());
}

#[test]
fn engine_click_through_timer() {
    let mut engine = mounted_engine(test_config(), three_slots());
    engine.on_pointer_down(ON_B, Button::Primary, no_modifiers());
    engine.on_pointer_up(ON_B, Button::Primary, no_modifiers());
    let due = engine.core.scheduler.advance(250.0);
    let actions: Vec<Action> = due.into_iter().flat_map(|id| engine.on_timer(id)).collect();
    assert_eq!(clicks(&actions), vec!["B"]);
}

// =============================================================
// Action serialization
// =============================================================

#[test]
fn actions_serialize_with_type_tag() {
    let json = serde_json::to_value(Action::SetCursor(Cursor::Grabbing)).unwrap();
    assert_eq!(json, serde_json::json!({ "type": "setCursor", "payload": "grabbing" }));

    let json = serde_json::to_value(Action::SelectionChanged(vec!["A".into(), 7.into()])).unwrap();
    assert_eq!(json, serde_json::json!({ "type": "selectionChanged", "payload": ["A", 7] }));

    let json = serde_json::to_value(Action::RenderNeeded).unwrap();
    assert_eq!(json, serde_json::json!({ "type": "renderNeeded" }));
}
