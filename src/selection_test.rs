#![allow(clippy::float_cmp)]

use super::*;

fn geometry() -> SlotGeometry {
    SlotGeometry { default_w: 10.0, default_h: 10.0, layer_z_offset: 6.0 }
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn row() -> Vec<Slot> {
    vec![
        Slot::new("A", 0.0, 0.0),
        Slot::new("B", 20.0, 0.0),
        Slot::new("C", 40.0, 0.0),
        Slot::new("H", 60.0, 0.0).header(),
    ]
}

fn ids(list: &[SlotId]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

fn drag(sel: &mut SelectionState, slots: &[Slot], from: Point, to: Point) -> Option<Vec<SlotId>> {
    sel.start(from, false, 0.0);
    sel.update(to, slots, &Camera::default(), &geometry())
}

// =============================================================
// Marquee
// =============================================================

#[test]
fn marquee_selects_intersecting_slots() {
    let mut sel = SelectionState::new();
    let got = drag(&mut sel, &row(), pt(-5.0, -5.0), pt(25.0, 5.0)).unwrap();
    assert_eq!(ids(&got), vec!["A", "B"]);
}

#[test]
fn marquee_skips_headers() {
    let mut sel = SelectionState::new();
    let got = drag(&mut sel, &row(), pt(-5.0, -5.0), pt(100.0, 20.0)).unwrap();
    assert_eq!(ids(&got), vec!["A", "B", "C"]);
}

#[test]
fn marquee_recomputes_when_shrinking() {
    let slots = row();
    let mut sel = SelectionState::new();
    drag(&mut sel, &slots, pt(-5.0, -5.0), pt(45.0, 5.0));
    let got = sel.update(pt(15.0, 5.0), &slots, &Camera::default(), &geometry()).unwrap();
    assert_eq!(ids(&got), vec!["A"]);
}

#[test]
fn marquee_dragged_backwards_normalizes() {
    let mut sel = SelectionState::new();
    let got = drag(&mut sel, &row(), pt(45.0, 15.0), pt(35.0, -5.0)).unwrap();
    assert_eq!(ids(&got), vec!["C"]);
}

#[test]
fn small_marquee_mid_drag_keeps_previous_result() {
    let slots = row();
    let mut sel = SelectionState::new();
    drag(&mut sel, &slots, pt(-5.0, -5.0), pt(25.0, 5.0));
    assert!(sel.update(pt(-3.0, -3.0), &slots, &Camera::default(), &geometry()).is_none());
    assert_eq!(ids(sel.ids()), vec!["A", "B"]);
}

#[test]
fn small_marquee_on_release_clears() {
    let slots = row();
    let mut sel = SelectionState::new();
    sel.add(&"C".into());
    sel.start(pt(5.0, 5.0), false, 0.0);
    sel.update(pt(7.0, 7.0), &slots, &Camera::default(), &geometry());
    assert_eq!(sel.end(), Some(Vec::new()));
    assert!(sel.is_empty());
    assert!(!sel.is_selecting());
}

#[test]
fn normal_release_keeps_selection() {
    let slots = row();
    let mut sel = SelectionState::new();
    drag(&mut sel, &slots, pt(-5.0, -5.0), pt(5.0, 5.0));
    assert_eq!(sel.end(), None);
    assert_eq!(ids(sel.ids()), vec!["A"]);
    assert!(sel.rect().is_none());
}

#[test]
fn extend_keeps_existing_selection() {
    let slots = row();
    let mut sel = SelectionState::new();
    sel.add(&"C".into());
    sel.start(pt(-5.0, -5.0), true, 0.0);
    let got = sel.update(pt(5.0, 5.0), &slots, &Camera::default(), &geometry()).unwrap();
    assert_eq!(ids(&got), vec!["C", "A"]);
}

#[test]
fn without_extend_existing_selection_is_replaced() {
    let slots = row();
    let mut sel = SelectionState::new();
    sel.add(&"C".into());
    let got = drag(&mut sel, &slots, pt(-5.0, -5.0), pt(5.0, 5.0)).unwrap();
    assert_eq!(ids(&got), vec!["A"]);
}

#[test]
fn layered_slot_is_tested_at_shifted_position() {
    let slots = vec![Slot::new("Z", 0.0, 0.0).with_z(5)];
    let mut sel = SelectionState::new();
    assert!(drag(&mut sel, &slots, pt(0.0, 0.0), pt(9.0, 9.0)).unwrap().is_empty());
    let got = drag(&mut sel, &slots, pt(30.0, -30.0), pt(35.0, -25.0)).unwrap();
    assert_eq!(ids(&got), vec!["Z"]);
}

#[test]
fn update_without_start_is_ignored() {
    let mut sel = SelectionState::new();
    assert!(sel.update(pt(50.0, 50.0), &row(), &Camera::default(), &geometry()).is_none());
}

// =============================================================
// Marching ants
// =============================================================

#[test]
fn dash_steps_only_after_interval() {
    let mut sel = SelectionState::new();
    sel.start(pt(0.0, 0.0), false, 0.0);
    assert!(!sel.advance_dash(10.0));
    assert!(sel.advance_dash(16.0));
    assert_eq!(sel.dash_offset(), 1.5);
}

#[test]
fn dash_wraps_at_cycle() {
    let mut sel = SelectionState::new();
    sel.start(pt(0.0, 0.0), false, 0.0);
    for i in 1..=7 {
        sel.advance_dash(f64::from(i) * 16.0);
    }
    assert_eq!(sel.dash_offset(), 10.5);
    sel.advance_dash(8.0 * 16.0);
    assert_eq!(sel.dash_offset(), 0.0);
}

#[test]
fn dash_resets_when_idle() {
    let mut sel = SelectionState::new();
    sel.start(pt(0.0, 0.0), false, 0.0);
    sel.advance_dash(20.0);
    sel.end();
    assert!(!sel.advance_dash(100.0));
    assert_eq!(sel.dash_offset(), 0.0);
}

// =============================================================
// Set operations
// =============================================================

#[test]
fn add_remove_toggle() {
    let mut sel = SelectionState::new();
    let a: SlotId = "A".into();
    assert!(sel.add(&a));
    assert!(!sel.add(&a));
    assert!(!sel.toggle(&a));
    assert!(!sel.contains(&a));
    assert!(sel.toggle(&a));
    assert!(sel.remove(&a));
    assert!(!sel.remove(&a));
}

#[test]
fn select_all_skips_headers() {
    let mut sel = SelectionState::new();
    sel.select_all(&row());
    assert_eq!(ids(sel.ids()), vec!["A", "B", "C"]);
}

#[test]
fn selected_slots_follow_host_order_and_skip_stale() {
    let mut sel = SelectionState::new();
    sel.add(&"C".into());
    sel.add(&"gone".into());
    sel.add(&"A".into());
    let slots = row();
    let picked: Vec<String> = sel.selected_slots(&slots).iter().map(|s| s.id.to_string()).collect();
    assert_eq!(picked, vec!["A", "C"]);
}

#[test]
fn clear_abandons_marquee() {
    let mut sel = SelectionState::new();
    sel.add(&"A".into());
    sel.start(pt(0.0, 0.0), true, 0.0);
    sel.clear();
    assert!(sel.is_empty());
    assert!(!sel.is_selecting());
    assert!(sel.rect().is_none());
}
