//! End-to-end host flows through the public API: JSON in, intents out.
#![allow(clippy::float_cmp)]

use warehouse_map::camera::Point;
use warehouse_map::config::MapConfig;
use warehouse_map::engine::{Action, Engine};
use warehouse_map::input::{Button, Modifiers};
use warehouse_map::schedule::ManualScheduler;
use warehouse_map::slot::{Slot, SlotId};
use warehouse_map::surface::RecordingSurface;

const CONFIG: &str = r##"{
    "width": 100,
    "height": 100,
    "statusColors": {"full": "#f56c6c", "empty": "#67c23a"},
    "showLegend": true,
    "performance": {"enableThrottle": false}
}"##;

const SLOTS: &str = r#"[
    {"id": "A", "x": 0, "y": 0, "w": 8, "h": 8, "status": "full"},
    {"id": "B", "x": 10, "y": 0, "w": 8, "h": 8},
    {"id": 3, "x": 20, "y": 0, "w": 8, "h": 8, "status": "empty"}
]"#;

fn host() -> Engine<RecordingSurface> {
    let config = MapConfig::from_json(CONFIG).unwrap();
    let slots: Vec<Slot> = serde_json::from_str(SLOTS).unwrap();
    let mut engine = Engine::new(config, ManualScheduler::new());
    engine.mount(RecordingSurface::new());
    engine.set_viewport(100.0, 100.0, 1.0);
    engine.set_slots(slots);
    engine
}

fn tick(engine: &mut Engine<RecordingSurface>, ms: f64) -> Vec<Action> {
    let due = engine.core.scheduler.advance(ms);
    let mut actions: Vec<Action> = due.into_iter().flat_map(|id| engine.on_timer(id)).collect();
    for frame in engine.core.scheduler.take_frames() {
        engine.on_frame(frame);
    }
    actions.retain(|a| *a != Action::RenderNeeded);
    actions
}

fn tap(engine: &mut Engine<RecordingSurface>, x: f64, y: f64) {
    let p = Point::new(x, y);
    engine.on_pointer_down(p, Button::Primary, Modifiers::default());
    engine.on_pointer_up(p, Button::Primary, Modifiers::default());
}

#[test]
fn mount_aligns_and_draws_labels_and_legend() {
    let mut engine = host();
    tick(&mut engine, 0.0);

    let offset = engine.core.offset();
    assert_eq!((offset.x, offset.y), (36.0, 46.0));

    let surface = engine.surface().unwrap();
    assert_eq!(surface.texts(), vec!["A", "B", "3", "empty", "full"]);
}

#[test]
fn single_click_after_window() {
    let mut engine = host();
    tap(&mut engine, 40.0, 50.0);
    let actions = tick(&mut engine, 250.0);
    assert_eq!(actions.len(), 1);
    assert!(matches!(&actions[0], Action::Click(slot) if slot.id == SlotId::from("A")));
    assert_eq!(engine.core.ui.selected_id, Some(SlotId::from("A")));
}

#[test]
fn double_click_instead_of_click() {
    let mut engine = host();
    tap(&mut engine, 40.0, 50.0);
    let mut actions = tick(&mut engine, 100.0);
    actions.extend(engine.on_pointer_down(Point::new(41.0, 51.0), Button::Primary, Modifiers::default()));
    actions.extend(tick(&mut engine, 400.0));

    assert_eq!(actions.iter().filter(|a| matches!(a, Action::DoubleClick(_))).count(), 1);
    assert!(!actions.iter().any(|a| matches!(a, Action::Click(_))));
}

#[test]
fn integer_ids_round_trip_through_intents() {
    let mut engine = host();
    engine.core.add_to_selection(&SlotId::from(3));
    let actions = engine.core.change_selected_status("full");
    let Some(Action::PositionsUpdated(slots)) = actions.first() else {
        panic!("expected PositionsUpdated, got {actions:?}");
    };
    let json = serde_json::to_value(slots).unwrap();
    assert_eq!(json[2]["id"], 3);
    assert_eq!(json[2]["status"], "full");
}
