//! Rendering and interaction engine for warehouse slot maps.
//!
//! The engine draws a 2D map of rectangular storage slots onto a Canvas2D-style
//! surface and turns raw pointer input into host-facing intents: hover, click,
//! double-click, context menu, marquee multi-selection, and drag-panning. The
//! host owns the slot data; the engine only reads it and hands back edited
//! copies as [`engine::Action::PositionsUpdated`].
//!
//! Scheduling is injected through [`schedule::Scheduler`], so every handler is
//! deterministic under [`schedule::ManualScheduler`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`slot`] | Slot record, ids, and the host-owned slot list |
//! | [`config`] | Host configuration and validation |
//! | [`camera`] | World/screen transform and screen rectangles |
//! | [`align`] | Bounding box, fit scale, and anchor alignment |
//! | [`hit`] | Layer-aware hit-testing |
//! | [`input`] | Pointer types, cursor, and the gesture state machine |
//! | [`selection`] | Marquee selection and the selected-id set |
//! | [`render`] | Scene rendering |
//! | [`surface`] | Drawing surface trait and a recording implementation |
//! | [`schedule`] | Frame/timer scheduling seam |
//! | [`perf`] | Culling, debounce, throttle, frame batching, stats |
//! | [`consts`] | Shared numeric constants |
//! | `web` | `CanvasRenderingContext2d` surface (feature `web`) |

pub mod align;
pub mod camera;
pub mod config;
pub mod consts;
pub mod engine;
pub mod hit;
pub mod input;
pub mod perf;
pub mod render;
pub mod schedule;
pub mod selection;
pub mod slot;
pub mod surface;
#[cfg(feature = "web")]
pub mod web;
