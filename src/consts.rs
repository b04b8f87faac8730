//! Shared numeric constants for the engine.

// ── Interaction ─────────────────────────────────────────────────

/// Window in which a second press on the same slot counts as a double-click.
pub const CLICK_DELAY_MS: f64 = 250.0;

// ── Selection ───────────────────────────────────────────────────

/// Marquees narrower or shorter than this on release select nothing.
pub const MIN_MARQUEE_PX: f64 = 5.0;

/// Marquees under this size are not drawn.
pub const MIN_DRAWN_MARQUEE_PX: f64 = 1.0;

/// Minimum wall time between marching-ants steps.
pub const DASH_STEP_INTERVAL_MS: f64 = 16.0;

/// Dash phase advance per step.
pub const DASH_STEP_PX: f64 = 1.5;

/// Dash plus gap length; the phase wraps here.
pub const DASH_CYCLE_PX: f64 = 12.0;

// ── Rendering ───────────────────────────────────────────────────

/// Drop-shadow offset for layered slots, in screen pixels.
pub const SHADOW_OFFSET_PX: f64 = 3.0;

/// Gap between a multi-selected slot and its outer highlight.
pub const HIGHLIGHT_GAP_PX: f64 = 2.0;

/// Label font size bounds.
pub const MIN_FONT_PX: f64 = 10.0;
pub const MAX_FONT_PX: f64 = 14.0;

/// Label line height bounds.
pub const MIN_LINE_HEIGHT_PX: f64 = 12.0;
pub const MAX_LINE_HEIGHT_PX: f64 = 16.0;

// ── Performance ─────────────────────────────────────────────────

/// Screen-space margin kept around the viewport when culling.
pub const CULL_BUFFER_PX: f64 = 200.0;

/// FPS meter window length.
pub const FPS_WINDOW_MS: f64 = 1000.0;

/// Default capacity of a `BoundedCache`.
pub const DEFAULT_CACHE_SIZE: usize = 100;

// ── Context menu ────────────────────────────────────────────────

/// Inset used when a flipped menu would still leave the container.
pub const MENU_EDGE_INSET_PX: f64 = 10.0;
