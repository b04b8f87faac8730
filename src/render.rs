//! Rendering: draws the full slot map to a [`Surface`].
//!
//! This module is the only place that issues drawing commands. It receives a
//! read-only [`Frame`] describing slots, view state, and selection, and
//! produces pixels; it does not mutate any engine state.
//!
//! Layer order per frame: clear, grid, slots (with hover and selection
//! decorations inline), legend, and the marquee last so it is always on top.
//!
//! All fallible surface calls propagate errors via `Result<(), SurfaceError>`.
//! The top-level caller ([`crate::engine::Engine::on_frame`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::{Camera, ScreenRect};
use crate::config::MapConfig;
use crate::consts::{
    HIGHLIGHT_GAP_PX, MAX_FONT_PX, MAX_LINE_HEIGHT_PX, MIN_DRAWN_MARQUEE_PX, MIN_FONT_PX, MIN_LINE_HEIGHT_PX,
    SHADOW_OFFSET_PX,
};
use crate::hit::SlotGeometry;
use crate::input::UiState;
use crate::selection::SelectionState;
use crate::slot::Slot;
use crate::surface::{Surface, SurfaceError};

/// Accent used for multi-selection strokes and the marquee.
const SELECTION_ACCENT: &str = "#2196F3";
const SELECTION_HALO: &str = "rgba(33, 150, 243, 0.3)";
const SELECTION_HALO_WIDTH: f64 = 6.0;
const SHADOW_COLOR: &str = "rgba(0,0,0,0.06)";
const GRID_COLOR: &str = "#f0f0f0";
const GRID_LINE_WIDTH: f64 = 0.5;

const MARQUEE_FILL: &str = "rgba(33, 150, 243, 0.08)";
const MARQUEE_INNER: &str = "rgba(33, 150, 243, 0.5)";
const MARQUEE_OUTER_DASH: [f64; 2] = [8.0, 4.0];
const MARQUEE_INNER_DASH: [f64; 2] = [4.0, 4.0];
const MARQUEE_CORNER_PX: f64 = 6.0;
const MARQUEE_CORNER_THICKNESS_PX: f64 = 2.0;

const LEGEND_MARGIN_PX: f64 = 10.0;
const LEGEND_ROW_PX: f64 = 20.0;
const LEGEND_SWATCH_PX: f64 = 12.0;
const LEGEND_PANEL: &str = "rgba(255, 255, 255, 0.85)";

/// Everything one render pass reads.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Slots to draw, already culled.
    pub slots: &'a [&'a Slot],
    pub config: &'a MapConfig,
    pub camera: &'a Camera,
    pub ui: &'a UiState,
    pub selection: &'a SelectionState,
    /// Viewport size in CSS pixels.
    pub viewport_w: f64,
    pub viewport_h: f64,
    /// Device pixel ratio applied to the backing store.
    pub dpr: f64,
}

impl Frame<'_> {
    fn geometry(&self) -> SlotGeometry {
        SlotGeometry {
            default_w: self.config.default_w,
            default_h: self.config.default_h,
            layer_z_offset: self.config.layer_z_offset,
        }
    }
}

/// Draw the full scene.
///
/// # Errors
///
/// Returns `Err` if any fallible surface call fails.
pub fn draw<S: Surface + ?Sized>(surface: &mut S, frame: &Frame<'_>) -> Result<(), SurfaceError> {
    // Layer 1: clear in CSS pixels.
    surface.set_transform(frame.dpr, 0.0, 0.0, frame.dpr, 0.0, 0.0)?;
    surface.clear_rect(0.0, 0.0, frame.viewport_w, frame.viewport_h);

    // Layer 2: grid.
    if frame.config.show_grid {
        draw_grid(surface, frame);
    }

    // Layer 3: slots.
    let geometry = frame.geometry();
    surface.save();
    for slot in frame.slots {
        let rect = geometry.screen_rect(frame.camera, slot);
        draw_slot(surface, frame, slot, rect)?;
    }
    surface.restore();

    // Layer 4: legend.
    if frame.config.show_legend {
        draw_legend(surface, frame.config)?;
    }

    // Layer 5: marquee.
    if let Some(rect) = frame.selection.rect() {
        draw_marquee(surface, rect, frame.selection.dash_offset())?;
    }

    Ok(())
}

// =============================================================
// Grid
// =============================================================

fn draw_grid<S: Surface + ?Sized>(surface: &mut S, frame: &Frame<'_>) {
    let step_x = frame.config.grid_step * frame.camera.scale_x;
    let step_y = frame.config.grid_step * frame.camera.scale_y;
    if step_x <= 0.0 || step_y <= 0.0 {
        return;
    }

    surface.save();
    surface.begin_path();
    surface.set_line_width(GRID_LINE_WIDTH);
    surface.set_stroke_style(GRID_COLOR);

    let mut x = 0.0;
    while x <= frame.viewport_w {
        surface.move_to(x + 0.5, 0.0);
        surface.line_to(x + 0.5, frame.viewport_h);
        x += step_x;
    }
    let mut y = 0.0;
    while y <= frame.viewport_h {
        surface.move_to(0.0, y + 0.5);
        surface.line_to(frame.viewport_w, y + 0.5);
        y += step_y;
    }

    surface.stroke();
    surface.restore();
}

// =============================================================
// Slots
// =============================================================

/// Border width by priority: multi-selected, click-selected, explicit border, plain.
#[must_use]
pub fn border_width(multi_selected: bool, click_selected: bool, has_border_override: bool) -> f64 {
    if multi_selected {
        3.0
    } else if click_selected {
        2.5
    } else if has_border_override {
        2.0
    } else {
        1.0
    }
}

fn draw_slot<S: Surface + ?Sized>(
    surface: &mut S,
    frame: &Frame<'_>,
    slot: &Slot,
    rect: ScreenRect,
) -> Result<(), SurfaceError> {
    let config = frame.config;
    let ScreenRect { x, y, w, h } = rect;

    let fill = config.fill_for(slot.color.as_deref(), slot.status.as_deref());
    let hovered = frame.ui.hover_id.as_ref() == Some(&slot.id);
    let own_border = slot.border_color.as_deref().filter(|c| !c.is_empty());
    let border =
        own_border.unwrap_or(if hovered { config.border_hover_color.as_str() } else { config.border_color.as_str() });
    let text_color = slot
        .text_color
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(config.text_color.as_str());

    let multi_selected = frame.selection.contains(&slot.id);
    let click_selected = frame.ui.selected_id.as_ref() == Some(&slot.id);

    surface.save();

    // Elevation hint for layered slots.
    if slot.layer() != 0 {
        surface.set_fill_style(SHADOW_COLOR);
        surface.fill_rect(x + SHADOW_OFFSET_PX, y + SHADOW_OFFSET_PX, w, h);
    }

    surface.set_fill_style(fill);
    surface.fill_rect(x, y, w, h);

    surface.set_line_width(border_width(multi_selected, click_selected, own_border.is_some()));
    surface.set_stroke_style(if multi_selected { SELECTION_ACCENT } else { border });
    surface.stroke_rect(x + 0.5, y + 0.5, w - 1.0, h - 1.0);

    if multi_selected {
        surface.save();
        surface.set_stroke_style(SELECTION_HALO);
        surface.set_line_width(SELECTION_HALO_WIDTH);
        surface.stroke_rect(
            x - HIGHLIGHT_GAP_PX,
            y - HIGHLIGHT_GAP_PX,
            w + HIGHLIGHT_GAP_PX * 2.0,
            h + HIGHLIGHT_GAP_PX * 2.0,
        );
        surface.restore();
    }

    draw_label(surface, slot, rect, text_color)?;

    surface.restore();
    Ok(())
}

// =============================================================
// Text
// =============================================================

/// Layout of a multi-line label inside a slot of height `h` at `y`.
///
/// Returns the font size and the baseline y of every line, the block
/// vertically centered on the slot.
#[must_use]
pub fn label_layout(y: f64, h: f64, line_count: usize) -> (f64, Vec<f64>) {
    let font_size = (h / 6.0).clamp(MIN_FONT_PX, MAX_FONT_PX);
    let line_height = (h / 5.0).clamp(MIN_LINE_HEIGHT_PX, MAX_LINE_HEIGHT_PX);
    #[allow(clippy::cast_precision_loss)]
    let total_height = line_count as f64 * line_height;
    let start_y = y + h / 2.0 - total_height / 2.0 + line_height / 2.0;
    #[allow(clippy::cast_precision_loss)]
    let baselines = (0..line_count).map(|i| start_y + i as f64 * line_height).collect();
    (font_size, baselines)
}

fn draw_label<S: Surface + ?Sized>(
    surface: &mut S,
    slot: &Slot,
    rect: ScreenRect,
    color: &str,
) -> Result<(), SurfaceError> {
    let text = slot.display_label();
    let lines: Vec<&str> = text.split('\n').collect();
    let (font_size, baselines) = label_layout(rect.y, rect.h, lines.len());

    surface.set_fill_style(color);
    surface.set_font(&format!("{font_size}px sans-serif"));
    surface.set_text_baseline("middle");
    surface.set_text_align("center");

    let center_x = rect.x + rect.w / 2.0;
    for (line, baseline) in lines.iter().zip(baselines) {
        surface.fill_text(line, center_x, baseline)?;
    }
    Ok(())
}

// =============================================================
// Legend
// =============================================================

fn draw_legend<S: Surface + ?Sized>(surface: &mut S, config: &MapConfig) -> Result<(), SurfaceError> {
    let entries = config.legend_entries();
    if entries.is_empty() {
        return Ok(());
    }

    surface.save();
    #[allow(clippy::cast_precision_loss)]
    let panel_h = entries.len() as f64 * LEGEND_ROW_PX + LEGEND_MARGIN_PX;
    surface.set_fill_style(LEGEND_PANEL);
    surface.fill_rect(LEGEND_MARGIN_PX / 2.0, LEGEND_MARGIN_PX / 2.0, 120.0, panel_h);

    surface.set_font("12px sans-serif");
    surface.set_text_align("left");
    surface.set_text_baseline("middle");
    surface.set_line_width(1.0);
    surface.set_stroke_style(&config.border_color);

    for (i, (status, color)) in entries.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let top = LEGEND_MARGIN_PX + i as f64 * LEGEND_ROW_PX;
        surface.set_fill_style(color);
        surface.fill_rect(LEGEND_MARGIN_PX, top, LEGEND_SWATCH_PX, LEGEND_SWATCH_PX);
        surface.stroke_rect(LEGEND_MARGIN_PX, top, LEGEND_SWATCH_PX, LEGEND_SWATCH_PX);
        surface.set_fill_style(&config.text_color);
        surface.fill_text(
            status,
            LEGEND_MARGIN_PX + LEGEND_SWATCH_PX + 6.0,
            top + LEGEND_SWATCH_PX / 2.0,
        )?;
    }

    surface.restore();
    Ok(())
}

// =============================================================
// Marquee
// =============================================================

fn draw_marquee<S: Surface + ?Sized>(surface: &mut S, rect: ScreenRect, dash_offset: f64) -> Result<(), SurfaceError> {
    if rect.w < MIN_DRAWN_MARQUEE_PX || rect.h < MIN_DRAWN_MARQUEE_PX {
        return Ok(());
    }
    let ScreenRect { x, y, w, h } = rect;

    surface.save();

    surface.set_fill_style(MARQUEE_FILL);
    surface.fill_rect(x, y, w, h);

    // Outer marching-ants border.
    surface.set_stroke_style(SELECTION_ACCENT);
    surface.set_line_width(1.0);
    surface.set_line_dash(&MARQUEE_OUTER_DASH)?;
    surface.set_line_dash_offset(dash_offset);
    surface.stroke_rect(x + 0.5, y + 0.5, w - 1.0, h - 1.0);

    // Inner border.
    surface.set_stroke_style(MARQUEE_INNER);
    surface.set_line_dash(&MARQUEE_INNER_DASH)?;
    surface.stroke_rect(x + 2.0, y + 2.0, w - 4.0, h - 4.0);

    // Solid corner marks.
    surface.set_line_dash(&[])?;
    surface.set_fill_style(SELECTION_ACCENT);
    let c = MARQUEE_CORNER_PX;
    let t = MARQUEE_CORNER_THICKNESS_PX;
    for (cx, cy, horizontal_x, vertical_y) in [
        (x, y, x, y),
        (x + w, y, x + w - c, y),
        (x, y + h, x, y + h - c),
        (x + w, y + h, x + w - c, y + h - c),
    ] {
        let bar_y = if cy > y { cy - t } else { cy };
        let bar_x = if cx > x { cx - t } else { cx };
        surface.fill_rect(horizontal_x, bar_y, c, t);
        surface.fill_rect(bar_x, vertical_y, t, c);
    }

    surface.restore();
    Ok(())
}
