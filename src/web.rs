//! Browser backend: [`Surface`] over `CanvasRenderingContext2d`.
//!
//! Only compiled with the `web` feature. The host JavaScript layer creates the
//! canvas element, wires DOM events to the engine, and drives the scheduler;
//! this module covers the drawing calls and backing-store sizing.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::surface::{Surface, SurfaceError};

fn backend(e: &JsValue) -> SurfaceError {
    SurfaceError::Backend(format!("{e:?}"))
}

/// Fetch the 2D context of a canvas element.
///
/// # Errors
///
/// Returns `Err` if the browser refuses the context or returns a different type.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, SurfaceError> {
    canvas
        .get_context("2d")
        .map_err(|e| backend(&e))?
        .ok_or_else(|| SurfaceError::Backend("2d context unavailable".to_owned()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|e| backend(&e))
}

/// Size the backing store to `css * dpr` device pixels.
///
/// The renderer applies the matching `dpr` transform at the start of each frame.
pub fn size_backing_store(canvas: &HtmlCanvasElement, width_css: f64, height_css: f64, dpr: f64) {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (w, h) = ((width_css * dpr).round().max(0.0) as u32, (height_css * dpr).round().max(0.0) as u32);
    canvas.set_width(w);
    canvas.set_height(h);
}

impl Surface for CanvasRenderingContext2d {
    fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Result<(), SurfaceError> {
        CanvasRenderingContext2d::set_transform(self, a, b, c, d, e, f).map_err(|e| backend(&e))
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::clear_rect(self, x, y, w, h);
    }

    fn save(&mut self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&mut self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn set_fill_style(&mut self, color: &str) {
        self.set_fill_style_str(color);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.set_stroke_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        CanvasRenderingContext2d::set_line_width(self, width);
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), SurfaceError> {
        let dash = js_sys::Array::new();
        for &segment in segments {
            dash.push(&segment.into());
        }
        CanvasRenderingContext2d::set_line_dash(self, &dash).map_err(|e| backend(&e))
    }

    fn set_line_dash_offset(&mut self, offset: f64) {
        CanvasRenderingContext2d::set_line_dash_offset(self, offset);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::stroke_rect(self, x, y, w, h);
    }

    fn begin_path(&mut self) {
        CanvasRenderingContext2d::begin_path(self);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        CanvasRenderingContext2d::move_to(self, x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        CanvasRenderingContext2d::line_to(self, x, y);
    }

    fn stroke(&mut self) {
        CanvasRenderingContext2d::stroke(self);
    }

    fn set_font(&mut self, font: &str) {
        CanvasRenderingContext2d::set_font(self, font);
    }

    fn set_text_align(&mut self, align: &str) {
        CanvasRenderingContext2d::set_text_align(self, align);
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        CanvasRenderingContext2d::set_text_baseline(self, baseline);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError> {
        CanvasRenderingContext2d::fill_text(self, text, x, y).map_err(|e| backend(&e))
    }
}
