//! SVG backend for headless rendering.
//!
//! Each drawing call becomes one SVG element; `save`/`restore` snapshot the
//! style state the same way a Canvas2D context does. A full-surface
//! `clear_rect` starts a new frame.

#[cfg(test)]
#[path = "svg_test.rs"]
mod svg_test;

use warehouse_map::surface::{Surface, SurfaceError};

#[derive(Debug, Clone)]
struct DrawState {
    transform: [f64; 6],
    fill: String,
    stroke: String,
    line_width: f64,
    dash: Vec<f64>,
    dash_offset: f64,
    font: String,
    text_align: String,
    text_baseline: String,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            fill: "#000000".to_owned(),
            stroke: "#000000".to_owned(),
            line_width: 1.0,
            dash: Vec::new(),
            dash_offset: 0.0,
            font: "10px sans-serif".to_owned(),
            text_align: "start".to_owned(),
            text_baseline: "alphabetic".to_owned(),
        }
    }
}

/// Surface that accumulates SVG markup.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    background: String,
    elements: Vec<String>,
    state: DrawState,
    stack: Vec<DrawState>,
    path: String,
}

impl SvgSurface {
    #[must_use]
    pub fn new(width: f64, height: f64, background: &str) -> Self {
        Self {
            width,
            height,
            background: background.to_owned(),
            elements: Vec::new(),
            state: DrawState::default(),
            stack: Vec::new(),
            path: String::new(),
        }
    }

    /// Number of elements drawn since the last full clear.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// The complete SVG document.
    #[must_use]
    pub fn finish(&self) -> String {
        let mut out = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        );
        out.push('\n');
        out.push_str(&format!(
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            self.width,
            self.height,
            escape(&self.background)
        ));
        out.push('\n');
        for element in &self.elements {
            out.push_str(element);
            out.push('\n');
        }
        out.push_str("</svg>\n");
        out
    }

    fn transform_attr(&self) -> String {
        let [a, b, c, d, e, f] = self.state.transform;
        if [a, b, c, d, e, f] == [1.0, 0.0, 0.0, 1.0, 0.0, 0.0] {
            String::new()
        } else {
            format!(r#" transform="matrix({a} {b} {c} {d} {e} {f})""#)
        }
    }

    fn stroke_attrs(&self) -> String {
        let mut attrs = format!(
            r#" stroke="{}" stroke-width="{}""#,
            escape(&self.state.stroke),
            self.state.line_width
        );
        if !self.state.dash.is_empty() {
            let dash: Vec<String> = self.state.dash.iter().map(ToString::to_string).collect();
            attrs.push_str(&format!(
                r#" stroke-dasharray="{}" stroke-dashoffset="{}""#,
                dash.join(" "),
                self.state.dash_offset
            ));
        }
        attrs
    }

    fn covers_surface(&self, x: f64, y: f64, w: f64, h: f64) -> bool {
        x <= 0.0 && y <= 0.0 && x + w >= self.width && y + h >= self.height
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn text_anchor(align: &str) -> &'static str {
    match align {
        "center" => "middle",
        "right" | "end" => "end",
        _ => "start",
    }
}

impl Surface for SvgSurface {
    fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Result<(), SurfaceError> {
        let matrix = [a, b, c, d, e, f];
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(SurfaceError::Backend(format!("non-finite transform {matrix:?}")));
        }
        self.state.transform = matrix;
        Ok(())
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        if self.covers_surface(x, y, w, h) {
            self.elements.clear();
        } else {
            self.elements.push(format!(
                r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" fill="{}"{}/>"#,
                escape(&self.background),
                self.transform_attr()
            ));
        }
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn set_fill_style(&mut self, color: &str) {
        color.clone_into(&mut self.state.fill);
    }

    fn set_stroke_style(&mut self, color: &str) {
        color.clone_into(&mut self.state.stroke);
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), SurfaceError> {
        if segments.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(SurfaceError::Backend(format!("invalid dash pattern {segments:?}")));
        }
        self.state.dash = segments.to_vec();
        Ok(())
    }

    fn set_line_dash_offset(&mut self, offset: f64) {
        self.state.dash_offset = offset;
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.elements.push(format!(
            r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" fill="{}"{}/>"#,
            escape(&self.state.fill),
            self.transform_attr()
        ));
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.elements.push(format!(
            r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" fill="none"{}{}/>"#,
            self.stroke_attrs(),
            self.transform_attr()
        ));
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.push_str(&format!("M{x} {y} "));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path.push_str(&format!("L{x} {y} "));
    }

    fn stroke(&mut self) {
        if self.path.is_empty() {
            return;
        }
        self.elements.push(format!(
            r#"<path d="{}" fill="none"{}{}/>"#,
            self.path.trim_end(),
            self.stroke_attrs(),
            self.transform_attr()
        ));
    }

    fn set_font(&mut self, font: &str) {
        font.clone_into(&mut self.state.font);
    }

    fn set_text_align(&mut self, align: &str) {
        align.clone_into(&mut self.state.text_align);
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        baseline.clone_into(&mut self.state.text_baseline);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(SurfaceError::Backend(format!("non-finite text position ({x}, {y})")));
        }
        self.elements.push(format!(
            r#"<text x="{x}" y="{y}" fill="{}" style="font: {}" text-anchor="{}" dominant-baseline="{}"{}>{}</text>"#,
            escape(&self.state.fill),
            escape(&self.state.font),
            text_anchor(&self.state.text_align),
            escape(&self.state.text_baseline),
            self.transform_attr(),
            escape(text)
        ));
        Ok(())
    }
}
