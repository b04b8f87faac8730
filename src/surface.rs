//! Drawing surface abstraction.
//!
//! [`Surface`] is the Canvas2D-shaped command set the renderer draws through.
//! Calls that can fail on a real backend return `Result`; the rest mirror the
//! infallible setters of the browser API. [`RecordingSurface`] keeps every
//! command in order so tests and headless tools can inspect a frame.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

/// Failure reported by a drawing backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("surface backend error: {0}")]
    Backend(String),
}

/// A 2D drawing target with Canvas2D semantics.
pub trait Surface {
    /// Replace the current transform matrix.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backend rejects the matrix.
    fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Result<(), SurfaceError>;
    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn save(&mut self);
    fn restore(&mut self);
    fn set_fill_style(&mut self, color: &str);
    fn set_stroke_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    /// Set the dash pattern; an empty slice draws solid lines.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backend rejects the pattern.
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), SurfaceError>;
    fn set_line_dash_offset(&mut self, offset: f64);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn stroke(&mut self);
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: &str);
    fn set_text_baseline(&mut self, baseline: &str);
    /// Draw a line of text anchored per the current alignment.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backend fails to draw the text.
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError>;
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SetTransform([f64; 6]),
    ClearRect { x: f64, y: f64, w: f64, h: f64 },
    Save,
    Restore,
    FillStyle(String),
    StrokeStyle(String),
    LineWidth(f64),
    LineDash(Vec<f64>),
    LineDashOffset(f64),
    FillRect { x: f64, y: f64, w: f64, h: f64 },
    StrokeRect { x: f64, y: f64, w: f64, h: f64 },
    BeginPath,
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    Stroke,
    Font(String),
    TextAlign(String),
    TextBaseline(String),
    FillText { text: String, x: f64, y: f64 },
}

/// Surface that records commands instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command since the last `reset`, in call order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Forget recorded commands.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// Text drawn, in call order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of `clear_rect` calls, one per rendered frame.
    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::ClearRect { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Result<(), SurfaceError> {
        self.commands.push(DrawCommand::SetTransform([a, b, c, d, e, f]));
        Ok(())
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.commands.push(DrawCommand::ClearRect { x, y, w, h });
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn set_fill_style(&mut self, color: &str) {
        self.commands.push(DrawCommand::FillStyle(color.to_owned()));
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.commands.push(DrawCommand::StrokeStyle(color.to_owned()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.commands.push(DrawCommand::LineWidth(width));
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), SurfaceError> {
        self.commands.push(DrawCommand::LineDash(segments.to_vec()));
        Ok(())
    }

    fn set_line_dash_offset(&mut self, offset: f64) {
        self.commands.push(DrawCommand::LineDashOffset(offset));
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.commands.push(DrawCommand::FillRect { x, y, w, h });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.commands.push(DrawCommand::StrokeRect { x, y, w, h });
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::LineTo { x, y });
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke);
    }

    fn set_font(&mut self, font: &str) {
        self.commands.push(DrawCommand::Font(font.to_owned()));
    }

    fn set_text_align(&mut self, align: &str) {
        self.commands.push(DrawCommand::TextAlign(align.to_owned()));
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        self.commands.push(DrawCommand::TextBaseline(baseline.to_owned()));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError> {
        self.commands.push(DrawCommand::FillText { text: text.to_owned(), x, y });
        Ok(())
    }
}
