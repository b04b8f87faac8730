//! Host configuration: world size, palette, feature toggles, and tuning.
//!
//! `MapConfig` deserializes from the host's camelCase JSON with every field
//! defaulted, so a host can pass `{}` and override only what it needs.
//! [`MapConfig::validate`] rejects values that would break transform math
//! (non-positive world size, default slot size, or grid step).

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Errors produced while loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`{field}` must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

/// Where the slot bounding box lands on the surface after alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    /// Bounding-box center on surface center.
    #[default]
    Center,
    /// Top-left corner on top-left corner.
    LeftTop,
    /// Bottom-left corner on bottom-left corner.
    LeftBottom,
    /// Top-right corner on top-right corner.
    RightTop,
    /// Bottom-right corner on bottom-right corner.
    RightBottom,
}

/// An entry of the slot context menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Stable key reported back to the host.
    pub key: String,
    /// Display text.
    pub label: String,
}

impl MenuItem {
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self { key: key.into(), label: label.into() }
    }
}

/// Rendering and scheduling tuning knobs.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceConfig {
    /// Debounce host resize notifications.
    pub enable_debounce: bool,
    /// Resize debounce window in milliseconds.
    pub debounce_delay: f64,
    /// Throttle hover hit-testing on pointer move.
    pub enable_throttle: bool,
    /// Hover throttle interval in milliseconds.
    pub throttle_delay: f64,
    /// Cull off-viewport slots from the render pass.
    pub enable_virtual_render: bool,
    /// Coalesce redraw requests to one pass per animation frame.
    pub enable_raf_optimization: bool,
    /// Slot count at which culling kicks in.
    pub virtual_render_threshold: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            enable_debounce: true,
            debounce_delay: 150.0,
            enable_throttle: true,
            throttle_delay: 16.0,
            enable_virtual_render: true,
            enable_raf_optimization: true,
            virtual_render_threshold: 100,
        }
    }
}

/// Full engine configuration as supplied by the host.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapConfig {
    /// World width used to derive the fit scale.
    pub width: f64,
    /// World height used to derive the fit scale.
    pub height: f64,
    /// Slot width when a slot omits `w`.
    pub default_w: f64,
    /// Slot height when a slot omits `h`.
    pub default_h: f64,
    /// Status name to fill color.
    pub status_colors: HashMap<String, String>,
    /// Surface background color, painted by the host container.
    pub background_color: String,
    /// Fill color when neither the slot nor its status supplies one.
    pub default_position_color: String,
    /// Normal border color.
    pub border_color: String,
    /// Border color of the hovered slot.
    pub border_hover_color: String,
    /// Default label color.
    pub text_color: String,
    /// Draw the background grid.
    pub show_grid: bool,
    /// Grid spacing in world units.
    pub grid_step: f64,
    /// Draw the status legend overlay.
    pub show_legend: bool,
    /// Screen pixels of diagonal shift per layer.
    pub layer_z_offset: f64,
    /// Allow drag-panning on empty space.
    pub enable_pan: bool,
    /// Open the context menu on secondary click.
    pub enable_context_menu: bool,
    /// Context menu entries.
    pub context_menu_items: Vec<MenuItem>,
    /// Initial alignment anchor.
    pub align: Anchor,
    /// Allow modifier-drag marquee selection.
    pub enable_selection: bool,
    /// Rendering and scheduling tuning.
    pub performance: PerformanceConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            default_w: 60.0,
            default_h: 40.0,
            status_colors: HashMap::new(),
            background_color: "#ffffff".to_owned(),
            default_position_color: "#e8f4ff".to_owned(),
            border_color: "#c0c4cc".to_owned(),
            border_hover_color: "#409eff".to_owned(),
            text_color: "#303133".to_owned(),
            show_grid: false,
            grid_step: 50.0,
            show_legend: false,
            layer_z_offset: 6.0,
            enable_pan: true,
            enable_context_menu: true,
            context_menu_items: Vec::new(),
            align: Anchor::Center,
            enable_selection: true,
            performance: PerformanceConfig::default(),
        }
    }
}

impl MapConfig {
    /// Parse and validate a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed input and
    /// [`ConfigError::NotPositive`] when a size or step is not positive.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values the transform math divides by or steps with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotPositive`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("width", self.width),
            ("height", self.height),
            ("defaultW", self.default_w),
            ("defaultH", self.default_h),
            ("gridStep", self.grid_step),
        ];
        for (field, value) in checks {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(())
    }

    /// Resolve a slot's fill color from an explicit color, its status, or the default.
    #[must_use]
    pub fn fill_for<'a>(&'a self, color: Option<&'a str>, status: Option<&str>) -> &'a str {
        color
            .filter(|c| !c.is_empty())
            .or_else(|| status.and_then(|s| self.status_colors.get(s)).map(String::as_str))
            .unwrap_or(self.default_position_color.as_str())
    }

    /// Legend rows `(status, color)` sorted by status name. Empty when the legend is off.
    #[must_use]
    pub fn legend_entries(&self) -> Vec<(&str, &str)> {
        if !self.show_legend {
            return Vec::new();
        }
        let mut entries: Vec<(&str, &str)> = self
            .status_colors
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}
