//! Export configuration.
//!
//! Every option has a serde default, so a YAML file only needs the keys it
//! changes. Values are range-checked by [`VizConfig::validate`] before an
//! export starts.

use crate::error::{Error, Result};
use crate::mapper::MapperOptions;
use crate::style::Style;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How frames are retimed when the export rate differs from the data rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleMode {
    /// Keep every frame exactly once; only playback speed changes.
    #[default]
    None,
    /// Pick the nearest source frame for each output instant.
    Nearest,
    /// Interpolate keypoint coordinates between neighbouring source frames.
    Linear,
}

/// Options recognized by [`AnimationDriver`](crate::animation::AnimationDriver)
/// and [`DataVisualizer`](crate::DataVisualizer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizConfig {
    /// Playback rate of the exported output, in frames per second.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,

    /// Output size in pixels as `(width, height)`.
    #[serde(default = "default_canvas_size")]
    pub canvas_size: (u32, u32),

    /// Minimum keypoint confidence to be drawn, in `[0, 1]`.
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f32,

    /// Scale axes independently instead of preserving aspect ratio.
    #[serde(default)]
    pub stretch_to_fill: bool,

    /// Frame retiming policy.
    #[serde(default)]
    pub resample_mode: ResampleMode,

    /// Border around the drawing area, in pixels.
    #[serde(default = "default_padding")]
    pub padding: u32,

    /// Make data y grow upward.
    #[serde(default)]
    pub flip_y: bool,

    /// Pixels per unit for axes whose data extent is zero.
    #[serde(default)]
    pub fallback_scale: Option<f32>,

    /// Loop animated output forever.
    #[serde(default = "default_loop_animation")]
    pub loop_animation: bool,

    /// Sequence frame rendered by still-image exports.
    #[serde(default)]
    pub still_frame_index: usize,

    /// Visual style.
    #[serde(default)]
    pub style: Style,
}

fn default_frame_rate() -> f32 {
    30.0
}
fn default_canvas_size() -> (u32, u32) {
    (640, 480)
}
fn default_visibility_threshold() -> f32 {
    0.5
}
fn default_padding() -> u32 {
    16
}
fn default_loop_animation() -> bool {
    true
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            canvas_size: default_canvas_size(),
            visibility_threshold: default_visibility_threshold(),
            stretch_to_fill: false,
            resample_mode: ResampleMode::None,
            padding: default_padding(),
            flip_y: false,
            fallback_scale: None,
            loop_animation: default_loop_animation(),
            still_frame_index: 0,
            style: Style::default(),
        }
    }
}

impl VizConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(0);
            Error::ConfigParse {
                line,
                message: e.to_string(),
            }
        })
    }

    /// Loads configuration with fallback to defaults.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Check every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first bad key.
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, why: String| Err(Error::InvalidConfig(format!("{key}: {why}")));

        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return invalid("frame_rate", format!("must be positive, got {}", self.frame_rate));
        }
        let (w, h) = self.canvas_size;
        if w == 0 || h == 0 {
            return invalid("canvas_size", format!("must be non-zero, got {w}x{h}"));
        }
        if u64::from(self.padding) * 2 >= u64::from(w.min(h)) {
            return invalid("padding", format!("{} leaves no room on a {w}x{h} canvas", self.padding));
        }
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return invalid(
                "visibility_threshold",
                format!("must be within [0, 1], got {}", self.visibility_threshold),
            );
        }
        if let Some(scale) = self.fallback_scale {
            if !scale.is_finite() || scale <= 0.0 {
                return invalid("fallback_scale", format!("must be positive, got {scale}"));
            }
        }
        if !(self.style.point_radius.is_finite() && self.style.point_radius >= 0.0) {
            return invalid("style.point_radius", format!("must be >= 0, got {}", self.style.point_radius));
        }
        if !(self.style.edge_width.is_finite() && self.style.edge_width >= 0.0) {
            return invalid("style.edge_width", format!("must be >= 0, got {}", self.style.edge_width));
        }
        Ok(())
    }

    /// Coordinate mapping options derived from this configuration.
    #[must_use]
    pub fn mapper_options(&self) -> MapperOptions {
        MapperOptions {
            stretch_to_fill: self.stretch_to_fill,
            fallback_scale: self.fallback_scale,
            padding: self.padding,
            flip_y: self.flip_y,
        }
    }

    /// Display time of one output frame.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.frame_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::ColorMode;

    #[test]
    fn test_config_default() {
        let config = VizConfig::new();
        assert!((config.frame_rate - 30.0).abs() < f32::EPSILON);
        assert_eq!(config.canvas_size, (640, 480));
        assert_eq!(config.resample_mode, ResampleMode::None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_minimal() {
        let config = VizConfig::parse("frame_rate: 10").unwrap();
        assert!((config.frame_rate - 10.0).abs() < f32::EPSILON);
        assert_eq!(config.canvas_size, (640, 480));
    }

    #[test]
    fn test_config_parse_full() {
        let yaml = r#"
frame_rate: 12.5
canvas_size: [320, 240]
visibility_threshold: 0.3
stretch_to_fill: true
resample_mode: linear
padding: 4
flip_y: true
fallback_scale: 50.0
loop_animation: false
style:
  point_radius: 2
  color_mode:
    mode: uniform
    color: { r: 255, g: 0, b: 0 }
"#;

        let config = VizConfig::parse(yaml).unwrap();

        assert_eq!(config.canvas_size, (320, 240));
        assert_eq!(config.resample_mode, ResampleMode::Linear);
        assert_eq!(config.fallback_scale, Some(50.0));
        assert!(!config.loop_animation);
        assert_eq!(config.style.color_mode, ColorMode::Uniform { color: crate::color::Rgba::RED });
        assert!(config.validate().is_ok());

        let options = config.mapper_options();
        assert!(options.stretch_to_fill && options.flip_y);
        assert_eq!(options.padding, 4);
    }

    #[test]
    fn test_config_parse_error_includes_line() {
        let yaml = r#"
canvas_size: [320, 240]
padding: 4
frame_rate: fast
"#;

        let err = VizConfig::parse(yaml).unwrap_err();
        match err {
            Error::ConfigParse { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut config = VizConfig::new();
        config.visibility_threshold = 1.5;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(msg)) if msg.contains("visibility_threshold")));

        let mut config = VizConfig::new();
        config.frame_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = VizConfig::new();
        config.canvas_size = (0, 100);
        assert!(config.validate().is_err());

        let mut config = VizConfig::new();
        config.padding = 240;
        assert!(config.validate().is_err());

        let mut config = VizConfig::new();
        config.fallback_scale = Some(-1.0);
        assert!(config.validate().is_err());

        let mut config = VizConfig::new();
        config.style.edge_width = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_frame_interval() {
        let mut config = VizConfig::new();
        config.frame_rate = 10.0;
        assert_eq!(config.frame_interval().as_millis(), 100);
    }

    #[test]
    fn test_config_load_or_default() {
        let config = VizConfig::load_or_default("/nonexistent/path.yaml");
        assert_eq!(config, VizConfig::default());
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viz.yaml");
        std::fs::write(&path, "canvas_size: [64, 48]\n").unwrap();

        let config = VizConfig::load(&path).unwrap();
        assert_eq!(config.canvas_size, (64, 48));
        assert!(matches!(VizConfig::load(dir.path().join("missing.yaml")), Err(Error::ConfigNotFound(_))));
    }
}
