//! High-level entry point.
//!
//! [`DataVisualizer`] bundles a [`VizConfig`] and runs the whole pipeline
//! (map, render, export) for a [`Sequence`] in one call.
//!
//! # Example
//!
//! ```rust,no_run
//! use perennity_viz::prelude::*;
//!
//! let seq = FrameSource::new()
//!     .frame_rate(10.0)
//!     .topology(Topology::new(vec![(0, 1)]))
//!     .from_coords(&[vec![(0.0, 0.0), (1.0, 1.0)], vec![(0.5, 0.0), (1.0, 0.5)]])?;
//!
//! let report = DataVisualizer::new()
//!     .frame_rate(10.0)
//!     .dimensions(320, 240)
//!     .animate(&seq, "walk.gif")?;
//! assert_eq!(report.frames_written, 2);
//! # Ok::<(), perennity_viz::Error>(())
//! ```

use crate::animation::{AnimationDriver, CancellationToken, ExportReport};
use crate::canvas::Canvas;
use crate::config::{ResampleMode, VizConfig};
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::mapper::CoordinateMapper;
use crate::output::{OutputTarget, PngEncoder};
use crate::render::{FrameRenderer, FrameStats};
use crate::sequence::Sequence;
use crate::style::Style;
use std::path::Path;

/// Renders and exports frame sequences.
#[derive(Debug, Clone, Default)]
pub struct DataVisualizer {
    config: VizConfig,
}

impl DataVisualizer {
    /// Visualizer with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Visualizer using `config`. Values are checked when a call runs.
    #[must_use]
    pub fn with_config(config: VizConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &VizConfig {
        &self.config
    }

    /// Set the export frame rate.
    #[must_use]
    pub fn frame_rate(mut self, frame_rate: f32) -> Self {
        self.config.frame_rate = frame_rate;
        self
    }

    /// Set the minimum confidence for a keypoint to be drawn.
    #[must_use]
    pub fn visibility_threshold(mut self, threshold: f32) -> Self {
        self.config.visibility_threshold = threshold;
        self
    }

    /// Scale axes independently instead of preserving aspect ratio.
    #[must_use]
    pub fn stretch_to_fill(mut self, stretch: bool) -> Self {
        self.config.stretch_to_fill = stretch;
        self
    }

    /// Set the frame retiming policy.
    #[must_use]
    pub fn resample_mode(mut self, mode: ResampleMode) -> Self {
        self.config.resample_mode = mode;
        self
    }

    /// Set the visual style.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.config.style = style;
        self
    }

    /// Render frame `index` of `seq` to a framebuffer.
    ///
    /// The mapping uses the bounds of the whole sequence, so a frame renders
    /// identically here and inside an export.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, `index` is out of
    /// range, or the sequence bounds are degenerate.
    pub fn render_frame(&self, seq: &Sequence, index: usize) -> Result<Framebuffer> {
        Ok(self.render_frame_with_stats(seq, index)?.0)
    }

    /// Like [`render_frame`](Self::render_frame), also reporting what was drawn.
    ///
    /// # Errors
    ///
    /// As [`render_frame`](Self::render_frame).
    pub fn render_frame_with_stats(&self, seq: &Sequence, index: usize) -> Result<(Framebuffer, FrameStats)> {
        self.config.validate()?;
        let frame = seq.frame(index).ok_or_else(|| {
            Error::InvalidConfig(format!("frame index {index} out of range for {} frames", seq.len()))
        })?;

        let (width, height) = self.config.canvas_size;
        let mapper = CoordinateMapper::for_sequence(seq, self.config.canvas_size, self.config.mapper_options())?;
        let renderer = FrameRenderer::new(self.config.style, self.config.visibility_threshold);

        let mut canvas = Canvas::new(width, height)?;
        canvas.clear(self.config.style.background)?;
        let stats = renderer.render(&mut canvas, frame, seq.topology(), &mapper)?;
        let fb = canvas.release().ok_or(Error::SurfaceClosed("canvas released"))?;
        Ok((fb, stats))
    }

    /// Render frame `index` and encode it as PNG bytes.
    ///
    /// # Errors
    ///
    /// As [`render_frame`](Self::render_frame), plus encoding failures.
    pub fn frame_png(&self, seq: &Sequence, index: usize) -> Result<Vec<u8>> {
        PngEncoder::to_bytes(&self.render_frame(seq, index)?)
    }

    /// Write the configured still frame to a PNG file.
    ///
    /// # Errors
    ///
    /// See [`AnimationDriver::export`].
    pub fn plot(&self, seq: &Sequence, path: impl AsRef<Path>) -> Result<ExportReport> {
        self.export(seq, &OutputTarget::still(path.as_ref()), None)
    }

    /// Write the sequence as an animated GIF.
    ///
    /// # Errors
    ///
    /// See [`AnimationDriver::export`].
    pub fn animate(&self, seq: &Sequence, path: impl AsRef<Path>) -> Result<ExportReport> {
        self.export(seq, &OutputTarget::animation(path.as_ref()), None)
    }

    /// Write every frame as `{dir}/{prefix}{index:05}.png`.
    ///
    /// # Errors
    ///
    /// See [`AnimationDriver::export`].
    pub fn export_frames(&self, seq: &Sequence, dir: impl AsRef<Path>, prefix: &str) -> Result<ExportReport> {
        let target = OutputTarget::ImageSequence {
            dir: dir.as_ref().to_path_buf(),
            prefix: prefix.to_string(),
        };
        self.export(seq, &target, None)
    }

    /// Export to any target with an optional cancellation token.
    ///
    /// # Errors
    ///
    /// See [`AnimationDriver::export`].
    pub fn export(
        &self,
        seq: &Sequence,
        target: &OutputTarget,
        cancel: Option<&CancellationToken>,
    ) -> Result<ExportReport> {
        AnimationDriver::new(self.config.clone())?.export(seq, target, cancel)
    }
}

impl batuta_common::display::WithDimensions for DataVisualizer {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.config.canvas_size = (width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::sequence::Topology;
    use crate::source::FrameSource;
    use crate::style::ColorMode;
    use batuta_common::display::WithDimensions;

    fn triangle() -> Sequence {
        FrameSource::new()
            .frame_rate(10.0)
            .topology(Topology::new(vec![(0, 1), (1, 2), (2, 0)]))
            .from_coords(&[
                vec![(0.0, 0.0), (1.0, 0.0), (0.5, 1.0)],
                vec![(0.1, 0.0), (1.0, 0.1), (0.5, 0.9)],
            ])
            .unwrap()
    }

    fn visualizer() -> DataVisualizer {
        DataVisualizer::new()
            .dimensions(64, 48)
            .style(Style::new().color_mode(ColorMode::Uniform { color: Rgba::RED }))
    }

    #[test]
    fn test_dimensions_set_canvas_size() {
        let viz = visualizer();
        assert_eq!(viz.config().canvas_size, (64, 48));

        let fb = viz.render_frame(&triangle(), 0).unwrap();
        assert_eq!((fb.width(), fb.height()), (64, 48));
    }

    #[test]
    fn test_render_frame_draws_everything() {
        let (fb, stats) = visualizer().render_frame_with_stats(&triangle(), 1).unwrap();
        assert_eq!(stats, FrameStats { points_drawn: 3, edges_drawn: 3 });
        assert!(fb.count_not(Rgba::WHITE) > 0);
    }

    #[test]
    fn test_render_frame_out_of_range() {
        assert!(matches!(visualizer().render_frame(&triangle(), 5), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_threshold_one_renders_blank_frame() {
        let seq = FrameSource::new()
            .build(&[vec![
                crate::source::RawKeypoint::xy(0.0, 0.0).with_confidence(0.9),
                crate::source::RawKeypoint::xy(1.0, 1.0).with_confidence(0.99),
            ]])
            .unwrap();

        let (fb, stats) = visualizer()
            .visibility_threshold(1.0)
            .render_frame_with_stats(&seq, 0)
            .unwrap();
        assert_eq!(stats, FrameStats::default());
        assert_eq!(fb.count_not(Rgba::WHITE), 0);
    }

    #[test]
    fn test_outlier_inside_declared_bounds_renders() {
        let seq = FrameSource::new()
            .bounds(crate::sequence::Bounds::UNIT)
            .topology(Topology::new(vec![(0, 1)]))
            .from_coords(&[vec![(0.5, 0.5), (1.0e9, 0.5)]])
            .unwrap();

        let (fb, stats) = visualizer().dimensions(64, 64).render_frame_with_stats(&seq, 0).unwrap();
        assert_eq!(stats, FrameStats { points_drawn: 1, edges_drawn: 1 });
        assert_ne!(fb.get_pixel(63, 32), Some(Rgba::WHITE));
    }

    #[test]
    fn test_frame_png_bytes() {
        let bytes = visualizer().frame_png(&triangle(), 0).unwrap();
        assert_eq!(&bytes[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }

    #[test]
    fn test_plot_animate_and_export_frames() {
        let dir = tempfile::tempdir().unwrap();
        let viz = visualizer();
        let seq = triangle();

        let still = viz.plot(&seq, dir.path().join("tri.png")).unwrap();
        assert_eq!(still.frames_written, 1);

        let gif = viz.animate(&seq, dir.path().join("tri.gif")).unwrap();
        assert_eq!(gif.frames_written, 2);

        let frames = viz.export_frames(&seq, dir.path().join("frames"), "tri_").unwrap();
        assert_eq!(frames.paths[1], dir.path().join("frames").join("tri_00001.png"));
    }

    #[test]
    fn test_invalid_config_surfaces_on_call() {
        let viz = visualizer().frame_rate(-1.0);
        assert!(matches!(viz.render_frame(&triangle(), 0), Err(Error::InvalidConfig(_))));
        assert!(matches!(viz.animate(&triangle(), "unused.gif"), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_with_config() {
        let config = VizConfig {
            stretch_to_fill: true,
            ..VizConfig::default()
        };
        let viz = DataVisualizer::with_config(config).resample_mode(ResampleMode::Nearest);
        assert!(viz.config().stretch_to_fill);
        assert_eq!(viz.config().resample_mode, ResampleMode::Nearest);
    }
}
