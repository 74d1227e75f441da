//! Export driver: sequences per-frame rendering into an output target.
//!
//! An [`AnimationDriver`] walks a fixed state machine for each export:
//!
//! ```text
//! Idle -> Opened -> Rendering -> Flushed -> Closed
//! ```
//!
//! `Opened` acquires the canvas and the encoder, `Rendering` runs
//! clear → draw → encode for every output frame, `Flushed` finalizes the
//! container and `Closed` releases both resources. Failure or cancellation
//! while rendering still goes through `Flushed` and `Closed`, and every file
//! the export created is removed before the error is returned.

mod resample;

pub use resample::{output_len, plan, resolve, FrameRef, MAX_OUTPUT_FRAMES};

use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::error::{Error, Result};
use crate::mapper::CoordinateMapper;
use crate::output::{FrameEncoder, OutputTarget};
use crate::render::FrameRenderer;
use crate::sequence::Sequence;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lifecycle of an [`AnimationDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    /// Ready to export.
    #[default]
    Idle,
    /// Canvas and encoder acquired.
    Opened,
    /// Frames are being drawn and encoded.
    Rendering,
    /// Encoder finalized.
    Flushed,
    /// Resources released; further exports fail until [`AnimationDriver::reset`].
    Closed,
}

/// Cooperative cancellation flag, checked between frames.
///
/// Clones share the same flag, so one clone can be handed to another thread
/// and cancelled there.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Files written, in frame order.
    pub paths: Vec<PathBuf>,
    /// Frames encoded.
    pub frames_written: usize,
    /// Driver state after the export.
    pub state: DriverState,
}

/// Drives one export of a [`Sequence`] to an [`OutputTarget`].
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    config: VizConfig,
    renderer: FrameRenderer,
    state: DriverState,
}

impl AnimationDriver {
    /// Create a driver from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration is out of range.
    pub fn new(config: VizConfig) -> Result<Self> {
        config.validate()?;
        let renderer = FrameRenderer::new(config.style, config.visibility_threshold);
        Ok(Self {
            config,
            renderer,
            state: DriverState::Idle,
        })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> DriverState {
        self.state
    }

    /// Configuration used for exports.
    #[must_use]
    pub const fn config(&self) -> &VizConfig {
        &self.config
    }

    /// Return a closed driver to `Idle` so it can export again.
    pub fn reset(&mut self) {
        self.state = DriverState::Idle;
    }

    /// Source frames each output frame is drawn from.
    ///
    /// Callers planning an arbitrary retiming should check
    /// [`output_len`] against [`MAX_OUTPUT_FRAMES`] first, as `export` does.
    #[must_use]
    pub fn frame_plan(&self, seq: &Sequence, target: &OutputTarget) -> Vec<FrameRef> {
        if seq.is_empty() {
            return Vec::new();
        }
        if target.is_still() {
            return vec![FrameRef::Exact(self.config.still_frame_index)];
        }
        plan(seq.len(), seq.frame_rate(), self.config.frame_rate, self.config.resample_mode)
    }

    /// Render `seq` into `target`.
    ///
    /// The driver ends `Closed` whether the export succeeds or fails once
    /// resources were acquired. Errors raised before that (bad still index,
    /// oversized retiming, unmappable bounds, unwritable destination) leave
    /// it `Idle`. A sequence whose keypoints are all gaps exports background
    /// frames.
    ///
    /// # Errors
    ///
    /// - [`Error::SurfaceClosed`] if the driver is already `Closed`.
    /// - [`Error::InvalidConfig`] if the still index is past the end or the
    ///   retimed length exceeds [`MAX_OUTPUT_FRAMES`].
    /// - [`Error::DegenerateBounds`] if the sequence's extent is zero on an
    ///   axis and no fallback scale is set.
    /// - [`Error::Encoder`] if writing a frame or finalizing the output fails.
    /// - [`Error::Cancelled`] if `cancel` fired between frames.
    pub fn export(
        &mut self,
        seq: &Sequence,
        target: &OutputTarget,
        cancel: Option<&CancellationToken>,
    ) -> Result<ExportReport> {
        if self.state != DriverState::Idle {
            return Err(Error::SurfaceClosed("driver closed"));
        }

        if !target.is_still() {
            let len = output_len(seq.len(), seq.frame_rate(), self.config.frame_rate, self.config.resample_mode);
            if len > MAX_OUTPUT_FRAMES {
                return Err(Error::InvalidConfig(format!(
                    "frame_rate: retiming {} frames from {} fps to {} fps gives {len} frames, more than {MAX_OUTPUT_FRAMES}",
                    seq.len(),
                    seq.frame_rate(),
                    self.config.frame_rate
                )));
            }
        }

        let frames = self.frame_plan(seq, target);
        if let Some(&FrameRef::Exact(index)) = frames.first() {
            if target.is_still() && index >= seq.len() {
                return Err(Error::InvalidConfig(format!(
                    "still_frame_index: {index} is past the last frame ({})",
                    seq.len()
                )));
            }
        }
        let mapper = if frames.is_empty() {
            None
        } else {
            Some(CoordinateMapper::for_sequence(
                seq,
                self.config.canvas_size,
                self.config.mapper_options(),
            )?)
        };

        let (width, height) = self.config.canvas_size;
        let mut canvas = Canvas::new(width, height)?;
        let mut encoder = target
            .open(self.config.canvas_size, self.config.frame_rate, self.config.loop_animation)
            .map_err(|e| e.into_encoder(None))?;
        self.state = DriverState::Opened;
        info!(
            "exporting {} of {} frames to {}",
            frames.len(),
            seq.len(),
            target.path().display()
        );

        self.state = DriverState::Rendering;
        let rendered = match &mapper {
            Some(mapper) => self.render_frames(seq, &frames, mapper, &mut canvas, encoder.as_mut(), cancel),
            None => Ok(0),
        };

        self.state = DriverState::Flushed;
        let flushed = encoder.finish().map_err(|e| e.into_encoder(None));
        let result = match (rendered, flushed) {
            (Ok(count), Ok(())) => Ok(count),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), flushed) => {
                if let Err(flush_err) = flushed {
                    debug!("finalize after failed export also failed: {flush_err}");
                }
                Err(e)
            }
        };
        if result.is_err() {
            if let Err(e) = encoder.discard() {
                warn!("could not remove partial output: {e}");
            }
        }

        let paths = encoder.outputs().to_vec();
        drop(encoder);
        canvas.release();
        self.state = DriverState::Closed;

        let frames_written = result?;
        info!("export finished: {frames_written} frames, {} files", paths.len());
        Ok(ExportReport {
            paths,
            frames_written,
            state: self.state,
        })
    }

    fn render_frames(
        &self,
        seq: &Sequence,
        frames: &[FrameRef],
        mapper: &CoordinateMapper,
        canvas: &mut Canvas,
        encoder: &mut dyn FrameEncoder,
        cancel: Option<&CancellationToken>,
    ) -> Result<usize> {
        let threshold = self.renderer.visibility_threshold();

        for (index, &frame_ref) in frames.iter().enumerate() {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                info!("export cancelled after {index} frames");
                return Err(Error::Cancelled { frames_written: index });
            }

            let frame = resolve(seq.frames(), frame_ref, threshold)
                .ok_or_else(|| Error::encoder_at(index, format!("no source frame for {frame_ref:?}")))?;

            canvas.clear(self.config.style.background)?;
            let stats = self.renderer.render(canvas, &frame, seq.topology(), mapper)?;
            encoder
                .encode(canvas.surface()?)
                .map_err(|e| e.into_encoder(Some(index)))?;

            debug!(
                "frame {index}: {} points, {} edges",
                stats.points_drawn, stats.edges_drawn
            );
        }

        Ok(frames.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResampleMode;
    use crate::sequence::{Frame, Keypoint, Topology};
    use crate::source::FrameSource;
    use proptest::prelude::*;

    fn small_config() -> VizConfig {
        VizConfig {
            canvas_size: (32, 24),
            padding: 2,
            frame_rate: 10.0,
            ..VizConfig::default()
        }
    }

    fn walking_sequence(frames: usize) -> Sequence {
        let coords: Vec<Vec<(f32, f32)>> = (0..frames)
            .map(|i| {
                let t = i as f32;
                vec![(t, 0.0), (t + 1.0, 1.0), (t + 2.0, 0.5)]
            })
            .collect();
        FrameSource::new()
            .frame_rate(10.0)
            .topology(Topology::new(vec![(0, 1), (1, 2)]))
            .from_coords(&coords)
            .unwrap()
    }

    #[test]
    fn test_cancellation_token_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_png_sequence_export_counts_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut driver = AnimationDriver::new(small_config()).unwrap();
        assert_eq!(driver.state(), DriverState::Idle);

        let report = driver
            .export(&walking_sequence(4), &OutputTarget::image_sequence(dir.path()), None)
            .unwrap();

        assert_eq!(report.frames_written, 4);
        assert_eq!(report.paths.len(), 4);
        assert_eq!(report.state, DriverState::Closed);
        assert!(report.paths.iter().all(|p| p.exists()));
        assert_eq!(driver.state(), DriverState::Closed);
    }

    #[test]
    fn test_gif_export_writes_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walk.gif");
        let mut driver = AnimationDriver::new(small_config()).unwrap();

        let report = driver
            .export(&walking_sequence(3), &OutputTarget::animation(&path), None)
            .unwrap();

        assert_eq!(report.frames_written, 3);
        assert_eq!(report.paths, vec![path.clone()]);
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_empty_sequence_exports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.gif");
        let mut driver = AnimationDriver::new(small_config()).unwrap();

        let report = driver
            .export(&Sequence::empty(30.0).unwrap(), &OutputTarget::animation(&path), None)
            .unwrap();

        assert_eq!(report.frames_written, 0);
        assert!(report.paths.is_empty());
        assert!(!path.exists());
        assert_eq!(report.state, DriverState::Closed);
    }

    #[test]
    fn test_export_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = OutputTarget::image_sequence(dir.path());
        let seq = walking_sequence(2);
        let mut driver = AnimationDriver::new(small_config()).unwrap();

        driver.export(&seq, &target, None).unwrap();
        let err = driver.export(&seq, &target, None).unwrap_err();
        assert!(matches!(err, Error::SurfaceClosed(_)));

        driver.reset();
        assert_eq!(driver.state(), DriverState::Idle);
        assert!(driver.export(&seq, &target, None).is_ok());
    }

    #[test]
    fn test_cancelled_export_removes_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let mut driver = AnimationDriver::new(small_config()).unwrap();

        let err = driver
            .export(&walking_sequence(5), &OutputTarget::image_sequence(dir.path()), Some(&token))
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled { frames_written: 0 }));
        assert_eq!(driver.state(), DriverState::Closed);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_encoder_failure_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the still file should go makes the write fail
        let path = dir.path().join("taken.png");
        std::fs::create_dir(&path).unwrap();
        let mut driver = AnimationDriver::new(small_config()).unwrap();

        let err = driver
            .export(&walking_sequence(2), &OutputTarget::still(&path), None)
            .unwrap_err();

        assert!(matches!(err, Error::Encoder { frame_index: Some(0), .. }));
        assert_eq!(driver.state(), DriverState::Closed);
        // Cleanup only touches files the export created
        assert!(path.is_dir());
    }

    #[test]
    fn test_degenerate_bounds_leave_driver_idle() {
        let seq = FrameSource::new()
            .from_coords(&[vec![(1.0, 1.0), (1.0, 1.0)]])
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut driver = AnimationDriver::new(small_config()).unwrap();

        let err = driver
            .export(&seq, &OutputTarget::image_sequence(dir.path()), None)
            .unwrap_err();
        assert!(matches!(err, Error::DegenerateBounds { .. }));
        assert_eq!(driver.state(), DriverState::Idle);
    }

    #[test]
    fn test_still_export_uses_configured_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        let config = VizConfig {
            still_frame_index: 2,
            ..small_config()
        };
        let mut driver = AnimationDriver::new(config.clone()).unwrap();
        let seq = walking_sequence(3);

        assert_eq!(driver.frame_plan(&seq, &OutputTarget::still(&path)), vec![FrameRef::Exact(2)]);
        let report = driver.export(&seq, &OutputTarget::still(&path), None).unwrap();
        assert_eq!(report.frames_written, 1);
        assert!(path.exists());

        let mut driver = AnimationDriver::new(VizConfig {
            still_frame_index: 9,
            ..config
        })
        .unwrap();
        assert!(matches!(
            driver.export(&seq, &OutputTarget::still(&path), None),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_nan_scenario_at_ten_fps() {
        let nan = f32::NAN;
        let seq = FrameSource::new()
            .frame_rate(10.0)
            .topology(Topology::new(vec![(0, 1)]))
            .from_coords(&[
                vec![(0.0, 0.0), (1.0, 1.0)],
                vec![(0.0, 0.0), (2.0, 2.0)],
                vec![(nan, nan), (3.0, 3.0)],
            ])
            .unwrap();

        let gap = &seq.frames()[2].keypoints()[0];
        assert!(gap.effective_confidence().abs() < f32::EPSILON);
        assert!(!gap.is_visible(0.0));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nan.gif");
        let mut driver = AnimationDriver::new(small_config()).unwrap();
        assert_eq!(driver.frame_plan(&seq, &OutputTarget::animation(&path)).len(), 3);

        let report = driver.export(&seq, &OutputTarget::animation(&path), None).unwrap();
        assert_eq!(report.frames_written, 3);
        assert_eq!(report.paths, vec![path]);
    }

    #[test]
    fn test_all_gap_sequence_exports_background_frames() {
        let nan = f32::NAN;
        let seq = FrameSource::new()
            .frame_rate(10.0)
            .topology(Topology::new(vec![(0, 1)]))
            .from_coords(&[vec![(nan, nan), (nan, nan)], vec![(nan, nan), (nan, nan)]])
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut driver = AnimationDriver::new(small_config()).unwrap();

        let report = driver
            .export(&seq, &OutputTarget::animation(dir.path().join("gaps.gif")), None)
            .unwrap();
        assert_eq!(report.frames_written, 2);
        assert_eq!(report.state, DriverState::Closed);

        let mut driver = AnimationDriver::new(small_config()).unwrap();
        let report = driver
            .export(&seq, &OutputTarget::image_sequence(dir.path().join("frames")), None)
            .unwrap();
        assert_eq!(report.frames_written, 2);

        let decoder = png::Decoder::new(std::fs::File::open(&report.paths[1]).unwrap());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        let background = small_config().style.background;
        assert!(buf[..info.buffer_size()]
            .chunks_exact(4)
            .all(|px| px == [background.r, background.g, background.b, background.a]));
    }

    #[test]
    fn test_oversized_retiming_rejected_before_open() {
        let coords: Vec<Vec<(f32, f32)>> = (0..1000).map(|i| vec![(i as f32, 0.0), (0.0, 1.0)]).collect();
        let seq = FrameSource::new().frame_rate(1.0).from_coords(&coords).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.gif");
        let config = VizConfig {
            frame_rate: 1.0e7,
            resample_mode: ResampleMode::Linear,
            ..small_config()
        };
        let mut driver = AnimationDriver::new(config).unwrap();

        let err = driver.export(&seq, &OutputTarget::animation(&path), None).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(ref msg) if msg.starts_with("frame_rate")));
        assert_eq!(driver.state(), DriverState::Idle);
        assert!(!path.exists());

        // The same rate without retiming keeps the source length
        let mut driver = AnimationDriver::new(VizConfig {
            frame_rate: 1.0e7,
            ..small_config()
        })
        .unwrap();
        assert_eq!(driver.frame_plan(&seq, &OutputTarget::animation(&path)).len(), 1000);
        assert!(driver.export(&seq, &OutputTarget::still(dir.path().join("still.png")), None).is_ok());
    }

    #[test]
    fn test_resampled_export_length() {
        let dir = tempfile::tempdir().unwrap();
        // 10 fps data exported at 20 fps with interpolation doubles the frames
        let config = VizConfig {
            frame_rate: 20.0,
            resample_mode: ResampleMode::Linear,
            ..small_config()
        };
        let mut driver = AnimationDriver::new(config).unwrap();

        let report = driver
            .export(&walking_sequence(3), &OutputTarget::image_sequence(dir.path()), None)
            .unwrap();
        assert_eq!(report.frames_written, 6);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = VizConfig {
            visibility_threshold: 2.0,
            ..VizConfig::default()
        };
        assert!(matches!(AnimationDriver::new(config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_frames_with_nothing_visible_still_exported() {
        let dir = tempfile::tempdir().unwrap();
        let frames = vec![
            Frame::new(vec![Keypoint::new(0, 0.0, 0.0).with_confidence(0.9), Keypoint::new(1, 1.0, 1.0)]),
            Frame::new(vec![Keypoint::missing(0), Keypoint::missing(1)]),
        ];
        let seq = Sequence::new(frames, 10.0, None, Topology::none()).unwrap();
        let config = VizConfig {
            visibility_threshold: 1.0,
            ..small_config()
        };
        let mut driver = AnimationDriver::new(config).unwrap();

        let report = driver
            .export(&seq, &OutputTarget::image_sequence(dir.path()), None)
            .unwrap();
        assert_eq!(report.frames_written, 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_exported_count_matches_sequence(n in 0usize..6, fps in 1.0f32..60.0) {
            let dir = tempfile::tempdir().unwrap();
            let config = VizConfig { frame_rate: fps, ..small_config() };
            let mut driver = AnimationDriver::new(config).unwrap();

            let report = driver
                .export(&walking_sequence(n), &OutputTarget::image_sequence(dir.path()), None)
                .unwrap();
            prop_assert_eq!(report.frames_written, n);
            prop_assert_eq!(report.paths.len(), n);
        }
    }
}
