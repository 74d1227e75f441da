//! Export Claims - end-to-end behaviour of the visualization pipeline.
//!
//! Each test is a falsifiable claim about what an export produces, run
//! against real files in a temporary directory.
//!
//! Run: cargo test --test export_claims_test

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use perennity_viz::prelude::*;
use proptest::prelude::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn hand_sequence(frames: usize) -> Sequence {
    let data: Vec<f32> = (0..frames)
        .flat_map(|f| {
            (0..21).flat_map(move |e| {
                let angle = e as f32 * 0.3 + f as f32 * 0.05;
                [angle.cos() * (1.0 + e as f32 * 0.1), angle.sin() * (1.0 + e as f32 * 0.1)]
            })
        })
        .collect();

    FrameSource::new()
        .frame_rate(30.0)
        .topology(Topology::hand())
        .from_flat(&data, 21, 2)
        .unwrap()
}

fn small_visualizer() -> DataVisualizer {
    DataVisualizer::new().dimensions(96, 72)
}

// ============================================================================
// FRAME COUNTS
// ============================================================================

/// Claim 1: A GIF export holds exactly one frame per sequence frame
#[test]
fn claim_01_gif_frame_count_matches_sequence() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hand.gif");

    let report = small_visualizer().animate(&hand_sequence(5), &path).unwrap();
    assert_eq!(report.frames_written, 5, "Claim 1 FALSIFIED: wrong frame count");

    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options.read_info(std::fs::File::open(&path).unwrap()).unwrap();
    let mut decoded = 0;
    while decoder.read_next_frame().unwrap().is_some() {
        decoded += 1;
    }
    assert_eq!(decoded, 5, "Claim 1 FALSIFIED: container holds {decoded} frames");
}

/// Claim 2: An empty sequence exports zero frames without error
#[test]
fn claim_02_empty_sequence_exports_zero_frames() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let seq = FrameSource::new().from_coords(&[]).unwrap();

    let report = small_visualizer().animate(&seq, dir.path().join("empty.gif")).unwrap();
    assert_eq!(report.frames_written, 0);
    assert!(report.paths.is_empty());
}

/// Claim 3: Three frames with NaN gaps at 10 fps still yield three frames
#[test]
fn claim_03_nan_gaps_keep_every_frame() {
    init_logging();
    let nan = f32::NAN;
    let seq = FrameSource::new()
        .frame_rate(10.0)
        .topology(Topology::new(vec![(0, 1), (1, 2)]))
        .from_coords(&[
            vec![(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)],
            vec![(0.0, 0.1), (nan, nan), (2.0, 0.1)],
            vec![(nan, nan), (1.0, 0.9), (2.0, 0.2)],
        ])
        .unwrap();
    let dir = tempfile::tempdir().unwrap();

    let report = small_visualizer()
        .frame_rate(10.0)
        .export_frames(&seq, dir.path(), "gap_")
        .unwrap();
    assert_eq!(report.frames_written, 3, "Claim 3 FALSIFIED");
    assert!(dir.path().join("gap_00002.png").exists());
}

/// Claim 10: A sequence made only of gaps exports one background frame each
#[test]
fn claim_10_all_gap_sequence_exports_background() {
    init_logging();
    let nan = f32::NAN;
    let seq = FrameSource::new()
        .topology(Topology::new(vec![(0, 1)]))
        .from_coords(&[vec![(nan, nan), (nan, nan)], vec![(nan, nan), (nan, nan)]])
        .unwrap();
    let dir = tempfile::tempdir().unwrap();

    let report = small_visualizer().animate(&seq, dir.path().join("gaps.gif")).unwrap();
    assert_eq!(report.frames_written, 2, "Claim 10 FALSIFIED: frames dropped");

    let fb = small_visualizer().render_frame(&seq, 1).unwrap();
    assert_eq!(fb.count_not(Rgba::WHITE), 0, "Claim 10 FALSIFIED: gap drawn");
}

// ============================================================================
// VISIBILITY
// ============================================================================

/// Claim 4: Threshold 1.0 draws nothing when every confidence is below 1.0
#[test]
fn claim_04_full_threshold_draws_nothing() {
    let raw: Vec<RawFrame> = vec![(0..4)
        .map(|i| RawKeypoint::xy(i as f32, (i % 2) as f32).with_confidence(0.95))
        .collect()];
    let seq = FrameSource::new()
        .topology(Topology::new(vec![(0, 1), (1, 2), (2, 3)]))
        .build(&raw)
        .unwrap();

    let fb = small_visualizer().visibility_threshold(1.0).render_frame(&seq, 0).unwrap();
    assert_eq!(fb.count_not(Rgba::WHITE), 0, "Claim 4 FALSIFIED: pixels drawn");
}

// ============================================================================
// LIFECYCLE
// ============================================================================

/// Claim 5: Export after the driver closed fails with SurfaceClosed
#[test]
fn claim_05_export_after_close_fails() {
    let dir = tempfile::tempdir().unwrap();
    let seq = hand_sequence(2);
    let target = OutputTarget::animation(dir.path().join("once.gif"));
    let mut driver = AnimationDriver::new(VizConfig {
        canvas_size: (48, 48),
        ..VizConfig::default()
    })
    .unwrap();

    let report = driver.export(&seq, &target, None).unwrap();
    assert_eq!(report.state, DriverState::Closed);
    assert!(matches!(driver.export(&seq, &target, None), Err(Error::SurfaceClosed(_))));
}

/// Claim 6: A cancelled export leaves no output behind
#[test]
fn claim_06_cancel_removes_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cancelled.gif");
    let token = CancellationToken::new();
    token.cancel();

    let result = small_visualizer().export(&hand_sequence(3), &OutputTarget::animation(&path), Some(&token));
    assert!(matches!(result, Err(Error::Cancelled { .. })));
    assert!(!path.exists(), "Claim 6 FALSIFIED: partial GIF left on disk");
}

/// Claim 7: Configuration loaded from YAML drives the export
#[test]
fn claim_07_yaml_config_drives_export() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("viz.yaml");
    std::fs::write(
        &config_path,
        "frame_rate: 15\ncanvas_size: [40, 30]\npadding: 2\nresample_mode: nearest\n",
    )
    .unwrap();

    let config = VizConfig::load(&config_path).unwrap();
    let report = DataVisualizer::with_config(config)
        .export_frames(&hand_sequence(4), dir.path().join("frames"), "f_")
        .unwrap();

    // 4 frames at 30 fps retimed to 15 fps
    assert_eq!(report.frames_written, 2);
    let decoder = png::Decoder::new(std::fs::File::open(&report.paths[0]).unwrap());
    let reader = decoder.read_info().unwrap();
    assert_eq!((reader.info().width, reader.info().height), (40, 30));
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Claim 8: N x E raw input becomes N frames of E points
    #[test]
    fn claim_08_flat_input_round_trips(
        n in 0usize..12,
        e in 1usize..25,
        seed in any::<u32>(),
    ) {
        let data: Vec<f32> = (0..n * e * 2)
            .map(|i| ((i as u32).wrapping_mul(2_654_435_761) ^ seed) as f32 / u32::MAX as f32)
            .collect();
        let seq = FrameSource::new().from_flat(&data, e, 2).unwrap();

        prop_assert_eq!(seq.len(), n);
        for frame in seq.frames() {
            prop_assert_eq!(frame.len(), e);
        }
    }

    /// Claim 9: Mapping the same keypoint twice gives the same pixel
    #[test]
    fn claim_09_mapping_is_idempotent(
        x in -100.0f32..100.0,
        y in -100.0f32..100.0,
        stretch in any::<bool>(),
    ) {
        let bounds = Bounds::new(-100.0, -50.0, 100.0, 50.0);
        let options = MapperOptions { stretch_to_fill: stretch, ..MapperOptions::default() };
        let a = CoordinateMapper::new(bounds, (320, 240), options).unwrap();
        let b = CoordinateMapper::new(bounds, (320, 240), options).unwrap();
        let kp = Keypoint::new(0, x, y);

        prop_assert_eq!(a.map(&kp), a.map(&kp));
        prop_assert_eq!(a.map(&kp), b.map(&kp));
    }
}
