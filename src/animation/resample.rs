//! Frame retiming between the data rate and the export rate.

use crate::config::ResampleMode;
use crate::sequence::{Frame, Keypoint};
use std::borrow::Cow;

/// Which source frame(s) one output frame is drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameRef {
    /// A source frame used as is.
    Exact(usize),
    /// Interpolation between two neighbouring source frames.
    Blend {
        /// Earlier frame.
        from: usize,
        /// Later frame.
        to: usize,
        /// Position between them in `(0, 1)`.
        t: f32,
    },
}

/// Largest number of frames a retimed export may produce.
pub const MAX_OUTPUT_FRAMES: usize = 1 << 20;

/// Number of output frames for `frame_count` source frames.
///
/// `ResampleMode::None` keeps every frame. The other modes convert the
/// duration to the target rate, keeping at least one frame.
#[must_use]
pub fn output_len(frame_count: usize, source_rate: f32, target_rate: f32, mode: ResampleMode) -> usize {
    if frame_count == 0 || mode == ResampleMode::None {
        return frame_count;
    }
    let scaled = (frame_count as f64 * f64::from(target_rate) / f64::from(source_rate)).round();
    if scaled.is_finite() {
        (scaled as usize).max(1)
    } else {
        frame_count
    }
}

/// Source frame references for every output frame, in order.
#[must_use]
pub fn plan(frame_count: usize, source_rate: f32, target_rate: f32, mode: ResampleMode) -> Vec<FrameRef> {
    let len = output_len(frame_count, source_rate, target_rate, mode);
    if mode == ResampleMode::None || len == 0 {
        return (0..len).map(FrameRef::Exact).collect();
    }

    let last = frame_count - 1;
    let step = f64::from(source_rate) / f64::from(target_rate);

    (0..len)
        .map(|i| {
            let at = (i as f64 * step).clamp(0.0, last as f64);
            match mode {
                ResampleMode::Linear => {
                    let from = at.floor() as usize;
                    let to = (from + 1).min(last);
                    let t = (at - from as f64) as f32;
                    if from == to || t <= f32::EPSILON {
                        FrameRef::Exact(from)
                    } else if t >= 1.0 - f32::EPSILON {
                        FrameRef::Exact(to)
                    } else {
                        FrameRef::Blend { from, to, t }
                    }
                }
                _ => FrameRef::Exact((at.round() as usize).min(last)),
            }
        })
        .collect()
}

/// Materialize a planned frame.
///
/// Keypoints visible in both neighbours (at `threshold`) are interpolated;
/// any other keypoint is taken from the nearer frame. Returns `None` if the
/// reference is out of range.
#[must_use]
pub fn resolve(frames: &[Frame], frame_ref: FrameRef, threshold: f32) -> Option<Cow<'_, Frame>> {
    match frame_ref {
        FrameRef::Exact(i) => frames.get(i).map(Cow::Borrowed),
        FrameRef::Blend { from, to, t } => {
            let (a, b) = (frames.get(from)?, frames.get(to)?);
            let keypoints = a
                .keypoints()
                .iter()
                .zip(b.keypoints())
                .map(|(ka, kb)| {
                    if ka.is_visible(threshold) && kb.is_visible(threshold) {
                        lerp_keypoint(ka, kb, t)
                    } else if t < 0.5 {
                        *ka
                    } else {
                        *kb
                    }
                })
                .collect();
            Some(Cow::Owned(Frame::new(keypoints)))
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn lerp_keypoint(a: &Keypoint, b: &Keypoint, t: f32) -> Keypoint {
    let z = match (a.z, b.z) {
        (Some(za), Some(zb)) => Some(lerp(za, zb, t)),
        (za, zb) => {
            if t < 0.5 {
                za
            } else {
                zb
            }
        }
    };

    Keypoint {
        entity: a.entity,
        x: lerp(a.x, b.x, t),
        y: lerp(a.y, b.y, t),
        z,
        confidence: Some(lerp(a.effective_confidence(), b.effective_confidence(), t)),
        visible: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_none_keeps_every_frame() {
        let refs = plan(4, 30.0, 10.0, ResampleMode::None);
        assert_eq!(refs, (0..4).map(FrameRef::Exact).collect::<Vec<_>>());
    }

    #[test]
    fn test_nearest_downsample() {
        // 6 frames at 30 fps -> 2 frames at 10 fps, every third frame
        let refs = plan(6, 30.0, 10.0, ResampleMode::Nearest);
        assert_eq!(refs, vec![FrameRef::Exact(0), FrameRef::Exact(3)]);
    }

    #[test]
    fn test_nearest_upsample_duplicates() {
        let refs = plan(2, 10.0, 20.0, ResampleMode::Nearest);
        assert_eq!(refs.len(), 4);
        assert_eq!(refs[0], FrameRef::Exact(0));
        assert_eq!(refs[3], FrameRef::Exact(1));
    }

    #[test]
    fn test_linear_upsample_blends() {
        let refs = plan(2, 10.0, 20.0, ResampleMode::Linear);
        assert_eq!(refs[0], FrameRef::Exact(0));
        assert_eq!(refs[1], FrameRef::Blend { from: 0, to: 1, t: 0.5 });
        assert_eq!(refs[2], FrameRef::Exact(1));
        assert_eq!(refs[3], FrameRef::Exact(1));
    }

    #[test]
    fn test_short_sequence_keeps_one_frame() {
        assert_eq!(output_len(1, 60.0, 1.0, ResampleMode::Linear), 1);
        assert_eq!(output_len(0, 60.0, 1.0, ResampleMode::Linear), 0);
    }

    #[test]
    fn test_resolve_interpolates_visible_only() {
        let frames = vec![
            Frame::new(vec![Keypoint::new(0, 0.0, 0.0), Keypoint::new(1, 1.0, 1.0)]),
            Frame::new(vec![Keypoint::new(0, 2.0, 4.0), Keypoint::missing(1)]),
        ];

        let blended = resolve(&frames, FrameRef::Blend { from: 0, to: 1, t: 0.25 }, 0.5).unwrap();
        let kp0 = blended.get(0).unwrap();
        assert_relative_eq!(kp0.x, 0.5);
        assert_relative_eq!(kp0.y, 1.0);

        // Missing in the later frame: nearer (earlier) keypoint is kept
        assert_eq!(blended.get(1), frames[0].get(1));

        let late = resolve(&frames, FrameRef::Blend { from: 0, to: 1, t: 0.75 }, 0.5).unwrap();
        assert!(!late.get(1).unwrap().has_position());
    }

    #[test]
    fn test_resolve_out_of_range() {
        let frames = vec![Frame::new(vec![Keypoint::new(0, 0.0, 0.0)])];
        assert!(resolve(&frames, FrameRef::Exact(3), 0.5).is_none());
        assert!(matches!(resolve(&frames, FrameRef::Exact(0), 0.5), Some(Cow::Borrowed(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_plan_references_stay_in_range(
            n in 1usize..120,
            source in 1.0f32..120.0,
            target in 1.0f32..120.0,
        ) {
            for mode in [ResampleMode::Nearest, ResampleMode::Linear] {
                let refs = plan(n, source, target, mode);
                prop_assert_eq!(refs.len(), output_len(n, source, target, mode));
                for r in refs {
                    match r {
                        FrameRef::Exact(i) => prop_assert!(i < n),
                        FrameRef::Blend { from, to, t } => {
                            prop_assert!(from < to && to < n);
                            prop_assert!(t > 0.0 && t < 1.0);
                        }
                    }
                }
            }
        }
    }
}
